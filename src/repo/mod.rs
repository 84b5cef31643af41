//! Repository Access
//!
//! Working-copy acquisition and release, plus git subprocess helpers.

pub mod git;
mod session;

pub use session::{RepositoryHandle, acquire_clone, open_local};
