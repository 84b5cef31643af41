//! Shared Types
//!
//! Error types used across every module.

pub mod error;

pub use error::{DocError, Result};
