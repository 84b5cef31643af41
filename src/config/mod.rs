//! Configuration Management
//!
//! Layered configuration: defaults → global file → repository file → env.
//! Read-only after load; shared by reference across a run.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{AnalysisFlags, BatchConfig, Config, LlmConfig, ReadmeConfig};
