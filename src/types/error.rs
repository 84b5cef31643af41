//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Error Kinds
//!
//! - **Config**: invalid or missing configuration - fatal at startup
//! - **TaskInvocation**: a remote analysis call failed or timed out -
//!   isolated per task, converted to outcome data by the orchestrator
//! - **ArtifactMissing**: a task claimed success but its artifact is absent -
//!   downgrades the run, never fatal
//! - **Acquisition**: local path invalid or clone failed - fatal to that
//!   single repository only
//! - **Registry** / **Publication**: remote registry interaction failed -
//!   caught at the batch per-repository boundary
//!
//! ## Design Principles
//!
//! - Single unified error type (DocError) for the entire application
//! - No panic/unwrap outside tests - all errors are recoverable or reported

use std::path::PathBuf;
use thiserror::Error;

/// Unified application error
#[derive(Debug, Error)]
pub enum DocError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Remote LLM endpoint failure (network, auth, provider error, timeout)
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// A task's opaque remote call failed. Never crosses the orchestrator
    /// boundary as an error - it is captured into the task's outcome.
    #[error("task '{task}' failed: {message}")]
    TaskInvocation { task: String, message: String },

    /// Success was reported but the expected artifact is not on disk
    #[error("artifact missing after reported success: {path}")]
    ArtifactMissing { path: PathBuf },

    /// Repository could not be acquired (invalid path, clone failure)
    #[error("repository acquisition failed: {0}")]
    Acquisition(String),

    /// Remote project registry request failed
    #[error("registry error: {0}")]
    Registry(String),

    /// Branch push or review-request creation failed
    #[error("publication failed: {0}")]
    Publication(String),
}

impl DocError {
    /// Shorthand for a task invocation failure
    pub fn invocation(task: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TaskInvocation {
            task: task.into(),
            message: message.into(),
        }
    }

    /// True for errors that must abort the whole process at startup
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, DocError>;
