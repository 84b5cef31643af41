//! docsmith - AI-Driven Repository Documentation Generator
//!
//! Dispatches a repository's source tree to a fixed set of LLM-backed
//! analysis tasks plus a README synthesis task, validates the produced
//! artifacts, and (in batch mode) proposes the results as merge requests
//! against a remote project registry.
//!
//! ## Core Properties
//!
//! - **Failure isolation**: one failing analysis never cancels its siblings;
//!   failures become outcome data, not exceptions
//! - **Artifact validation**: claimed successes are re-verified on disk
//!   before a run is reported complete
//! - **Guaranteed cleanup**: temporary clones are released on every exit
//!   path, success or failure
//! - **Batch isolation**: one repository's failure never aborts the batch
//!
//! ## Modules
//!
//! - [`pipeline`]: task units, concurrent orchestrator, artifact validator
//! - [`ai`]: LLM provider abstraction and prompt rendering
//! - [`repo`]: repository session acquisition and release
//! - [`registry`]: remote project registry interface (GitLab v4)
//! - [`batch`]: per-candidate state machine over a registry group
//! - [`publish`]: branch, commit, push, and merge-request creation

pub mod ai;
pub mod batch;
pub mod cli;
pub mod config;
pub mod constants;
pub mod pipeline;
pub mod publish;
pub mod registry;
pub mod repo;
pub mod types;

// Configuration
pub use config::{AnalysisFlags, BatchConfig, Config, ConfigLoader, LlmConfig, ReadmeConfig};

// Error Types
pub use types::error::{DocError, Result};

// Pipeline
pub use pipeline::{
    Orchestrator, RunReport, RunStatus, TaskKind, TaskOutcome, TaskSpec, TaskStatus,
    validate_artifacts,
};

// AI
pub use ai::{LlmProvider, LlmResponse, OpenAiProvider, SharedProvider, TokenUsage};

// Batch
pub use batch::{BatchCoordinator, BatchSummary, CandidateStatus};

// Registry & Publishing
pub use publish::{GitLabPublisher, PublishOutcome, Publisher};
pub use registry::{GitLabRegistry, ProjectCandidate, ProjectRegistry};
pub use repo::RepositoryHandle;
