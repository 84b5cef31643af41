//! Application Constants
//!
//! Deterministic artifact locations and default values shared across modules.

/// Directory (relative to the repository root) holding per-task analysis
/// artifacts.
pub const DOCS_DIR: &str = ".ai/docs";

/// Per-repository configuration file, merged over global configuration.
pub const REPO_CONFIG_PATH: &str = ".ai/config.yaml";

/// Synthesis artifact written at the repository root.
pub const README_FILE: &str = "README.md";

/// Prefix for proposal branches created by the batch publisher.
pub const BRANCH_PREFIX: &str = "docsmith/docs";

/// Network defaults
pub mod network {
    /// LLM request ceiling in seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    /// Registry API request timeout in seconds
    pub const REGISTRY_TIMEOUT_SECS: u64 = 30;

    /// Maximum HTTP attempts for retryable LLM failures
    pub const MAX_RETRY_ATTEMPTS: usize = 5;
}

/// Batch processing defaults
pub mod batch {
    /// Candidates with no activity inside this window are skipped
    pub const DEFAULT_RECENCY_DAYS: i64 = 30;

    /// Default working root for temporary clones
    pub const DEFAULT_WORK_DIR: &str = "/tmp/docsmith";
}

/// Prompt context limits
pub mod prompt {
    /// Maximum files listed in the repository tree summary
    pub const MAX_TREE_FILES: usize = 400;

    /// Maximum entries listed per directory in the tree summary
    pub const MAX_FILES_PER_DIR: usize = 8;
}
