//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/docsmith/) and per-repository (.ai/config.yaml)
//! level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Per-task analysis exclusion flags
    pub analysis: AnalysisFlags,

    /// README synthesis settings
    pub readme: ReadmeConfig,

    /// Batch processing settings
    pub batch: BatchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            analysis: AnalysisFlags::default(),
            readme: ReadmeConfig::default(),
            batch: BatchConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `DocError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(crate::types::DocError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(crate::types::DocError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.batch.recency_days <= 0 {
            return Err(crate::types::DocError::Config(format!(
                "batch recency_days must be greater than 0, got {}",
                self.batch.recency_days
            )));
        }

        url::Url::parse(&self.batch.registry_url).map_err(|e| {
            crate::types::DocError::Config(format!(
                "batch registry_url '{}' is not a valid URL: {}",
                self.batch.registry_url, e
            ))
        })?;

        Ok(())
    }

    /// Validate the batch-only requirements. Called before a batch run,
    /// after CLI overrides are applied.
    pub fn validate_batch(&self) -> crate::types::Result<()> {
        self.validate()?;

        if self.batch.group_id.is_none() {
            return Err(crate::types::DocError::Config(
                "batch group_id is required (set batch.group_id or pass --group-id)".to_string(),
            ));
        }

        if self.batch.registry_token.is_none() {
            return Err(crate::types::DocError::Config(
                "batch registry_token is required (set DOCSMITH_BATCH__REGISTRY_TOKEN)".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

/// Settings for the opaque remote analysis call.
///
/// Note: the API key is never serialized back out; providers wrap it in
/// SecretString for runtime protection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model name (provider-specific)
    pub model: String,

    /// API base URL for an OpenAI-compatible endpoint
    pub api_base: Option<String>,

    /// API key, usually supplied via DOCSMITH_LLM__API_KEY
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Request timeout ceiling in seconds
    pub timeout_secs: u64,

    /// Sampling temperature (0.0 = deterministic)
    pub temperature: f32,

    /// Maximum tokens to generate per call
    pub max_tokens: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_base: None,
            api_key: None,
            timeout_secs: constants::network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.0,
            max_tokens: 8192,
        }
    }
}

// =============================================================================
// Analysis Task Flags
// =============================================================================

/// Closed set of per-task exclusion flags.
///
/// The orchestrator iterates this struct in a fixed order; there is no
/// dynamic task registry. All-excluded is legal and yields an empty run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisFlags {
    /// Exclude code structure analysis
    pub exclude_code_structure: bool,
    /// Exclude dependencies analysis
    pub exclude_dependencies: bool,
    /// Exclude data flow analysis
    pub exclude_data_flow: bool,
    /// Exclude request flow analysis
    pub exclude_request_flow: bool,
    /// Exclude API surface analysis
    pub exclude_api_analysis: bool,
}

// =============================================================================
// README Synthesis Configuration
// =============================================================================

/// Section exclusion flags for README synthesis.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadmeConfig {
    /// Exclude project overview with title, purpose, and features
    pub exclude_project_overview: bool,
    /// Exclude table of contents
    pub exclude_table_of_contents: bool,
    /// Exclude high-level architecture overview with tech stack
    pub exclude_architecture: bool,
    /// Exclude repository directory structure
    pub exclude_repository_structure: bool,
    /// Exclude service dependencies and integrations
    pub exclude_dependencies_and_integration: bool,
    /// Exclude API endpoint documentation
    pub exclude_api_documentation: bool,
    /// Exclude development notes and conventions
    pub exclude_development_notes: bool,
    /// Exclude known issues and limitations
    pub exclude_known_issues_and_limitations: bool,
    /// Use an existing README as context instead of starting from scratch
    pub use_existing_readme: bool,
}

// =============================================================================
// Batch Configuration
// =============================================================================

/// Settings for the batch path: registry access, eligibility, and the
/// working root for temporary clones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Remote registry base URL (GitLab-compatible v4 API)
    pub registry_url: String,

    /// Registry access token, usually via DOCSMITH_BATCH__REGISTRY_TOKEN
    #[serde(skip_serializing)]
    pub registry_token: Option<String>,

    /// Target group whose projects are candidates
    pub group_id: Option<u64>,

    /// Working root for temporary clones (one clone at a time)
    pub work_dir: PathBuf,

    /// Candidates with no activity within this many days are skipped
    pub recency_days: i64,

    /// Path-with-namespace prefixes to exclude from processing
    pub denylist: Vec<String>,

    /// Bot identity used for proposal commits
    pub author_name: String,
    pub author_email: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            registry_url: "https://gitlab.com".to_string(),
            registry_token: None,
            group_id: None,
            work_dir: PathBuf::from(constants::batch::DEFAULT_WORK_DIR),
            recency_days: constants::batch::DEFAULT_RECENCY_DAYS,
            denylist: Vec::new(),
            author_name: "docsmith".to_string(),
            author_email: "docsmith@localhost".to_string(),
        }
    }
}
