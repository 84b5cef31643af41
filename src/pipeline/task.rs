//! Task Model
//!
//! A task unit wraps one named documentation objective: the rendered
//! instructions for the opaque remote call plus the expected artifact path.
//! Specs are immutable once constructed and discarded after the run;
//! outcomes are created exactly once per spec per run.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

use crate::ai::provider::{LlmProvider, TokenUsage};
use crate::ai::prompt;
use crate::config::{AnalysisFlags, ReadmeConfig};
use crate::constants;
use crate::types::{DocError, Result};

// =============================================================================
// Task Identity
// =============================================================================

/// Closed set of task identifiers, fixed at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    CodeStructure,
    Dependencies,
    DataFlow,
    RequestFlow,
    ApiSurface,
    Readme,
}

impl TaskKind {
    /// The five analysis tasks, in configured order.
    pub const ANALYSES: [TaskKind; 5] = [
        TaskKind::CodeStructure,
        TaskKind::Dependencies,
        TaskKind::DataFlow,
        TaskKind::RequestFlow,
        TaskKind::ApiSurface,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::CodeStructure => "code_structure",
            Self::Dependencies => "dependencies",
            Self::DataFlow => "data_flow",
            Self::RequestFlow => "request_flow",
            Self::ApiSurface => "api_analysis",
            Self::Readme => "readme",
        }
    }

    /// Expected artifact path, relative to the repository root.
    pub fn artifact(&self) -> PathBuf {
        match self {
            Self::CodeStructure => Path::new(constants::DOCS_DIR).join("structure_analysis.md"),
            Self::Dependencies => Path::new(constants::DOCS_DIR).join("dependency_analysis.md"),
            Self::DataFlow => Path::new(constants::DOCS_DIR).join("data_flow_analysis.md"),
            Self::RequestFlow => Path::new(constants::DOCS_DIR).join("request_flow_analysis.md"),
            Self::ApiSurface => Path::new(constants::DOCS_DIR).join("api_analysis.md"),
            Self::Readme => PathBuf::from(constants::README_FILE),
        }
    }

    fn is_excluded(&self, flags: &AnalysisFlags) -> bool {
        match self {
            Self::CodeStructure => flags.exclude_code_structure,
            Self::Dependencies => flags.exclude_dependencies,
            Self::DataFlow => flags.exclude_data_flow,
            Self::RequestFlow => flags.exclude_request_flow,
            Self::ApiSurface => flags.exclude_api_analysis,
            Self::Readme => false,
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Task Spec
// =============================================================================

/// One named documentation objective: rendered instructions plus the
/// expected artifact path. Pure data and one execution method.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub kind: TaskKind,
    pub prompt: String,
    /// Artifact path relative to the repository root
    pub artifact: PathBuf,
}

impl TaskSpec {
    /// Build the enabled analysis specs in configured order. Disabled tasks
    /// are omitted entirely.
    pub fn analysis_specs(flags: &AnalysisFlags, repo_root: &Path) -> Vec<TaskSpec> {
        let tree = prompt::repo_tree_summary(repo_root);

        TaskKind::ANALYSES
            .iter()
            .filter(|kind| !kind.is_excluded(flags))
            .map(|&kind| {
                let rendered = match kind {
                    TaskKind::CodeStructure => prompt::code_structure(&tree),
                    TaskKind::Dependencies => prompt::dependencies(&tree),
                    TaskKind::DataFlow => prompt::data_flow(&tree),
                    TaskKind::RequestFlow => prompt::request_flow(&tree),
                    TaskKind::ApiSurface => prompt::api_surface(&tree),
                    TaskKind::Readme => unreachable!("readme is not an analysis task"),
                };
                TaskSpec {
                    kind,
                    prompt: rendered,
                    artifact: kind.artifact(),
                }
            })
            .collect()
    }

    /// Build the single README synthesis spec, grounding the prompt in
    /// whatever analysis artifacts already exist under `.ai/docs`.
    pub fn readme_spec(config: &ReadmeConfig, repo_root: &Path) -> TaskSpec {
        let tree = prompt::repo_tree_summary(repo_root);
        let available_docs = list_available_docs(repo_root);

        let existing = if config.use_existing_readme {
            std::fs::read_to_string(repo_root.join(constants::README_FILE)).ok()
        } else {
            None
        };

        TaskSpec {
            kind: TaskKind::Readme,
            prompt: prompt::readme(&tree, &available_docs, config, existing.as_deref()),
            artifact: TaskKind::Readme.artifact(),
        }
    }

    /// Execute the opaque remote call and persist the artifact.
    ///
    /// Any failure maps to `DocError`; the orchestrator converts it into a
    /// failed outcome instead of letting it cross the fan-out boundary.
    pub async fn run(&self, provider: &dyn LlmProvider, repo_root: &Path) -> Result<TaskOutcome> {
        info!(task = %self.kind, "Running task");
        let started = Instant::now();

        let response = provider
            .generate(&self.prompt)
            .await
            .map_err(|e| DocError::invocation(self.kind.name(), e.to_string()))?;

        let artifact_path = repo_root.join(&self.artifact);
        if let Some(parent) = artifact_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Absolute paths leaked by the model are rewritten relative to root
        let content = response
            .content
            .replace(&repo_root.to_string_lossy().into_owned(), ".");
        std::fs::write(&artifact_path, content)?;

        let duration = started.elapsed();
        info!(
            task = %self.kind,
            tokens = response.usage.total(),
            elapsed_secs = duration.as_secs(),
            "Task complete, artifact saved to {}",
            artifact_path.display()
        );

        Ok(TaskOutcome::succeeded(self, duration, response.usage))
    }
}

// =============================================================================
// Task Outcome & Run Report
// =============================================================================

/// Terminal status of one task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Succeeded,
    Failed,
}

/// Result data for one task; created exactly once per spec per run.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub kind: TaskKind,
    pub artifact: PathBuf,
    pub status: TaskStatus,
    pub error: Option<String>,
    pub duration: Duration,
    pub usage: TokenUsage,
}

impl TaskOutcome {
    pub fn succeeded(spec: &TaskSpec, duration: Duration, usage: TokenUsage) -> Self {
        Self {
            kind: spec.kind,
            artifact: spec.artifact.clone(),
            status: TaskStatus::Succeeded,
            error: None,
            duration,
            usage,
        }
    }

    pub fn failed(spec: &TaskSpec, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            kind: spec.kind,
            artifact: spec.artifact.clone(),
            status: TaskStatus::Failed,
            error: Some(error.into()),
            duration,
            usage: TokenUsage::default(),
        }
    }

    /// Rewrite a claimed success into a failure (artifact validation).
    pub fn downgrade(&mut self, error: impl Into<String>) {
        self.status = TaskStatus::Failed;
        self.error = Some(error.into());
    }
}

/// Overall status of an orchestration run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// All enabled tasks succeeded and all artifacts validated present
    Complete,
    /// At least one task failed or an artifact is missing
    Partial,
    /// No tasks were enabled
    Empty,
}

/// Ordered collection of outcomes (configured order, not completion order).
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcomes: Vec<TaskOutcome>,
    pub status: RunStatus,
}

impl RunReport {
    pub fn from_outcomes(outcomes: Vec<TaskOutcome>) -> Self {
        let status = derive_status(&outcomes);
        Self { outcomes, status }
    }

    /// Re-derive the overall status after outcomes were rewritten.
    pub fn refresh_status(&mut self) {
        self.status = derive_status(&self.outcomes);
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == TaskStatus::Failed)
            .count()
    }

    pub fn total_usage(&self) -> TokenUsage {
        self.outcomes.iter().fold(TokenUsage::default(), |acc, o| {
            TokenUsage {
                input_tokens: acc.input_tokens + o.usage.input_tokens,
                output_tokens: acc.output_tokens + o.usage.output_tokens,
            }
        })
    }
}

fn derive_status(outcomes: &[TaskOutcome]) -> RunStatus {
    if outcomes.is_empty() {
        RunStatus::Empty
    } else if outcomes.iter().all(|o| o.status == TaskStatus::Succeeded) {
        RunStatus::Complete
    } else {
        RunStatus::Partial
    }
}

/// List `.ai/docs/*.md` artifacts relative to the repository root.
fn list_available_docs(repo_root: &Path) -> Vec<String> {
    let docs_dir = repo_root.join(constants::DOCS_DIR);
    let Ok(entries) = std::fs::read_dir(&docs_dir) else {
        return Vec::new();
    };

    let mut docs: Vec<String> = entries
        .flatten()
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "md"))
        .map(|e| {
            format!(
                "{}/{}",
                constants::DOCS_DIR,
                e.file_name().to_string_lossy()
            )
        })
        .collect();
    docs.sort();
    docs
}
