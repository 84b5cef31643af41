//! Analyze Command
//!
//! Runs the enabled analysis tasks against one local repository and writes
//! the artifacts under `.ai/docs/`. Partial task failure is reported in the
//! output, not as a process error; only configuration and repository
//! acquisition failures exit non-zero.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::ai::OpenAiProvider;
use crate::cli::output::Output;
use crate::config::{AnalysisFlags, ConfigLoader};
use crate::pipeline::{Orchestrator, TaskSpec, validate_artifacts};
use crate::repo::{self, git};
use crate::types::Result;

/// CLI exclusions, OR-ed onto the configured flags (a CLI flag can only
/// exclude, never re-enable).
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeOptions {
    pub exclude_code_structure: bool,
    pub exclude_dependencies: bool,
    pub exclude_data_flow: bool,
    pub exclude_request_flow: bool,
    pub exclude_api_analysis: bool,
}

impl AnalyzeOptions {
    fn apply(&self, flags: AnalysisFlags) -> AnalysisFlags {
        AnalysisFlags {
            exclude_code_structure: flags.exclude_code_structure || self.exclude_code_structure,
            exclude_dependencies: flags.exclude_dependencies || self.exclude_dependencies,
            exclude_data_flow: flags.exclude_data_flow || self.exclude_data_flow,
            exclude_request_flow: flags.exclude_request_flow || self.exclude_request_flow,
            exclude_api_analysis: flags.exclude_api_analysis || self.exclude_api_analysis,
        }
    }
}

pub async fn run(repo_path: &Path, options: AnalyzeOptions) -> Result<()> {
    let output = Output::new();

    let handle = repo::open_local(repo_path)?;
    let root = handle.root();

    let config = ConfigLoader::load(Some(root))?;
    let flags = options.apply(config.analysis);

    info!(
        repo = %root.display(),
        version = %git::repo_version(root).await,
        "Starting analysis"
    );

    let provider = Arc::new(OpenAiProvider::new(&config.llm)?);
    let specs = TaskSpec::analysis_specs(&flags, root);
    output.info(&format!("Running {} analysis tasks", specs.len()));

    let orchestrator = Orchestrator::new(provider);
    let report = orchestrator.run(&specs, root).await;
    let report = validate_artifacts(report, root);

    output.run_report(&report);

    handle.release()?;
    Ok(())
}
