//! Document Command
//!
//! Synthesizes a README.md for one local repository, grounded in any
//! analysis artifacts already present under `.ai/docs/`.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::ai::OpenAiProvider;
use crate::cli::output::Output;
use crate::config::ConfigLoader;
use crate::pipeline::{Orchestrator, TaskSpec, validate_artifacts};
use crate::repo::{self, git};
use crate::types::Result;

pub async fn run(repo_path: &Path, use_existing_readme: bool) -> Result<()> {
    let output = Output::new();

    let handle = repo::open_local(repo_path)?;
    let root = handle.root();

    let config = ConfigLoader::load(Some(root))?;
    let mut readme_config = config.readme;
    readme_config.use_existing_readme = readme_config.use_existing_readme || use_existing_readme;

    info!(
        repo = %root.display(),
        version = %git::repo_version(root).await,
        "Starting README synthesis"
    );

    let provider = Arc::new(OpenAiProvider::new(&config.llm)?);
    let spec = TaskSpec::readme_spec(&readme_config, root);

    let orchestrator = Orchestrator::new(provider);
    let report = orchestrator.run(std::slice::from_ref(&spec), root).await;
    let report = validate_artifacts(report, root);

    output.run_report(&report);

    handle.release()?;
    Ok(())
}
