//! Batch Command
//!
//! Runs the analysis pipeline over every eligible repository of a registry
//! group and proposes the results as merge requests.

use std::path::PathBuf;
use std::sync::Arc;

use crate::ai::OpenAiProvider;
use crate::batch::{BatchCoordinator, CandidateStatus};
use crate::cli::output::Output;
use crate::config::ConfigLoader;
use crate::publish::{GitLabPublisher, PublishOutcome};
use crate::registry::GitLabRegistry;
use crate::types::Result;

/// CLI overrides for batch settings.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub group_id: Option<u64>,
    pub work_dir: Option<PathBuf>,
    pub recency_days: Option<i64>,
}

pub async fn run(options: BatchOptions) -> Result<()> {
    let output = Output::new();

    let mut config = ConfigLoader::load(None)?;
    if let Some(group_id) = options.group_id {
        config.batch.group_id = Some(group_id);
    }
    if let Some(work_dir) = options.work_dir {
        config.batch.work_dir = work_dir;
    }
    if let Some(recency_days) = options.recency_days {
        config.batch.recency_days = recency_days;
    }
    config.validate_batch()?;

    let registry = Arc::new(GitLabRegistry::new(&config.batch)?);
    let publisher = Arc::new(GitLabPublisher::new(
        registry.clone(),
        &config.batch.author_name,
        &config.batch.author_email,
    ));
    let provider = Arc::new(OpenAiProvider::new(&config.llm)?);

    let coordinator = BatchCoordinator::new(registry, publisher, provider, config);
    let summary = coordinator.run().await?;

    output.section("Batch summary");
    for candidate in &summary.candidates {
        match &candidate.status {
            CandidateStatus::Processed {
                run_status,
                publish,
            } => {
                let proposal = match publish {
                    Some(PublishOutcome::Proposed { branch }) => format!("proposed {}", branch),
                    Some(PublishOutcome::NoChanges) => "no changes".to_string(),
                    None => "nothing to publish".to_string(),
                };
                output.success(&format!(
                    "{}: {:?}, {}",
                    candidate.path, run_status, proposal
                ));
            }
            CandidateStatus::Skipped { reason } => {
                output.info(&format!("{}: skipped ({})", candidate.path, reason));
            }
            CandidateStatus::Failed { error } => {
                output.error(&format!("{}: {}", candidate.path, error));
            }
        }
    }
    output.info(&format!(
        "{} processed, {} skipped, {} failed",
        summary.processed(),
        summary.skipped(),
        summary.failed()
    ));

    Ok(())
}
