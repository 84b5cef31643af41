//! Publisher
//!
//! Turns produced artifacts into a proposed change against the remote
//! registry: a timestamp-named branch, one commit with the generated
//! documentation, a push, and a merge request whose description summarizes
//! per-task status. Failures surface as `DocError::Publication` and are
//! handled by the batch coordinator's per-repository boundary.

use async_trait::async_trait;
use chrono::Utc;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::info;

use crate::constants;
use crate::pipeline::{RunReport, TaskKind, TaskStatus};
use crate::registry::{ProjectCandidate, ProjectRegistry};
use crate::repo::RepositoryHandle;
use crate::repo::git;
use crate::types::{DocError, Result};

/// Result of a publish attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// A merge request was opened for the named branch
    Proposed { branch: String },
    /// The run produced no changes against the default branch
    NoChanges,
}

/// Narrow publishing capability, mockable in batch tests.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(
        &self,
        candidate: &ProjectCandidate,
        handle: &RepositoryHandle,
        report: &RunReport,
    ) -> Result<PublishOutcome>;
}

/// Publisher backed by local git plus the project registry.
pub struct GitLabPublisher {
    registry: Arc<dyn ProjectRegistry>,
    author_name: String,
    author_email: String,
}

impl GitLabPublisher {
    pub fn new(registry: Arc<dyn ProjectRegistry>, author_name: &str, author_email: &str) -> Self {
        Self {
            registry,
            author_name: author_name.to_string(),
            author_email: author_email.to_string(),
        }
    }
}

#[async_trait]
impl Publisher for GitLabPublisher {
    async fn publish(
        &self,
        candidate: &ProjectCandidate,
        handle: &RepositoryHandle,
        report: &RunReport,
    ) -> Result<PublishOutcome> {
        let root = handle.root();
        let branch = proposal_branch_name();

        git::run(root, &["checkout", "-b", &branch])
            .await
            .map_err(DocError::Publication)?;

        // An all-failed run may never have created the docs directory
        if root.join(constants::DOCS_DIR).exists() {
            git::run(root, &["add", "--", constants::DOCS_DIR])
                .await
                .map_err(DocError::Publication)?;
        }
        if root.join(constants::README_FILE).exists() {
            git::run(root, &["add", "--", constants::README_FILE])
                .await
                .map_err(DocError::Publication)?;
        }

        // `diff --cached --quiet` exits 0 when the index is clean
        if git::run(root, &["diff", "--cached", "--quiet"]).await.is_ok() {
            info!(
                candidate = %candidate.path_with_namespace,
                "No documentation changes to propose"
            );
            return Ok(PublishOutcome::NoChanges);
        }

        let message = format!(
            "docs: automated documentation update\n\nGenerated by docsmith at {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        );
        git::run(
            root,
            &[
                "-c",
                &format!("user.name={}", self.author_name),
                "-c",
                &format!("user.email={}", self.author_email),
                "commit",
                "-m",
                &message,
            ],
        )
        .await
        .map_err(DocError::Publication)?;

        self.registry.push(root, &branch).await?;

        self.registry
            .open_merge_request(
                candidate,
                &branch,
                &merge_request_title(report),
                &render_description(report),
            )
            .await?;

        info!(
            candidate = %candidate.path_with_namespace,
            "Published documentation proposal on branch {}",
            branch
        );
        Ok(PublishOutcome::Proposed { branch })
    }
}

/// Branch name derived from the current timestamp, unique per run.
fn proposal_branch_name() -> String {
    format!(
        "{}-{}",
        constants::BRANCH_PREFIX,
        Utc::now().format("%Y%m%d%H%M%S")
    )
}

fn merge_request_title(report: &RunReport) -> String {
    if report.failed_count() == 0 {
        "Automated documentation update".to_string()
    } else {
        format!(
            "Automated documentation update ({} of {} tasks failed)",
            report.failed_count(),
            report.outcomes.len()
        )
    }
}

/// Per-task status table for the review-request description. Disabled tasks
/// are listed as skipped; validation downgrades show as failed with their
/// reason, so reviewers see both kinds of failure.
pub fn render_description(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Automated documentation generated by docsmith.\n\n\
         | Task | Status | Tokens | Notes |\n\
         |------|--------|--------|-------|"
    );

    for outcome in &report.outcomes {
        let status = match outcome.status {
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
        };
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            outcome.kind,
            status,
            outcome.usage.total(),
            outcome.error.as_deref().unwrap_or("-")
        );
    }

    for kind in TaskKind::ANALYSES {
        if !report.outcomes.iter().any(|o| o.kind == kind) {
            let _ = writeln!(out, "| {} | skipped | - | excluded by configuration |", kind);
        }
    }

    let _ = writeln!(out, "\nOverall status: {:?}", report.status);
    out
}
