//! Remote Project Registry
//!
//! Narrow capability interface over the source-control host consumed by the
//! batch path: candidate listing, clone, push, and merge-request creation.
//! Kept as a trait so the batch coordinator is testable without a network.

mod gitlab;

pub use gitlab::GitLabRegistry;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;

use crate::types::Result;

/// Read-only snapshot of a repository known to the registry, fetched once at
/// batch start.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectCandidate {
    /// Registry-assigned identifier
    pub id: u64,
    /// Full path, e.g. "group/subgroup/project"
    pub path_with_namespace: String,
    /// Default branch to clone and target with proposals
    pub default_branch: Option<String>,
    /// Last recorded activity, drives the eligibility window
    pub last_activity_at: DateTime<Utc>,
    /// HTTP clone URL
    pub http_url_to_repo: String,
}

impl ProjectCandidate {
    /// Short name usable in directory and log contexts
    pub fn slug(&self) -> String {
        self.path_with_namespace.replace('/', "-")
    }
}

/// Remote registry operations used by the batch coordinator and publisher.
#[async_trait]
pub trait ProjectRegistry: Send + Sync {
    /// List candidate projects of a group, in registry order.
    async fn list_candidates(&self, group_id: u64) -> Result<Vec<ProjectCandidate>>;

    /// Clone the candidate's default branch into `dest`.
    async fn clone_repo(&self, candidate: &ProjectCandidate, dest: &Path) -> Result<()>;

    /// Push a local branch to the candidate's remote. The first push of a
    /// new branch creates it on the registry.
    async fn push(&self, local: &Path, branch: &str) -> Result<()>;

    /// Open a review request proposing `branch` for merge into the
    /// candidate's default branch.
    async fn open_merge_request(
        &self,
        candidate: &ProjectCandidate,
        branch: &str,
        title: &str,
        description: &str,
    ) -> Result<()>;
}
