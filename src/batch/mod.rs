//! Batch Coordinator
//!
//! Iterates candidate repositories from the remote registry and runs a full
//! session -> orchestrate -> validate -> publish cycle for each eligible one,
//! sequentially (one clone on disk at a time). Any per-candidate error is
//! caught, logged with the candidate's identity, and recorded in the batch
//! summary; the batch itself never aborts because one repository failed.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::ai::provider::SharedProvider;
use crate::config::{Config, ConfigLoader};
use crate::pipeline::{Orchestrator, RunStatus, TaskSpec, validate_artifacts};
use crate::publish::{PublishOutcome, Publisher};
use crate::registry::{ProjectCandidate, ProjectRegistry};
use crate::repo::{self, RepositoryHandle, git};
use crate::types::Result;

// =============================================================================
// Batch Summary
// =============================================================================

/// Terminal state of one candidate within a batch
#[derive(Debug)]
pub enum CandidateStatus {
    /// Ineligible; no session was created and no side effects occurred
    Skipped { reason: String },
    /// Pipeline ran to completion (the run itself may still be partial)
    Processed {
        run_status: RunStatus,
        publish: Option<PublishOutcome>,
    },
    /// An error at some stage; the batch moved on to the next candidate
    Failed { error: String },
}

/// One entry per candidate, in registry order.
#[derive(Debug)]
pub struct CandidateReport {
    pub path: String,
    pub status: CandidateStatus,
}

/// Aggregate result of a batch run
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub candidates: Vec<CandidateReport>,
}

impl BatchSummary {
    pub fn processed(&self) -> usize {
        self.count(|s| matches!(s, CandidateStatus::Processed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, CandidateStatus::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, CandidateStatus::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&CandidateStatus) -> bool) -> usize {
        self.candidates.iter().filter(|c| pred(&c.status)).count()
    }
}

// =============================================================================
// Batch Coordinator
// =============================================================================

/// Drives the per-candidate state machine over a registry group.
pub struct BatchCoordinator {
    registry: Arc<dyn ProjectRegistry>,
    publisher: Arc<dyn Publisher>,
    provider: SharedProvider,
    config: Config,
}

impl BatchCoordinator {
    pub fn new(
        registry: Arc<dyn ProjectRegistry>,
        publisher: Arc<dyn Publisher>,
        provider: SharedProvider,
        config: Config,
    ) -> Self {
        Self {
            registry,
            publisher,
            provider,
            config,
        }
    }

    /// Run the batch over every candidate of the configured group.
    ///
    /// Only candidate listing is fatal; everything after is isolated per
    /// repository.
    pub async fn run(&self) -> Result<BatchSummary> {
        let group_id = self.config.batch.group_id.ok_or_else(|| {
            crate::types::DocError::Config("batch group_id is required".to_string())
        })?;

        let candidates = self.registry.list_candidates(group_id).await?;
        info!("Batch starting over {} candidates", candidates.len());

        let now = Utc::now();
        let mut summary = BatchSummary::default();

        for candidate in &candidates {
            let status = if let Some(reason) = self.skip_reason(candidate, now) {
                info!(candidate = %candidate.path_with_namespace, "Skipped: {}", reason);
                CandidateStatus::Skipped { reason }
            } else {
                match self.process_candidate(candidate).await {
                    Ok(status) => status,
                    Err(e) => {
                        warn!(
                            candidate = %candidate.path_with_namespace,
                            "Candidate failed: {}", e
                        );
                        CandidateStatus::Failed {
                            error: e.to_string(),
                        }
                    }
                }
            };

            summary.candidates.push(CandidateReport {
                path: candidate.path_with_namespace.clone(),
                status,
            });
        }

        info!(
            "Batch finished: {} processed, {} skipped, {} failed",
            summary.processed(),
            summary.skipped(),
            summary.failed()
        );
        Ok(summary)
    }

    /// Eligibility filter: recency window plus denylist. Ineligible
    /// candidates produce no session, no clone, no registry mutation.
    fn skip_reason(&self, candidate: &ProjectCandidate, now: DateTime<Utc>) -> Option<String> {
        let window = Duration::days(self.config.batch.recency_days);
        if now.signed_duration_since(candidate.last_activity_at) > window {
            return Some(format!(
                "no activity within {} days (last: {})",
                self.config.batch.recency_days,
                candidate.last_activity_at.format("%Y-%m-%d")
            ));
        }

        if let Some(prefix) = self
            .config
            .batch
            .denylist
            .iter()
            .find(|p| candidate.path_with_namespace.starts_with(p.as_str()))
        {
            return Some(format!("matched denylist entry '{}'", prefix));
        }

        None
    }

    /// Full cycle for one candidate. The session is released on every exit
    /// path: explicitly after the pipeline, via the handle's Drop backstop
    /// if anything unwinds before that.
    async fn process_candidate(&self, candidate: &ProjectCandidate) -> Result<CandidateStatus> {
        let handle =
            repo::acquire_clone(self.registry.as_ref(), candidate, &self.config.batch.work_dir)
                .await?;

        let result = self.run_pipeline(candidate, &handle).await;

        if let Err(e) = handle.release() {
            warn!(
                candidate = %candidate.path_with_namespace,
                "Failed to release session: {}", e
            );
        }

        result
    }

    async fn run_pipeline(
        &self,
        candidate: &ProjectCandidate,
        handle: &RepositoryHandle,
    ) -> Result<CandidateStatus> {
        let root = handle.root();
        info!(
            candidate = %candidate.path_with_namespace,
            version = %git::repo_version(root).await,
            "Processing candidate"
        );

        // The clone may carry its own .ai/config.yaml overrides
        let repo_config = ConfigLoader::load(Some(root))?;

        let specs = TaskSpec::analysis_specs(&repo_config.analysis, root);
        let orchestrator = Orchestrator::new(self.provider.clone());
        let report = orchestrator.run(&specs, root).await;
        let report = validate_artifacts(report, root);

        if report.status == RunStatus::Empty {
            info!(
                candidate = %candidate.path_with_namespace,
                "No tasks enabled, nothing to publish"
            );
            return Ok(CandidateStatus::Processed {
                run_status: RunStatus::Empty,
                publish: None,
            });
        }

        let publish = self.publisher.publish(candidate, handle, &report).await?;

        Ok(CandidateStatus::Processed {
            run_status: report.status,
            publish: Some(publish),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{LlmProvider, LlmResponse, TokenUsage};
    use crate::pipeline::RunReport;
    use crate::types::DocError;
    use async_trait::async_trait;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct MockProvider {
        content: &'static str,
    }

    impl MockProvider {
        fn ok() -> Self {
            Self {
                content: "# Generated",
            }
        }

        /// Claims success but leaves only an empty artifact behind
        fn hollow() -> Self {
            Self { content: "" }
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn generate(&self, _prompt: &str) -> Result<LlmResponse> {
            Ok(LlmResponse {
                content: self.content.to_string(),
                usage: TokenUsage::default(),
                model: "mock".to_string(),
                provider: "mock".to_string(),
            })
        }

        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock"
        }
    }

    /// Registry whose clones are plain directories; clone failures are
    /// keyed by candidate id.
    struct MockRegistry {
        candidates: Vec<ProjectCandidate>,
        fail_clone_ids: Vec<u64>,
        clone_calls: AtomicUsize,
        /// Extra file contents seeded into every clone
        seed_config: Option<&'static str>,
    }

    #[async_trait]
    impl ProjectRegistry for MockRegistry {
        async fn list_candidates(&self, _group_id: u64) -> Result<Vec<ProjectCandidate>> {
            Ok(self.candidates.clone())
        }

        async fn clone_repo(&self, candidate: &ProjectCandidate, dest: &Path) -> Result<()> {
            self.clone_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_clone_ids.contains(&candidate.id) {
                return Err(DocError::Acquisition("simulated clone failure".to_string()));
            }
            fs::create_dir_all(dest)?;
            fs::write(dest.join("main.rs"), "fn main() {}")?;
            if let Some(config) = self.seed_config {
                fs::create_dir_all(dest.join(".ai"))?;
                fs::write(dest.join(".ai/config.yaml"), config)?;
            }
            Ok(())
        }

        async fn push(&self, _local: &Path, _branch: &str) -> Result<()> {
            Ok(())
        }

        async fn open_merge_request(
            &self,
            _candidate: &ProjectCandidate,
            _branch: &str,
            _title: &str,
            _description: &str,
        ) -> Result<()> {
            Ok(())
        }
    }

    struct RecordingPublisher {
        published: Mutex<Vec<(String, RunStatus)>>,
    }

    impl RecordingPublisher {
        fn new() -> Self {
            Self {
                published: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Publisher for RecordingPublisher {
        async fn publish(
            &self,
            candidate: &ProjectCandidate,
            _handle: &RepositoryHandle,
            report: &RunReport,
        ) -> Result<PublishOutcome> {
            self.published
                .lock()
                .unwrap()
                .push((candidate.path_with_namespace.clone(), report.status));
            Ok(PublishOutcome::Proposed {
                branch: "docsmith/docs-test".to_string(),
            })
        }
    }

    fn candidate(id: u64, days_old: i64) -> ProjectCandidate {
        ProjectCandidate {
            id,
            path_with_namespace: format!("group/project-{}", id),
            default_branch: Some("main".to_string()),
            last_activity_at: Utc::now() - Duration::days(days_old),
            http_url_to_repo: format!("https://example.com/group/project-{}.git", id),
        }
    }

    fn coordinator(
        registry: Arc<MockRegistry>,
        publisher: Arc<RecordingPublisher>,
        work_dir: &Path,
    ) -> BatchCoordinator {
        let mut config = Config::default();
        config.batch.group_id = Some(1);
        config.batch.work_dir = work_dir.to_path_buf();

        BatchCoordinator::new(registry, publisher, Arc::new(MockProvider::ok()), config)
    }

    #[tokio::test]
    async fn test_failing_clone_isolates_one_candidate() {
        let work = TempDir::new().unwrap();
        let registry = Arc::new(MockRegistry {
            candidates: vec![candidate(1, 0), candidate(2, 0), candidate(3, 0)],
            fail_clone_ids: vec![2],
            clone_calls: AtomicUsize::new(0),
            seed_config: None,
        });
        let publisher = Arc::new(RecordingPublisher::new());
        let coordinator = coordinator(registry, publisher.clone(), work.path());

        let summary = coordinator.run().await.unwrap();

        assert_eq!(summary.candidates.len(), 3);
        assert_eq!(summary.processed(), 2);
        assert_eq!(summary.failed(), 1);
        assert!(matches!(
            summary.candidates[1].status,
            CandidateStatus::Failed { .. }
        ));

        let published = publisher.published.lock().unwrap();
        let paths: Vec<&str> = published.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, vec!["group/project-1", "group/project-3"]);
    }

    #[tokio::test]
    async fn test_stale_candidate_is_skipped_without_side_effects() {
        let work = TempDir::new().unwrap();
        let registry = Arc::new(MockRegistry {
            candidates: vec![candidate(1, 45)],
            fail_clone_ids: vec![],
            clone_calls: AtomicUsize::new(0),
            seed_config: None,
        });
        let publisher = Arc::new(RecordingPublisher::new());
        let coordinator = coordinator(registry.clone(), publisher.clone(), work.path());

        let summary = coordinator.run().await.unwrap();

        assert_eq!(summary.skipped(), 1);
        assert!(matches!(
            summary.candidates[0].status,
            CandidateStatus::Skipped { .. }
        ));
        // No clone, no publication
        assert_eq!(registry.clone_calls.load(Ordering::SeqCst), 0);
        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_denylisted_candidate_is_skipped() {
        let work = TempDir::new().unwrap();
        let registry = MockRegistry {
            candidates: vec![candidate(1, 0)],
            fail_clone_ids: vec![],
            clone_calls: AtomicUsize::new(0),
            seed_config: None,
        };
        let publisher = Arc::new(RecordingPublisher::new());

        let mut config = Config::default();
        config.batch.group_id = Some(1);
        config.batch.work_dir = work.path().to_path_buf();
        config.batch.denylist = vec!["group/project-1".to_string()];

        let coordinator = BatchCoordinator::new(
            Arc::new(registry),
            publisher.clone(),
            Arc::new(MockProvider::ok()),
            config,
        );

        let summary = coordinator.run().await.unwrap();
        assert_eq!(summary.skipped(), 1);
        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_temporary_clones_left_after_batch() {
        let work = TempDir::new().unwrap();
        let registry = Arc::new(MockRegistry {
            candidates: vec![candidate(1, 0), candidate(2, 0)],
            fail_clone_ids: vec![2],
            clone_calls: AtomicUsize::new(0),
            seed_config: None,
        });
        let coordinator = coordinator(registry, Arc::new(RecordingPublisher::new()), work.path());

        coordinator.run().await.unwrap();

        let leftover: Vec<_> = fs::read_dir(work.path()).unwrap().collect();
        assert!(leftover.is_empty(), "work dir should be empty: {:?}", leftover);
    }

    #[tokio::test]
    async fn test_all_tasks_excluded_skips_publication() {
        let work = TempDir::new().unwrap();
        let registry = Arc::new(MockRegistry {
            candidates: vec![candidate(1, 0)],
            fail_clone_ids: vec![],
            clone_calls: AtomicUsize::new(0),
            seed_config: Some(
                "analysis:\n  exclude_code_structure: true\n  exclude_dependencies: true\n  exclude_data_flow: true\n  exclude_request_flow: true\n  exclude_api_analysis: true\n",
            ),
        });
        let publisher = Arc::new(RecordingPublisher::new());
        let coordinator = coordinator(registry, publisher.clone(), work.path());

        let summary = coordinator.run().await.unwrap();

        assert_eq!(summary.processed(), 1);
        match &summary.candidates[0].status {
            CandidateStatus::Processed {
                run_status,
                publish,
            } => {
                assert_eq!(*run_status, RunStatus::Empty);
                assert!(publish.is_none());
            }
            other => panic!("unexpected status: {:?}", other),
        }
        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validation_downgrade_flows_into_publication() {
        let work = TempDir::new().unwrap();
        let registry = Arc::new(MockRegistry {
            candidates: vec![candidate(1, 0)],
            fail_clone_ids: vec![],
            clone_calls: AtomicUsize::new(0),
            seed_config: None,
        });
        let publisher = Arc::new(RecordingPublisher::new());

        let mut config = Config::default();
        config.batch.group_id = Some(1);
        config.batch.work_dir = work.path().to_path_buf();

        // Provider reports success but every artifact ends up empty, so the
        // validator downgrades each outcome inside the batch pipeline
        let coordinator = BatchCoordinator::new(
            registry,
            publisher.clone(),
            Arc::new(MockProvider::hollow()),
            config,
        );

        let summary = coordinator.run().await.unwrap();

        assert_eq!(summary.processed(), 1);
        match &summary.candidates[0].status {
            CandidateStatus::Processed {
                run_status,
                publish,
            } => {
                assert_eq!(*run_status, RunStatus::Partial);
                assert!(publish.is_some());
            }
            other => panic!("unexpected status: {:?}", other),
        }

        let published = publisher.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].1, RunStatus::Partial);
    }
}
