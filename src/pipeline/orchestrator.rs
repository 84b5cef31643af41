//! Concurrent Orchestrator
//!
//! Fans out every enabled task's remote call concurrently and waits for all
//! of them to reach a terminal state. A failing task is captured as a failed
//! outcome; it never propagates and never cancels a sibling. Outcomes are
//! reported in configured order regardless of completion order.

use std::path::Path;
use std::time::Instant;

use futures::future::join_all;
use tracing::{info, warn};

use super::task::{RunReport, TaskOutcome, TaskSpec};
use crate::ai::provider::SharedProvider;

/// Runs a set of task specs against one repository.
pub struct Orchestrator {
    provider: SharedProvider,
}

impl Orchestrator {
    pub fn new(provider: SharedProvider) -> Self {
        Self { provider }
    }

    /// Execute all specs concurrently and collect one outcome per spec.
    ///
    /// `join_all` polls every future to completion and yields results in
    /// input order, which gives both the no-cancellation and the
    /// order-preservation guarantees in one place.
    pub async fn run(&self, specs: &[TaskSpec], repo_root: &Path) -> RunReport {
        if specs.is_empty() {
            info!("No tasks enabled, nothing to run");
            return RunReport::from_outcomes(Vec::new());
        }

        info!(
            "Orchestrating {} tasks against {}",
            specs.len(),
            repo_root.display()
        );

        let futures = specs.iter().map(|spec| {
            let provider = self.provider.clone();
            async move {
                let started = Instant::now();
                match spec.run(provider.as_ref(), repo_root).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(task = %spec.kind, "Task failed: {}", e);
                        TaskOutcome::failed(spec, started.elapsed(), e.to_string())
                    }
                }
            }
        });

        let outcomes = join_all(futures).await;

        let report = RunReport::from_outcomes(outcomes);
        info!(
            "Orchestration finished: {:?} ({} of {} tasks failed)",
            report.status,
            report.failed_count(),
            report.outcomes.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{LlmProvider, LlmResponse, TokenUsage};
    use crate::config::AnalysisFlags;
    use crate::pipeline::task::{RunStatus, TaskKind, TaskStatus};
    use crate::types::{DocError, Result};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Provider that fails any prompt containing one of the markers and
    /// optionally sleeps per call to shuffle completion order.
    struct MockProvider {
        fail_markers: Vec<&'static str>,
        delay_markers: Vec<&'static str>,
    }

    impl MockProvider {
        fn ok() -> Self {
            Self {
                fail_markers: Vec::new(),
                delay_markers: Vec::new(),
            }
        }

        fn failing_on(markers: Vec<&'static str>) -> Self {
            Self {
                fail_markers: markers,
                delay_markers: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn generate(&self, prompt: &str) -> Result<LlmResponse> {
            if self.delay_markers.iter().any(|m| prompt.contains(m)) {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            if self.fail_markers.iter().any(|m| prompt.contains(m)) {
                return Err(DocError::LlmApi("simulated provider failure".to_string()));
            }
            Ok(LlmResponse {
                content: "# Generated\n\ncontent".to_string(),
                usage: TokenUsage {
                    input_tokens: 100,
                    output_tokens: 50,
                },
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

    fn specs(flags: AnalysisFlags, root: &std::path::Path) -> Vec<TaskSpec> {
        TaskSpec::analysis_specs(&flags, root)
    }

    #[tokio::test]
    async fn test_zero_enabled_tasks_yields_empty_report() {
        let temp = TempDir::new().unwrap();
        let orchestrator = Orchestrator::new(Arc::new(MockProvider::ok()));

        let report = orchestrator.run(&[], temp.path()).await;
        assert_eq!(report.status, RunStatus::Empty);
        assert!(report.outcomes.is_empty());
        // No artifacts written
        assert!(!temp.path().join(".ai").exists());
    }

    #[tokio::test]
    async fn test_all_tasks_succeed_and_write_artifacts() {
        let temp = TempDir::new().unwrap();
        let orchestrator = Orchestrator::new(Arc::new(MockProvider::ok()));

        let specs = specs(AnalysisFlags::default(), temp.path());
        let report = orchestrator.run(&specs, temp.path()).await;

        assert_eq!(report.status, RunStatus::Complete);
        assert_eq!(report.outcomes.len(), 5);
        for outcome in &report.outcomes {
            assert_eq!(outcome.status, TaskStatus::Succeeded);
            assert!(temp.path().join(&outcome.artifact).exists());
        }
        assert_eq!(report.total_usage().total(), 5 * 150);
    }

    #[tokio::test]
    async fn test_one_failure_never_flips_sibling_status() {
        let temp = TempDir::new().unwrap();
        let orchestrator = Orchestrator::new(Arc::new(MockProvider::failing_on(vec![
            "Dependency analysis",
        ])));

        let specs = specs(AnalysisFlags::default(), temp.path());
        let report = orchestrator.run(&specs, temp.path()).await;

        assert_eq!(report.status, RunStatus::Partial);
        for outcome in &report.outcomes {
            match outcome.kind {
                TaskKind::Dependencies => {
                    assert_eq!(outcome.status, TaskStatus::Failed);
                    assert!(
                        outcome
                            .error
                            .as_deref()
                            .unwrap()
                            .contains("simulated provider failure")
                    );
                }
                _ => assert_eq!(outcome.status, TaskStatus::Succeeded),
            }
        }
    }

    #[tokio::test]
    async fn test_two_tasks_one_failing_scenario() {
        let temp = TempDir::new().unwrap();
        let orchestrator = Orchestrator::new(Arc::new(MockProvider::failing_on(vec![
            "Code structure analysis",
        ])));

        let flags = AnalysisFlags {
            exclude_data_flow: true,
            exclude_request_flow: true,
            exclude_api_analysis: true,
            ..AnalysisFlags::default()
        };
        let specs = specs(flags, temp.path());
        assert_eq!(specs.len(), 2);

        let report = orchestrator.run(&specs, temp.path()).await;
        assert_eq!(report.status, RunStatus::Partial);
        assert_eq!(report.outcomes[0].status, TaskStatus::Failed);
        assert_eq!(report.outcomes[1].status, TaskStatus::Succeeded);
        assert!(temp.path().join(&report.outcomes[1].artifact).exists());
    }

    #[tokio::test]
    async fn test_report_order_is_configured_order_not_completion_order() {
        let temp = TempDir::new().unwrap();
        // First configured task finishes last
        let provider = MockProvider {
            fail_markers: Vec::new(),
            delay_markers: vec!["Code structure analysis"],
        };
        let orchestrator = Orchestrator::new(Arc::new(provider));

        let specs = specs(AnalysisFlags::default(), temp.path());
        let report = orchestrator.run(&specs, temp.path()).await;

        let kinds: Vec<TaskKind> = report.outcomes.iter().map(|o| o.kind).collect();
        assert_eq!(kinds, TaskKind::ANALYSES.to_vec());
    }

    proptest::proptest! {
        /// For every subset S of enabled tasks, the report contains exactly
        /// |S| outcomes in configured order.
        #[test]
        fn prop_subset_cardinality_and_order(
            ex_structure: bool,
            ex_deps: bool,
            ex_data: bool,
            ex_request: bool,
            ex_api: bool,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let temp = TempDir::new().unwrap();
                let flags = AnalysisFlags {
                    exclude_code_structure: ex_structure,
                    exclude_dependencies: ex_deps,
                    exclude_data_flow: ex_data,
                    exclude_request_flow: ex_request,
                    exclude_api_analysis: ex_api,
                };
                let specs = TaskSpec::analysis_specs(&flags, temp.path());
                let expected: Vec<TaskKind> =
                    specs.iter().map(|s| s.kind).collect();

                let orchestrator = Orchestrator::new(Arc::new(MockProvider::ok()));
                let report = orchestrator.run(&specs, temp.path()).await;

                let got: Vec<TaskKind> =
                    report.outcomes.iter().map(|o| o.kind).collect();
                assert_eq!(got, expected);
                if expected.is_empty() {
                    assert_eq!(report.status, RunStatus::Empty);
                } else {
                    assert_eq!(report.status, RunStatus::Complete);
                }
            });
        }
    }
}
