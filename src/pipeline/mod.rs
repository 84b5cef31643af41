//! Analysis Orchestration Core
//!
//! Task specs, the concurrent orchestrator, and the artifact validator.
//! One orchestration run executes the enabled task units against a single
//! repository and yields an ordered, validated run report.

mod orchestrator;
mod task;
mod validator;

pub use orchestrator::Orchestrator;
pub use task::{RunReport, RunStatus, TaskKind, TaskOutcome, TaskSpec, TaskStatus};
pub use validator::validate_artifacts;
