//! # sonarun
//!
//! Automates one SonarQube analysis run: starts the backend's containers,
//! waits for readiness, issues a short-lived token, runs the containerized
//! scanner, tracks the resulting compute engine task, collects the project's
//! measures and writes them to a dated CSV file. The containers are always
//! stopped at the end, whatever happened before.

pub mod backend;
pub mod cli;
pub mod collector;
pub mod config;
pub mod credentials;
pub mod metrics;
pub mod output;
pub mod poll;
pub mod process;
pub mod profile;
pub mod readiness;
pub mod run;
pub mod scanner;
pub mod supervisor;
pub mod task;

#[cfg(test)]
pub mod testing;

pub use backend::Backend;
pub use cli::{Cli, Commands, RunArgs};
pub use collector::{MetricEntry, MetricRecord, collect};
pub use config::{ConfigError, ConfigOverrides, ProjectIdentity, RunConfig, load_env_files};
pub use credentials::{AccessToken, CredentialError, issue_token, revoke_token};
pub use metrics::{DEFAULT_METRICS, default_metrics};
pub use output::{OutputError, ResultWriter};
pub use poll::{Backoff, PollPolicy, RecordingSleeper, Sleeper, TokioSleeper};
pub use process::{CommandOutput, CommandRunner, CommandSpec, ProcessError, TokioCommandRunner};
pub use profile::ProjectProfile;
pub use readiness::wait_until_ready;
pub use run::{Components, Orchestrator, RunError, RunSummary, execute_with, run};
pub use scanner::{ScanRunner, has_success_marker};
pub use supervisor::{ComposeCommand, ComposeSupervisor, Supervisor};
pub use task::{TaskError, TaskTracker, TrackOutcome, extract_task_id};
