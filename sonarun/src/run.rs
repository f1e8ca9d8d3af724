//! The analysis run: phases in order, teardown always.

use chrono::Local;
use futures::FutureExt;
use log::{error, info, warn};
use serde::Serialize;
use sonarqube_api::{SonarClient, SonarError};
use std::panic::{AssertUnwindSafe, resume_unwind};
use std::path::PathBuf;

use crate::backend::Backend;
use crate::collector::collect;
use crate::config::{ConfigError, ConfigOverrides, RunConfig};
use crate::credentials::{AccessToken, CredentialError, issue_token, revoke_token};
use crate::output::{OutputError, ResultWriter};
use crate::poll::{Sleeper, TokioSleeper};
use crate::process::{CommandRunner, ProcessError, TokioCommandRunner};
use crate::profile::ProjectProfile;
use crate::readiness::wait_until_ready;
use crate::scanner::{ScanRunner, has_success_marker};
use crate::supervisor::{ComposeCommand, ComposeSupervisor, Supervisor};
use crate::task::{TaskError, TaskTracker, TrackOutcome};

/// Error types for a run, one per failure class
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Backend client setup failed: {0}")]
    Client(#[source] SonarError),

    #[error("Backend did not become ready after {attempts} attempts")]
    Readiness { attempts: u32 },

    #[error("Authentication failed: {0}")]
    Authentication(#[from] CredentialError),

    #[error("Analysis failed: {0}")]
    Job(#[from] TaskError),

    #[error("Metrics collection failed: {0}")]
    Metrics(#[source] SonarError),

    #[error("Saving results failed: {0}")]
    Output(#[from] OutputError),

    #[error("Container orchestration failed: {0}")]
    Process(#[from] ProcessError),
}

impl RunError {
    /// Process exit code for this failure class
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Configuration(_) | RunError::Client(_) => 2,
            RunError::Readiness { .. } => 3,
            RunError::Authentication(_) => 4,
            RunError::Job(_) => 5,
            RunError::Metrics(_) => 6,
            RunError::Output(_) => 7,
            RunError::Process(_) => 8,
        }
    }
}

/// What a successful run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub output_file: PathBuf,
    pub task: TrackOutcome,
    pub measures: usize,
    /// Best-effort problems that did not stop the run
    pub warnings: Vec<String>,
}

/// External collaborators of a run
pub struct Components<B, P, R, S> {
    pub backend: B,
    pub supervisor: P,
    pub runner: R,
    pub sleeper: S,
}

/// Drives one analysis run against its collaborators
pub struct Orchestrator<B, P, R, S> {
    config: RunConfig,
    backend: B,
    supervisor: P,
    scanner: ScanRunner<R>,
    sleeper: S,
}

impl<B, P, R, S> Orchestrator<B, P, R, S>
where
    B: Backend,
    P: Supervisor,
    R: CommandRunner,
    S: Sleeper,
{
    pub fn new(config: RunConfig, components: Components<B, P, R, S>) -> Self {
        let scanner = ScanRunner::new(ComposeCommand::new(config.compose.clone()), components.runner);
        Self {
            config,
            backend: components.backend,
            supervisor: components.supervisor,
            scanner,
            sleeper: components.sleeper,
        }
    }

    /// Run every phase, then stop the containers exactly once.
    ///
    /// A teardown failure is logged and never replaces the run's own result.
    /// A panicking phase is torn down too, then the panic continues.
    ///
    /// # Errors
    ///
    /// Returns the [`RunError`] of the first phase that failed.
    ///
    /// # Panics
    ///
    /// Re-raises a panic from any phase once the containers are stopped.
    pub async fn execute(&self) -> Result<RunSummary, RunError> {
        info!("🚀 Starting analysis run for '{}'", self.config.project);

        let outcome = AssertUnwindSafe(self.run_phases()).catch_unwind().await;

        if let Err(e) = self.supervisor.stop().await {
            warn!("⚠️  Teardown failed: {e}");
        }

        let result = match outcome {
            Ok(result) => result,
            Err(panic) => {
                error!("❌ Analysis run aborted by a panic");
                resume_unwind(panic);
            }
        };

        match &result {
            Ok(summary) => info!(
                "🎉 Analysis run finished: {} measures written to {}",
                summary.measures,
                summary.output_file.display()
            ),
            Err(e) => error!("❌ Analysis run failed: {e}"),
        }
        result
    }

    async fn run_phases(&self) -> Result<RunSummary, RunError> {
        self.supervisor.start().await?;

        let readiness = &self.config.polling.readiness;
        if !wait_until_ready(&self.backend, readiness, &self.sleeper).await {
            return Err(RunError::Readiness {
                attempts: readiness.max_attempts,
            });
        }

        let token = issue_token(&self.backend).await?;
        let result = self.analyze(&token).await;
        revoke_token(&self.backend, &token).await;
        result
    }

    async fn analyze(&self, token: &AccessToken) -> Result<RunSummary, RunError> {
        let config = &self.config;
        let key = config.project.key();

        let profile = ProjectProfile::detect(&config.project_path, &config.flutter_reports);
        let mut warnings = profile.preprocess(&self.backend, &config.project_path).await;

        let output = self.scanner.run(config, &profile, token).await;
        if !has_success_marker(&output) {
            let warning = "Scanner output contains no success marker".to_string();
            warn!("⚠️  {warning}");
            warnings.push(warning);
        }

        let tracker = TaskTracker::new(
            &self.backend,
            &self.sleeper,
            config.polling.task.clone(),
            config.polling.fallback_delay,
        );
        let task = tracker.track(&output, key).await?;

        let record = collect(&self.backend, key, &config.metrics)
            .await
            .map_err(RunError::Metrics)?;

        let writer = ResultWriter::new(&config.output_path, config.participant.as_str());
        let output_file = writer.write(&record, &config.metrics, &Local::now())?;

        Ok(RunSummary {
            output_file,
            task,
            measures: record.len(),
            warnings,
        })
    }
}

/// Resolve the configuration, build the collaborators, then run.
///
/// Nothing is started when resolution fails.
///
/// # Errors
///
/// Returns [`RunError::Configuration`] from `resolve`, any error from `build`,
/// or the run's own error.
pub async fn execute_with<F, C, B, P, R, S>(resolve: F, build: C) -> Result<RunSummary, RunError>
where
    F: FnOnce() -> Result<RunConfig, ConfigError>,
    C: FnOnce(&RunConfig) -> Result<Components<B, P, R, S>, RunError>,
    B: Backend,
    P: Supervisor,
    R: CommandRunner,
    S: Sleeper,
{
    let config = resolve()?;
    config.log_summary();
    let components = build(&config)?;
    Orchestrator::new(config, components).execute().await
}

/// Full run against real containers and the real backend.
///
/// # Errors
///
/// See [`execute_with`].
pub async fn run(overrides: &ConfigOverrides) -> Result<RunSummary, RunError> {
    execute_with(
        || RunConfig::resolve(overrides),
        |config| {
            let backend = SonarClient::new(config.sonar_config()).map_err(RunError::Client)?;
            let supervisor = ComposeSupervisor::new(
                ComposeCommand::new(config.compose.clone()),
                TokioCommandRunner,
            );
            Ok(Components {
                backend,
                supervisor,
                runner: TokioCommandRunner,
                sleeper: TokioSleeper,
            })
        },
    )
    .await
}
