//! Lifecycle of the container group hosting the backend.

use log::{info, warn};
use std::future::Future;

use crate::config::ComposeSettings;
use crate::process::{CommandRunner, CommandSpec, ProcessError};

/// Starts and stops the backend's container group.
pub trait Supervisor {
    /// Bring the group up in detached mode.
    fn start(&self) -> impl Future<Output = Result<(), ProcessError>>;

    /// Tear the group down. Safe to call when it was never started.
    fn stop(&self) -> impl Future<Output = Result<(), ProcessError>>;
}

/// Base `docker compose` invocation shared by the supervisor and the scanner
#[derive(Debug, Clone)]
pub struct ComposeCommand {
    settings: ComposeSettings,
}

impl ComposeCommand {
    pub fn new(settings: ComposeSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &ComposeSettings {
        &self.settings
    }

    /// `docker compose [-f FILE] [-p NAME] <subcommand...>`
    pub fn command<I, S>(&self, subcommand: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut spec = CommandSpec::new("docker").arg("compose");
        if let Some(file) = &self.settings.file {
            spec = spec.arg("-f").arg(file.display().to_string());
        }
        if let Some(name) = &self.settings.project_name {
            spec = spec.arg("-p").arg(name.as_str());
        }
        spec.args(subcommand)
    }
}

/// [`Supervisor`] driving `docker compose up -d` / `docker compose down`
pub struct ComposeSupervisor<R> {
    compose: ComposeCommand,
    runner: R,
}

impl<R: CommandRunner> ComposeSupervisor<R> {
    pub fn new(compose: ComposeCommand, runner: R) -> Self {
        Self { compose, runner }
    }

    async fn execute(&self, spec: CommandSpec) -> Result<(), ProcessError> {
        let output = self
            .runner
            .run(&spec)
            .await
            .map_err(|source| ProcessError::Spawn {
                command: spec.to_string(),
                source,
            })?;
        output.into_result(&spec).map(|_| ())
    }
}

impl<R: CommandRunner> Supervisor for ComposeSupervisor<R> {
    async fn start(&self) -> Result<(), ProcessError> {
        info!("🐳 Starting containers");
        self.execute(self.compose.command(["up", "-d"])).await?;
        info!("✅ Containers started");
        Ok(())
    }

    async fn stop(&self) -> Result<(), ProcessError> {
        info!("🐳 Stopping containers");
        match self.execute(self.compose.command(["down"])).await {
            Ok(()) => {
                info!("✅ Containers stopped");
                Ok(())
            }
            Err(e) => {
                warn!("⚠️  Container teardown failed: {e}");
                Err(e)
            }
        }
    }
}
