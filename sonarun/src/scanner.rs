//! Invocation of the containerized scanning tool.

use log::{debug, error, info, warn};

use crate::config::RunConfig;
use crate::credentials::AccessToken;
use crate::process::{CommandOutput, CommandRunner, CommandSpec};
use crate::profile::ProjectProfile;
use crate::supervisor::ComposeCommand;

/// Lines the scanner prints when the analysis was uploaded
pub const SUCCESS_MARKERS: &[&str] = &["EXECUTION SUCCESS", "ANALYSIS SUCCESSFUL"];

/// Mount point of projects inside the scanner container
const CONTAINER_SOURCE_ROOT: &str = "/usr/src";

/// Check the captured scanner output for a success marker.
#[must_use]
pub fn has_success_marker(output: &CommandOutput) -> bool {
    [&output.stdout, &output.stderr]
        .iter()
        .any(|stream| SUCCESS_MARKERS.iter().any(|marker| stream.contains(marker)))
}

/// Runs the scanner service of the container group against the project
pub struct ScanRunner<R> {
    compose: ComposeCommand,
    runner: R,
}

impl<R: CommandRunner> ScanRunner<R> {
    pub fn new(compose: ComposeCommand, runner: R) -> Self {
        Self { compose, runner }
    }

    /// Build the scanner invocation for one project.
    pub fn build_command(
        &self,
        config: &RunConfig,
        profile: &ProjectProfile,
        token: &AccessToken,
    ) -> CommandSpec {
        let key = config.project.key();
        let mount = format!(
            "{}:{CONTAINER_SOURCE_ROOT}/{key}",
            config.project_path.display()
        );

        let mut properties = vec![
            ("sonar.projectKey".to_string(), key.to_string()),
            ("sonar.projectName".to_string(), key.to_string()),
        ];
        properties.extend(profile.scanner_properties(key, &config.project_path));
        properties.push(("sonar.host.url".to_string(), config.internal_url.clone()));
        properties.push(("sonar.login".to_string(), token.as_str().to_string()));
        if !config.exclusions.is_empty() {
            properties.push(("sonar.exclusions".to_string(), config.exclusions.join(",")));
        }
        properties.push(("sonar.scm.disabled".to_string(), "true".to_string()));

        self.compose
            .command([
                "run",
                "--rm",
                "-e",
                "SONAR_TOKEN",
                "-v",
                mount.as_str(),
                self.compose.settings().scanner_service.as_str(),
            ])
            .args(properties.into_iter().map(|(k, v)| format!("-D{k}={v}")))
            .env("SONAR_TOKEN", token.as_str())
            .secret(token.as_str())
    }

    /// Run the scanner and report what happened.
    ///
    /// Never fails: a scanner that cannot be started yields an output without
    /// exit code whose stderr holds the spawn error.
    pub async fn run(
        &self,
        config: &RunConfig,
        profile: &ProjectProfile,
        token: &AccessToken,
    ) -> CommandOutput {
        let spec = self.build_command(config, profile, token);
        info!(
            "🔍 Running scanner for '{}' ({} profile)",
            config.project,
            profile.name()
        );
        debug!("   Command: {spec}");

        match self.runner.run(&spec).await {
            Ok(output) => {
                if output.success() {
                    info!("✅ Scanner finished");
                } else {
                    warn!("⚠️  Scanner exited with status {:?}", output.code);
                }
                output
            }
            Err(e) => {
                error!("❌ Failed to start scanner: {e}");
                CommandOutput {
                    code: None,
                    stdout: String::new(),
                    stderr: e.to_string(),
                }
            }
        }
    }
}
