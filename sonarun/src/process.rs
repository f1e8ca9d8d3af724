//! Subprocess execution.
//!
//! Every external program (the container orchestrator, the scanner) is started
//! through a [`CommandRunner`], which captures exit status and both output
//! streams verbatim.

use log::debug;
use std::future::Future;
use std::io;
use std::process::Stdio;

/// Placeholder printed instead of secret argument values
const REDACTED: &str = "****";

/// Error types for supervised subprocesses
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("'{command}' exited with status {code:?}: {stderr}")]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// A program invocation: argv plus extra environment
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
    /// Values never shown by the `Display` rendering
    secrets: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Mark a value as secret so it is masked when the command is logged.
    #[must_use]
    pub fn secret(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.secrets.push(value);
        }
        self
    }

    /// Check whether any argument contains the given fragment
    #[must_use]
    pub fn has_arg(&self, fragment: &str) -> bool {
        self.args.iter().any(|a| a.contains(fragment))
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut rendered = self.program.clone();
        for arg in &self.args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        for secret in &self.secrets {
            rendered = rendered.replace(secret.as_str(), REDACTED);
        }
        f.write_str(&rendered)
    }
}

/// Captured result of a finished subprocess
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandOutput {
    /// Exit code; `None` when terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Convert a non-zero exit into an error carrying stderr
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::NonZeroExit`] unless the exit code is 0.
    pub fn into_result(self, spec: &CommandSpec) -> Result<CommandOutput, ProcessError> {
        if self.success() {
            Ok(self)
        } else {
            Err(ProcessError::NonZeroExit {
                command: spec.to_string(),
                code: self.code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Runs programs to completion.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> impl Future<Output = io::Result<CommandOutput>>;
}

/// Runs programs with `tokio::process`, inheriting the current environment
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
        debug!("⚙️  Executing: {spec}");

        let output = tokio::process::Command::new(&spec.program)
            .args(&spec.args)
            .envs(spec.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(
            "⚙️  '{}' finished with {:?} ({} bytes stdout, {} bytes stderr)",
            spec.program,
            result.code,
            result.stdout.len(),
            result.stderr.len()
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_redacts_secrets() {
        let spec = CommandSpec::new("docker")
            .args(["compose", "run", "-Dsonar.login=squ_abc"])
            .secret("squ_abc");
        assert_eq!(spec.to_string(), "docker compose run -Dsonar.login=****");
    }

    #[test]
    fn test_empty_secret_is_ignored() {
        let spec = CommandSpec::new("echo").arg("hello").secret("");
        assert_eq!(spec.to_string(), "echo hello");
    }

    #[test]
    fn test_into_result() {
        let spec = CommandSpec::new("docker").arg("compose");
        let ok = CommandOutput {
            code: Some(0),
            ..CommandOutput::default()
        };
        assert!(ok.into_result(&spec).is_ok());

        let failed = CommandOutput {
            code: Some(1),
            stdout: String::new(),
            stderr: "no such service\n".to_string(),
        };
        match failed.into_result(&spec) {
            Err(ProcessError::NonZeroExit { code, stderr, .. }) => {
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "no such service");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tokio_runner_captures_streams() {
        let spec = CommandSpec::new("sh")
            .args(["-c", "echo out; echo err 1>&2; exit 3"]);
        let output = TokioCommandRunner.run(&spec).await.unwrap();
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn test_tokio_runner_missing_program() {
        let spec = CommandSpec::new("definitely-not-a-real-program-sonarun");
        assert!(TokioCommandRunner.run(&spec).await.is_err());
    }
}
