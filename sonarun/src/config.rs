//! Run configuration: environment loading, validation and project identity.
//!
//! A [`RunConfig`] is resolved once per run, before any container is started.
//! Resolution fails fast on the first missing or invalid mandatory setting.

use log::{debug, info, warn};
use sonarqube_api::{SecurePassword, SonarConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::metrics::{default_metrics, parse_metric_list};
use crate::poll::{Backoff, PollPolicy};

pub const ENV_HOST_URL: &str = "SONAR_HOST_URL";
pub const ENV_INTERNAL_URL: &str = "SONAR_INTERNAL_URL";
pub const ENV_USERNAME: &str = "SONAR_USERNAME";
pub const ENV_PASSWORD: &str = "SONAR_PASSWORD";
pub const ENV_OUTPUT_PATH: &str = "OUTPUT_PATH";
pub const ENV_PARTICIPANT: &str = "PARTICIPANT";
pub const ENV_PROJECT_PATH: &str = "PROJECT_PATH";
pub const ENV_EXCLUSIONS: &str = "SONAR_EXCLUSIONS";
pub const ENV_METRICS: &str = "SONAR_METRICS";
pub const ENV_COMPOSE_FILE: &str = "COMPOSE_FILE";
pub const ENV_COMPOSE_PROJECT_NAME: &str = "COMPOSE_PROJECT_NAME";
pub const ENV_SCANNER_SERVICE: &str = "SONAR_SCANNER_SERVICE";
pub const ENV_FLUTTER_COVERAGE_REPORT: &str = "FLUTTER_COVERAGE_REPORT";
pub const ENV_FLUTTER_TESTS_REPORT: &str = "FLUTTER_TESTS_REPORT";
pub const ENV_DART_ANALYSIS_REPORT: &str = "DART_ANALYSIS_REPORT";
pub const ENV_READY_MAX_ATTEMPTS: &str = "SONARUN_READY_MAX_ATTEMPTS";
pub const ENV_READY_INTERVAL_SECS: &str = "SONARUN_READY_INTERVAL_SECS";
pub const ENV_TASK_MAX_ATTEMPTS: &str = "SONARUN_TASK_MAX_ATTEMPTS";
pub const ENV_TASK_INTERVAL_SECS: &str = "SONARUN_TASK_INTERVAL_SECS";
pub const ENV_FALLBACK_DELAY_SECS: &str = "SONARUN_FALLBACK_DELAY_SECS";
pub const ENV_BACKOFF_MULTIPLIER: &str = "SONARUN_BACKOFF_MULTIPLIER";
pub const ENV_MAX_INTERVAL_SECS: &str = "SONARUN_MAX_INTERVAL_SECS";
pub const ENV_DISABLE_CERT_VALIDATION: &str = "SONARUN_DISABLE_CERT_VALIDATION";
pub const ENV_CONNECT_TIMEOUT: &str = "SONARUN_CONNECT_TIMEOUT";
pub const ENV_REQUEST_TIMEOUT: &str = "SONARUN_REQUEST_TIMEOUT";

/// Environment files loaded by default, in order
pub const DEFAULT_ENV_FILES: &[&str] = &[".env", "app/.env"];

const DEFAULT_INTERNAL_URL: &str = "http://sonarqube:9000";
const DEFAULT_SCANNER_SERVICE: &str = "sonar-scanner-cli";
const DEFAULT_MAX_INTERVAL_SECS: u64 = 120;

/// Error types for configuration resolution
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting: {0} is not defined or is empty")]
    Missing(&'static str),

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },

    #[error("{field} must be an existing folder, '{path}' does not exist")]
    NotADirectory { field: &'static str, path: String },

    #[error("{field} must be an existing file, '{path}' does not exist")]
    NotAFile { field: &'static str, path: String },

    #[error("Failed to load environment file '{path}': {message}")]
    EnvFile { path: String, message: String },
}

/// Load `.env` style files into the process environment.
///
/// Existing variables are never overwritten. Missing default files are
/// skipped; an explicitly requested file must exist.
///
/// # Errors
///
/// Returns [`ConfigError::EnvFile`] if an explicit file is missing or any file
/// cannot be parsed.
pub fn load_env_files(explicit: Option<&Path>) -> Result<(), ConfigError> {
    if let Some(path) = explicit {
        dotenvy::from_path(path).map_err(|e| ConfigError::EnvFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        info!("📄 Loaded environment from {}", path.display());
        return Ok(());
    }

    for candidate in DEFAULT_ENV_FILES {
        match dotenvy::from_path(candidate) {
            Ok(()) => debug!("📄 Loaded environment from {candidate}"),
            Err(dotenvy::Error::Io(_)) => debug!("📄 No environment file at {candidate}"),
            Err(e) => {
                return Err(ConfigError::EnvFile {
                    path: (*candidate).to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Stable key of the project under analysis: final segment of the project path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectIdentity(String);

impl ProjectIdentity {
    /// Derive the key from a project path, accepting `/` and `\` separators
    /// and ignoring trailing separators.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if no non-empty segment remains.
    pub fn from_path(project_path: &str) -> Result<Self, ConfigError> {
        let normalized = project_path.trim().replace('\\', "/");
        let key = normalized
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();

        if key.is_empty() {
            return Err(ConfigError::Invalid {
                field: ENV_PROJECT_PATH,
                message: format!("cannot derive a project key from '{project_path}'"),
            });
        }
        Ok(Self(key.to_string()))
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProjectIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Report files consumed by the Flutter profile, as configured
#[derive(Debug, Clone, PartialEq)]
pub struct FlutterReportPaths {
    pub coverage: String,
    pub tests: String,
    pub analysis: String,
}

impl Default for FlutterReportPaths {
    fn default() -> Self {
        Self {
            coverage: "coverage/lcov.info".to_string(),
            tests: "tests.output".to_string(),
            analysis: "analysis.txt".to_string(),
        }
    }
}

/// How the container group is addressed
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeSettings {
    pub file: Option<PathBuf>,
    pub project_name: Option<String>,
    pub scanner_service: String,
}

impl Default for ComposeSettings {
    fn default() -> Self {
        Self {
            file: None,
            project_name: None,
            scanner_service: DEFAULT_SCANNER_SERVICE.to_string(),
        }
    }
}

/// Retry budgets of the two pollers
#[derive(Debug, Clone, PartialEq)]
pub struct PollingSettings {
    pub readiness: PollPolicy,
    pub task: PollPolicy,
    /// Grace period used when no task id could be recovered
    pub fallback_delay: Duration,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            readiness: PollPolicy::fixed(30, Duration::from_secs(10)),
            task: PollPolicy::fixed(60, Duration::from_secs(10)),
            fallback_delay: Duration::from_secs(30),
        }
    }
}

/// Settings overridden on the command line, keyed by environment variable name
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides(Vec<(&'static str, String)>);

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an override when a value was supplied.
    pub fn set(&mut self, key: &'static str, value: Option<String>) {
        if let Some(value) = value {
            self.0.push((key, value));
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Immutable configuration of one analysis run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Backend URL reachable from this process
    pub host_url: String,
    /// Backend URL reachable from inside the scanner container
    pub internal_url: String,
    pub username: String,
    pub password: SecurePassword,
    pub project_path: PathBuf,
    pub project: ProjectIdentity,
    pub output_path: PathBuf,
    pub participant: String,
    pub exclusions: Vec<String>,
    pub metrics: Vec<String>,
    pub flutter_reports: FlutterReportPaths,
    pub compose: ComposeSettings,
    pub polling: PollingSettings,
    pub connect_timeout: u64,
    pub request_timeout: u64,
    /// Verify the backend's TLS certificate
    pub validate_certificates: bool,
}

impl RunConfig {
    /// Resolve from command line overrides and the process environment.
    ///
    /// # Errors
    ///
    /// See [`RunConfig::from_lookup`].
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| {
            overrides
                .get(key)
                .map(str::to_string)
                .or_else(|| std::env::var(key).ok())
        })
    }

    /// Resolve from an arbitrary key/value source.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered: a missing mandatory
    /// setting, an unparseable URL or number, an invalid exclusion pattern, a
    /// project/output path that is not an existing directory, or a compose
    /// file that does not exist.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &'static str| lookup(key).map(|v| v.trim().to_string());
        let required = |key: &'static str| {
            value(key)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let optional = |key: &'static str| value(key).filter(|v| !v.is_empty());

        let host_url = validate_url(ENV_HOST_URL, &required(ENV_HOST_URL)?)?;
        let username = required(ENV_USERNAME)?;
        let password = lookup(ENV_PASSWORD)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(ENV_PASSWORD))?;
        let raw_project_path = required(ENV_PROJECT_PATH)?;
        let raw_output_path = required(ENV_OUTPUT_PATH)?;
        let participant = required(ENV_PARTICIPANT)?;

        let internal_url = match optional(ENV_INTERNAL_URL) {
            Some(url) => validate_url(ENV_INTERNAL_URL, &url)?,
            None => DEFAULT_INTERNAL_URL.to_string(),
        };

        let project = ProjectIdentity::from_path(&raw_project_path)?;
        let project_path = existing_directory(ENV_PROJECT_PATH, &raw_project_path)?;
        let output_path = existing_directory(ENV_OUTPUT_PATH, &raw_output_path)?;

        let exclusions = match optional(ENV_EXCLUSIONS) {
            Some(raw) => validate_exclusions(&raw)?,
            None => Vec::new(),
        };

        let metrics = match optional(ENV_METRICS) {
            Some(raw) => {
                let parsed = parse_metric_list(&raw);
                if parsed.is_empty() {
                    return Err(ConfigError::Invalid {
                        field: ENV_METRICS,
                        message: "no metric keys given".to_string(),
                    });
                }
                parsed
            }
            None => default_metrics(),
        };

        let defaults = FlutterReportPaths::default();
        let flutter_reports = FlutterReportPaths {
            coverage: optional(ENV_FLUTTER_COVERAGE_REPORT).unwrap_or(defaults.coverage),
            tests: optional(ENV_FLUTTER_TESTS_REPORT).unwrap_or(defaults.tests),
            analysis: optional(ENV_DART_ANALYSIS_REPORT).unwrap_or(defaults.analysis),
        };

        let compose = ComposeSettings {
            file: optional(ENV_COMPOSE_FILE)
                .map(|raw| existing_file(ENV_COMPOSE_FILE, &raw))
                .transpose()?,
            project_name: optional(ENV_COMPOSE_PROJECT_NAME),
            scanner_service: optional(ENV_SCANNER_SERVICE)
                .unwrap_or_else(|| DEFAULT_SCANNER_SERVICE.to_string()),
        };

        let polling_defaults = PollingSettings::default();
        let mut polling = PollingSettings {
            readiness: PollPolicy::fixed(
                parse_number(ENV_READY_MAX_ATTEMPTS, optional(ENV_READY_MAX_ATTEMPTS))?
                    .unwrap_or(polling_defaults.readiness.max_attempts),
                parse_number(ENV_READY_INTERVAL_SECS, optional(ENV_READY_INTERVAL_SECS))?
                    .map_or(polling_defaults.readiness.interval, Duration::from_secs),
            ),
            task: PollPolicy::fixed(
                parse_number(ENV_TASK_MAX_ATTEMPTS, optional(ENV_TASK_MAX_ATTEMPTS))?
                    .unwrap_or(polling_defaults.task.max_attempts),
                parse_number(ENV_TASK_INTERVAL_SECS, optional(ENV_TASK_INTERVAL_SECS))?
                    .map_or(polling_defaults.task.interval, Duration::from_secs),
            ),
            fallback_delay: parse_number(ENV_FALLBACK_DELAY_SECS, optional(ENV_FALLBACK_DELAY_SECS))?
                .map_or(polling_defaults.fallback_delay, Duration::from_secs),
        };

        for (field, policy) in [
            (ENV_READY_MAX_ATTEMPTS, &polling.readiness),
            (ENV_TASK_MAX_ATTEMPTS, &polling.task),
        ] {
            if policy.max_attempts == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    message: "attempt budget must be at least 1".to_string(),
                });
            }
        }

        // Growth applies to both pollers; a multiplier of 1 keeps the interval fixed
        let multiplier: Option<f64> =
            parse_number(ENV_BACKOFF_MULTIPLIER, optional(ENV_BACKOFF_MULTIPLIER))?;
        let max_interval = parse_number(ENV_MAX_INTERVAL_SECS, optional(ENV_MAX_INTERVAL_SECS))?
            .map_or(Duration::from_secs(DEFAULT_MAX_INTERVAL_SECS), Duration::from_secs);
        match multiplier {
            Some(m) if !m.is_finite() || m < 1.0 => {
                return Err(ConfigError::Invalid {
                    field: ENV_BACKOFF_MULTIPLIER,
                    message: format!("'{m}' must be a number of at least 1"),
                });
            }
            Some(m) if m > 1.0 => {
                polling.readiness = polling.readiness.with_exponential_backoff(m, max_interval);
                polling.task = polling.task.with_exponential_backoff(m, max_interval);
            }
            _ => {}
        }

        let connect_timeout =
            parse_number(ENV_CONNECT_TIMEOUT, optional(ENV_CONNECT_TIMEOUT))?.unwrap_or(10);
        let request_timeout =
            parse_number(ENV_REQUEST_TIMEOUT, optional(ENV_REQUEST_TIMEOUT))?.unwrap_or(30);

        Ok(Self {
            host_url,
            internal_url,
            username,
            password: SecurePassword::new(password),
            project_path,
            project,
            output_path,
            participant,
            exclusions,
            metrics,
            flutter_reports,
            compose,
            polling,
            connect_timeout,
            request_timeout,
            validate_certificates: optional(ENV_DISABLE_CERT_VALIDATION).is_none(),
        })
    }

    /// Client configuration for the backend's external URL
    #[must_use]
    pub fn sonar_config(&self) -> SonarConfig {
        let config = SonarConfig::new(
            self.host_url.clone(),
            self.username.clone(),
            self.password.as_str().to_string(),
        )
        .with_connect_timeout(self.connect_timeout)
        .with_request_timeout(self.request_timeout);
        if self.validate_certificates {
            config
        } else {
            config.with_certificate_validation_disabled()
        }
    }

    /// Log a redacted overview of the resolved settings
    pub fn log_summary(&self) {
        info!("🔧 Run configuration:");
        info!("   Backend URL: {}", self.host_url);
        info!("   Backend URL (scanner): {}", self.internal_url);
        info!("   Username: {}", self.username);
        info!("   Password: [REDACTED]");
        info!("   Project: {} ({})", self.project, self.project_path.display());
        info!("   Output directory: {}", self.output_path.display());
        info!("   Participant: {}", self.participant);
        if self.exclusions.is_empty() {
            info!("   Exclusions: none");
        } else {
            info!("   Exclusions: {}", self.exclusions.join(","));
        }
        info!("   Metrics: {} keys", self.metrics.len());
        info!(
            "   Readiness budget: {} x {:?}",
            self.polling.readiness.max_attempts, self.polling.readiness.interval
        );
        info!(
            "   Task budget: {} x {:?}",
            self.polling.task.max_attempts, self.polling.task.interval
        );
        if let Backoff::Exponential {
            multiplier,
            max_interval,
        } = &self.polling.task.backoff
        {
            info!("   Backoff: x{multiplier} up to {max_interval:?}");
        }
        if !self.validate_certificates {
            warn!("⚠️  Certificate validation is disabled");
        }
    }
}

fn validate_url(field: &'static str, raw: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        field,
        message: format!("'{raw}' is not a valid URL: {e}"),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            field,
            message: format!("'{raw}' must use http:// or https://"),
        });
    }
    Ok(raw.trim_end_matches('/').to_string())
}

fn existing_directory(field: &'static str, raw: &str) -> Result<PathBuf, ConfigError> {
    let path = Path::new(raw);
    if !path.is_dir() {
        return Err(ConfigError::NotADirectory {
            field,
            path: raw.to_string(),
        });
    }
    std::path::absolute(path).map_err(|e| ConfigError::Invalid {
        field,
        message: format!("cannot resolve '{raw}': {e}"),
    })
}

fn existing_file(field: &'static str, raw: &str) -> Result<PathBuf, ConfigError> {
    let path = Path::new(raw);
    if !path.is_file() {
        return Err(ConfigError::NotAFile {
            field,
            path: raw.to_string(),
        });
    }
    std::path::absolute(path).map_err(|e| ConfigError::Invalid {
        field,
        message: format!("cannot resolve '{raw}': {e}"),
    })
}

fn validate_exclusions(raw: &str) -> Result<Vec<String>, ConfigError> {
    let patterns: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    for pattern in &patterns {
        glob::Pattern::new(pattern).map_err(|e| ConfigError::Invalid {
            field: ENV_EXCLUSIONS,
            message: format!("'{pattern}' is not a valid glob: {e}"),
        })?;
    }
    Ok(patterns)
}

fn parse_number<T>(field: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|value| {
        value.parse::<T>().map_err(|e| ConfigError::Invalid {
            field,
            message: format!("'{value}': {e}"),
        })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    struct Fixture {
        _project_root: TempDir,
        output: TempDir,
        project: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let project_root = TempDir::new().unwrap();
            let project = project_root.path().join("My-Proj");
            std::fs::create_dir(&project).unwrap();
            Self {
                _project_root: project_root,
                output: TempDir::new().unwrap(),
                project,
            }
        }

        fn env(&self) -> HashMap<&'static str, String> {
            HashMap::from([
                (ENV_HOST_URL, "http://localhost:9000/".to_string()),
                (ENV_USERNAME, "admin".to_string()),
                (ENV_PASSWORD, "admin-pass".to_string()),
                (ENV_PROJECT_PATH, self.project.display().to_string()),
                (ENV_OUTPUT_PATH, self.output.path().display().to_string()),
                (ENV_PARTICIPANT, "Jane Doe".to_string()),
            ])
        }
    }

    fn resolve(env: &HashMap<&'static str, String>) -> Result<RunConfig, ConfigError> {
        RunConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_project_key_unix_path() {
        let identity = ProjectIdentity::from_path("/a/b/My-Proj/").unwrap();
        assert_eq!(identity.key(), "My-Proj");
    }

    #[test]
    fn test_project_key_windows_path() {
        let identity = ProjectIdentity::from_path(r"C:\x\y\Proj2\").unwrap();
        assert_eq!(identity.key(), "Proj2");
    }

    #[test]
    fn test_project_key_mixed_separators() {
        let identity = ProjectIdentity::from_path(r"D:/work\repos/app\\").unwrap();
        assert_eq!(identity.key(), "app");
    }

    #[test]
    fn test_project_key_empty() {
        assert!(ProjectIdentity::from_path("/").is_err());
        assert!(ProjectIdentity::from_path("").is_err());
        assert!(ProjectIdentity::from_path(r"\\").is_err());
    }

    #[test]
    fn test_resolve_with_defaults() {
        let fixture = Fixture::new();
        let config = resolve(&fixture.env()).unwrap();

        assert_eq!(config.host_url, "http://localhost:9000");
        assert_eq!(config.internal_url, "http://sonarqube:9000");
        assert_eq!(config.project.key(), "My-Proj");
        assert_eq!(config.participant, "Jane Doe");
        assert!(config.exclusions.is_empty());
        assert_eq!(config.metrics, default_metrics());
        assert_eq!(config.compose.scanner_service, "sonar-scanner-cli");
        assert_eq!(config.polling, PollingSettings::default());
        assert_eq!(config.flutter_reports, FlutterReportPaths::default());
        assert!(config.project_path.is_absolute());
    }

    #[test]
    fn test_each_mandatory_field_is_required() {
        let fixture = Fixture::new();
        for key in [
            ENV_HOST_URL,
            ENV_USERNAME,
            ENV_PASSWORD,
            ENV_PROJECT_PATH,
            ENV_OUTPUT_PATH,
            ENV_PARTICIPANT,
        ] {
            let mut env = fixture.env();
            env.remove(key);
            match resolve(&env) {
                Err(ConfigError::Missing(missing)) => assert_eq!(missing, key),
                other => panic!("expected missing {key}, got {other:?}"),
            }

            let mut env = fixture.env();
            env.insert(key, "   ".to_string());
            assert!(resolve(&env).is_err(), "blank {key} must be rejected");
        }
    }

    #[test]
    fn test_nonexistent_directories_rejected() {
        let fixture = Fixture::new();
        let mut env = fixture.env();
        env.insert(ENV_OUTPUT_PATH, "/definitely/not/here".to_string());
        assert!(matches!(
            resolve(&env),
            Err(ConfigError::NotADirectory {
                field: ENV_OUTPUT_PATH,
                ..
            })
        ));

        let mut env = fixture.env();
        let file = fixture.output.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        env.insert(ENV_PROJECT_PATH, file.display().to_string());
        assert!(matches!(
            resolve(&env),
            Err(ConfigError::NotADirectory {
                field: ENV_PROJECT_PATH,
                ..
            })
        ));

        let mut env = fixture.env();
        env.insert(
            ENV_COMPOSE_FILE,
            fixture.output.path().join("compose.yml").display().to_string(),
        );
        assert!(matches!(
            resolve(&env),
            Err(ConfigError::NotAFile {
                field: ENV_COMPOSE_FILE,
                ..
            })
        ));

        let mut env = fixture.env();
        env.insert(ENV_COMPOSE_FILE, fixture.output.path().display().to_string());
        assert!(matches!(
            resolve(&env),
            Err(ConfigError::NotAFile {
                field: ENV_COMPOSE_FILE,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let fixture = Fixture::new();
        let mut env = fixture.env();
        env.insert(ENV_HOST_URL, "localhost:9000".to_string());
        assert!(matches!(
            resolve(&env),
            Err(ConfigError::Invalid {
                field: ENV_HOST_URL,
                ..
            })
        ));
    }

    #[test]
    fn test_optional_settings() {
        let fixture = Fixture::new();
        let compose_file = fixture.output.path().join("compose.yml");
        std::fs::write(&compose_file, "services: {}\n").unwrap();
        let mut env = fixture.env();
        env.insert(ENV_INTERNAL_URL, "http://sq:9000".to_string());
        env.insert(ENV_EXCLUSIONS, "**/*.java, **/build/** ,".to_string());
        env.insert(ENV_METRICS, "bugs,coverage".to_string());
        env.insert(ENV_COMPOSE_FILE, compose_file.display().to_string());
        env.insert(ENV_COMPOSE_PROJECT_NAME, "study".to_string());
        env.insert(ENV_TASK_MAX_ATTEMPTS, "5".to_string());
        env.insert(ENV_TASK_INTERVAL_SECS, "2".to_string());
        env.insert(ENV_FALLBACK_DELAY_SECS, "0".to_string());
        env.insert(ENV_FLUTTER_COVERAGE_REPORT, "build/lcov.info".to_string());

        let config = resolve(&env).unwrap();
        assert_eq!(config.internal_url, "http://sq:9000");
        assert_eq!(config.exclusions, vec!["**/*.java", "**/build/**"]);
        assert_eq!(config.metrics, vec!["bugs", "coverage"]);
        assert_eq!(config.compose.file, Some(compose_file));
        assert_eq!(config.compose.project_name.as_deref(), Some("study"));
        assert_eq!(config.polling.task.max_attempts, 5);
        assert_eq!(config.polling.task.interval, Duration::from_secs(2));
        assert_eq!(config.polling.fallback_delay, Duration::ZERO);
        assert_eq!(config.flutter_reports.coverage, "build/lcov.info");
        assert_eq!(config.flutter_reports.tests, "tests.output");
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let fixture = Fixture::new();
        let mut env = fixture.env();
        env.insert(ENV_READY_MAX_ATTEMPTS, "many".to_string());
        assert!(matches!(
            resolve(&env),
            Err(ConfigError::Invalid {
                field: ENV_READY_MAX_ATTEMPTS,
                ..
            })
        ));

        let mut env = fixture.env();
        env.insert(ENV_TASK_MAX_ATTEMPTS, "0".to_string());
        assert!(matches!(
            resolve(&env),
            Err(ConfigError::Invalid {
                field: ENV_TASK_MAX_ATTEMPTS,
                ..
            })
        ));

        let mut env = fixture.env();
        env.insert(ENV_READY_MAX_ATTEMPTS, "0".to_string());
        assert!(matches!(
            resolve(&env),
            Err(ConfigError::Invalid {
                field: ENV_READY_MAX_ATTEMPTS,
                ..
            })
        ));
    }

    #[test]
    fn test_backoff_settings() {
        let fixture = Fixture::new();
        let config = resolve(&fixture.env()).unwrap();
        assert_eq!(config.polling.task.backoff, Backoff::Fixed);
        assert!(config.validate_certificates);

        let mut env = fixture.env();
        env.insert(ENV_BACKOFF_MULTIPLIER, "1.5".to_string());
        env.insert(ENV_MAX_INTERVAL_SECS, "60".to_string());
        env.insert(ENV_DISABLE_CERT_VALIDATION, "true".to_string());
        let config = resolve(&env).unwrap();
        let expected = Backoff::Exponential {
            multiplier: 1.5,
            max_interval: Duration::from_secs(60),
        };
        assert_eq!(config.polling.readiness.backoff, expected);
        assert_eq!(config.polling.task.backoff, expected);
        assert_eq!(config.polling.task.delay_after(2), Duration::from_secs(15));
        assert!(!config.validate_certificates);
        assert!(!config.sonar_config().validate_certificates);

        let mut env = fixture.env();
        env.insert(ENV_BACKOFF_MULTIPLIER, "0.5".to_string());
        assert!(matches!(
            resolve(&env),
            Err(ConfigError::Invalid {
                field: ENV_BACKOFF_MULTIPLIER,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_exclusion_rejected() {
        let fixture = Fixture::new();
        let mut env = fixture.env();
        env.insert(ENV_EXCLUSIONS, "src/[a-".to_string());
        assert!(matches!(
            resolve(&env),
            Err(ConfigError::Invalid {
                field: ENV_EXCLUSIONS,
                ..
            })
        ));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut overrides = ConfigOverrides::new();
        overrides.set(ENV_PARTICIPANT, Some("first".to_string()));
        overrides.set(ENV_PARTICIPANT, Some("second".to_string()));
        overrides.set(ENV_OUTPUT_PATH, None);
        assert_eq!(overrides.get(ENV_PARTICIPANT), Some("second"));
        assert_eq!(overrides.get(ENV_OUTPUT_PATH), None);
    }

    #[test]
    fn test_debug_output_redacts_password() {
        let fixture = Fixture::new();
        let config = resolve(&fixture.env()).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("admin-pass"));
    }

    #[test]
    fn test_explicit_env_file_must_exist() {
        let result = load_env_files(Some(Path::new("/definitely/not/here/.env")));
        assert!(matches!(result, Err(ConfigError::EnvFile { .. })));
    }
}
