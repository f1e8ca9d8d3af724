//! Project profiles: per-ecosystem scanner parameters.
//!
//! A project is analyzed with the [`ProjectProfile::Generic`] parameters unless
//! a marker manifest of a secondary ecosystem is found in its root directory.

use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::backend::Backend;
use crate::config::FlutterReportPaths;

/// Manifest identifying a Flutter/Dart project
pub const FLUTTER_MARKER: &str = "pubspec.yaml";

/// Backend plugin required to import Flutter reports
pub const FLUTTER_PLUGIN_KEY: &str = "flutter";

/// Scanner parameter contribution of the detected project ecosystem
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectProfile {
    /// Whole project directory is the source root
    Generic,
    /// `lib`/`test` layout with pre-generated coverage, test and analyzer reports
    Flutter(FlutterReportPaths),
}

impl ProjectProfile {
    /// Pick the profile for a project directory.
    pub fn detect(project_path: &Path, reports: &FlutterReportPaths) -> Self {
        if project_path.join(FLUTTER_MARKER).is_file() {
            ProjectProfile::Flutter(reports.clone())
        } else {
            ProjectProfile::Generic
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ProjectProfile::Generic => "generic",
            ProjectProfile::Flutter(_) => "flutter",
        }
    }

    /// Scanner properties for this profile, as `(property, value)` pairs.
    ///
    /// Paths are relative to the scanner's working directory, where the
    /// project is mounted under its key. An absolute report path inside
    /// `project_path` is rewritten onto that mount.
    #[must_use]
    pub fn scanner_properties(&self, project_key: &str, project_path: &Path) -> Vec<(String, String)> {
        match self {
            ProjectProfile::Generic => {
                vec![("sonar.sources".to_string(), project_key.to_string())]
            }
            ProjectProfile::Flutter(reports) => vec![
                ("sonar.sources".to_string(), format!("{project_key}/lib")),
                ("sonar.tests".to_string(), format!("{project_key}/test")),
                (
                    "sonar.flutter.coverage.reportPath".to_string(),
                    scanner_path(project_key, project_path, &reports.coverage),
                ),
                (
                    "sonar.flutter.tests.reportPath".to_string(),
                    scanner_path(project_key, project_path, &reports.tests),
                ),
                ("sonar.dart.analyzer.mode".to_string(), "MANUAL".to_string()),
                (
                    "sonar.dart.analyzer.report.path".to_string(),
                    scanner_path(project_key, project_path, &reports.analysis),
                ),
            ],
        }
    }

    /// Check the prerequisites of the profile before scanning.
    ///
    /// Nothing here is fatal: each problem found is logged and returned as a
    /// warning message.
    pub async fn preprocess<B: Backend>(&self, backend: &B, project_path: &Path) -> Vec<String> {
        let ProjectProfile::Flutter(reports) = self else {
            return Vec::new();
        };

        info!("🦋 Flutter project detected, checking prerequisites");
        let mut warnings = Vec::new();

        match backend.installed_plugins().await {
            Ok(plugins) if plugins.iter().any(|p| p.key == FLUTTER_PLUGIN_KEY) => {
                info!("✅ Backend plugin '{FLUTTER_PLUGIN_KEY}' is installed");
            }
            Ok(_) => warnings.push(format!(
                "Backend plugin '{FLUTTER_PLUGIN_KEY}' is not installed; Dart sources will not be analyzed"
            )),
            Err(e) => warnings.push(format!("Could not list installed backend plugins: {e}")),
        }

        for (label, report) in [
            ("coverage report", &reports.coverage),
            ("test report", &reports.tests),
            ("analyzer report", &reports.analysis),
        ] {
            let host_path = host_path(project_path, report);
            if !host_path.is_file() {
                warnings.push(format!("Flutter {label} not found at {}", host_path.display()));
            } else if !host_path.starts_with(project_path) {
                warnings.push(format!(
                    "Flutter {label} at {} is outside the project directory and not visible to the scanner",
                    host_path.display()
                ));
            }
        }

        for warning in &warnings {
            warn!("⚠️  {warning}");
        }
        warnings
    }
}

fn scanner_path(project_key: &str, project_path: &Path, report: &str) -> String {
    let path = Path::new(report);
    if !path.is_absolute() {
        return format!("{project_key}/{}", report.trim_start_matches("./"));
    }
    match path.strip_prefix(project_path) {
        Ok(relative) => {
            let relative: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            format!("{project_key}/{}", relative.join("/"))
        }
        Err(_) => report.to_string(),
    }
}

fn host_path(project_path: &Path, report: &str) -> PathBuf {
    let report = Path::new(report);
    if report.is_absolute() {
        report.to_path_buf()
    } else {
        project_path.join(report)
    }
}
