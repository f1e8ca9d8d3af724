//! CSV result files.

use chrono::{DateTime, Local};
use log::info;
use std::path::{Path, PathBuf};

use crate::collector::MetricRecord;

/// Directory created under the output path
pub const OUTPUT_DIR_NAME: &str = "sonar_analysis_output";

/// Written for requested metrics the backend returned no value for
pub const NOT_AVAILABLE: &str = "N/A";

const CSV_HEADER: &str = "Metric,Value,Datetime,Participant\n";

/// Error types for result persistence
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write result file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Lowercase ASCII slug: alphanumeric runs joined by single dashes.
#[must_use]
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        "participant".to_string()
    } else {
        slug
    }
}

fn escape_csv(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Writes one CSV record per run
#[derive(Debug, Clone)]
pub struct ResultWriter {
    output_root: PathBuf,
    participant: String,
}

impl ResultWriter {
    pub fn new(output_root: impl Into<PathBuf>, participant: impl Into<String>) -> Self {
        Self {
            output_root: output_root.into(),
            participant: participant.into(),
        }
    }

    /// `{root}/sonar_analysis_output/{YYYY-MM-DD}`
    #[must_use]
    pub fn directory_for(&self, now: &DateTime<Local>) -> PathBuf {
        self.output_root
            .join(OUTPUT_DIR_NAME)
            .join(now.format("%Y-%m-%d").to_string())
    }

    /// Render the CSV: one row per requested metric, in requested order.
    #[must_use]
    pub fn render(&self, record: &MetricRecord, requested: &[String], now: &DateTime<Local>) -> String {
        let timestamp = now.format("%Y-%m-%d %H:%M:%S%.6f").to_string();
        let participant = escape_csv(&self.participant);

        let mut csv = String::from(CSV_HEADER);
        for metric in requested {
            let value = record.value_of(metric).unwrap_or(NOT_AVAILABLE);
            csv.push_str(&format!(
                "{},{},{},{}\n",
                escape_csv(metric),
                escape_csv(value),
                timestamp,
                participant
            ));
        }
        csv
    }

    /// Write the record and return the path of the new file.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] if the dated directory cannot be created or the
    /// file cannot be written.
    pub fn write(
        &self,
        record: &MetricRecord,
        requested: &[String],
        now: &DateTime<Local>,
    ) -> Result<PathBuf, OutputError> {
        let directory = self.directory_for(now);
        std::fs::create_dir_all(&directory).map_err(|source| OutputError::CreateDir {
            path: directory.clone(),
            source,
        })?;

        let path = unique_path(&directory, &slugify(&self.participant), now.timestamp());
        std::fs::write(&path, self.render(record, requested, now)).map_err(|source| {
            OutputError::Write {
                path: path.clone(),
                source,
            }
        })?;

        info!("💾 Results written to {}", path.display());
        Ok(path)
    }
}

fn unique_path(directory: &Path, slug: &str, unix_ts: i64) -> PathBuf {
    let base = directory.join(format!("{slug}-{unix_ts}.csv"));
    if !base.exists() {
        return base;
    }
    (1..)
        .map(|n| directory.join(format!("{slug}-{unix_ts}-{n}.csv")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(base)
}
