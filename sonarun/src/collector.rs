//! Retrieving the metric values of the analyzed project.

use log::{info, warn};
use sonarqube_api::{ComponentMeasures, SonarError};

use crate::backend::Backend;

/// One metric as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricEntry {
    pub name: String,
    /// `None` when the backend returned the metric without a value
    pub value: Option<String>,
}

/// Metric values of one run, in backend order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricRecord {
    pub entries: Vec<MetricEntry>,
}

impl MetricRecord {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value returned for a metric, if any
    #[must_use]
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .and_then(|entry| entry.value.as_deref())
    }
}

impl From<ComponentMeasures> for MetricRecord {
    fn from(response: ComponentMeasures) -> Self {
        let entries = response
            .component
            .measures
            .iter()
            .map(|measure| MetricEntry {
                name: measure.metric.clone(),
                value: measure.effective_value().map(str::to_string),
            })
            .collect();
        MetricRecord { entries }
    }
}

/// Fetch all requested metrics for a project in one request.
///
/// # Errors
///
/// Any backend error, including a malformed response, is returned unchanged;
/// there is no partial result.
pub async fn collect<B: Backend>(
    backend: &B,
    project_key: &str,
    metric_keys: &[String],
) -> Result<MetricRecord, SonarError> {
    info!(
        "📊 Collecting {} metrics for '{project_key}'",
        metric_keys.len()
    );

    let record = MetricRecord::from(backend.measures(project_key, metric_keys).await?);

    if record.is_empty() {
        warn!("⚠️  Backend returned no measures for '{project_key}'");
    } else {
        info!("✅ Collected {} measures", record.len());
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBackend, measures};
    use sonarqube_api::parse_component_measures;

    #[tokio::test]
    async fn test_single_measure() {
        let backend = FakeBackend::new();
        backend.push_measures(Ok(parse_component_measures(
            r#"{"component":{"measures":[{"metric":"bugs","value":"3"}]}}"#,
        )
        .unwrap()));

        let record = collect(&backend, "My-Proj", &["bugs".to_string()])
            .await
            .unwrap();

        assert_eq!(
            record.entries,
            vec![MetricEntry {
                name: "bugs".to_string(),
                value: Some("3".to_string())
            }]
        );
        assert_eq!(backend.calls(), vec!["measures:My-Proj:bugs"]);
    }

    #[tokio::test]
    async fn test_backend_order_is_kept() {
        let backend = FakeBackend::new();
        backend.push_measures(Ok(measures(&[
            ("ncloc", "120"),
            ("bugs", "0"),
            ("coverage", "81.5"),
        ])));
        let requested = vec![
            "bugs".to_string(),
            "coverage".to_string(),
            "ncloc".to_string(),
        ];

        let record = collect(&backend, "My-Proj", &requested).await.unwrap();

        let names: Vec<_> = record.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["ncloc", "bugs", "coverage"]);
        assert_eq!(record.value_of("coverage"), Some("81.5"));
        assert_eq!(record.value_of("complexity"), None);
    }

    #[tokio::test]
    async fn test_period_value_and_missing_value() {
        let backend = FakeBackend::new();
        backend.push_measures(Ok(parse_component_measures(
            r#"{"component":{"measures":[
                {"metric":"new_bugs","period":{"index":1,"value":"2"}},
                {"metric":"alert_status"}
            ]}}"#,
        )
        .unwrap()));

        let record = collect(&backend, "p", &["new_bugs".to_string()]).await.unwrap();

        assert_eq!(record.value_of("new_bugs"), Some("2"));
        assert_eq!(record.entries[1].value, None);
    }

    #[tokio::test]
    async fn test_zero_measures_is_valid() {
        let backend = FakeBackend::new();
        backend.push_measures(Ok(measures(&[])));

        let record = collect(&backend, "p", &["bugs".to_string()]).await.unwrap();
        assert!(record.is_empty());
    }

    #[tokio::test]
    async fn test_errors_are_fatal() {
        let backend = FakeBackend::new();
        backend.push_measures(Err(SonarError::UnexpectedStatus {
            status: 404,
            message: "Component key 'p' not found".to_string(),
        }));

        assert!(collect(&backend, "p", &["bugs".to_string()]).await.is_err());
    }
}
