//! Measures API: metric values of an analyzed component.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::{SonarClient, SonarError};

/// Value of a measure on the new-code period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodValue {
    pub index: Option<u32>,
    pub value: Option<String>,
    pub best_value: Option<bool>,
}

/// A single measure as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    pub metric: String,
    pub value: Option<String>,
    /// Present on new-code metrics (SonarQube 8.x and later)
    pub period: Option<PeriodValue>,
    /// Present on new-code metrics (older backends)
    pub periods: Option<Vec<PeriodValue>>,
    pub best_value: Option<bool>,
}

impl Measure {
    /// The measure value, falling back to the new-code period value when the
    /// top-level value is absent.
    #[must_use]
    pub fn effective_value(&self) -> Option<&str> {
        self.value
            .as_deref()
            .or_else(|| self.period.as_ref().and_then(|p| p.value.as_deref()))
            .or_else(|| {
                self.periods
                    .as_ref()
                    .and_then(|periods| periods.first())
                    .and_then(|p| p.value.as_deref())
            })
    }
}

/// The analyzed component together with its measures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub key: Option<String>,
    pub name: Option<String>,
    pub qualifier: Option<String>,
    pub measures: Vec<Measure>,
}

/// Response of `GET /api/measures/component`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentMeasures {
    pub component: Component,
}

/// Parse a `GET /api/measures/component` body.
///
/// `component.measures` is mandatory: a body without it is malformed, while an
/// empty array is a valid answer with zero measures.
///
/// # Errors
///
/// Returns [`SonarError::InvalidResponse`] if the expected nested fields are missing.
pub fn parse_component_measures(body: &str) -> Result<ComponentMeasures, SonarError> {
    serde_json::from_str::<ComponentMeasures>(body).map_err(|e| {
        SonarError::InvalidResponse(format!("Failed to parse component measures: {e}"))
    })
}

/// Measures API client
pub struct MeasuresApi<'a> {
    client: &'a SonarClient,
}

impl<'a> MeasuresApi<'a> {
    #[must_use]
    pub fn new(client: &'a SonarClient) -> Self {
        Self { client }
    }

    /// Fetch the given metrics for a component in a single request.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or a malformed body.
    pub async fn component(
        &self,
        component_key: &str,
        metric_keys: &[String],
    ) -> Result<ComponentMeasures, SonarError> {
        let joined = metric_keys.join(",");
        let response = self
            .client
            .get_with_query(
                "/api/measures/component",
                &[("component", component_key), ("metricKeys", joined.as_str())],
            )
            .await?;
        let body = SonarClient::read_body(response, Cow::Borrowed("component measures")).await?;
        parse_component_measures(&body)
    }
}
