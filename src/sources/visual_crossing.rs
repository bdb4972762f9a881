use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::upstream::{Upstream, UpstreamError, UpstreamRequest};
use crate::utils::{round_to_decimals, Coordinates};

const NO_DATA: &str = "No climate data found for this location. Try a major city or landmark.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClimateDay {
    pub datetime: String,
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempmax: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempmin: Option<f64>,
    #[serde(default)]
    pub precip: Option<f64>,
    /// Remaining per-day fields (`conditions`, `humidity`, ...), passed through.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClimateSummary {
    pub period: &'static str,
    pub average_temperature: String,
    pub total_precipitation: String,
    pub days_counted: usize,
    pub trend: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClimateTrends {
    pub summary: ClimateSummary,
    pub days: Vec<ClimateDay>,
    /// Top-level timeline fields other than `days` (`resolvedAddress`,
    /// `timezone`, ...).
    pub timeline: Map<String, Value>,
}

#[derive(Deserialize)]
struct TimelineResponse {
    #[serde(default)]
    days: Vec<ClimateDay>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

/// Missing daily values count as zero.
pub fn summarize(days: &[ClimateDay]) -> ClimateSummary {
    let count = days.len().max(1) as f64;
    let average = round_to_decimals(days.iter().filter_map(|d| d.temp).sum::<f64>() / count, 1);
    let precipitation = round_to_decimals(days.iter().filter_map(|d| d.precip).sum::<f64>(), 1);

    let trend = if average > 20.0 {
        "Warming"
    } else if average < 10.0 {
        "Cooling"
    } else {
        "Stable"
    };

    ClimateSummary {
        period: "90-day historical",
        average_temperature: format!("{average:.1}°C"),
        total_precipitation: format!("{precipitation:.1}mm"),
        days_counted: days.len(),
        trend,
    }
}

pub async fn fetch_climate_trends(
    upstream: &dyn Upstream,
    base_url: &str,
    coords: Coordinates,
    api_key: String,
) -> Result<ClimateTrends, UpstreamError> {
    let location = format!("{},{}", coords.latitude, coords.longitude);
    let request = UpstreamRequest::get(format!(
        "{base_url}/VisualCrossingWebServices/rest/services/timeline/{}/last90days",
        urlencoding::encode(&location)
    ))
    .query("unitGroup", "metric")
    .query("include", "days")
    .query("key", api_key)
    .query("contentType", "json");

    let response: TimelineResponse = serde_json::from_value(upstream.get_json(request).await?)?;
    if response.days.is_empty() {
        return Err(UpstreamError::NoData(NO_DATA.to_string()));
    }

    Ok(ClimateTrends {
        summary: summarize(&response.days),
        days: response.days,
        timeline: response.rest,
    })
}
