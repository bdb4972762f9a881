use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::FALLBACK_NOTE;
use crate::upstream::{Upstream, UpstreamError, UpstreamRequest};
use crate::utils::Coordinates;

const WEATHER_FIELDS: &str = "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m";
const CONDITIONS_FIELDS: &str =
    "temperature_2m,wind_speed_10m,wave_height,weather_code,relative_humidity_2m,uv_index";

/// Current conditions in imperial units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentWeather {
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    pub weather_code: i32,
    pub wind_speed_10m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Raw `current` block for the ocean conditions routes, passed through as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionsSnapshot {
    pub weather: Map<String, Value>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ForecastResponse<T> {
    current: T,
}

#[derive(Deserialize)]
struct ConditionsResponse {
    #[serde(default)]
    current: Option<Map<String, Value>>,
}

fn forecast_request(base_url: &str, coords: Coordinates, fields: &str) -> UpstreamRequest {
    UpstreamRequest::get(format!("{base_url}/v1/forecast"))
        .query("latitude", coords.latitude)
        .query("longitude", coords.longitude)
        .query("current", fields)
        .query("temperature_unit", "fahrenheit")
}

pub async fn fetch_current_weather(
    upstream: &dyn Upstream,
    base_url: &str,
    coords: Coordinates,
) -> Result<CurrentWeather, UpstreamError> {
    let request = forecast_request(base_url, coords, WEATHER_FIELDS)
        .query("wind_speed_unit", "mph")
        .query("timezone", "auto");

    let body = upstream.get_json(request).await?;
    let response: ForecastResponse<CurrentWeather> = serde_json::from_value(body)?;
    Ok(response.current)
}

pub async fn fetch_conditions(
    upstream: &dyn Upstream,
    base_url: &str,
    coords: Coordinates,
) -> Result<ConditionsSnapshot, UpstreamError> {
    let body = upstream
        .get_json(forecast_request(base_url, coords, CONDITIONS_FIELDS))
        .await?;
    let response: ConditionsResponse = serde_json::from_value(body)?;

    Ok(ConditionsSnapshot {
        weather: response.current.unwrap_or_default(),
        fetched_at: Utc::now(),
    })
}

pub fn weather_fallback() -> CurrentWeather {
    CurrentWeather {
        temperature_2m: 72.0,
        relative_humidity_2m: 65.0,
        weather_code: 1,
        wind_speed_10m: 10.0,
        time: None,
        note: Some(FALLBACK_NOTE.to_string()),
    }
}
