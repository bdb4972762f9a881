use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::upstream::{Upstream, UpstreamError, UpstreamRequest};
use crate::utils::Coordinates;

const PARAMS: &str = "waveHeight,swellDirection,swellHeight,windSpeed,waterTemperature,airTemperature";

/// Hourly marine forecast, one object per hour keyed by parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarineForecast {
    pub hours: Vec<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub async fn fetch_marine_weather(
    upstream: &dyn Upstream,
    base_url: &str,
    coords: Coordinates,
    api_key: String,
) -> Result<MarineForecast, UpstreamError> {
    let request = UpstreamRequest::get(format!("{base_url}/v2/weather/point"))
        .query("lat", coords.latitude)
        .query("lng", coords.longitude)
        .query("params", PARAMS)
        .header("Authorization", api_key);

    Ok(serde_json::from_value(upstream.get_json(request).await?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Canned, MockUpstream};
    use serde_json::json;

    #[tokio::test]
    async fn test_decodes_hours_and_sends_key() {
        let upstream = MockUpstream::new().respond(
            "https://api.stormglass.io",
            Canned::Json(json!({
                "hours": [
                    { "time": "2026-10-16T00:00:00+00:00", "waveHeight": { "sg": 1.2 } },
                    { "time": "2026-10-16T01:00:00+00:00", "waveHeight": { "sg": 1.3 } }
                ],
                "meta": { "dailyQuota": 10, "requestCount": 1 }
            })),
        );
        let coords = Coordinates::new(34.0195, -118.6814).unwrap();

        let forecast =
            fetch_marine_weather(&upstream, "https://api.stormglass.io", coords, "sg-key".into())
                .await
                .unwrap();

        assert_eq!(forecast.hours.len(), 2);
        assert_eq!(forecast.hours[1]["waveHeight"]["sg"], json!(1.3));
        assert_eq!(serde_json::to_value(&forecast).unwrap()["meta"]["dailyQuota"], json!(10));

        let request = &upstream.requests()[0];
        assert_eq!(request.query_value("params"), Some(PARAMS));
        assert_eq!(request.headers, vec![("Authorization", "sg-key".to_string())]);
    }

    #[tokio::test]
    async fn test_body_without_hours_is_rejected() {
        let upstream = MockUpstream::new().respond(
            "https://api.stormglass.io",
            Canned::Json(json!({ "errors": { "key": "Invalid" } })),
        );
        let coords = Coordinates::new(0.0, 0.0).unwrap();

        let err = fetch_marine_weather(&upstream, "https://api.stormglass.io", coords, "k".into())
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::JsonParsing(_)));
    }
}
