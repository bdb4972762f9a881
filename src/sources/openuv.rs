use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::upstream::{Upstream, UpstreamError, UpstreamRequest};
use crate::utils::Coordinates;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UvReading {
    pub index: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_today: Option<f64>,
    /// Minutes of safe exposure per Fitzpatrick skin type (`st1`..`st6`).
    pub safe_exposure: BTreeMap<String, Option<f64>>,
    pub safe_time: SafeTime,
    pub warning_level: &'static str,
    pub recommendation: &'static str,
}

/// Safe exposure minutes for the fairest skin type, or a pointer to the
/// provider when it reports none.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum SafeTime {
    Minutes(f64),
    Advice(&'static str),
}

#[derive(Deserialize)]
struct UvResponse {
    result: UvResult,
}

#[derive(Deserialize)]
struct UvResult {
    #[serde(default)]
    uv: f64,
    #[serde(default)]
    uv_max: Option<f64>,
    #[serde(default)]
    safe_exposure_time: BTreeMap<String, Option<f64>>,
}

pub fn warning_level(index: f64) -> &'static str {
    if index < 3.0 {
        "Safe"
    } else if index < 6.0 {
        "Moderate"
    } else if index < 8.0 {
        "High"
    } else {
        "Very High"
    }
}

pub fn recommendation(index: f64) -> &'static str {
    if index > 8.0 {
        "HIGH - Use SPF 50+ sunscreen, limit outdoor time"
    } else if index > 5.0 {
        "MODERATE - Use SPF 30+ sunscreen"
    } else {
        "LOW - Standard sun protection sufficient"
    }
}

pub async fn fetch_uv_index(
    upstream: &dyn Upstream,
    base_url: &str,
    coords: Coordinates,
    api_key: String,
) -> Result<UvReading, UpstreamError> {
    let request = UpstreamRequest::get(format!("{base_url}/api/v1/uv"))
        .query("lat", coords.latitude)
        .query("lng", coords.longitude)
        .header("x-access-token", api_key);

    let response: UvResponse = serde_json::from_value(upstream.get_json(request).await?)?;
    let result = response.result;

    let safe_time = match result.safe_exposure_time.get("st1").copied().flatten() {
        Some(minutes) if minutes > 0.0 => SafeTime::Minutes(minutes),
        _ => SafeTime::Advice("Check at openuv.io"),
    };

    Ok(UvReading {
        index: result.uv,
        max_today: result.uv_max,
        safe_exposure: result.safe_exposure_time,
        safe_time,
        warning_level: warning_level(result.uv),
        recommendation: recommendation(result.uv),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Canned, MockUpstream};
    use serde_json::json;

    #[test]
    fn test_warning_levels() {
        assert_eq!(warning_level(0.0), "Safe");
        assert_eq!(warning_level(2.9), "Safe");
        assert_eq!(warning_level(3.0), "Moderate");
        assert_eq!(warning_level(6.0), "High");
        assert_eq!(warning_level(8.0), "Very High");
    }

    #[test]
    fn test_recommendations() {
        assert!(recommendation(5.0).starts_with("LOW"));
        assert!(recommendation(5.1).starts_with("MODERATE"));
        assert!(recommendation(8.0).starts_with("MODERATE"));
        assert!(recommendation(8.5).starts_with("HIGH"));
    }

    #[tokio::test]
    async fn test_decodes_uv_result() {
        let upstream = MockUpstream::new().respond(
            "https://api.openuv.io",
            Canned::Json(json!({
                "result": {
                    "uv": 6.4,
                    "uv_max": 8.9,
                    "safe_exposure_time": { "st1": 26.0, "st2": 31.0, "st6": null }
                }
            })),
        );
        let coords = Coordinates::new(34.0195, -118.6814).unwrap();

        let reading = fetch_uv_index(&upstream, "https://api.openuv.io", coords, "key".into())
            .await
            .unwrap();

        assert_eq!(reading.index, 6.4);
        assert_eq!(reading.max_today, Some(8.9));
        assert_eq!(reading.safe_time, SafeTime::Minutes(26.0));
        assert_eq!(reading.safe_exposure.get("st6"), Some(&None));
        assert_eq!(reading.warning_level, "High");

        let request = &upstream.requests()[0];
        assert_eq!(request.query_value("lng"), Some("-118.6814"));
        assert_eq!(request.headers, vec![("x-access-token", "key".to_string())]);
    }

    #[tokio::test]
    async fn test_missing_exposure_times() {
        let upstream = MockUpstream::new()
            .respond("https://api.openuv.io", Canned::Json(json!({ "result": { "uv": 0.0 } })));
        let coords = Coordinates::new(0.0, 0.0).unwrap();

        let reading = fetch_uv_index(&upstream, "https://api.openuv.io", coords, "key".into())
            .await
            .unwrap();

        assert_eq!(reading.safe_time, SafeTime::Advice("Check at openuv.io"));
        assert!(reading.safe_exposure.is_empty());
    }

    #[tokio::test]
    async fn test_zero_exposure_points_to_provider() {
        let upstream = MockUpstream::new().respond(
            "https://api.openuv.io",
            Canned::Json(json!({ "result": { "uv": 0.2, "safe_exposure_time": { "st1": 0.0 } } })),
        );
        let coords = Coordinates::new(64.1466, -21.9426).unwrap();

        let reading = fetch_uv_index(&upstream, "https://api.openuv.io", coords, "key".into())
            .await
            .unwrap();

        assert_eq!(reading.safe_time, SafeTime::Advice("Check at openuv.io"));
        assert_eq!(
            serde_json::to_value(&reading).unwrap()["safeTime"],
            json!("Check at openuv.io")
        );
    }
}
