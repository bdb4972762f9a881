use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::FALLBACK_NOTE;
use crate::upstream::{Upstream, UpstreamError, UpstreamRequest};
use crate::utils::Coordinates;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AirQuality {
    /// `None` when the station publishes no index.
    pub aqi: Option<u32>,
    pub main_pollutant: Option<String>,
    pub station: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Deserialize)]
struct FeedEnvelope {
    status: String,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
struct FeedData {
    aqi: AqiValue,
    #[serde(default)]
    dominentpol: Option<String>,
    #[serde(default)]
    city: Option<FeedCity>,
    #[serde(default)]
    time: Option<FeedTime>,
}

/// Stations without a reading report `"-"` instead of a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum AqiValue {
    Index(f64),
    Text(String),
}

#[derive(Deserialize)]
struct FeedCity {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct FeedTime {
    #[serde(default)]
    iso: Option<String>,
}

pub async fn fetch_air_quality(
    upstream: &dyn Upstream,
    base_url: &str,
    coords: Coordinates,
    token: String,
) -> Result<AirQuality, UpstreamError> {
    let request = UpstreamRequest::get(format!(
        "{base_url}/feed/geo:{};{}/",
        coords.latitude, coords.longitude
    ))
    .query("token", token);

    let envelope: FeedEnvelope = serde_json::from_value(upstream.get_json(request).await?)?;
    if envelope.status != "ok" {
        return Err(UpstreamError::InvalidResponse(format!(
            "air quality feed status {:?}: {}",
            envelope.status, envelope.data
        )));
    }
    let data: FeedData = serde_json::from_value(envelope.data)?;

    let aqi = match data.aqi {
        AqiValue::Index(index) if index >= 0.0 => Some(index.round() as u32),
        AqiValue::Index(_) => None,
        AqiValue::Text(text) => text.trim().parse().ok(),
    };

    Ok(AirQuality {
        aqi,
        main_pollutant: data.dominentpol.filter(|p| !p.is_empty()),
        station: data
            .city
            .and_then(|city| city.name)
            .unwrap_or_else(|| "Unknown".to_string()),
        last_update: data.time.and_then(|time| time.iso),
        note: None,
    })
}

pub fn air_quality_fallback() -> AirQuality {
    AirQuality {
        aqi: Some(50),
        main_pollutant: Some("PM2.5".to_string()),
        station: "Unknown".to_string(),
        last_update: None,
        note: Some(FALLBACK_NOTE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Canned, MockUpstream};
    use serde_json::json;

    const BASE: &str = "https://api.waqi.info";

    fn malibu() -> Coordinates {
        Coordinates::new(34.0195, -118.6814).unwrap()
    }

    #[tokio::test]
    async fn test_decodes_station_feed() {
        let upstream = MockUpstream::new().respond(
            BASE,
            Canned::Json(json!({
                "status": "ok",
                "data": {
                    "aqi": 42,
                    "dominentpol": "o3",
                    "city": { "name": "Malibu, California" },
                    "time": { "iso": "2026-10-16T09:00:00-07:00" }
                }
            })),
        );

        let reading = fetch_air_quality(&upstream, BASE, malibu(), "token".into())
            .await
            .unwrap();

        assert_eq!(reading.aqi, Some(42));
        assert_eq!(reading.main_pollutant.as_deref(), Some("o3"));
        assert_eq!(reading.station, "Malibu, California");
        assert_eq!(upstream.requests()[0].url, format!("{BASE}/feed/geo:34.0195;-118.6814/"));
        assert_eq!(upstream.requests()[0].query_value("token"), Some("token"));
    }

    #[tokio::test]
    async fn test_dash_index_means_no_reading() {
        let upstream = MockUpstream::new().respond(
            BASE,
            Canned::Json(json!({ "status": "ok", "data": { "aqi": "-" } })),
        );

        let reading = fetch_air_quality(&upstream, BASE, malibu(), "token".into())
            .await
            .unwrap();

        assert_eq!(reading.aqi, None);
        assert_eq!(reading.station, "Unknown");
    }

    #[tokio::test]
    async fn test_error_status_is_a_failure() {
        let upstream = MockUpstream::new().respond(
            BASE,
            Canned::Json(json!({ "status": "error", "data": "Invalid key" })),
        );

        let err = fetch_air_quality(&upstream, BASE, malibu(), "bad".into())
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::InvalidResponse(_)));
    }
}
