use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::upstream::{Upstream, UpstreamError, UpstreamRequest};
use crate::utils::Coordinates;

/// Latest readings from the station nearest to a point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StationReading {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename(deserialize = "lastUpdated"))]
    pub last_update: Option<String>,
    #[serde(default)]
    pub measurements: Vec<Value>,
}

#[derive(Deserialize)]
struct LatestResponse {
    #[serde(default)]
    results: Vec<StationReading>,
}

pub async fn fetch_nearest_station(
    upstream: &dyn Upstream,
    base_url: &str,
    coords: Coordinates,
) -> Result<Option<StationReading>, UpstreamError> {
    let request = UpstreamRequest::get(format!("{base_url}/v2/latest"))
        .query("coordinates", format!("{},{}", coords.latitude, coords.longitude))
        .query("limit", 1);

    let response: LatestResponse = serde_json::from_value(upstream.get_json(request).await?)?;
    Ok(response.results.into_iter().next())
}

pub fn no_station() -> Option<StationReading> {
    None
}
