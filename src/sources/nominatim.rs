use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::upstream::{Upstream, UpstreamError, UpstreamRequest};
use crate::utils::Coordinates;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub address: Map<String, Value>,
    pub location: String,
    pub display_name: String,
}

#[derive(Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<Map<String, Value>>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

pub async fn reverse_geocode(
    upstream: &dyn Upstream,
    base_url: &str,
    coords: Coordinates,
) -> Result<Place, UpstreamError> {
    let request = UpstreamRequest::get(format!("{base_url}/reverse"))
        .query("format", "json")
        .query("lat", coords.latitude)
        .query("lon", coords.longitude);

    let response: ReverseResponse = serde_json::from_value(upstream.get_json(request).await?)?;

    Ok(Place {
        address: response.address.unwrap_or_default(),
        location: response
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Unknown location".to_string()),
        display_name: response.display_name.unwrap_or_default(),
    })
}
