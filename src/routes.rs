use axum::{
    async_trait,
    extract::{FromRequestParts, Query, State},
    http::request::Parts,
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::{
    config::Config,
    error::ApiError,
    fetch::Fetched,
    sources::{
        debris::{self, Heatmap},
        gnews::{self, NewsFeed},
        nominatim::{self, Place},
        open_meteo::{self, CurrentWeather},
        openaq::{self, StationReading},
        openuv::{self, UvReading},
        stormglass::{self, MarineForecast},
        visual_crossing::{self, ClimateDay, ClimateSummary},
        waqi::{self, AirQuality},
        Sources,
    },
    upstream::{Upstream, UpstreamError},
    utils::Coordinates,
};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub upstream: Arc<dyn Upstream>,
    pub sources: Arc<Sources>,
}

impl AppState {
    pub fn new(config: Config, upstream: Arc<dyn Upstream>) -> Self {
        let sources = Arc::new(Sources::from_config(&config));
        Self {
            config: Arc::new(config),
            upstream,
            sources,
        }
    }
}

// Request/Response types
#[derive(Debug, Default, Deserialize)]
pub struct ApiQuery {
    #[serde(alias = "lat")]
    pub latitude: Option<String>,
    #[serde(alias = "lon", alias = "lng")]
    pub longitude: Option<String>,
    pub radius: Option<String>,
    pub limit: Option<String>,
}

/// Query string rejections render through `ApiError` so clients always get
/// the JSON error body.
#[async_trait]
impl<S> FromRequestParts<S> for ApiQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<ApiQuery>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        Ok(query)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl ApiQuery {
    pub fn coordinates(&self) -> Result<Coordinates, ApiError> {
        let (Some(latitude), Some(longitude)) =
            (non_blank(&self.latitude), non_blank(&self.longitude))
        else {
            return Err(ApiError::Validation(
                "Latitude and longitude required".to_string(),
            ));
        };

        let invalid = || {
            ApiError::Validation(
                "Invalid coordinates. Latitude must be -90 to 90, Longitude -180 to 180."
                    .to_string(),
            )
        };
        let latitude: f64 = latitude.parse().map_err(|_| invalid())?;
        let longitude: f64 = longitude.parse().map_err(|_| invalid())?;

        Coordinates::new(latitude, longitude).map_err(|_| invalid())
    }

    pub fn radius_km(&self) -> Result<f64, ApiError> {
        let Some(raw) = non_blank(&self.radius) else {
            return Ok(debris::DEFAULT_RADIUS_KM);
        };
        match raw.parse::<f64>() {
            Ok(radius) if radius.is_finite() && radius > 0.0 => Ok(radius),
            _ => Err(ApiError::Validation(
                "Radius must be a positive number of kilometers".to_string(),
            )),
        }
    }

    pub fn article_limit(&self) -> Result<u32, ApiError> {
        let Some(raw) = non_blank(&self.limit) else {
            return Ok(gnews::DEFAULT_LIMIT);
        };
        raw.parse::<u32>()
            .map(|limit| limit.clamp(1, gnews::MAX_LIMIT))
            .map_err(|_| ApiError::Validation("Limit must be a whole number".to_string()))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub cache_entries: u64,
}

#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    pub success: bool,
    pub data: T,
    pub coordinates: Coordinates,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
}

impl<T> DataEnvelope<T> {
    fn new(fetched: Fetched<T>, coordinates: Coordinates) -> Self {
        Self {
            success: true,
            fallback: fetched.is_fallback(),
            data: fetched.value,
            coordinates,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UvResponse {
    pub success: bool,
    pub uv: UvReading,
    pub timestamp: DateTime<Utc>,
    pub source: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarineWeatherResponse {
    pub success: bool,
    pub marine_weather: MarineForecast,
    pub timestamp: DateTime<Utc>,
    pub source: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RawClimateData {
    pub days: Vec<ClimateDay>,
    #[serde(flatten)]
    pub timeline: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateTrendsResponse {
    pub success: bool,
    pub climate_trends: ClimateSummary,
    pub raw_data: RawClimateData,
    pub timestamp: DateTime<Utc>,
    pub source: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OceanConditionsResponse {
    pub success: bool,
    pub weather: Map<String, Value>,
    pub air_quality: Option<StationReading>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedConditionsResponse {
    pub success: bool,
    pub weather: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
    pub from_cache: bool,
}

#[derive(Debug, Serialize)]
pub struct GeocodeResponse {
    pub success: bool,
    #[serde(flatten)]
    pub place: Place,
    pub timestamp: DateTime<Utc>,
}

// Route handlers
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache_entries: state.sources.cached_entries().await,
    })
}

pub async fn get_weather(
    State(state): State<AppState>,
    params: ApiQuery,
) -> Result<Json<DataEnvelope<CurrentWeather>>, ApiError> {
    let coords = params.coordinates()?;

    let fetched = state
        .sources
        .weather
        .fetch(&coords.cache_key(), || {
            open_meteo::fetch_current_weather(
                state.upstream.as_ref(),
                &state.config.open_meteo_base_url,
                coords,
            )
        })
        .await?;

    Ok(Json(DataEnvelope::new(fetched, coords)))
}

pub async fn get_air_quality(
    State(state): State<AppState>,
    params: ApiQuery,
) -> Result<Json<DataEnvelope<AirQuality>>, ApiError> {
    let coords = params.coordinates()?;

    let fetched = state
        .sources
        .air_quality
        .fetch_with_key(&coords.cache_key(), |token| {
            waqi::fetch_air_quality(
                state.upstream.as_ref(),
                &state.config.waqi_base_url,
                coords,
                token,
            )
        })
        .await?;

    Ok(Json(DataEnvelope::new(fetched, coords)))
}

pub async fn get_debris_heatmap(
    State(state): State<AppState>,
    params: ApiQuery,
) -> Result<Json<DataEnvelope<Heatmap>>, ApiError> {
    let coords = params.coordinates()?;
    let radius_km = params.radius_km()?;

    let fetched = state
        .sources
        .debris_heatmap
        .fetch(&coords.cache_key_with_radius(radius_km), || async move {
            Ok::<_, UpstreamError>(debris::survey(coords, radius_km))
        })
        .await?;

    Ok(Json(DataEnvelope::new(fetched, coords)))
}

pub async fn get_uv_index(
    State(state): State<AppState>,
    params: ApiQuery,
) -> Result<Json<UvResponse>, ApiError> {
    let coords = params.coordinates()?;

    let fetched = state
        .sources
        .uv_index
        .fetch_with_key(&coords.cache_key(), |api_key| {
            openuv::fetch_uv_index(
                state.upstream.as_ref(),
                &state.config.openuv_base_url,
                coords,
                api_key,
            )
        })
        .await?;

    Ok(Json(UvResponse {
        success: true,
        uv: fetched.value,
        timestamp: Utc::now(),
        source: "OpenUV API",
    }))
}

pub async fn get_marine_weather(
    State(state): State<AppState>,
    params: ApiQuery,
) -> Result<Json<MarineWeatherResponse>, ApiError> {
    let coords = params.coordinates()?;

    let fetched = state
        .sources
        .marine_weather
        .fetch_with_key(&coords.cache_key(), |api_key| {
            stormglass::fetch_marine_weather(
                state.upstream.as_ref(),
                &state.config.stormglass_base_url,
                coords,
                api_key,
            )
        })
        .await?;

    Ok(Json(MarineWeatherResponse {
        success: true,
        marine_weather: fetched.value,
        timestamp: Utc::now(),
        source: "Storm Glass API",
    }))
}

pub async fn get_climate_trends(
    State(state): State<AppState>,
    params: ApiQuery,
) -> Result<Json<ClimateTrendsResponse>, ApiError> {
    let coords = params.coordinates()?;

    let fetched = state
        .sources
        .climate_trends
        .fetch_with_key(&coords.cache_key(), |api_key| {
            visual_crossing::fetch_climate_trends(
                state.upstream.as_ref(),
                &state.config.visual_crossing_base_url,
                coords,
                api_key,
            )
        })
        .await?;
    let trends = fetched.value;

    Ok(Json(ClimateTrendsResponse {
        success: true,
        climate_trends: trends.summary,
        raw_data: RawClimateData {
            days: trends.days,
            timeline: trends.timeline,
        },
        timestamp: Utc::now(),
        source: "Visual Crossing API",
    }))
}

pub async fn get_news(
    State(state): State<AppState>,
    params: ApiQuery,
) -> Result<Json<NewsFeed>, ApiError> {
    let limit = params.article_limit()?;

    let fetched = state
        .sources
        .news
        .fetch_with_key("news", |token| {
            gnews::fetch_news(
                state.upstream.as_ref(),
                &state.config.gnews_base_url,
                limit,
                token,
            )
        })
        .await?;

    Ok(Json(fetched.value.truncated(limit)))
}

pub async fn get_ocean_conditions(
    State(state): State<AppState>,
    params: ApiQuery,
) -> Result<Json<OceanConditionsResponse>, ApiError> {
    let coords = params.coordinates()?;
    let key = coords.cache_key();
    let upstream = state.upstream.as_ref();

    let (weather, station) = tokio::join!(
        state.sources.conditions.fetch(&key, || {
            open_meteo::fetch_conditions(upstream, &state.config.open_meteo_base_url, coords)
        }),
        state.sources.station_air.fetch(&key, || {
            openaq::fetch_nearest_station(upstream, &state.config.openaq_base_url, coords)
        }),
    );

    let weather =
        weather.map_err(|err| ApiError::internal("Unable to fetch ocean conditions", err))?;
    let air_quality = station.ok().and_then(|fetched| fetched.value);

    Ok(Json(OceanConditionsResponse {
        success: true,
        weather: weather.value.weather,
        air_quality,
        timestamp: Utc::now(),
    }))
}

pub async fn get_cached_ocean_conditions(
    State(state): State<AppState>,
    params: ApiQuery,
) -> Result<Json<CachedConditionsResponse>, ApiError> {
    let coords = params.coordinates()?;

    let fetched = state
        .sources
        .cached_conditions
        .fetch(&coords.cache_key(), || {
            open_meteo::fetch_conditions(
                state.upstream.as_ref(),
                &state.config.open_meteo_base_url,
                coords,
            )
        })
        .await
        .map_err(|err| ApiError::internal("Unable to fetch ocean conditions", err))?;

    Ok(Json(CachedConditionsResponse {
        success: true,
        from_cache: fetched.is_cached(),
        weather: fetched.value.weather,
        timestamp: fetched.value.fetched_at,
    }))
}

pub async fn reverse_geocode(
    State(state): State<AppState>,
    params: ApiQuery,
) -> Result<Json<GeocodeResponse>, ApiError> {
    let coords = params.coordinates()?;

    let fetched = state
        .sources
        .geocoder
        .fetch(&coords.cache_key(), || {
            nominatim::reverse_geocode(
                state.upstream.as_ref(),
                &state.config.nominatim_base_url,
                coords,
            )
        })
        .await
        .map_err(|err| ApiError::internal("Unable to geocode location", err))?;

    Ok(Json(GeocodeResponse {
        success: true,
        place: fetched.value,
        timestamp: Utc::now(),
    }))
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/weather", get(get_weather))
        .route("/api/air-quality", get(get_air_quality))
        .route("/api/debris-heatmap", get(get_debris_heatmap))
        .route("/api/uv-index", get(get_uv_index))
        .route("/api/marine-weather", get(get_marine_weather))
        .route("/api/climate-trends", get(get_climate_trends))
        .route("/api/news", get(get_news))
        .route("/api/ocean-conditions", get(get_ocean_conditions))
        .route("/api/ocean-conditions-cached", get(get_cached_ocean_conditions))
        .route("/api/geocode-location", get(reverse_geocode))
        .route("/api/reverse-geocode", get(reverse_geocode))
        .with_state(state)
}
