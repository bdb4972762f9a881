pub mod debris;
pub mod gnews;
pub mod nominatim;
pub mod open_meteo;
pub mod openaq;
pub mod openuv;
pub mod stormglass;
pub mod visual_crossing;
pub mod waqi;

use std::time::Duration;

use crate::config::Config;
use crate::fetch::DataSource;

pub const FALLBACK_NOTE: &str = "Using fallback data";

pub const SHORT_TTL: Duration = Duration::from_secs(5 * 60); // 5 minutes
pub const CONDITIONS_TTL: Duration = Duration::from_secs(60 * 60); // 1 hour
pub const CLIMATE_TTL: Duration = Duration::from_secs(24 * 60 * 60); // 24 hours

/// Every upstream integration with its cache and failure policy, built once
/// at startup. Each source owns its own store, so keys never collide across
/// sources.
pub struct Sources {
    pub weather: DataSource<open_meteo::CurrentWeather>,
    pub air_quality: DataSource<waqi::AirQuality>,
    pub uv_index: DataSource<openuv::UvReading>,
    pub marine_weather: DataSource<stormglass::MarineForecast>,
    pub climate_trends: DataSource<visual_crossing::ClimateTrends>,
    pub news: DataSource<gnews::NewsFeed>,
    pub conditions: DataSource<open_meteo::ConditionsSnapshot>,
    pub cached_conditions: DataSource<open_meteo::ConditionsSnapshot>,
    pub station_air: DataSource<Option<openaq::StationReading>>,
    pub geocoder: DataSource<nominatim::Place>,
    pub debris_heatmap: DataSource<debris::Heatmap>,
}

impl Sources {
    pub fn from_config(config: &Config) -> Self {
        let timeout = config.upstream_timeout;

        Self {
            // Graceful degradation
            weather: DataSource::new("Open-Meteo", "weather")
                .cached_for(SHORT_TTL)
                .timeout(timeout)
                .degrade_to(open_meteo::weather_fallback),
            air_quality: DataSource::new("WAQI", "air quality")
                .credential(config.waqi_api_key.clone(), "aqicn.org/data-platform/token")
                .cached_for(SHORT_TTL)
                .timeout(timeout)
                .degrade_to(waqi::air_quality_fallback),
            news: DataSource::new("GNews", "news")
                .credential(config.gnews_api_key.clone(), "gnews.io")
                .timeout(timeout)
                .degrade_to(gnews::news_fallback),
            station_air: DataSource::new("OpenAQ", "station air quality")
                .timeout(timeout)
                .degrade_to(openaq::no_station),

            // Hard failure
            uv_index: DataSource::new("OpenUV", "UV index")
                .credential(config.openuv_api_key.clone(), "openuv.io")
                .cached_for(SHORT_TTL)
                .timeout(timeout),
            marine_weather: DataSource::new("Storm Glass", "marine weather")
                .credential(config.stormglass_api_key.clone(), "stormglass.io")
                .timeout(timeout),
            climate_trends: DataSource::new("Visual Crossing", "climate trends")
                .credential(config.visual_crossing_api_key.clone(), "visualcrossing.com")
                .cached_for(CLIMATE_TTL)
                .timeout(timeout),
            conditions: DataSource::new("Open-Meteo", "ocean conditions").timeout(timeout),
            cached_conditions: DataSource::new("Open-Meteo", "ocean conditions")
                .cached_for(CONDITIONS_TTL)
                .timeout(timeout),
            geocoder: DataSource::new("Nominatim", "reverse geocoding").timeout(timeout),

            // Computed locally, so only the cache applies.
            debris_heatmap: DataSource::new("Debris survey", "debris heatmap")
                .cached_for(SHORT_TTL),
        }
    }

    #[cfg(test)]
    pub fn clear_caches(&self) {
        self.weather.clear();
        self.air_quality.clear();
        self.uv_index.clear();
        self.climate_trends.clear();
        self.cached_conditions.clear();
        self.debris_heatmap.clear();
    }

    /// Entries held across every cached source, stale ones included.
    pub async fn cached_entries(&self) -> u64 {
        self.weather.cached_entries().await
            + self.air_quality.cached_entries().await
            + self.uv_index.cached_entries().await
            + self.climate_trends.cached_entries().await
            + self.cached_conditions.cached_entries().await
            + self.debris_heatmap.cached_entries().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttls_follow_policy_table() {
        let sources = Sources::from_config(&Config::default());

        assert_eq!(sources.weather.ttl(), Some(SHORT_TTL));
        assert_eq!(sources.air_quality.ttl(), Some(SHORT_TTL));
        assert_eq!(sources.uv_index.ttl(), Some(SHORT_TTL));
        assert_eq!(sources.debris_heatmap.ttl(), Some(SHORT_TTL));
        assert_eq!(sources.cached_conditions.ttl(), Some(CONDITIONS_TTL));
        assert_eq!(sources.climate_trends.ttl(), Some(CLIMATE_TTL));
        assert_eq!(sources.marine_weather.ttl(), None);
        assert_eq!(sources.news.ttl(), None);
        assert_eq!(sources.conditions.ttl(), None);
    }
}
