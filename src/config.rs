use anyhow::Context;
use std::env;
use std::fmt;
use std::time::Duration;

/// An API credential, classified once at startup.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Present(String),
    Missing,
    /// Still holds the `your_...` text from `.env.example`.
    Placeholder,
}

impl Credential {
    pub fn classify(raw: Option<String>) -> Self {
        match raw {
            None => Credential::Missing,
            Some(value) => {
                let value = value.trim();
                if value.is_empty() {
                    Credential::Missing
                } else if value.to_ascii_lowercase().contains("your_") {
                    Credential::Placeholder
                } else {
                    Credential::Present(value.to_string())
                }
            }
        }
    }

    /// Reads the first of `names` that is set to a non-blank value.
    pub fn from_env(names: &[&str]) -> Self {
        let raw = names
            .iter()
            .filter_map(|name| env::var(name).ok())
            .find(|value| !value.trim().is_empty());
        Self::classify(raw)
    }

    pub fn secret(&self) -> Option<&str> {
        match self {
            Credential::Present(secret) => Some(secret),
            Credential::Missing | Credential::Placeholder => None,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Credential::Present(_) => "configured",
            Credential::Missing => "missing",
            Credential::Placeholder => "placeholder",
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Present(_) => f.write_str("Present(***)"),
            Credential::Missing => f.write_str("Missing"),
            Credential::Placeholder => f.write_str("Placeholder"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub upstream_timeout: Duration,
    pub open_meteo_base_url: String,
    pub waqi_base_url: String,
    pub openuv_base_url: String,
    pub stormglass_base_url: String,
    pub visual_crossing_base_url: String,
    pub gnews_base_url: String,
    pub nominatim_base_url: String,
    pub openaq_base_url: String,
    pub waqi_api_key: Credential,
    pub openuv_api_key: Credential,
    pub stormglass_api_key: Credential,
    pub visual_crossing_api_key: Credential,
    pub gnews_api_key: Credential,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 3000,
            upstream_timeout: Duration::from_secs(5),
            open_meteo_base_url: "https://api.open-meteo.com".to_string(),
            waqi_base_url: "https://api.waqi.info".to_string(),
            openuv_base_url: "https://api.openuv.io".to_string(),
            stormglass_base_url: "https://api.stormglass.io".to_string(),
            visual_crossing_base_url: "https://weather.visualcrossing.com".to_string(),
            gnews_base_url: "https://gnews.io".to_string(),
            nominatim_base_url: "https://nominatim.openstreetmap.org".to_string(),
            openaq_base_url: "https://api.openaq.org".to_string(),
            waqi_api_key: Credential::Missing,
            openuv_api_key: Credential::Missing,
            stormglass_api_key: Credential::Missing,
            visual_crossing_api_key: Credential::Missing,
            gnews_api_key: Credential::Missing,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Config::default();

        let port = match env::var("PORT") {
            Ok(port) => port
                .parse()
                .with_context(|| format!("PORT must be a port number, got {port:?}"))?,
            Err(_) => defaults.port,
        };
        let upstream_timeout = match env::var("UPSTREAM_TIMEOUT_SECS") {
            Ok(secs) => Duration::from_secs(secs.parse().with_context(|| {
                format!("UPSTREAM_TIMEOUT_SECS must be whole seconds, got {secs:?}")
            })?),
            Err(_) => defaults.upstream_timeout,
        };

        Ok(Config {
            port,
            upstream_timeout,
            open_meteo_base_url: env::var("OPEN_METEO_BASE_URL")
                .unwrap_or(defaults.open_meteo_base_url),
            waqi_base_url: env::var("WAQI_BASE_URL").unwrap_or(defaults.waqi_base_url),
            openuv_base_url: env::var("OPENUV_BASE_URL").unwrap_or(defaults.openuv_base_url),
            stormglass_base_url: env::var("STORMGLASS_BASE_URL")
                .unwrap_or(defaults.stormglass_base_url),
            visual_crossing_base_url: env::var("VISUAL_CROSSING_BASE_URL")
                .unwrap_or(defaults.visual_crossing_base_url),
            gnews_base_url: env::var("GNEWS_BASE_URL").unwrap_or(defaults.gnews_base_url),
            nominatim_base_url: env::var("NOMINATIM_BASE_URL")
                .unwrap_or(defaults.nominatim_base_url),
            openaq_base_url: env::var("OPENAQ_BASE_URL").unwrap_or(defaults.openaq_base_url),
            waqi_api_key: Credential::from_env(&["WAQI_API_KEY"]),
            openuv_api_key: Credential::from_env(&["OPENUV_API_KEY"]),
            stormglass_api_key: Credential::from_env(&[
                "STORM_GLASS_API_KEY",
                "STORMGLASS_API_KEY",
            ]),
            visual_crossing_api_key: Credential::from_env(&["VISUAL_CROSSING_API_KEY"]),
            gnews_api_key: Credential::from_env(&["GNEWS_API_KEY"]),
        })
    }

    pub fn credentials(&self) -> [(&'static str, &Credential); 5] {
        [
            ("WAQI", &self.waqi_api_key),
            ("OpenUV", &self.openuv_api_key),
            ("Storm Glass", &self.stormglass_api_key),
            ("Visual Crossing", &self.visual_crossing_api_key),
            ("GNews", &self.gnews_api_key),
        ]
    }
}
