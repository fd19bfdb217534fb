use crate::constants::*;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Timeout applied to every outbound HTTP request
    pub http_timeout_secs: u64,
    pub default_style: String,
    pub routing: RoutingConfig,
    pub geocoding: GeocodingConfig,
    pub icons: IconConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutingConfig {
    /// Directions endpoint; profile and coordinates are appended
    pub base_url: String,

    /// Optional access token (e.g. when pointing at Mapbox or a proxy)
    pub access_token: Option<String>,

    /// Send the token as `Authorization: Bearer` instead of a query param
    pub bearer_auth: bool,

    /// Average speed (km/h) assumed by the straight-line fallback
    pub fallback_speed_kmh: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ROUTING_BASE_URL.to_string(),
            access_token: None,
            bearer_auth: false,
            fallback_speed_kmh: DEFAULT_FALLBACK_SPEED_KMH,
        }
    }
}

impl RoutingConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let fallback_speed_kmh: f64 = env::var("FALLBACK_SPEED_KMH")
            .unwrap_or_else(|_| defaults.fallback_speed_kmh.to_string())
            .parse()
            .map_err(|_| "Invalid FALLBACK_SPEED_KMH")?;

        if !fallback_speed_kmh.is_finite() || fallback_speed_kmh <= 0.0 {
            return Err("FALLBACK_SPEED_KMH must be a positive number".to_string());
        }

        Ok(Self {
            base_url: env::var("ROUTING_BASE_URL").unwrap_or(defaults.base_url),
            access_token: env::var("ROUTING_ACCESS_TOKEN").ok(),
            bearer_auth: env::var("ROUTING_BEARER_AUTH")
                .unwrap_or_else(|_| defaults.bearer_auth.to_string())
                .parse()
                .map_err(|_| "Invalid ROUTING_BEARER_AUTH")?,
            fallback_speed_kmh,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodingConfig {
    pub base_url: String,

    /// Comma-separated ISO country codes restricting forward searches.
    /// Empty means unrestricted.
    pub country_codes: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODER_BASE_URL.to_string(),
            country_codes: DEFAULT_GEOCODER_COUNTRY_CODES.to_string(),
        }
    }
}

impl GeocodingConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        Ok(Self {
            base_url: env::var("GEOCODER_BASE_URL").unwrap_or(defaults.base_url),
            country_codes: env::var("GEOCODER_COUNTRY_CODES").unwrap_or(defaults.country_codes),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IconConfig {
    /// Origin serving `/assets/map-icons/{name}.svg`
    pub base_url: String,
    pub cache_ttl_secs: u64,
    pub cache_max_entries: u64,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ICON_BASE_URL.to_string(),
            cache_ttl_secs: DEFAULT_ICON_CACHE_TTL_SECONDS,
            cache_max_entries: DEFAULT_ICON_CACHE_MAX_ENTRIES,
        }
    }
}

impl IconConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        Ok(Self {
            base_url: env::var("ICON_BASE_URL").unwrap_or(defaults.base_url),
            cache_ttl_secs: env::var("ICON_CACHE_TTL")
                .unwrap_or_else(|_| defaults.cache_ttl_secs.to_string())
                .parse()
                .map_err(|_| "Invalid ICON_CACHE_TTL")?,
            cache_max_entries: env::var("ICON_CACHE_MAX_ENTRIES")
                .unwrap_or_else(|_| defaults.cache_max_entries.to_string())
                .parse()
                .map_err(|_| "Invalid ICON_CACHE_MAX_ENTRIES")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT.parse().unwrap_or(3000),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECONDS,
            default_style: DEFAULT_MAP_STYLE.to_string(),
            routing: RoutingConfig::default(),
            geocoding: GeocodingConfig::default(),
            icons: IconConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let http_timeout_secs: u64 = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_HTTP_TIMEOUT_SECONDS.to_string())
            .parse()
            .map_err(|_| "Invalid HTTP_TIMEOUT_SECS")?;

        if http_timeout_secs == 0 || http_timeout_secs > 120 {
            return Err("HTTP_TIMEOUT_SECS must be between 1 and 120 seconds".to_string());
        }

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            http_timeout_secs,
            default_style: env::var("DEFAULT_MAP_STYLE")
                .unwrap_or_else(|_| DEFAULT_MAP_STYLE.to_string()),
            routing: RoutingConfig::from_env()?,
            geocoding: GeocodingConfig::from_env()?,
            icons: IconConfig::from_env()?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "HOST",
        "PORT",
        "HTTP_TIMEOUT_SECS",
        "DEFAULT_MAP_STYLE",
        "ROUTING_BASE_URL",
        "ROUTING_ACCESS_TOKEN",
        "ROUTING_BEARER_AUTH",
        "FALLBACK_SPEED_KMH",
        "GEOCODER_BASE_URL",
        "GEOCODER_COUNTRY_CODES",
        "ICON_BASE_URL",
        "ICON_CACHE_TTL",
        "ICON_CACHE_MAX_ENTRIES",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_from_empty_env() {
        clear_env();
        let config = Config::from_env().unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.routing.fallback_speed_kmh, 50.0);
        assert_eq!(config.geocoding.country_codes, "fr");
        assert_eq!(config.routing, RoutingConfig::default());
        assert_eq!(config.server_address(), "0.0.0.0:3000");
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        env::set_var("FALLBACK_SPEED_KMH", "30");
        env::set_var("GEOCODER_COUNTRY_CODES", "be,lu");
        env::set_var("ROUTING_ACCESS_TOKEN", "pk.test");

        let config = Config::from_env().unwrap();
        assert_eq!(config.routing.fallback_speed_kmh, 30.0);
        assert_eq!(config.routing.access_token.as_deref(), Some("pk.test"));
        assert_eq!(config.geocoding.country_codes, "be,lu");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_rejects_non_positive_fallback_speed() {
        clear_env();
        env::set_var("FALLBACK_SPEED_KMH", "0");

        assert!(Config::from_env().is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_rejects_bad_timeout() {
        clear_env();
        env::set_var("HTTP_TIMEOUT_SECS", "abc");

        assert_eq!(Config::from_env().unwrap_err(), "Invalid HTTP_TIMEOUT_SECS");

        clear_env();
    }
}
