use std::env;
use std::time::Duration;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const DEFAULT_DATABASE: &str = "Plans";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_GOOGLE_MAPS_BASE_URL: &str = "https://maps.googleapis.com/maps/api";
const DEFAULT_HOTEL_API_HOST: &str = "booking-com15.p.rapidapi.com";
const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const DEFAULT_TRANSPORT_COST_PER_KM: f64 = 0.5;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_FALLBACK_IMAGE_URL: &str = "/images/placeholder-destination.jpg";

/// Runtime configuration, read once at startup.
///
/// Provider keys are optional: a missing key leaves the matching client in a
/// "not configured" state instead of refusing to boot.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: Option<String>,
    pub mongodb_database: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub google_maps_api_key: Option<String>,
    pub google_maps_base_url: String,
    pub hotel_api_key: Option<String>,
    pub hotel_api_host: String,
    pub hotel_api_base_url: String,
    pub weather_api_key: Option<String>,
    pub weather_base_url: String,
    pub transport_cost_per_km: f64,
    pub fallback_image_url: String,
    pub http_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: HOST.to_string(),
            port: PORT,
            mongodb_uri: None,
            mongodb_database: DEFAULT_DATABASE.to_string(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            google_maps_api_key: None,
            google_maps_base_url: DEFAULT_GOOGLE_MAPS_BASE_URL.to_string(),
            hotel_api_key: None,
            hotel_api_host: DEFAULT_HOTEL_API_HOST.to_string(),
            hotel_api_base_url: format!("https://{}", DEFAULT_HOTEL_API_HOST),
            weather_api_key: None,
            weather_base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            transport_cost_per_km: DEFAULT_TRANSPORT_COST_PER_KM,
            fallback_image_url: DEFAULT_FALLBACK_IMAGE_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let hotel_api_host = env::var("HOTEL_API_HOST").unwrap_or(defaults.hotel_api_host);
        let hotel_api_base_url = env::var("HOTEL_API_BASE_URL")
            .unwrap_or_else(|_| format!("https://{}", hotel_api_host));

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(PORT),
            mongodb_uri: non_empty_var("MONGODB_URI"),
            mongodb_database: env::var("MONGODB_DATABASE").unwrap_or(defaults.mongodb_database),
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            openai_base_url: env::var("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            openai_model: env::var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            google_maps_api_key: non_empty_var("GOOGLE_MAPS_API_KEY"),
            google_maps_base_url: env::var("GOOGLE_MAPS_BASE_URL")
                .unwrap_or(defaults.google_maps_base_url),
            hotel_api_key: non_empty_var("HOTEL_API_KEY"),
            hotel_api_host,
            hotel_api_base_url,
            weather_api_key: non_empty_var("WEATHER_API_KEY"),
            weather_base_url: env::var("WEATHER_BASE_URL").unwrap_or(defaults.weather_base_url),
            transport_cost_per_km: env::var("TRANSPORT_COST_PER_KM")
                .ok()
                .and_then(|cost| cost.parse().ok())
                .filter(|cost: &f64| cost.is_finite() && *cost >= 0.0)
                .unwrap_or(DEFAULT_TRANSPORT_COST_PER_KM),
            fallback_image_url: env::var("FALLBACK_IMAGE_URL")
                .unwrap_or(defaults.fallback_image_url),
            http_timeout: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|secs| secs.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
        }
    }

    /// Shared reqwest client for every provider.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder().timeout(self.http_timeout).build()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn blank_keys_are_treated_as_unset() {
        env::set_var("WEATHER_API_KEY", "   ");
        env::set_var("PORT", "not-a-port");
        let config = AppConfig::from_env();
        assert!(config.weather_api_key.is_none());
        assert_eq!(config.port, PORT);
        env::remove_var("WEATHER_API_KEY");
        env::remove_var("PORT");
    }

    #[test]
    #[serial]
    fn negative_transport_cost_falls_back_to_default() {
        env::set_var("TRANSPORT_COST_PER_KM", "-3");
        let config = AppConfig::from_env();
        assert_eq!(config.transport_cost_per_km, DEFAULT_TRANSPORT_COST_PER_KM);
        env::set_var("TRANSPORT_COST_PER_KM", "1.25");
        let config = AppConfig::from_env();
        assert_eq!(config.transport_cost_per_km, 1.25);
        env::remove_var("TRANSPORT_COST_PER_KM");
    }

    #[test]
    #[serial]
    fn hotel_base_url_follows_host() {
        env::remove_var("HOTEL_API_BASE_URL");
        env::set_var("HOTEL_API_HOST", "hotels.example.test");
        let config = AppConfig::from_env();
        assert_eq!(config.hotel_api_base_url, "https://hotels.example.test");
        env::remove_var("HOTEL_API_HOST");
    }
}
