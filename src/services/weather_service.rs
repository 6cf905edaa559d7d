use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::config::AppConfig;
use crate::error::ClientError;
use crate::models::weather::WeatherReport;

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current weather, or the forecast entry closest to `at` when given.
    async fn weather(
        &self,
        location: &str,
        at: Option<DateTime<Utc>>,
    ) -> Result<WeatherReport, ClientError>;
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u32,
}

#[derive(Debug, Deserialize, Default)]
struct WindBlock {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct Observation {
    dt: i64,
    main: MainBlock,
    #[serde(default)]
    wind: WindBlock,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<Observation>,
    city: Option<ForecastCity>,
}

#[derive(Debug, Deserialize)]
struct ForecastCity {
    name: String,
}

impl Observation {
    fn into_report(self, location: &str, kind: &str) -> WeatherReport {
        let condition = self.weather.into_iter().next();
        WeatherReport {
            location: self.name.unwrap_or_else(|| location.to_string()),
            kind: kind.to_string(),
            timestamp: self.dt,
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            temp_min: self.main.temp_min,
            temp_max: self.main.temp_max,
            humidity: self.main.humidity,
            wind_speed: self.wind.speed,
            condition: condition
                .as_ref()
                .map(|c| c.main.clone())
                .unwrap_or_default(),
            description: condition
                .as_ref()
                .map(|c| c.description.clone())
                .unwrap_or_default(),
            icon: condition.map(|c| c.icon).unwrap_or_default(),
            mock: false,
        }
    }
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (UTC) or a bare date (noon UTC).
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .map(|datetime| datetime.and_utc())
}

pub struct OpenWeatherClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenWeatherClient {
    pub fn new(http_client: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            http_client,
            api_key: config.weather_api_key.clone(),
            base_url: config.weather_base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        location: &str,
    ) -> Result<T, ClientError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ClientError::NotConfigured("Weather API key"))?;

        let response = self
            .http_client
            .get(format!("{}/{}", self.base_url, endpoint))
            .query(&[("q", location), ("units", "metric"), ("appid", api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::from_status(status, body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(format!("Failed to parse weather response: {}", e)))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn weather(
        &self,
        location: &str,
        at: Option<DateTime<Utc>>,
    ) -> Result<WeatherReport, ClientError> {
        match at {
            None => {
                let observation: Observation = self.get_json("weather", location).await?;
                Ok(observation.into_report(location, "current"))
            }
            Some(at) => {
                let forecast: ForecastResponse = self.get_json("forecast", location).await?;
                let city = forecast.city.map(|city| city.name);
                let target = at.timestamp();
                let closest = forecast
                    .list
                    .into_iter()
                    .min_by_key(|entry| (entry.dt - target).abs())
                    .ok_or_else(|| ClientError::NotFound(location.to_string()))?;
                let mut report = closest.into_report(location, "forecast");
                if let Some(city) = city {
                    report.location = city;
                }
                Ok(report)
            }
        }
    }
}
