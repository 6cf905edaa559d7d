use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WeatherReport {
    pub location: String,
    /// `current` or `forecast`.
    pub kind: String,
    pub timestamp: i64,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u32,
    pub wind_speed: f64,
    pub condition: String,
    pub description: String,
    pub icon: String,
    pub mock: bool,
}

impl WeatherReport {
    /// Fixed payload served when no weather provider is usable.
    pub fn mock(location: &str) -> Self {
        Self {
            location: location.to_string(),
            kind: "current".to_string(),
            timestamp: 0,
            temperature: 22.0,
            feels_like: 21.5,
            temp_min: 18.0,
            temp_max: 25.0,
            humidity: 60,
            wind_speed: 3.5,
            condition: "Clear".to_string(),
            description: "clear sky".to_string(),
            icon: "01d".to_string(),
            mock: true,
        }
    }
}
