//! OpenWeatherMap client
//!
//! Current conditions by coordinates or city name, metric units.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Weather client errors
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Location not found: {0}")]
    NotFound(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Condensed current-weather report relayed to the browser
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub city: String,
    /// Degrees Celsius, rounded
    pub temp: i64,
    /// Main condition group, e.g. "Rain", "Clouds", "Clear"
    pub condition: String,
    /// Relative humidity, percent
    pub humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    #[serde(default)]
    name: String,
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    main: String,
}

impl TryFrom<OwmResponse> for WeatherReport {
    type Error = WeatherError;

    fn try_from(response: OwmResponse) -> Result<Self, Self::Error> {
        let condition = response
            .weather
            .into_iter()
            .next()
            .map(|w| w.main)
            .ok_or_else(|| WeatherError::Parse("response has no weather conditions".to_string()))?;

        Ok(Self {
            city: response.name,
            temp: response.main.temp.round() as i64,
            condition,
            humidity: response.main.humidity,
        })
    }
}

/// OpenWeatherMap API client
pub struct WeatherClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Current weather at a coordinate pair
    ///
    /// Coordinates are passed through as given; the API validates them.
    pub async fn by_coordinates(&self, lat: &str, lon: &str) -> Result<WeatherReport, WeatherError> {
        self.fetch(&[("lat", lat), ("lon", lon)], &format!("{},{}", lat, lon))
            .await
    }

    /// Current weather for a city name ("London", "Paris,FR")
    pub async fn by_city(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        self.fetch(&[("q", city)], city).await
    }

    async fn fetch(
        &self,
        location: &[(&str, &str)],
        label: &str,
    ) -> Result<WeatherReport, WeatherError> {
        let url = format!("{}/weather", self.base_url);
        debug!(url = %url, location = %label, "Querying OpenWeatherMap");

        let response = self
            .http_client
            .get(&url)
            .query(location)
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(WeatherError::NotFound(label.to_string()));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(WeatherError::Api(status.as_u16(), error_text));
        }

        let body: OwmResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        WeatherReport::try_from(body)
    }
}
