//! Current-conditions weather lookup (OpenWeather)

use super::LookupOutcome;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Number, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const MISSING_KEY_MESSAGE: &str = "Weather API key not set.";
pub const DEFAULT_OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";

const WEATHER_TIMEOUT: Duration = Duration::from_secs(10);

/// Current conditions for a city. Numbers keep the provider's formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditions {
    pub description: String,
    pub temperature: Number,
    pub humidity: Number,
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("{0}")]
    Http(reqwest::Error),
    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("missing field `{0}` in weather response")]
    MissingField(&'static str),
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        // The URL carries the API key
        WeatherError::Http(e.without_url())
    }
}

/// Source of current weather conditions
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, city: &str) -> Result<Conditions, WeatherError>;
}

/// OpenWeather current-conditions client
pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: impl Into<String>, base_url: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url
                .unwrap_or(DEFAULT_OPENWEATHER_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, city: &str) -> Result<Conditions, WeatherError> {
        let response = self
            .client
            .get(format!("{}/data/2.5/weather", self.base_url))
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .timeout(WEATHER_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v["message"].as_str().map(str::to_string))
                .unwrap_or(body);
            return Err(WeatherError::Status { status, message });
        }

        let body: Value = response.json().await?;
        parse_conditions(&body)
    }
}

/// Pull description, temperature and humidity out of a current-weather body
fn parse_conditions(body: &Value) -> Result<Conditions, WeatherError> {
    let description = body["weather"][0]["description"]
        .as_str()
        .ok_or(WeatherError::MissingField("weather[0].description"))?
        .to_string();
    let temperature = body["main"]["temp"]
        .as_number()
        .cloned()
        .ok_or(WeatherError::MissingField("main.temp"))?;
    let humidity = body["main"]["humidity"]
        .as_number()
        .cloned()
        .ok_or(WeatherError::MissingField("main.humidity"))?;

    Ok(Conditions {
        description,
        temperature,
        humidity,
    })
}

/// Weather lookup that degrades to a fixed message when no key is configured
#[derive(Clone)]
pub struct WeatherLookup {
    provider: Option<Arc<dyn WeatherProvider>>,
}

impl WeatherLookup {
    pub fn new(provider: Option<Arc<dyn WeatherProvider>>) -> Self {
        Self { provider }
    }

    pub async fn lookup_weather(&self, city: &str) -> LookupOutcome {
        let Some(provider) = &self.provider else {
            return LookupOutcome::Failed(MISSING_KEY_MESSAGE.to_string());
        };

        match provider.current(city).await {
            Ok(c) => LookupOutcome::Found(format!(
                "Weather in {city}: {}, {}°C, humidity {}%.",
                c.description, c.temperature, c.humidity
            )),
            Err(e) => {
                tracing::warn!(city = %city, error = %e, "Weather lookup failed");
                LookupOutcome::Failed(format!("Could not fetch weather for {city}: {e}"))
            }
        }
    }
}
