//! Current-conditions fetching from the Open-Meteo forecast API.

use crate::types::{Location, Observation, WeatherError};
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const CURRENT_FIELDS: &str = "temperature_2m,precipitation,weather_code,wind_speed_10m";

/// Anything that can produce a current observation for a location.
pub trait ObservationSource: Send + Sync {
    fn fetch_current(
        &self,
        location: &Location,
    ) -> impl Future<Output = Result<Observation, WeatherError>> + Send;
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: Option<f64>,
    precipitation: Option<f64>,
    weather_code: Option<i32>,
    wind_speed_10m: Option<f64>,
}

impl From<CurrentBlock> for Observation {
    fn from(current: CurrentBlock) -> Self {
        Observation::new(
            current.temperature_2m,
            current.precipitation.unwrap_or(0.0),
            current.weather_code.unwrap_or(0),
            current.wind_speed_10m,
        )
    }
}

/// Parse a forecast response body into an observation.
pub fn parse_observation(body: &str) -> Result<Observation, WeatherError> {
    let response: ForecastResponse =
        serde_json::from_str(body).map_err(|e| WeatherError::Parse(e.to_string()))?;
    response
        .current
        .map(Observation::from)
        .ok_or(WeatherError::MissingCurrent)
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
}

impl WeatherProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.into(),
        })
    }
}

impl ObservationSource for WeatherProvider {
    async fn fetch_current(&self, location: &Location) -> Result<Observation, WeatherError> {
        let latitude = location.latitude.to_string();
        let longitude = location.longitude.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current", CURRENT_FIELDS),
                ("forecast_days", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WeatherError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let observation = parse_observation(&body)?;
        tracing::debug!(
            "Fetched observation for {}: {:.1}mm/h, code {}",
            location.name,
            observation.precipitation_mm_per_hr,
            observation.weather_code
        );
        Ok(observation)
    }
}
