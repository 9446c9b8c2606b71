//! Forward geocoding: place name to coordinates.
//! Uses the Open-Meteo geocoding API - free, no API key required.

use crate::retry::{with_retry, RetryPolicy};
use crate::types::{Location, WeatherError};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const CANDIDATE_COUNT: &str = "5";

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("No results for {0:?}")]
    NotFound(String),
    #[error("Geocoding request failed: {0}")]
    Upstream(#[from] WeatherError),
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    name: String,
    country: Option<String>,
    country_code: Option<String>,
    latitude: f64,
    longitude: f64,
}

impl SearchResult {
    fn is_united_states(&self) -> bool {
        self.country.as_deref() == Some("United States") || self.country_code.as_deref() == Some("US")
    }

    fn into_location(self) -> Location {
        let name = match self.country {
            Some(country) if !country.is_empty() => format!("{}, {}", self.name, country),
            _ => self.name,
        };
        Location::new(name, self.latitude, self.longitude)
    }
}

/// Pick the best candidate: a United States match if any, else the first.
fn best_match(results: Vec<SearchResult>) -> Option<Location> {
    let index = results.iter().position(SearchResult::is_united_states).unwrap_or(0);
    results.into_iter().nth(index).map(SearchResult::into_location)
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Arc<Client>,
    base_url: String,
    retry: RetryPolicy,
}

impl Geocoder {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.into(),
            retry,
        })
    }

    /// Resolve `query` to a single location.
    pub async fn search(&self, query: &str) -> Result<Location, GeocodeError> {
        tracing::info!("Searching for: {:?}", query);

        let body: SearchResponse = with_retry(&self.retry, || self.request(query)).await?;

        match best_match(body.results) {
            Some(location) => {
                tracing::info!("Found: {}", location.name);
                Ok(location)
            }
            None => {
                tracing::info!("No results found for: {:?}", query);
                Err(GeocodeError::NotFound(query.to_string()))
            }
        }
    }

    async fn request(&self, query: &str) -> Result<SearchResponse, WeatherError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("name", query), ("count", CANDIDATE_COUNT)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WeatherError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, country: &str, code: &str) -> SearchResult {
        SearchResult {
            name: name.to_string(),
            country: Some(country.to_string()),
            country_code: Some(code.to_string()),
            latitude: 1.0,
            longitude: 2.0,
        }
    }

    #[test]
    fn test_prefers_united_states() {
        let results = vec![
            result("Paris", "France", "FR"),
            result("Paris", "United States", "US"),
        ];
        let location = best_match(results).unwrap();
        assert_eq!(location.name, "Paris, United States");
    }

    #[test]
    fn test_country_code_alone_counts() {
        let mut us = result("Austin", "", "US");
        us.country = None;
        let location = best_match(vec![result("Austin", "Canada", "CA"), us]).unwrap();
        assert_eq!(location.name, "Austin");
    }

    #[test]
    fn test_falls_back_to_first() {
        let results = vec![result("Oslo", "Norway", "NO"), result("Oslo", "Sweden", "SE")];
        assert_eq!(best_match(results).unwrap().name, "Oslo, Norway");
    }

    #[test]
    fn test_empty_results() {
        assert!(best_match(Vec::new()).is_none());
    }

    #[test]
    fn test_missing_results_key_parses_as_empty() {
        let body: SearchResponse = serde_json::from_str(r#"{"generationtime_ms":0.5}"#).unwrap();
        assert!(body.results.is_empty());
    }
}
