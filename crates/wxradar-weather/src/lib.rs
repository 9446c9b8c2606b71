//! Weather data for wxradar
//!
//! Current observations and forward geocoding via the Open-Meteo APIs, a
//! time-to-live observation cache, and the active-weather location scan.

pub mod cache;
pub mod geocode;
pub mod location;
pub mod provider;
pub mod retry;
pub mod types;

pub use cache::ObservationCache;
pub use geocode::{GeocodeError, Geocoder};
pub use location::{ActiveWeatherFinder, LocationResolver, OpenMeteoResolver};
pub use provider::{ObservationSource, WeatherProvider};
pub use retry::RetryPolicy;
pub use types::*;
