//! Time-to-live cache for the active location's observation.
//!
//! A failed refresh never clears what we already have: stale data is
//! preferred over no data, and with nothing cached callers get
//! [`Observation::neutral`].

use crate::provider::ObservationSource;
use crate::types::{Location, Observation};

pub const DEFAULT_TTL_MS: i64 = 300_000;

#[derive(Debug, Clone)]
pub struct ObservationCache {
    data: Option<Observation>,
    fetched_at_ms: i64,
    ttl_ms: i64,
}

impl Default for ObservationCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_MS)
    }
}

impl ObservationCache {
    pub fn new(ttl_ms: i64) -> Self {
        Self {
            data: None,
            fetched_at_ms: 0,
            ttl_ms,
        }
    }

    pub fn data(&self) -> Option<&Observation> {
        self.data.as_ref()
    }

    pub fn fetched_at_ms(&self) -> i64 {
        self.fetched_at_ms
    }

    pub fn is_stale(&self, now_ms: i64) -> bool {
        self.data.is_none() || now_ms - self.fetched_at_ms > self.ttl_ms
    }

    /// Return the cached observation, refreshing from `source` first if stale.
    ///
    /// Never fails. Upstream errors (timeouts included) are logged and the
    /// previous value is returned with its timestamp untouched.
    pub async fn get_observation<S: ObservationSource>(
        &mut self,
        source: &S,
        location: &Location,
        now_ms: i64,
    ) -> Observation {
        if self.is_stale(now_ms) {
            match source.fetch_current(location).await {
                Ok(observation) => {
                    self.data = Some(observation);
                    self.fetched_at_ms = now_ms;
                }
                Err(e) if self.data.is_some() => {
                    tracing::warn!("Weather refresh for {} failed, keeping stale data: {}", location.name, e);
                }
                Err(e) => {
                    tracing::warn!("Weather fetch for {} failed, no data yet: {}", location.name, e);
                }
            }
        }

        self.data.unwrap_or_else(Observation::neutral)
    }

    /// Forget everything. The next `get_observation` always fetches.
    pub fn reset(&mut self) {
        self.data = None;
        self.fetched_at_ms = 0;
    }
}
