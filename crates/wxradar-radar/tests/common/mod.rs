//! Test doubles shared by the controller and session tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeZone};
use parking_lot::Mutex;
use wxradar_radar::{
    Clock, ControllerSettings, FieldRenderer, RenderSink, SegmentController, SinkError, SymbolTable,
};
use wxradar_weather::{
    GeocodeError, Location, LocationResolver, Observation, ObservationSource, WeatherError,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Create(u64, String),
    Update(u64, String),
    Delete(u64),
}

#[derive(Debug, Default)]
struct SinkState {
    next_handle: u64,
    create_calls: usize,
    failing_creates: HashSet<usize>,
    gone: HashSet<u64>,
    transient: HashSet<u64>,
    events: Vec<SinkEvent>,
}

/// Records every sink call; failures are scripted per call or per handle.
#[derive(Debug, Clone, Default)]
pub struct MockSink {
    state: Arc<Mutex<SinkState>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `n`th create call (0-based) fails.
    pub fn fail_create(&self, n: usize) {
        self.state.lock().failing_creates.insert(n);
    }

    /// Updates and deletes of `handle` report the target as gone.
    pub fn mark_gone(&self, handle: u64) {
        self.state.lock().gone.insert(handle);
    }

    /// Updates and deletes of `handle` fail with a transient error.
    pub fn mark_transient(&self, handle: u64) {
        self.state.lock().transient.insert(handle);
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.state.lock().events.clone()
    }

    pub fn updates(&self) -> Vec<(u64, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Update(h, text) => Some((h, text)),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<u64> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Delete(h) => Some(h),
                _ => None,
            })
            .collect()
    }

    pub fn clear_events(&self) {
        self.state.lock().events.clear();
    }

    fn check(state: &SinkState, handle: u64) -> Result<(), SinkError> {
        if state.gone.contains(&handle) {
            Err(SinkError::TargetGone)
        } else if state.transient.contains(&handle) {
            Err(SinkError::transient("rate limited"))
        } else {
            Ok(())
        }
    }
}

impl RenderSink for MockSink {
    type Handle = u64;

    async fn create_segment(&self, text: &str) -> Result<u64, SinkError> {
        let mut state = self.state.lock();
        let call = state.create_calls;
        state.create_calls += 1;
        if state.failing_creates.contains(&call) {
            return Err(SinkError::transient("create rejected"));
        }
        state.next_handle += 1;
        let handle = state.next_handle;
        state.events.push(SinkEvent::Create(handle, text.to_string()));
        Ok(handle)
    }

    async fn update_segment(&self, handle: &u64, text: &str) -> Result<(), SinkError> {
        let mut state = self.state.lock();
        Self::check(&state, *handle)?;
        state.events.push(SinkEvent::Update(*handle, text.to_string()));
        Ok(())
    }

    async fn delete_segment(&self, handle: &u64) -> Result<(), SinkError> {
        let mut state = self.state.lock();
        Self::check(&state, *handle)?;
        state.events.push(SinkEvent::Delete(*handle));
        Ok(())
    }
}

/// Serves a fixed observation, or fails while `down` is set. Counts fetches.
#[derive(Debug, Clone)]
pub struct StubSource {
    observation: Arc<Mutex<Option<Observation>>>,
    fetches: Arc<AtomicUsize>,
}

impl StubSource {
    pub fn new(observation: Observation) -> Self {
        Self {
            observation: Arc::new(Mutex::new(Some(observation))),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set(&self, observation: Observation) {
        *self.observation.lock() = Some(observation);
    }

    pub fn go_down(&self) {
        *self.observation.lock() = None;
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ObservationSource for StubSource {
    async fn fetch_current(&self, _location: &Location) -> Result<Observation, WeatherError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let current = *self.observation.lock();
        current.ok_or(WeatherError::Status(503))
    }
}

/// Knows a fixed set of place names; the active-weather pick is fixed too.
#[derive(Debug)]
pub struct StubResolver {
    known: Vec<Location>,
    active: Location,
    upstream_down: bool,
}

impl StubResolver {
    pub fn new(known: Vec<Location>, active: Location) -> Self {
        Self {
            known,
            active,
            upstream_down: false,
        }
    }

    pub fn down(mut self) -> Self {
        self.upstream_down = true;
        self
    }
}

impl LocationResolver for StubResolver {
    async fn resolve_by_name(&self, query: &str) -> Result<Location, GeocodeError> {
        if self.upstream_down {
            return Err(GeocodeError::Upstream(WeatherError::Status(500)));
        }
        self.known
            .iter()
            .find(|l| l.name.to_lowercase().starts_with(&query.to_lowercase()))
            .cloned()
            .ok_or_else(|| GeocodeError::NotFound(query.to_string()))
    }

    async fn find_active_weather(&self) -> Location {
        self.active.clone()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

pub fn fixed_time() -> DateTime<FixedOffset> {
    FixedOffset::west_opt(5 * 3600)
        .unwrap()
        .with_ymd_and_hms(2026, 10, 16, 14, 3, 5)
        .single()
        .unwrap()
}

pub fn katy() -> Location {
    Location::new("Katy, TX", 29.785786, -95.824394)
}

pub fn rainy() -> Observation {
    Observation::new(Some(24.4), 3.2, 63, Some(18.0))
}

/// Zero pacing so tests only wait on the tick interval.
pub fn fast_settings() -> ControllerSettings {
    ControllerSettings {
        create_delay: Duration::ZERO,
        delete_delay: Duration::ZERO,
        relocate_delay: Duration::ZERO,
        ..ControllerSettings::default()
    }
}

pub fn controller(sink: MockSink, source: StubSource) -> SegmentController<MockSink, StubSource> {
    controller_with(sink, source, fast_settings())
}

pub fn controller_with(
    sink: MockSink,
    source: StubSource,
    settings: ControllerSettings,
) -> SegmentController<MockSink, StubSource> {
    SegmentController::new(
        sink,
        source,
        FieldRenderer::new(22, 21, SymbolTable::default()),
        settings,
        katy(),
    )
    .with_clock(Arc::new(FixedClock(fixed_time())))
}

/// Clock the test moves by hand.
#[derive(Debug, Clone)]
pub struct ManualClock(Arc<Mutex<DateTime<FixedOffset>>>);

impl ManualClock {
    pub fn new(start: DateTime<FixedOffset>) -> Self {
        Self(Arc::new(Mutex::new(start)))
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.0.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.0.lock()
    }
}
