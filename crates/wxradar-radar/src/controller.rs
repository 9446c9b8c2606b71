//! Multi-segment display controller.
//!
//! Owns the ordered segments of one radar map and moves them through
//! `Idle -> Displaying -> Animating -> Idle`. Every sink call is awaited
//! before the next one is issued, in ascending row order.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local};
use wxradar_core::RadarConfig;
use wxradar_weather::{Location, Observation, ObservationCache, ObservationSource};

use crate::render::{FieldRenderer, HeaderContext};
use crate::segment::{partition, Segment};
use crate::sink::{RenderSink, SinkError};

/// Progress is logged every this many animation cycles.
const PROGRESS_LOG_CYCLES: u64 = 20;

/// Wall clock used for the header and cache staleness.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Idle,
    Displaying,
    Animating,
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DisplayState::Idle => "idle",
            DisplayState::Displaying => "displaying",
            DisplayState::Animating => "animating",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("{operation} is not valid while {state}")]
    InvalidState {
        operation: &'static str,
        state: DisplayState,
    },
}

/// Timing and layout knobs, fixed for the controller's lifetime.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub rows_per_segment: usize,
    pub phase_step: f64,
    /// Pause between whole animation cycles; also spread across segment edits.
    pub tick_interval: Duration,
    pub observation_ttl_ms: i64,
    pub create_delay: Duration,
    pub delete_delay: Duration,
    pub relocate_delay: Duration,
}

impl From<&RadarConfig> for ControllerSettings {
    fn from(config: &RadarConfig) -> Self {
        Self {
            rows_per_segment: config.rows_per_segment,
            phase_step: config.phase_step,
            tick_interval: Duration::from_millis(config.tick_interval_ms),
            observation_ttl_ms: config.observation_ttl_ms,
            create_delay: Duration::from_millis(config.create_delay_ms),
            delete_delay: Duration::from_millis(config.delete_delay_ms),
            relocate_delay: Duration::from_millis(config.relocate_delay_ms),
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&RadarConfig::default())
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

pub struct SegmentController<K: RenderSink, W> {
    sink: K,
    source: W,
    renderer: FieldRenderer,
    settings: ControllerSettings,
    clock: Arc<dyn Clock>,
    cache: ObservationCache,
    location: Location,
    phase: f64,
    state: DisplayState,
    segments: Vec<Segment<K::Handle>>,
    cycles: u64,
}

impl<K: RenderSink, W: ObservationSource> SegmentController<K, W> {
    pub fn new(
        sink: K,
        source: W,
        renderer: FieldRenderer,
        settings: ControllerSettings,
        location: Location,
    ) -> Self {
        let cache = ObservationCache::new(settings.observation_ttl_ms);
        Self {
            sink,
            source,
            renderer,
            settings,
            clock: Arc::new(SystemClock),
            cache,
            location,
            phase: 0.0,
            state: DisplayState::Idle,
            segments: Vec::new(),
            cycles: 0,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn segments(&self) -> &[Segment<K::Handle>] {
        &self.segments
    }

    pub fn segment_rows(&self) -> Vec<Range<usize>> {
        self.segments.iter().map(|s| s.rows.clone()).collect()
    }

    pub fn renderer(&self) -> &FieldRenderer {
        &self.renderer
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn cache(&self) -> &ObservationCache {
        &self.cache
    }

    /// Completed animation cycles since the controller was built.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    fn require(&self, operation: &'static str, allowed: &[DisplayState]) -> Result<(), ControllerError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(ControllerError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    async fn observe(&mut self, now: DateTime<FixedOffset>) -> Observation {
        self.cache
            .get_observation(&self.source, &self.location, now.timestamp_millis())
            .await
    }

    fn frame(&self, rows: Range<usize>, observation: &Observation, now: DateTime<FixedOffset>) -> String {
        let header = HeaderContext {
            location_name: &self.location.name,
            timestamp: now,
        };
        self.renderer.render_text(self.phase, rows, observation, &header)
    }

    /// Partition the grid and ask the sink for one display object per segment.
    ///
    /// Segments the sink fails to create are skipped. Returns how many were
    /// created; with none the controller stays idle.
    pub async fn create_display(&mut self) -> Result<usize, ControllerError> {
        self.require("create_display", &[DisplayState::Idle])?;

        let ranges = partition(self.renderer.height(), self.settings.rows_per_segment);
        let total = ranges.len();
        tracing::info!("Creating weather radar map with {} segments", total);

        let now = self.clock.now();
        let observation = self.observe(now).await;

        for (i, rows) in ranges.into_iter().enumerate() {
            if i > 0 {
                pause(self.settings.create_delay).await;
            }
            let text = self.frame(rows.clone(), &observation, now);
            match self.sink.create_segment(&text).await {
                Ok(handle) => {
                    tracing::debug!(
                        "Sent radar segment {}/{} (rows {}-{})",
                        i + 1,
                        total,
                        rows.start,
                        rows.end
                    );
                    self.segments.push(Segment { handle, rows });
                }
                Err(e) => tracing::error!("Error sending radar segment {}: {}", i, e),
            }
        }

        if self.segments.is_empty() {
            tracing::warn!("No radar segments could be created");
        } else {
            self.state = DisplayState::Displaying;
            tracing::info!(
                "Created {} radar segments for continuous map",
                self.segments.len()
            );
        }
        Ok(self.segments.len())
    }

    pub fn start_animation(&mut self) -> Result<(), ControllerError> {
        self.require("start_animation", &[DisplayState::Displaying])?;
        self.state = DisplayState::Animating;
        tracing::info!("Starting weather radar animation");
        Ok(())
    }

    /// Takes effect at the next cycle boundary; an in-flight tick finishes first.
    pub fn stop_animation(&mut self) -> Result<(), ControllerError> {
        self.require("stop_animation", &[DisplayState::Animating])?;
        self.state = DisplayState::Displaying;
        tracing::info!("Stopping weather radar animation");
        Ok(())
    }

    /// One animation cycle: advance the phase, then edit every segment in order.
    pub async fn tick(&mut self) -> Result<(), ControllerError> {
        self.require("tick", &[DisplayState::Animating])?;

        self.phase += self.settings.phase_step;
        self.cycles += 1;

        let now = self.clock.now();
        let observation = self.observe(now).await;
        let spacing = self.settings.tick_interval / self.segments.len().max(1) as u32;
        self.render_all(&observation, now, spacing).await;

        if self.cycles % PROGRESS_LOG_CYCLES == 0 {
            tracing::info!("Weather radar running: {} cycles completed", self.cycles);
        }
        Ok(())
    }

    async fn render_all(&mut self, observation: &Observation, now: DateTime<FixedOffset>, spacing: Duration) {
        let mut i = 0;
        while i < self.segments.len() {
            let text = self.frame(self.segments[i].rows.clone(), observation, now);
            match self.sink.update_segment(&self.segments[i].handle, &text).await {
                Ok(()) => i += 1,
                Err(SinkError::TargetGone) => {
                    let gone = self.segments.remove(i);
                    tracing::warn!(
                        "Radar segment for rows {}-{} removed, {} segments remaining",
                        gone.rows.start,
                        gone.rows.end,
                        self.segments.len()
                    );
                }
                Err(e) => {
                    tracing::error!("Failed to edit radar segment {}: {}", i, e);
                    i += 1;
                }
            }
            pause(spacing).await;
        }

        if self.segments.is_empty() && self.state != DisplayState::Idle {
            tracing::warn!("Every radar segment is gone; display is idle");
            self.state = DisplayState::Idle;
        }
    }

    /// Delete every segment, best-effort, and return to idle.
    ///
    /// Stops the animation first if it is running. Returns how many deletes
    /// the sink acknowledged.
    pub async fn remove_display(&mut self) -> Result<usize, ControllerError> {
        self.require(
            "remove_display",
            &[DisplayState::Displaying, DisplayState::Animating],
        )?;
        if self.state == DisplayState::Animating {
            self.stop_animation()?;
        }

        tracing::info!("Cleaning up radar segments");
        let segments = std::mem::take(&mut self.segments);
        let mut deleted = 0;
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                pause(self.settings.delete_delay).await;
            }
            match self.sink.delete_segment(&segment.handle).await {
                Ok(()) => deleted += 1,
                Err(SinkError::TargetGone) => {
                    tracing::debug!("Radar segment {} was already deleted", i);
                }
                Err(e) => tracing::error!("Failed to delete radar segment {}: {}", i, e),
            }
        }

        self.state = DisplayState::Idle;
        tracing::info!("Cleanup complete");
        Ok(deleted)
    }

    /// Switch to `location`: phase back to 0, cache invalidated.
    ///
    /// With a display up, fresh data is fetched right away and every segment
    /// is redrawn at phase 0 in place. Otherwise only the location changes.
    pub async fn set_location(&mut self, location: Location) {
        tracing::info!("Location updated to: {}", location.name);
        self.location = location;
        self.phase = 0.0;
        self.cache.reset();

        if self.segments.is_empty() {
            return;
        }

        tracing::info!("Fetching weather data for {}", self.location.name);
        let now = self.clock.now();
        let observation = self.observe(now).await;
        if self.cache.data().is_some() {
            tracing::info!(
                "Weather data loaded: {}mm/h precipitation, {}",
                observation.precipitation_mm_per_hr,
                observation.condition().description()
            );
        } else {
            tracing::warn!("No weather data available for {}", self.location.name);
        }

        let spacing = self.settings.relocate_delay;
        self.render_all(&observation, now, spacing).await;
    }
}
