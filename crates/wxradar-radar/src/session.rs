//! The radar session: one task that owns the controller, runs the animation
//! loop and applies commands between cycles.
//!
//! Commands arrive over a channel and are only looked at between animation
//! cycles, so a location change never lands halfway through a frame.
//! Location lookups run on the caller's task before the change is queued.

use std::ops::Range;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use wxradar_core::{AppError, DisplayError, LocationError};
use wxradar_weather::{GeocodeError, Location, LocationResolver, ObservationSource};

use crate::controller::{DisplayState, SegmentController};
use crate::sink::RenderSink;

const REQUEST_QUEUE: usize = 16;

pub const HELP_TEXT: &str = "\
# 🌦️ Weather Radar Commands

**Basic Commands:**
`.radar` or `.weather` - Start weather radar display
`.stop` - Stop radar and clean up messages
`.location <city>` - Change radar location
`.random` - Find random location with active weather
`.help` - Show this help message

**Examples:**
`.location Miami, FL`
`.location London, UK`
`.location Tokyo, Japan`

**Features:**
• Real-time weather data from Open-Meteo API
• Animated precipitation radar
• Temperature, wind, and precipitation info
• Global location support
• Automatic severe weather detection";

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Could not find location: {0}")]
    LocationNotFound(String),
    #[error("Please provide a location name")]
    EmptyQuery,
    #[error("No radar segments could be displayed")]
    NothingDisplayed,
    #[error("Radar session has shut down")]
    SessionClosed,
}

impl From<CommandError> for AppError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::LocationNotFound(query) => LocationError::NotFound(query).into(),
            CommandError::EmptyQuery => LocationError::EmptyQuery.into(),
            CommandError::NothingDisplayed => DisplayError::NoSegments.into(),
            CommandError::SessionClosed => DisplayError::SessionClosed.into(),
        }
    }
}

/// Snapshot of the session for callers outside the task.
#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub state: DisplayState,
    pub phase: f64,
    pub location: Location,
    pub segment_rows: Vec<Range<usize>>,
    pub cycles: u64,
}

#[derive(Debug)]
enum Request {
    StartDisplay(oneshot::Sender<usize>),
    Stop(oneshot::Sender<usize>),
    SetLocation(Location, oneshot::Sender<()>),
    Status(oneshot::Sender<SessionStatus>),
}

/// Entry points for the command surface. Cheap to clone.
#[derive(Debug)]
pub struct RadarHandle<R> {
    requests: mpsc::Sender<Request>,
    resolver: Arc<R>,
}

impl<R> Clone for RadarHandle<R> {
    fn clone(&self) -> Self {
        Self {
            requests: self.requests.clone(),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<R: LocationResolver> RadarHandle<R> {
    async fn call<T>(&self, request: impl FnOnce(oneshot::Sender<T>) -> Request) -> Result<T, CommandError> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send(request(tx))
            .await
            .map_err(|_| CommandError::SessionClosed)?;
        rx.await.map_err(|_| CommandError::SessionClosed)
    }

    /// Replace any current display with a fresh one and start animating it.
    pub async fn start_display(&self) -> Result<usize, CommandError> {
        match self.call(Request::StartDisplay).await? {
            0 => Err(CommandError::NothingDisplayed),
            created => Ok(created),
        }
    }

    /// Stop animating and delete every segment. Returns how many were deleted.
    pub async fn stop(&self) -> Result<usize, CommandError> {
        self.call(Request::Stop).await
    }

    pub async fn set_location(&self, location: Location) -> Result<(), CommandError> {
        self.call(|tx| Request::SetLocation(location, tx)).await
    }

    pub async fn set_location_by_name(&self, query: &str) -> Result<Location, CommandError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CommandError::EmptyQuery);
        }

        let location = match self.resolver.resolve_by_name(query).await {
            Ok(location) => location,
            Err(GeocodeError::NotFound(_)) => {
                return Err(CommandError::LocationNotFound(query.to_string()));
            }
            Err(e) => {
                tracing::error!("Geocoding error: {}", e);
                return Err(CommandError::LocationNotFound(query.to_string()));
            }
        };

        self.set_location(location.clone()).await?;
        Ok(location)
    }

    pub async fn set_location_random_active(&self) -> Result<Location, CommandError> {
        let location = self.resolver.find_active_weather().await;
        self.set_location(location.clone()).await?;
        Ok(location)
    }

    pub fn help(&self) -> &'static str {
        HELP_TEXT
    }

    pub async fn status(&self) -> Result<SessionStatus, CommandError> {
        self.call(Request::Status).await
    }
}

/// Start the session task.
///
/// The task runs until every [`RadarHandle`] is dropped, then tears the
/// display down and hands the controller back through the join handle.
pub fn spawn_session<K, W, R>(
    controller: SegmentController<K, W>,
    resolver: Arc<R>,
) -> (RadarHandle<R>, JoinHandle<SegmentController<K, W>>)
where
    K: RenderSink + 'static,
    W: ObservationSource + 'static,
    R: LocationResolver,
{
    let (tx, rx) = mpsc::channel(REQUEST_QUEUE);
    let task = tokio::spawn(run(controller, rx));
    (
        RadarHandle {
            requests: tx,
            resolver,
        },
        task,
    )
}

async fn run<K, W>(
    mut controller: SegmentController<K, W>,
    mut requests: mpsc::Receiver<Request>,
) -> SegmentController<K, W>
where
    K: RenderSink,
    W: ObservationSource,
{
    let interval = controller.settings().tick_interval;
    let mut next_tick = Instant::now();

    loop {
        let animating = controller.state() == DisplayState::Animating;
        tokio::select! {
            biased;
            request = requests.recv() => match request {
                Some(request) => {
                    if handle_request(&mut controller, request).await {
                        next_tick = Instant::now();
                    }
                }
                None => break,
            },
            _ = tokio::time::sleep_until(next_tick), if animating => {
                if let Err(e) = controller.tick().await {
                    tracing::warn!("Skipped animation cycle: {}", e);
                }
                next_tick = Instant::now() + interval;
            }
        }
    }

    if controller.state() != DisplayState::Idle {
        if let Err(e) = controller.remove_display().await {
            tracing::warn!("Teardown on shutdown failed: {}", e);
        }
    }
    tracing::info!("Radar session ended");
    controller
}

/// Returns true when the animation was (re)started and the first cycle is due now.
async fn handle_request<K, W>(controller: &mut SegmentController<K, W>, request: Request) -> bool
where
    K: RenderSink,
    W: ObservationSource,
{
    match request {
        Request::StartDisplay(reply) => {
            if controller.state() != DisplayState::Idle {
                if let Err(e) = controller.remove_display().await {
                    tracing::warn!("Could not clear previous display: {}", e);
                }
            }
            let created = match controller.create_display().await {
                Ok(created) => created,
                Err(e) => {
                    tracing::error!("Error creating radar: {}", e);
                    0
                }
            };
            let started = created > 0 && controller.start_animation().is_ok();
            let _ = reply.send(created);
            started
        }
        Request::Stop(reply) => {
            let deleted = if controller.state() == DisplayState::Idle {
                0
            } else {
                controller.remove_display().await.unwrap_or_default()
            };
            let _ = reply.send(deleted);
            false
        }
        Request::SetLocation(location, reply) => {
            controller.set_location(location).await;
            let _ = reply.send(());
            false
        }
        Request::Status(reply) => {
            let _ = reply.send(SessionStatus {
                state: controller.state(),
                phase: controller.phase(),
                location: controller.location().clone(),
                segment_rows: controller.segment_rows(),
                cycles: controller.cycles(),
            });
            false
        }
    }
}
