//! Animated weather radar split across several display segments.
//!
//! [`FieldRenderer`] turns an observation and an animation phase into rows of
//! intensity symbols; [`SegmentController`] keeps a set of sink-owned display
//! segments in lock-step; [`spawn_session`] drives both from one task.

pub mod controller;
pub mod render;
pub mod segment;
pub mod session;
pub mod sink;
pub mod symbols;

pub use controller::{
    Clock, ControllerError, ControllerSettings, DisplayState, SegmentController, SystemClock,
};
pub use render::{FieldRenderer, HeaderContext};
pub use segment::{partition, segment_count, Segment};
pub use session::{spawn_session, CommandError, RadarHandle, SessionStatus, HELP_TEXT};
pub use sink::{RenderSink, SinkError};
pub use symbols::{Intensity, SymbolTable};
