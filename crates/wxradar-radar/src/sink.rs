//! The external display surface segments are drawn on.

use std::fmt::Debug;
use std::future::Future;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// The displayed object was removed out from under us.
    #[error("Display target no longer exists")]
    TargetGone,
    #[error("Display sink error: {0}")]
    Transient(String),
}

impl SinkError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient(message.into())
    }
}

/// Creates, edits and deletes displayed segments.
///
/// Handles are owned by the sink; the controller only keeps them to address
/// later updates and deletes.
pub trait RenderSink: Send + Sync {
    type Handle: Clone + Debug + Send + Sync + 'static;

    fn create_segment(&self, text: &str)
        -> impl Future<Output = Result<Self::Handle, SinkError>> + Send;

    fn update_segment(
        &self,
        handle: &Self::Handle,
        text: &str,
    ) -> impl Future<Output = Result<(), SinkError>> + Send;

    fn delete_segment(&self, handle: &Self::Handle)
        -> impl Future<Output = Result<(), SinkError>> + Send;
}
