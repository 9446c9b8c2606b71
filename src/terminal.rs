//! Render sink that draws every segment to the terminal, top to bottom.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use wxradar_radar::{RenderSink, SinkError};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Debug, Default)]
struct Screen {
    next_id: u64,
    segments: BTreeMap<u64, String>,
    notice: Option<String>,
}

/// Each segment is one block of lines; the whole screen is redrawn on any change.
#[derive(Debug, Clone, Default)]
pub struct TerminalSink {
    screen: Arc<Mutex<Screen>>,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `text` under the radar until the next notice.
    pub fn notify(&self, text: &str) {
        let mut screen = self.screen.lock();
        screen.notice = Some(text.to_string());
        if let Err(e) = Self::redraw(&screen) {
            tracing::warn!("Failed to draw notice: {}", e);
        }
    }

    fn redraw(screen: &Screen) -> Result<(), SinkError> {
        let mut out = std::io::stdout().lock();
        let mut frame = String::from(CLEAR_SCREEN);
        for text in screen.segments.values() {
            frame.push_str(text);
            frame.push('\n');
        }
        if let Some(notice) = &screen.notice {
            frame.push('\n');
            frame.push_str(notice);
            frame.push('\n');
        }
        out.write_all(frame.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|e| SinkError::transient(e.to_string()))
    }
}

impl RenderSink for TerminalSink {
    type Handle = u64;

    async fn create_segment(&self, text: &str) -> Result<u64, SinkError> {
        let mut screen = self.screen.lock();
        screen.next_id += 1;
        let id = screen.next_id;
        screen.segments.insert(id, text.to_string());
        Self::redraw(&screen)?;
        Ok(id)
    }

    async fn update_segment(&self, handle: &u64, text: &str) -> Result<(), SinkError> {
        let mut screen = self.screen.lock();
        match screen.segments.get_mut(handle) {
            Some(current) => *current = text.to_string(),
            None => return Err(SinkError::TargetGone),
        }
        Self::redraw(&screen)
    }

    async fn delete_segment(&self, handle: &u64) -> Result<(), SinkError> {
        let mut screen = self.screen.lock();
        if screen.segments.remove(handle).is_none() {
            return Err(SinkError::TargetGone);
        }
        Self::redraw(&screen)
    }
}
