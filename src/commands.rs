//! Chat-style commands typed at the prompt.

use wxradar_core::AppError;
use wxradar_radar::{CommandError, RadarHandle};
use wxradar_weather::LocationResolver;

use crate::terminal::TerminalSink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Location(String),
    Random,
    Help,
}

impl Command {
    /// Parse one input line. Anything that is not a known command is ignored.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        match word.to_lowercase().as_str() {
            ".radar" | ".weather" => Some(Self::Start),
            ".stop" => Some(Self::Stop),
            ".location" => Some(Self::Location(rest.to_string())),
            ".random" => Some(Self::Random),
            ".help" => Some(Self::Help),
            _ => None,
        }
    }
}

fn failure(err: CommandError) -> String {
    tracing::debug!("Command failed: {}", err);
    match err {
        // Echo the query back so the user can see what was searched
        CommandError::LocationNotFound(_) => format!("❌ {err}"),
        err => format!("❌ {}", AppError::from(err).user_message()),
    }
}

/// Run `command` against the session and return the reply to show.
pub async fn execute<R: LocationResolver>(
    radar: &RadarHandle<R>,
    sink: &TerminalSink,
    command: Command,
) -> String {
    match command {
        Command::Start => match radar.start_display().await {
            Ok(segments) => format!("🌦️ Weather radar running across {segments} segments"),
            Err(e) => failure(e),
        },
        Command::Stop => match radar.stop().await {
            Ok(_) => "🛑 Weather radar stopped and cleaned up".to_string(),
            Err(e) => failure(e),
        },
        Command::Location(query) => match radar.set_location_by_name(&query).await {
            Ok(location) => format!("📍 Location changed to: {}", location.name),
            Err(e) => failure(e),
        },
        Command::Random => {
            sink.notify("🎲 Finding location with active weather...");
            match radar.set_location_random_active().await {
                Ok(location) => format!("🎲 Random location with active weather: {}", location.name),
                Err(e) => failure(e),
            }
        }
        Command::Help => radar.help().to_string(),
    }
}
