mod commands;
mod terminal;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use wxradar_core::{AppError, Config};
use wxradar_radar::{spawn_session, ControllerSettings, FieldRenderer, SegmentController, SymbolTable};
use wxradar_weather::{
    ActiveWeatherFinder, Geocoder, Location, OpenMeteoResolver, RetryPolicy, WeatherProvider,
};

use crate::commands::Command;
use crate::terminal::TerminalSink;

#[tokio::main]
async fn main() -> Result<()> {
    // Optional config path; defaults to the user config directory
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let (config, validation) = match Config::load_validated(config_path.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            // Logging is configured from this file, so report straight to stderr
            let err = AppError::from_startup(e);
            eprintln!("❌ {}", err.user_message());
            return Err(err.into());
        }
    };
    wxradar_core::init(&config.logging)?;
    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }

    let timeout = Duration::from_millis(config.api.request_timeout_ms);
    let provider = WeatherProvider::new(&config.api.weather_url, timeout)?;
    let geocoder = Geocoder::new(
        &config.api.geocoding_url,
        timeout,
        RetryPolicy::with_retries(config.api.retry_attempts),
    )?;
    let resolver = Arc::new(OpenMeteoResolver::new(
        geocoder,
        ActiveWeatherFinder::new(provider.clone()),
    ));

    let sink = TerminalSink::new();
    let renderer = FieldRenderer::new(
        config.radar.width,
        config.radar.height,
        SymbolTable::for_palette(config.radar.palette),
    );
    let location = Location::new(
        &config.location.name,
        config.location.latitude,
        config.location.longitude,
    );
    let controller = SegmentController::new(
        sink.clone(),
        provider,
        renderer,
        ControllerSettings::from(&config.radar),
        location,
    );
    let (radar, session) = spawn_session(controller, resolver);

    tracing::info!("wxradar started for {}", config.location.name);
    sink.notify("Type `.radar` to start the radar or `.help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down");
                break;
            }
            line = lines.next_line() => match line? {
                Some(line) => {
                    if let Some(command) = Command::parse(&line) {
                        let reply = commands::execute(&radar, &sink, command).await;
                        sink.notify(&reply);
                    }
                }
                None => break,
            },
        }
    }

    // Last handle gone: the session deletes any segments still on screen
    drop(radar);
    session.await?;
    Ok(())
}
