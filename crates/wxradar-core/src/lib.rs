pub mod config;
pub mod error;

pub use config::{
    ApiConfig, Config, LocationConfig, LoggingConfig, Palette, RadarConfig, ValidationResult,
    DEFAULT_GEOCODING_URL, DEFAULT_WEATHER_URL,
};
pub use error::{AppError, ConfigError, DisplayError, LocationError};

use anyhow::Result;

/// Initialize logging to stderr. `RUST_LOG` wins over the configured level.
pub fn init(logging: &LoggingConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level)),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!("wxradar core initialized");
    Ok(())
}
