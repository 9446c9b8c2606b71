//! Centralized error types for the wxradar application.
//!
//! This module provides a typed error hierarchy that:
//! - Gives command replies a short, user-facing message
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Top-level application error type.
///
/// Errors that reach the command surface are converted into this type.
/// Use `user_message()` to get a reply-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Display error: {0}")]
    Display(#[from] DisplayError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Classify a failure from startup (config loading and the like).
    ///
    /// Config and IO failures keep their kind even when wrapped in context;
    /// anything else lands in `Other`.
    pub fn from_startup(err: anyhow::Error) -> Self {
        let err = match err.downcast::<ConfigError>() {
            Ok(e) => return AppError::Config(e),
            Err(err) => err,
        };
        match err.downcast::<std::io::Error>() {
            Ok(e) => AppError::Io(e),
            Err(err) => AppError::Other(err),
        }
    }

    /// Returns a user-friendly message suitable for a command reply.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Location(e) => e.user_message(),
            AppError::Display(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Location lookup errors.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Location not found: {0}")]
    NotFound(String),

    #[error("Empty location query")]
    EmptyQuery,
}

impl LocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::NotFound(_) => "Could not find that location.",
            LocationError::EmptyQuery => "Please provide a location name.",
        }
    }
}

/// Radar display errors.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("No display segments could be created")]
    NoSegments,

    #[error("Radar session has shut down")]
    SessionClosed,
}

impl DisplayError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DisplayError::NoSegments => "Failed to create weather radar.",
            DisplayError::SessionClosed => "The radar is no longer running.",
        }
    }
}
