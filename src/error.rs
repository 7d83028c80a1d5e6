//! Error types for splitlog
//!
//! This module defines the error types used throughout the crate. Callers
//! only ever see [`SplitLogError`]; sinks report the narrower
//! [`SinkError`](crate::sinks::SinkError), which converts into it.

use crate::sinks::SinkError;
use thiserror::Error;

/// Main error type for splitlog operations
#[derive(Error, Debug)]
pub enum SplitLogError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    ConfigFileMissing(String),

    /// Invalid log level
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    /// Routing table does not partition the active severity range
    #[error("Invalid routing table: {0}")]
    RoutingError(String),

    /// I/O errors (opening file sinks, reading config files)
    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    /// TOML parsing errors
    #[error("TOML parsing error: {source}")]
    TomlError {
        #[from]
        source: toml::de::Error,
    },

    /// Sink write or flush failures
    #[error("Sink error: {source}")]
    Sink {
        #[from]
        source: SinkError,
    },

    /// Tracing subscriber errors
    #[error("Tracing error: {0}")]
    TracingError(String),
}

/// Result type alias for splitlog operations
pub type Result<T> = std::result::Result<T, SplitLogError>;

impl SplitLogError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a new invalid level error
    pub fn invalid_level<S: Into<String>>(level: S) -> Self {
        Self::InvalidLogLevel(level.into())
    }

    /// Create a new routing error
    pub fn routing<S: Into<String>>(msg: S) -> Self {
        Self::RoutingError(msg.into())
    }

    /// Create a new tracing error
    pub fn tracing<S: Into<String>>(msg: S) -> Self {
        Self::TracingError(msg.into())
    }

    /// Whether the caller can reasonably keep logging after this error.
    ///
    /// Sink failures are transient from the router's point of view: the
    /// next record may well succeed. Everything else happens at
    /// construction time and means the router was never built.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Sink { .. } | Self::IoError { .. })
    }

    /// Get the error category for logging purposes
    pub fn category(&self) -> &'static str {
        match self {
            Self::ConfigError(_) | Self::ConfigFileMissing(_) | Self::InvalidLogLevel(_) => {
                "config"
            }
            Self::RoutingError(_) => "routing",
            Self::IoError { .. } => "io",
            Self::TomlError { .. } => "toml",
            Self::Sink { .. } => "sink",
            Self::TracingError(_) => "tracing",
        }
    }
}
