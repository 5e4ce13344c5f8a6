//! Custom error types for the lead ingestion pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Only
//! configuration and transport failures ever reach a caller of the
//! dashboard; storage failures are swallowed by the cache and malformed
//! rows are resolved with defaults during normalization.
//!
//! Errors are serializable so a frontend can render `{ code, message }`.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for lead ingestion and caching.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A required ingestion setting (credential or identifier) is missing.
    #[error("{setting} is not configured. Please set {env_var} in your .env file")]
    MissingConfig {
        setting: String,
        env_var: String,
    },

    /// Configuration is present but invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The spreadsheet source answered with a non-success status.
    #[error("Failed to fetch spreadsheet data: {status}. {body}")]
    Transport { status: u16, body: String },

    /// The key-value store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A local source file could not be read or parsed.
    #[error("Failed to read source '{path}': {reason}")]
    SourceRead { path: String, reason: String },

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// HTTP request error (only with the "sheets" feature).
    #[cfg(feature = "sheets")]
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),
}

impl DashboardError {
    /// Shorthand for a missing setting.
    pub fn missing_config(setting: impl Into<String>, env_var: impl Into<String>) -> Self {
        DashboardError::MissingConfig {
            setting: setting.into(),
            env_var: env_var.into(),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingConfig { .. } => "MISSING_CONFIG",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::SourceRead { .. } => "SOURCE_READ_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            #[cfg(feature = "sheets")]
            Self::HttpRequest(_) => "HTTP_REQUEST_ERROR",
        }
    }

    /// Check if this is a configuration error.
    ///
    /// Configuration errors block the pipeline: no cached data is shown
    /// in their place.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::MissingConfig { .. } | Self::InvalidConfig(_))
    }

    /// Check if this error came from fetching the source.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::SourceRead { .. } | Self::Polars(_) => true,
            #[cfg(feature = "sheets")]
            Self::HttpRequest(_) => true,
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for DashboardError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("DashboardError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for dashboard operations.
pub type Result<T> = std::result::Result<T, DashboardError>;
