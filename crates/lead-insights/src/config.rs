//! Configuration for the spreadsheet source.
//!
//! Settings come either from the builder or from the environment (see
//! [`SheetsConfig::from_env`]). Missing credentials are not a validation
//! error here: they surface as a configuration error on the first sync so
//! the dashboard can show a retry screen.

use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable holding the Google Sheets API key.
pub const API_KEY_ENV: &str = "GOOGLE_SHEETS_API_KEY";

/// Environment variable holding the spreadsheet id.
pub const SPREADSHEET_ID_ENV: &str = "GOOGLE_SPREADSHEET_ID";

/// Environment variable holding the sheet (tab) name.
pub const SHEET_NAME_ENV: &str = "GOOGLE_SHEET_NAME";

/// Default sheet name when none is configured.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Default Sheets API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Default timeout for API requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for fetching leads from a Google Sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// API key. `None` until configured.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Spreadsheet id from the sheet URL.
    pub spreadsheet_id: Option<String>,

    /// Sheet (tab) to read.
    /// Default: "Sheet1"
    pub sheet_name: String,

    /// Base URL of the values API (useful for proxies or tests).
    pub base_url: String,

    /// Request timeout in seconds.
    /// Default: 30
    pub timeout_secs: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            spreadsheet_id: None,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl SheetsConfig {
    /// Create a new configuration builder.
    pub fn builder() -> SheetsConfigBuilder {
        SheetsConfigBuilder::default()
    }

    /// Read the configuration from the process environment.
    ///
    /// Blank variables count as unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            api_key: non_blank(API_KEY_ENV),
            spreadsheet_id: non_blank(SPREADSHEET_ID_ENV),
            sheet_name: non_blank(SHEET_NAME_ENV).unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
            ..Self::default()
        }
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.sheet_name.trim().is_empty() {
            return Err(ConfigValidationError::EmptySheetName);
        }

        if self.timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidTimeout(self.timeout_secs));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigValidationError::InvalidBaseUrl(self.base_url.clone()));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Sheet name cannot be empty")]
    EmptySheetName,

    #[error("Invalid timeout: {0} (must be at least 1 second)")]
    InvalidTimeout(u64),

    #[error("Invalid base URL '{0}' (must start with http:// or https://)")]
    InvalidBaseUrl(String),
}

/// Builder for [`SheetsConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct SheetsConfigBuilder {
    api_key: Option<String>,
    spreadsheet_id: Option<String>,
    sheet_name: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl SheetsConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the spreadsheet id.
    pub fn spreadsheet_id(mut self, id: impl Into<String>) -> Self {
        self.spreadsheet_id = Some(id.into());
        self
    }

    /// Set the sheet (tab) name.
    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    /// Set a custom base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `SheetsConfig` or an error if validation fails.
    pub fn build(self) -> Result<SheetsConfig, ConfigValidationError> {
        let config = SheetsConfig {
            api_key: self.api_key,
            spreadsheet_id: self.spreadsheet_id,
            sheet_name: self
                .sheet_name
                .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        config.validate()?;
        Ok(config)
    }
}
