//! Google Sheets source.
//!
//! Reads a sheet through the values API
//! (`GET {base}/{spreadsheet_id}/values/{sheet_name}?key={api_key}`).

use super::{Grid, SheetSource};
use crate::config::{API_KEY_ENV, SPREADSHEET_ID_ENV, SheetsConfig};
use crate::error::{DashboardError, Result};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    values: Option<Vec<Vec<String>>>,
}

/// Google Sheets source backed by a blocking HTTP client.
///
/// # Example
///
/// ```rust,ignore
/// use lead_insights::{GoogleSheetsSource, SheetsConfig};
///
/// let source = GoogleSheetsSource::new(SheetsConfig::from_env())?;
/// let grid = source.fetch_grid()?;
/// ```
pub struct GoogleSheetsSource {
    config: SheetsConfig,
    client: Client,
}

impl GoogleSheetsSource {
    /// Create a source for the given configuration.
    ///
    /// Credentials are checked on fetch, not here, so a dashboard can be
    /// built before the environment is complete.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: SheetsConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| DashboardError::InvalidConfig(e.to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Build the request URL, failing on missing credentials.
    pub(crate) fn values_url(&self) -> Result<Url> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| DashboardError::missing_config("Google Sheets API key", API_KEY_ENV))?;
        let spreadsheet_id = self
            .config
            .spreadsheet_id
            .as_deref()
            .ok_or_else(|| DashboardError::missing_config("Spreadsheet ID", SPREADSHEET_ID_ENV))?;

        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| DashboardError::InvalidConfig(format!("base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| {
                DashboardError::InvalidConfig(format!(
                    "base URL '{}' cannot carry a path",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .push(spreadsheet_id)
            .push("values")
            .push(&self.config.sheet_name);
        url.query_pairs_mut().append_pair("key", api_key);

        Ok(url)
    }
}

impl SheetSource for GoogleSheetsSource {
    fn fetch_grid(&self) -> Result<Grid> {
        let url = self.values_url()?;
        info!(
            "Fetching sheet '{}' from Google Sheets",
            self.config.sheet_name
        );

        let response = self.client.get(url).send()?;
        let status = response.status();

        if !status.is_success() {
            return Err(DashboardError::Transport {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let body: ValuesResponse = response.json()?;
        let grid = body.values.unwrap_or_default();
        debug!("Received {} rows (including header)", grid.len());

        Ok(grid)
    }

    fn name(&self) -> &str {
        "GoogleSheets"
    }
}
