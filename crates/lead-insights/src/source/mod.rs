//! Ingestion sources.
//!
//! A source returns the raw spreadsheet grid (header row followed by data
//! rows, every cell a string). Normalization into leads happens afterwards,
//! so a source knows nothing about lead semantics.
//!
//! - [`GoogleSheetsSource`] - Google Sheets values API (requires `sheets` feature)
//! - [`CsvSource`] - a local CSV export
//! - [`StaticSource`] - a fixed in-memory grid
//!
//! # Adding a New Source
//!
//! Implement [`SheetSource`] and hand it to [`crate::Dashboard::new`].

mod csv;
#[cfg(feature = "sheets")]
mod google;

pub use csv::CsvSource;
#[cfg(feature = "sheets")]
pub use google::GoogleSheetsSource;

use crate::error::Result;

/// A 2-D grid of string cells; the first row is the header.
pub type Grid = Vec<Vec<String>>;

/// Trait for anything that can produce a lead grid.
///
/// Implementations must be `Send + Sync` so a dashboard can be shared
/// across threads.
///
/// # Errors
///
/// Missing credentials or identifiers must be reported as
/// [`crate::DashboardError::MissingConfig`]; anything that goes wrong while
/// fetching is a transport error. The dashboard falls back to cached data
/// only for the latter.
pub trait SheetSource: Send + Sync {
    /// Fetch the whole grid. One attempt, no retry.
    fn fetch_grid(&self) -> Result<Grid>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// A source that always returns the same grid.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    grid: Grid,
}

impl StaticSource {
    pub fn new(grid: Grid) -> Self {
        Self { grid }
    }
}

impl SheetSource for StaticSource {
    fn fetch_grid(&self) -> Result<Grid> {
        Ok(self.grid.clone())
    }

    fn name(&self) -> &str {
        "Static"
    }
}
