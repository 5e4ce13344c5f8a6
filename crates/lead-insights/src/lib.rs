//! Lead Insights Library
//!
//! Ingestion, filtering and aggregation engine behind a lead reporting
//! dashboard. Leads are read from a loosely structured spreadsheet,
//! normalized into typed records and reduced to the views a dashboard
//! renders.
//!
//! # Overview
//!
//! - **Normalization**: Header keyword matching, blank-cell defaults, lenient date parsing
//! - **Filtering**: Preset and custom date windows, exact tag selection
//! - **Aggregation**: Radius metrics, per-client counts and status splits, tag and status distributions
//! - **Caching**: Last good collection kept as a fallback when the source is unreachable
//! - **Sources**: Google Sheets values API or a local CSV export
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lead_insights::{Dashboard, DateRange, FilterState, GoogleSheetsSource, LeadCache, SheetsConfig};
//! use lead_insights::cache::FileStore;
//! use std::sync::Arc;
//!
//! let source = GoogleSheetsSource::new(SheetsConfig::from_env())?;
//! let cache = LeadCache::new(Arc::new(FileStore::new(".lead-cache")));
//! let dashboard = Dashboard::new(Box::new(source), Some(cache));
//!
//! // Show whatever was cached, then refresh
//! dashboard.load_cached();
//! let outcome = dashboard.sync()?;
//! println!("{} leads ({:?})", outcome.count(), outcome);
//!
//! let filters = FilterState::new(DateRange::Last7Days, "all");
//! let snapshot = dashboard.snapshot(&filters, &chrono::Local::now());
//! println!("In radius: {}", snapshot.metrics.in_radius);
//! ```
//!
//! # Pure Functions
//!
//! Every stage can also be used on its own:
//!
//! ```rust,ignore
//! use lead_insights::{aggregation, filter, normalizer};
//!
//! let leads = normalizer::normalize_grid(&grid, &chrono::Local::now());
//! let web = filter::filter_by_tag(&leads, "Web");
//! let metrics = aggregation::calculate_metrics(&web);
//! ```
//!
//! # Sources
//!
//! Sources implement [`source::SheetSource`]:
//!
//! - [`GoogleSheetsSource`] - Google Sheets values API (requires `sheets` feature)
//! - [`CsvSource`] - local CSV export
//! - [`StaticSource`] - fixed in-memory grid

pub mod aggregation;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod normalizer;
pub mod source;
pub mod types;

// Re-exports for convenient access
pub use cache::{CachedLeads, FileStore, KeyValueStore, LeadCache, MemoryStore};
pub use config::{ConfigValidationError, SheetsConfig, SheetsConfigBuilder};
pub use dashboard::{Dashboard, SyncOutcome};
pub use error::{DashboardError, Result};
pub use filter::{DateRange, FilterState, TimeWindow};
pub use normalizer::{ColumnMapping, LeadField, normalize_grid, normalize_rows};
#[cfg(feature = "sheets")]
pub use source::GoogleSheetsSource;
pub use source::{CsvSource, Grid, SheetSource, StaticSource};
pub use types::{
    ClientLeadCount, DashboardSnapshot, Lead, LeadMetrics, LeadStatus, StatusDistribution,
    StatusPercentage, TagDistribution,
};
