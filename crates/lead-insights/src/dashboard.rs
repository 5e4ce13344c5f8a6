//! Sync orchestration: source → normalizer → cache, plus filtered views.
//!
//! ```text
//! ┌──────────────┐  grid   ┌────────────┐  leads  ┌───────────────────────┐
//! │ SheetSource  │ ──────► │ normalizer │ ──────► │ Dashboard             │
//! └──────────────┘         └────────────┘         │ leads: RwLock<Arc<..>>│
//!        │ transport error                        └──────────┬────────────┘
//!        ▼                                                   │ put
//! ┌──────────────┐  cached leads                  ┌──────────▼────────────┐
//! │ fallback     │ ◄───────────────────────────── │ LeadCache             │
//! └──────────────┘                                └───────────────────────┘
//! ```
//!
//! # Thread Safety
//!
//! The current collection is an `Arc<Vec<Lead>>` behind a `parking_lot`
//! `RwLock`. A sync swaps the `Arc`; readers clone it and never block a sync
//! for longer than the swap. Overlapping syncs are not de-duplicated and the
//! last one to finish wins.

use crate::cache::LeadCache;
use crate::error::Result;
use crate::filter::FilterState;
use crate::normalizer::normalize_grid;
use crate::source::SheetSource;
use crate::types::{DashboardSnapshot, Lead};
use chrono::{DateTime, Local, TimeZone, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// How a successful [`Dashboard::sync`] obtained its data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SyncOutcome {
    /// The source answered; the collection and the cache were replaced.
    Fresh { count: usize },

    /// The source failed and the last cached collection is shown instead.
    Cached {
        count: usize,
        timestamp: DateTime<Utc>,
        error: String,
    },
}

impl SyncOutcome {
    pub fn count(&self) -> usize {
        match self {
            Self::Fresh { count } | Self::Cached { count, .. } => *count,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh { .. })
    }
}

/// Holds the current lead collection and keeps it in sync with a source.
pub struct Dashboard {
    source: Box<dyn SheetSource>,
    cache: Option<LeadCache>,
    leads: RwLock<Arc<Vec<Lead>>>,
}

impl Dashboard {
    /// Create an empty dashboard. Pass `None` to run without a cache.
    pub fn new(source: Box<dyn SheetSource>, cache: Option<LeadCache>) -> Self {
        Self {
            source,
            cache,
            leads: RwLock::new(Arc::new(Vec::new())),
        }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Show cached leads before the first sync.
    ///
    /// Returns the cache timestamp if anything was loaded.
    pub fn load_cached(&self) -> Option<DateTime<Utc>> {
        let cached = self.cache.as_ref()?.get()?;
        info!(
            "Loaded {} cached leads from {}",
            cached.leads.len(),
            cached.timestamp.to_rfc3339()
        );
        *self.leads.write() = Arc::new(cached.leads);
        Some(cached.timestamp)
    }

    /// Fetch, normalize and store the leads.
    ///
    /// On success the cache is overwritten. A configuration error is always
    /// returned. Any other failure falls back to the cached collection when
    /// one exists and is returned as an error otherwise.
    pub fn sync(&self) -> Result<SyncOutcome> {
        self.sync_at(&Local::now())
    }

    /// [`sync`](Self::sync) with an explicit clock.
    ///
    /// `now` stamps rows without a usable date, and its zone is the one
    /// zone-less date cells are read in.
    pub fn sync_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<SyncOutcome> {
        info!("Syncing leads from {}", self.source.name());

        let error = match self.source.fetch_grid() {
            Ok(grid) => {
                let leads = normalize_grid(&grid, now);
                let count = leads.len();

                if let Some(cache) = &self.cache {
                    cache.put(&leads);
                }
                *self.leads.write() = Arc::new(leads);

                info!("Synced {} leads", count);
                return Ok(SyncOutcome::Fresh { count });
            }
            Err(e) => e,
        };

        if error.is_config() {
            error!("Cannot sync leads: {}", error);
            return Err(error);
        }

        let Some(cached) = self.cache.as_ref().and_then(LeadCache::get) else {
            error!("Sync failed and no cached leads are available: {}", error);
            return Err(error);
        };

        warn!(
            "Sync failed, showing {} cached leads from {}: {}",
            cached.leads.len(),
            cached.timestamp.to_rfc3339(),
            error
        );

        let count = cached.leads.len();
        *self.leads.write() = Arc::new(cached.leads);

        Ok(SyncOutcome::Cached {
            count,
            timestamp: cached.timestamp,
            error: error.to_string(),
        })
    }

    /// The current collection.
    pub fn leads(&self) -> Arc<Vec<Lead>> {
        Arc::clone(&self.leads.read())
    }

    /// The current collection narrowed by `filters`.
    pub fn filtered<Tz: TimeZone>(&self, filters: &FilterState, now: &DateTime<Tz>) -> Vec<Lead> {
        filters.apply(&self.leads(), now)
    }

    /// All dashboard views for the given filters.
    ///
    /// The tag list is derived from the unfiltered collection.
    pub fn snapshot<Tz: TimeZone>(
        &self,
        filters: &FilterState,
        now: &DateTime<Tz>,
    ) -> DashboardSnapshot {
        let all = self.leads();
        let filtered = filters.apply(&all, now);
        DashboardSnapshot::compute(&all, &filtered)
    }

}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("source", &self.source.name())
            .field("cached", &self.cache.is_some())
            .field("leads", &self.leads.read().len())
            .finish()
    }
}

static_assertions::assert_impl_all!(Dashboard: Send, Sync);
