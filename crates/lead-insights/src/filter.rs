//! Time-range and tag filtering.
//!
//! Filters never mutate their input; they return the retained leads in the
//! original order. A dashboard recomputes its views by applying the time
//! filter first and the tag filter second (see [`FilterState::apply`]).
//!
//! Windows are anchored to an evaluation-time `now` in any
//! [`chrono::TimeZone`]. The CLI passes local time; tests pass UTC.
//!
//! Two families of presets exist and are intentionally different:
//!
//! - **Calendar-aligned** (`today`, `last3days`, `last7days`, `mtd`,
//!   `last4weeks`): the window starts at midnight.
//! - **Rolling** (`week`, `month`, `quarter`): the window starts exactly
//!   7 calendar days / 1 month / 3 months before `now`, keeping the time of day.
//!
//! Only `today` and `custom` have an upper bound. Every other preset keeps
//! leads dated after `now`.

use crate::normalizer::local_to_utc;
use crate::types::Lead;
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel tag value meaning "no tag filtering".
pub const ALL_TAGS: &str = "all";

/// Time-range selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "range")]
pub enum DateRange {
    #[default]
    All,
    Today,
    Last3Days,
    Last7Days,
    Mtd,
    Last4Weeks,
    Week,
    Month,
    Quarter,
    /// Inclusive of both dates. Without both endpoints it behaves as `All`.
    Custom {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

/// A resolved window, both bounds inclusive. `end: None` is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && self.end.is_none_or(|end| *instant <= end)
    }
}

impl DateRange {
    /// Build a custom range; missing endpoints make it behave as `All`.
    pub fn custom(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        DateRange::Custom { start, end }
    }

    /// A custom range missing an endpoint, which filters nothing.
    pub fn is_incomplete_custom(&self) -> bool {
        matches!(
            self,
            DateRange::Custom { start: None, .. } | DateRange::Custom { end: None, .. }
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::All => "all",
            DateRange::Today => "today",
            DateRange::Last3Days => "last3days",
            DateRange::Last7Days => "last7days",
            DateRange::Mtd => "mtd",
            DateRange::Last4Weeks => "last4weeks",
            DateRange::Week => "week",
            DateRange::Month => "month",
            DateRange::Quarter => "quarter",
            DateRange::Custom { .. } => "custom",
        }
    }

    /// Resolve the window relative to `now`.
    ///
    /// Returns `None` when no filtering applies.
    pub fn window<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<TimeWindow> {
        let tz = now.timezone();
        let today = now.date_naive();

        let start = match *self {
            DateRange::All => return None,
            DateRange::Custom { start, end } => {
                let (start, end) = (start?, end?);
                return Some(TimeWindow {
                    start: local_to_utc(&tz, start.and_time(NaiveTime::MIN)),
                    end: Some(local_to_utc(&tz, end_of_day(end))),
                });
            }
            DateRange::Today => {
                return Some(TimeWindow {
                    start: local_to_utc(&tz, today.and_time(NaiveTime::MIN)),
                    end: Some(now.with_timezone(&Utc)),
                });
            }
            DateRange::Last3Days => days_before_midnight(&tz, today, 3),
            DateRange::Last7Days => days_before_midnight(&tz, today, 7),
            DateRange::Last4Weeks => days_before_midnight(&tz, today, 28),
            DateRange::Mtd => local_to_utc(&tz, today.with_day(1)?.and_time(NaiveTime::MIN)),
            DateRange::Week => days_before(now, 7),
            DateRange::Month => months_before(now, 1),
            DateRange::Quarter => months_before(now, 3),
        };

        Some(TimeWindow { start, end: None })
    }
}

/// Unrecognized selectors parse as `All` rather than failing.
impl FromStr for DateRange {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "today" => DateRange::Today,
            "last3days" => DateRange::Last3Days,
            "last7days" => DateRange::Last7Days,
            "mtd" => DateRange::Mtd,
            "last4weeks" => DateRange::Last4Weeks,
            "week" => DateRange::Week,
            "month" => DateRange::Month,
            "quarter" => DateRange::Quarter,
            "custom" => DateRange::Custom {
                start: None,
                end: None,
            },
            _ => DateRange::All,
        })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRange::Custom {
                start: Some(start),
                end: Some(end),
            } => write!(f, "custom ({} to {})", start, end),
            other => f.write_str(other.as_str()),
        }
    }
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
}

fn days_before_midnight<Tz: TimeZone>(tz: &Tz, today: NaiveDate, days: u64) -> DateTime<Utc> {
    let day = today.checked_sub_days(Days::new(days)).unwrap_or(today);
    local_to_utc(tz, day.and_time(NaiveTime::MIN))
}

/// Calendar days back on the wall clock, keeping the time of day.
fn days_before<Tz: TimeZone>(now: &DateTime<Tz>, days: u64) -> DateTime<Utc> {
    let naive = now.naive_local();
    let shifted = naive.checked_sub_days(Days::new(days)).unwrap_or(naive);
    local_to_utc(&now.timezone(), shifted)
}

/// Calendar months back; day-of-month clamps to the shorter month
/// (May 31 minus one month is April 30).
fn months_before<Tz: TimeZone>(now: &DateTime<Tz>, months: u32) -> DateTime<Utc> {
    let naive = now.naive_local();
    let shifted = naive.checked_sub_months(Months::new(months)).unwrap_or(naive);
    local_to_utc(&now.timezone(), shifted)
}

/// Keep leads whose `created_at` falls inside the range's window.
pub fn filter_by_date_range<Tz: TimeZone>(
    leads: &[Lead],
    range: &DateRange,
    now: &DateTime<Tz>,
) -> Vec<Lead> {
    match range.window(now) {
        Some(window) => leads
            .iter()
            .filter(|lead| window.contains(&lead.created_at))
            .cloned()
            .collect(),
        None => leads.to_vec(),
    }
}

/// Keep leads whose tag equals `tag` exactly. `"all"` keeps everything.
pub fn filter_by_tag(leads: &[Lead], tag: &str) -> Vec<Lead> {
    if tag == ALL_TAGS {
        return leads.to_vec();
    }
    leads.iter().filter(|lead| lead.tag == tag).cloned().collect()
}

/// The user-controlled filter parameters of a dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub date_range: DateRange,
    pub tag: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            date_range: DateRange::All,
            tag: ALL_TAGS.to_string(),
        }
    }
}

impl FilterState {
    pub fn new(date_range: DateRange, tag: impl Into<String>) -> Self {
        Self {
            date_range,
            tag: tag.into(),
        }
    }

    /// Apply the time filter, then the tag filter.
    pub fn apply<Tz: TimeZone>(&self, leads: &[Lead], now: &DateTime<Tz>) -> Vec<Lead> {
        let by_date = filter_by_date_range(leads, &self.date_range, now);
        filter_by_tag(&by_date, &self.tag)
    }
}
