//! Record normalization.
//!
//! Converts the raw grid returned by a spreadsheet source into canonical
//! [`Lead`] records. Column order and naming are not guaranteed, so each
//! header is mapped to a field by keyword (see [`ColumnMapping`]). Missing or
//! unexpected cell values are never an error; they resolve to defaults:
//!
//! | Field         | Blank / missing cell                                     |
//! |---------------|----------------------------------------------------------|
//! | `client_name` | `"Unknown"`                                              |
//! | `status`      | `Discard`                                                |
//! | `in_radius`   | `status == Approved` without a radius column, else false |
//! | `tag`         | `"Uncategorized"`                                        |
//! | `created_at`  | normalization time                                       |
//!
//! Date cells without a zone are read in the zone of the `now` passed in
//! (see [`parse_timestamp`]).

mod columns;
mod dates;

pub use columns::{ColumnMapping, LeadField};
pub use dates::parse_timestamp;
pub(crate) use dates::local_to_utc;

use crate::types::{Lead, LeadStatus, UNCATEGORIZED_TAG, UNKNOWN_CLIENT};
use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;

/// Normalize a full grid whose first row is the header.
///
/// An empty grid yields no leads.
pub fn normalize_grid<S: AsRef<str>, Tz: TimeZone>(
    grid: &[Vec<S>],
    now: &DateTime<Tz>,
) -> Vec<Lead> {
    match grid.split_first() {
        Some((headers, rows)) => normalize_rows(headers, rows, now),
        None => Vec::new(),
    }
}

/// Normalize data rows against a header row.
///
/// Leads come back in row order with ids `lead-1`, `lead-2`, ...
pub fn normalize_rows<S: AsRef<str>, Tz: TimeZone>(
    headers: &[S],
    rows: &[Vec<S>],
    now: &DateTime<Tz>,
) -> Vec<Lead> {
    let mapping = ColumnMapping::from_headers(headers);
    debug!(
        "Column mapping for {} headers: {:?} ({} data rows)",
        headers.len(),
        mapping,
        rows.len()
    );

    rows.iter()
        .enumerate()
        .map(|(index, row)| normalize_row(&mapping, index, row, now))
        .collect()
}

fn normalize_row<S: AsRef<str>, Tz: TimeZone>(
    mapping: &ColumnMapping,
    index: usize,
    row: &[S],
    now: &DateTime<Tz>,
) -> Lead {
    let tz = now.timezone();
    let default_created_at = now.with_timezone(&Utc);

    let client_name = match cell(row, mapping.client_name) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => UNKNOWN_CLIENT.to_string(),
    };

    let status = cell(row, mapping.status)
        .map(LeadStatus::from_cell)
        .unwrap_or_default();

    let in_radius = if mapping.has_radius_column() {
        cell(row, mapping.in_radius).is_some_and(is_truthy_radius)
    } else {
        status.is_approved()
    };

    let tag = match cell(row, mapping.tag) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => UNCATEGORIZED_TAG.to_string(),
    };

    let created_at = match cell(row, mapping.created_at) {
        Some(value) if !value.is_empty() => parse_timestamp(value, &tz).unwrap_or_else(|| {
            debug!(
                "Row {}: unparseable date '{}', using normalization time",
                index + 1,
                value
            );
            default_created_at
        }),
        _ => default_created_at,
    };

    Lead {
        id: format!("lead-{}", index + 1),
        client_name,
        status,
        in_radius,
        tag,
        created_at,
    }
}

/// Cell for a mapped column; short rows read as blank cells.
fn cell<S: AsRef<str>>(row: &[S], column: Option<usize>) -> Option<&str> {
    column.map(|idx| row.get(idx).map(|v| v.as_ref()).unwrap_or(""))
}

/// Radius cells count as true for "yes", "true", "1" and "approved",
/// case-insensitively.
fn is_truthy_radius(value: &str) -> bool {
    let lower = value.to_lowercase();
    matches!(lower.as_str(), "yes" | "true" | "1" | "approved")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_full_row_mapping() {
        let data = grid(&[
            &["Client Name", "Status", "In Radius?", "Tag", "Created Date"],
            &["Acme", "Approved", "yes", "VIP", "2024-01-05"],
        ]);

        let leads = normalize_grid(&data, &now());
        assert_eq!(
            leads,
            vec![Lead {
                id: "lead-1".to_string(),
                client_name: "Acme".to_string(),
                status: LeadStatus::Approved,
                in_radius: true,
                tag: "VIP".to_string(),
                created_at: Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
            }]
        );
    }

    #[test]
    fn test_radius_defaults_to_status_without_column() {
        let data = grid(&[
            &["Name", "Status"],
            &["Acme", "Discard"],
            &["Globex", "Approved"],
        ]);

        let leads = normalize_grid(&data, &now());
        assert!(!leads[0].in_radius);
        assert!(leads[1].in_radius);
    }

    #[test]
    fn test_radius_column_present_but_blank_is_false() {
        let data = grid(&[
            &["Name", "Status", "Radius"],
            &["Acme", "Approved", ""],
            &["Globex", "Approved"],
        ]);

        let leads = normalize_grid(&data, &now());
        assert!(!leads[0].in_radius);
        assert!(!leads[1].in_radius);
    }

    #[test]
    fn test_radius_truthy_values() {
        for value in ["yes", "YES", "True", "1", "approved", "Approved"] {
            assert!(is_truthy_radius(value), "{value} should be truthy");
        }
        for value in ["no", "0", "", "y", "discard"] {
            assert!(!is_truthy_radius(value), "{value} should be falsy");
        }
    }

    #[test]
    fn test_blank_cells_use_defaults() {
        let data = grid(&[&["Client", "Status", "Tag", "Date"], &["", "", "", ""]]);

        let lead = &normalize_grid(&data, &now())[0];
        assert_eq!(lead.client_name, UNKNOWN_CLIENT);
        assert_eq!(lead.status, LeadStatus::Discard);
        assert_eq!(lead.tag, UNCATEGORIZED_TAG);
        assert_eq!(lead.created_at, now());
        assert!(!lead.in_radius);
    }

    #[test]
    fn test_missing_columns_use_defaults() {
        let data = grid(&[&["Phone"], &["555-0100"]]);

        let lead = &normalize_grid(&data, &now())[0];
        assert_eq!(lead.client_name, UNKNOWN_CLIENT);
        assert_eq!(lead.status, LeadStatus::Discard);
        assert_eq!(lead.tag, UNCATEGORIZED_TAG);
        assert_eq!(lead.created_at, now());
    }

    #[test]
    fn test_unparseable_date_keeps_default() {
        let data = grid(&[&["Name", "Created"], &["Acme", "sometime soon"]]);

        let lead = &normalize_grid(&data, &now())[0];
        assert_eq!(lead.created_at, now());
    }

    #[test]
    fn test_ids_are_positional() {
        let data = grid(&[&["Name"], &["a"], &["b"], &["c"]]);

        let ids: Vec<String> = normalize_grid(&data, &now())
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec!["lead-1", "lead-2", "lead-3"]);
    }

    #[test]
    fn test_column_order_independent() {
        let data = grid(&[
            &["Created Date", "Tag", "Status", "Client Name"],
            &["2024-02-01", "Web", "Approved", "Initech"],
        ]);

        let lead = &normalize_grid(&data, &now())[0];
        assert_eq!(lead.client_name, "Initech");
        assert_eq!(lead.tag, "Web");
        assert_eq!(lead.status, LeadStatus::Approved);
    }

    #[test]
    fn test_zoneless_dates_follow_evaluation_zone() {
        let minus_five = chrono::FixedOffset::west_opt(5 * 3600).unwrap();
        let local_now = minus_five.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();
        let data = grid(&[
            &["Name", "Created"],
            &["Early bird", "2024-05-15 02:00:00"],
            &["Iso day", "2024-05-15"],
            &["No date", ""],
        ]);

        let leads = normalize_grid(&data, &local_now);
        assert_eq!(
            leads[0].created_at,
            Utc.with_ymd_and_hms(2024, 5, 15, 7, 0, 0).unwrap()
        );
        assert_eq!(
            leads[1].created_at,
            Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(leads[2].created_at, local_now.with_timezone(&Utc));
    }

    #[test]
    fn test_header_only_and_empty_grid() {
        let header_only = grid(&[&["Name", "Status"]]);
        assert!(normalize_grid(&header_only, &now()).is_empty());

        let empty: Vec<Vec<String>> = Vec::new();
        assert!(normalize_grid(&empty, &now()).is_empty());
    }
}
