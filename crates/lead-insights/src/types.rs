use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag assigned to leads whose tag cell is blank.
pub const UNCATEGORIZED_TAG: &str = "Uncategorized";

/// Client name assigned to leads whose name cell is blank.
pub const UNKNOWN_CLIENT: &str = "Unknown";

/// Approval status of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LeadStatus {
    Approved,
    #[default]
    Discard,
}

impl LeadStatus {
    /// Map a raw status cell. Only the exact value `"Approved"` is approved.
    pub fn from_cell(value: &str) -> Self {
        if value == "Approved" {
            LeadStatus::Approved
        } else {
            LeadStatus::Discard
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Approved => "Approved",
            LeadStatus::Discard => "Discard",
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, LeadStatus::Approved)
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ingested record representing a prospective client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub client_name: String,
    pub status: LeadStatus,
    pub in_radius: bool,
    pub tag: String,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    /// The tag used for grouping, with the blank-tag default applied.
    pub fn tag_or_default(&self) -> &str {
        if self.tag.is_empty() {
            UNCATEGORIZED_TAG
        } else {
            &self.tag
        }
    }
}

// ============================================================================
// Derived views
// ============================================================================

/// Overall lead counts, partitioned by the in-radius facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadMetrics {
    pub total: usize,
    pub in_radius: usize,
    pub out_of_radius: usize,
}

/// Number of leads for one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientLeadCount {
    pub client: String,
    pub count: usize,
}

/// Approved / discarded breakdown for one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPercentage {
    pub client: String,
    pub approved: usize,
    pub discard: usize,
}

impl StatusPercentage {
    pub fn total(&self) -> usize {
        self.approved + self.discard
    }
}

/// Share of the filtered collection held by one tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagDistribution {
    pub tag: String,
    pub count: usize,
    /// Percentage of the filtered total (0.0 - 100.0).
    pub percentage: f64,
}

/// Share of the filtered collection held by one status value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDistribution {
    pub status: String,
    pub count: usize,
    /// Percentage of the filtered total (0.0 - 100.0).
    pub percentage: f64,
}

/// Every view the dashboard renders, computed from one filter pass.
///
/// `tags` is always taken from the unfiltered collection so the tag
/// selector keeps offering every option while a filter is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub metrics: LeadMetrics,
    pub client_lead_counts: Vec<ClientLeadCount>,
    pub status_percentages: Vec<StatusPercentage>,
    pub tag_distribution: Vec<TagDistribution>,
    pub status_distribution: Vec<StatusDistribution>,
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_cell_is_exact() {
        assert_eq!(LeadStatus::from_cell("Approved"), LeadStatus::Approved);
        assert_eq!(LeadStatus::from_cell("approved"), LeadStatus::Discard);
        assert_eq!(LeadStatus::from_cell(" Approved"), LeadStatus::Discard);
        assert_eq!(LeadStatus::from_cell(""), LeadStatus::Discard);
        assert_eq!(LeadStatus::from_cell("Pending"), LeadStatus::Discard);
    }

    #[test]
    fn test_lead_serialization_shape() {
        let lead = Lead {
            id: "lead-1".to_string(),
            client_name: "Acme".to_string(),
            status: LeadStatus::Approved,
            in_radius: true,
            tag: "VIP".to_string(),
            created_at: "2024-01-05T00:00:00Z".parse().unwrap(),
        };
        let json = serde_json::to_value(&lead).unwrap();
        assert_eq!(json["status"], "Approved");
        assert_eq!(json["created_at"], "2024-01-05T00:00:00Z");

        let back: Lead = serde_json::from_value(json).unwrap();
        assert_eq!(back, lead);
    }

    #[test]
    fn test_metrics_use_camel_case() {
        let metrics = LeadMetrics {
            total: 3,
            in_radius: 2,
            out_of_radius: 1,
        };
        let json = serde_json::to_string(&metrics).unwrap();
        assert!(json.contains("\"inRadius\":2"));
        assert!(json.contains("\"outOfRadius\":1"));
    }

    #[test]
    fn test_tag_or_default() {
        let mut lead = Lead {
            id: "lead-1".to_string(),
            client_name: "Acme".to_string(),
            status: LeadStatus::Discard,
            in_radius: false,
            tag: String::new(),
            created_at: Utc::now(),
        };
        assert_eq!(lead.tag_or_default(), UNCATEGORIZED_TAG);
        lead.tag = "Web".to_string();
        assert_eq!(lead.tag_or_default(), "Web");
    }
}
