//! Derived views over a lead collection.
//!
//! Every function here is pure: it borrows the leads and builds a new view.
//! Groups are collected in first-encounter order and then stable-sorted by
//! count, so ties keep the order in which their first lead appeared.

use crate::types::{
    ClientLeadCount, DashboardSnapshot, Lead, LeadMetrics, StatusDistribution, StatusPercentage,
    TagDistribution,
};
use std::collections::{BTreeSet, HashMap};

/// Insertion-ordered grouping of leads by key.
struct OrderedGroups<V> {
    index: HashMap<String, usize>,
    entries: Vec<(String, V)>,
}

impl<V: Default> OrderedGroups<V> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn entry(&mut self, key: &str) -> &mut V {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                self.entries.push((key.to_string(), V::default()));
                self.index.insert(key.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    fn into_entries(self) -> Vec<(String, V)> {
        self.entries
    }
}

fn count_by<'a>(leads: &'a [Lead], key: impl Fn(&'a Lead) -> &'a str) -> Vec<(String, usize)> {
    let mut groups = OrderedGroups::<usize>::new();
    for lead in leads {
        *groups.entry(key(lead)) += 1;
    }
    let mut counts = groups.into_entries();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Percentage of `total`, guarded against an empty collection.
fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (count as f64 / total as f64) * 100.0
    }
}

/// Count all leads and partition them by the in-radius facet.
pub fn calculate_metrics(leads: &[Lead]) -> LeadMetrics {
    let in_radius = leads.iter().filter(|lead| lead.in_radius).count();
    LeadMetrics {
        total: leads.len(),
        in_radius,
        out_of_radius: leads.len() - in_radius,
    }
}

/// Lead count per tag, busiest tag first.
pub fn client_lead_counts(leads: &[Lead]) -> Vec<ClientLeadCount> {
    count_by(leads, Lead::tag_or_default)
        .into_iter()
        .map(|(client, count)| ClientLeadCount { client, count })
        .collect()
}

/// Approved vs. discarded counts per tag, largest group first.
///
/// Anything that is not `Approved` counts as a discard.
pub fn status_percentages(leads: &[Lead]) -> Vec<StatusPercentage> {
    let mut groups = OrderedGroups::<(usize, usize)>::new();
    for lead in leads {
        let (approved, discard) = groups.entry(lead.tag_or_default());
        if lead.status.is_approved() {
            *approved += 1;
        } else {
            *discard += 1;
        }
    }

    let mut breakdown: Vec<StatusPercentage> = groups
        .into_entries()
        .into_iter()
        .map(|(client, (approved, discard))| StatusPercentage {
            client,
            approved,
            discard,
        })
        .collect();
    breakdown.sort_by(|a, b| b.total().cmp(&a.total()));
    breakdown
}

/// Each tag's share of the collection.
pub fn tag_distribution(leads: &[Lead]) -> Vec<TagDistribution> {
    let total = leads.len();
    count_by(leads, Lead::tag_or_default)
        .into_iter()
        .map(|(tag, count)| TagDistribution {
            tag,
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

/// Each status value's share of the collection.
pub fn status_distribution(leads: &[Lead]) -> Vec<StatusDistribution> {
    let total = leads.len();
    count_by(leads, |lead| lead.status.as_str())
        .into_iter()
        .map(|(status, count)| StatusDistribution {
            status,
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

/// Distinct tags in ascending lexical order.
///
/// Call this on the unfiltered collection to populate the tag selector.
pub fn all_tags(leads: &[Lead]) -> Vec<String> {
    leads
        .iter()
        .map(|lead| lead.tag_or_default().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

impl DashboardSnapshot {
    /// Compute every view from one filter pass.
    ///
    /// `all` is the unfiltered collection (tag options); `filtered` feeds
    /// everything else.
    pub fn compute(all: &[Lead], filtered: &[Lead]) -> Self {
        Self {
            metrics: calculate_metrics(filtered),
            client_lead_counts: client_lead_counts(filtered),
            status_percentages: status_percentages(filtered),
            tag_distribution: tag_distribution(filtered),
            status_distribution: status_distribution(filtered),
            tags: all_tags(all),
        }
    }
}
