//! Grouping of classified records into the hand-off structure for reports.
//!
//! Per node, records are grouped by category in the order the categories
//! were first seen. Across nodes, [`assemble_by_category`] re-buckets those
//! groups under the configured category order.

use flapscan_core::models::{Classification, LinkState};
use flapscan_core::rules::ClassificationRules;
use serde::Serialize;

use crate::aggregator::AggregatedRecord;

/// Separator used for every concatenated group field.
pub const LIST_SEPARATOR: &str = " , ";

/// Headline for a node whose log carried no session events.
pub const NO_EVENTS_HEADLINE: &str = "No BGP Flapped / Down";

// ── NodeGroup ─────────────────────────────────────────────────────────────────

/// All records of one category on one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeGroup {
    pub node: String,
    pub category: String,
    /// Interfaces in record order, joined by [`LIST_SEPARATOR`].
    pub interfaces: String,
    /// Peers unique across the group, in first-seen order.
    pub peers: String,
    /// Descriptions in record order, duplicates kept.
    pub descriptions: String,
    /// Taken from the last record of the group only.
    pub classification: Classification,
    /// Last timestamp of the first record; may be empty.
    pub alarm_time: String,
    pub records: Vec<AggregatedRecord>,
}

impl NodeGroup {
    fn from_records(node: &str, category: String, records: Vec<AggregatedRecord>) -> Self {
        let interfaces = records
            .iter()
            .map(|r| r.interface.as_str())
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR);

        let mut peers: Vec<&str> = Vec::new();
        for peer in records.iter().flat_map(|r| r.peers.iter()) {
            if !peers.contains(&peer.as_str()) {
                peers.push(peer);
            }
        }
        let peers = peers.join(LIST_SEPARATOR);

        let descriptions = records
            .iter()
            .map(AggregatedRecord::description)
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR);

        let final_state = records.last().map(|r| r.last_state).unwrap_or(LinkState::Unknown);
        let alarm_time = records
            .first()
            .map(|r| r.last_timestamp.clone())
            .unwrap_or_default();

        Self {
            node: node.to_string(),
            category,
            interfaces,
            peers,
            descriptions,
            classification: Classification::from_final_state(final_state),
            alarm_time,
            records,
        }
    }

    /// `{iface : STATE}` pairs, one per record.
    pub fn statuses(&self) -> String {
        self.records
            .iter()
            .map(|r| format!("{{{} : {}}}", r.interface, r.last_state))
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR)
    }
}

// ── NodeReport ────────────────────────────────────────────────────────────────

/// Grouped records for one node.
///
/// `Default` is the report of a node that could not be read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeReport {
    pub node: String,
    pub groups: Vec<NodeGroup>,
}

impl NodeReport {
    pub fn empty(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            groups: Vec::new(),
        }
    }

    /// `true` when the node had no events at all.
    pub fn is_quiet(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.groups.iter().map(|g| g.records.len()).sum()
    }
}

/// Group `records` of one node by their category.
///
/// Records without a category land under `fallback`. Category order is the
/// order of first appearance; record order inside a group is preserved.
pub fn group_node_records(node: &str, records: Vec<AggregatedRecord>, fallback: &str) -> NodeReport {
    let mut buckets: Vec<(String, Vec<AggregatedRecord>)> = Vec::new();
    for record in records {
        let category = record.category.clone().unwrap_or_else(|| fallback.to_string());
        match buckets.iter_mut().find(|(name, _)| *name == category) {
            Some((_, bucket)) => bucket.push(record),
            None => buckets.push((category, vec![record])),
        }
    }

    NodeReport {
        node: node.to_string(),
        groups: buckets
            .into_iter()
            .map(|(category, records)| NodeGroup::from_records(node, category, records))
            .collect(),
    }
}

// ── CategorySection ───────────────────────────────────────────────────────────

/// Every node group of one category, in node order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySection {
    pub category: String,
    pub groups: Vec<NodeGroup>,
}

/// Re-bucket per-node groups by category.
///
/// Sections follow `rules.category_order()`; categories not in the rules
/// (only possible if records were classified under other rules) follow in
/// first-seen order. Empty sections are omitted.
pub fn assemble_by_category(reports: &[NodeReport], rules: &ClassificationRules) -> Vec<CategorySection> {
    let mut sections: Vec<CategorySection> = rules
        .category_order()
        .into_iter()
        .map(|name| CategorySection {
            category: name.to_string(),
            groups: Vec::new(),
        })
        .collect();

    for group in reports.iter().flat_map(|r| r.groups.iter()) {
        match sections.iter_mut().find(|s| s.category == group.category) {
            Some(section) => section.groups.push(group.clone()),
            None => sections.push(CategorySection {
                category: group.category.clone(),
                groups: vec![group.clone()],
            }),
        }
    }

    sections.retain(|s| !s.groups.is_empty());
    sections
}

// ── Tests ─────────────────────────────────────────────────────────────────────
