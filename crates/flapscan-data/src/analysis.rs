//! Per-node pipelines.
//!
//! Each function takes one node through fetch → extract → aggregate →
//! classify and returns the node's share of a report. Cross-node ordering
//! and assembly are left to the caller.

use chrono::NaiveDateTime;
use flapscan_core::classifiers::classify_category;
use flapscan_core::error::Result;
use flapscan_core::models::{CircuitRecord, Descriptor, Node};
use flapscan_core::rules::ClassificationRules;
use flapscan_core::time_utils::LOGGING_WINDOW_FORMAT;
use tracing::{debug, warn};

use crate::aggregator::{aggregate, sort_chronologically, AggregatedRecord};
use crate::assembler::{group_node_records, NodeReport};
use crate::circuit::extract_circuits;
use crate::descriptor::describe_interface;
use crate::extract::EventExtractor;
use crate::reader::CommandSource;

// ── Commands ──────────────────────────────────────────────────────────────────

/// Today's BFD session log, restricted to BV/BVI lines.
pub const BFD_LOG_COMMAND: &str = "show logging start today | i bfd | i BV";

/// Interface descriptions carrying an `LR-` circuit number.
pub const CIRCUIT_COMMAND: &str = "show int des | i LR";

/// IS-IS log for today, used when no explicit window is given.
pub const DEFAULT_ADJACENCY_COMMAND: &str = "show logging start today | i isis";

/// Description lookup for one interface.
pub fn describe_command(interface: &str) -> String {
    format!("show int {interface} des")
}

/// IS-IS log between `start` and `end`.
pub fn build_adjacency_command(start: NaiveDateTime, end: NaiveDateTime) -> String {
    format!(
        "show logging start {} end {} | i isis",
        start.format(LOGGING_WINDOW_FORMAT),
        end.format(LOGGING_WINDOW_FORMAT)
    )
}

/// [`build_adjacency_command`] for a window, else the default command.
pub fn adjacency_command(window: Option<(NaiveDateTime, NaiveDateTime)>) -> String {
    match window {
        Some((start, end)) => build_adjacency_command(start, end),
        None => DEFAULT_ADJACENCY_COMMAND.to_string(),
    }
}

// ── BFD ───────────────────────────────────────────────────────────────────────

/// Build a node report from an already fetched session log.
///
/// `describe` is asked once per interface for its `show int <x> des`
/// output; `None` means the lookup failed and yields the not-found
/// descriptor.
pub fn build_node_report<F>(
    node: &str,
    log_text: &str,
    mut describe: F,
    rules: &ClassificationRules,
) -> NodeReport
where
    F: FnMut(&str) -> Option<String>,
{
    let mut records = aggregate(EventExtractor::SessionState.extract_all(node, log_text));

    for record in &mut records {
        let descriptor = match describe(&record.interface) {
            Some(output) => describe_interface(&output, &record.interface),
            None => Descriptor::not_found(),
        };
        record.category = Some(classify_category(&descriptor.text, rules).to_string());
        record.descriptor = Some(descriptor);
    }

    group_node_records(node, records, &rules.fallback_category)
}

/// Fetch, aggregate and group BFD session events for `node`.
///
/// Only a failed log fetch is an error. A failed descriptor lookup is
/// logged and degrades that interface to `NO_DESC_FOUND`.
pub fn bfd_report(
    source: &dyn CommandSource,
    node: &Node,
    rules: &ClassificationRules,
) -> Result<NodeReport> {
    let log_text = source.fetch(node, BFD_LOG_COMMAND)?;

    let report = build_node_report(
        &node.name,
        &log_text,
        |interface| match source.fetch(node, &describe_command(interface)) {
            Ok(output) => Some(output),
            Err(e) => {
                warn!(node = %node.name, interface, error = %e, "descriptor lookup failed");
                None
            }
        },
        rules,
    );

    debug!(
        node = %node.name,
        groups = report.groups.len(),
        records = report.record_count(),
        "bfd report built"
    );
    Ok(report)
}

// ── Adjacency ─────────────────────────────────────────────────────────────────

/// Fetch `command` on `node` and fold its IS-IS adjacency changes.
///
/// Records come back in first-seen order; see [`adjacency_report`] for the
/// chronologically ordered form.
pub fn adjacency_records(
    source: &dyn CommandSource,
    node: &Node,
    command: &str,
) -> Result<Vec<AggregatedRecord>> {
    let text = source.fetch(node, command)?;
    let records = aggregate(EventExtractor::AdjacencyChange.extract_all(&node.name, &text));
    debug!(node = %node.name, records = records.len(), "adjacency records built");
    Ok(records)
}

/// [`adjacency_records`] ordered by first-seen time, anchored on `year`.
///
/// A timestamp that does not parse under `year` fails this node only.
pub fn adjacency_report(
    source: &dyn CommandSource,
    node: &Node,
    command: &str,
    year: i32,
) -> Result<Vec<AggregatedRecord>> {
    sort_chronologically(adjacency_records(source, node, command)?, year)
}

// ── Circuits ──────────────────────────────────────────────────────────────────

/// Fetch and classify the `LR-` circuits of `node`.
pub fn circuit_report(
    source: &dyn CommandSource,
    node: &Node,
    rules: &ClassificationRules,
) -> Result<Vec<CircuitRecord>> {
    let output = source.fetch(node, CIRCUIT_COMMAND)?;
    let circuits = extract_circuits(&node.name, &output, &rules.site_prefixes);
    debug!(node = %node.name, circuits = circuits.len(), "circuit records built");
    Ok(circuits)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
