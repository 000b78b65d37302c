//! Folding of per-line events into one summary record per entity.
//!
//! The fold assumes device output is chronological: the event that appears
//! last in the text always sets the final state and time, whatever its
//! timestamp says.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use flapscan_core::error::Result;
use flapscan_core::models::{Classification, Descriptor, EntityKey, LinkState, RawEvent};
use flapscan_core::time_utils::parse_log_timestamp;
use serde::Serialize;

// ── AggregatedRecord ──────────────────────────────────────────────────────────

/// Everything observed for one (node, interface) in a single text blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedRecord {
    pub node: String,
    pub interface: String,
    /// State of the event that came last in the text.
    pub last_state: LinkState,
    pub first_timestamp: String,
    pub last_timestamp: String,
    /// Unique peer addresses in first-seen order.
    pub peers: Vec<String>,
    pub occurrence_count: u32,
    /// `ceil(occurrence_count / 2)`; set when the fold finishes.
    pub flap_count: u32,
    /// Filled in by a descriptor lookup after aggregation.
    pub descriptor: Option<Descriptor>,
    /// Filled in by category classification after aggregation.
    pub category: Option<String>,
}

impl AggregatedRecord {
    fn seed(event: RawEvent) -> Self {
        let mut record = Self {
            node: event.key.node,
            interface: event.key.interface,
            last_state: event.state,
            first_timestamp: event.timestamp.clone(),
            last_timestamp: event.timestamp,
            peers: Vec::new(),
            occurrence_count: 1,
            flap_count: 0,
            descriptor: None,
            category: None,
        };
        record.add_peer(event.peer);
        record
    }

    /// Fold a later event for the same key into this record.
    fn add_event(&mut self, event: RawEvent) {
        self.last_state = event.state;
        self.last_timestamp = event.timestamp;
        self.occurrence_count += 1;
        self.add_peer(event.peer);
    }

    fn add_peer(&mut self, peer: Option<String>) {
        if let Some(peer) = peer.filter(|p| !p.is_empty()) {
            if !self.peers.contains(&peer) {
                self.peers.push(peer);
            }
        }
    }

    fn finalize(&mut self) {
        self.flap_count = self.occurrence_count.div_ceil(2);
    }

    /// `Down` if the final state is DOWN, `Flapped` otherwise.
    pub fn classification(&self) -> Classification {
        Classification::from_final_state(self.last_state)
    }

    /// Description text, or the empty string before a lookup ran.
    pub fn description(&self) -> &str {
        self.descriptor.as_ref().map(|d| d.text.as_str()).unwrap_or("")
    }

    /// `first_timestamp` anchored in `year`.
    pub fn first_seen(&self, year: i32) -> Result<NaiveDateTime> {
        parse_log_timestamp(&self.first_timestamp, year)
    }
}

// ── EventAggregator ───────────────────────────────────────────────────────────

/// Insertion-ordered fold of [`RawEvent`]s into [`AggregatedRecord`]s.
///
/// Records come back in the order their key was first seen, which downstream
/// grouping relies on.
#[derive(Debug, Default)]
pub struct EventAggregator {
    records: Vec<AggregatedRecord>,
    index: HashMap<EntityKey, usize>,
}

impl EventAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event. Events must arrive in text order.
    pub fn add_event(&mut self, event: RawEvent) {
        match self.index.get(&event.key) {
            Some(&slot) => self.records[slot].add_event(event),
            None => {
                self.index.insert(event.key.clone(), self.records.len());
                self.records.push(AggregatedRecord::seed(event));
            }
        }
    }

    /// Number of distinct keys seen so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Finalise flap counts and hand back the records.
    pub fn finish(mut self) -> Vec<AggregatedRecord> {
        for record in &mut self.records {
            record.finalize();
        }
        self.records
    }
}

impl Extend<RawEvent> for EventAggregator {
    fn extend<I: IntoIterator<Item = RawEvent>>(&mut self, events: I) {
        for event in events {
            self.add_event(event);
        }
    }
}

/// Fold a whole event sequence with a fresh aggregator.
pub fn aggregate<I>(events: I) -> Vec<AggregatedRecord>
where
    I: IntoIterator<Item = RawEvent>,
{
    let mut aggregator = EventAggregator::new();
    aggregator.extend(events);
    aggregator.finish()
}

/// Sort records by `first_timestamp` anchored in `year`.
///
/// The sort is stable. Any record whose timestamp cannot be parsed fails the
/// whole ordering step; nothing is dropped silently.
pub fn sort_chronologically(
    records: Vec<AggregatedRecord>,
    year: i32,
) -> Result<Vec<AggregatedRecord>> {
    let mut keyed = records
        .into_iter()
        .map(|record| Ok((record.first_seen(year)?, record)))
        .collect::<Result<Vec<_>>>()?;
    keyed.sort_by_key(|(at, _)| *at);
    Ok(keyed.into_iter().map(|(_, record)| record).collect())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
