//! Line-oriented event extraction from device logs.
//!
//! Each [`EventExtractor`] variant is one pattern strategy over a single
//! line. A line either yields a complete [`RawEvent`] or nothing; a partial
//! match is never turned into an event.

use std::sync::OnceLock;

use flapscan_core::models::{EntityKey, LinkState, RawEvent};
use regex::Regex;
use tracing::debug;

/// Marker that identifies an IS-IS adjacency change line.
pub const ADJACENCY_MARKER: &str = "ADJCHANGE";

// ── Patterns ──────────────────────────────────────────────────────────────────

fn dampening_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)dampening").expect("regex is valid"))
}

fn session_state_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)SESSION_STATE_(UP|DOWN)").expect("regex is valid"))
}

fn bv_interface_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(BVI?\d+)\b").expect("regex is valid"))
}

fn neighbor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)neighbor\s+(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})\b").expect("regex is valid")
    })
}

fn dotted_quad_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})\b").expect("regex is valid")
    })
}

fn syslog_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[A-Za-z]{3}\s+\d{1,2}\s+\d{2}:\d{2}:\d{2}(?:\.\d+)?\b")
            .expect("regex is valid")
    })
}

fn adjacency_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Za-z]{3}\s+\d{1,2}\s+\d{2}:\d{2}:\d{2}").expect("regex is valid"))
}

fn paren_group_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\((.*?)\)").expect("regex is valid"))
}

// ── EventExtractor ────────────────────────────────────────────────────────────

/// The closed set of log-event strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventExtractor {
    /// BFD `SESSION_STATE_UP/DOWN` on BV/BVI interfaces, optional neighbor.
    SessionState,
    /// IS-IS `ADJCHANGE` lines keyed by the parenthesised interface.
    AdjacencyChange,
}

impl EventExtractor {
    /// Lazily extract events for `node` from `text`.
    ///
    /// The returned iterator is `Clone`; cloning it (or calling this again)
    /// restarts the scan from the same position.
    pub fn events<'a>(self, node: &'a str, text: &'a str) -> Events<'a> {
        Events {
            extractor: self,
            node,
            lines: text.lines().enumerate(),
        }
    }

    /// Collect every event in `text`, logging how many lines contributed.
    pub fn extract_all(self, node: &str, text: &str) -> Vec<RawEvent> {
        let events: Vec<RawEvent> = self.events(node, text).collect();
        debug!(
            node,
            extractor = ?self,
            lines = text.lines().count(),
            events = events.len(),
            "extraction pass complete"
        );
        events
    }

    /// Try to recognise one event on `line`.
    pub fn extract_line(self, node: &str, line_index: usize, line: &str) -> Option<RawEvent> {
        match self {
            EventExtractor::SessionState => session_state_event(node, line_index, line),
            EventExtractor::AdjacencyChange => adjacency_event(node, line_index, line),
        }
    }
}

/// Iterator returned by [`EventExtractor::events`].
#[derive(Debug, Clone)]
pub struct Events<'a> {
    extractor: EventExtractor,
    node: &'a str,
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl Iterator for Events<'_> {
    type Item = RawEvent;

    fn next(&mut self) -> Option<RawEvent> {
        for (index, line) in self.lines.by_ref() {
            if let Some(event) = self.extractor.extract_line(self.node, index, line) {
                return Some(event);
            }
        }
        None
    }
}

// ── Strategies ────────────────────────────────────────────────────────────────

fn session_state_event(node: &str, line_index: usize, line: &str) -> Option<RawEvent> {
    if line.trim().is_empty() || dampening_re().is_match(line) {
        return None;
    }
    let state = match session_state_re().captures(line)?[1].to_ascii_uppercase().as_str() {
        "UP" => LinkState::Up,
        _ => LinkState::Down,
    };
    let interface = bv_interface_re().captures(line)?[1].to_string();

    let peer = neighbor_re()
        .captures(line)
        .or_else(|| dotted_quad_re().captures(line))
        .map(|cap| cap[1].to_string());
    let timestamp = syslog_time_re()
        .find(line)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    Some(RawEvent {
        key: EntityKey::new(node, interface),
        timestamp,
        state,
        peer,
        line_index,
    })
}

fn adjacency_event(node: &str, line_index: usize, line: &str) -> Option<RawEvent> {
    if !line.contains(ADJACENCY_MARKER) {
        return None;
    }
    let timestamp = adjacency_time_re().find(line)?.as_str().to_string();
    let interface = paren_group_re().captures(line)?[1].trim().to_string();
    if interface.is_empty() {
        return None;
    }
    let last_segment = line.rsplit(',').next().unwrap_or(line);
    let state = if last_segment.contains("Down") {
        LinkState::Down
    } else {
        LinkState::Up
    };

    Some(RawEvent {
        key: EntityKey::new(node, interface),
        timestamp,
        state,
        peer: None,
        line_index,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
