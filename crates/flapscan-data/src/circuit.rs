//! `LR-` circuit rows from `show int des | i LR`.

use std::sync::OnceLock;

use flapscan_core::classifiers::{classify_link_status, classify_rate, classify_site};
use flapscan_core::models::CircuitRecord;
use regex::Regex;

fn circuit_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\S+)\s+(\S+)\s+(\S+)\s+(.+LR-(\d+))").expect("regex is valid")
    })
}

/// Raw fields of one matching row, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitLine<'a> {
    pub interface: &'a str,
    pub state1: &'a str,
    pub state2: &'a str,
    /// Description up to and including the circuit number.
    pub description: &'a str,
    pub circuit_number: u64,
}

impl CircuitLine<'_> {
    /// Classify the raw row into a [`CircuitRecord`] for `node`.
    pub fn into_record(self, node: &str, site_prefixes: &[String]) -> CircuitRecord {
        CircuitRecord {
            node: node.to_string(),
            site: classify_site(self.description, site_prefixes),
            interface: self.interface.to_string(),
            rate: classify_rate(self.interface),
            circuit_number: self.circuit_number,
            status: classify_link_status(self.state1, self.state2),
        }
    }
}

/// Match one line against the full circuit pattern.
pub fn parse_circuit_line(line: &str) -> Option<CircuitLine<'_>> {
    let cap = circuit_line_re().captures(line)?;
    let circuit_number = cap.get(5)?.as_str().parse().ok()?;
    Some(CircuitLine {
        interface: cap.get(1)?.as_str(),
        state1: cap.get(2)?.as_str(),
        state2: cap.get(3)?.as_str(),
        description: cap.get(4)?.as_str(),
        circuit_number,
    })
}

/// Every matching row of `output`, in line order.
pub fn circuit_lines(output: &str) -> impl Iterator<Item = CircuitLine<'_>> + Clone {
    output.lines().filter_map(parse_circuit_line)
}

/// Extract and classify all circuit rows for `node`.
pub fn extract_circuits(node: &str, output: &str, site_prefixes: &[String]) -> Vec<CircuitRecord> {
    circuit_lines(output)
        .map(|line| line.into_record(node, site_prefixes))
        .collect()
}
