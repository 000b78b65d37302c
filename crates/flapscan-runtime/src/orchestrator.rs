//! Scan orchestration.
//!
//! Resolves what a run should do into a [`ScanRequest`], sweeps the
//! inventory through a [`CommandSource`] and assembles the per-node outcomes
//! into one [`ScanReport`] for the output layer.

use std::sync::Arc;

use flapscan_core::error::Result;
use flapscan_core::models::{CircuitRecord, Node};
use flapscan_core::rules::ClassificationRules;
use flapscan_core::settings::{ReportKind, Settings};
use flapscan_data::aggregator::AggregatedRecord;
use flapscan_data::analysis::{adjacency_command, adjacency_report, bfd_report, circuit_report};
use flapscan_data::assembler::{assemble_by_category, CategorySection, NodeReport, NO_EVENTS_HEADLINE};
use flapscan_data::reader::CommandSource;
use serde::Serialize;
use tracing::info;

use crate::sweep::{sweep, sweep_concurrent, NodeOutcome};

// ── ScanRequest ───────────────────────────────────────────────────────────────

/// Everything a run needs beyond the inventory and the rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanRequest {
    Bfd,
    /// IS-IS adjacency changes fetched with `command`, ordered using `year`.
    Adjacency { command: String, year: i32 },
    Circuits,
}

impl ScanRequest {
    /// Build the request from CLI settings.
    ///
    /// Fails before any node is contacted when the settings are unusable,
    /// e.g. an adjacency report without a reference year.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        match settings.report_kind()? {
            ReportKind::Bfd => Ok(ScanRequest::Bfd),
            ReportKind::Circuits => Ok(ScanRequest::Circuits),
            ReportKind::Adjacency => {
                let year = settings.reference_year()?;
                let command = adjacency_command(settings.logging_window()?);
                Ok(ScanRequest::Adjacency { command, year })
            }
        }
    }

    pub fn kind(&self) -> ReportKind {
        match self {
            ScanRequest::Bfd => ReportKind::Bfd,
            ScanRequest::Adjacency { .. } => ReportKind::Adjacency,
            ScanRequest::Circuits => ReportKind::Circuits,
        }
    }
}

// ── ScanReport ────────────────────────────────────────────────────────────────

/// Per-node status line of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeStatus {
    pub node: String,
    pub records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NodeStatus {
    fn from_outcome<T>(outcome: &NodeOutcome<T>, records: usize, note: Option<&str>) -> Self {
        Self {
            node: outcome.node.name.clone(),
            records,
            note: note.map(str::to_string),
            error: outcome.error_marker(),
        }
    }
}

/// Assembled output of one run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "report", rename_all = "lowercase")]
pub enum ScanReport {
    Bfd {
        nodes: Vec<NodeStatus>,
        sections: Vec<CategorySection>,
    },
    Adjacency {
        year: i32,
        nodes: Vec<NodeStatus>,
        records: Vec<AggregatedRecord>,
    },
    Circuits {
        nodes: Vec<NodeStatus>,
        circuits: Vec<CircuitRecord>,
    },
}

impl ScanReport {
    pub fn nodes(&self) -> &[NodeStatus] {
        match self {
            ScanReport::Bfd { nodes, .. }
            | ScanReport::Adjacency { nodes, .. }
            | ScanReport::Circuits { nodes, .. } => nodes,
        }
    }

    pub fn failed_nodes(&self) -> usize {
        self.nodes().iter().filter(|n| n.error.is_some()).count()
    }
}

fn assemble_bfd(outcomes: Vec<NodeOutcome<NodeReport>>, rules: &ClassificationRules) -> ScanReport {
    let nodes = outcomes
        .iter()
        .map(|o| {
            let note = (o.is_ok() && o.data.is_quiet()).then_some(NO_EVENTS_HEADLINE);
            NodeStatus::from_outcome(o, o.data.record_count(), note)
        })
        .collect();
    let reports: Vec<NodeReport> = outcomes.into_iter().map(|o| o.data).collect();
    ScanReport::Bfd {
        nodes,
        sections: assemble_by_category(&reports, rules),
    }
}

/// Records are already ordered per node; nodes follow inventory order.
fn assemble_adjacency(outcomes: Vec<NodeOutcome<Vec<AggregatedRecord>>>, year: i32) -> ScanReport {
    let nodes = outcomes
        .iter()
        .map(|o| NodeStatus::from_outcome(o, o.data.len(), None))
        .collect();
    ScanReport::Adjacency {
        year,
        nodes,
        records: outcomes.into_iter().flat_map(|o| o.data).collect(),
    }
}

fn assemble_circuits(outcomes: Vec<NodeOutcome<Vec<CircuitRecord>>>) -> ScanReport {
    let nodes = outcomes
        .iter()
        .map(|o| NodeStatus::from_outcome(o, o.data.len(), None))
        .collect();
    ScanReport::Circuits {
        nodes,
        circuits: outcomes.into_iter().flat_map(|o| o.data).collect(),
    }
}

// ── ScanOrchestrator ──────────────────────────────────────────────────────────

/// Drives one report over an inventory.
pub struct ScanOrchestrator {
    source: Arc<dyn CommandSource>,
    rules: Arc<ClassificationRules>,
    concurrency: usize,
}

impl ScanOrchestrator {
    pub fn new(source: Arc<dyn CommandSource>, rules: ClassificationRules) -> Self {
        Self {
            source,
            rules: Arc::new(rules),
            concurrency: 1,
        }
    }

    /// Maximum number of nodes processed at once by [`run`](Self::run).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn rules(&self) -> &ClassificationRules {
        &self.rules
    }

    /// Sweep `nodes` one at a time on the current thread.
    pub fn run_blocking(&self, request: &ScanRequest, nodes: &[Node]) -> Result<ScanReport> {
        info!(report = request.kind().as_str(), nodes = nodes.len(), "scan started");
        let source = self.source.as_ref();
        let rules = self.rules.as_ref();
        match request {
            ScanRequest::Bfd => {
                let outcomes = sweep(nodes, |node| bfd_report(source, node, rules));
                Ok(assemble_bfd(outcomes, rules))
            }
            ScanRequest::Adjacency { command, year } => {
                let outcomes = sweep(nodes, |node| adjacency_report(source, node, command, *year));
                Ok(assemble_adjacency(outcomes, *year))
            }
            ScanRequest::Circuits => {
                let outcomes = sweep(nodes, |node| circuit_report(source, node, rules));
                Ok(assemble_circuits(outcomes))
            }
        }
    }

    /// Sweep `nodes` with bounded concurrency.
    ///
    /// Produces the same report as [`run_blocking`](Self::run_blocking).
    pub async fn run(&self, request: &ScanRequest, nodes: Vec<Node>) -> Result<ScanReport> {
        info!(
            report = request.kind().as_str(),
            nodes = nodes.len(),
            concurrency = self.concurrency,
            "scan started"
        );
        let source = Arc::clone(&self.source);
        let rules = Arc::clone(&self.rules);
        match request {
            ScanRequest::Bfd => {
                let step_rules = Arc::clone(&rules);
                let outcomes = sweep_concurrent(nodes, self.concurrency, move |node| {
                    bfd_report(source.as_ref(), node, &step_rules)
                })
                .await;
                Ok(assemble_bfd(outcomes, &rules))
            }
            ScanRequest::Adjacency { command, year } => {
                let command = command.clone();
                let year = *year;
                let outcomes = sweep_concurrent(nodes, self.concurrency, move |node| {
                    adjacency_report(source.as_ref(), node, &command, year)
                })
                .await;
                Ok(assemble_adjacency(outcomes, year))
            }
            ScanRequest::Circuits => {
                let outcomes = sweep_concurrent(nodes, self.concurrency, move |node| {
                    circuit_report(source.as_ref(), node, &rules)
                })
                .await;
                Ok(assemble_circuits(outcomes))
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use flapscan_core::ScanError;
    use flapscan_data::analysis::{describe_command, BFD_LOG_COMMAND, CIRCUIT_COMMAND};
    use flapscan_data::reader::MemorySource;

    fn settings(args: &[&str]) -> Settings {
        Settings::parse_from(std::iter::once("flapscan").chain(args.iter().copied()))
    }

    fn adjacency_source(command: &str) -> MemorySource {
        MemorySource::new()
            .with_output(
                "A",
                command,
                "Dec 11 15:30:57.1 : %ROUTING-ISIS-5-ADJCHANGE : Adjacency to X (Hu0/0/0/1) (L2) Down\n",
            )
            .with_output(
                "B",
                command,
                "Dec 11 09:00:00.0 : %ROUTING-ISIS-5-ADJCHANGE : Adjacency to Y (Te0/0/0/9) (L2) Down\n",
            )
    }

    // ── ScanRequest ───────────────────────────────────────────────────────────

    #[test]
    fn test_request_from_settings() {
        assert_eq!(ScanRequest::from_settings(&settings(&[])).unwrap(), ScanRequest::Bfd);
        assert_eq!(
            ScanRequest::from_settings(&settings(&["--report", "circuits"])).unwrap(),
            ScanRequest::Circuits
        );
    }

    #[test]
    fn test_adjacency_request_needs_year() {
        let err = ScanRequest::from_settings(&settings(&["--report", "adjacency"])).unwrap_err();
        assert!(matches!(err, ScanError::MissingReferenceYear));
    }

    #[test]
    fn test_adjacency_request_with_window() {
        let request = ScanRequest::from_settings(&settings(&[
            "--report",
            "adjacency",
            "--date",
            "2024-12-11",
            "--start-time",
            "08:00:00",
            "--end-time",
            "18:00:00",
        ]))
        .unwrap();
        assert_eq!(
            request,
            ScanRequest::Adjacency {
                command: "show logging start 2024 Dec 11 08:00:00 end 2024 Dec 11 18:00:00 | i isis"
                    .to_string(),
                year: 2024,
            }
        );
    }

    // ── run_blocking ──────────────────────────────────────────────────────────

    #[test]
    fn test_bfd_run_marks_quiet_and_failed_nodes() {
        let source = MemorySource::new()
            .with_output(
                "A",
                BFD_LOG_COMMAND,
                "Mar 3 10:15:22 SESSION_STATE_DOWN neighbor 10.1.1.1 interface BV527\n",
            )
            .with_output("A", &describe_command("BV527"), "BV527    up    down    Orange-HQ")
            .with_output("B", BFD_LOG_COMMAND, "");
        let orch = ScanOrchestrator::new(Arc::new(source), ClassificationRules::default());

        let report = orch
            .run_blocking(&ScanRequest::Bfd, &[Node::new("A"), Node::new("B"), Node::new("C")])
            .unwrap();

        let nodes = report.nodes();
        assert_eq!(nodes[0].records, 1);
        assert!(nodes[0].note.is_none());
        assert_eq!(nodes[1].note.as_deref(), Some(NO_EVENTS_HEADLINE));
        assert!(nodes[2].error.is_some());
        assert!(nodes[2].note.is_none());
        assert_eq!(report.failed_nodes(), 1);

        match report {
            ScanReport::Bfd { sections, .. } => {
                assert_eq!(sections.len(), 1);
                assert_eq!(sections[0].category, "Orange");
            }
            other => panic!("unexpected report: {other:?}"),
        }
    }

    #[test]
    fn test_adjacency_run_keeps_inventory_order() {
        let command = "show logging start today | i isis";
        let orch = ScanOrchestrator::new(Arc::new(adjacency_source(command)), ClassificationRules::default());
        let request = ScanRequest::Adjacency {
            command: command.to_string(),
            year: 2024,
        };

        let report = orch
            .run_blocking(&request, &[Node::new("A"), Node::new("B")])
            .unwrap();
        match report {
            ScanReport::Adjacency { records, year, .. } => {
                assert_eq!(year, 2024);
                let nodes: Vec<&str> = records.iter().map(|r| r.node.as_str()).collect();
                assert_eq!(nodes, vec!["A", "B"]);
            }
            other => panic!("unexpected report: {other:?}"),
        }
    }

    #[test]
    fn test_adjacency_bad_timestamp_fails_only_its_node() {
        let command = "show logging start today | i isis";
        let source = MemorySource::new()
            .with_output(
                "A",
                command,
                "Dec 11 15:30:57.1 : %ROUTING-ISIS-5-ADJCHANGE : Adjacency to X (Hu0/0/0/1) (L2) Down\n",
            )
            .with_output(
                "B",
                command,
                "Feb 29 09:00:00.0 : %ROUTING-ISIS-5-ADJCHANGE : Adjacency to Y (Te0/0/0/9) (L2) Down\n",
            );
        let orch = ScanOrchestrator::new(Arc::new(source), ClassificationRules::default());
        let request = ScanRequest::Adjacency {
            command: command.to_string(),
            year: 2023,
        };

        let report = orch
            .run_blocking(&request, &[Node::new("A"), Node::new("B")])
            .unwrap();
        assert_eq!(report.failed_nodes(), 1);
        let nodes = report.nodes();
        assert_eq!(nodes[0].records, 1);
        assert!(nodes[0].error.is_none());
        assert_eq!(nodes[1].records, 0);
        assert!(nodes[1].error.is_some());
        match report {
            ScanReport::Adjacency { records, .. } => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].node, "A");
            }
            other => panic!("unexpected report: {other:?}"),
        }
    }

    #[test]
    fn test_circuits_run_flattens_in_inventory_order() {
        let source = MemorySource::new()
            .with_output("B", CIRCUIT_COMMAND, "Te0/0/0/1 up up X\\RMD-LR-2\n")
            .with_output("A", CIRCUIT_COMMAND, "Hu0/0/0/1 up up X\\HQ-LR-1\n");
        let orch = ScanOrchestrator::new(Arc::new(source), ClassificationRules::default());

        let report = orch
            .run_blocking(&ScanRequest::Circuits, &[Node::new("A"), Node::new("B")])
            .unwrap();
        match report {
            ScanReport::Circuits { circuits, .. } => {
                let numbers: Vec<u64> = circuits.iter().map(|c| c.circuit_number).collect();
                assert_eq!(numbers, vec![1, 2]);
            }
            other => panic!("unexpected report: {other:?}"),
        }
    }

    // ── run (async) ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_async_run_matches_blocking_run() {
        let command = "show logging start today | i isis";
        let orch = ScanOrchestrator::new(Arc::new(adjacency_source(command)), ClassificationRules::default())
            .with_concurrency(4);
        let request = ScanRequest::Adjacency {
            command: command.to_string(),
            year: 2024,
        };
        let inventory = vec![Node::new("A"), Node::new("B"), Node::new("missing")];

        let blocking = orch.run_blocking(&request, &inventory).unwrap();
        let concurrent = orch.run(&request, inventory).await.unwrap();

        assert_eq!(blocking.nodes(), concurrent.nodes());
        assert_eq!(concurrent.failed_nodes(), 1);
    }

    #[test]
    fn test_report_serialises_with_tag() {
        let report = ScanReport::Circuits {
            nodes: Vec::new(),
            circuits: Vec::new(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["report"], "circuits");
    }
}
