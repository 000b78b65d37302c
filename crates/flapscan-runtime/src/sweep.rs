//! Inventory sweep.
//!
//! Runs one per-node step over every node of an inventory. A node whose step
//! fails still gets an outcome: an empty result plus the error, so one dead
//! device never takes the rest of the run down.

use std::sync::Arc;

use flapscan_core::error::{Result, ScanError};
use flapscan_core::models::Node;
use serde::{Serialize, Serializer};
use tokio::sync::Semaphore;
use tracing::{info, warn};

// ── NodeOutcome ───────────────────────────────────────────────────────────────

/// Result of one node's step.
#[derive(Debug, Serialize)]
pub struct NodeOutcome<T> {
    pub node: Node,
    /// Step output; `T::default()` when the step failed.
    pub data: T,
    /// Error marker passed through from the step.
    #[serde(serialize_with = "serialize_error", skip_serializing_if = "Option::is_none")]
    pub error: Option<ScanError>,
}

fn serialize_error<S: Serializer>(error: &Option<ScanError>, s: S) -> std::result::Result<S::Ok, S::Error> {
    match error {
        Some(e) => s.serialize_str(&e.to_string()),
        None => s.serialize_none(),
    }
}

impl<T: Default> NodeOutcome<T> {
    pub fn from_result(node: Node, result: Result<T>) -> Self {
        match result {
            Ok(data) => {
                info!(node = %node.name, "node processed");
                Self {
                    node,
                    data,
                    error: None,
                }
            }
            Err(error) => {
                warn!(node = %node.name, error = %error, "node failed");
                Self {
                    node,
                    data: T::default(),
                    error: Some(error),
                }
            }
        }
    }
}

impl<T> NodeOutcome<T> {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Display form of the error, if any.
    pub fn error_marker(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

// ── sweep ─────────────────────────────────────────────────────────────────────

/// Run `step` for each node in inventory order, one at a time.
pub fn sweep<T, F>(nodes: &[Node], mut step: F) -> Vec<NodeOutcome<T>>
where
    T: Default,
    F: FnMut(&Node) -> Result<T>,
{
    nodes
        .iter()
        .map(|node| NodeOutcome::from_result(node.clone(), step(node)))
        .collect()
}

/// Run `step` for each node with at most `concurrency` nodes in flight.
///
/// Steps are blocking and run on the blocking pool. Outcomes come back in
/// inventory order regardless of completion order.
pub async fn sweep_concurrent<T, F>(nodes: Vec<Node>, concurrency: usize, step: F) -> Vec<NodeOutcome<T>>
where
    T: Default + Send + 'static,
    F: Fn(&Node) -> Result<T> + Send + Sync + 'static,
{
    let step = Arc::new(step);
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    let mut handles = Vec::with_capacity(nodes.len());
    for node in nodes {
        let step = Arc::clone(&step);
        let semaphore = Arc::clone(&semaphore);
        let task_node = node.clone();
        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            tokio::task::spawn_blocking(move || step(&task_node)).await
        });
        handles.push((node, handle));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for (node, handle) in handles {
        let result = match handle.await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) | Err(e) => Err(ScanError::Other(anyhow::anyhow!(
                "node task for {} did not complete: {e}",
                node.name
            ))),
        };
        outcomes.push(NodeOutcome::from_result(node, result));
    }
    outcomes
}

// ── Tests ─────────────────────────────────────────────────────────────────────
