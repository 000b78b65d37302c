//! Runtime layer for flapscan.
//!
//! Sweeps a node inventory through the per-node pipelines, with or without
//! bounded concurrency, and assembles the outcomes into one report.

pub mod orchestrator;
pub mod sweep;

pub use flapscan_core as core;
pub use flapscan_data as data;
