//! Extraction and aggregation layer for flapscan.
//!
//! Turns raw command output into typed events, folds them into one record
//! per interface, groups the records for reporting and runs the per-node
//! pipelines against a [`reader::CommandSource`].

pub mod aggregator;
pub mod analysis;
pub mod assembler;
pub mod circuit;
pub mod descriptor;
pub mod extract;
pub mod reader;

pub use flapscan_core as core;
