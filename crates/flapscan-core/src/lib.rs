//! Shared types for flapscan.
//!
//! Data model, error type, classification rules and the pure classifiers
//! applied to extracted records, plus command-line settings.

pub mod classifiers;
pub mod error;
pub mod models;
pub mod rules;
pub mod settings;
pub mod time_utils;

pub use error::{Result, ScanError};
