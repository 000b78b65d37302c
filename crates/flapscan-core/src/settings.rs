use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Result, ScanError};
use crate::time_utils;

// ── ReportKind ─────────────────────────────────────────────────────────────────

/// Which extraction pipeline a run drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    /// BFD session flaps on BV/BVI interfaces, grouped by provider.
    Bfd,
    /// IS-IS adjacency changes, ordered chronologically.
    Adjacency,
    /// `LR-` circuit inventory.
    Circuits,
}

impl FromStr for ReportKind {
    type Err = ScanError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "bfd" => Ok(ReportKind::Bfd),
            "adjacency" => Ok(ReportKind::Adjacency),
            "circuits" => Ok(ReportKind::Circuits),
            other => Err(ScanError::Config(format!("unknown report: {other}"))),
        }
    }
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Bfd => "bfd",
            ReportKind::Adjacency => "adjacency",
            ReportKind::Circuits => "circuits",
        }
    }
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Summarise interface flaps and circuits from captured device output
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flapscan",
    about = "Summarise interface flaps and circuits from captured device output",
    version
)]
pub struct Settings {
    /// Report to build
    #[arg(long, default_value = "bfd", value_parser = ["bfd", "adjacency", "circuits"])]
    pub report: String,

    /// Directory holding one sub-directory of captured command output per node
    #[arg(long, env = "FLAPSCAN_CAPTURES", default_value = "captures")]
    pub captures: PathBuf,

    /// Classification rules file (JSON); defaults to ~/.flapscan/rules.json
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Year the device timestamps belong to (logs omit it)
    #[arg(long)]
    pub year: Option<i32>,

    /// Day of the adjacency window (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// Start of the adjacency window (HH:MM:SS)
    #[arg(long, default_value = "00:00:00")]
    pub start_time: String,

    /// End of the adjacency window (HH:MM:SS)
    #[arg(long, default_value = "23:59:59")]
    pub end_time: String,

    /// Nodes processed at once (1-32)
    #[arg(long, default_value = "4", value_parser = clap::value_parser!(u32).range(1..=32))]
    pub concurrency: u32,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments and apply `--debug`.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os())
    }

    /// Same as [`load`](Self::load) with an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut settings = Settings::parse_from(args);
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    pub fn report_kind(&self) -> Result<ReportKind> {
        self.report.parse()
    }

    /// The year used to anchor device timestamps.
    ///
    /// `--year` wins; otherwise the year of `--date`. Neither given is a
    /// configuration error, raised only by callers that need ordering.
    pub fn reference_year(&self) -> Result<i32> {
        use chrono::Datelike;

        if let Some(year) = self.year {
            return Ok(year);
        }
        match &self.date {
            Some(date) => Ok(time_utils::parse_date(date)?.year()),
            None => Err(ScanError::MissingReferenceYear),
        }
    }

    /// The `(start, end)` adjacency window, if `--date` was given.
    pub fn logging_window(&self) -> Result<Option<(chrono::NaiveDateTime, chrono::NaiveDateTime)>> {
        let Some(date) = &self.date else {
            return Ok(None);
        };
        let day = time_utils::parse_date(date)?;
        let start = time_utils::at_time(day, &self.start_time)?;
        let end = time_utils::at_time(day, &self.end_time)?;
        if end < start {
            return Err(ScanError::Config(format!(
                "window end {} is before start {}",
                self.end_time, self.start_time
            )));
        }
        Ok(Some((start, end)))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
