//! Command-output sources.
//!
//! The pipelines never talk to devices. They ask a [`CommandSource`] for the
//! text a command produced on a node, and either get the whole blob or an
//! error. [`CaptureDirSource`] replays output captured earlier:
//!
//! ```text
//! captures/
//!   HQ-01/
//!     show_logging_start_today_i_bfd_i_bv.txt
//!     show_int_bv527_des.txt
//!   CA4-01/
//!     show_int_des_i_lr.txt
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use flapscan_core::error::{Result, ScanError};
use flapscan_core::models::Node;
use tracing::{debug, warn};

// ── CommandSource ─────────────────────────────────────────────────────────────

/// Where command output comes from.
pub trait CommandSource: Send + Sync {
    /// Output of `command` on `node`, complete, or an error.
    fn fetch(&self, node: &Node, command: &str) -> Result<String>;
}

impl<S: CommandSource + ?Sized> CommandSource for std::sync::Arc<S> {
    fn fetch(&self, node: &Node, command: &str) -> Result<String> {
        (**self).fetch(node, command)
    }
}

/// File-name form of a command: lower-case, every run of other characters
/// collapsed to `_`, trimmed.
///
/// `"show int des | i LR"` → `"show_int_des_i_lr"`.
pub fn command_slug(command: &str) -> String {
    let mut slug = String::with_capacity(command.len());
    let mut pending_sep = false;
    for ch in command.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}

// ── CaptureDirSource ──────────────────────────────────────────────────────────

/// Replays command output from `<root>/<node>/<command-slug>.txt`.
#[derive(Debug, Clone)]
pub struct CaptureDirSource {
    root: PathBuf,
}

impl CaptureDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ScanError::CaptureDirNotFound(root));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that holds the output of `command` on `node`.
    pub fn capture_path(&self, node: &Node, command: &str) -> PathBuf {
        self.root
            .join(&node.name)
            .join(format!("{}.txt", command_slug(command)))
    }

    /// One node per sub-directory of the root, sorted by name.
    pub fn discover_nodes(&self) -> Vec<Node> {
        let mut names: Vec<String> = walkdir::WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_dir())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| !name.starts_with('.'))
            .collect();
        names.sort();
        debug!(root = %self.root.display(), nodes = names.len(), "capture inventory discovered");
        names.into_iter().map(Node::new).collect()
    }
}

impl CommandSource for CaptureDirSource {
    fn fetch(&self, node: &Node, command: &str) -> Result<String> {
        let path = self.capture_path(node, command);
        std::fs::read_to_string(&path).map_err(|e| {
            warn!(node = %node.name, command, path = %path.display(), "capture not readable");
            ScanError::Fetch {
                node: node.name.clone(),
                command: command.to_string(),
                message: format!("{}: {e}", path.display()),
            }
        })
    }
}

// ── MemorySource ──────────────────────────────────────────────────────────────

/// In-memory source keyed by `(node, command)`.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    outputs: HashMap<(String, String), String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, node: &str, command: &str, output: impl Into<String>) -> Self {
        self.insert(node, command, output);
        self
    }

    pub fn insert(&mut self, node: &str, command: &str, output: impl Into<String>) {
        self.outputs
            .insert((node.to_string(), command.to_string()), output.into());
    }
}

impl CommandSource for MemorySource {
    fn fetch(&self, node: &Node, command: &str) -> Result<String> {
        self.outputs
            .get(&(node.name.clone(), command.to_string()))
            .cloned()
            .ok_or_else(|| ScanError::Fetch {
                node: node.name.clone(),
                command: command.to_string(),
                message: "no output recorded".to_string(),
            })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
