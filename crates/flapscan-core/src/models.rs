use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Sentinel description used when no usable descriptor line exists.
pub const NO_DESC_FOUND: &str = "NO_DESC_FOUND";

/// Up/down verdict for a session, adjacency, port or circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LinkState {
    Up,
    Down,
    Unknown,
}

impl LinkState {
    /// Upper-case token as it appears in device logs (`"UP"`, `"DOWN"`).
    pub fn as_str(self) -> &'static str {
        match self {
            LinkState::Up => "UP",
            LinkState::Down => "DOWN",
            LinkState::Unknown => "UNKNOWN",
        }
    }

    /// Title-case label used for descriptor status (`"Up"`, `"Down"`).
    ///
    /// `Unknown` keeps its upper-case spelling.
    pub fn label(self) -> &'static str {
        match self {
            LinkState::Up => "Up",
            LinkState::Down => "Down",
            LinkState::Unknown => "UNKNOWN",
        }
    }

    pub fn is_down(self) -> bool {
        self == LinkState::Down
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialise as [`LinkState::label`].
fn serialize_label<S: Serializer>(state: &LinkState, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(state.label())
}

/// Serialise as the lower-case port status (`"up"`, `"down"`).
fn serialize_port_status<S: Serializer>(state: &LinkState, serializer: S) -> Result<S::Ok, S::Error> {
    let text = match state {
        LinkState::Up => "up",
        LinkState::Down => "down",
        LinkState::Unknown => "unknown",
    };
    serializer.serialize_str(text)
}

/// A device in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    /// Display name, e.g. `"HQ-01ASR01_CI-01"`.
    pub name: String,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Identity under which repeated observations are folded together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    pub node: String,
    pub interface: String,
}

impl EntityKey {
    pub fn new(node: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            interface: interface.into(),
        }
    }
}

/// One typed observation recognised in a single line of device output.
///
/// Lives only for the duration of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub key: EntityKey,
    /// Best-effort device time text; empty when the line carried none.
    pub timestamp: String,
    pub state: LinkState,
    pub peer: Option<String>,
    /// Zero-based line position in the source text.
    pub line_index: usize,
}

/// Description and live status of one interface, from `show int <x> des`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    pub text: String,
    #[serde(serialize_with = "serialize_label")]
    pub status: LinkState,
}

impl Descriptor {
    pub fn new(text: impl Into<String>, status: LinkState) -> Self {
        Self {
            text: text.into(),
            status,
        }
    }

    /// The `NO_DESC_FOUND` / `UNKNOWN` pair.
    pub fn not_found() -> Self {
        Self::new(NO_DESC_FOUND, LinkState::Unknown)
    }
}

/// Coarse label attached to a group of records for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Down,
    Flapped,
}

impl Classification {
    /// `Down` when the final state is DOWN, `Flapped` otherwise.
    pub fn from_final_state(state: LinkState) -> Self {
        if state.is_down() {
            Classification::Down
        } else {
            Classification::Flapped
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Classification::Down => "Down",
            Classification::Flapped => "Flapped",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Port speed inferred from the interface name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkRate {
    #[serde(rename = "100G")]
    HundredGig,
    #[serde(rename = "10G")]
    TenGig,
    Unknown,
}

impl LinkRate {
    pub fn label(self) -> &'static str {
        match self {
            LinkRate::HundredGig => "100G",
            LinkRate::TenGig => "10G",
            LinkRate::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for LinkRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Far-end site (MTX-B) derived from a circuit description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "code", rename_all = "lowercase")]
pub enum SiteCode {
    /// One of the configured site prefixes.
    Known(String),
    /// No prefix matched; the raw leading segment of the description.
    Unclassified(String),
}

impl SiteCode {
    pub fn as_str(&self) -> &str {
        match self {
            SiteCode::Known(code) | SiteCode::Unclassified(code) => code,
        }
    }
}

impl fmt::Display for SiteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `LR-` circuit row from `show int des | i LR`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitRecord {
    /// Near-end node (MTX-A).
    pub node: String,
    /// Far-end site (MTX-B).
    pub site: SiteCode,
    pub interface: String,
    pub rate: LinkRate,
    pub circuit_number: u64,
    /// `"up"` only for an exact `up` protocol column.
    #[serde(serialize_with = "serialize_port_status")]
    pub status: LinkState,
}
