//! Error types for excise.

use thiserror::Error;

/// Everything that can go wrong while merging partial graphs or selecting
/// declarations.
#[derive(Debug, Error)]
pub enum ExciseError {
    /// A non-root declaration carries neither a stable path nor a position
    /// with real column data. The analysis front end produced malformed input.
    #[error("object {name:?} (local id {local_id}) has no path but also no column information")]
    MissingIdentity { name: String, local_id: u32 },

    /// A partial-graph node's id does not match its slot in the batch.
    #[error("partial graph node at index {index} claims local id {id}")]
    InvalidLocalId { index: usize, id: u32 },

    /// An edge points outside the partial graph it belongs to.
    #[error("edge {from} -> {to} points outside a partial graph of {len} nodes")]
    DanglingEdge { from: u32, to: u32, len: usize },

    /// A selection was requested with no target names.
    #[error("missing targets")]
    EmptyTargets,

    /// A target list contained an empty name (e.g. `Foo,,Bar`).
    #[error("empty string target")]
    EmptyTargetName,

    /// None of the requested targets matched a declaration.
    /// Only raised when `require_resolved_targets` is enabled.
    #[error("no declaration matched any of the targets: {targets}")]
    NoTargetsResolved { targets: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ExciseError>;
