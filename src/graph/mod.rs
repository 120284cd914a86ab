//! Declaration use graph, the structural backbone of excise.
//!
//! Provides the graph data model, the partial graphs produced by analysis,
//! the builder that merges them, and the read-only canonical graph.

pub mod builder;
pub mod engine;
pub mod partial;
pub mod types;

pub use builder::{build_graph, GraphBuilder, MergeReport};
pub use engine::UseGraph;
pub use partial::PartialGraph;
pub use types::{
    EdgeKind, GraphStats, Identity, NamedType, Node, NodeId, NodeKind, ObjectPath, Position,
};
