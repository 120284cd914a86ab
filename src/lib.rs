//! # excise
//!
//! Extract a chosen set of declarations from a package, together with every
//! internal declaration they depend on, so the extracted code builds on its
//! own.
//!
//! The analysis front end describes a package as one or more partial use
//! graphs. excise merges them into a single canonical graph with stable node
//! identity, then walks it from the requested targets to decide which
//! declarations must be copied and which can stay external references.
//!
//! ## Quick Start
//!
//! ```rust
//! use excise::{build_graph, select, Node, NodeId, NodeKind, PartialGraph, Position, TargetSet};
//!
//! let mut partial = PartialGraph::new(Node::root());
//! let parse = partial.add_node(
//!     Node::new(NodeId(0), "parse", NodeKind::Function, false)
//!         .with_position(Position::new("parse.go", 10, 6)),
//! );
//! let lex = partial.add_node(
//!     Node::new(NodeId(0), "lex", NodeKind::Function, false)
//!         .with_position(Position::new("lex.go", 3, 6)),
//! );
//! partial.add_use(parse, lex);
//!
//! let graph = build_graph([&partial]).unwrap();
//! let selection = select(&graph, &"parse".parse::<TargetSet>().unwrap());
//! assert_eq!(selection.len(), 2);
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod implements;
pub mod select;
pub mod typemodel;

pub use config::ExciseConfig;
pub use error::{ExciseError, Result};

pub use graph::{
    build_graph, EdgeKind, GraphBuilder, GraphStats, Identity, MergeReport, NamedType, Node,
    NodeId, NodeKind, ObjectPath, PartialGraph, Position, UseGraph,
};
pub use implements::{implements, Binding, Implementor};
pub use select::{select, select_with_config, Selection, TargetSet};
pub use typemodel::{Interface, Method, MethodSet, Signature, Type};

/// Merge `partials` and select everything `targets` needs, honouring the
/// diagnostics enabled in `config`.
pub fn extract(
    partials: &[PartialGraph],
    targets: &TargetSet,
    config: &ExciseConfig,
) -> Result<(UseGraph, Selection)> {
    let graph = build_graph(partials)?;
    let selection = select_with_config(&graph, targets, config)?;
    Ok((graph, selection))
}
