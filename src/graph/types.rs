//! Core types for the declaration use graph.
//!
//! Defines node ids, node kinds, declaration identity, and the node
//! structure shared by partial graphs and the canonical graph.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Dense index of a node within a graph.
///
/// In a partial graph this is the batch's local numbering; in a canonical
/// graph it is the canonical id. Either way it indexes the node vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The root of every graph.
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of declaration a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// The synthetic root of a canonical graph.
    Root,
    /// A package-level function.
    Function,
    /// A method bound to a named type.
    Method,
    /// A type declaration.
    Type,
    /// A variable.
    Var,
    /// A constant.
    Const,
    /// A struct field.
    Field,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Root => write!(f, "root"),
            NodeKind::Function => write!(f, "function"),
            NodeKind::Method => write!(f, "method"),
            NodeKind::Type => write!(f, "type"),
            NodeKind::Var => write!(f, "var"),
            NodeKind::Const => write!(f, "const"),
            NodeKind::Field => write!(f, "field"),
        }
    }
}

/// The kind of an edge between two declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// The source's definition references the target.
    Uses,
    /// The source contains the target (type -> method, struct -> field).
    Owns,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::Uses => write!(f, "uses"),
            EdgeKind::Owns => write!(f, "owns"),
        }
    }
}

/// Position-independent identity of a declaration that came from compiled
/// or indexed dependency data.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectPath {
    /// Import path of the declaring package.
    pub pkg_path: String,
    /// Path of the object within its package.
    pub obj_path: String,
}

impl ObjectPath {
    pub fn new(pkg_path: impl Into<String>, obj_path: impl Into<String>) -> Self {
        Self {
            pkg_path: pkg_path.into(),
            obj_path: obj_path.into(),
        }
    }

    /// An empty object path names nothing and is not an identity.
    pub fn is_empty(&self) -> bool {
        self.obj_path.is_empty()
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.pkg_path, self.obj_path)
    }
}

/// Source location of a declaration.
///
/// `column` is `None` when the source carried no column data. Such a
/// position can still be reported but must not be used to identify a
/// declaration: many unrelated objects share a line.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// The file the declaration lives in.
    pub file: String,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed), if known.
    #[serde(default)]
    pub column: Option<u32>,
}

impl Position {
    /// A position with real column data.
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column: Some(column),
        }
    }

    /// A position that only knows its file and line.
    pub fn without_column(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column: None,
        }
    }

    /// Whether this position is precise enough to identify a declaration.
    pub fn has_column(&self) -> bool {
        self.column.is_some()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column {
            Some(col) => write!(f, "{}:{}:{}", self.file, self.line, col),
            None => write!(f, "{}:{}", self.file, self.line),
        }
    }
}

/// A way of naming one declaration independently of any graph's ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Identity {
    Path(ObjectPath),
    Position(Position),
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Path(path) => write!(f, "{}", path),
            Identity::Position(pos) => write!(f, "{}", pos),
        }
    }
}

/// The named type a declaration is declared with, as resolved by the
/// front end: its name and the identities of every method in its method set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedType {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<Identity>,
}

/// One declaration in a use graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Unqualified declaration name. Empty for the synthetic root.
    pub name: String,
    /// Visible outside the declaring package.
    pub exported: bool,
    pub kind: NodeKind,
    /// Stable identity, when the declaration has one.
    #[serde(default)]
    pub path: Option<ObjectPath>,
    #[serde(default)]
    pub position: Position,
    /// Named type this declaration is declared with, if any.
    #[serde(default)]
    pub named_type: Option<NamedType>,
    /// Declarations this declaration's definition references.
    #[serde(default)]
    pub uses: Vec<NodeId>,
    /// Declarations this declaration contains (methods, fields).
    #[serde(default)]
    pub owns: Vec<NodeId>,
    /// Ordinal the merger gave this synthetic root. `Some(0)` is the
    /// canonical root; front-end roots leave it unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subgraph: Option<u32>,
}

impl Node {
    pub fn new(id: NodeId, name: impl Into<String>, kind: NodeKind, exported: bool) -> Self {
        Self {
            id,
            name: name.into(),
            exported,
            kind,
            path: None,
            position: Position::default(),
            named_type: None,
            uses: Vec::new(),
            owns: Vec::new(),
            subgraph: None,
        }
    }

    /// The synthetic root: no name, no identity.
    pub fn root() -> Self {
        Self::new(NodeId::ROOT, "", NodeKind::Root, false)
    }

    pub fn with_path(mut self, path: ObjectPath) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_named_type(mut self, named_type: NamedType) -> Self {
        self.named_type = Some(named_type);
        self
    }

    /// The stable path, unless it is missing or empty.
    pub fn stable_path(&self) -> Option<&ObjectPath> {
        self.path.as_ref().filter(|p| !p.is_empty())
    }

    /// Whether this node can be recognized again in a later batch.
    pub fn has_identity(&self) -> bool {
        self.stable_path().is_some() || self.position.has_column()
    }

    /// Every identity this node can be found under.
    pub fn identities(&self) -> impl Iterator<Item = Identity> + '_ {
        let path = self.stable_path().cloned().map(Identity::Path);
        let position = self
            .position
            .has_column()
            .then(|| Identity::Position(self.position.clone()));
        path.into_iter().chain(position)
    }
}

/// Statistics about a canonical graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Nodes including the synthetic root.
    pub total_nodes: usize,
    pub use_edges: usize,
    pub owns_edges: usize,
    pub exported: usize,
    pub by_kind: BTreeMap<NodeKind, usize>,
}

impl fmt::Display for GraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes ({} exported), {} uses edges, {} owns edges",
            self.total_nodes, self.exported, self.use_edges, self.owns_edges
        )?;
        for (kind, count) in &self.by_kind {
            write!(f, "\n  {}: {}", kind, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_without_column_has_no_identity() {
        let node = Node::new(NodeId(1), "x", NodeKind::Var, false)
            .with_position(Position::without_column("a.go", 3));
        assert!(!node.has_identity());
        assert_eq!(node.identities().count(), 0);
    }

    #[test]
    fn test_empty_object_path_is_no_identity() {
        let node = Node::new(NodeId(1), "x", NodeKind::Var, false)
            .with_path(ObjectPath::new("", ""))
            .with_position(Position::without_column("a.go", 3));
        assert!(ObjectPath::new("p", "").is_empty());
        assert!(node.stable_path().is_none());
        assert!(!node.has_identity());
        assert_eq!(node.identities().count(), 0);
    }

    #[test]
    fn test_identities_lists_path_then_position() {
        let node = Node::new(NodeId(1), "Read", NodeKind::Method, true)
            .with_path(ObjectPath::new("io", "Reader.M0"))
            .with_position(Position::new("io.go", 10, 2));
        let ids: Vec<Identity> = node.identities().collect();
        assert_eq!(ids.len(), 2);
        assert!(matches!(ids[0], Identity::Path(_)));
        assert!(matches!(ids[1], Identity::Position(_)));
    }

    #[test]
    fn test_column_one_is_a_real_column() {
        let pos = Position::new("a.go", 1, 1);
        assert!(pos.has_column());
        assert_eq!(pos.to_string(), "a.go:1:1");
        assert_eq!(Position::without_column("a.go", 7).to_string(), "a.go:7");
    }

    #[test]
    fn test_node_kind_serializes_snake_case() {
        let json = serde_json::to_string(&NodeKind::Function).unwrap();
        assert_eq!(json, "\"function\"");
        assert_eq!(NodeKind::Const.to_string(), "const");
    }

    #[test]
    fn test_node_deserializes_with_defaults() {
        let json = r#"{"id": 3, "name": "f", "exported": false, "kind": "function"}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.id, NodeId(3));
        assert!(node.uses.is_empty());
        assert!(node.path.is_none());
        assert!(!node.position.has_column());
    }
}
