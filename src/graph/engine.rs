//! The canonical use graph.
//!
//! A dense vector of nodes indexed by [`NodeId`], plus the identity indexes
//! the builder accumulated. Read-only once built; shared freely by the
//! selector and by whatever rewrites the source afterwards.

use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use super::partial::PartialGraph;
use super::types::*;

/// The deduplicated graph of declarations for one extraction run.
#[derive(Debug, Clone)]
pub struct UseGraph {
    nodes: Vec<Node>,
    /// Index: stable path -> node.
    by_path: HashMap<ObjectPath, NodeId>,
    /// Index: position (with column) -> node.
    by_position: HashMap<Position, NodeId>,
    /// Index: declaration name -> nodes carrying it.
    by_name: HashMap<String, Vec<NodeId>>,
}

impl UseGraph {
    /// A graph holding only the synthetic root.
    pub fn new() -> Self {
        let mut root = Node::root();
        root.subgraph = Some(0);
        Self::from_parts(vec![root], HashMap::new(), HashMap::new())
    }

    pub(crate) fn from_parts(
        nodes: Vec<Node>,
        by_path: HashMap<ObjectPath, NodeId>,
        by_position: HashMap<Position, NodeId>,
    ) -> Self {
        let mut by_name: HashMap<String, Vec<NodeId>> = HashMap::new();
        for node in nodes.iter().filter(|n| n.kind != NodeKind::Root) {
            by_name.entry(node.name.clone()).or_default().push(node.id);
        }
        Self {
            nodes,
            by_path,
            by_position,
            by_name,
        }
    }

    // ─── Accessors ──────────────────────────────────────────────

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root is always present. Companion to [`len`](Self::len).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> &Node {
        &self.nodes[NodeId::ROOT.index()]
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Find the node declared under `identity`.
    pub fn lookup(&self, identity: &Identity) -> Option<NodeId> {
        match identity {
            Identity::Path(path) => self.by_path.get(path).copied(),
            Identity::Position(pos) if pos.has_column() => self.by_position.get(pos).copied(),
            Identity::Position(_) => None,
        }
    }

    /// All nodes with exactly this name. Declarations sharing a name are
    /// not disambiguated.
    pub fn nodes_named(&self, name: &str) -> &[NodeId] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The methods that travel with node `id`.
    ///
    /// Every method of the named type the node is declared with, plus, for a
    /// type declaration, every method it owns. Methods not present in the
    /// graph are skipped.
    pub fn method_nodes(&self, id: NodeId) -> Vec<NodeId> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };
        let mut methods: Vec<NodeId> = node
            .named_type
            .iter()
            .flat_map(|named| named.methods.iter())
            .filter_map(|identity| self.lookup(identity))
            .collect();
        if node.kind == NodeKind::Type {
            methods.extend(
                node.owns
                    .iter()
                    .copied()
                    .filter(|&m| self.node(m).is_some_and(|n| n.kind == NodeKind::Method)),
            );
        }
        methods.sort_unstable();
        methods.dedup();
        methods
    }

    // ─── Stats ──────────────────────────────────────────────────

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            total_nodes: self.nodes.len(),
            ..GraphStats::default()
        };
        for node in &self.nodes {
            stats.use_edges += node.uses.len();
            stats.owns_edges += node.owns.len();
            if node.exported {
                stats.exported += 1;
            }
            *stats.by_kind.entry(node.kind).or_default() += 1;
        }
        stats
    }

    // ─── Export ─────────────────────────────────────────────────

    /// The canonical graph as a batch that can be merged again. Synthetic
    /// roots keep their ordinals so the merger recognizes them.
    pub fn to_partial(&self) -> PartialGraph {
        PartialGraph {
            nodes: self.nodes.clone(),
        }
    }

    /// The graph as a petgraph `DiGraph`. Node index `i` is node id `i`.
    pub fn to_petgraph(&self, include_owns: bool) -> DiGraph<NodeId, EdgeKind> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), 0);
        for node in &self.nodes {
            graph.add_node(node.id);
        }
        for node in &self.nodes {
            let from = NodeIndex::new(node.id.index());
            for u in &node.uses {
                graph.add_edge(from, NodeIndex::new(u.index()), EdgeKind::Uses);
            }
            if include_owns {
                for o in &node.owns {
                    graph.add_edge(from, NodeIndex::new(o.index()), EdgeKind::Owns);
                }
            }
        }
        graph
    }

    /// Render the graph in Graphviz DOT format.
    pub fn to_dot(&self, include_owns: bool) -> String {
        let labelled = self.to_petgraph(include_owns).map(
            |_, &id| self.label(id),
            |_, &kind| kind,
        );
        format!("{}", Dot::new(&labelled))
    }

    fn label(&self, id: NodeId) -> String {
        match self.node(id) {
            Some(node) if node.id.is_root() => "(root)".to_string(),
            Some(node) if node.kind == NodeKind::Root => format!("(subgraph {})", id),
            Some(node) => format!("{} {} ({})", node.kind, node.name, id),
            None => id.to_string(),
        }
    }
}

impl Default for UseGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::build_graph;

    fn sample() -> UseGraph {
        let mut g = PartialGraph::new(
            Node::new(NodeId(0), "pkg", NodeKind::Function, false)
                .with_path(ObjectPath::new("p", "pkg")),
        );
        let buf_pos = Position::new("buf.go", 3, 6);
        let write_pos = Position::new("buf.go", 7, 17);
        let buf = g.add_node(
            Node::new(NodeId(0), "Buffer", NodeKind::Type, true)
                .with_path(ObjectPath::new("p", "Buffer"))
                .with_position(buf_pos),
        );
        let write = g.add_node(
            Node::new(NodeId(0), "Write", NodeKind::Method, true)
                .with_position(write_pos.clone()),
        );
        let field = g.add_node(
            Node::new(NodeId(0), "data", NodeKind::Field, false)
                .with_position(Position::new("buf.go", 4, 2)),
        );
        let global = g.add_node(
            Node::new(NodeId(0), "scratch", NodeKind::Var, false)
                .with_position(Position::new("buf.go", 12, 5))
                .with_named_type(NamedType {
                    name: "Buffer".to_string(),
                    methods: vec![
                        Identity::Position(write_pos),
                        Identity::Path(ObjectPath::new("elsewhere", "Gone")),
                    ],
                }),
        );
        g.add_owns(buf, write);
        g.add_owns(buf, field);
        g.add_use(global, buf);
        g.add_use(write, field);
        build_graph([&g]).unwrap()
    }

    #[test]
    fn test_empty_graph() {
        let graph = UseGraph::new();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.root().kind, NodeKind::Root);
        assert!(graph.nodes_named("").is_empty());
    }

    #[test]
    fn test_lookup_by_identity() {
        let graph = sample();
        let buf = graph.nodes_named("Buffer")[0];
        assert_eq!(
            graph.lookup(&Identity::Path(ObjectPath::new("p", "Buffer"))),
            Some(buf)
        );
        assert_eq!(
            graph.lookup(&Identity::Position(Position::new("buf.go", 3, 6))),
            Some(buf)
        );
        assert_eq!(
            graph.lookup(&Identity::Position(Position::without_column("buf.go", 3))),
            None
        );
    }

    #[test]
    fn test_method_nodes_of_named_type_and_type_decl() {
        let graph = sample();
        let write = graph.nodes_named("Write")[0];

        let scratch = graph.nodes_named("scratch")[0];
        assert_eq!(graph.method_nodes(scratch), vec![write]);

        let buf = graph.nodes_named("Buffer")[0];
        assert_eq!(graph.method_nodes(buf), vec![write]);

        let data = graph.nodes_named("data")[0];
        assert!(graph.method_nodes(data).is_empty());
    }

    #[test]
    fn test_stats() {
        let stats = sample().stats();
        assert_eq!(stats.total_nodes, 6);
        assert_eq!(stats.use_edges, 3);
        assert_eq!(stats.owns_edges, 2);
        assert_eq!(stats.exported, 2);
        assert_eq!(stats.by_kind.get(&NodeKind::Method), Some(&1));
    }

    #[test]
    fn test_petgraph_mirrors_ids() {
        let graph = sample();
        let pg = graph.to_petgraph(false);
        assert_eq!(pg.node_count(), graph.len());
        assert_eq!(pg.edge_count(), 3);
        assert_eq!(graph.to_petgraph(true).edge_count(), 5);
        assert_eq!(pg[NodeIndex::new(1)], NodeId(1));
    }

    #[test]
    fn test_dot_output() {
        let dot = sample().to_dot(true);
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("type Buffer"));
        assert!(dot.contains("(root)"));
        assert!(dot.contains("owns"));
    }
}
