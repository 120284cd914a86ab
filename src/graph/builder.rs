//! Graph builder. Folds partial graphs into one canonical use graph.
//!
//! The same declaration is routinely seen by several analysis passes: once
//! while analysing the package itself and again while resolving a dependency
//! that refers to it. The builder collapses every sighting onto one node,
//! keyed first by stable path and then by source position.
//!
//! Two sightings can turn out to be the same declaration only after a third
//! one links them (one known by path, one by position, a later one by both).
//! The builder therefore works on provisional slots joined by a union-find
//! forest and hands out dense canonical ids only when the graph is frozen.

use std::collections::HashMap;
use std::mem;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::engine::UseGraph;
use super::partial::PartialGraph;
use super::types::{Node, NodeId, NodeKind, ObjectPath, Position};
use crate::error::{ExciseError, Result};

/// Summary of a single [`GraphBuilder::merge`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Nodes allocated for declarations not seen before.
    pub added: usize,
    /// Incoming nodes recognized by stable path.
    pub deduplicated_by_path: usize,
    /// Incoming nodes recognized by position.
    pub deduplicated_by_position: usize,
    /// Previously distinct nodes discovered to be one declaration.
    pub unified: usize,
    /// Edges added from the canonical root to new subgraph roots.
    pub root_edges: usize,
}

/// Accumulates partial graphs for one extraction run.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    /// Provisional slots. Slot 0 is the synthetic root.
    slots: Vec<Node>,
    /// Union-find parent of each slot; a representative is its own parent
    /// and always the smallest slot of its class.
    parent: Vec<NodeId>,
    by_path: HashMap<ObjectPath, NodeId>,
    by_position: HashMap<Position, NodeId>,
    /// Synthetic roots by the ordinal handed out when they were added.
    by_subgraph: HashMap<u32, NodeId>,
}

impl GraphBuilder {
    /// A builder holding only the synthetic root.
    pub fn new() -> Self {
        let mut root = Node::root();
        root.subgraph = Some(0);
        Self {
            slots: vec![root],
            parent: vec![NodeId::ROOT],
            by_path: HashMap::new(),
            by_position: HashMap::new(),
            by_subgraph: HashMap::from([(0, NodeId::ROOT)]),
        }
    }

    /// Number of distinct declarations merged so far, root included.
    pub fn len(&self) -> usize {
        (0..self.slots.len())
            .filter(|&i| self.parent[i].index() == i)
            .count()
    }

    /// Always false: the root is always present. Companion to [`len`](Self::len).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fold a partial graph into the canonical graph.
    ///
    /// The whole batch is validated before anything is touched: a malformed
    /// batch is rejected and leaves the builder as it was.
    pub fn merge(&mut self, partial: &PartialGraph) -> Result<MergeReport> {
        partial.validate()?;
        for node in &partial.nodes {
            if !node.id.is_root() && !node.has_identity() && node.subgraph.is_none() {
                return Err(ExciseError::MissingIdentity {
                    name: node.name.clone(),
                    local_id: node.id.0,
                });
            }
        }

        let mut report = MergeReport::default();
        let mut remapping: Vec<NodeId> = Vec::with_capacity(partial.len());

        // First pass: find or allocate a slot for every incoming node.
        for node in &partial.nodes {
            let slot = self.resolve(node, &mut report);
            remapping.push(slot);
        }

        // Second pass: append remapped edges onto the owning slots.
        for node in &partial.nodes {
            let target = self.find(remapping[node.id.index()]);
            let slot = &mut self.slots[target.index()];
            slot.uses.extend(node.uses.iter().map(|u| remapping[u.index()]));
            slot.owns.extend(node.owns.iter().map(|o| remapping[o.index()]));
        }

        debug!(
            nodes = partial.len(),
            added = report.added,
            by_path = report.deduplicated_by_path,
            by_position = report.deduplicated_by_position,
            unified = report.unified,
            "merged partial graph"
        );
        Ok(report)
    }

    /// Snapshot of the canonical graph built so far.
    ///
    /// Ids in a snapshot are dense. A later merge that unifies two nodes
    /// can shift them; ids are final only in the graph returned by
    /// [`finish`](Self::finish).
    pub(crate) fn graph(&self) -> UseGraph {
        let mut dense: Vec<Option<NodeId>> = vec![None; self.slots.len()];
        let mut order: Vec<usize> = Vec::new();
        for i in 0..self.slots.len() {
            let rep = self.find(NodeId(i as u32)).index();
            if dense[rep].is_none() {
                dense[rep] = Some(NodeId(order.len() as u32));
                order.push(rep);
            }
        }
        let canonical = |slot: NodeId| -> NodeId {
            // Every representative was numbered above.
            dense[self.find(slot).index()].unwrap_or(NodeId::ROOT)
        };

        let nodes: Vec<Node> = order
            .iter()
            .map(|&rep| {
                let mut node = self.slots[rep].clone();
                node.id = canonical(NodeId(rep as u32));
                node.uses = node.uses.iter().map(|&u| canonical(u)).collect();
                node.owns = node.owns.iter().map(|&o| canonical(o)).collect();
                node
            })
            .collect();
        let by_path = self
            .by_path
            .iter()
            .map(|(path, &slot)| (path.clone(), canonical(slot)))
            .collect();
        let by_position = self
            .by_position
            .iter()
            .map(|(pos, &slot)| (pos.clone(), canonical(slot)))
            .collect();

        UseGraph::from_parts(nodes, by_path, by_position)
    }

    /// Freeze the canonical graph.
    pub fn finish(self) -> UseGraph {
        self.graph()
    }

    fn find(&self, mut id: NodeId) -> NodeId {
        while self.parent[id.index()] != id {
            id = self.parent[id.index()];
        }
        id
    }

    fn resolve(&mut self, node: &Node, report: &mut MergeReport) -> NodeId {
        if let Some(ordinal) = node.subgraph {
            if let Some(&slot) = self.by_subgraph.get(&ordinal) {
                let slot = self.find(slot);
                trace!(local = %node.id, canonical = %slot, ordinal, "known subgraph root");
                return slot;
            }
        }

        let by_path = node
            .stable_path()
            .and_then(|p| self.by_path.get(p).copied())
            .map(|id| self.find(id));
        let by_position = if node.position.has_column() {
            self.by_position
                .get(&node.position)
                .copied()
                .map(|id| self.find(id))
        } else {
            None
        };

        match (by_path, by_position) {
            (Some(a), Some(b)) => {
                trace!(local = %node.id, path = %a, position = %b, "deduplicating on path and position");
                report.deduplicated_by_path += 1;
                if a != b {
                    report.unified += 1;
                    self.union(a, b)
                } else {
                    a
                }
            }
            (Some(a), None) => {
                trace!(local = %node.id, canonical = %a, "deduplicating on path");
                report.deduplicated_by_path += 1;
                self.register(node, a);
                a
            }
            (None, Some(b)) => {
                trace!(local = %node.id, canonical = %b, "deduplicating on position");
                report.deduplicated_by_position += 1;
                self.register(node, b);
                b
            }
            (None, None) => {
                let id = NodeId(self.slots.len() as u32);
                trace!(local = %node.id, canonical = %id, name = %node.name, "new node");
                let mut fresh = node.clone();
                fresh.id = id;
                fresh.path = node.stable_path().cloned();
                if !node.has_identity() {
                    // A synthetic root: remember it so canonical output
                    // merged back in finds it again.
                    let ordinal = self.by_subgraph.len() as u32;
                    fresh.subgraph = Some(ordinal);
                    self.by_subgraph.insert(ordinal, id);
                }
                fresh.uses = Vec::with_capacity(node.uses.len());
                fresh.owns = Vec::with_capacity(node.owns.len());
                self.slots.push(fresh);
                self.parent.push(id);
                report.added += 1;

                if node.id.is_root() {
                    // Our root uses all the roots of the subgraphs.
                    self.slots[0].uses.push(id);
                    report.root_edges += 1;
                }
                self.register(node, id);
                id
            }
        }
    }

    /// Record every identity of `node` that is not yet known.
    fn register(&mut self, node: &Node, slot: NodeId) {
        if let Some(path) = node.stable_path() {
            self.by_path.entry(path.clone()).or_insert(slot);
        }
        if node.position.has_column() {
            self.by_position.entry(node.position.clone()).or_insert(slot);
        }
        let target = &mut self.slots[slot.index()];
        if target.stable_path().is_none() {
            target.path = node.stable_path().cloned();
        }
        if !target.position.has_column() && node.position.has_column() {
            target.position = node.position.clone();
        }
        if target.named_type.is_none() {
            target.named_type = node.named_type.clone();
        }
    }

    /// Join the classes of `a` and `b`; the smaller slot survives and
    /// inherits the other's edges.
    fn union(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let (keep, gone) = if a < b { (a, b) } else { (b, a) };
        self.parent[gone.index()] = keep;

        let absorbed = mem::replace(
            &mut self.slots[gone.index()],
            Node::new(gone, "", NodeKind::Root, false),
        );
        let survivor = &mut self.slots[keep.index()];
        survivor.uses.extend(absorbed.uses.iter().copied());
        survivor.owns.extend(absorbed.owns.iter().copied());
        if survivor.stable_path().is_none() {
            survivor.path = absorbed.stable_path().cloned();
        }
        if !survivor.position.has_column() {
            survivor.position = absorbed.position.clone();
        }
        if survivor.named_type.is_none() {
            survivor.named_type = absorbed.named_type;
        }
        keep
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge a sequence of partial graphs into a fresh canonical graph.
pub fn build_graph<'a>(partials: impl IntoIterator<Item = &'a PartialGraph>) -> Result<UseGraph> {
    let mut builder = GraphBuilder::new();
    for partial in partials {
        builder.merge(partial)?;
    }
    Ok(builder.finish())
}
