//! Partial graphs: the unit of input from the analysis front end.
//!
//! Each analysis pass over a package (or over one of its dependencies)
//! produces a partial graph numbered with its own local ids, with its own
//! root at local id 0. The merger folds these into one canonical graph.

use serde::{Deserialize, Serialize};

use super::types::{Identity, Node, NodeId};
use crate::error::{ExciseError, Result};
use crate::implements::{implements, Implementor};
use crate::typemodel::{Interface, MethodSet};

/// An ordered batch of nodes; a node's local id is its index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialGraph {
    pub nodes: Vec<Node>,
}

impl PartialGraph {
    /// Start a batch with the given local root.
    pub fn new(mut root: Node) -> Self {
        root.id = NodeId::ROOT;
        Self { nodes: vec![root] }
    }

    /// Append a node, assigning it the next local id.
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        node.id = id;
        self.nodes.push(node);
        id
    }

    /// Record that `from`'s definition references `to`.
    pub fn add_use(&mut self, from: NodeId, to: NodeId) {
        if let Some(node) = self.nodes.get_mut(from.index()) {
            node.uses.push(to);
        }
    }

    /// Record that `owner` contains `member`.
    pub fn add_owns(&mut self, owner: NodeId, member: NodeId) {
        if let Some(node) = self.nodes.get_mut(owner.index()) {
            node.owns.push(member);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find the local node declared under `identity`.
    pub fn node_by_identity(&self, identity: &Identity) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.identities().any(|id| &id == identity))
            .map(|n| n.id)
    }

    /// Record an interface-typed reference from `from` to a value whose
    /// concrete type has `concrete` as its method set.
    ///
    /// When the concrete type satisfies `iface`, every concrete method bound
    /// to an interface method becomes used by `from`. Returns whether the
    /// interface was satisfied.
    pub fn link_implementation(
        &mut self,
        from: NodeId,
        concrete: &MethodSet,
        iface: &Interface,
    ) -> bool {
        let Some(bindings) = implements(Implementor::Concrete(concrete), iface) else {
            return false;
        };
        let targets: Vec<NodeId> = bindings
            .iter()
            .filter_map(|b| b.method.identity.as_ref())
            .filter_map(|identity| self.node_by_identity(identity))
            .collect();
        for to in targets {
            self.add_use(from, to);
        }
        true
    }

    /// Check the batch is well formed: ids match slots and every edge
    /// stays inside the batch.
    pub fn validate(&self) -> Result<()> {
        let len = self.nodes.len();
        for (index, node) in self.nodes.iter().enumerate() {
            if node.id.index() != index {
                return Err(ExciseError::InvalidLocalId {
                    index,
                    id: node.id.0,
                });
            }
            for to in node.uses.iter().chain(&node.owns) {
                if to.index() >= len {
                    return Err(ExciseError::DanglingEdge {
                        from: node.id.0,
                        to: to.0,
                        len,
                    });
                }
            }
        }
        Ok(())
    }
}
