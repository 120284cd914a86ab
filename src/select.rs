//! Target-driven reachability over the canonical use graph.
//!
//! Starting from the requested declarations, walk `uses` edges and decide
//! for every referenced declaration whether it must be copied bodily or can
//! stay an external reference:
//!
//! - an exported declaration that was not itself requested is a boundary:
//!   the extracted code keeps pointing at it and the walk stops there;
//! - anything else is copied, together with every method of its named type.
//!   Any method might be needed to satisfy an interface somewhere we cannot
//!   see, so all of them come along.

use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::config::ExciseConfig;
use crate::error::{ExciseError, Result};
use crate::graph::{NodeId, NodeKind, Position, UseGraph};

/// The non-empty set of declaration names requested for extraction.
///
/// Names match exactly and case-sensitively against unqualified
/// declaration names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSet {
    names: BTreeSet<String>,
}

impl TargetSet {
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for name in names {
            let name = name.into();
            if name.is_empty() {
                return Err(ExciseError::EmptyTargetName);
            }
            set.insert(name);
        }
        if set.is_empty() {
            return Err(ExciseError::EmptyTargets);
        }
        Ok(Self { names: set })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromStr for TargetSet {
    type Err = ExciseError;

    /// Parse a comma-separated list, e.g. `Reader,newReader`.
    fn from_str(s: &str) -> Result<Self> {
        Self::new(s.split(','))
    }
}

impl fmt::Display for TargetSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().collect();
        write!(f, "{}", names.join(","))
    }
}

/// The declarations to copy, and what the walk learned on the way.
///
/// Serialized as a report only: `wanted` is derived from the graph and
/// not part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    /// Declarations to include bodily.
    pub seen: BTreeSet<NodeId>,
    /// Declarations referenced from `seen` but left behind the visibility
    /// boundary; the output refers to them instead of copying them.
    pub external: BTreeSet<NodeId>,
    /// Targets that matched at least one declaration.
    pub resolved_targets: BTreeSet<String>,
    /// Targets that matched nothing.
    pub unresolved_targets: BTreeSet<String>,
    /// Positions of everything in `seen`.
    #[serde(skip)]
    wanted: HashSet<Position>,
}

impl Selection {
    pub fn contains(&self, id: NodeId) -> bool {
        self.seen.contains(&id)
    }

    /// Whether the declaration at `pos` is to be kept.
    pub fn wants_position(&self, pos: &Position) -> bool {
        self.wanted.contains(pos)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Compute the set of declarations that must be copied for `targets`.
///
/// A target that names no declaration contributes nothing; see
/// [`select_with_config`] for the opt-in diagnostics.
pub fn select(graph: &UseGraph, targets: &TargetSet) -> Selection {
    let mut selection = Selection::default();
    let mut visited = vec![false; graph.len()];
    let mut stack: Vec<NodeId> = Vec::new();

    for name in targets.iter() {
        let seeds = graph.nodes_named(name);
        if seeds.is_empty() {
            selection.unresolved_targets.insert(name.to_string());
        } else {
            selection.resolved_targets.insert(name.to_string());
        }
        stack.extend(seeds.iter());
    }
    // Pop seeds in graph order.
    stack.sort_unstable_by(|a, b| b.cmp(a));
    stack.dedup();

    while let Some(id) = stack.pop() {
        let Some(node) = graph.node(id) else {
            continue;
        };
        if visited[id.index()] {
            continue;
        }
        visited[id.index()] = true;
        selection.seen.insert(id);

        // Pushed in reverse so the walk visits them in declaration order.
        let mut next: Vec<NodeId> = graph.method_nodes(id);
        for &u in &node.uses {
            let Some(used) = graph.node(u) else {
                continue;
            };
            if used.kind == NodeKind::Root {
                continue;
            }
            if used.exported && !targets.contains(&used.name) {
                selection.external.insert(u);
                continue;
            }
            next.push(u);
        }
        stack.extend(next.into_iter().rev().filter(|n| !visited[n.index()]));
    }

    // A declaration reached both ways is copied, not referenced.
    let seen = &selection.seen;
    selection.external.retain(|id| !seen.contains(id));
    selection.wanted = selection
        .seen
        .iter()
        .filter_map(|&id| graph.node(id))
        .map(|n| n.position.clone())
        .collect();

    debug!(
        targets = targets.len(),
        unresolved = selection.unresolved_targets.len(),
        seen = selection.seen.len(),
        external = selection.external.len(),
        "selection complete"
    );
    selection
}

/// [`select`], plus the diagnostics enabled in `config`.
pub fn select_with_config(
    graph: &UseGraph,
    targets: &TargetSet,
    config: &ExciseConfig,
) -> Result<Selection> {
    let selection = select(graph, targets);
    if config.report_unresolved_targets {
        for name in &selection.unresolved_targets {
            warn!(target_name = %name, "target matched no declaration");
        }
    }
    if config.require_resolved_targets && selection.resolved_targets.is_empty() {
        return Err(ExciseError::NoTargetsResolved {
            targets: targets.to_string(),
        });
    }
    Ok(selection)
}
