//! Dependency graph and resolver.
//!
//! Nodes are kept in a flat petgraph `DiGraph` keyed by `NodeId`, with an
//! edge `u -> v` for every "v depends on u". The execution order is a
//! topological sort that always picks the smallest ready id next, so the
//! same graph always yields the same order.

use crate::error::GraphError;
use crate::node::{Node, NodeId};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

/// Resolves the execution order of `nodes` from their dependency sets.
///
/// # Errors
///
/// Returns `DuplicateNode`, `DanglingDependency` or `CycleDetected` when the
/// graph cannot be ordered.
pub fn resolve(nodes: &[Node]) -> Result<Vec<NodeId>, GraphError> {
    WorkflowGraph::from_nodes(nodes)?.execution_order()
}

/// A validated dependency graph over node ids.
#[derive(Debug, Clone)]
pub struct WorkflowGraph {
    /// Edge `u -> v` means `v` depends on `u`.
    graph: DiGraph<NodeId, ()>,
    /// Ordered so iteration and error reporting are deterministic.
    index_map: BTreeMap<NodeId, NodeIndex>,
}

impl WorkflowGraph {
    /// Builds the graph from nodes and their dependency sets.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateNode` if two nodes share an id and
    /// `DanglingDependency` if a dependency names a missing node.
    pub fn from_nodes(nodes: &[Node]) -> Result<Self, GraphError> {
        let edges = nodes.iter().flat_map(|node| {
            node.dependencies
                .iter()
                .map(move |&dependency| (dependency, node.id))
        });
        Self::from_edges(nodes.iter().map(|node| node.id), edges)
    }

    /// Builds the graph from node ids and `(dependency, dependent)` edges.
    ///
    /// # Errors
    ///
    /// See [`from_nodes`](Self::from_nodes).
    pub fn from_edges(
        node_ids: impl IntoIterator<Item = NodeId>,
        edges: impl IntoIterator<Item = (NodeId, NodeId)>,
    ) -> Result<Self, GraphError> {
        let mut graph = DiGraph::new();
        let mut index_map = BTreeMap::new();

        for node_id in node_ids {
            if index_map.contains_key(&node_id) {
                return Err(GraphError::DuplicateNode { node_id });
            }
            index_map.insert(node_id, graph.add_node(node_id));
        }

        let mut edges: Vec<_> = edges.into_iter().collect();
        edges.sort_by_key(|&(dependency, dependent)| (dependent, dependency));

        for (dependency, dependent) in edges {
            let &target = index_map
                .get(&dependent)
                .ok_or(GraphError::NodeNotFound { node_id: dependent })?;
            let &source = index_map
                .get(&dependency)
                .ok_or(GraphError::DanglingDependency {
                    node_id: dependent,
                    dependency,
                })?;
            graph.update_edge(source, target, ());
        }

        Ok(Self { graph, index_map })
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns a topological order, smallest ready id first.
    ///
    /// # Errors
    ///
    /// Returns `CycleDetected` with every node that could not be ordered.
    pub fn execution_order(&self) -> Result<Vec<NodeId>, GraphError> {
        let mut in_degree: BTreeMap<NodeIndex, usize> = self
            .index_map
            .values()
            .map(|&index| {
                let degree = self
                    .graph
                    .neighbors_directed(index, Direction::Incoming)
                    .count();
                (index, degree)
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<(NodeId, NodeIndex)>> = in_degree
            .iter()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(&index, _)| Reverse((self.graph[index], index)))
            .collect();

        let mut order = Vec::with_capacity(self.node_count());
        while let Some(Reverse((node_id, index))) = ready.pop() {
            order.push(node_id);
            for dependent in self.graph.neighbors_directed(index, Direction::Outgoing) {
                if let Some(degree) = in_degree.get_mut(&dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(Reverse((self.graph[dependent], dependent)));
                    }
                }
            }
        }

        if order.len() < self.node_count() {
            let mut unresolved: Vec<NodeId> = in_degree
                .into_iter()
                .filter(|&(_, degree)| degree > 0)
                .map(|(index, _)| self.graph[index])
                .collect();
            unresolved.sort_unstable();
            return Err(GraphError::CycleDetected { unresolved });
        }

        Ok(order)
    }
}
