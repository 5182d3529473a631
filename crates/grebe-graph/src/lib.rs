#![forbid(unsafe_code)]

//! Arena-backed directed multigraph.
//!
//! Nodes and edges live in flat arenas and are addressed by `Copy` index
//! newtypes. Iteration order is insertion order everywhere, so algorithms
//! built on top (ranking, force layout) are deterministic by construction.

pub mod alg;

use serde::{Deserialize, Serialize};

/// Index of a node in a [`Digraph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of an edge in a [`Digraph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(usize);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct NodeSlot<N> {
    label: N,
    out: Vec<EdgeId>,
    ins: Vec<EdgeId>,
}

#[derive(Debug, Clone)]
struct EdgeSlot<E> {
    tail: NodeId,
    head: NodeId,
    label: E,
}

/// A directed multigraph with generic node (`N`), edge (`E`), and graph-level
/// (`G`) labels.
///
/// There is no removal API: the layout engines only ever add, and stable ids
/// keep external bookkeeping (rank arrays, displacement buffers) index-based.
#[derive(Debug, Clone)]
pub struct Digraph<N, E, G> {
    label: G,
    nodes: Vec<NodeSlot<N>>,
    edges: Vec<EdgeSlot<E>>,
}

impl<N, E, G: Default> Default for Digraph<N, E, G> {
    fn default() -> Self {
        Self::new(G::default())
    }
}

impl<N, E, G> Digraph<N, E, G> {
    pub fn new(label: G) -> Self {
        Self {
            label,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn graph(&self) -> &G {
        &self.label
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.label
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn add_node(&mut self, label: N) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeSlot {
            label,
            out: Vec::new(),
            ins: Vec::new(),
        });
        id
    }

    /// Adds a directed edge `tail -> head`.
    ///
    /// Panics if either endpoint is not a node of this graph; that is a caller
    /// bug, not input data.
    pub fn add_edge(&mut self, tail: NodeId, head: NodeId, label: E) -> EdgeId {
        assert!(
            tail.0 < self.nodes.len() && head.0 < self.nodes.len(),
            "edge endpoint out of range: {} -> {} (nodes: {})",
            tail.0,
            head.0,
            self.nodes.len()
        );
        let id = EdgeId(self.edges.len());
        self.edges.push(EdgeSlot { tail, head, label });
        self.nodes[tail.0].out.push(id);
        self.nodes[head.0].ins.push(id);
        id
    }

    pub fn node(&self, n: NodeId) -> &N {
        &self.nodes[n.0].label
    }

    pub fn node_mut(&mut self, n: NodeId) -> &mut N {
        &mut self.nodes[n.0].label
    }

    pub fn edge(&self, e: EdgeId) -> &E {
        &self.edges[e.0].label
    }

    pub fn edge_mut(&mut self, e: EdgeId) -> &mut E {
        &mut self.edges[e.0].label
    }

    pub fn tail(&self, e: EdgeId) -> NodeId {
        self.edges[e.0].tail
    }

    pub fn head(&self, e: EdgeId) -> NodeId {
        self.edges[e.0].head
    }

    pub fn endpoints(&self, e: EdgeId) -> (NodeId, NodeId) {
        let slot = &self.edges[e.0];
        (slot.tail, slot.head)
    }

    /// Out-edges of `n` in insertion order.
    pub fn out_edges(&self, n: NodeId) -> &[EdgeId] {
        &self.nodes[n.0].out
    }

    /// In-edges of `n` in insertion order.
    pub fn in_edges(&self, n: NodeId) -> &[EdgeId] {
        &self.nodes[n.0].ins
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edges.len()).map(EdgeId)
    }
}
