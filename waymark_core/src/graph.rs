// Proximity graph over placed markers.
//
// The proximity graph is a set of `Node`s (indexed positions) where each node
// carries an out-list of its k nearest other nodes by Euclidean distance. It
// is built from scratch by `build_proximity_graph()` and searched by
// `pathfinding.rs`.
//
// Adjacency lists are computed independently per node and are NOT
// symmetrized: A may list B while B's k nearest exclude A. Routing treats the
// lists as directed out-edges, so this asymmetry is harmless.
//
// All storage uses `Vec` indexed by `NodeId` for O(1) lookup and
// deterministic iteration order. No `HashMap`.
//
// See also: `pathfinding.rs` for Dijkstra over this graph, `build_job.rs`
// for running the builder on a worker thread, `session.rs` which owns the
// current graph behind an `Arc`.
//
// **Critical constraint: determinism.** Node ids follow input order, and each
// neighbor list is sorted with a stable sort over candidates visited in id
// order, so equal distances keep the lower id first. Per-node work runs in
// parallel, but results are collected in node order.

use crate::types::{NodeId, Point};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info};

/// Inline capacity for neighbor lists. Covers the default k = 5 and typical
/// overrides without spilling to the heap.
pub const INLINE_NEIGHBORS: usize = 8;

/// Out-list of neighbor ids for one node, nearest first.
pub type NeighborList = SmallVec<[NodeId; INLINE_NEIGHBORS]>;

/// A node in the proximity graph: one placed point with its dense id.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub position: Point,
}

impl Node {
    pub fn distance(&self, other: &Node) -> f32 {
        self.position.distance(other.position)
    }
}

/// A k-nearest-neighbor graph over a fixed set of points.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProximityGraph {
    pub nodes: Vec<Node>,
    /// `adjacency[id]` holds the out-neighbors of node `id`, nearest first.
    pub adjacency: Vec<NeighborList>,
    /// The neighbor count requested at build time.
    pub k: usize,
}

impl ProximityGraph {
    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a node by ID.
    ///
    /// # Panics
    ///
    /// If `id` is not a node of this graph.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Get the out-neighbors of a node, nearest first.
    ///
    /// # Panics
    ///
    /// If `id` is not a node of this graph.
    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        &self.adjacency[id.index()]
    }

    /// Edge weight between two nodes, recomputed from their positions.
    ///
    /// # Panics
    ///
    /// If either id is not a node of this graph.
    pub fn edge_length(&self, from: NodeId, to: NodeId) -> f32 {
        self.node(from).distance(self.node(to))
    }

    /// Whether `to` appears in `from`'s out-list. Panics if `from` is not a
    /// node of this graph.
    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.neighbors(from).contains(&to)
    }

    /// The first node (lowest id) sitting exactly at `position`.
    ///
    /// Exact `f32` equality on all three components. Coincident nodes are
    /// legal; the earliest one wins.
    pub fn find_node_at(&self, position: Point) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.position == position)
            .map(|n| n.id)
    }

    /// Total number of directed edges across all out-lists.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(|a| a.len()).sum()
    }
}

/// Build a proximity graph connecting each point to its `k` nearest others.
///
/// Ids are assigned in input order. Each node's list holds
/// `min(k, n - 1)` neighbors sorted by ascending distance, ties broken by
/// lower id. An empty input yields an empty graph, which callers treat as
/// "no route possible".
///
/// Cost is O(n² log n). Point counts are human-paced, so that is fine for
/// the interactive case; see `build_job.rs` to keep it off the caller's
/// thread anyway.
pub fn build_proximity_graph(points: &[Point], k: usize) -> ProximityGraph {
    let nodes: Vec<Node> = points
        .iter()
        .enumerate()
        .map(|(i, &position)| Node {
            id: NodeId(i as u32),
            position,
        })
        .collect();

    if nodes.is_empty() {
        info!("proximity graph requested with no points");
        return ProximityGraph {
            nodes,
            adjacency: Vec::new(),
            k,
        };
    }

    let adjacency: Vec<NeighborList> = nodes
        .par_iter()
        .map(|node| nearest_neighbors(node, &nodes, k))
        .collect();

    let graph = ProximityGraph { nodes, adjacency, k };
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        k,
        "proximity graph built"
    );
    graph
}

/// The `k` nodes nearest to `node`, excluding itself.
fn nearest_neighbors(node: &Node, nodes: &[Node], k: usize) -> NeighborList {
    let mut candidates: Vec<(NodeId, f32)> = nodes
        .iter()
        .filter(|other| other.id != node.id)
        .map(|other| (other.id, node.distance(other)))
        .collect();

    // Stable: equal distances keep id order.
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

    candidates.into_iter().take(k).map(|(id, _)| id).collect()
}
