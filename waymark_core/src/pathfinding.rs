// Dijkstra shortest-path search over the proximity graph.
//
// Implements single-source, single-target Dijkstra using a `BinaryHeap`
// (min-heap via reversed ordering). Tentative distances and predecessor data
// are stored in `Vec`s indexed by `NodeId` for O(1) access and deterministic
// behavior (no `HashMap`).
//
// Edge weights are never cached: each relaxation recomputes the Euclidean
// distance between the two endpoint positions. Weights are therefore always
// >= 0, which is what Dijkstra needs.
//
// See also: `graph.rs` for the `ProximityGraph` being searched, `router.rs`
// which runs one search per consecutive waypoint pair.
//
// **Critical constraint: determinism.** When several frontier entries share
// the minimal tentative distance, the lower node id is popped first. Ordering
// uses `total_cmp`, so repeated runs on the same graph return the same path.

use crate::graph::ProximityGraph;
use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// The result of a successful search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    /// Sequence of node IDs from source to target (inclusive).
    pub nodes: Vec<NodeId>,
    /// Sum of Euclidean hop lengths along `nodes`.
    pub length: f32,
}

impl PathResult {
    /// Number of edges traversed.
    pub fn hop_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

/// Entry in the Dijkstra frontier (min-heap via reversed ordering).
struct FrontierEntry {
    node: NodeId,
    distance: f32,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.distance.total_cmp(&other.distance) == Ordering::Equal && self.node == other.node
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap: smallest distance, then smallest id, is "greatest".
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Find the shortest path from `source` to `target`.
///
/// Returns `None` if `target` is unreachable from `source` (or either id is
/// out of range). `source == target` yields the single-node path with
/// length 0. The search stops as soon as `target` leaves the frontier;
/// distances to nodes beyond it are not finalized.
pub fn shortest_path(graph: &ProximityGraph, source: NodeId, target: NodeId) -> Option<PathResult> {
    let n = graph.node_count();
    if source.index() >= n || target.index() >= n {
        return None;
    }
    if source == target {
        return Some(PathResult {
            nodes: vec![source],
            length: 0.0,
        });
    }

    // distance[node] = cost of cheapest known path from source to node.
    let mut distance = vec![f32::INFINITY; n];
    let mut previous: Vec<Option<NodeId>> = vec![None; n];
    let mut settled = vec![false; n];

    distance[source.index()] = 0.0;

    let mut frontier = BinaryHeap::new();
    frontier.push(FrontierEntry {
        node: source,
        distance: 0.0,
    });

    while let Some(current) = frontier.pop() {
        let ci = current.node.index();

        if settled[ci] {
            continue;
        }
        settled[ci] = true;

        if current.node == target {
            return Some(reconstruct_path(&previous, source, target, distance[ci]));
        }

        let current_distance = distance[ci];

        for &neighbor in graph.neighbors(current.node) {
            let ni = neighbor.index();
            if settled[ni] {
                continue;
            }

            let tentative = current_distance + graph.edge_length(current.node, neighbor);
            if tentative < distance[ni] {
                distance[ni] = tentative;
                previous[ni] = Some(current.node);
                frontier.push(FrontierEntry {
                    node: neighbor,
                    distance: tentative,
                });
            }
        }
    }

    None // Target unreachable.
}

/// Walk predecessor links from `target` back to `source`.
fn reconstruct_path(
    previous: &[Option<NodeId>],
    source: NodeId,
    target: NodeId,
    length: f32,
) -> PathResult {
    let mut nodes = vec![target];
    let mut current = target;

    while current != source {
        match previous[current.index()] {
            Some(prev) => {
                nodes.push(prev);
                current = prev;
            }
            // Only reachable nodes are reconstructed, so the chain always ends
            // at `source`.
            None => break,
        }
    }

    nodes.reverse();
    PathResult { nodes, length }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_proximity_graph;
    use crate::types::Point;

    fn p(x: f32, y: f32, z: f32) -> Point {
        Point::new(x, y, z)
    }

    fn assert_valid_path(graph: &ProximityGraph, path: &PathResult, from: NodeId, to: NodeId) {
        assert_eq!(path.nodes.first(), Some(&from));
        assert_eq!(path.nodes.last(), Some(&to));
        for hop in path.nodes.windows(2) {
            assert!(
                graph.has_edge(hop[0], hop[1]),
                "hop {} -> {} is not a graph edge",
                hop[0],
                hop[1]
            );
        }
    }

    #[test]
    fn trivial_path() {
        let graph = build_proximity_graph(&[p(0.0, 0.0, 0.0)], 5);
        let path = shortest_path(&graph, NodeId(0), NodeId(0)).unwrap();
        assert_eq!(path.nodes, vec![NodeId(0)]);
        assert_eq!(path.length, 0.0);
        assert_eq!(path.hop_count(), 0);
    }

    #[test]
    fn simple_chain() {
        let points = [
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(2.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(5.0, 5.0, 0.0),
        ];
        let graph = build_proximity_graph(&points, 2);
        let path = shortest_path(&graph, NodeId(0), NodeId(2)).unwrap();
        assert_eq!(path.nodes, vec![NodeId(0), NodeId(1), NodeId(2)]);
        assert_eq!(path.length, 2.0);
        assert_valid_path(&graph, &path, NodeId(0), NodeId(2));
    }

    #[test]
    fn chooses_shorter_detour() {
        // Straight line with a kink: 0 -> 1 -> 2 -> 3 is shorter than any
        // route through the far node 4.
        let points = [
            p(0.0, 0.0, 0.0),
            p(1.0, 0.2, 0.0),
            p(2.0, 0.0, 0.0),
            p(3.0, 0.2, 0.0),
            p(1.5, 3.0, 0.0),
        ];
        let graph = build_proximity_graph(&points, 3);
        let path = shortest_path(&graph, NodeId(0), NodeId(3)).unwrap();
        assert!(!path.nodes.contains(&NodeId(4)));
        assert_valid_path(&graph, &path, NodeId(0), NodeId(3));
    }

    #[test]
    fn no_path_between_clusters() {
        let points = [
            p(0.0, 0.0, 0.0),
            p(0.1, 0.0, 0.0),
            p(0.0, 0.1, 0.0),
            p(100.0, 0.0, 0.0),
            p(100.1, 0.0, 0.0),
            p(100.0, 0.1, 0.0),
        ];
        let graph = build_proximity_graph(&points, 2);
        assert!(shortest_path(&graph, NodeId(0), NodeId(4)).is_none());
        // Unchanged graph, same answer.
        assert!(shortest_path(&graph, NodeId(0), NodeId(4)).is_none());
    }

    #[test]
    fn follows_out_edges_only() {
        // k = 1: node 2 lists 1, but nothing lists 2, so 2 is unreachable
        // from 0 even though it can reach 0.
        let points = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(5.0, 0.0, 0.0)];
        let graph = build_proximity_graph(&points, 1);
        assert!(shortest_path(&graph, NodeId(0), NodeId(2)).is_none());
        let back = shortest_path(&graph, NodeId(2), NodeId(0)).unwrap();
        assert_eq!(back.nodes, vec![NodeId(2), NodeId(1), NodeId(0)]);
    }

    #[test]
    fn out_of_range_ids_have_no_path() {
        let graph = build_proximity_graph(&[p(0.0, 0.0, 0.0)], 1);
        assert!(shortest_path(&graph, NodeId(0), NodeId(3)).is_none());
        assert!(shortest_path(&ProximityGraph::default(), NodeId(0), NodeId(0)).is_none());
    }

    #[test]
    fn equal_cost_routes_are_reproducible() {
        // Square: 0 -> 3 via 1 or via 2 costs the same.
        let points = [
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(1.0, 1.0, 0.0),
        ];
        let graph = build_proximity_graph(&points, 2);
        let first = shortest_path(&graph, NodeId(0), NodeId(3)).unwrap();
        for _ in 0..10 {
            assert_eq!(shortest_path(&graph, NodeId(0), NodeId(3)).unwrap(), first);
        }
        // Lower id wins the tie.
        assert_eq!(first.nodes, vec![NodeId(0), NodeId(1), NodeId(3)]);
    }

    #[test]
    fn paths_on_a_larger_grid_are_valid() {
        // 10 x 6 unit grid: every axis neighbor is among the 5 nearest, so
        // all targets are reachable.
        let points: Vec<Point> = (0..60)
            .map(|i| p((i % 10) as f32, (i / 10) as f32, 0.0))
            .collect();
        let graph = build_proximity_graph(&points, 5);
        for target in [7u32, 23, 41, 59] {
            let path = shortest_path(&graph, NodeId(0), NodeId(target)).unwrap();
            assert_valid_path(&graph, &path, NodeId(0), NodeId(target));
            let summed: f32 = path
                .nodes
                .windows(2)
                .map(|w| graph.edge_length(w[0], w[1]))
                .sum();
            assert!((summed - path.length).abs() < 1e-4);
        }
    }
}
