// Multi-waypoint routing over a built proximity graph.
//
// A route is an ordered list of waypoints (start, end1, optionally end2).
// `route()` resolves each waypoint to a graph node by exact position match,
// then runs one Dijkstra search per consecutive pair, producing one
// `SegmentOutcome` per pair. All segments are computed eagerly.
//
// `SegmentPlan` holds the computed outcomes plus which one is currently
// active for presentation. Advancing walks forward through the segments; the
// advance past the last one clears the plan.
//
// Failures are values, not errors: an unresolved waypoint or an unreachable
// target produces an empty path for that segment and leaves the other
// segments alone.
//
// See also: `pathfinding.rs` for the per-pair search, `session.rs` which owns
// the current `SegmentPlan` and turns outcomes into notices.

use crate::graph::ProximityGraph;
use crate::pathfinding::{self, PathResult};
use crate::types::{NodeId, Point};
use serde::{Deserialize, Serialize};

/// The outcome of routing one consecutive waypoint pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SegmentOutcome {
    /// Shortest path found.
    Found(PathResult),
    /// At least one endpoint has no node at its exact position.
    /// Indices refer to positions in the waypoint list passed to `route()`.
    WaypointUnresolved { unresolved: Vec<usize> },
    /// Both endpoints resolved, but the target is unreachable.
    NoPathFound { from: NodeId, to: NodeId },
}

impl SegmentOutcome {
    /// Node ids to display for this segment; empty unless a path was found.
    pub fn path(&self) -> &[NodeId] {
        match self {
            SegmentOutcome::Found(result) => &result.nodes,
            _ => &[],
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SegmentOutcome::Found(_))
    }
}

/// Resolve each waypoint to the first node at its exact position.
pub fn resolve_waypoints(graph: &ProximityGraph, waypoints: &[Point]) -> Vec<Option<NodeId>> {
    waypoints.iter().map(|&w| graph.find_node_at(w)).collect()
}

/// Route through `waypoints` in order, one outcome per consecutive pair.
///
/// Fewer than two waypoints produce no segments.
pub fn route(graph: &ProximityGraph, waypoints: &[Point]) -> Vec<SegmentOutcome> {
    let resolved = resolve_waypoints(graph, waypoints);

    resolved
        .windows(2)
        .enumerate()
        .map(|(i, pair)| match (pair[0], pair[1]) {
            (Some(from), Some(to)) => match pathfinding::shortest_path(graph, from, to) {
                Some(result) => SegmentOutcome::Found(result),
                None => SegmentOutcome::NoPathFound { from, to },
            },
            (from, to) => {
                let mut unresolved = Vec::new();
                if from.is_none() {
                    unresolved.push(i);
                }
                if to.is_none() {
                    unresolved.push(i + 1);
                }
                SegmentOutcome::WaypointUnresolved { unresolved }
            }
        })
        .collect()
}

/// Computed segments and the one currently shown.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentPlan {
    segments: Vec<SegmentOutcome>,
    active: usize,
}

/// What an `advance()` call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// The next segment is now active.
    Moved { active: usize },
    /// The last segment was consumed; the plan is now empty.
    Cleared,
    /// Nothing was pending.
    NothingPending,
}

impl SegmentPlan {
    pub fn new(segments: Vec<SegmentOutcome>) -> Self {
        Self {
            segments,
            active: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[SegmentOutcome] {
        &self.segments
    }

    /// Index of the active segment, if any.
    pub fn active_index(&self) -> Option<usize> {
        (self.active < self.segments.len()).then_some(self.active)
    }

    pub fn active(&self) -> Option<&SegmentOutcome> {
        self.segments.get(self.active)
    }

    /// Node ids of the active segment (empty if none or if it failed).
    pub fn active_path(&self) -> &[NodeId] {
        match self.active() {
            Some(segment) => segment.path(),
            None => &[],
        }
    }

    /// Move to the next segment, or clear the plan after the last one.
    pub fn advance(&mut self) -> Advance {
        if self.segments.is_empty() {
            return Advance::NothingPending;
        }
        if self.active + 1 < self.segments.len() {
            self.active += 1;
            Advance::Moved {
                active: self.active,
            }
        } else {
            self.clear();
            Advance::Cleared
        }
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.active = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_proximity_graph;

    fn p(x: f32, y: f32, z: f32) -> Point {
        Point::new(x, y, z)
    }

    fn line_graph() -> ProximityGraph {
        let points = [
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(2.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(5.0, 5.0, 0.0),
        ];
        build_proximity_graph(&points, 2)
    }

    #[test]
    fn single_pair_route() {
        let graph = line_graph();
        let outcomes = route(&graph, &[p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0)]);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].path(), &[NodeId(0), NodeId(1), NodeId(2)]);
    }

    #[test]
    fn two_segments_chain_through_middle_waypoint() {
        let graph = line_graph();
        let outcomes = route(
            &graph,
            &[p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(0.0, 1.0, 0.0)],
        );
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].path().last(), Some(&NodeId(2)));
        assert_eq!(outcomes[1].path().first(), Some(&NodeId(2)));
        assert_eq!(outcomes[1].path().last(), Some(&NodeId(3)));
    }

    #[test]
    fn unresolved_waypoint_only_affects_its_segments() {
        let graph = line_graph();
        let outcomes = route(
            &graph,
            &[p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(9.0, 9.0, 9.0)],
        );
        assert!(outcomes[0].is_found());
        assert_eq!(
            outcomes[1],
            SegmentOutcome::WaypointUnresolved {
                unresolved: vec![2]
            }
        );
        assert!(outcomes[1].path().is_empty());
    }

    #[test]
    fn unresolved_middle_waypoint_fails_both_segments() {
        let graph = line_graph();
        let outcomes = route(
            &graph,
            &[p(0.0, 0.0, 0.0), p(7.0, 0.0, 0.0), p(2.0, 0.0, 0.0)],
        );
        assert_eq!(
            outcomes,
            vec![
                SegmentOutcome::WaypointUnresolved {
                    unresolved: vec![1]
                },
                SegmentOutcome::WaypointUnresolved {
                    unresolved: vec![1]
                },
            ]
        );
    }

    #[test]
    fn single_point_unmatched_waypoint() {
        let graph = build_proximity_graph(&[p(1.0, 1.0, 1.0)], 5);
        let outcomes = route(&graph, &[p(1.0, 1.0, 1.0), p(2.0, 2.0, 2.0)]);
        assert_eq!(
            outcomes,
            vec![SegmentOutcome::WaypointUnresolved {
                unresolved: vec![1]
            }]
        );
    }

    #[test]
    fn degenerate_pair_is_single_node_path() {
        let graph = line_graph();
        let outcomes = route(&graph, &[p(1.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]);
        assert_eq!(outcomes[0].path(), &[NodeId(1)]);
    }

    #[test]
    fn fewer_than_two_waypoints_route_nothing() {
        let graph = line_graph();
        assert!(route(&graph, &[]).is_empty());
        assert!(route(&graph, &[p(0.0, 0.0, 0.0)]).is_empty());
    }

    #[test]
    fn empty_graph_leaves_all_waypoints_unresolved() {
        let graph = ProximityGraph::default();
        let outcomes = route(&graph, &[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]);
        assert_eq!(
            outcomes,
            vec![SegmentOutcome::WaypointUnresolved {
                unresolved: vec![0, 1]
            }]
        );
    }

    #[test]
    fn plan_advances_then_clears() {
        let graph = line_graph();
        let mut plan = SegmentPlan::new(route(
            &graph,
            &[p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(0.0, 1.0, 0.0)],
        ));
        assert_eq!(plan.active_index(), Some(0));
        assert_eq!(plan.active_path().last(), Some(&NodeId(2)));

        assert_eq!(plan.advance(), Advance::Moved { active: 1 });
        assert_eq!(plan.active_path().last(), Some(&NodeId(3)));

        assert_eq!(plan.advance(), Advance::Cleared);
        assert!(plan.is_empty());
        assert!(plan.active_path().is_empty());

        assert_eq!(plan.advance(), Advance::NothingPending);
    }

    #[test]
    fn single_segment_plan_clears_on_first_advance() {
        let graph = line_graph();
        let mut plan = SegmentPlan::new(route(&graph, &[p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0)]));
        assert_eq!(plan.advance(), Advance::Cleared);
        assert_eq!(plan.active_index(), None);
    }
}
