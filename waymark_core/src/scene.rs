// Outbound scene description for the rendering collaborator.
//
// A `SceneSnapshot` is everything a renderer needs to redraw: plain markers
// keyed by id, waypoint markers keyed by slot, and the active path both as
// node ids and as resolved positions. The session emits a fresh snapshot on
// every change that affects the display; the renderer is never queried.
//
// Marker ids are marker insertion indices. Markers come first in the build
// input, so the first `graph_markers` node ids of a graph are the ids of the
// markers it was built from. Nodes past that are appended waypoints, and
// markers placed after the build have no node at all.
//
// See also: `session.rs` which captures snapshots, `event.rs` for
// `SessionEventKind::SceneChanged` which carries them.

use crate::graph::ProximityGraph;
use crate::types::{NodeId, Point, WaypointSlot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// What the renderer should currently show.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// Plain markers to draw. Hidden markers are omitted unless they lie on
    /// the active path.
    pub markers: BTreeMap<NodeId, Point>,
    /// Start / destination markers.
    pub waypoints: BTreeMap<WaypointSlot, Point>,
    /// Node ids of the active segment, source first. Empty if none.
    pub active_path: Vec<NodeId>,
    /// Positions of `active_path`, in the same order.
    pub path_points: Vec<Point>,
    /// Marker ids on the active path, for highlight colouring.
    pub path_markers: BTreeSet<NodeId>,
}

impl SceneSnapshot {
    /// Assemble a snapshot from session state.
    ///
    /// `graph` resolves `active_path` ids to positions; ids the graph does not
    /// know are dropped from `path_points`. `graph_markers` is the number of
    /// markers `graph` was built from.
    pub fn capture(
        markers: &[Point],
        waypoints: &BTreeMap<WaypointSlot, Point>,
        graph: Option<&ProximityGraph>,
        graph_markers: usize,
        active_path: &[NodeId],
        markers_hidden: bool,
    ) -> Self {
        let marker_nodes = graph_markers.min(markers.len());
        let path_markers: BTreeSet<NodeId> = active_path
            .iter()
            .copied()
            .filter(|id| id.index() < marker_nodes)
            .collect();

        let markers = markers
            .iter()
            .enumerate()
            .map(|(i, &point)| (NodeId(i as u32), point))
            .filter(|(id, _)| !markers_hidden || path_markers.contains(id))
            .collect();

        let path_points = match graph {
            Some(graph) => active_path
                .iter()
                .filter(|id| id.index() < graph.node_count())
                .map(|&id| graph.node(id).position)
                .collect(),
            None => Vec::new(),
        };

        Self {
            markers,
            waypoints: waypoints.clone(),
            active_path: active_path.to_vec(),
            path_points,
            path_markers,
        }
    }
}
