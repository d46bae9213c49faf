// Commands that mutate routing-session state.
//
// All external mutations of a `RouteSession` can be expressed as a
// `SessionCommand`. The capture/UI collaborator (or the scenario runner in
// `waymark_cli`) constructs commands; `RouteSession::apply()` in
// `session.rs` dispatches them and returns the resulting events.
//
// Current commands:
// - `AddPoint`: append a plain marker.
// - `SetWaypoint`: designate the start or a destination.
// - `ClearWaypoints`: reset waypoints, segments and graph; keep markers.
// - `ClearAll`: as above, and drop the markers too.
// - `BuildGraph`: rebuild the proximity graph from scratch.
// - `ComputeRoute`: route through the set waypoints on the current graph.
// - `AdvanceSegment`: show the next segment, or clear after the last.
// - `SetMarkersHidden`: toggle plain-marker visibility.
//
// See also: `session.rs` for the handlers, `event.rs` for what they emit.

use crate::types::{Point, WaypointSlot};
use serde::{Deserialize, Serialize};

/// A single session action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SessionCommand {
    /// Place a plain marker at `point`.
    AddPoint { point: Point },
    /// Assign `point` to `slot`, replacing any previous assignment.
    SetWaypoint { slot: WaypointSlot, point: Point },
    ClearWaypoints,
    ClearAll,
    /// Build a graph over the markers (plus waypoints, if configured).
    /// Runs on a worker thread when `background_build` is configured.
    BuildGraph,
    ComputeRoute,
    AdvanceSegment,
    SetMarkersHidden { hidden: bool },
}
