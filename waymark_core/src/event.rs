// Session events: everything the routing session reports to the outside.
//
// Every mutation of a `RouteSession` emits zero or more `SessionEvent`s,
// numbered by a per-session sequence counter. Two kinds of output share this
// stream:
// - State-change events (`MarkerAdded`, `GraphPublished`, `RouteComputed`,
//   ...) and `SceneChanged`, which carries a full `SceneSnapshot` for the
//   renderer.
// - `Notice` events carrying a `RouteNotice`: informational signals that
//   explain why an expected graph or path came back empty. They are for
//   logging/UX, never for control flow.
//
// See also: `session.rs` which emits these, `scene.rs` for `SceneSnapshot`,
// `command.rs` for the inbound side.
//
// **Critical constraint: determinism.** Sequence numbers are assigned in
// emission order; identical command streams yield identical event streams.

use crate::scene::SceneSnapshot;
use crate::types::{NodeId, Point, WaypointSlot};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An event emitted by the session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    /// Monotonic per-session counter, starting at 0.
    pub sequence: u64,
    pub kind: SessionEventKind,
}

/// Types of session events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SessionEventKind {
    /// A marker was placed. `id` is its insertion index.
    MarkerAdded { id: NodeId, point: Point },
    /// A waypoint slot was (re)assigned.
    WaypointSet { slot: WaypointSlot, point: Point },
    /// A background build was started over this many points.
    GraphBuildStarted { points: usize },
    /// A new graph replaced the session's current graph.
    GraphPublished { nodes: usize, edges: usize },
    /// Segments were computed. `found` of them have a non-empty path.
    RouteComputed { segments: usize, found: usize },
    /// The segment at `index` is now the active one.
    SegmentActivated { index: usize },
    /// All computed segments were discarded.
    SegmentsCleared,
    /// Waypoints (and with `markers: true`, markers too) were reset.
    Cleared { markers: bool },
    /// Marker visibility changed.
    MarkersHidden { hidden: bool },
    /// Informational routing outcome.
    Notice { notice: RouteNotice },
    /// The renderer should redraw from this snapshot.
    SceneChanged { scene: SceneSnapshot },
}

/// Why a graph or path came back empty, or why an action did nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteNotice {
    /// Build requested with zero points; the published graph is empty.
    EmptyInput,
    /// No node sits exactly at this waypoint's position.
    WaypointUnresolved { slot: WaypointSlot },
    /// Both waypoints resolved, but `to` is unreachable from `from`.
    NoPathFound { from: WaypointSlot, to: WaypointSlot },
    /// Advance requested with no segment pending.
    AdvanceWithNoActiveSegment,
    /// Route requested before any graph was built.
    NoGraph,
    /// Route requested with fewer than two waypoints set.
    InsufficientWaypoints { set: usize },
}

impl fmt::Display for RouteNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteNotice::EmptyInput => write!(f, "graph built from zero points"),
            RouteNotice::WaypointUnresolved { slot } => {
                write!(f, "{slot} waypoint does not match any graph node")
            }
            RouteNotice::NoPathFound { from, to } => {
                write!(f, "no path from {from} to {to}")
            }
            RouteNotice::AdvanceWithNoActiveSegment => write!(f, "no segment to advance"),
            RouteNotice::NoGraph => write!(f, "no graph built yet"),
            RouteNotice::InsufficientWaypoints { set } => {
                write!(f, "route needs at least two waypoints, {set} set")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_display_names_slots() {
        let notice = RouteNotice::NoPathFound {
            from: WaypointSlot::Start,
            to: WaypointSlot::End1,
        };
        assert_eq!(notice.to_string(), "no path from start to end1");
        assert_eq!(
            RouteNotice::WaypointUnresolved {
                slot: WaypointSlot::End2
            }
            .to_string(),
            "end2 waypoint does not match any graph node"
        );
    }

    #[test]
    fn event_json_uses_variant_names() {
        let event = SessionEvent {
            sequence: 4,
            kind: SessionEventKind::Notice {
                notice: RouteNotice::EmptyInput,
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"sequence":4,"kind":{"Notice":{"notice":"EmptyInput"}}}"#
        );
    }
}
