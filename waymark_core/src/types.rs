// Core types shared across the routing engine.
//
// Defines the spatial coordinate (`Point`), the dense node identifier
// (`NodeId`), and the waypoint slot enum. All types derive `Serialize` and
// `Deserialize` so commands and events can cross the CLI boundary as JSON.
//
// **Critical constraint: determinism.** `Point` equality is exact `f32`
// component equality. Nothing here rounds, snaps, or applies a tolerance;
// waypoint resolution in `router.rs` depends on that.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A position in physical space, as supplied by the capture collaborator.
///
/// Units are whatever the capture side uses (meters for AR world tracking).
/// There is no identity beyond the value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance between two points.
    ///
    /// Symmetric bit-for-bit: `a.distance(b) == b.distance(a)`, since each
    /// squared difference is sign-independent and the sum order is fixed.
    pub fn distance(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl From<[f32; 3]> for Point {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Dense 0-based index of a node within one built `ProximityGraph`.
///
/// Assigned in insertion order at build time. Ids are only meaningful for the
/// graph that produced them; a rebuild reassigns them.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Waypoints
// ---------------------------------------------------------------------------

/// Which role a designated waypoint plays in the route.
///
/// Ordering matters: a route visits occupied slots in `Start`, `End1`, `End2`
/// order, and `BTreeMap<WaypointSlot, _>` iterates the same way.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum WaypointSlot {
    Start,
    End1,
    End2,
}

impl WaypointSlot {
    /// All slots in route order.
    pub const ALL: [WaypointSlot; 3] = [WaypointSlot::Start, WaypointSlot::End1, WaypointSlot::End2];
}

impl fmt::Display for WaypointSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WaypointSlot::Start => "start",
            WaypointSlot::End1 => "end1",
            WaypointSlot::End2 => "end2",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric_and_non_negative() {
        let a = Point::new(0.3, -1.7, 2.25);
        let b = Point::new(-4.0, 0.125, 9.5);
        assert_eq!(a.distance(b), b.distance(a));
        assert!(a.distance(b) >= 0.0);
        assert_eq!(a.distance(a), 0.0);
    }

    #[test]
    fn distance_matches_pythagoras() {
        let a = Point::new(0.0, 0.0, 0.0);
        let b = Point::new(3.0, 4.0, 0.0);
        assert_eq!(a.distance(b), 5.0);
    }

    #[test]
    fn point_equality_is_exact() {
        let a = Point::new(1.0, 2.0, 3.0);
        assert_eq!(a, Point::from([1.0, 2.0, 3.0]));
        assert_ne!(a, Point::new(1.0, 2.0, 3.0 + f32::EPSILON * 4.0));
    }

    #[test]
    fn slot_order_is_route_order() {
        let mut slots = vec![WaypointSlot::End2, WaypointSlot::Start, WaypointSlot::End1];
        slots.sort();
        assert_eq!(slots, WaypointSlot::ALL.to_vec());
    }

    #[test]
    fn node_id_serializes_as_bare_integer() {
        let json = serde_json::to_string(&NodeId(7)).unwrap();
        assert_eq!(json, "7");
    }
}
