// waymark_core: spatial routing engine for placed 3D markers.
//
// This crate turns an unordered set of user-placed 3D points into a k-nearest
// proximity graph and computes shortest routes between designated waypoints
// (start → end1 → end2). It has no camera, rendering or UI dependencies: the
// capture side feeds it points and commands, and the rendering side consumes
// the events and scene snapshots it emits.
//
// Module overview:
// - `types.rs`:       Point, NodeId, WaypointSlot.
// - `graph.rs`:       ProximityGraph + k-nearest-neighbor construction.
// - `build_job.rs`:   Graph builds on a worker thread, handed back via `Arc`.
// - `pathfinding.rs`: Dijkstra over the proximity graph.
// - `router.rs`:      Waypoint resolution, per-pair routing, SegmentPlan.
// - `session.rs`:     RouteSession: the owned session context and phase machine.
// - `command.rs`:     SessionCommand: all session mutations.
// - `event.rs`:       SessionEvent / RouteNotice: all session output.
// - `scene.rs`:       SceneSnapshot: what the renderer should draw.
// - `config.rs`:      RouterConfig: tunable parameters, loaded from JSON.
// - `error.rs`:       WaymarkError for config, I/O and worker failures.
//
// The companion crate `waymark_cli` replays JSON scenarios against a
// `RouteSession` and prints the events.
//
// **Critical constraint: determinism.** Graph construction and routing are
// pure functions of their inputs. No randomness, no `HashMap` iteration, no
// system time. Equal-distance ties always resolve toward the lower node id.

pub mod build_job;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod graph;
pub mod pathfinding;
pub mod router;
pub mod scene;
pub mod session;
pub mod types;

pub use error::{Result, WaymarkError};
pub use graph::build_proximity_graph;
pub use router::route;
pub use session::RouteSession;
