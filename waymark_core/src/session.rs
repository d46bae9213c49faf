// Routing session: the single owner of markers, waypoints, graph and route.
//
// `RouteSession` is an explicitly constructed context object. It owns:
// - the placed markers (append-only until cleared),
// - the waypoint slots (Start, End1, End2),
// - the current proximity graph, behind an `Arc`,
// - the computed `SegmentPlan` and which segment is active,
// - marker visibility,
// - at most one pending background build.
//
// ## Phases
//
//   Idle ──build──▶ Ready ──route──▶ Routed ──advance──▶ Advancing
//    ▲                ▲                 │                    │
//    │                └──── advance past the last segment ◀──┘
//    └──────────── ClearWaypoints / ClearAll (from any phase)
//
// `phase()` derives the phase from state rather than storing it, so it can
// never disagree with the graph slot or the plan.
//
// ## Graph publication
//
// Builds always run to completion against a snapshot of the inputs. The
// finished graph replaces `self.graph` in a single assignment: a reader
// holding the previous `Arc` keeps a complete old graph, and later readers
// see the complete new one. Publishing a graph discards any computed
// segments, because node ids from the old graph mean nothing in the new one.
//
// ## Re-routing
//
// Nothing is recomputed implicitly. Adding markers or moving waypoints leaves
// the current graph and segments untouched until the caller builds and/or
// routes again.
//
// See also: `command.rs` for `SessionCommand`, `event.rs` for the emitted
// events, `router.rs` for `route()` and `SegmentPlan`, `build_job.rs` for
// background builds, `config.rs` for `RouterConfig`.
//
// **Critical constraint: determinism.** Given the same config and the same
// command sequence, a session emits the same events and computes the same
// graph and routes.

use crate::build_job::GraphBuildJob;
use crate::command::SessionCommand;
use crate::config::RouterConfig;
use crate::error::Result;
use crate::event::{RouteNotice, SessionEvent, SessionEventKind};
use crate::graph::{self, ProximityGraph};
use crate::router::{self, Advance, SegmentOutcome, SegmentPlan};
use crate::scene::SceneSnapshot;
use crate::types::{NodeId, Point, WaypointSlot};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where the session is in the build → route → advance cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoutePhase {
    /// No graph.
    Idle,
    /// Graph built, no segments pending.
    Ready,
    /// Segments computed, the first one active.
    Routed,
    /// A later segment is active.
    Advancing,
}

/// The events produced by one `apply()` call.
#[derive(Clone, Debug, Default)]
pub struct StepResult {
    pub events: Vec<SessionEvent>,
}

impl StepResult {
    /// Notices among the events, in order.
    pub fn notices(&self) -> impl Iterator<Item = RouteNotice> + '_ {
        self.events.iter().filter_map(|e| match e.kind {
            SessionEventKind::Notice { notice } => Some(notice),
            _ => None,
        })
    }

    /// The last scene snapshot among the events, if any.
    pub fn last_scene(&self) -> Option<&SceneSnapshot> {
        self.events.iter().rev().find_map(|e| match &e.kind {
            SessionEventKind::SceneChanged { scene } => Some(scene),
            _ => None,
        })
    }
}

/// One interactive routing session.
pub struct RouteSession {
    config: RouterConfig,
    markers: Vec<Point>,
    waypoints: BTreeMap<WaypointSlot, Point>,
    graph: Option<Arc<ProximityGraph>>,
    /// How many of `graph`'s leading nodes are markers.
    graph_markers: usize,
    plan: SegmentPlan,
    markers_hidden: bool,
    /// Pending background build and the marker count it was started with.
    pending_build: Option<(GraphBuildJob, usize)>,
    next_sequence: u64,
    outbox: Vec<SessionEvent>,
}

impl Default for RouteSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteSession {
    /// Create a session with the default config.
    pub fn new() -> Self {
        Self::from_valid_config(RouterConfig::default())
    }

    /// Create a session with the given config, rejecting invalid parameters.
    pub fn with_config(config: RouterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: RouterConfig) -> Self {
        let markers_hidden = config.markers_hidden;
        Self {
            config,
            markers: Vec::new(),
            waypoints: BTreeMap::new(),
            graph: None,
            graph_markers: 0,
            plan: SegmentPlan::default(),
            markers_hidden,
            pending_build: None,
            next_sequence: 0,
            outbox: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn markers(&self) -> &[Point] {
        &self.markers
    }

    pub fn waypoint(&self, slot: WaypointSlot) -> Option<Point> {
        self.waypoints.get(&slot).copied()
    }

    /// Occupied waypoints in route order.
    pub fn waypoint_sequence(&self) -> Vec<(WaypointSlot, Point)> {
        self.waypoints.iter().map(|(&s, &p)| (s, p)).collect()
    }

    /// The published graph, if any. The returned `Arc` stays valid (and
    /// unchanged) even if a newer graph is published later.
    pub fn current_graph(&self) -> Option<Arc<ProximityGraph>> {
        self.graph.clone()
    }

    pub fn plan(&self) -> &SegmentPlan {
        &self.plan
    }

    /// Node ids of the active segment; empty if there is none.
    pub fn active_path(&self) -> &[NodeId] {
        self.plan.active_path()
    }

    pub fn markers_hidden(&self) -> bool {
        self.markers_hidden
    }

    pub fn is_build_pending(&self) -> bool {
        self.pending_build.is_some()
    }

    pub fn phase(&self) -> RoutePhase {
        match (&self.graph, self.plan.active_index()) {
            (None, _) => RoutePhase::Idle,
            (Some(_), None) => RoutePhase::Ready,
            (Some(_), Some(0)) => RoutePhase::Routed,
            (Some(_), Some(_)) => RoutePhase::Advancing,
        }
    }

    /// What the renderer should show right now.
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot::capture(
            &self.markers,
            &self.waypoints,
            self.graph.as_deref(),
            self.graph_markers,
            self.plan.active_path(),
            self.markers_hidden,
        )
    }

    /// The points a build would use right now: markers first, then the
    /// occupied waypoints in slot order if so configured.
    pub fn build_input(&self) -> Vec<Point> {
        let mut points = self.markers.clone();
        if self.config.include_waypoints_in_graph {
            points.extend(self.waypoints.values().copied());
        }
        points
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Apply one command and return the events it produced.
    pub fn apply(&mut self, command: &SessionCommand) -> StepResult {
        debug!(?command, "applying session command");
        match command {
            SessionCommand::AddPoint { point } => self.add_point(*point),
            SessionCommand::SetWaypoint { slot, point } => self.set_waypoint(*slot, *point),
            SessionCommand::ClearWaypoints => self.clear_waypoints(),
            SessionCommand::ClearAll => self.clear_all(),
            SessionCommand::BuildGraph => {
                if self.config.background_build {
                    if let Err(err) = self.start_background_build() {
                        warn!(%err, "background build unavailable, building inline");
                        self.build_graph();
                    }
                } else {
                    self.build_graph();
                }
            }
            SessionCommand::ComputeRoute => {
                self.compute_route();
            }
            SessionCommand::AdvanceSegment => {
                self.advance_segment();
            }
            SessionCommand::SetMarkersHidden { hidden } => self.set_markers_hidden(*hidden),
        }
        self.take_events()
    }

    /// Apply commands in order, collecting all events.
    pub fn apply_all<'a>(&mut self, commands: impl IntoIterator<Item = &'a SessionCommand>) -> StepResult {
        let mut events = Vec::new();
        for command in commands {
            events.extend(self.apply(command).events);
        }
        StepResult { events }
    }

    /// Drain events emitted by direct method calls since the last drain.
    pub fn take_events(&mut self) -> StepResult {
        StepResult {
            events: std::mem::take(&mut self.outbox),
        }
    }

    /// Place a plain marker.
    pub fn add_point(&mut self, point: Point) {
        let id = NodeId(self.markers.len() as u32);
        self.markers.push(point);
        self.emit(SessionEventKind::MarkerAdded { id, point });
        self.emit_scene();
    }

    /// Designate a waypoint. Does not rebuild or re-route.
    pub fn set_waypoint(&mut self, slot: WaypointSlot, point: Point) {
        self.waypoints.insert(slot, point);
        self.emit(SessionEventKind::WaypointSet { slot, point });
        self.emit_scene();
    }

    /// Reset waypoints, segments and graph. Markers stay.
    pub fn clear_waypoints(&mut self) {
        self.reset(false);
    }

    /// Reset everything, markers included.
    pub fn clear_all(&mut self) {
        self.reset(true);
    }

    fn reset(&mut self, markers: bool) {
        if markers {
            self.markers.clear();
        }
        self.waypoints.clear();
        self.plan.clear();
        self.graph = None;
        self.graph_markers = 0;
        // A pending build would publish a graph over the old inputs.
        self.pending_build = None;
        info!(markers, "session cleared");
        self.emit(SessionEventKind::Cleared { markers });
        self.emit_scene();
    }

    /// Build a graph synchronously on the calling thread and publish it.
    ///
    /// Supersedes any pending background build.
    pub fn build_graph(&mut self) -> Arc<ProximityGraph> {
        self.pending_build = None;
        let points = self.build_input();
        let graph = Arc::new(graph::build_proximity_graph(&points, self.config.neighbor_count));
        self.publish_graph(Arc::clone(&graph), self.markers.len());
        graph
    }

    /// Start a build on a worker thread. The current graph stays in place
    /// until `poll_background_build()` or `wait_for_background_build()`
    /// publishes the result. Starting another build replaces the pending one.
    pub fn start_background_build(&mut self) -> Result<()> {
        let points = self.build_input();
        let job = GraphBuildJob::spawn(points, self.config.neighbor_count)?;
        self.emit(SessionEventKind::GraphBuildStarted {
            points: job.point_count(),
        });
        self.pending_build = Some((job, self.markers.len()));
        Ok(())
    }

    /// Publish the pending build if it has finished. Returns whether a
    /// graph was published.
    pub fn poll_background_build(&mut self) -> Result<bool> {
        let Some((job, markers)) = &self.pending_build else {
            return Ok(false);
        };
        let markers = *markers;
        match job.try_finish() {
            Ok(Some(graph)) => {
                self.pending_build = None;
                self.publish_graph(graph, markers);
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(err) => {
                self.pending_build = None;
                Err(err)
            }
        }
    }

    /// Block until the pending build finishes, then publish it. Returns
    /// `Ok(None)` if no build was pending.
    pub fn wait_for_background_build(&mut self) -> Result<Option<Arc<ProximityGraph>>> {
        let Some((job, markers)) = self.pending_build.take() else {
            return Ok(None);
        };
        let graph = job.wait()?;
        self.publish_graph(Arc::clone(&graph), markers);
        Ok(Some(graph))
    }

    /// Replace the current graph. `markers` is how many markers the build
    /// input started with.
    fn publish_graph(&mut self, graph: Arc<ProximityGraph>, markers: usize) {
        if graph.is_empty() {
            info!("graph built from zero points; no route possible");
            self.emit(SessionEventKind::Notice {
                notice: RouteNotice::EmptyInput,
            });
        }
        let nodes = graph.node_count();
        let edges = graph.edge_count();
        self.graph = Some(graph);
        self.graph_markers = markers;
        info!(nodes, edges, k = self.config.neighbor_count, "graph published");
        self.emit(SessionEventKind::GraphPublished { nodes, edges });

        if !self.plan.is_empty() {
            self.plan.clear();
            self.emit(SessionEventKind::SegmentsCleared);
        }
        self.emit_scene();
    }

    /// Route through the occupied waypoints on the current graph, replacing
    /// any previously computed segments. Returns the new segments.
    pub fn compute_route(&mut self) -> &[SegmentOutcome] {
        let Some(graph) = self.graph.clone() else {
            self.notice(RouteNotice::NoGraph);
            return self.plan.segments();
        };

        let sequence = self.waypoint_sequence();
        if sequence.len() < 2 {
            let had_segments = !self.plan.is_empty();
            self.plan.clear();
            self.notice(RouteNotice::InsufficientWaypoints {
                set: sequence.len(),
            });
            if had_segments {
                self.emit(SessionEventKind::SegmentsCleared);
                self.emit_scene();
            }
            return self.plan.segments();
        }

        let (slots, points): (Vec<WaypointSlot>, Vec<Point>) = sequence.into_iter().unzip();
        let outcomes = router::route(&graph, &points);

        let mut unresolved_reported = Vec::new();
        for (i, outcome) in outcomes.iter().enumerate() {
            match outcome {
                SegmentOutcome::Found(_) => {}
                SegmentOutcome::WaypointUnresolved { unresolved } => {
                    for &w in unresolved {
                        let slot = slots[w];
                        if !unresolved_reported.contains(&slot) {
                            unresolved_reported.push(slot);
                            self.notice(RouteNotice::WaypointUnresolved { slot });
                        }
                    }
                }
                SegmentOutcome::NoPathFound { .. } => {
                    self.notice(RouteNotice::NoPathFound {
                        from: slots[i],
                        to: slots[i + 1],
                    });
                }
            }
        }

        let segments = outcomes.len();
        let found = outcomes.iter().filter(|o| o.is_found()).count();
        info!(segments, found, "route computed");
        self.plan = SegmentPlan::new(outcomes);
        self.emit(SessionEventKind::RouteComputed { segments, found });
        self.emit(SessionEventKind::SegmentActivated { index: 0 });
        self.emit_scene();
        self.plan.segments()
    }

    /// Show the next segment, or clear all segments after the last one.
    pub fn advance_segment(&mut self) -> Advance {
        let advance = self.plan.advance();
        match advance {
            Advance::Moved { active } => {
                self.emit(SessionEventKind::SegmentActivated { index: active });
                self.emit_scene();
            }
            Advance::Cleared => {
                self.emit(SessionEventKind::SegmentsCleared);
                self.emit_scene();
            }
            Advance::NothingPending => {
                self.notice(RouteNotice::AdvanceWithNoActiveSegment);
            }
        }
        advance
    }

    /// Hide or show plain markers. Path markers stay visible either way.
    pub fn set_markers_hidden(&mut self, hidden: bool) {
        self.markers_hidden = hidden;
        self.emit(SessionEventKind::MarkersHidden { hidden });
        self.emit_scene();
    }

    // -----------------------------------------------------------------------
    // Event plumbing
    // -----------------------------------------------------------------------

    fn emit(&mut self, kind: SessionEventKind) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.outbox.push(SessionEvent { sequence, kind });
    }

    fn notice(&mut self, notice: RouteNotice) {
        info!(%notice, "route notice");
        self.emit(SessionEventKind::Notice { notice });
    }

    fn emit_scene(&mut self) {
        let scene = self.snapshot();
        self.emit(SessionEventKind::SceneChanged { scene });
    }
}
