// Background proximity-graph builds.
//
// `GraphBuildJob::spawn` snapshots the input points and runs
// `build_proximity_graph` on a named worker thread. The finished graph comes
// back over an `mpsc` channel, already wrapped in an `Arc`, so the owning
// session can publish it with a single slot assignment.
//
// Builds are not cancellable and have no timeout. Dropping a job detaches
// the worker; its result is discarded when it arrives.
//
// See also: `graph.rs` for the builder itself, `session.rs` for
// `start_background_build()` / `poll_background_build()` which drive this.

use crate::error::{Result, WaymarkError};
use crate::graph::{self, ProximityGraph};
use crate::types::Point;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use tracing::{debug, warn};

/// Handle to a graph build running on a worker thread.
pub struct GraphBuildJob {
    receiver: Receiver<Arc<ProximityGraph>>,
    point_count: usize,
}

impl GraphBuildJob {
    /// Start building a graph over `points` on a new worker thread.
    ///
    /// The points are moved into the worker, so later edits by the caller do
    /// not affect this build.
    pub fn spawn(points: Vec<Point>, k: usize) -> Result<Self> {
        let point_count = points.len();
        let (sender, receiver) = mpsc::channel();

        // Dropping the handle detaches the worker.
        let _worker = thread::Builder::new()
            .name("waymark-graph-build".into())
            .spawn(move || {
                let graph = graph::build_proximity_graph(&points, k);
                // The receiver may be gone if the job was dropped; nothing to do.
                let _ = sender.send(Arc::new(graph));
            })
            .map_err(WaymarkError::WorkerSpawn)?;

        debug!(points = point_count, k, "background graph build started");
        Ok(Self {
            receiver,
            point_count,
        })
    }

    /// Number of points the job is building over.
    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// Non-blocking check. `Ok(None)` while the worker is still running.
    pub fn try_finish(&self) -> Result<Option<Arc<ProximityGraph>>> {
        match self.receiver.try_recv() {
            Ok(graph) => Ok(Some(graph)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                warn!("graph build worker disconnected");
                Err(WaymarkError::BuildWorkerLost)
            }
        }
    }

    /// Block until the worker delivers its graph.
    pub fn wait(self) -> Result<Arc<ProximityGraph>> {
        self.receiver.recv().map_err(|_| {
            warn!("graph build worker disconnected");
            WaymarkError::BuildWorkerLost
        })
    }
}
