// Error types for the ambient layer: configuration, file I/O, and the
// background build worker.
//
// Routing outcomes (empty input, unresolved waypoints, unreachable targets,
// advancing with nothing pending) are not errors. They resolve
// to empty graphs/paths plus a `RouteNotice` (see `event.rs`).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for waymark.
#[derive(Debug, Error)]
pub enum WaymarkError {
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("neighbor count must be at least 1, got {0}")]
    InvalidNeighborCount(usize),

    #[error("failed to start graph build worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("graph build worker exited without delivering a graph")]
    BuildWorkerLost,
}

/// Convenience type alias for results using [`WaymarkError`].
pub type Result<T> = std::result::Result<T, WaymarkError>;
