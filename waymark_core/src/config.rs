// Data-driven router configuration.
//
// All tunable routing parameters live in `RouterConfig`, loaded from JSON.
// Every field has a default, and `#[serde(default)]` lets a config file name
// only the fields it wants to change.
//
// See also: `session.rs` which owns the `RouterConfig` for its lifetime,
// `graph.rs` which consumes `neighbor_count`.
//
// **Critical constraint: determinism.** Two sessions with identical configs
// and identical command sequences produce identical graphs and routes.

use crate::error::{Result, WaymarkError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Neighbor count used when none is configured.
pub const DEFAULT_NEIGHBOR_COUNT: usize = 5;

/// Router configuration. Loaded from JSON, never mutated by the session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// `k` for the proximity graph: each node links to this many nearest
    /// other nodes. Must be at least 1.
    pub neighbor_count: usize,

    /// Append the designated waypoint positions (Start, End1, End2 order)
    /// to the marker list before building, so waypoints always resolve to
    /// nodes of a graph built after they were set.
    pub include_waypoints_in_graph: bool,

    /// Initial visibility of plain markers in scene snapshots. Hidden markers
    /// are still reported when they lie on the active path.
    pub markers_hidden: bool,

    /// Run graph builds requested by the scenario runner on a worker thread.
    pub background_build: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            neighbor_count: DEFAULT_NEIGHBOR_COUNT,
            include_waypoints_in_graph: true,
            markers_hidden: false,
            background_build: false,
        }
    }
}

impl RouterConfig {
    /// Parse and validate a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RouterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| WaymarkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Reject parameter combinations the builder cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.neighbor_count == 0 {
            return Err(WaymarkError::InvalidNeighborCount(self.neighbor_count));
        }
        Ok(())
    }
}
