//! Cross-operation cluster state

use serde::{Deserialize, Serialize};

use super::product::{ProductKind, Topology};

/// Identifies a cluster created by the suite
///
/// Produced by cluster creation and passed by reference to every
/// downstream operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterHandle {
    pub order_id: String,
    pub item_id: String,
    pub cluster_name: String,
    pub topology: Topology,
}

impl ClusterHandle {
    pub fn product(&self) -> ProductKind {
        self.topology.product()
    }
}

/// Outcome of an idempotent toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The action was submitted and the new state observed
    Applied,
    /// The cluster was already in the requested state
    Unchanged,
}

/// Settings written by a Redis settings edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisSettingsChange {
    pub timeout: u32,
    pub rdb_enabled: bool,
    pub backup_schedule: String,
    pub backup_retention: u32,
}

/// Per-group VM counts of a multi-group cluster
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupCounts {
    pub data: u32,
    pub manager: u32,
    pub dashboard: u32,
}
