use serde::{Deserialize, Serialize};

/// A delete request the inventory service rejected. Failures are aggregated
/// per run instead of relying on logs as the only failure channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteFailure {
    pub snapshot_id: String,
    pub cause: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CleanupReport {
    pub snapshots_listed: usize,
    pub volumes_attached: usize,
    pub snapshots_eligible: usize,
    pub snapshots_deleted: usize,
    pub failures: Vec<DeleteFailure>,
}

impl CleanupReport {
    pub fn completed_with_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
