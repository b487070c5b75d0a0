use ebs_cleanup_core::inventory::{Snapshot, Volume};

/// Blocking facade over the cloud inventory service. Listing failures are
/// fatal to the invocation; a delete failure only affects that snapshot.
pub trait CloudInventory {
    fn list_owned_snapshots(&self) -> Result<Vec<Snapshot>, String>;
    fn list_volumes(&self) -> Result<Vec<Volume>, String>;
    fn delete_snapshot(&self, snapshot_id: &str) -> Result<(), String>;
}
