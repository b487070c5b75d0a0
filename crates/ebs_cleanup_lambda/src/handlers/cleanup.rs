use chrono::{DateTime, Utc};
use ebs_cleanup_core::inventory::attached_volume_ids;
use ebs_cleanup_core::policy::RetentionPolicy;
use ebs_cleanup_core::report::{CleanupReport, DeleteFailure};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::adapters::inventory::CloudInventory;

pub const COMPLETION_BODY: &str = "Snapshot cleanup completed.";

/// Trigger-facing completion record. Returned once the batch ran to the end,
/// whether or not every delete succeeded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CleanupResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

/// Invocation-fatal failure: a listing call failed, so no retention decision
/// could be made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupError {
    pub message: String,
}

/// Runs one cleanup batch: list snapshots, list volumes, evaluate the
/// retention policy, then issue one best-effort delete per eligible snapshot
/// in listing order. A rejected delete is recorded and the batch moves on;
/// there is no retry. Re-running against the same inventory selects the same
/// snapshots, so an interrupted run is safe to repeat.
pub fn run_cleanup(
    policy: &RetentionPolicy,
    now: DateTime<Utc>,
    inventory: &impl CloudInventory,
) -> Result<CleanupReport, CleanupError> {
    log_cleanup_info(
        "cleanup_started",
        json!({
            "retention_days": policy.retention_days,
            "cutoff": policy.cutoff(now).to_rfc3339(),
        }),
    );

    let snapshots = inventory
        .list_owned_snapshots()
        .map_err(|message| CleanupError { message })?;
    let volumes = inventory
        .list_volumes()
        .map_err(|message| CleanupError { message })?;

    let attached = attached_volume_ids(&volumes);
    let eligible = policy.eligible_snapshots(&snapshots, &attached, now);

    let mut report = CleanupReport {
        snapshots_listed: snapshots.len(),
        volumes_attached: attached.len(),
        snapshots_eligible: eligible.len(),
        ..CleanupReport::default()
    };

    for snapshot in eligible {
        match inventory.delete_snapshot(&snapshot.snapshot_id) {
            Ok(()) => {
                report.snapshots_deleted += 1;
                log_cleanup_info(
                    "snapshot_deleted",
                    json!({
                        "snapshot_id": snapshot.snapshot_id,
                        "volume_id": snapshot.volume_id,
                        "start_time": snapshot.start_time.to_rfc3339(),
                    }),
                );
            }
            Err(cause) => {
                log_cleanup_error(
                    "snapshot_delete_failed",
                    json!({
                        "snapshot_id": snapshot.snapshot_id,
                        "cause": cause.clone(),
                    }),
                );
                report.failures.push(DeleteFailure {
                    snapshot_id: snapshot.snapshot_id.clone(),
                    cause,
                });
            }
        }
    }

    log_cleanup_info(
        "cleanup_completed",
        json!({
            "snapshots_listed": report.snapshots_listed,
            "volumes_attached": report.volumes_attached,
            "snapshots_eligible": report.snapshots_eligible,
            "snapshots_deleted": report.snapshots_deleted,
            "delete_failures": report.failures.len(),
        }),
    );

    Ok(report)
}

/// Entry point used by the Lambda binary: runs the batch and maps completion
/// to the fixed trigger response.
pub fn handle_cleanup_event(
    policy: &RetentionPolicy,
    now: DateTime<Utc>,
    inventory: &impl CloudInventory,
) -> Result<CleanupResponse, CleanupError> {
    run_cleanup(policy, now, inventory)?;
    Ok(CleanupResponse {
        status_code: 200,
        body: COMPLETION_BODY.to_string(),
    })
}

fn log_cleanup_info(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "cleanup_handler",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

fn log_cleanup_error(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "cleanup_handler",
            "level": "error",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}
