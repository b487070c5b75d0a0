use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::inventory::Snapshot;

pub const DEFAULT_RETENTION_DAYS: i64 = 365;

/// Age threshold beyond which a snapshot is deletable regardless of whether
/// its source volume is still attached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub retention_days: i64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }
}

impl RetentionPolicy {
    pub fn new(retention_days: i64) -> Self {
        Self { retention_days }
    }

    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.retention_days)
    }

    /// A snapshot is eligible for deletion iff it is older than the retention
    /// window, or it names a source volume that is not in the attached set.
    /// A volume id missing from the volume listing entirely is treated the
    /// same as a detached volume. Snapshots with no volume id are only ever
    /// eligible on age.
    pub fn is_eligible(
        &self,
        snapshot: &Snapshot,
        attached_volume_ids: &HashSet<String>,
        now: DateTime<Utc>,
    ) -> bool {
        if snapshot.start_time < self.cutoff(now) {
            return true;
        }
        match &snapshot.volume_id {
            Some(volume_id) => !attached_volume_ids.contains(volume_id),
            None => false,
        }
    }

    /// Pure filter over the listed snapshots, preserving input order. No side
    /// effects; deletion is the caller's job.
    pub fn eligible_snapshots<'a>(
        &self,
        snapshots: &'a [Snapshot],
        attached_volume_ids: &HashSet<String>,
        now: DateTime<Utc>,
    ) -> Vec<&'a Snapshot> {
        snapshots
            .iter()
            .filter(|snapshot| self.is_eligible(snapshot, attached_volume_ids, now))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn snapshot(snapshot_id: &str, volume_id: Option<&str>, start_time: &str) -> Snapshot {
        Snapshot {
            snapshot_id: snapshot_id.to_string(),
            volume_id: volume_id.map(str::to_string),
            start_time: crate::inventory::coerce_utc(start_time).expect("test timestamp"),
        }
    }

    fn attached(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    fn evaluation_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn recent_snapshot_of_attached_volume_is_retained() {
        let policy = RetentionPolicy::default();
        let snapshot = snapshot("snap-1", Some("vol-1"), "2023-12-01T00:00:00Z");

        assert!(!policy.is_eligible(&snapshot, &attached(&["vol-1"]), evaluation_instant()));
    }

    #[test]
    fn expired_snapshot_is_selected_even_when_volume_is_attached() {
        let policy = RetentionPolicy::default();
        let snapshot = snapshot("snap-1", Some("vol-1"), "2022-01-01T00:00:00Z");

        assert!(policy.is_eligible(&snapshot, &attached(&["vol-1"]), evaluation_instant()));
    }

    #[test]
    fn snapshot_without_volume_is_only_selected_on_age() {
        let policy = RetentionPolicy::default();
        let recent = snapshot("snap-recent", None, "2023-12-01T00:00:00Z");
        let expired = snapshot("snap-expired", None, "2022-06-01T00:00:00Z");
        let no_volumes = attached(&[]);

        assert!(!policy.is_eligible(&recent, &no_volumes, evaluation_instant()));
        assert!(policy.is_eligible(&expired, &no_volumes, evaluation_instant()));
    }

    #[test]
    fn snapshot_exactly_at_cutoff_is_retained() {
        let policy = RetentionPolicy::default();
        let now = evaluation_instant();
        let at_cutoff = Snapshot {
            snapshot_id: "snap-cutoff".to_string(),
            volume_id: Some("vol-1".to_string()),
            start_time: policy.cutoff(now),
        };

        assert!(!policy.is_eligible(&at_cutoff, &attached(&["vol-1"]), now));
    }

    #[test]
    fn selection_preserves_listing_order_and_is_idempotent() {
        let policy = RetentionPolicy::default();
        let snapshots = vec![
            snapshot("snap-1", Some("vol-1"), "2022-01-01T00:00:00Z"),
            snapshot("snap-2", Some("vol-2"), "2023-12-01T00:00:00Z"),
            snapshot("snap-3", None, "2022-06-01T00:00:00Z"),
            snapshot("snap-4", Some("vol-4"), "2023-12-01T00:00:00Z"),
        ];
        let attached = attached(&["vol-2"]);

        let first = policy.eligible_snapshots(&snapshots, &attached, evaluation_instant());
        let second = policy.eligible_snapshots(&snapshots, &attached, evaluation_instant());

        let selected_ids: Vec<&str> = first
            .iter()
            .map(|snapshot| snapshot.snapshot_id.as_str())
            .collect();
        assert_eq!(selected_ids, vec!["snap-1", "snap-3", "snap-4"]);
        assert_eq!(first, second);
    }

    #[test]
    fn volume_missing_from_listing_counts_as_detached() {
        let policy = RetentionPolicy::default();
        let snapshot = snapshot("snap-4", Some("vol-4"), "2023-12-01T00:00:00Z");

        // vol-4 never appears in the volume listing at all.
        assert!(policy.is_eligible(&snapshot, &attached(&["vol-2"]), evaluation_instant()));
    }

    #[test]
    fn shorter_retention_window_widens_selection() {
        let policy = RetentionPolicy::new(30);
        let snapshot = snapshot("snap-1", Some("vol-1"), "2023-11-01T00:00:00Z");

        assert!(policy.is_eligible(&snapshot, &attached(&["vol-1"]), evaluation_instant()));
    }
}
