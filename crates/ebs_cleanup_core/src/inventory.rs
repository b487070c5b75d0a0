use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point-in-time backup of a block storage volume, as returned by the
/// cloud inventory listing. Immutable once listed; lifecycle is external.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    pub snapshot_id: String,
    /// The volume this snapshot was taken from. The provider may omit it.
    pub volume_id: Option<String>,
    pub start_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolumeAttachment {
    pub instance_id: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Volume {
    pub volume_id: String,
    pub attachments: Vec<VolumeAttachment>,
}

impl Volume {
    /// A volume counts as attached iff it carries at least one attachment
    /// record, regardless of the attachment state field.
    pub fn is_attached(&self) -> bool {
        !self.attachments.is_empty()
    }
}

/// Volume ids with at least one attachment, rebuilt from the current volume
/// listing on every run. Volumes missing from the listing are simply absent
/// here, which the policy treats the same as detached.
pub fn attached_volume_ids(volumes: &[Volume]) -> HashSet<String> {
    volumes
        .iter()
        .filter(|volume| volume.is_attached())
        .map(|volume| volume.volume_id.clone())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampError {
    message: String,
}

impl TimestampError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Normalizes a raw timestamp at the ingestion boundary, before any
/// comparison. Offset-aware RFC 3339 timestamps are converted to UTC; naive
/// timestamps are assumed to already be UTC and are tagged as such without
/// shifting the wall-clock value.
pub fn coerce_utc(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    if let Ok(aware) = DateTime::parse_from_rfc3339(raw) {
        return Ok(aware.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(TimestampError::new(format!(
        "unrecognized timestamp '{raw}'"
    )))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn volume(volume_id: &str, attachment_count: usize) -> Volume {
        Volume {
            volume_id: volume_id.to_string(),
            attachments: (0..attachment_count)
                .map(|index| VolumeAttachment {
                    instance_id: Some(format!("i-{index:08}")),
                    state: Some("attached".to_string()),
                })
                .collect(),
        }
    }

    #[test]
    fn attached_index_keeps_only_volumes_with_attachments() {
        let volumes = vec![volume("vol-a", 1), volume("vol-b", 0), volume("vol-c", 2)];

        let attached = attached_volume_ids(&volumes);

        assert!(attached.contains("vol-a"));
        assert!(attached.contains("vol-c"));
        assert!(!attached.contains("vol-b"));
        assert_eq!(attached.len(), 2);
    }

    #[test]
    fn coerce_utc_converts_offset_aware_timestamps() {
        let parsed = coerce_utc("2024-01-01T05:00:00+05:00").expect("timestamp should parse");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn coerce_utc_treats_naive_timestamps_as_utc() {
        let parsed = coerce_utc("2024-01-01T05:00:00").expect("timestamp should parse");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 5, 0, 0).unwrap());
    }

    #[test]
    fn coerce_utc_accepts_bare_dates() {
        let parsed = coerce_utc("2022-06-01").expect("date should parse");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2022, 6, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn coerce_utc_rejects_garbage() {
        let error = coerce_utc("last tuesday").expect_err("should not parse");
        assert!(error.message().contains("last tuesday"));
    }
}
