use aws_sdk_ec2::primitives::DateTimeFormat;
use ebs_cleanup_core::inventory::{coerce_utc, Snapshot, Volume, VolumeAttachment};

use crate::adapters::inventory::CloudInventory;

/// EC2-backed inventory adapter. Snapshot listings are scoped to the calling
/// account, and both listings follow `next_token` pagination to completion.
pub struct Ec2Inventory {
    ec2_client: aws_sdk_ec2::Client,
}

impl Ec2Inventory {
    pub fn new(ec2_client: aws_sdk_ec2::Client) -> Self {
        Self { ec2_client }
    }
}

impl CloudInventory for Ec2Inventory {
    fn list_owned_snapshots(&self) -> Result<Vec<Snapshot>, String> {
        let client = self.ec2_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let mut snapshots = Vec::new();
                let mut next_token: Option<String> = None;

                loop {
                    let response = client
                        .describe_snapshots()
                        .owner_ids("self")
                        .set_next_token(next_token)
                        .send()
                        .await
                        .map_err(|error| format!("failed to list snapshots: {error}"))?;

                    for listed in response.snapshots() {
                        let Some(snapshot_id) = listed.snapshot_id() else {
                            continue;
                        };
                        let raw_start_time = listed
                            .start_time()
                            .ok_or_else(|| format!("snapshot {snapshot_id} has no start time"))?
                            .fmt(DateTimeFormat::DateTime)
                            .map_err(|error| {
                                format!("snapshot {snapshot_id} start time: {error}")
                            })?;
                        let start_time = coerce_utc(&raw_start_time).map_err(|error| {
                            format!("snapshot {snapshot_id}: {}", error.message())
                        })?;

                        snapshots.push(Snapshot {
                            snapshot_id: snapshot_id.to_string(),
                            volume_id: listed.volume_id().map(str::to_string),
                            start_time,
                        });
                    }

                    next_token = response.next_token().map(str::to_string);
                    if next_token.is_none() {
                        return Ok(snapshots);
                    }
                }
            })
        })
    }

    fn list_volumes(&self) -> Result<Vec<Volume>, String> {
        let client = self.ec2_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let mut volumes = Vec::new();
                let mut next_token: Option<String> = None;

                loop {
                    let response = client
                        .describe_volumes()
                        .set_next_token(next_token)
                        .send()
                        .await
                        .map_err(|error| format!("failed to list volumes: {error}"))?;

                    for listed in response.volumes() {
                        let Some(volume_id) = listed.volume_id() else {
                            continue;
                        };
                        let attachments = listed
                            .attachments()
                            .iter()
                            .map(|attachment| VolumeAttachment {
                                instance_id: attachment.instance_id().map(str::to_string),
                                state: attachment
                                    .state()
                                    .map(|state| state.as_str().to_string()),
                            })
                            .collect();

                        volumes.push(Volume {
                            volume_id: volume_id.to_string(),
                            attachments,
                        });
                    }

                    next_token = response.next_token().map(str::to_string);
                    if next_token.is_none() {
                        return Ok(volumes);
                    }
                }
            })
        })
    }

    fn delete_snapshot(&self, snapshot_id: &str) -> Result<(), String> {
        let client = self.ec2_client.clone();
        let snapshot_id = snapshot_id.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .delete_snapshot()
                    .snapshot_id(snapshot_id)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to delete snapshot: {error}"))
            })
        })
    }
}
