//! AWS-oriented adapters and handler for the EBS snapshot cleanup job.
//!
//! This crate owns runtime integration details (the Lambda handler and the
//! EC2-backed inventory adapter) and keeps the retention decision itself in
//! `ebs_cleanup_core`, behind the `CloudInventory` adapter boundary.

pub mod adapters;
pub mod handlers;
