//! Shared snapshot retention domain primitives.
//!
//! This crate owns the deterministic retention decision and the inventory
//! contracts it is made over. It intentionally excludes AWS SDK and Lambda
//! runtime concerns; those live in `crates/ebs_cleanup_lambda`.

pub mod inventory;
pub mod policy;
pub mod report;
