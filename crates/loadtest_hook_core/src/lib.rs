//! Shared load-test hook domain primitives.
//!
//! This crate owns the invocation contract, the typed run configuration, and
//! deterministic scratch/object path construction. It intentionally excludes
//! AWS SDK and Lambda runtime concerns.

pub mod config;
pub mod contract;
pub mod storage_keys;
