//! AWS-oriented adapters and the handler for the CodeDeploy load-test hook.
//!
//! This crate owns runtime integration details (the Lambda entry point, S3
//! transfer and CodeDeploy adapters, and the JMeter process adapter) and
//! exposes a single runtime module boundary for contract, configuration, and
//! storage key primitives.

pub mod adapters;
pub mod handlers;
pub mod runtime;
