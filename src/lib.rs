//! Library exports for monitron, shared between host applications and tests.
//!
//! The crate hands out one recorder per instrumented surface (inbound HTTP,
//! outbound calls, datastore, scheduled jobs, pub/sub, application errors).
//! Hosts build the set once with [`monitoring::Monitoring::from_config`] and
//! thread the handles to wherever measurements happen.

pub mod backend;
pub mod config;
pub mod models;
pub mod monitoring;
pub mod recorders;
pub mod utils;
