//! Signet service layer
//!
//! Hosts the batch deployment engine that pushes matched signatures through a
//! [`signet_core::DeliveryTransport`]. Matching itself is pure and lives in
//! `signet-core`; this crate owns everything time-related: retries, pacing,
//! and progress reporting.

pub mod deploy;

pub use deploy::{deploy_batch, fetch_current, DeployPolicy, ProgressEvent};
