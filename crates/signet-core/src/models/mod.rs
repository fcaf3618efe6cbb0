//! Domain models
//!
//! All entities are scoped to a single invocation: nothing here is cached or
//! persisted across runs.

pub mod deployment;
pub mod document;
pub mod recipient;

pub use deployment::{DeployReport, DeploymentOutcome};
pub use document::{
    CandidateDocument, InvalidDocument, MatchRecord, MatchReport, UnmatchedDocument,
    ValidationInfo,
};
pub use recipient::Recipient;
