//! Core domain for signet: signature-to-recipient matching, document
//! validation, configuration, and the trait seams the deployment engine
//! consumes.
//!
//! This crate does no network I/O. The Directory and Gmail integrations live
//! in `signet-api-client` behind the [`IdentityProvider`] and
//! [`DeliveryTransport`] traits; the batch deployment engine lives in
//! `signet-services`.

pub mod config;
pub mod matching;
pub mod models;
pub mod provider;
pub mod transport;

pub use config::{config_dir, config_path, AppConfig, ConfigError};
pub use matching::{
    identity_keys, match_candidates, normalize, scan_signature_folder, validate_document,
    MatchError, ValidationError, MAX_SIGNATURE_BYTES,
};
pub use models::{
    CandidateDocument, DeployReport, DeploymentOutcome, InvalidDocument, MatchRecord, MatchReport,
    Recipient, UnmatchedDocument, ValidationInfo,
};
pub use provider::{IdentityProvider, ProviderError, MAX_PAGE_SIZE};
pub use transport::{DeliveryError, DeliveryResult, DeliveryTransport, SendAsAlias};
