//! Delivery transport abstraction
//!
//! The deployment engine talks to the remote mailbox settings API through
//! this trait, so batches can run against the real Gmail client or a test
//! double without changing control flow.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-item delivery failures. All are terminal for that item once retries
/// are exhausted; none is fatal to the batch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// The remote identity has no deliverable sendAs alias.
    #[error("No sendAs configuration found")]
    NoSendConfiguration,

    /// The remote API answered with a non-success status. The message is the
    /// response body, captured verbatim.
    #[error("HTTP {status}: {message}")]
    Transport { status: u16, message: String },

    /// Anything else: connection failures, decode failures, surprises.
    #[error("{0}")]
    Unexpected(String),
}

/// Result type for transport operations
pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// One sendAs record of a remote mailbox.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendAsAlias {
    pub send_as_email: String,
    pub is_primary: bool,
    pub signature: Option<String>,
}

/// Remote write/read access to per-user signature settings.
///
/// Deploy and read-back act on the first alias returned by `list_aliases`
/// when none is explicitly selected.
#[async_trait]
pub trait DeliveryTransport: Send + Sync {
    /// List the user's sendAs aliases, in the order the remote returns them.
    async fn list_aliases(&self, user_email: &str) -> DeliveryResult<Vec<SendAsAlias>>;

    /// One remote write attempt for the given alias.
    async fn set_signature(
        &self,
        user_email: &str,
        alias_email: &str,
        body: &str,
    ) -> DeliveryResult<()>;

    /// Read back the currently stored signature of the first alias.
    /// `Ok(None)` means no signature is set, which is a valid outcome.
    async fn get_signature(&self, user_email: &str) -> DeliveryResult<Option<String>>;
}
