//! Identity provider abstraction
//!
//! Supplies the recipients a matching pass runs against. Provider failures
//! are fatal to the run: without a directory snapshot there is nothing to
//! match.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Recipient;

/// Upper bound the Directory API accepts per page.
pub const MAX_PAGE_SIZE: u32 = 500;

/// Failures while fetching the directory snapshot.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Error fetching users: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Error fetching users: {0}")]
    Connection(String),
}

/// Source of valid recipients for one organization.
///
/// Implementations paginate internally and return the full snapshot ordered
/// by email.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn list_recipients(&self) -> Result<Vec<Recipient>, ProviderError>;
}
