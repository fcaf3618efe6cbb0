use serde::{Deserialize, Serialize};

/// Directory identity eligible to receive a signature.
///
/// Immutable once fetched; the email is the primary key for one matching
/// pass. Sourced from the Identity Provider (Admin Directory in production).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recipient {
    pub email: String,
    pub display_name: String,
    pub given_name: String,
    pub family_name: String,
}

impl Recipient {
    /// Everything before the `@` of the primary email.
    pub fn email_local_part(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }
}
