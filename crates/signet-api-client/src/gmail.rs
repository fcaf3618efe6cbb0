//! Gmail settings API: sendAs aliases and signature read/write.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use signet_core::{DeliveryError, DeliveryResult, DeliveryTransport, SendAsAlias};

use crate::{ApiClient, ApiError};

impl ApiClient {
    /// List a user's sendAs aliases in the order the API returns them (the
    /// primary alias comes first in practice).
    pub async fn list_send_as(&self, user_email: &str) -> DeliveryResult<Vec<SendAsAlias>> {
        let url = format!(
            "{}/gmail/v1/users/{}/settings/sendAs",
            self.gmail_base_url(),
            user_email
        );
        let response: SendAsListResponse =
            self.get_json(&url, &[]).await.map_err(delivery_error)?;
        Ok(response
            .send_as
            .unwrap_or_default()
            .into_iter()
            .map(|entry| entry.into_alias(user_email))
            .collect())
    }

    /// Patch the signature of one sendAs alias.
    pub async fn patch_signature(
        &self,
        user_email: &str,
        alias_email: &str,
        body: &str,
    ) -> DeliveryResult<()> {
        let url = format!(
            "{}/gmail/v1/users/{}/settings/sendAs/{}",
            self.gmail_base_url(),
            user_email,
            alias_email
        );
        let _updated: serde_json::Value = self
            .patch_json(&url, &json!({ "signature": body }))
            .await
            .map_err(delivery_error)?;
        tracing::debug!(user = %user_email, alias = %alias_email, "Updated signature");
        Ok(())
    }
}

fn delivery_error(err: ApiError) -> DeliveryError {
    match err {
        ApiError::Status { status, message } => DeliveryError::Transport { status, message },
        other => DeliveryError::Unexpected(other.to_string()),
    }
}

#[async_trait]
impl DeliveryTransport for ApiClient {
    async fn list_aliases(&self, user_email: &str) -> DeliveryResult<Vec<SendAsAlias>> {
        self.list_send_as(user_email).await
    }

    async fn set_signature(
        &self,
        user_email: &str,
        alias_email: &str,
        body: &str,
    ) -> DeliveryResult<()> {
        self.patch_signature(user_email, alias_email, body).await
    }

    async fn get_signature(&self, user_email: &str) -> DeliveryResult<Option<String>> {
        let aliases = self.list_send_as(user_email).await?;
        let Some(first) = aliases.into_iter().next() else {
            return Err(DeliveryError::NoSendConfiguration);
        };
        Ok(first.signature.filter(|s| !s.is_empty()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendAsListResponse {
    send_as: Option<Vec<SendAsEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendAsEntry {
    send_as_email: Option<String>,
    #[serde(default)]
    is_primary: bool,
    signature: Option<String>,
}

impl SendAsEntry {
    /// Aliases without an address fall back to the mailbox owner's email.
    fn into_alias(self, user_email: &str) -> SendAsAlias {
        SendAsAlias {
            send_as_email: self
                .send_as_email
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| user_email.to_string()),
            is_primary: self.is_primary,
            signature: self.signature,
        }
    }
}
