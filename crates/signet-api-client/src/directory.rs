//! Admin Directory API: paginated user listing.

use async_trait::async_trait;
use serde::Deserialize;

use signet_core::{IdentityProvider, ProviderError, Recipient, MAX_PAGE_SIZE};

use crate::{ApiClient, ApiError};

impl ApiClient {
    /// Fetch every user in the customer's directory, following page cursors
    /// until the API stops returning one. Ordered by email, full projection.
    pub async fn list_directory_users(
        &self,
        customer_id: &str,
    ) -> Result<Vec<Recipient>, ProviderError> {
        let url = format!("{}/admin/directory/v1/users", self.directory_base_url());
        let mut recipients = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("customer", customer_id.to_string()),
                ("maxResults", MAX_PAGE_SIZE.to_string()),
                ("orderBy", "email".to_string()),
                ("projection", "full".to_string()),
            ];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let page: UsersListResponse = self
                .get_json(&url, &query)
                .await
                .map_err(provider_error)?;

            if let Some(users) = page.users {
                recipients.extend(users.into_iter().filter_map(DirectoryUser::into_recipient));
            }

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        tracing::info!(count = recipients.len(), "Fetched directory users");
        Ok(recipients)
    }

    /// Minimal one-user list call, used during setup to verify that the
    /// token and admin delegation actually work.
    pub async fn probe_directory(&self, customer_id: &str) -> Result<(), ProviderError> {
        let url = format!("{}/admin/directory/v1/users", self.directory_base_url());
        let query = vec![
            ("customer", customer_id.to_string()),
            ("maxResults", "1".to_string()),
        ];
        let _page: UsersListResponse = self
            .get_json(&url, &query)
            .await
            .map_err(provider_error)?;
        Ok(())
    }
}

fn provider_error(err: ApiError) -> ProviderError {
    match err {
        ApiError::Status { status, message } => ProviderError::Api { status, message },
        other => ProviderError::Connection(other.to_string()),
    }
}

/// Identity provider backed by the Admin Directory API for one customer.
#[derive(Clone, Debug)]
pub struct DirectoryProvider {
    client: ApiClient,
    customer_id: String,
}

impl DirectoryProvider {
    pub fn new(client: ApiClient, customer_id: String) -> Self {
        Self {
            client,
            customer_id,
        }
    }
}

#[async_trait]
impl IdentityProvider for DirectoryProvider {
    async fn list_recipients(&self) -> Result<Vec<Recipient>, ProviderError> {
        self.client.list_directory_users(&self.customer_id).await
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsersListResponse {
    users: Option<Vec<DirectoryUser>>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DirectoryUser {
    primary_email: Option<String>,
    name: Option<DirectoryUserName>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DirectoryUserName {
    given_name: Option<String>,
    family_name: Option<String>,
    full_name: Option<String>,
}

impl DirectoryUser {
    /// Users without a primary email cannot be matched or deployed to.
    fn into_recipient(self) -> Option<Recipient> {
        let email = self.primary_email.filter(|e| !e.is_empty())?;
        let name = self.name.unwrap_or_default();
        let given_name = name.given_name.unwrap_or_default();
        let family_name = name.family_name.unwrap_or_default();
        let display_name = match name.full_name {
            Some(full) if !full.is_empty() => full,
            _ => format!("{given_name} {family_name}").trim().to_string(),
        };
        Some(Recipient {
            email,
            display_name,
            given_name,
            family_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client(server: &mockito::ServerGuard) -> ApiClient {
        ApiClient::new("test-token".to_string())
            .unwrap()
            .with_base_urls(server.url(), server.url())
    }

    const FIRST_PAGE_QUERY: &str = "customer=my_customer&maxResults=500&orderBy=email&projection=full";

    #[tokio::test]
    async fn list_follows_page_cursors() {
        let mut server = mockito::Server::new_async().await;

        let page_one = server
            .mock("GET", "/admin/directory/v1/users")
            .match_query(Matcher::Exact(FIRST_PAGE_QUERY.to_string()))
            .match_header("Authorization", "Bearer test-token")
            .with_status(200)
            .with_body(
                json!({
                    "users": [
                        {"primaryEmail": "a@co.com", "name": {"givenName": "Alice", "familyName": "Ames", "fullName": "Alice Ames"}}
                    ],
                    "nextPageToken": "cursor-2"
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let page_two = server
            .mock("GET", "/admin/directory/v1/users")
            .match_query(Matcher::Exact(format!(
                "{FIRST_PAGE_QUERY}&pageToken=cursor-2"
            )))
            .with_status(200)
            .with_body(
                json!({
                    "users": [
                        {"primaryEmail": "b@co.com", "name": {"givenName": "Bob", "familyName": "Burns"}}
                    ]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let recipients = client(&server)
            .list_directory_users("my_customer")
            .await
            .unwrap();

        page_one.assert_async().await;
        page_two.assert_async().await;

        assert_eq!(recipients.len(), 2);
        assert_eq!(recipients[0].email, "a@co.com");
        assert_eq!(recipients[0].display_name, "Alice Ames");
        assert_eq!(recipients[1].email, "b@co.com");
        // No fullName in the payload: display name is rebuilt from the parts.
        assert_eq!(recipients[1].display_name, "Bob Burns");
    }

    #[tokio::test]
    async fn list_skips_users_without_primary_email() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/admin/directory/v1/users")
            .match_query(Matcher::Exact(FIRST_PAGE_QUERY.to_string()))
            .with_status(200)
            .with_body(
                json!({
                    "users": [
                        {"name": {"fullName": "Ghost User"}},
                        {"primaryEmail": "real@co.com"}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let recipients = client(&server)
            .list_directory_users("my_customer")
            .await
            .unwrap();
        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0].email, "real@co.com");
        assert_eq!(recipients[0].display_name, "");
    }

    #[tokio::test]
    async fn list_surfaces_api_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/admin/directory/v1/users")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("Not Authorized to access this resource/api")
            .create_async()
            .await;

        let err = client(&server)
            .list_directory_users("my_customer")
            .await
            .unwrap_err();
        match err {
            ProviderError::Api { status, message } => {
                assert_eq!(status, 403);
                assert!(message.contains("Not Authorized"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn probe_sends_minimal_query() {
        let mut server = mockito::Server::new_async().await;
        let probe = server
            .mock("GET", "/admin/directory/v1/users")
            .match_query(Matcher::Exact("customer=my_customer&maxResults=1".to_string()))
            .with_status(200)
            .with_body(json!({}).to_string())
            .expect(1)
            .create_async()
            .await;

        client(&server).probe_directory("my_customer").await.unwrap();
        probe.assert_async().await;
    }
}
