//! Shared HTTP client for the Google Workspace APIs.
//!
//! Provides a minimal client with Bearer-token auth, generic GET/PATCH JSON
//! helpers, and the domain methods the core traits need: Admin Directory
//! user listing (`directory`) and Gmail sendAs signature settings (`gmail`).
//! Base URLs are overridable so tests can point the client at a mock server.

pub mod directory;
pub mod gmail;

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use signet_core::AppConfig;

const DIRECTORY_BASE_URL: &str = "https://admin.googleapis.com";
const GMAIL_BASE_URL: &str = "https://gmail.googleapis.com";

/// Error from one Google API request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-success HTTP status; the message is the response body text.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a status (connect failure, timeout).
    #[error("Request failed: {0}")]
    Connection(String),

    /// The response arrived but was not the JSON shape we expected.
    #[error("Failed to parse response as JSON: {0}")]
    Decode(String),
}

/// HTTP client for the Directory and Gmail APIs with Bearer auth.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    token: String,
    directory_base_url: String,
    gmail_base_url: String,
}

impl ApiClient {
    pub fn new(token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            token,
            directory_base_url: DIRECTORY_BASE_URL.to_string(),
            gmail_base_url: GMAIL_BASE_URL.to_string(),
        })
    }

    /// Create a client with the token resolved from the given config
    /// (`SIGNET_ACCESS_TOKEN` env var, then the configured token file).
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let token = config
            .access_token()
            .context("Missing access token. Set SIGNET_ACCESS_TOKEN or run `signet init`")?;
        Self::new(token)
    }

    /// Point both APIs at alternative base URLs. Tests use this to run
    /// against a local mock server.
    pub fn with_base_urls(mut self, directory: String, gmail: String) -> Self {
        self.directory_base_url = directory.trim_end_matches('/').to_string();
        self.gmail_base_url = gmail.trim_end_matches('/').to_string();
        self
    }

    pub fn directory_base_url(&self) -> &str {
        &self.directory_base_url
    }

    pub fn gmail_base_url(&self) -> &str {
        &self.gmail_base_url
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.header("Authorization", format!("Bearer {}", self.token))
    }

    /// GET with optional query parameters, deserializing the JSON response.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut request = self.apply_auth(self.client.get(url));
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request
            .send()
            .await
            .map_err(|err| ApiError::Connection(err.to_string()))?;
        Self::decode(response).await
    }

    /// PATCH a JSON body, deserializing the JSON response.
    pub(crate) async fn patch_json<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.apply_auth(self.client.patch(url)).json(body);
        let response = request
            .send()
            .await
            .map_err(|err| ApiError::Connection(err.to_string()))?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }
}

pub use directory::DirectoryProvider;
