//! API client for the login service.
//!
//! The service exposes two endpoints: `POST {API}` with a JSON credential
//! body, answering with the user record and token, and `GET {API}/logout`.

use std::time::Duration;

use reqwest::{header, Client};
use tracing::{debug, warn};

use crate::models::{Credentials, User};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Path segment appended to the API root for logout
const LOGOUT_PATH: &str = "logout";

/// API client for the login service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    api_url: String,
}

impl ApiClient {
    /// Create a new API client rooted at `api_url`
    pub fn new(api_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(api_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(api_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        let api_url = api_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, api_url })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn logout_url(&self) -> String {
        format!("{}/{}", self.api_url, LOGOUT_PATH)
    }

    /// Send credentials and return the user record the server issued.
    /// The token is not stored here.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        debug!(url = %self.api_url, username = credentials.username(), "Sending login request");

        let response = self
            .client
            .post(&self.api_url)
            .header(header::ACCEPT, "application/json")
            .json(credentials)
            .send()
            .await?;

        let response = Self::check_response(response).await?;

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse login response: {}", e)))
    }

    /// Tell the server the session is over. Any 2xx counts, whatever the body.
    pub async fn logout(&self, token: Option<&str>) -> Result<(), ApiError> {
        let url = self.logout_url();
        debug!(url = %url, authenticated = token.is_some(), "Sending logout request");

        let mut request = self.client.get(&url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Request rejected");
            Err(ApiError::from_status(status, &body))
        }
    }
}
