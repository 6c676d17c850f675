//! HTTP client for the dashboard backend.
//!
//! GET for all refresh endpoints, POST with a JSON body for all action
//! endpoints. HTTP status codes are not interpreted: the body is parsed as
//! an envelope regardless, and only network errors or unparseable bodies
//! count as transport failures.

use crate::error::{ClientError, ClientResult, TransportFailure};
use crate::retry::{fetch_with_retry, RetryPolicy};
use opsdash_core::{Envelope, Resource};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default timeout for a single request attempt.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the dashboard backend API.
///
/// Holds no mutable state, so it is safely callable concurrently for
/// different resources.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Arguments
    /// * `base_url` - Backend base URL without trailing slash
    ///   (e.g., "http://127.0.0.1:5000").
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Build(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// GET a resource's refresh endpoint and parse the envelope, retrying
    /// transport failures per `policy`.
    pub async fn get_resource(
        &self,
        resource: Resource,
        policy: &RetryPolicy,
    ) -> ClientResult<Envelope> {
        let url = format!("{}{}", self.base_url, resource.endpoint());
        debug!(%resource, %url, "Refreshing resource");
        fetch_with_retry(
            |_attempt| self.send(Method::GET, url.clone(), None),
            policy,
        )
        .await
    }

    /// POST an action endpoint with a JSON body and parse the envelope,
    /// retrying transport failures per `policy`.
    pub async fn post_action(
        &self,
        path: &str,
        body: Value,
        policy: &RetryPolicy,
    ) -> ClientResult<Envelope> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "Posting action");
        fetch_with_retry(
            |_attempt| self.send(Method::POST, url.clone(), Some(body.clone())),
            policy,
        )
        .await
    }

    /// One request attempt. Network errors and unparseable bodies become
    /// transport failures; anything that parses as an envelope is returned.
    async fn send(
        &self,
        method: Method,
        url: String,
        body: Option<Value>,
    ) -> Result<Envelope, TransportFailure> {
        let mut request = self.http.request(method, &url);
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportFailure(format!("request failed: {e}")))?;

        let text = response
            .text()
            .await
            .map_err(|e| TransportFailure(format!("body read failed: {e}")))?;

        serde_json::from_str(&text)
            .map_err(|e| TransportFailure(format!("unparseable response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds() {
        let client = ApiClient::new("http://127.0.0.1:5000").unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:5000");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_failure() {
        // Port 9 (discard) on localhost is not listening; connection is
        // refused immediately, so this does not hang on the retry delay.
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let policy = RetryPolicy {
            max_attempts: 2,
            delay: Duration::from_millis(1),
        };
        let result = client.get_resource(Resource::Status, &policy).await;
        assert!(matches!(
            result,
            Err(ClientError::Transport { attempts: 2, .. })
        ));
    }
}
