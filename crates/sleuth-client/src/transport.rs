//! Authenticated GraphQL transport
//!
//! A thin wrapper over `reqwest` that posts GraphQL documents to the Sleuth
//! `/graphql` endpoint and classifies failures per layer:
//! transport/IO, HTTP status, and GraphQL `errors[]`.
//!
//! Business-level `errors` collections inside mutation payloads are left in
//! the returned data for the typed client to inspect.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{ApiError, ApiResult};

/// Fixed per-request timeout. The provider performs no internal retries;
/// a slow request surfaces to the host as a transport error.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// GraphQL-over-HTTP transport with `apikey` authentication.
///
/// The underlying `reqwest::Client` is cheaply cloneable and safe for
/// concurrent use, so one transport is shared across all in-flight
/// resource operations.
#[derive(Debug, Clone)]
pub struct GraphQlTransport {
    http: reqwest::Client,
    endpoint: Url,
}

impl GraphQlTransport {
    /// Build a transport for the given base URL.
    ///
    /// Fails with [`ApiError::Config`] if the URL cannot be parsed or the
    /// HTTP client cannot be constructed. Every request carries
    /// `Authorization: apikey <key>` and the given user agent.
    pub fn new(base_url: &str, api_key: &str, user_agent: &str) -> ApiResult<Self> {
        let endpoint = format!("{}/graphql", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| ApiError::Config(format!("invalid base URL {base_url:?}: {e}")))?;

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("apikey {api_key}"))
            .map_err(|e| ApiError::Config(format!("invalid api key: {e}")))?;
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, endpoint })
    }

    /// The resolved GraphQL endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Execute a GraphQL document and return the `data` value.
    ///
    /// Classification:
    /// - request never completed -> [`ApiError::Transport`]
    /// - non-2xx response -> [`ApiError::Status`] with the body attached
    /// - `errors[]` in the response -> [`ApiError::Remote`]
    /// - missing `data` -> [`ApiError::Decode`]
    pub async fn execute(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> ApiResult<serde_json::Value> {
        let body = json!({ "query": query, "variables": variables });

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let envelope: GraphQlResponse = response.json().await?;

        if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            debug!(?messages, "GraphQL response carried errors");
            return Err(ApiError::Remote { messages });
        }

        envelope
            .data
            .ok_or_else(|| ApiError::Decode("response carried neither data nor errors".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<serde_json::Value>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_base_url() {
        let err = GraphQlTransport::new("not a url", "key", "agent").unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn test_endpoint_appends_graphql_path() {
        let transport = GraphQlTransport::new("https://app.sleuth.io", "key", "agent").unwrap();
        assert_eq!(transport.endpoint().path(), "/graphql");
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let transport = GraphQlTransport::new("https://app.sleuth.io/", "key", "agent").unwrap();
        assert_eq!(
            transport.endpoint().as_str(),
            "https://app.sleuth.io/graphql"
        );
    }

    #[test]
    fn test_rejects_unprintable_api_key() {
        let err = GraphQlTransport::new("https://app.sleuth.io", "bad\nkey", "agent").unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }
}
