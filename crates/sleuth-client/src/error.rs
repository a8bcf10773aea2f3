//! Error types for sleuth-client

use thiserror::Error;

/// Errors that can occur when talking to the Sleuth API.
///
/// The client classifies failures into four layers:
/// - `Config`: the client could not be constructed (bad base URL).
/// - `Transport`: the HTTP request never produced a response.
/// - `Status`: the server answered with a non-2xx status.
/// - `Remote`: the GraphQL layer answered with `errors[]`, either at the
///   top level of the response or inside a mutation payload.
///
/// Business-level outcomes (a delete payload with `success=false`) are not
/// errors at this layer; they are returned as data for the caller to
/// interpret.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Client misconfiguration (malformed base URL, unusable TLS setup)
    #[error("client configuration error: {0}")]
    Config(String),

    /// Network or IO failure before a response was received
    #[error("transport error: {0}")]
    Transport(String),

    /// HTTP response with a non-2xx status code
    #[error("unexpected HTTP status {code}: {body}")]
    Status { code: u16, body: String },

    /// GraphQL-level errors returned by the server
    #[error("GraphQL errors: {}", messages.join("; "))]
    Remote { messages: Vec<String> },

    /// Response payload did not match the expected shape
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build a `Remote` error from a single message.
    pub fn remote(message: impl Into<String>) -> Self {
        ApiError::Remote {
            messages: vec![message.into()],
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Result type for Sleuth API operations
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_joins_messages() {
        let err = ApiError::Remote {
            messages: vec!["first".to_string(), "second".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("first"));
        assert!(msg.contains("second"));
    }

    #[test]
    fn test_status_error_display() {
        let err = ApiError::Status {
            code: 502,
            body: "bad gateway".to_string(),
        };
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("bad gateway"));
    }
}
