//! Provider-level error taxonomy and host-facing diagnostics.

use serde::{Deserialize, Serialize};
use sleuth_client::ApiError;
use thiserror::Error;

/// Errors produced by resource operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Provider startup misconfiguration (missing api key, bad base URL)
    #[error("provider configuration error: {0}")]
    Config(String),

    /// Failure from the API client layer (transport, status, GraphQL)
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A delete-style mutation answered `success=false`
    #[error("operation unsuccessful: {0}")]
    Business(String),

    /// Pre-flight rejection of a plan before any remote call
    #[error("{0}")]
    Validation(String),

    /// The remote entity no longer exists
    #[error("resource not found")]
    NotFound,
}

/// Result type for provider operations.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Severity of a host diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Structured diagnostic reported back to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    #[serde(default)]
    pub detail: String,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
        }
    }
}

impl ProviderError {
    /// Render this error as a host diagnostic. The summary names the
    /// failing layer; the detail carries the full message so partial
    /// outcomes (team membership) stay actionable.
    pub fn into_diagnostic(self) -> Diagnostic {
        let summary = match &self {
            ProviderError::Config(_) => "provider configuration failed",
            ProviderError::Api(ApiError::Config(_)) => "provider configuration failed",
            ProviderError::Api(ApiError::Transport(_)) => "request to Sleuth failed",
            ProviderError::Api(ApiError::Status { .. }) => "Sleuth returned an HTTP error",
            ProviderError::Api(ApiError::Remote { .. }) => "Sleuth rejected the operation",
            ProviderError::Api(ApiError::Decode(_)) => "unexpected Sleuth response",
            ProviderError::Business(_) => "operation unsuccessful",
            ProviderError::Validation(_) => "invalid configuration",
            ProviderError::NotFound => "resource not found",
        };
        Diagnostic::error(summary, self.to_string())
    }
}
