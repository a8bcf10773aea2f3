//! Provider configuration and construction.
//!
//! `configure` resolves the api key and base URL (explicit value first,
//! then the `SLEUTH_API_KEY` / `SLEUTH_BASEURL` environment fallbacks),
//! builds the shared GraphQL client, and wires the resource registry.
//! The client handle is the only state shared across concurrent resource
//! operations.

use std::sync::Arc;

use serde::Deserialize;
use sleuth_client::{GraphQlTransport, SleuthApi, SleuthClient};
use tracing::info;

use crate::error::{ProviderError, ProviderResult};
use crate::registry::{DynResource, Registry};
use crate::resource::OpContext;

/// User agent sent with every API request.
pub const USER_AGENT: &str = concat!("sleuth-terraform/", env!("CARGO_PKG_VERSION"));

/// Default API endpoint.
pub const DEFAULT_BASEURL: &str = "https://app.sleuth.io";

/// Raw provider configuration as supplied by the host.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub baseurl: Option<String>,
}

impl ProviderConfig {
    /// Configuration built purely from the environment.
    pub fn from_env() -> Self {
        ProviderConfig {
            api_key: std::env::var("SLEUTH_API_KEY").ok(),
            baseurl: std::env::var("SLEUTH_BASEURL").ok(),
        }
    }

    /// Fill unset fields from the environment fallbacks.
    pub fn with_env_fallback(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = std::env::var("SLEUTH_API_KEY").ok();
        }
        if self.baseurl.is_none() {
            self.baseurl = std::env::var("SLEUTH_BASEURL").ok();
        }
        self
    }

    fn resolve(self) -> ProviderResult<(String, String)> {
        let api_key = match self.api_key {
            Some(key) if !key.is_empty() => key,
            _ => {
                return Err(ProviderError::Config(
                    "api_key must be set (or provided via SLEUTH_API_KEY)".to_string(),
                ))
            }
        };
        let baseurl = match self.baseurl {
            Some(url) if !url.is_empty() => url,
            _ => DEFAULT_BASEURL.to_string(),
        };
        Ok((api_key, baseurl))
    }
}

/// The configured provider: shared API handle plus the resource registry.
pub struct SleuthProvider {
    ctx: OpContext,
    registry: Registry,
}

impl std::fmt::Debug for SleuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SleuthProvider").finish_non_exhaustive()
    }
}

impl SleuthProvider {
    /// Build the provider against the real API. Fails with
    /// [`ProviderError::Config`] on a missing api key or malformed base
    /// URL.
    pub fn configure(config: ProviderConfig) -> ProviderResult<Self> {
        let (api_key, baseurl) = config.with_env_fallback().resolve()?;
        let transport = GraphQlTransport::new(&baseurl, &api_key, USER_AGENT)
            .map_err(|e| ProviderError::Config(e.to_string()))?;
        info!(%baseurl, "configured sleuth provider");
        Ok(Self::with_api(Arc::new(SleuthClient::new(transport))))
    }

    /// Build the provider over any API implementation (tests use the
    /// in-memory fake).
    pub fn with_api(api: Arc<dyn SleuthApi>) -> Self {
        SleuthProvider {
            ctx: OpContext::new(api),
            registry: Registry::builtin(),
        }
    }

    pub fn context(&self) -> &OpContext {
        &self.ctx
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn resource(&self, type_name: &str) -> Option<&dyn DynResource> {
        self.registry.get(type_name)
    }
}
