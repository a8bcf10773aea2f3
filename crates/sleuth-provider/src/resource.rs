//! The resource lifecycle trait and shared adapter policies.
//!
//! Every resource maps the host's `(plan, prior state)` model onto the
//! remote Create/Read/Update/Delete operations:
//!
//! | Op     | Guarantee                                                    |
//! |--------|--------------------------------------------------------------|
//! | create | assigns the composite ID, fills computed attributes          |
//! | read   | `Ok(None)` means gone; the host drops the entry and recreates |
//! | update | applies the diff, preserves server-assigned fields           |
//! | delete | idempotent; "not found" / "Missing" is success               |
//! | import | parses the composite ID, then behaves like read              |

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sleuth_client::model::DeletePayload;
use sleuth_client::SleuthApi;

use crate::error::{ProviderError, ProviderResult};
use crate::schema::Schema;

/// Per-operation context: the immutable API handle shared across all
/// concurrent resource operations. Nothing else is shared between them.
#[derive(Clone)]
pub struct OpContext {
    pub api: Arc<dyn SleuthApi>,
}

impl OpContext {
    pub fn new(api: Arc<dyn SleuthApi>) -> Self {
        Self { api }
    }
}

/// Lifecycle of one managed resource type, parameterized by its plan and
/// state records.
#[async_trait]
pub trait ResourceLifecycle: Send + Sync {
    type Plan: DeserializeOwned + Serialize + Send + 'static;
    type State: DeserializeOwned + Serialize + Send + 'static;

    /// Host-facing resource type name (e.g. "sleuth_project").
    fn type_name(&self) -> &'static str;

    /// Declarative attribute schema.
    fn schema(&self) -> Schema;

    async fn create(&self, ctx: &OpContext, plan: Self::Plan) -> ProviderResult<Self::State>;

    async fn read(
        &self,
        ctx: &OpContext,
        state: Self::State,
    ) -> ProviderResult<Option<Self::State>>;

    async fn update(
        &self,
        ctx: &OpContext,
        plan: Self::Plan,
        state: Self::State,
    ) -> ProviderResult<Self::State>;

    async fn delete(&self, ctx: &OpContext, state: Self::State) -> ProviderResult<()>;

    async fn import(&self, ctx: &OpContext, id: &str) -> ProviderResult<Self::State>;
}

/// Parse a `{project_slug}/{slug}` composite ID. Exactly two segments are
/// required; anything else is a user-facing validation error.
pub fn parse_composite_id(id: &str) -> ProviderResult<(String, String)> {
    let mut parts = id.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(project), Some(slug), None) => Ok((project.to_string(), slug.to_string())),
        _ => Err(ProviderError::Validation(format!(
            "invalid resource ID: {id}"
        ))),
    }
}

/// Whether a failed delete payload describes an entity that is already
/// gone. "Missing" is what a cascade-deleted project reports; the
/// " not found" suffix is what team deletes report.
pub fn already_gone(payload: &DeletePayload) -> bool {
    match &payload.message {
        Some(message) => message == "Missing" || message.ends_with(" not found"),
        None => false,
    }
}

/// Resolve a delete payload into the adapter's idempotent-delete rule:
/// success, or an already-gone failure, both count as deleted.
pub fn resolve_delete(payload: DeletePayload) -> ProviderResult<()> {
    if payload.success || already_gone(&payload) {
        return Ok(());
    }
    Err(ProviderError::Business(
        payload.message.unwrap_or_else(|| "delete failed".to_string()),
    ))
}

/// Environment slugs are accepted bare or qualified as
/// `{project_slug}/{env_slug}`; the wire always takes the bare form.
pub fn normalize_environment_slug<'a>(project_slug: &str, env_slug: &'a str) -> &'a str {
    match env_slug.split_once('/') {
        Some((project, bare)) if project == project_slug => bare,
        _ => env_slug,
    }
}
