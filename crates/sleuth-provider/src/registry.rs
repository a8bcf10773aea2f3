//! Name-keyed dispatch over the resource set.
//!
//! The host boundary works in JSON plan/state documents; `DynResource`
//! erases each adapter's concrete plan/state types by decoding at the
//! edge, so the registry can hold every resource behind one trait object.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ProviderError, ProviderResult};
use crate::resource::{OpContext, ResourceLifecycle};
use crate::resources::*;
use crate::schema::Schema;

fn decode<T: DeserializeOwned>(what: &str, value: Value) -> ProviderResult<T> {
    serde_json::from_value(value)
        .map_err(|e| ProviderError::Validation(format!("invalid {what}: {e}")))
}

fn encode<T: Serialize>(what: &str, value: &T) -> ProviderResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| ProviderError::Validation(format!("failed to encode {what}: {e}")))
}

/// Type-erased resource lifecycle operating on JSON documents.
#[async_trait]
pub trait DynResource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn create(&self, ctx: &OpContext, plan: Value) -> ProviderResult<Value>;

    async fn read(&self, ctx: &OpContext, state: Value) -> ProviderResult<Option<Value>>;

    async fn update(&self, ctx: &OpContext, plan: Value, state: Value) -> ProviderResult<Value>;

    async fn delete(&self, ctx: &OpContext, state: Value) -> ProviderResult<()>;

    async fn import(&self, ctx: &OpContext, id: &str) -> ProviderResult<Value>;
}

#[async_trait]
impl<R: ResourceLifecycle> DynResource for R {
    fn type_name(&self) -> &'static str {
        ResourceLifecycle::type_name(self)
    }

    fn schema(&self) -> Schema {
        ResourceLifecycle::schema(self)
    }

    async fn create(&self, ctx: &OpContext, plan: Value) -> ProviderResult<Value> {
        let plan: R::Plan = decode("plan", plan)?;
        let state = ResourceLifecycle::create(self, ctx, plan).await?;
        encode("state", &state)
    }

    async fn read(&self, ctx: &OpContext, state: Value) -> ProviderResult<Option<Value>> {
        let state: R::State = decode("state", state)?;
        match ResourceLifecycle::read(self, ctx, state).await? {
            Some(state) => Ok(Some(encode("state", &state)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, ctx: &OpContext, plan: Value, state: Value) -> ProviderResult<Value> {
        let plan: R::Plan = decode("plan", plan)?;
        let state: R::State = decode("state", state)?;
        let state = ResourceLifecycle::update(self, ctx, plan, state).await?;
        encode("state", &state)
    }

    async fn delete(&self, ctx: &OpContext, state: Value) -> ProviderResult<()> {
        let state: R::State = decode("state", state)?;
        ResourceLifecycle::delete(self, ctx, state).await
    }

    async fn import(&self, ctx: &OpContext, id: &str) -> ProviderResult<Value> {
        let state = ResourceLifecycle::import(self, ctx, id).await?;
        encode("state", &state)
    }
}

/// The provider's resource set, keyed by host-facing type name.
pub struct Registry {
    resources: HashMap<&'static str, Box<dyn DynResource>>,
}

impl Registry {
    /// All resources the provider registers under the "sleuth" name.
    pub fn builtin() -> Self {
        let mut registry = Registry {
            resources: HashMap::new(),
        };
        registry.register(Box::new(ProjectResource));
        registry.register(Box::new(EnvironmentResource));
        registry.register(Box::new(CodeChangeSourceResource));
        registry.register(Box::new(ErrorImpactSourceResource));
        registry.register(Box::new(MetricImpactSourceResource));
        registry.register(Box::new(IncidentImpactSourceResource));
        registry.register(Box::new(TeamResource));
        registry
    }

    fn register(&mut self, resource: Box<dyn DynResource>) {
        self.resources.insert(resource.type_name(), resource);
    }

    pub fn get(&self, type_name: &str) -> Option<&dyn DynResource> {
        self.resources.get(type_name).map(Box::as_ref)
    }

    /// Registered type names, sorted for stable output.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.resources.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
