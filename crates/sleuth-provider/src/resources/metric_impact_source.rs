//! The `sleuth_metric_impact_source` resource.
//!
//! Mirrors the error impact source, carrying a provider-specific metric
//! query instead of error keys. An unset `integration_slug` defaults to
//! the provider name.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sleuth_client::model::{
    CreateMetricImpactSourceInput, MetricImpactSource, MutableMetricImpactSource,
    UpdateMetricImpactSourceInput,
};

use crate::error::{ProviderError, ProviderResult};
use crate::resource::{
    normalize_environment_slug, parse_composite_id, resolve_delete, OpContext, ResourceLifecycle,
};
use crate::schema::{AttrType, Attribute, Schema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricImpactSourcePlan {
    pub project_slug: String,
    pub name: String,
    pub environment_slug: String,
    pub provider: String,
    pub query: String,
    #[serde(default)]
    pub less_is_better: bool,
    #[serde(default)]
    pub manually_set_health_threshold: Option<f64>,
    #[serde(default)]
    pub integration_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricImpactSourceState {
    /// Composite `{project_slug}/{slug}`.
    pub id: String,
    pub project_slug: String,
    pub slug: String,
    pub name: String,
    pub environment_slug: String,
    pub provider: String,
    pub query: String,
    pub less_is_better: bool,
    pub manually_set_health_threshold: Option<f64>,
    pub integration_slug: Option<String>,
}

pub struct MetricImpactSourceResource;

impl MetricImpactSourceResource {
    fn mutable_fields(plan: &MetricImpactSourcePlan) -> MutableMetricImpactSource {
        let integration_slug = match plan.integration_slug.as_deref() {
            Some(slug) if !slug.is_empty() => Some(slug.to_string()),
            // The integration defaults to the provider itself.
            _ => Some(plan.provider.to_ascii_lowercase()),
        };
        MutableMetricImpactSource {
            name: plan.name.clone(),
            environment_slug: normalize_environment_slug(
                &plan.project_slug,
                &plan.environment_slug,
            )
            .to_string(),
            provider: plan.provider.to_ascii_uppercase(),
            query: plan.query.clone(),
            less_is_better: plan.less_is_better,
            manually_set_health_threshold: plan.manually_set_health_threshold,
            integration_slug,
        }
    }

    fn state_from(
        project_slug: &str,
        remote: MetricImpactSource,
        provider_case: Option<&str>,
    ) -> MetricImpactSourceState {
        MetricImpactSourceState {
            id: format!("{project_slug}/{}", remote.slug),
            project_slug: project_slug.to_string(),
            slug: remote.slug,
            name: remote.name,
            environment_slug: remote.environment.slug,
            provider: provider_case
                .map(str::to_string)
                .unwrap_or(remote.provider),
            query: remote.query,
            less_is_better: remote.less_is_better,
            manually_set_health_threshold: remote.manually_set_health_threshold,
            integration_slug: remote.integration_slug,
        }
    }
}

#[async_trait]
impl ResourceLifecycle for MetricImpactSourceResource {
    type Plan = MetricImpactSourcePlan;
    type State = MetricImpactSourceState;

    fn type_name(&self) -> &'static str {
        "sleuth_metric_impact_source"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "A metric impact source bound to a project environment.",
            vec![
                Attribute::computed("id", AttrType::String),
                Attribute::computed("slug", AttrType::String),
                Attribute::required("project_slug", AttrType::String),
                Attribute::required("name", AttrType::String),
                Attribute::required("environment_slug", AttrType::String)
                    .describe("Bare slug or {project_slug}/{env_slug}."),
                Attribute::required("provider", AttrType::String),
                Attribute::required("query", AttrType::String)
                    .describe("Provider-specific metric query."),
                Attribute::optional("less_is_better", AttrType::Bool).with_default(false),
                Attribute::optional("manually_set_health_threshold", AttrType::Float),
                Attribute::optional("integration_slug", AttrType::String)
                    .describe("Defaults to the provider name when unset."),
            ],
        )
    }

    async fn create(&self, ctx: &OpContext, plan: Self::Plan) -> ProviderResult<Self::State> {
        let source = ctx
            .api
            .create_metric_impact_source(CreateMetricImpactSourceInput {
                project_slug: plan.project_slug.clone(),
                fields: Self::mutable_fields(&plan),
            })
            .await?;
        Ok(Self::state_from(
            &plan.project_slug,
            source,
            Some(&plan.provider),
        ))
    }

    async fn read(
        &self,
        ctx: &OpContext,
        state: Self::State,
    ) -> ProviderResult<Option<Self::State>> {
        let found = ctx
            .api
            .get_metric_impact_source(&state.project_slug, &state.slug)
            .await?;
        Ok(found.map(|source| {
            Self::state_from(&state.project_slug, source, Some(&state.provider))
        }))
    }

    async fn update(
        &self,
        ctx: &OpContext,
        plan: Self::Plan,
        state: Self::State,
    ) -> ProviderResult<Self::State> {
        let source = ctx
            .api
            .update_metric_impact_source(UpdateMetricImpactSourceInput {
                project_slug: state.project_slug.clone(),
                slug: state.slug.clone(),
                fields: Self::mutable_fields(&plan),
            })
            .await?;
        Ok(Self::state_from(
            &state.project_slug,
            source,
            Some(&plan.provider),
        ))
    }

    async fn delete(&self, ctx: &OpContext, state: Self::State) -> ProviderResult<()> {
        let payload = ctx
            .api
            .delete_impact_source(&state.project_slug, &state.slug)
            .await?;
        resolve_delete(payload)
    }

    async fn import(&self, ctx: &OpContext, id: &str) -> ProviderResult<Self::State> {
        let (project_slug, slug) = parse_composite_id(id)?;
        let Some(source) = ctx
            .api
            .get_metric_impact_source(&project_slug, &slug)
            .await?
        else {
            return Err(ProviderError::NotFound);
        };
        Ok(Self::state_from(&project_slug, source, None))
    }
}
