//! The `sleuth_error_impact_source` resource.
//!
//! Uniform CRUD against an error-tracker link. The environment slug is
//! accepted bare or as `{project_slug}/{env_slug}` and normalized to the
//! bare form before it reaches the wire.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sleuth_client::model::{
    CreateErrorImpactSourceInput, ErrorImpactSource, MutableErrorImpactSource,
    UpdateErrorImpactSourceInput,
};

use crate::error::{ProviderError, ProviderResult};
use crate::resource::{
    normalize_environment_slug, parse_composite_id, resolve_delete, OpContext, ResourceLifecycle,
};
use crate::schema::{AttrType, Attribute, Schema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorImpactSourcePlan {
    pub project_slug: String,
    pub name: String,
    pub environment_slug: String,
    pub provider: String,
    pub error_org_key: String,
    pub error_project_key: String,
    pub error_environment: String,
    #[serde(default)]
    pub manually_set_health_threshold: Option<f64>,
    #[serde(default)]
    pub integration_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorImpactSourceState {
    /// Composite `{project_slug}/{slug}`.
    pub id: String,
    pub project_slug: String,
    pub slug: String,
    pub name: String,
    pub environment_slug: String,
    pub provider: String,
    pub error_org_key: String,
    pub error_project_key: String,
    pub error_environment: String,
    pub manually_set_health_threshold: Option<f64>,
    pub integration_slug: Option<String>,
}

pub struct ErrorImpactSourceResource;

impl ErrorImpactSourceResource {
    fn mutable_fields(plan: &ErrorImpactSourcePlan) -> MutableErrorImpactSource {
        MutableErrorImpactSource {
            name: plan.name.clone(),
            environment_slug: normalize_environment_slug(
                &plan.project_slug,
                &plan.environment_slug,
            )
            .to_string(),
            provider: plan.provider.to_ascii_uppercase(),
            error_org_key: plan.error_org_key.clone(),
            error_project_key: plan.error_project_key.clone(),
            error_environment: plan.error_environment.clone(),
            manually_set_health_threshold: plan.manually_set_health_threshold,
            integration_slug: plan.integration_slug.clone(),
        }
    }

    fn state_from(
        project_slug: &str,
        remote: ErrorImpactSource,
        provider_case: Option<&str>,
    ) -> ErrorImpactSourceState {
        ErrorImpactSourceState {
            id: format!("{project_slug}/{}", remote.slug),
            project_slug: project_slug.to_string(),
            slug: remote.slug,
            name: remote.name,
            environment_slug: remote.environment.slug,
            provider: provider_case
                .map(str::to_string)
                .unwrap_or(remote.provider),
            error_org_key: remote.error_org_key,
            error_project_key: remote.error_project_key,
            error_environment: remote.error_environment,
            manually_set_health_threshold: remote.manually_set_health_threshold,
            integration_slug: remote.integration_slug,
        }
    }
}

#[async_trait]
impl ResourceLifecycle for ErrorImpactSourceResource {
    type Plan = ErrorImpactSourcePlan;
    type State = ErrorImpactSourceState;

    fn type_name(&self) -> &'static str {
        "sleuth_error_impact_source"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "An error-tracker impact source bound to a project environment.",
            vec![
                Attribute::computed("id", AttrType::String),
                Attribute::computed("slug", AttrType::String),
                Attribute::required("project_slug", AttrType::String),
                Attribute::required("name", AttrType::String),
                Attribute::required("environment_slug", AttrType::String)
                    .describe("Bare slug or {project_slug}/{env_slug}."),
                Attribute::required("provider", AttrType::String),
                Attribute::required("error_org_key", AttrType::String),
                Attribute::required("error_project_key", AttrType::String),
                Attribute::required("error_environment", AttrType::String),
                Attribute::optional("manually_set_health_threshold", AttrType::Float),
                Attribute::optional("integration_slug", AttrType::String),
            ],
        )
    }

    async fn create(&self, ctx: &OpContext, plan: Self::Plan) -> ProviderResult<Self::State> {
        let source = ctx
            .api
            .create_error_impact_source(CreateErrorImpactSourceInput {
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
            .get_error_impact_source(&state.project_slug, &state.slug)
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
            .update_error_impact_source(UpdateErrorImpactSourceInput {
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
            .get_error_impact_source(&project_slug, &slug)
            .await?
        else {
            return Err(ProviderError::NotFound);
        };
        Ok(Self::state_from(&project_slug, source, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_slug_normalizes_on_the_wire() {
        let plan = ErrorImpactSourcePlan {
            project_slug: "proj".to_string(),
            name: "Sentry".to_string(),
            environment_slug: "proj/production".to_string(),
            provider: "sentry".to_string(),
            error_org_key: "org".to_string(),
            error_project_key: "key".to_string(),
            error_environment: "prod".to_string(),
            manually_set_health_threshold: None,
            integration_slug: None,
        };
        let fields = ErrorImpactSourceResource::mutable_fields(&plan);
        assert_eq!(fields.environment_slug, "production");
        assert_eq!(fields.provider, "SENTRY");
    }
}
