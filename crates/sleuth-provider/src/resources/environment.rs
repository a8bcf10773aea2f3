//! The `sleuth_environment` resource.
//!
//! The server auto-creates a "Production" environment with every project,
//! so create first looks the name up and silently adopts an existing
//! environment by upgrading the operation to an update. State carries the
//! bare environment slug as the ID with the project slug as a separate
//! attribute; imports use `{project_slug}/{env_slug}`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sleuth_client::model::{
    CreateEnvironmentInput, Environment, MutableEnvironment, UpdateEnvironmentInput,
};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::resource::{parse_composite_id, resolve_delete, OpContext, ResourceLifecycle};
use crate::schema::{AttrType, Attribute, Schema};

fn default_color() -> String {
    "#cecece".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentPlan {
    pub project_slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentState {
    /// Bare environment slug.
    pub id: String,
    pub project_slug: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub color: String,
}

pub struct EnvironmentResource;

impl EnvironmentResource {
    fn mutable_fields(plan: &EnvironmentPlan) -> MutableEnvironment {
        MutableEnvironment {
            name: plan.name.clone(),
            description: plan.description.clone(),
            color: Some(plan.color.clone()),
        }
    }

    fn state_from(project_slug: &str, remote: Environment) -> EnvironmentState {
        EnvironmentState {
            id: remote.slug.clone(),
            project_slug: project_slug.to_string(),
            name: remote.name,
            slug: remote.slug,
            description: remote.description,
            color: remote.color.unwrap_or_else(default_color),
        }
    }
}

#[async_trait]
impl ResourceLifecycle for EnvironmentResource {
    type Plan = EnvironmentPlan;
    type State = EnvironmentState;

    fn type_name(&self) -> &'static str {
        "sleuth_environment"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "A deployment environment scoped to a project.",
            vec![
                Attribute::computed("id", AttrType::String),
                Attribute::computed("slug", AttrType::String),
                Attribute::required("project_slug", AttrType::String),
                Attribute::required("name", AttrType::String),
                Attribute::optional("description", AttrType::String),
                Attribute::optional("color", AttrType::String).with_default("#cecece"),
            ],
        )
    }

    async fn create(&self, ctx: &OpContext, plan: Self::Plan) -> ProviderResult<Self::State> {
        // Adoption path: if a same-named environment already exists (the
        // server seeds "Production"), update it instead of recreating.
        let existing = ctx
            .api
            .get_environment_by_name(&plan.project_slug, &plan.name)
            .await?;
        let environment = match existing {
            Some(environment) => {
                debug!(
                    project = %plan.project_slug,
                    slug = %environment.slug,
                    "adopting existing environment"
                );
                ctx.api
                    .update_environment(UpdateEnvironmentInput {
                        project_slug: plan.project_slug.clone(),
                        slug: environment.slug,
                        fields: Self::mutable_fields(&plan),
                    })
                    .await?
            }
            None => {
                ctx.api
                    .create_environment(CreateEnvironmentInput {
                        project_slug: plan.project_slug.clone(),
                        fields: Self::mutable_fields(&plan),
                    })
                    .await?
            }
        };
        Ok(Self::state_from(&plan.project_slug, environment))
    }

    async fn read(
        &self,
        ctx: &OpContext,
        state: Self::State,
    ) -> ProviderResult<Option<Self::State>> {
        let found = ctx
            .api
            .get_environment(&state.project_slug, &state.id)
            .await?;
        Ok(found.map(|environment| Self::state_from(&state.project_slug, environment)))
    }

    async fn update(
        &self,
        ctx: &OpContext,
        plan: Self::Plan,
        state: Self::State,
    ) -> ProviderResult<Self::State> {
        let environment = ctx
            .api
            .update_environment(UpdateEnvironmentInput {
                project_slug: state.project_slug.clone(),
                slug: state.id.clone(),
                fields: Self::mutable_fields(&plan),
            })
            .await?;
        Ok(Self::state_from(&state.project_slug, environment))
    }

    async fn delete(&self, ctx: &OpContext, state: Self::State) -> ProviderResult<()> {
        let payload = ctx
            .api
            .delete_environment(&state.project_slug, &state.id)
            .await?;
        resolve_delete(payload)
    }

    async fn import(&self, ctx: &OpContext, id: &str) -> ProviderResult<Self::State> {
        let (project_slug, env_slug) = parse_composite_id(id)?;
        let Some(environment) = ctx.api.get_environment(&project_slug, &env_slug).await? else {
            return Err(ProviderError::NotFound);
        };
        Ok(Self::state_from(&project_slug, environment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_defaults_color() {
        let plan: EnvironmentPlan = serde_json::from_value(serde_json::json!({
            "project_slug": "p",
            "name": "Staging",
        }))
        .expect("deserialize");
        assert_eq!(plan.color, "#cecece");
    }

    #[test]
    fn test_state_id_is_bare_slug() {
        let state = EnvironmentResource::state_from(
            "proj",
            Environment {
                name: "Staging".to_string(),
                slug: "staging".to_string(),
                description: None,
                color: Some("#00ff00".to_string()),
            },
        );
        assert_eq!(state.id, "staging");
        assert_eq!(state.project_slug, "proj");
    }
}
