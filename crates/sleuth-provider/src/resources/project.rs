//! The `sleuth_project` resource.
//!
//! The slug is server-generated from the name and is both the resource ID
//! and the import ID. Deleting the last environment of a project cascade
//! deletes the project on the server, so a delete answering "Missing" is
//! treated as already done.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sleuth_client::model::{CreateProjectInput, MutableProject, Project, UpdateProjectInput};
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::resource::{resolve_delete, OpContext, ResourceLifecycle};
use crate::schema::{AttrType, Attribute, Schema};

fn default_failure_sensitivity() -> i64 {
    420
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPlan {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub issue_tracker_provider: Option<String>,
    #[serde(default)]
    pub build_provider: Option<String>,
    #[serde(default)]
    pub change_failure_rate_boundary: Option<String>,
    #[serde(default)]
    pub impact_sensitivity: Option<String>,
    #[serde(default = "default_failure_sensitivity")]
    pub failure_sensitivity: i64,
    #[serde(default)]
    pub change_lead_time_start_definition: Option<String>,
    #[serde(default)]
    pub change_lead_time_issue_states: Option<Vec<i64>>,
    #[serde(default)]
    pub change_lead_time_strict_matching: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectState {
    /// Bare project slug.
    pub id: String,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub issue_tracker_provider: Option<String>,
    pub build_provider: Option<String>,
    pub change_failure_rate_boundary: Option<String>,
    pub impact_sensitivity: Option<String>,
    pub failure_sensitivity: i64,
    pub change_lead_time_start_definition: Option<String>,
    pub change_lead_time_issue_states: Option<Vec<i64>>,
    pub change_lead_time_strict_matching: Option<bool>,
}

pub struct ProjectResource;

impl ProjectResource {
    fn mutable_fields(plan: &ProjectPlan) -> MutableProject {
        MutableProject {
            name: plan.name.clone(),
            description: plan.description.clone(),
            issue_tracker_provider: plan.issue_tracker_provider.clone(),
            build_provider: plan.build_provider.clone(),
            change_failure_rate_boundary: plan.change_failure_rate_boundary.clone(),
            impact_sensitivity: plan.impact_sensitivity.clone(),
            failure_sensitivity: Some(plan.failure_sensitivity),
            change_lead_time_start_definition: plan.change_lead_time_start_definition.clone(),
            change_lead_time_issue_states: plan
                .change_lead_time_issue_states
                .iter()
                .flatten()
                .map(|id| id.to_string())
                .collect(),
            change_lead_time_strict_matching: plan.change_lead_time_strict_matching,
        }
    }

    /// Map a remote project into state. The API hands issue-state IDs back
    /// as strings; unparseable entries are dropped with a warning.
    /// `issue_states_present` keeps the null-vs-empty distinction stable:
    /// a plan that never set the attribute stays null in state.
    fn state_from(remote: Project, issue_states_present: bool) -> ProjectState {
        let parsed: Vec<i64> = remote
            .change_lead_time_issue_states
            .iter()
            .filter_map(|raw| match raw.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!(value = %raw, "dropping unparseable issue-state ID");
                    None
                }
            })
            .collect();
        let issue_states = if parsed.is_empty() && !issue_states_present {
            None
        } else {
            Some(parsed)
        };

        ProjectState {
            id: remote.slug.clone(),
            slug: remote.slug,
            name: remote.name,
            description: remote.description,
            issue_tracker_provider: remote.issue_tracker_provider,
            build_provider: remote.build_provider,
            change_failure_rate_boundary: remote.change_failure_rate_boundary,
            impact_sensitivity: remote.impact_sensitivity,
            failure_sensitivity: remote
                .failure_sensitivity
                .unwrap_or_else(default_failure_sensitivity),
            change_lead_time_start_definition: remote.change_lead_time_start_definition,
            change_lead_time_issue_states: issue_states,
            change_lead_time_strict_matching: remote.change_lead_time_strict_matching,
        }
    }
}

#[async_trait]
impl ResourceLifecycle for ProjectResource {
    type Plan = ProjectPlan;
    type State = ProjectState;

    fn type_name(&self) -> &'static str {
        "sleuth_project"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "A Sleuth project. The slug is assigned by the server and immutable.",
            vec![
                Attribute::computed("id", AttrType::String),
                Attribute::computed("slug", AttrType::String),
                Attribute::required("name", AttrType::String),
                Attribute::optional("description", AttrType::String)
                    .describe("Deprecated; retained for round-tripping older configs."),
                Attribute::optional("issue_tracker_provider", AttrType::String),
                Attribute::optional("build_provider", AttrType::String),
                Attribute::optional("change_failure_rate_boundary", AttrType::String)
                    .describe("HEALTHY, UNHEALTHY or INCIDENT."),
                Attribute::optional("impact_sensitivity", AttrType::String),
                Attribute::optional("failure_sensitivity", AttrType::Int).with_default(420),
                Attribute::optional("change_lead_time_start_definition", AttrType::String),
                Attribute::optional("change_lead_time_issue_states", AttrType::SetInt),
                Attribute::optional("change_lead_time_strict_matching", AttrType::Bool),
            ],
        )
    }

    async fn create(&self, ctx: &OpContext, plan: Self::Plan) -> ProviderResult<Self::State> {
        let issue_states_present = plan.change_lead_time_issue_states.is_some();
        let project = ctx
            .api
            .create_project(CreateProjectInput {
                fields: Self::mutable_fields(&plan),
            })
            .await?;
        Ok(Self::state_from(project, issue_states_present))
    }

    async fn read(
        &self,
        ctx: &OpContext,
        state: Self::State,
    ) -> ProviderResult<Option<Self::State>> {
        let Some(project) = ctx.api.get_project(&state.id).await? else {
            return Ok(None);
        };
        let issue_states_present = state.change_lead_time_issue_states.is_some();
        Ok(Some(Self::state_from(project, issue_states_present)))
    }

    async fn update(
        &self,
        ctx: &OpContext,
        plan: Self::Plan,
        state: Self::State,
    ) -> ProviderResult<Self::State> {
        let issue_states_present = plan.change_lead_time_issue_states.is_some();
        let project = ctx
            .api
            .update_project(UpdateProjectInput {
                slug: state.id.clone(),
                fields: Self::mutable_fields(&plan),
            })
            .await?;
        Ok(Self::state_from(project, issue_states_present))
    }

    async fn delete(&self, ctx: &OpContext, state: Self::State) -> ProviderResult<()> {
        let payload = ctx.api.delete_project(&state.id).await?;
        if !payload.success {
            // The server cascade-deletes a project with its last
            // environment; a follow-up delete answers "Missing".
            debug!(slug = %state.id, message = ?payload.message, "project delete reported failure");
        }
        resolve_delete(payload)
    }

    async fn import(&self, ctx: &OpContext, id: &str) -> ProviderResult<Self::State> {
        let Some(project) = ctx.api.get_project(id).await? else {
            return Err(ProviderError::NotFound);
        };
        Ok(Self::state_from(project, false))
    }
}
