//! The `sleuth_code_change_source` resource.
//!
//! The largest schema in the provider. The adapter owns several
//! representational quirks:
//! - `build_branch` is derived, not user-supplied: each build mapping
//!   inherits the branch of the environment mapping sharing its
//!   environment slug, and a missing match fails the plan.
//! - provider enum fields are upper-cased on the wire but keep the plan's
//!   spelling in state, so the next plan shows no spurious diff.
//! - the API echoes `project_key` but never a project name; the name is
//!   preserved from the plan via an `(environment_slug, build_name)`
//!   lookup.
//! - the computed webhook block round-trips only when the remote returns
//!   one, and an empty remote build-mapping list stays null when the plan
//!   never declared mappings.
//!
//! Environment mappings are persisted under bare environment slugs; the
//! legacy project-prefixed spelling is accepted on input and normalized.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sleuth_client::model::{
    BuildMapping, CodeChangeSource, CreateCodeChangeSourceInput, EnvironmentMapping,
    MutableCodeChangeSource, RepositoryInput, UpdateCodeChangeSourceInput, Webhook,
};

use crate::error::{ProviderError, ProviderResult};
use crate::resource::{
    normalize_environment_slug, parse_composite_id, resolve_delete, OpContext, ResourceLifecycle,
};
use crate::schema::{AttrType, Attribute, Schema};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryBlock {
    pub owner: String,
    pub name: String,
    pub url: String,
    pub provider: String,
    #[serde(default)]
    pub integration_slug: Option<String>,
    #[serde(default)]
    pub project_uid: Option<String>,
    #[serde(default)]
    pub repo_uid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentMappingBlock {
    pub environment_slug: String,
    pub branch: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildMappingPlanBlock {
    pub environment_slug: String,
    pub provider: String,
    #[serde(default)]
    pub integration_slug: Option<String>,
    pub build_name: String,
    #[serde(default)]
    pub job_name: Option<String>,
    #[serde(default)]
    pub project_key: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default = "default_true")]
    pub match_branch_to_environment: bool,
    #[serde(default)]
    pub is_custom: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeChangeSourcePlan {
    pub project_slug: String,
    pub name: String,
    pub repository: RepositoryBlock,
    pub environment_mappings: Vec<EnvironmentMappingBlock>,
    #[serde(default)]
    pub build_mappings: Option<Vec<BuildMappingPlanBlock>>,
    pub deploy_tracking_type: String,
    #[serde(default = "default_true")]
    pub collect_impact: bool,
    #[serde(default = "default_true")]
    pub notify_in_slack: bool,
    #[serde(default = "default_true")]
    pub include_in_dashboard: bool,
    #[serde(default)]
    pub path_prefix: Option<String>,
    #[serde(default)]
    pub auto_tracking_delay: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookBlock {
    pub url: String,
    pub secret: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryStateBlock {
    pub owner: String,
    pub name: String,
    pub url: String,
    pub provider: String,
    pub integration_slug: Option<String>,
    pub project_uid: Option<String>,
    pub repo_uid: Option<String>,
    pub webhook: Option<WebhookBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildMappingStateBlock {
    pub environment_slug: String,
    pub provider: String,
    pub integration_slug: Option<String>,
    pub build_name: String,
    pub job_name: Option<String>,
    pub project_key: Option<String>,
    pub project_name: Option<String>,
    pub match_branch_to_environment: bool,
    pub is_custom: bool,
    pub build_branch: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeChangeSourceState {
    /// Composite `{project_slug}/{slug}`.
    pub id: String,
    pub project_slug: String,
    pub slug: String,
    pub name: String,
    pub repository: RepositoryStateBlock,
    pub environment_mappings: Vec<EnvironmentMappingBlock>,
    pub build_mappings: Option<Vec<BuildMappingStateBlock>>,
    pub deploy_tracking_type: String,
    pub collect_impact: bool,
    pub notify_in_slack: bool,
    pub include_in_dashboard: bool,
    pub path_prefix: Option<String>,
    pub auto_tracking_delay: i64,
}

/// Plan-side facts that the API does not echo and state writing must
/// preserve: enum spelling, the project name, and whether the optional
/// attributes were set at all.
#[derive(Debug, Default)]
struct StateReference {
    repo_provider: Option<String>,
    build_refs: Vec<BuildRef>,
    build_mappings_present: bool,
}

#[derive(Debug)]
struct BuildRef {
    environment_slug: String,
    build_name: String,
    provider: String,
    project_name: Option<String>,
    project_key_present: bool,
}

impl StateReference {
    fn from_plan(plan: &CodeChangeSourcePlan) -> Self {
        StateReference {
            repo_provider: Some(plan.repository.provider.clone()),
            build_refs: plan
                .build_mappings
                .iter()
                .flatten()
                .map(|m| BuildRef {
                    environment_slug: normalize_environment_slug(
                        &plan.project_slug,
                        &m.environment_slug,
                    )
                    .to_string(),
                    build_name: m.build_name.clone(),
                    provider: m.provider.clone(),
                    project_name: m.project_name.clone(),
                    project_key_present: m.project_key.is_some(),
                })
                .collect(),
            build_mappings_present: plan.build_mappings.is_some(),
        }
    }

    fn from_state(state: &CodeChangeSourceState) -> Self {
        StateReference {
            repo_provider: Some(state.repository.provider.clone()),
            build_refs: state
                .build_mappings
                .iter()
                .flatten()
                .map(|m| BuildRef {
                    environment_slug: m.environment_slug.clone(),
                    build_name: m.build_name.clone(),
                    provider: m.provider.clone(),
                    project_name: m.project_name.clone(),
                    project_key_present: m.project_key.is_some(),
                })
                .collect(),
            build_mappings_present: state.build_mappings.is_some(),
        }
    }

    fn build_ref(&self, environment_slug: &str, build_name: &str) -> Option<&BuildRef> {
        self.build_refs
            .iter()
            .find(|r| r.environment_slug == environment_slug && r.build_name == build_name)
    }
}

pub struct CodeChangeSourceResource;

impl CodeChangeSourceResource {
    /// AZURE repositories need the integration wiring the other providers
    /// can infer.
    fn validate(plan: &CodeChangeSourcePlan) -> ProviderResult<()> {
        if plan.repository.provider.to_ascii_uppercase() == "AZURE" {
            let missing = plan
                .repository
                .project_uid
                .as_deref()
                .unwrap_or_default()
                .is_empty()
                || plan
                    .repository
                    .repo_uid
                    .as_deref()
                    .unwrap_or_default()
                    .is_empty()
                || plan
                    .repository
                    .integration_slug
                    .as_deref()
                    .unwrap_or_default()
                    .is_empty();
            if missing {
                return Err(ProviderError::Validation(
                    "project_uid, repo_uid and integration_slug are required for AZURE provider"
                        .to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Translate the plan into the wire shape: providers upper-cased,
    /// environment slugs bare, `build_branch` inherited from the matching
    /// environment mapping.
    fn mutable_fields(plan: &CodeChangeSourcePlan) -> ProviderResult<MutableCodeChangeSource> {
        let environment_mappings: Vec<EnvironmentMapping> = plan
            .environment_mappings
            .iter()
            .map(|m| EnvironmentMapping {
                environment_slug: normalize_environment_slug(
                    &plan.project_slug,
                    &m.environment_slug,
                )
                .to_string(),
                branch: m.branch.clone(),
            })
            .collect();

        let mut build_mappings = Vec::new();
        for mapping in plan.build_mappings.iter().flatten() {
            let environment_slug =
                normalize_environment_slug(&plan.project_slug, &mapping.environment_slug)
                    .to_string();
            let branch = environment_mappings
                .iter()
                .find(|m| m.environment_slug == environment_slug)
                .map(|m| m.branch.clone())
                .ok_or_else(|| {
                    ProviderError::Validation(format!(
                        "could not find branch for build mapping for environment slug {}",
                        mapping.environment_slug
                    ))
                })?;
            build_mappings.push(BuildMapping {
                environment_slug,
                provider: mapping.provider.to_ascii_uppercase(),
                integration_slug: mapping.integration_slug.clone(),
                build_name: mapping.build_name.clone(),
                job_name: mapping.job_name.clone(),
                project_key: mapping
                    .project_key
                    .clone()
                    .or_else(|| mapping.project_name.clone()),
                match_branch_to_environment: mapping.match_branch_to_environment,
                is_custom: mapping.is_custom,
                build_branch: Some(branch),
            });
        }

        Ok(MutableCodeChangeSource {
            name: plan.name.clone(),
            repository: RepositoryInput {
                owner: plan.repository.owner.clone(),
                name: plan.repository.name.clone(),
                url: plan.repository.url.clone(),
                provider: plan.repository.provider.to_ascii_uppercase(),
                integration_slug: plan.repository.integration_slug.clone(),
                project_uid: plan.repository.project_uid.clone(),
                repo_uid: plan.repository.repo_uid.clone(),
            },
            environment_mappings,
            build_mappings,
            deploy_tracking_type: plan.deploy_tracking_type.clone(),
            collect_impact: plan.collect_impact,
            notify_in_slack: plan.notify_in_slack,
            include_in_dashboard: plan.include_in_dashboard,
            path_prefix: plan.path_prefix.clone(),
            auto_tracking_delay: plan.auto_tracking_delay,
        })
    }

    /// Materialize state from the remote record, folding in the plan-side
    /// facts the API does not echo.
    fn state_from(
        project_slug: &str,
        remote: CodeChangeSource,
        reference: &StateReference,
    ) -> CodeChangeSourceState {
        let webhook = remote.repository.webhook.map(|w: Webhook| WebhookBlock {
            url: w.url,
            secret: w.secret,
        });

        let repository = RepositoryStateBlock {
            owner: remote.repository.owner,
            name: remote.repository.name,
            url: remote.repository.url,
            provider: reference
                .repo_provider
                .clone()
                .unwrap_or(remote.repository.provider),
            integration_slug: remote.repository.integration_slug,
            project_uid: remote.repository.project_uid,
            repo_uid: remote.repository.repo_uid,
            webhook,
        };

        let mapped: Vec<BuildMappingStateBlock> = remote
            .build_mappings
            .into_iter()
            .map(|m| {
                let build_ref = reference.build_ref(&m.environment_slug, &m.build_name);
                BuildMappingStateBlock {
                    environment_slug: m.environment_slug,
                    provider: build_ref
                        .map(|r| r.provider.clone())
                        .unwrap_or(m.provider),
                    integration_slug: m.integration_slug,
                    build_name: m.build_name,
                    job_name: m.job_name,
                    project_key: match build_ref {
                        Some(r) if !r.project_key_present => None,
                        _ => m.project_key,
                    },
                    project_name: build_ref.and_then(|r| r.project_name.clone()),
                    match_branch_to_environment: m.match_branch_to_environment,
                    is_custom: m.is_custom,
                    build_branch: m.build_branch.unwrap_or_default(),
                }
            })
            .collect();
        // An empty remote list stays null unless the plan declared the
        // attribute; writing [] where the plan has null is a diff.
        let build_mappings = if mapped.is_empty() && !reference.build_mappings_present {
            None
        } else {
            Some(mapped)
        };

        CodeChangeSourceState {
            id: format!("{project_slug}/{}", remote.slug),
            project_slug: project_slug.to_string(),
            slug: remote.slug,
            name: remote.name,
            repository,
            environment_mappings: remote
                .environment_mappings
                .into_iter()
                .map(|m| EnvironmentMappingBlock {
                    environment_slug: m.environment_slug,
                    branch: m.branch,
                })
                .collect(),
            build_mappings,
            deploy_tracking_type: remote.deploy_tracking_type,
            collect_impact: remote.collect_impact,
            notify_in_slack: remote.notify_in_slack,
            include_in_dashboard: remote.include_in_dashboard,
            path_prefix: remote.path_prefix,
            auto_tracking_delay: remote.auto_tracking_delay,
        }
    }
}

#[async_trait]
impl ResourceLifecycle for CodeChangeSourceResource {
    type Plan = CodeChangeSourcePlan;
    type State = CodeChangeSourceState;

    fn type_name(&self) -> &'static str {
        "sleuth_code_change_source"
    }

    fn schema(&self) -> Schema {
        let repository_block = vec![
            Attribute::required("owner", AttrType::String),
            Attribute::required("name", AttrType::String),
            Attribute::required("url", AttrType::String),
            Attribute::required("provider", AttrType::String).describe(
                "GITHUB, GITHUB_ENTERPRISE, GITLAB, BITBUCKET, AZURE or CUSTOM_GIT. \
                 Stored with the spelling used in the configuration.",
            ),
            Attribute::optional("integration_slug", AttrType::String),
            Attribute::optional("project_uid", AttrType::String),
            Attribute::optional("repo_uid", AttrType::String),
            Attribute::computed("webhook", AttrType::Block).with_block(vec![
                Attribute::computed("url", AttrType::String),
                Attribute::computed("secret", AttrType::String),
            ]),
        ];
        let environment_mapping_block = vec![
            Attribute::required("environment_slug", AttrType::String),
            Attribute::required("branch", AttrType::String),
        ];
        let build_mapping_block = vec![
            Attribute::required("environment_slug", AttrType::String),
            Attribute::required("provider", AttrType::String),
            Attribute::optional("integration_slug", AttrType::String),
            Attribute::required("build_name", AttrType::String),
            Attribute::optional("job_name", AttrType::String),
            Attribute::optional("project_key", AttrType::String),
            Attribute::optional("project_name", AttrType::String),
            Attribute::optional("match_branch_to_environment", AttrType::Bool)
                .with_default(true),
            Attribute::optional("is_custom", AttrType::Bool).with_default(false),
            Attribute::computed("build_branch", AttrType::String)
                .describe("Inherited from the environment mapping with the same slug."),
        ];
        Schema::new(
            "A repository plus branch and build mappings bound to a project. \
             Sort mappings by environment_slug ascending to avoid plan churn.",
            vec![
                Attribute::computed("id", AttrType::String),
                Attribute::computed("slug", AttrType::String),
                Attribute::required("project_slug", AttrType::String),
                Attribute::required("name", AttrType::String),
                Attribute::required("repository", AttrType::Block).with_block(repository_block),
                Attribute::required("environment_mappings", AttrType::BlockList)
                    .with_block(environment_mapping_block),
                Attribute::optional("build_mappings", AttrType::BlockList)
                    .with_block(build_mapping_block),
                Attribute::required("deploy_tracking_type", AttrType::String)
                    .describe("build, manual, auto_pr, auto_tag or auto_push."),
                Attribute::optional("collect_impact", AttrType::Bool).with_default(true),
                Attribute::optional("notify_in_slack", AttrType::Bool).with_default(true),
                Attribute::optional("include_in_dashboard", AttrType::Bool).with_default(true),
                Attribute::optional("path_prefix", AttrType::String)
                    .describe("JSON path filter for monorepos."),
                Attribute::optional("auto_tracking_delay", AttrType::Int).with_default(0),
            ],
        )
    }

    async fn create(&self, ctx: &OpContext, plan: Self::Plan) -> ProviderResult<Self::State> {
        Self::validate(&plan)?;
        let fields = Self::mutable_fields(&plan)?;
        let reference = StateReference::from_plan(&plan);
        let source = ctx
            .api
            .create_code_change_source(CreateCodeChangeSourceInput {
                project_slug: plan.project_slug.clone(),
                initialize_changes: true,
                fields,
            })
            .await?;
        Ok(Self::state_from(&plan.project_slug, source, &reference))
    }

    async fn read(
        &self,
        ctx: &OpContext,
        state: Self::State,
    ) -> ProviderResult<Option<Self::State>> {
        let Some(source) = ctx
            .api
            .get_code_change_source(&state.project_slug, &state.slug)
            .await?
        else {
            return Ok(None);
        };
        let reference = StateReference::from_state(&state);
        Ok(Some(Self::state_from(
            &state.project_slug,
            source,
            &reference,
        )))
    }

    async fn update(
        &self,
        ctx: &OpContext,
        plan: Self::Plan,
        state: Self::State,
    ) -> ProviderResult<Self::State> {
        Self::validate(&plan)?;
        let fields = Self::mutable_fields(&plan)?;
        let reference = StateReference::from_plan(&plan);
        let source = ctx
            .api
            .update_code_change_source(UpdateCodeChangeSourceInput {
                project_slug: state.project_slug.clone(),
                slug: state.slug.clone(),
                fields,
            })
            .await?;
        Ok(Self::state_from(&state.project_slug, source, &reference))
    }

    async fn delete(&self, ctx: &OpContext, state: Self::State) -> ProviderResult<()> {
        // Deleting a source that is still initializing fails remotely and
        // is surfaced as-is; there is no retry.
        let payload = ctx
            .api
            .delete_change_source(&state.project_slug, &state.slug)
            .await?;
        resolve_delete(payload)
    }

    async fn import(&self, ctx: &OpContext, id: &str) -> ProviderResult<Self::State> {
        let (project_slug, slug) = parse_composite_id(id)?;
        let Some(source) = ctx.api.get_code_change_source(&project_slug, &slug).await? else {
            return Err(ProviderError::NotFound);
        };
        Ok(Self::state_from(
            &project_slug,
            source,
            &StateReference::default(),
        ))
    }
}
