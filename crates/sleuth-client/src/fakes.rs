//! In-memory fake of the Sleuth API (testing only)
//!
//! `InMemorySleuth` satisfies the [`SleuthApi`] contract without any
//! network, including the server-side quirks the adapters are built
//! around:
//! - every project is created with an auto-generated "Production"
//!   environment;
//! - deleting a project's last environment cascade-deletes the project,
//!   so a later project delete reports `success=false` / "Missing";
//! - code change sources and incident impact sources are handed minted
//!   webhooks;
//! - build mappings echo `projectKey` only;
//! - team membership is an ordered set of opaque user IDs mutated through
//!   the dedicated add/remove calls, which are recorded for assertions.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::api::SleuthApi;
use crate::error::{ApiError, ApiResult};
use crate::model::*;

/// A recorded membership mutation, for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberCall {
    Add { team_slug: String, ids: Vec<String> },
    Remove { team_slug: String, ids: Vec<String> },
}

#[derive(Debug, Default)]
struct FakeState {
    projects: HashMap<String, Project>,
    environments: HashMap<String, Vec<Environment>>,
    change_sources: HashMap<String, Vec<CodeChangeSource>>,
    error_sources: HashMap<String, Vec<ErrorImpactSource>>,
    metric_sources: HashMap<String, Vec<MetricImpactSource>>,
    incident_sources: HashMap<String, Vec<IncidentImpactSource>>,
    teams: HashMap<String, Team>,
    memberships: HashMap<String, Vec<String>>,
    users: Vec<User>,
    member_calls: Vec<MemberCall>,
}

/// In-memory Sleuth server backed by `Mutex<HashMap>`s.
#[derive(Debug, Default)]
pub struct InMemorySleuth {
    state: Mutex<FakeState>,
}

/// Server-side slug derivation: lower-case, runs of non-alphanumerics
/// collapsed to single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

fn unique_slug(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn mint_webhook() -> Webhook {
    Webhook {
        url: format!("https://app.sleuth.io/wh/{}", Uuid::new_v4()),
        secret: Uuid::new_v4().simple().to_string(),
    }
}

fn missing() -> DeletePayload {
    DeletePayload {
        success: false,
        message: Some("Missing".to_string()),
    }
}

fn deleted() -> DeletePayload {
    DeletePayload {
        success: true,
        message: None,
    }
}

impl InMemorySleuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an organization user and return its record.
    pub fn seed_user(&self, email: &str) -> User {
        let user = User {
            id: Uuid::new_v4().simple().to_string(),
            email: email.to_string(),
            name: None,
        };
        let mut state = self.state.lock().unwrap();
        state.users.push(user.clone());
        user
    }

    /// Every membership mutation issued so far, in order.
    pub fn member_calls(&self) -> Vec<MemberCall> {
        self.state.lock().unwrap().member_calls.clone()
    }

    /// Direct view of an environment, for asserting adoption semantics.
    pub fn environment_snapshot(&self, project_slug: &str, slug: &str) -> Option<Environment> {
        let state = self.state.lock().unwrap();
        state
            .environments
            .get(project_slug)?
            .iter()
            .find(|e| e.slug == slug)
            .cloned()
    }

    /// Whether a project currently exists on the fake server.
    pub fn project_exists(&self, slug: &str) -> bool {
        self.state.lock().unwrap().projects.contains_key(slug)
    }

    fn purge_project(state: &mut FakeState, slug: &str) {
        state.projects.remove(slug);
        state.environments.remove(slug);
        state.change_sources.remove(slug);
        state.error_sources.remove(slug);
        state.metric_sources.remove(slug);
        state.incident_sources.remove(slug);
    }

    fn require_project(state: &FakeState, slug: &str) -> ApiResult<()> {
        if state.projects.contains_key(slug) {
            Ok(())
        } else {
            Err(ApiError::remote(format!("Project {slug} not found")))
        }
    }

    fn environment_ref(state: &FakeState, project_slug: &str, slug: &str) -> ApiResult<EnvironmentRef> {
        state
            .environments
            .get(project_slug)
            .and_then(|envs| envs.iter().find(|e| e.slug == slug))
            .map(|e| EnvironmentRef {
                name: e.name.clone(),
                slug: e.slug.clone(),
            })
            .ok_or_else(|| ApiError::remote(format!("Environment {slug} not found")))
    }

    fn environment_ref_by_name(
        state: &FakeState,
        project_slug: &str,
        name: &str,
    ) -> ApiResult<EnvironmentRef> {
        state
            .environments
            .get(project_slug)
            .and_then(|envs| envs.iter().find(|e| e.name == name))
            .map(|e| EnvironmentRef {
                name: e.name.clone(),
                slug: e.slug.clone(),
            })
            .ok_or_else(|| ApiError::remote(format!("Environment {name} not found")))
    }
}

#[async_trait]
impl SleuthApi for InMemorySleuth {
    // -- projects ----------------------------------------------------------

    async fn create_project(&self, input: CreateProjectInput) -> ApiResult<Project> {
        let mut state = self.state.lock().unwrap();
        let slug = unique_slug(&slugify(&input.fields.name), |s| {
            state.projects.contains_key(s)
        });
        let project = Project {
            name: input.fields.name,
            slug: slug.clone(),
            description: input.fields.description,
            issue_tracker_provider: input.fields.issue_tracker_provider,
            build_provider: input.fields.build_provider,
            change_failure_rate_boundary: input.fields.change_failure_rate_boundary,
            impact_sensitivity: input.fields.impact_sensitivity,
            failure_sensitivity: input.fields.failure_sensitivity,
            change_lead_time_start_definition: input.fields.change_lead_time_start_definition,
            change_lead_time_issue_states: input.fields.change_lead_time_issue_states,
            change_lead_time_strict_matching: input.fields.change_lead_time_strict_matching,
        };
        state.projects.insert(slug.clone(), project.clone());
        // The server seeds every project with a Production environment.
        state.environments.insert(
            slug,
            vec![Environment {
                name: "Production".to_string(),
                slug: "production".to_string(),
                description: None,
                color: Some("#cecece".to_string()),
            }],
        );
        Ok(project)
    }

    async fn get_project(&self, slug: &str) -> ApiResult<Option<Project>> {
        let state = self.state.lock().unwrap();
        Ok(state.projects.get(slug).cloned())
    }

    async fn update_project(&self, input: UpdateProjectInput) -> ApiResult<Project> {
        let mut state = self.state.lock().unwrap();
        let project = state
            .projects
            .get_mut(&input.slug)
            .ok_or_else(|| ApiError::remote(format!("Project {} not found", input.slug)))?;
        project.name = input.fields.name;
        project.description = input.fields.description;
        project.issue_tracker_provider = input.fields.issue_tracker_provider;
        project.build_provider = input.fields.build_provider;
        project.change_failure_rate_boundary = input.fields.change_failure_rate_boundary;
        project.impact_sensitivity = input.fields.impact_sensitivity;
        project.failure_sensitivity = input.fields.failure_sensitivity;
        project.change_lead_time_start_definition = input.fields.change_lead_time_start_definition;
        project.change_lead_time_issue_states = input.fields.change_lead_time_issue_states;
        project.change_lead_time_strict_matching = input.fields.change_lead_time_strict_matching;
        Ok(project.clone())
    }

    async fn delete_project(&self, slug: &str) -> ApiResult<DeletePayload> {
        let mut state = self.state.lock().unwrap();
        if !state.projects.contains_key(slug) {
            return Ok(missing());
        }
        Self::purge_project(&mut state, slug);
        Ok(deleted())
    }

    // -- environments ------------------------------------------------------

    async fn create_environment(&self, input: CreateEnvironmentInput) -> ApiResult<Environment> {
        let mut state = self.state.lock().unwrap();
        Self::require_project(&state, &input.project_slug)?;
        let envs = state
            .environments
            .entry(input.project_slug.clone())
            .or_default();
        let slug = unique_slug(&slugify(&input.fields.name), |s| {
            envs.iter().any(|e| e.slug == s)
        });
        let environment = Environment {
            name: input.fields.name,
            slug,
            description: input.fields.description,
            color: input.fields.color.or_else(|| Some("#cecece".to_string())),
        };
        envs.push(environment.clone());
        Ok(environment)
    }

    async fn get_environment(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<Option<Environment>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .environments
            .get(project_slug)
            .and_then(|envs| envs.iter().find(|e| e.slug == slug))
            .cloned())
    }

    async fn get_environment_by_name(
        &self,
        project_slug: &str,
        name: &str,
    ) -> ApiResult<Option<Environment>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .environments
            .get(project_slug)
            .and_then(|envs| envs.iter().find(|e| e.name == name))
            .cloned())
    }

    async fn update_environment(&self, input: UpdateEnvironmentInput) -> ApiResult<Environment> {
        let mut state = self.state.lock().unwrap();
        let environment = state
            .environments
            .get_mut(&input.project_slug)
            .and_then(|envs| envs.iter_mut().find(|e| e.slug == input.slug))
            .ok_or_else(|| ApiError::remote(format!("Environment {} not found", input.slug)))?;
        environment.name = input.fields.name;
        environment.description = input.fields.description;
        if let Some(color) = input.fields.color {
            environment.color = Some(color);
        }
        Ok(environment.clone())
    }

    async fn delete_environment(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<DeletePayload> {
        let mut state = self.state.lock().unwrap();
        let Some(envs) = state.environments.get_mut(project_slug) else {
            return Ok(missing());
        };
        let before = envs.len();
        envs.retain(|e| e.slug != slug);
        if envs.len() == before {
            return Ok(missing());
        }
        // Removing the last environment cascade-deletes the project.
        if envs.is_empty() {
            Self::purge_project(&mut state, project_slug);
        }
        Ok(deleted())
    }

    // -- code change sources -----------------------------------------------

    async fn create_code_change_source(
        &self,
        input: CreateCodeChangeSourceInput,
    ) -> ApiResult<CodeChangeSource> {
        let mut state = self.state.lock().unwrap();
        Self::require_project(&state, &input.project_slug)?;
        let sources = state
            .change_sources
            .entry(input.project_slug.clone())
            .or_default();
        let slug = unique_slug(&slugify(&input.fields.name), |s| {
            sources.iter().any(|cs| cs.slug == s)
        });
        let fields = input.fields;
        let source = CodeChangeSource {
            name: fields.name,
            slug,
            repository: Repository {
                owner: fields.repository.owner,
                name: fields.repository.name,
                url: fields.repository.url,
                provider: fields.repository.provider,
                integration_slug: fields.repository.integration_slug,
                project_uid: fields.repository.project_uid,
                repo_uid: fields.repository.repo_uid,
                webhook: Some(mint_webhook()),
            },
            environment_mappings: fields.environment_mappings,
            build_mappings: fields.build_mappings,
            deploy_tracking_type: fields.deploy_tracking_type,
            collect_impact: fields.collect_impact,
            notify_in_slack: fields.notify_in_slack,
            include_in_dashboard: fields.include_in_dashboard,
            path_prefix: fields.path_prefix,
            auto_tracking_delay: fields.auto_tracking_delay,
        };
        sources.push(source.clone());
        Ok(source)
    }

    async fn get_code_change_source(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<Option<CodeChangeSource>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .change_sources
            .get(project_slug)
            .and_then(|sources| sources.iter().find(|cs| cs.slug == slug))
            .cloned())
    }

    async fn update_code_change_source(
        &self,
        input: UpdateCodeChangeSourceInput,
    ) -> ApiResult<CodeChangeSource> {
        let mut state = self.state.lock().unwrap();
        let source = state
            .change_sources
            .get_mut(&input.project_slug)
            .and_then(|sources| sources.iter_mut().find(|cs| cs.slug == input.slug))
            .ok_or_else(|| ApiError::remote(format!("Change source {} not found", input.slug)))?;
        let fields = input.fields;
        let webhook = source.repository.webhook.clone();
        source.name = fields.name;
        source.repository = Repository {
            owner: fields.repository.owner,
            name: fields.repository.name,
            url: fields.repository.url,
            provider: fields.repository.provider,
            integration_slug: fields.repository.integration_slug,
            project_uid: fields.repository.project_uid,
            repo_uid: fields.repository.repo_uid,
            webhook,
        };
        source.environment_mappings = fields.environment_mappings;
        source.build_mappings = fields.build_mappings;
        source.deploy_tracking_type = fields.deploy_tracking_type;
        source.collect_impact = fields.collect_impact;
        source.notify_in_slack = fields.notify_in_slack;
        source.include_in_dashboard = fields.include_in_dashboard;
        source.path_prefix = fields.path_prefix;
        source.auto_tracking_delay = fields.auto_tracking_delay;
        Ok(source.clone())
    }

    async fn delete_change_source(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<DeletePayload> {
        let mut state = self.state.lock().unwrap();
        let Some(sources) = state.change_sources.get_mut(project_slug) else {
            return Ok(missing());
        };
        let before = sources.len();
        sources.retain(|cs| cs.slug != slug);
        if sources.len() == before {
            return Ok(missing());
        }
        Ok(deleted())
    }

    // -- error impact sources ----------------------------------------------

    async fn create_error_impact_source(
        &self,
        input: CreateErrorImpactSourceInput,
    ) -> ApiResult<ErrorImpactSource> {
        let mut state = self.state.lock().unwrap();
        Self::require_project(&state, &input.project_slug)?;
        let environment =
            Self::environment_ref(&state, &input.project_slug, &input.fields.environment_slug)?;
        let sources = state
            .error_sources
            .entry(input.project_slug.clone())
            .or_default();
        let slug = unique_slug(&slugify(&input.fields.name), |s| {
            sources.iter().any(|src| src.slug == s)
        });
        let fields = input.fields;
        let source = ErrorImpactSource {
            name: fields.name,
            slug,
            environment,
            provider: fields.provider,
            error_org_key: fields.error_org_key,
            error_project_key: fields.error_project_key,
            error_environment: fields.error_environment,
            manually_set_health_threshold: fields.manually_set_health_threshold,
            integration_slug: fields.integration_slug,
        };
        sources.push(source.clone());
        Ok(source)
    }

    async fn get_error_impact_source(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<Option<ErrorImpactSource>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .error_sources
            .get(project_slug)
            .and_then(|sources| sources.iter().find(|src| src.slug == slug))
            .cloned())
    }

    async fn update_error_impact_source(
        &self,
        input: UpdateErrorImpactSourceInput,
    ) -> ApiResult<ErrorImpactSource> {
        let mut state = self.state.lock().unwrap();
        let environment =
            Self::environment_ref(&state, &input.project_slug, &input.fields.environment_slug)?;
        let source = state
            .error_sources
            .get_mut(&input.project_slug)
            .and_then(|sources| sources.iter_mut().find(|src| src.slug == input.slug))
            .ok_or_else(|| ApiError::remote(format!("Impact source {} not found", input.slug)))?;
        let fields = input.fields;
        source.name = fields.name;
        source.environment = environment;
        source.provider = fields.provider;
        source.error_org_key = fields.error_org_key;
        source.error_project_key = fields.error_project_key;
        source.error_environment = fields.error_environment;
        source.manually_set_health_threshold = fields.manually_set_health_threshold;
        source.integration_slug = fields.integration_slug;
        Ok(source.clone())
    }

    // -- metric impact sources ---------------------------------------------

    async fn create_metric_impact_source(
        &self,
        input: CreateMetricImpactSourceInput,
    ) -> ApiResult<MetricImpactSource> {
        let mut state = self.state.lock().unwrap();
        Self::require_project(&state, &input.project_slug)?;
        let environment =
            Self::environment_ref(&state, &input.project_slug, &input.fields.environment_slug)?;
        let sources = state
            .metric_sources
            .entry(input.project_slug.clone())
            .or_default();
        let slug = unique_slug(&slugify(&input.fields.name), |s| {
            sources.iter().any(|src| src.slug == s)
        });
        let fields = input.fields;
        let source = MetricImpactSource {
            name: fields.name,
            slug,
            environment,
            provider: fields.provider,
            query: fields.query,
            less_is_better: fields.less_is_better,
            manually_set_health_threshold: fields.manually_set_health_threshold,
            integration_slug: fields.integration_slug,
        };
        sources.push(source.clone());
        Ok(source)
    }

    async fn get_metric_impact_source(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<Option<MetricImpactSource>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .metric_sources
            .get(project_slug)
            .and_then(|sources| sources.iter().find(|src| src.slug == slug))
            .cloned())
    }

    async fn update_metric_impact_source(
        &self,
        input: UpdateMetricImpactSourceInput,
    ) -> ApiResult<MetricImpactSource> {
        let mut state = self.state.lock().unwrap();
        let environment =
            Self::environment_ref(&state, &input.project_slug, &input.fields.environment_slug)?;
        let source = state
            .metric_sources
            .get_mut(&input.project_slug)
            .and_then(|sources| sources.iter_mut().find(|src| src.slug == input.slug))
            .ok_or_else(|| ApiError::remote(format!("Impact source {} not found", input.slug)))?;
        let fields = input.fields;
        source.name = fields.name;
        source.environment = environment;
        source.provider = fields.provider;
        source.query = fields.query;
        source.less_is_better = fields.less_is_better;
        source.manually_set_health_threshold = fields.manually_set_health_threshold;
        source.integration_slug = fields.integration_slug;
        Ok(source.clone())
    }

    // -- incident impact sources -------------------------------------------

    async fn create_incident_impact_source(
        &self,
        input: CreateIncidentImpactSourceInput,
    ) -> ApiResult<IncidentImpactSource> {
        let mut state = self.state.lock().unwrap();
        Self::require_project(&state, &input.project_slug)?;
        let environment = Self::environment_ref_by_name(
            &state,
            &input.project_slug,
            &input.fields.environment_name,
        )?;
        let sources = state
            .incident_sources
            .entry(input.project_slug.clone())
            .or_default();
        let slug = unique_slug(&slugify(&input.fields.name), |s| {
            sources.iter().any(|src| src.slug == s)
        });
        let details = input.fields.active_details();
        let source = IncidentImpactSource {
            name: input.fields.name,
            slug,
            environment,
            provider: input.fields.provider,
            register_impact_link: Some(format!(
                "https://app.sleuth.io/impact/register/{}",
                Uuid::new_v4().simple()
            )),
            details,
        };
        sources.push(source.clone());
        Ok(source)
    }

    async fn get_incident_impact_source(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<Option<IncidentImpactSource>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .incident_sources
            .get(project_slug)
            .and_then(|sources| sources.iter().find(|src| src.slug == slug))
            .cloned())
    }

    async fn update_incident_impact_source(
        &self,
        input: UpdateIncidentImpactSourceInput,
    ) -> ApiResult<IncidentImpactSource> {
        let mut state = self.state.lock().unwrap();
        let environment = Self::environment_ref_by_name(
            &state,
            &input.project_slug,
            &input.fields.environment_name,
        )?;
        let source = state
            .incident_sources
            .get_mut(&input.project_slug)
            .and_then(|sources| sources.iter_mut().find(|src| src.slug == input.slug))
            .ok_or_else(|| ApiError::remote(format!("Impact source {} not found", input.slug)))?;
        source.name = input.fields.name.clone();
        source.environment = environment;
        source.provider = input.fields.provider.clone();
        source.details = input.fields.active_details();
        Ok(source.clone())
    }

    async fn delete_impact_source(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<DeletePayload> {
        fn remove_by_slug<T>(
            sources: Option<&mut Vec<T>>,
            matches: impl Fn(&T) -> bool,
        ) -> bool {
            let Some(sources) = sources else {
                return false;
            };
            let before = sources.len();
            sources.retain(|src| !matches(src));
            sources.len() != before
        }

        let mut state = self.state.lock().unwrap();
        if remove_by_slug(state.error_sources.get_mut(project_slug), |s| s.slug == slug)
            || remove_by_slug(state.metric_sources.get_mut(project_slug), |s| {
                s.slug == slug
            })
            || remove_by_slug(state.incident_sources.get_mut(project_slug), |s| {
                s.slug == slug
            })
        {
            return Ok(deleted());
        }
        Ok(missing())
    }

    // -- teams -------------------------------------------------------------

    async fn create_team(&self, input: CreateTeamInput) -> ApiResult<Team> {
        let mut state = self.state.lock().unwrap();
        if let Some(parent) = &input.parent_team_slug {
            if !state.teams.contains_key(parent) {
                return Err(ApiError::remote(format!("Team {parent} not found")));
            }
        }
        let slug = unique_slug(&slugify(&input.name), |s| state.teams.contains_key(s));
        let team = Team {
            name: input.name,
            slug: slug.clone(),
            parent_slug: input.parent_team_slug,
        };
        state.teams.insert(slug.clone(), team.clone());
        state.memberships.insert(slug, Vec::new());
        Ok(team)
    }

    async fn get_team(&self, slug: &str) -> ApiResult<Team> {
        let state = self.state.lock().unwrap();
        state
            .teams
            .get(slug)
            .cloned()
            .ok_or_else(|| ApiError::remote(format!("Team {slug} not found")))
    }

    async fn update_team(&self, input: UpdateTeamInput) -> ApiResult<Team> {
        let mut state = self.state.lock().unwrap();
        if let Some(parent) = &input.parent_team_slug {
            if !state.teams.contains_key(parent) {
                return Err(ApiError::remote(format!("Team {parent} not found")));
            }
        }
        let team = state
            .teams
            .get_mut(&input.slug)
            .ok_or_else(|| ApiError::remote(format!("Team {} not found", input.slug)))?;
        team.name = input.name;
        team.parent_slug = input.parent_team_slug;
        Ok(team.clone())
    }

    async fn delete_team(&self, slug: &str) -> ApiResult<DeletePayload> {
        let mut state = self.state.lock().unwrap();
        if state.teams.remove(slug).is_none() {
            return Ok(DeletePayload {
                success: false,
                message: Some(format!("Team {slug} not found")),
            });
        }
        state.memberships.remove(slug);
        Ok(deleted())
    }

    async fn add_team_members(&self, slug: &str, member_ids: &[String]) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state.teams.contains_key(slug) {
            return Err(ApiError::remote(format!("Team {slug} not found")));
        }
        let unknown: Vec<&String> = member_ids
            .iter()
            .filter(|id| !state.users.iter().any(|u| &u.id == *id))
            .collect();
        if !unknown.is_empty() {
            return Err(ApiError::remote(format!(
                "Unknown member ids: {unknown:?}"
            )));
        }
        state.member_calls.push(MemberCall::Add {
            team_slug: slug.to_string(),
            ids: member_ids.to_vec(),
        });
        let members = state.memberships.entry(slug.to_string()).or_default();
        for id in member_ids {
            if !members.contains(id) {
                members.push(id.clone());
            }
        }
        Ok(())
    }

    async fn remove_team_members(&self, slug: &str, member_ids: &[String]) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state.teams.contains_key(slug) {
            return Err(ApiError::remote(format!("Team {slug} not found")));
        }
        state.member_calls.push(MemberCall::Remove {
            team_slug: slug.to_string(),
            ids: member_ids.to_vec(),
        });
        let members = state.memberships.entry(slug.to_string()).or_default();
        members.retain(|id| !member_ids.contains(id));
        Ok(())
    }

    async fn team_members(&self, slug: &str) -> ApiResult<Vec<User>> {
        let state = self.state.lock().unwrap();
        let Some(members) = state.memberships.get(slug) else {
            return Err(ApiError::remote(format!("Team {slug} not found")));
        };
        Ok(members
            .iter()
            .filter_map(|id| state.users.iter().find(|u| &u.id == id))
            .cloned()
            .collect())
    }

    async fn find_users_by_email(&self, emails: &[String]) -> ApiResult<Vec<User>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .filter(|u| emails.contains(&u.email))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_punctuation() {
        assert_eq!(slugify("My Project"), "my-project");
        assert_eq!(slugify("  Spaced -- Out  "), "spaced-out");
        assert_eq!(slugify("Production"), "production");
    }

    #[test]
    fn test_unique_slug_appends_counter() {
        let taken = ["api", "api-2"];
        let slug = unique_slug("api", |s| taken.contains(&s));
        assert_eq!(slug, "api-3");
    }
}
