//! GraphQL-backed implementation of [`SleuthApi`]
//!
//! One query or mutation document per operation, built from shared
//! selection-set fragments so entity records and documents stay in sync.
//! Responses are converted to `model` types at the boundary; mutation
//! payload `errors` collections are flattened into [`ApiError::Remote`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::api::SleuthApi;
use crate::error::{ApiError, ApiResult};
use crate::model::*;
use crate::transport::GraphQlTransport;

/// Page size for paginated member/user queries.
const PAGE_SIZE: u32 = 100;

// Selection-set fragments shared between queries and mutation payloads.
const PROJECT_FIELDS: &str = "name slug description issueTrackerProvider buildProvider \
     changeFailureRateBoundary impactSensitivity failureSensitivity \
     changeLeadTimeStartDefinition changeLeadTimeIssueStates changeLeadTimeStrictMatching";

const ENVIRONMENT_FIELDS: &str = "name slug description color";

const ENVIRONMENT_REF_FIELDS: &str = "name slug";

const REPOSITORY_FIELDS: &str = "owner name url provider integrationSlug projectUid repoUid \
     webhook { url secret }";

const ENVIRONMENT_MAPPING_FIELDS: &str = "environmentSlug branch";

const BUILD_MAPPING_FIELDS: &str = "environmentSlug provider integrationSlug buildName jobName \
     projectKey matchBranchToEnvironment isCustom buildBranch";

const ERROR_SOURCE_FIELDS: &str = "name slug provider errorOrgKey errorProjectKey \
     errorEnvironment manuallySetHealthThreshold integrationSlug";

const METRIC_SOURCE_FIELDS: &str =
    "name slug provider query lessIsBetter manuallySetHealthThreshold integrationSlug";

const TEAM_FIELDS: &str = "name slug parentSlug";

const USER_FIELDS: &str = "id email name";

const DELETE_FIELDS: &str = "success message";

const MUTATION_ERROR_FIELDS: &str = "errors { field messages }";

/// Inline-fragment selection for the incident details union. The concrete
/// variant is chosen by `__typename` when decoding.
const INCIDENT_DETAILS_FIELDS: &str = "details { __typename \
     ... on PagerDutyProviderData { remoteServices remoteUrgency } \
     ... on DataDogProviderData { query remotePriorityThreshold integrationSlug } \
     ... on JiraProviderData { remoteJql integrationSlug } \
     ... on BlamelessProviderData { remoteTypes remoteSeverityThreshold integrationSlug } \
     ... on StatuspageProviderData { remotePage remoteComponent remoteImpact integrationSlug } \
     ... on OpsGenieProviderData { remotePriorityThreshold remoteUseAlerts remoteIncidentTags remoteAlertTags integrationSlug } \
     ... on FireHydrantProviderData { remoteMitigatedIsHealthy remoteEnvironments integrationSlug } \
     ... on ClubhouseProviderData { remoteQuery integrationSlug } }";

fn change_source_fields() -> String {
    format!(
        "name slug deployTrackingType collectImpact notifyInSlack includeInDashboard \
         pathPrefix autoTrackingDelay \
         repository {{ {REPOSITORY_FIELDS} }} \
         environmentMappings {{ {ENVIRONMENT_MAPPING_FIELDS} }} \
         buildMappings {{ {BUILD_MAPPING_FIELDS} }}"
    )
}

fn incident_source_fields() -> String {
    format!(
        "name slug provider registerImpactLink \
         environment {{ {ENVIRONMENT_REF_FIELDS} }} {INCIDENT_DETAILS_FIELDS}"
    )
}

/// The real Sleuth API over the authenticated GraphQL transport.
///
/// Cloning is cheap; the transport's HTTP client is already shared. One
/// instance serves all concurrent resource operations.
#[derive(Debug, Clone)]
pub struct SleuthClient {
    transport: GraphQlTransport,
}

/// Mutation payload envelope: the entity (absent on failure) alongside the
/// business-level `errors` collection.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct MutationPayload<T> {
    #[serde(
        default,
        alias = "project",
        alias = "environment",
        alias = "changeSource",
        alias = "impactSource",
        alias = "team"
    )]
    entity: Option<T>,
    #[serde(default)]
    errors: Vec<MutationError>,
}

/// Page envelope for member/user list queries.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserPage {
    users: Vec<User>,
    has_next_page: bool,
}

impl SleuthClient {
    pub fn new(transport: GraphQlTransport) -> Self {
        Self { transport }
    }

    /// Execute and pull one named field out of the `data` envelope.
    async fn request_field(
        &self,
        document: &str,
        variables: Value,
        field: &str,
    ) -> ApiResult<Value> {
        let mut data = self.transport.execute(document, variables).await?;
        match data.get_mut(field) {
            Some(value) => Ok(value.take()),
            None => Err(ApiError::Decode(format!(
                "response data missing field {field:?}"
            ))),
        }
    }

    /// Unwrap a mutation payload into its entity, surfacing payload errors
    /// as [`ApiError::Remote`].
    fn entity<T>(payload: MutationPayload<T>, operation: &str) -> ApiResult<T> {
        if !payload.errors.is_empty() {
            return Err(ApiError::Remote {
                messages: MutationError::flatten(&payload.errors),
            });
        }
        payload
            .entity
            .ok_or_else(|| ApiError::Decode(format!("{operation} returned no entity")))
    }

    async fn mutate_entity<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: Value,
        field: &str,
    ) -> ApiResult<T> {
        let raw = self.request_field(document, variables, field).await?;
        let payload: MutationPayload<T> = serde_json::from_value(raw)?;
        Self::entity(payload, field)
    }

    async fn mutate_delete(
        &self,
        document: &str,
        variables: Value,
        field: &str,
    ) -> ApiResult<DeletePayload> {
        let raw = self.request_field(document, variables, field).await?;
        Ok(serde_json::from_value(raw)?)
    }

    /// Page through a member-style query until `hasNextPage` goes false.
    async fn collect_pages<F>(&self, mut fetch_page: F) -> ApiResult<Vec<User>>
    where
        F: FnMut(u32) -> std::pin::Pin<Box<dyn std::future::Future<Output = ApiResult<UserPage>> + Send>>,
    {
        let mut users = Vec::new();
        let mut page = 1;
        loop {
            let chunk = fetch_page(page).await?;
            let done = !chunk.has_next_page;
            users.extend(chunk.users);
            if done {
                return Ok(users);
            }
            page += 1;
        }
    }
}

#[async_trait]
impl SleuthApi for SleuthClient {
    // -- projects ----------------------------------------------------------

    async fn create_project(&self, input: CreateProjectInput) -> ApiResult<Project> {
        let document = format!(
            "mutation CreateProject($input: CreateProjectMutationInput!) {{ \
             createProject(input: $input) {{ project {{ {PROJECT_FIELDS} }} {MUTATION_ERROR_FIELDS} }} }}"
        );
        let project: Project = self
            .mutate_entity(
                &document,
                json!({ "input": serde_json::to_value(&input)? }),
                "createProject",
            )
            .await?;
        debug!(slug = %project.slug, "created project");
        Ok(project)
    }

    async fn get_project(&self, slug: &str) -> ApiResult<Option<Project>> {
        let document = format!(
            "query GetProject($projectSlug: ID!) {{ \
             project(projectSlug: $projectSlug) {{ {PROJECT_FIELDS} }} }}"
        );
        let raw = self
            .request_field(&document, json!({ "projectSlug": slug }), "project")
            .await?;
        Ok(serde_json::from_value(raw)?)
    }

    async fn update_project(&self, input: UpdateProjectInput) -> ApiResult<Project> {
        let document = format!(
            "mutation UpdateProject($input: UpdateProjectMutationInput!) {{ \
             updateProject(input: $input) {{ project {{ {PROJECT_FIELDS} }} {MUTATION_ERROR_FIELDS} }} }}"
        );
        self.mutate_entity(
            &document,
            json!({ "input": serde_json::to_value(&input)? }),
            "updateProject",
        )
        .await
    }

    async fn delete_project(&self, slug: &str) -> ApiResult<DeletePayload> {
        let document = format!(
            "mutation DeleteProject($projectSlug: ID!) {{ \
             deleteProject(projectSlug: $projectSlug) {{ {DELETE_FIELDS} }} }}"
        );
        self.mutate_delete(&document, json!({ "projectSlug": slug }), "deleteProject")
            .await
    }

    // -- environments ------------------------------------------------------

    async fn create_environment(&self, input: CreateEnvironmentInput) -> ApiResult<Environment> {
        let document = format!(
            "mutation CreateEnvironment($input: CreateEnvironmentMutationInput!) {{ \
             createEnvironment(input: $input) {{ environment {{ {ENVIRONMENT_FIELDS} }} {MUTATION_ERROR_FIELDS} }} }}"
        );
        self.mutate_entity(
            &document,
            json!({ "input": serde_json::to_value(&input)? }),
            "createEnvironment",
        )
        .await
    }

    async fn get_environment(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<Option<Environment>> {
        let environments = self.list_environments(project_slug).await?;
        Ok(environments.into_iter().find(|e| e.slug == slug))
    }

    async fn get_environment_by_name(
        &self,
        project_slug: &str,
        name: &str,
    ) -> ApiResult<Option<Environment>> {
        let environments = self.list_environments(project_slug).await?;
        Ok(environments.into_iter().find(|e| e.name == name))
    }

    async fn update_environment(&self, input: UpdateEnvironmentInput) -> ApiResult<Environment> {
        let document = format!(
            "mutation UpdateEnvironment($input: UpdateEnvironmentMutationInput!) {{ \
             updateEnvironment(input: $input) {{ environment {{ {ENVIRONMENT_FIELDS} }} {MUTATION_ERROR_FIELDS} }} }}"
        );
        self.mutate_entity(
            &document,
            json!({ "input": serde_json::to_value(&input)? }),
            "updateEnvironment",
        )
        .await
    }

    async fn delete_environment(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<DeletePayload> {
        let document = format!(
            "mutation DeleteEnvironment($projectSlug: ID!, $environmentSlug: ID!) {{ \
             deleteEnvironment(projectSlug: $projectSlug, environmentSlug: $environmentSlug) {{ {DELETE_FIELDS} }} }}"
        );
        self.mutate_delete(
            &document,
            json!({ "projectSlug": project_slug, "environmentSlug": slug }),
            "deleteEnvironment",
        )
        .await
    }

    // -- code change sources -----------------------------------------------

    async fn create_code_change_source(
        &self,
        input: CreateCodeChangeSourceInput,
    ) -> ApiResult<CodeChangeSource> {
        let fields = change_source_fields();
        let document = format!(
            "mutation CreateCodeChangeSource($input: CreateCodeChangeSourceMutationInput!) {{ \
             createCodeChangeSource(input: $input) {{ changeSource {{ {fields} }} {MUTATION_ERROR_FIELDS} }} }}"
        );
        let source: CodeChangeSource = self
            .mutate_entity(
                &document,
                json!({ "input": serde_json::to_value(&input)? }),
                "createCodeChangeSource",
            )
            .await?;
        debug!(slug = %source.slug, "created code change source");
        Ok(source)
    }

    async fn get_code_change_source(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<Option<CodeChangeSource>> {
        let fields = change_source_fields();
        let document = format!(
            "query GetCodeChangeSource($projectSlug: ID!, $slug: ID!) {{ \
             codeChangeSource(projectSlug: $projectSlug, slug: $slug) {{ {fields} }} }}"
        );
        let raw = self
            .request_field(
                &document,
                json!({ "projectSlug": project_slug, "slug": slug }),
                "codeChangeSource",
            )
            .await?;
        Ok(serde_json::from_value(raw)?)
    }

    async fn update_code_change_source(
        &self,
        input: UpdateCodeChangeSourceInput,
    ) -> ApiResult<CodeChangeSource> {
        let fields = change_source_fields();
        let document = format!(
            "mutation UpdateCodeChangeSource($input: UpdateCodeChangeSourceMutationInput!) {{ \
             updateCodeChangeSource(input: $input) {{ changeSource {{ {fields} }} {MUTATION_ERROR_FIELDS} }} }}"
        );
        self.mutate_entity(
            &document,
            json!({ "input": serde_json::to_value(&input)? }),
            "updateCodeChangeSource",
        )
        .await
    }

    async fn delete_change_source(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<DeletePayload> {
        let document = format!(
            "mutation DeleteChangeSource($projectSlug: ID!, $slug: ID!) {{ \
             deleteChangeSource(projectSlug: $projectSlug, slug: $slug) {{ {DELETE_FIELDS} }} }}"
        );
        self.mutate_delete(
            &document,
            json!({ "projectSlug": project_slug, "slug": slug }),
            "deleteChangeSource",
        )
        .await
    }

    // -- error impact sources ----------------------------------------------

    async fn create_error_impact_source(
        &self,
        input: CreateErrorImpactSourceInput,
    ) -> ApiResult<ErrorImpactSource> {
        let document = format!(
            "mutation CreateErrorImpactSource($input: CreateErrorImpactSourceMutationInput!) {{ \
             createErrorImpactSource(input: $input) {{ \
             impactSource {{ {ERROR_SOURCE_FIELDS} environment {{ {ENVIRONMENT_REF_FIELDS} }} }} {MUTATION_ERROR_FIELDS} }} }}"
        );
        self.mutate_entity(
            &document,
            json!({ "input": serde_json::to_value(&input)? }),
            "createErrorImpactSource",
        )
        .await
    }

    async fn get_error_impact_source(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<Option<ErrorImpactSource>> {
        let document = format!(
            "query GetErrorImpactSource($projectSlug: ID!, $slug: ID!) {{ \
             errorImpactSource(projectSlug: $projectSlug, slug: $slug) {{ \
             {ERROR_SOURCE_FIELDS} environment {{ {ENVIRONMENT_REF_FIELDS} }} }} }}"
        );
        let raw = self
            .request_field(
                &document,
                json!({ "projectSlug": project_slug, "slug": slug }),
                "errorImpactSource",
            )
            .await?;
        Ok(serde_json::from_value(raw)?)
    }

    async fn update_error_impact_source(
        &self,
        input: UpdateErrorImpactSourceInput,
    ) -> ApiResult<ErrorImpactSource> {
        let document = format!(
            "mutation UpdateErrorImpactSource($input: UpdateErrorImpactSourceMutationInput!) {{ \
             updateErrorImpactSource(input: $input) {{ \
             impactSource {{ {ERROR_SOURCE_FIELDS} environment {{ {ENVIRONMENT_REF_FIELDS} }} }} {MUTATION_ERROR_FIELDS} }} }}"
        );
        self.mutate_entity(
            &document,
            json!({ "input": serde_json::to_value(&input)? }),
            "updateErrorImpactSource",
        )
        .await
    }

    // -- metric impact sources ---------------------------------------------

    async fn create_metric_impact_source(
        &self,
        input: CreateMetricImpactSourceInput,
    ) -> ApiResult<MetricImpactSource> {
        let document = format!(
            "mutation CreateMetricImpactSource($input: CreateMetricImpactSourceMutationInput!) {{ \
             createMetricImpactSource(input: $input) {{ \
             impactSource {{ {METRIC_SOURCE_FIELDS} environment {{ {ENVIRONMENT_REF_FIELDS} }} }} {MUTATION_ERROR_FIELDS} }} }}"
        );
        self.mutate_entity(
            &document,
            json!({ "input": serde_json::to_value(&input)? }),
            "createMetricImpactSource",
        )
        .await
    }

    async fn get_metric_impact_source(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<Option<MetricImpactSource>> {
        let document = format!(
            "query GetMetricImpactSource($projectSlug: ID!, $slug: ID!) {{ \
             metricImpactSource(projectSlug: $projectSlug, slug: $slug) {{ \
             {METRIC_SOURCE_FIELDS} environment {{ {ENVIRONMENT_REF_FIELDS} }} }} }}"
        );
        let raw = self
            .request_field(
                &document,
                json!({ "projectSlug": project_slug, "slug": slug }),
                "metricImpactSource",
            )
            .await?;
        Ok(serde_json::from_value(raw)?)
    }

    async fn update_metric_impact_source(
        &self,
        input: UpdateMetricImpactSourceInput,
    ) -> ApiResult<MetricImpactSource> {
        let document = format!(
            "mutation UpdateMetricImpactSource($input: UpdateMetricImpactSourceMutationInput!) {{ \
             updateMetricImpactSource(input: $input) {{ \
             impactSource {{ {METRIC_SOURCE_FIELDS} environment {{ {ENVIRONMENT_REF_FIELDS} }} }} {MUTATION_ERROR_FIELDS} }} }}"
        );
        self.mutate_entity(
            &document,
            json!({ "input": serde_json::to_value(&input)? }),
            "updateMetricImpactSource",
        )
        .await
    }

    // -- incident impact sources -------------------------------------------

    async fn create_incident_impact_source(
        &self,
        input: CreateIncidentImpactSourceInput,
    ) -> ApiResult<IncidentImpactSource> {
        let fields = incident_source_fields();
        let document = format!(
            "mutation CreateIncidentImpactSource($input: CreateIncidentImpactSourceMutationInput!) {{ \
             createIncidentImpactSource(input: $input) {{ impactSource {{ {fields} }} {MUTATION_ERROR_FIELDS} }} }}"
        );
        self.mutate_entity(
            &document,
            json!({ "input": serde_json::to_value(&input)? }),
            "createIncidentImpactSource",
        )
        .await
    }

    async fn get_incident_impact_source(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<Option<IncidentImpactSource>> {
        let fields = incident_source_fields();
        let document = format!(
            "query GetIncidentImpactSources($projectSlug: ID!, $slug: ID!) {{ \
             incidentImpactSources(projectSlug: $projectSlug, slug: $slug) {{ {fields} }} }}"
        );
        let raw = self
            .request_field(
                &document,
                json!({ "projectSlug": project_slug, "slug": slug }),
                "incidentImpactSources",
            )
            .await?;
        // The remote field is a list; a miss is an empty list, not null.
        let sources: Vec<IncidentImpactSource> = serde_json::from_value(raw)?;
        Ok(sources.into_iter().next())
    }

    async fn update_incident_impact_source(
        &self,
        input: UpdateIncidentImpactSourceInput,
    ) -> ApiResult<IncidentImpactSource> {
        let fields = incident_source_fields();
        let document = format!(
            "mutation UpdateIncidentImpactSource($input: UpdateIncidentImpactSourceMutationInput!) {{ \
             updateIncidentImpactSource(input: $input) {{ impactSource {{ {fields} }} {MUTATION_ERROR_FIELDS} }} }}"
        );
        self.mutate_entity(
            &document,
            json!({ "input": serde_json::to_value(&input)? }),
            "updateIncidentImpactSource",
        )
        .await
    }

    async fn delete_impact_source(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<DeletePayload> {
        let document = format!(
            "mutation DeleteImpactSource($projectSlug: ID!, $slug: ID!) {{ \
             deleteImpactSource(projectSlug: $projectSlug, slug: $slug) {{ {DELETE_FIELDS} }} }}"
        );
        self.mutate_delete(
            &document,
            json!({ "projectSlug": project_slug, "slug": slug }),
            "deleteImpactSource",
        )
        .await
    }

    // -- teams -------------------------------------------------------------

    async fn create_team(&self, input: CreateTeamInput) -> ApiResult<Team> {
        let document = format!(
            "mutation CreateTeam($input: CreateTeamMutationInput!) {{ \
             createTeam(input: $input) {{ team {{ {TEAM_FIELDS} }} {MUTATION_ERROR_FIELDS} }} }}"
        );
        self.mutate_entity(
            &document,
            json!({ "input": serde_json::to_value(&input)? }),
            "createTeam",
        )
        .await
    }

    async fn get_team(&self, slug: &str) -> ApiResult<Team> {
        let document = format!(
            "query GetTeam($teamSlug: ID!) {{ team(teamSlug: $teamSlug) {{ {TEAM_FIELDS} }} }}"
        );
        let raw = self
            .request_field(&document, json!({ "teamSlug": slug }), "team")
            .await?;
        Ok(serde_json::from_value(raw)?)
    }

    async fn update_team(&self, input: UpdateTeamInput) -> ApiResult<Team> {
        let document = format!(
            "mutation UpdateTeam($input: UpdateTeamMutationInput!) {{ \
             updateTeam(input: $input) {{ team {{ {TEAM_FIELDS} }} {MUTATION_ERROR_FIELDS} }} }}"
        );
        self.mutate_entity(
            &document,
            json!({ "input": serde_json::to_value(&input)? }),
            "updateTeam",
        )
        .await
    }

    async fn delete_team(&self, slug: &str) -> ApiResult<DeletePayload> {
        let document = format!(
            "mutation DeleteTeam($teamSlug: ID!) {{ \
             deleteTeam(teamSlug: $teamSlug) {{ {DELETE_FIELDS} }} }}"
        );
        self.mutate_delete(&document, json!({ "teamSlug": slug }), "deleteTeam")
            .await
    }

    async fn add_team_members(&self, slug: &str, member_ids: &[String]) -> ApiResult<()> {
        let document = format!(
            "mutation AddTeamMembers($input: TeamMembersMutationInput!) {{ \
             addTeamMembers(input: $input) {{ success {MUTATION_ERROR_FIELDS} }} }}"
        );
        self.mutate_members(
            &document,
            json!({ "input": { "teamSlug": slug, "memberIds": member_ids } }),
            "addTeamMembers",
        )
        .await
    }

    async fn remove_team_members(&self, slug: &str, member_ids: &[String]) -> ApiResult<()> {
        let document = format!(
            "mutation RemoveTeamMembers($input: TeamMembersMutationInput!) {{ \
             removeTeamMembers(input: $input) {{ success {MUTATION_ERROR_FIELDS} }} }}"
        );
        self.mutate_members(
            &document,
            json!({ "input": { "teamSlug": slug, "memberIds": member_ids } }),
            "removeTeamMembers",
        )
        .await
    }

    async fn team_members(&self, slug: &str) -> ApiResult<Vec<User>> {
        let document = format!(
            "query TeamMembers($teamSlug: ID!, $page: Int!, $pageSize: Int!) {{ \
             team(teamSlug: $teamSlug) {{ \
             members(page: $page, pageSize: $pageSize) {{ users {{ {USER_FIELDS} }} hasNextPage }} }} }}"
        );
        let client = self.clone();
        let slug = slug.to_string();
        self.collect_pages(move |page| {
            let client = client.clone();
            let document = document.clone();
            let slug = slug.clone();
            Box::pin(async move {
                let raw = client
                    .request_field(
                        &document,
                        json!({ "teamSlug": slug, "page": page, "pageSize": PAGE_SIZE }),
                        "team",
                    )
                    .await?;
                let members = raw
                    .get("members")
                    .cloned()
                    .ok_or_else(|| ApiError::Decode("team payload missing members".to_string()))?;
                Ok(serde_json::from_value::<UserPage>(members)?)
            })
        })
        .await
    }

    async fn find_users_by_email(&self, emails: &[String]) -> ApiResult<Vec<User>> {
        let document = format!(
            "query FindUsers($emails: [String!]!, $page: Int!, $pageSize: Int!) {{ \
             organization {{ \
             users(emails: $emails, page: $page, pageSize: $pageSize) {{ users {{ {USER_FIELDS} }} hasNextPage }} }} }}"
        );
        let client = self.clone();
        let emails = emails.to_vec();
        self.collect_pages(move |page| {
            let client = client.clone();
            let document = document.clone();
            let emails = emails.clone();
            Box::pin(async move {
                let raw = client
                    .request_field(
                        &document,
                        json!({ "emails": emails, "page": page, "pageSize": PAGE_SIZE }),
                        "organization",
                    )
                    .await?;
                let users = raw.get("users").cloned().ok_or_else(|| {
                    ApiError::Decode("organization payload missing users".to_string())
                })?;
                Ok(serde_json::from_value::<UserPage>(users)?)
            })
        })
        .await
    }
}

impl SleuthClient {
    async fn list_environments(&self, project_slug: &str) -> ApiResult<Vec<Environment>> {
        let document = format!(
            "query GetEnvironments($projectSlug: ID!) {{ \
             environments(projectSlug: $projectSlug) {{ {ENVIRONMENT_FIELDS} }} }}"
        );
        let raw = self
            .request_field(
                &document,
                json!({ "projectSlug": project_slug }),
                "environments",
            )
            .await?;
        Ok(serde_json::from_value(raw)?)
    }

    /// Shared handling for the member add/remove mutations, whose payload
    /// carries only `success` and `errors`.
    async fn mutate_members(
        &self,
        document: &str,
        variables: Value,
        field: &str,
    ) -> ApiResult<()> {
        #[derive(Debug, Deserialize)]
        struct MembersPayload {
            #[serde(default)]
            success: bool,
            #[serde(default)]
            errors: Vec<MutationError>,
        }

        let raw = self.request_field(document, variables, field).await?;
        let payload: MembersPayload = serde_json::from_value(raw)?;
        if !payload.errors.is_empty() {
            return Err(ApiError::Remote {
                messages: MutationError::flatten(&payload.errors),
            });
        }
        if !payload.success {
            return Err(ApiError::remote(format!("{field} reported failure")));
        }
        Ok(())
    }
}
