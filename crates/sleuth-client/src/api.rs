//! The `SleuthApi` trait: every remote operation the provider performs
//!
//! Backend-agnostic so resource adapters can run against the real GraphQL
//! client or the in-memory fake in `fakes`. All methods are async and the
//! trait object is shared (`Arc<dyn SleuthApi>`) across concurrent resource
//! operations; implementations must be safe for concurrent calls.

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::model::*;

/// Typed surface of the Sleuth GraphQL API.
///
/// Semantics:
/// - `get_*` methods return `Ok(None)` when the entity does not exist,
///   with one exception: `get_team` surfaces the server's own miss error
///   (message ending in " not found") so callers can apply the historical
///   suffix check.
/// - `delete_*` methods return the raw [`DeletePayload`]; business rules
///   such as tolerating "Missing" after a cascade delete belong to the
///   caller.
/// - Mutation inputs are consumed by value: one wrapper input, one call.
#[async_trait]
pub trait SleuthApi: Send + Sync {
    // -- projects ----------------------------------------------------------

    async fn create_project(&self, input: CreateProjectInput) -> ApiResult<Project>;

    async fn get_project(&self, slug: &str) -> ApiResult<Option<Project>>;

    async fn update_project(&self, input: UpdateProjectInput) -> ApiResult<Project>;

    async fn delete_project(&self, slug: &str) -> ApiResult<DeletePayload>;

    // -- environments ------------------------------------------------------

    async fn create_environment(&self, input: CreateEnvironmentInput) -> ApiResult<Environment>;

    async fn get_environment(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<Option<Environment>>;

    /// Look up an environment by display name, used by the adoption path:
    /// the server auto-creates "Production" with every project.
    async fn get_environment_by_name(
        &self,
        project_slug: &str,
        name: &str,
    ) -> ApiResult<Option<Environment>>;

    async fn update_environment(&self, input: UpdateEnvironmentInput) -> ApiResult<Environment>;

    async fn delete_environment(&self, project_slug: &str, slug: &str)
        -> ApiResult<DeletePayload>;

    // -- code change sources -----------------------------------------------

    async fn create_code_change_source(
        &self,
        input: CreateCodeChangeSourceInput,
    ) -> ApiResult<CodeChangeSource>;

    async fn get_code_change_source(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<Option<CodeChangeSource>>;

    async fn update_code_change_source(
        &self,
        input: UpdateCodeChangeSourceInput,
    ) -> ApiResult<CodeChangeSource>;

    async fn delete_change_source(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<DeletePayload>;

    // -- error impact sources ----------------------------------------------

    async fn create_error_impact_source(
        &self,
        input: CreateErrorImpactSourceInput,
    ) -> ApiResult<ErrorImpactSource>;

    async fn get_error_impact_source(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<Option<ErrorImpactSource>>;

    async fn update_error_impact_source(
        &self,
        input: UpdateErrorImpactSourceInput,
    ) -> ApiResult<ErrorImpactSource>;

    // -- metric impact sources ---------------------------------------------

    async fn create_metric_impact_source(
        &self,
        input: CreateMetricImpactSourceInput,
    ) -> ApiResult<MetricImpactSource>;

    async fn get_metric_impact_source(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<Option<MetricImpactSource>>;

    async fn update_metric_impact_source(
        &self,
        input: UpdateMetricImpactSourceInput,
    ) -> ApiResult<MetricImpactSource>;

    // -- incident impact sources -------------------------------------------

    async fn create_incident_impact_source(
        &self,
        input: CreateIncidentImpactSourceInput,
    ) -> ApiResult<IncidentImpactSource>;

    async fn get_incident_impact_source(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<Option<IncidentImpactSource>>;

    async fn update_incident_impact_source(
        &self,
        input: UpdateIncidentImpactSourceInput,
    ) -> ApiResult<IncidentImpactSource>;

    /// Shared delete for error, metric and incident impact sources.
    async fn delete_impact_source(
        &self,
        project_slug: &str,
        slug: &str,
    ) -> ApiResult<DeletePayload>;

    // -- teams -------------------------------------------------------------

    async fn create_team(&self, input: CreateTeamInput) -> ApiResult<Team>;

    /// A miss is surfaced as the server's own error, whose message ends in
    /// " not found".
    async fn get_team(&self, slug: &str) -> ApiResult<Team>;

    async fn update_team(&self, input: UpdateTeamInput) -> ApiResult<Team>;

    async fn delete_team(&self, slug: &str) -> ApiResult<DeletePayload>;

    /// Add members by opaque user ID. Callers only invoke this with a
    /// non-empty set.
    async fn add_team_members(&self, slug: &str, member_ids: &[String]) -> ApiResult<()>;

    /// Remove members by opaque user ID. Callers only invoke this with a
    /// non-empty set.
    async fn remove_team_members(&self, slug: &str, member_ids: &[String]) -> ApiResult<()>;

    /// Full live membership of a team. Implementations page through the
    /// remote list internally.
    async fn team_members(&self, slug: &str) -> ApiResult<Vec<User>>;

    /// Resolve organization users by email. Implementations page through
    /// the remote list internally; emails with no matching user are simply
    /// absent from the result.
    async fn find_users_by_email(&self, emails: &[String]) -> ApiResult<Vec<User>>;
}
