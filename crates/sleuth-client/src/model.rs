//! Domain records and mutation input shapes for the Sleuth API
//!
//! Two kinds of input shapes exist, mirroring the GraphQL schema:
//! - **Mutable bodies** (`MutableProject`, `MutableCodeChangeSource`, ...):
//!   the fields valid in both Create and Update mutations.
//! - **Wrapper inputs** (`CreateProjectInput`, `UpdateProjectInput`, ...):
//!   own a mutable body by value plus the primary key(s) and one-shot
//!   flags such as `initialize_changes` on create.
//!
//! A wrapper input is consumed by exactly one mutation call; mutation
//! methods therefore take their input by value.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

/// A Sleuth project: the logical workspace everything else hangs off.
///
/// The slug is server-generated from the name and immutable once assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub issue_tracker_provider: Option<String>,
    pub build_provider: Option<String>,
    pub change_failure_rate_boundary: Option<String>,
    pub impact_sensitivity: Option<String>,
    pub failure_sensitivity: Option<i64>,
    pub change_lead_time_start_definition: Option<String>,
    /// Issue-state IDs. The API exposes these as ID strings even though
    /// the provider surface treats them as integers.
    #[serde(default)]
    pub change_lead_time_issue_states: Vec<String>,
    pub change_lead_time_strict_matching: Option<bool>,
}

/// Project fields shared by the create and update mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutableProject {
    pub name: String,
    pub description: Option<String>,
    pub issue_tracker_provider: Option<String>,
    pub build_provider: Option<String>,
    pub change_failure_rate_boundary: Option<String>,
    pub impact_sensitivity: Option<String>,
    pub failure_sensitivity: Option<i64>,
    pub change_lead_time_start_definition: Option<String>,
    #[serde(default)]
    pub change_lead_time_issue_states: Vec<String>,
    pub change_lead_time_strict_matching: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectInput {
    #[serde(flatten)]
    pub fields: MutableProject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectInput {
    pub slug: String,
    #[serde(flatten)]
    pub fields: MutableProject,
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// A deployment target scoped to a project.
///
/// The server auto-creates an environment named "Production" with every
/// project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutableEnvironment {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnvironmentInput {
    pub project_slug: String,
    #[serde(flatten)]
    pub fields: MutableEnvironment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEnvironmentInput {
    pub project_slug: String,
    pub slug: String,
    #[serde(flatten)]
    pub fields: MutableEnvironment,
}

/// Slim environment reference nested inside impact sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentRef {
    pub name: String,
    pub slug: String,
}

// ---------------------------------------------------------------------------
// Code change source
// ---------------------------------------------------------------------------

/// Webhook registration handed back by the server for push-based tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub url: String,
    pub secret: String,
}

/// Repository bound to a code change source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub owner: String,
    pub name: String,
    pub url: String,
    /// Repository provider (GITHUB, GITHUB_ENTERPRISE, GITLAB, BITBUCKET,
    /// AZURE, CUSTOM_GIT). Always upper-case on the wire.
    pub provider: String,
    pub integration_slug: Option<String>,
    pub project_uid: Option<String>,
    pub repo_uid: Option<String>,
    pub webhook: Option<Webhook>,
}

/// Repository fields accepted by mutations (no computed webhook).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryInput {
    pub owner: String,
    pub name: String,
    pub url: String,
    pub provider: String,
    pub integration_slug: Option<String>,
    pub project_uid: Option<String>,
    pub repo_uid: Option<String>,
}

/// Association of an environment with the branch that deploys to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentMapping {
    pub environment_slug: String,
    pub branch: String,
}

/// Association of an environment with a remote CI build or pipeline.
///
/// `build_branch` is never user-supplied: it is derived from the
/// environment mapping that shares this mapping's `environment_slug`.
/// The API echoes `project_key` but not a project name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildMapping {
    pub environment_slug: String,
    /// Build provider. Always upper-case on the wire.
    pub provider: String,
    pub integration_slug: Option<String>,
    pub build_name: String,
    pub job_name: Option<String>,
    pub project_key: Option<String>,
    #[serde(default)]
    pub match_branch_to_environment: bool,
    #[serde(default)]
    pub is_custom: bool,
    pub build_branch: Option<String>,
}

/// A repository plus its branch and build mappings, bound to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeChangeSource {
    pub name: String,
    pub slug: String,
    pub repository: Repository,
    #[serde(default)]
    pub environment_mappings: Vec<EnvironmentMapping>,
    #[serde(default)]
    pub build_mappings: Vec<BuildMapping>,
    pub deploy_tracking_type: String,
    pub collect_impact: bool,
    pub notify_in_slack: bool,
    pub include_in_dashboard: bool,
    pub path_prefix: Option<String>,
    #[serde(default)]
    pub auto_tracking_delay: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutableCodeChangeSource {
    pub name: String,
    pub repository: RepositoryInput,
    pub environment_mappings: Vec<EnvironmentMapping>,
    pub build_mappings: Vec<BuildMapping>,
    pub deploy_tracking_type: String,
    pub collect_impact: bool,
    pub notify_in_slack: bool,
    pub include_in_dashboard: bool,
    pub path_prefix: Option<String>,
    pub auto_tracking_delay: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCodeChangeSourceInput {
    pub project_slug: String,
    /// One-shot flag: ask the server to backfill change history on create.
    pub initialize_changes: bool,
    #[serde(flatten)]
    pub fields: MutableCodeChangeSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCodeChangeSourceInput {
    pub project_slug: String,
    pub slug: String,
    #[serde(flatten)]
    pub fields: MutableCodeChangeSource,
}

// ---------------------------------------------------------------------------
// Error / metric impact sources
// ---------------------------------------------------------------------------

/// A project+environment-bound error-tracker link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorImpactSource {
    pub name: String,
    pub slug: String,
    pub environment: EnvironmentRef,
    pub provider: String,
    pub error_org_key: String,
    pub error_project_key: String,
    pub error_environment: String,
    pub manually_set_health_threshold: Option<f64>,
    pub integration_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutableErrorImpactSource {
    pub name: String,
    pub environment_slug: String,
    pub provider: String,
    pub error_org_key: String,
    pub error_project_key: String,
    pub error_environment: String,
    pub manually_set_health_threshold: Option<f64>,
    pub integration_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateErrorImpactSourceInput {
    pub project_slug: String,
    #[serde(flatten)]
    pub fields: MutableErrorImpactSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateErrorImpactSourceInput {
    pub project_slug: String,
    pub slug: String,
    #[serde(flatten)]
    pub fields: MutableErrorImpactSource,
}

/// A project+environment-bound metric link (provider-specific query DSL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricImpactSource {
    pub name: String,
    pub slug: String,
    pub environment: EnvironmentRef,
    pub provider: String,
    pub query: String,
    #[serde(default)]
    pub less_is_better: bool,
    pub manually_set_health_threshold: Option<f64>,
    pub integration_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutableMetricImpactSource {
    pub name: String,
    pub environment_slug: String,
    pub provider: String,
    pub query: String,
    pub less_is_better: bool,
    pub manually_set_health_threshold: Option<f64>,
    pub integration_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMetricImpactSourceInput {
    pub project_slug: String,
    #[serde(flatten)]
    pub fields: MutableMetricImpactSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMetricImpactSourceInput {
    pub project_slug: String,
    pub slug: String,
    #[serde(flatten)]
    pub fields: MutableMetricImpactSource,
}

// ---------------------------------------------------------------------------
// Incident impact source (polymorphic)
// ---------------------------------------------------------------------------

/// Incident provider tag. One variant payload type exists per provider,
/// except CUSTOM_INCIDENT which carries no payload (its mechanism is the
/// computed register-impact webhook).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentProvider {
    Pagerduty,
    Datadog,
    Jira,
    CustomIncident,
    Blameless,
    Statuspage,
    Opsgenie,
    Firehydrant,
    Clubhouse,
}

impl IncidentProvider {
    /// All providers, in schema order.
    pub const ALL: [IncidentProvider; 9] = [
        IncidentProvider::Pagerduty,
        IncidentProvider::Datadog,
        IncidentProvider::Jira,
        IncidentProvider::CustomIncident,
        IncidentProvider::Blameless,
        IncidentProvider::Statuspage,
        IncidentProvider::Opsgenie,
        IncidentProvider::Firehydrant,
        IncidentProvider::Clubhouse,
    ];

    /// Upper-case wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentProvider::Pagerduty => "PAGERDUTY",
            IncidentProvider::Datadog => "DATADOG",
            IncidentProvider::Jira => "JIRA",
            IncidentProvider::CustomIncident => "CUSTOM_INCIDENT",
            IncidentProvider::Blameless => "BLAMELESS",
            IncidentProvider::Statuspage => "STATUSPAGE",
            IncidentProvider::Opsgenie => "OPSGENIE",
            IncidentProvider::Firehydrant => "FIREHYDRANT",
            IncidentProvider::Clubhouse => "CLUBHOUSE",
        }
    }

    /// Case-insensitive parse of a provider name as written in a plan.
    pub fn parse(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        Self::ALL.into_iter().find(|p| p.as_str() == upper)
    }
}

impl std::fmt::Display for IncidentProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_priority_threshold() -> String {
    "ALL".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagerDutyDetails {
    /// Comma-separated remote service IDs; empty means all services.
    #[serde(default)]
    pub remote_services: String,
    pub remote_urgency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataDogDetails {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_priority_threshold")]
    pub remote_priority_threshold: String,
    pub integration_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraDetails {
    pub remote_jql: String,
    pub integration_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlamelessDetails {
    pub remote_types: Option<Vec<String>>,
    pub remote_severity_threshold: Option<String>,
    pub integration_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatuspageDetails {
    pub remote_page: String,
    pub remote_component: Option<String>,
    pub remote_impact: Option<String>,
    pub integration_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpsGenieDetails {
    #[serde(default = "default_priority_threshold")]
    pub remote_priority_threshold: String,
    #[serde(default)]
    pub remote_use_alerts: bool,
    pub remote_incident_tags: Option<String>,
    pub remote_alert_tags: Option<String>,
    pub integration_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FireHydrantDetails {
    #[serde(default)]
    pub remote_mitigated_is_healthy: bool,
    pub remote_environments: Option<String>,
    pub integration_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubhouseDetails {
    pub remote_query: Option<String>,
    pub integration_slug: Option<String>,
}

/// Union of provider-specific detail payloads, decoded from the GraphQL
/// union via inline fragments: the concrete variant is selected by
/// `__typename`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum IncidentProviderDetails {
    #[serde(rename = "PagerDutyProviderData")]
    PagerDuty(PagerDutyDetails),
    #[serde(rename = "DataDogProviderData")]
    DataDog(DataDogDetails),
    #[serde(rename = "JiraProviderData")]
    Jira(JiraDetails),
    #[serde(rename = "BlamelessProviderData")]
    Blameless(BlamelessDetails),
    #[serde(rename = "StatuspageProviderData")]
    Statuspage(StatuspageDetails),
    #[serde(rename = "OpsGenieProviderData")]
    OpsGenie(OpsGenieDetails),
    #[serde(rename = "FireHydrantProviderData")]
    FireHydrant(FireHydrantDetails),
    #[serde(rename = "ClubhouseProviderData")]
    Clubhouse(ClubhouseDetails),
}

impl IncidentProviderDetails {
    /// The provider tag this payload belongs to.
    pub fn provider(&self) -> IncidentProvider {
        match self {
            IncidentProviderDetails::PagerDuty(_) => IncidentProvider::Pagerduty,
            IncidentProviderDetails::DataDog(_) => IncidentProvider::Datadog,
            IncidentProviderDetails::Jira(_) => IncidentProvider::Jira,
            IncidentProviderDetails::Blameless(_) => IncidentProvider::Blameless,
            IncidentProviderDetails::Statuspage(_) => IncidentProvider::Statuspage,
            IncidentProviderDetails::OpsGenie(_) => IncidentProvider::Opsgenie,
            IncidentProviderDetails::FireHydrant(_) => IncidentProvider::Firehydrant,
            IncidentProviderDetails::Clubhouse(_) => IncidentProvider::Clubhouse,
        }
    }
}

/// An incident-tracker link with exactly one provider-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentImpactSource {
    pub name: String,
    pub slug: String,
    pub environment: EnvironmentRef,
    pub provider: String,
    pub register_impact_link: Option<String>,
    pub details: Option<IncidentProviderDetails>,
}

/// Incident impact source fields shared by create and update.
///
/// The wire input carries one nullable field per provider; exactly one is
/// set, matching `provider`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutableIncidentImpactSource {
    pub name: String,
    pub environment_name: String,
    pub provider: String,
    pub pagerduty_input: Option<PagerDutyDetails>,
    pub datadog_input: Option<DataDogDetails>,
    pub jira_input: Option<JiraDetails>,
    pub blameless_input: Option<BlamelessDetails>,
    pub statuspage_input: Option<StatuspageDetails>,
    pub opsgenie_input: Option<OpsGenieDetails>,
    pub firehydrant_input: Option<FireHydrantDetails>,
    pub clubhouse_input: Option<ClubhouseDetails>,
}

impl MutableIncidentImpactSource {
    /// Number of variant payloads that are set.
    pub fn variant_count(&self) -> usize {
        [
            self.pagerduty_input.is_some(),
            self.datadog_input.is_some(),
            self.jira_input.is_some(),
            self.blameless_input.is_some(),
            self.statuspage_input.is_some(),
            self.opsgenie_input.is_some(),
            self.firehydrant_input.is_some(),
            self.clubhouse_input.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }

    /// The single active payload, tagged, if any.
    pub fn active_details(&self) -> Option<IncidentProviderDetails> {
        if let Some(d) = &self.pagerduty_input {
            return Some(IncidentProviderDetails::PagerDuty(d.clone()));
        }
        if let Some(d) = &self.datadog_input {
            return Some(IncidentProviderDetails::DataDog(d.clone()));
        }
        if let Some(d) = &self.jira_input {
            return Some(IncidentProviderDetails::Jira(d.clone()));
        }
        if let Some(d) = &self.blameless_input {
            return Some(IncidentProviderDetails::Blameless(d.clone()));
        }
        if let Some(d) = &self.statuspage_input {
            return Some(IncidentProviderDetails::Statuspage(d.clone()));
        }
        if let Some(d) = &self.opsgenie_input {
            return Some(IncidentProviderDetails::OpsGenie(d.clone()));
        }
        if let Some(d) = &self.firehydrant_input {
            return Some(IncidentProviderDetails::FireHydrant(d.clone()));
        }
        if let Some(d) = &self.clubhouse_input {
            return Some(IncidentProviderDetails::Clubhouse(d.clone()));
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIncidentImpactSourceInput {
    pub project_slug: String,
    #[serde(flatten)]
    pub fields: MutableIncidentImpactSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIncidentImpactSourceInput {
    pub project_slug: String,
    pub slug: String,
    #[serde(flatten)]
    pub fields: MutableIncidentImpactSource,
}

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

/// An organizational team, optionally nested under a parent team.
///
/// Membership is not a field of the team: it is mutated through the
/// dedicated add/remove member mutations and read through the paginated
/// members query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub name: String,
    pub slug: String,
    pub parent_slug: Option<String>,
}

/// An organization member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamInput {
    pub name: String,
    pub parent_team_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamInput {
    pub slug: String,
    pub name: String,
    pub parent_team_slug: Option<String>,
}

// ---------------------------------------------------------------------------
// Shared mutation payloads
// ---------------------------------------------------------------------------

/// Payload of delete-style mutations.
///
/// `success=false` is not a GraphQL error: the message travels here so the
/// caller can apply business rules (a project delete reporting "Missing"
/// after a cascade delete is treated as success by the adapter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePayload {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Field-scoped validation error inside a mutation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationError {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub messages: Vec<String>,
}

impl MutationError {
    /// Flatten a list of mutation errors into displayable messages.
    pub fn flatten(errors: &[MutationError]) -> Vec<String> {
        errors
            .iter()
            .flat_map(|e| {
                e.messages.iter().map(move |m| match &e.field {
                    Some(field) => format!("{field}: {m}"),
                    None => m.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incident_provider_parse_is_case_insensitive() {
        assert_eq!(
            IncidentProvider::parse("datadog"),
            Some(IncidentProvider::Datadog)
        );
        assert_eq!(
            IncidentProvider::parse("PagerDuty"),
            Some(IncidentProvider::Pagerduty)
        );
        assert_eq!(
            IncidentProvider::parse("CUSTOM_INCIDENT"),
            Some(IncidentProvider::CustomIncident)
        );
        assert_eq!(IncidentProvider::parse("nagios"), None);
    }

    #[test]
    fn test_incident_provider_serde_uses_wire_spelling() {
        let json = serde_json::to_string(&IncidentProvider::Firehydrant).expect("serialize");
        assert_eq!(json, "\"FIREHYDRANT\"");
    }

    #[test]
    fn test_details_decode_by_typename() {
        let raw = serde_json::json!({
            "__typename": "DataDogProviderData",
            "query": "status:error",
            "remotePriorityThreshold": "P2",
            "integrationSlug": null,
        });
        let details: IncidentProviderDetails =
            serde_json::from_value(raw).expect("deserialize union");
        match details {
            IncidentProviderDetails::DataDog(d) => {
                assert_eq!(d.query, "status:error");
                assert_eq!(d.remote_priority_threshold, "P2");
            }
            other => panic!("decoded wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_details_decode_applies_variant_defaults() {
        let raw = serde_json::json!({ "__typename": "OpsGenieProviderData" });
        let details: IncidentProviderDetails =
            serde_json::from_value(raw).expect("deserialize union");
        match details {
            IncidentProviderDetails::OpsGenie(d) => {
                assert_eq!(d.remote_priority_threshold, "ALL");
                assert!(!d.remote_use_alerts);
            }
            other => panic!("decoded wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_mutable_incident_variant_count() {
        let mut fields = MutableIncidentImpactSource {
            name: "incidents".to_string(),
            environment_name: "Production".to_string(),
            provider: "DATADOG".to_string(),
            pagerduty_input: None,
            datadog_input: None,
            jira_input: None,
            blameless_input: None,
            statuspage_input: None,
            opsgenie_input: None,
            firehydrant_input: None,
            clubhouse_input: None,
        };
        assert_eq!(fields.variant_count(), 0);
        assert!(fields.active_details().is_none());

        fields.datadog_input = Some(DataDogDetails {
            query: "x".to_string(),
            remote_priority_threshold: "ALL".to_string(),
            integration_slug: None,
        });
        assert_eq!(fields.variant_count(), 1);
        assert_eq!(
            fields.active_details().map(|d| d.provider()),
            Some(IncidentProvider::Datadog)
        );
    }

    #[test]
    fn test_wrapper_input_flattens_mutable_body() {
        let input = UpdateProjectInput {
            slug: "my-project".to_string(),
            fields: MutableProject {
                name: "My Project".to_string(),
                description: None,
                issue_tracker_provider: None,
                build_provider: None,
                change_failure_rate_boundary: Some("UNHEALTHY".to_string()),
                impact_sensitivity: None,
                failure_sensitivity: Some(420),
                change_lead_time_start_definition: None,
                change_lead_time_issue_states: vec!["12".to_string()],
                change_lead_time_strict_matching: None,
            },
        };
        let value = serde_json::to_value(&input).expect("serialize");
        assert_eq!(value["slug"], "my-project");
        assert_eq!(value["name"], "My Project");
        assert_eq!(value["failureSensitivity"], 420);
        assert_eq!(value["changeLeadTimeIssueStates"][0], "12");
    }

    #[test]
    fn test_mutation_error_flatten() {
        let errors = vec![
            MutationError {
                field: Some("name".to_string()),
                messages: vec!["required".to_string()],
            },
            MutationError {
                field: None,
                messages: vec!["boom".to_string()],
            },
        ];
        assert_eq!(
            MutationError::flatten(&errors),
            vec!["name: required".to_string(), "boom".to_string()]
        );
    }
}
