//! The `sleuth_incident_impact_source` resource.
//!
//! One resource multiplexing eight provider-specific sub-schemas through
//! a tagged-variant protocol. The plan carries one nullable block per
//! provider; exactly one must be set and must agree with `provider_name`
//! (CUSTOM_INCIDENT carries no block at all — its mechanism is the
//! computed register-impact webhook). Read-back fills only the active
//! block, re-applying per-variant defaults when the remote omits fields,
//! and leaves every other block null so the host sees no phantom diffs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sleuth_client::model::{
    BlamelessDetails, ClubhouseDetails, CreateIncidentImpactSourceInput, DataDogDetails,
    FireHydrantDetails, IncidentImpactSource, IncidentProvider, IncidentProviderDetails,
    JiraDetails, MutableIncidentImpactSource, OpsGenieDetails, PagerDutyDetails,
    StatuspageDetails, UpdateIncidentImpactSourceInput,
};

use crate::error::{ProviderError, ProviderResult};
use crate::resource::{parse_composite_id, resolve_delete, OpContext, ResourceLifecycle};
use crate::schema::{AttrType, Attribute, Schema};

fn all_threshold() -> String {
    "ALL".to_string()
}

// ---------------------------------------------------------------------------
// Provider blocks (host surface, snake_case)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagerDutyBlock {
    #[serde(default)]
    pub remote_services: String,
    #[serde(default)]
    pub remote_urgency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataDogBlock {
    #[serde(default)]
    pub query: String,
    #[serde(default = "all_threshold")]
    pub remote_priority_threshold: String,
    #[serde(default)]
    pub integration_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JiraBlock {
    pub remote_jql: String,
    #[serde(default)]
    pub integration_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlamelessBlock {
    #[serde(default)]
    pub remote_types: Option<Vec<String>>,
    #[serde(default)]
    pub remote_severity_threshold: Option<String>,
    #[serde(default)]
    pub integration_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatuspageBlock {
    pub remote_page: String,
    #[serde(default)]
    pub remote_component: Option<String>,
    #[serde(default)]
    pub remote_impact: Option<String>,
    #[serde(default)]
    pub integration_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpsGenieBlock {
    #[serde(default = "all_threshold")]
    pub remote_priority_threshold: String,
    #[serde(default)]
    pub remote_use_alerts: bool,
    #[serde(default)]
    pub remote_incident_tags: Option<String>,
    #[serde(default)]
    pub remote_alert_tags: Option<String>,
    #[serde(default)]
    pub integration_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireHydrantBlock {
    #[serde(default)]
    pub remote_mitigated_is_healthy: bool,
    #[serde(default)]
    pub remote_environments: Option<String>,
    #[serde(default)]
    pub integration_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClubhouseBlock {
    #[serde(default)]
    pub remote_query: Option<String>,
    #[serde(default)]
    pub integration_slug: Option<String>,
}

// Wire conversions. Field sets match one to one; only the casing regime
// differs between the host surface and the GraphQL input.

impl From<PagerDutyBlock> for PagerDutyDetails {
    fn from(b: PagerDutyBlock) -> Self {
        PagerDutyDetails {
            remote_services: b.remote_services,
            remote_urgency: b.remote_urgency,
        }
    }
}

impl From<PagerDutyDetails> for PagerDutyBlock {
    fn from(d: PagerDutyDetails) -> Self {
        PagerDutyBlock {
            remote_services: d.remote_services,
            remote_urgency: d.remote_urgency,
        }
    }
}

impl From<DataDogBlock> for DataDogDetails {
    fn from(b: DataDogBlock) -> Self {
        DataDogDetails {
            query: b.query,
            remote_priority_threshold: b.remote_priority_threshold,
            integration_slug: b.integration_slug,
        }
    }
}

impl From<DataDogDetails> for DataDogBlock {
    fn from(d: DataDogDetails) -> Self {
        DataDogBlock {
            query: d.query,
            remote_priority_threshold: d.remote_priority_threshold,
            integration_slug: d.integration_slug,
        }
    }
}

impl From<JiraBlock> for JiraDetails {
    fn from(b: JiraBlock) -> Self {
        JiraDetails {
            remote_jql: b.remote_jql,
            integration_slug: b.integration_slug,
        }
    }
}

impl From<JiraDetails> for JiraBlock {
    fn from(d: JiraDetails) -> Self {
        JiraBlock {
            remote_jql: d.remote_jql,
            integration_slug: d.integration_slug,
        }
    }
}

impl From<BlamelessBlock> for BlamelessDetails {
    fn from(b: BlamelessBlock) -> Self {
        BlamelessDetails {
            remote_types: b.remote_types,
            remote_severity_threshold: b.remote_severity_threshold,
            integration_slug: b.integration_slug,
        }
    }
}

impl From<BlamelessDetails> for BlamelessBlock {
    fn from(d: BlamelessDetails) -> Self {
        BlamelessBlock {
            remote_types: d.remote_types,
            remote_severity_threshold: d.remote_severity_threshold,
            integration_slug: d.integration_slug,
        }
    }
}

impl From<StatuspageBlock> for StatuspageDetails {
    fn from(b: StatuspageBlock) -> Self {
        StatuspageDetails {
            remote_page: b.remote_page,
            remote_component: b.remote_component,
            remote_impact: b.remote_impact,
            integration_slug: b.integration_slug,
        }
    }
}

impl From<StatuspageDetails> for StatuspageBlock {
    fn from(d: StatuspageDetails) -> Self {
        StatuspageBlock {
            remote_page: d.remote_page,
            remote_component: d.remote_component,
            remote_impact: d.remote_impact,
            integration_slug: d.integration_slug,
        }
    }
}

impl From<OpsGenieBlock> for OpsGenieDetails {
    fn from(b: OpsGenieBlock) -> Self {
        OpsGenieDetails {
            remote_priority_threshold: b.remote_priority_threshold,
            remote_use_alerts: b.remote_use_alerts,
            remote_incident_tags: b.remote_incident_tags,
            remote_alert_tags: b.remote_alert_tags,
            integration_slug: b.integration_slug,
        }
    }
}

impl From<OpsGenieDetails> for OpsGenieBlock {
    fn from(d: OpsGenieDetails) -> Self {
        OpsGenieBlock {
            remote_priority_threshold: d.remote_priority_threshold,
            remote_use_alerts: d.remote_use_alerts,
            remote_incident_tags: d.remote_incident_tags,
            remote_alert_tags: d.remote_alert_tags,
            integration_slug: d.integration_slug,
        }
    }
}

impl From<FireHydrantBlock> for FireHydrantDetails {
    fn from(b: FireHydrantBlock) -> Self {
        FireHydrantDetails {
            remote_mitigated_is_healthy: b.remote_mitigated_is_healthy,
            remote_environments: b.remote_environments,
            integration_slug: b.integration_slug,
        }
    }
}

impl From<FireHydrantDetails> for FireHydrantBlock {
    fn from(d: FireHydrantDetails) -> Self {
        FireHydrantBlock {
            remote_mitigated_is_healthy: d.remote_mitigated_is_healthy,
            remote_environments: d.remote_environments,
            integration_slug: d.integration_slug,
        }
    }
}

impl From<ClubhouseBlock> for ClubhouseDetails {
    fn from(b: ClubhouseBlock) -> Self {
        ClubhouseDetails {
            remote_query: b.remote_query,
            integration_slug: b.integration_slug,
        }
    }
}

impl From<ClubhouseDetails> for ClubhouseBlock {
    fn from(d: ClubhouseDetails) -> Self {
        ClubhouseBlock {
            remote_query: d.remote_query,
            integration_slug: d.integration_slug,
        }
    }
}

// ---------------------------------------------------------------------------
// Plan / state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentImpactSourcePlan {
    pub project_slug: String,
    pub name: String,
    pub environment_name: String,
    pub provider_name: String,
    #[serde(default)]
    pub pagerduty_input: Option<PagerDutyBlock>,
    #[serde(default)]
    pub datadog_input: Option<DataDogBlock>,
    #[serde(default)]
    pub jira_input: Option<JiraBlock>,
    #[serde(default)]
    pub blameless_input: Option<BlamelessBlock>,
    #[serde(default)]
    pub statuspage_input: Option<StatuspageBlock>,
    #[serde(default)]
    pub opsgenie_input: Option<OpsGenieBlock>,
    #[serde(default)]
    pub firehydrant_input: Option<FireHydrantBlock>,
    #[serde(default)]
    pub clubhouse_input: Option<ClubhouseBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentImpactSourceState {
    /// Composite `{project_slug}/{slug}`.
    pub id: String,
    pub project_slug: String,
    pub slug: String,
    pub name: String,
    pub environment_name: String,
    pub provider_name: String,
    pub register_impact_link: Option<String>,
    pub pagerduty_input: Option<PagerDutyBlock>,
    pub datadog_input: Option<DataDogBlock>,
    pub jira_input: Option<JiraBlock>,
    pub blameless_input: Option<BlamelessBlock>,
    pub statuspage_input: Option<StatuspageBlock>,
    pub opsgenie_input: Option<OpsGenieBlock>,
    pub firehydrant_input: Option<FireHydrantBlock>,
    pub clubhouse_input: Option<ClubhouseBlock>,
}

impl IncidentImpactSourcePlan {
    /// The provider each configured block belongs to, in schema order.
    fn configured_variants(&self) -> Vec<IncidentProvider> {
        let mut variants = Vec::new();
        if self.pagerduty_input.is_some() {
            variants.push(IncidentProvider::Pagerduty);
        }
        if self.datadog_input.is_some() {
            variants.push(IncidentProvider::Datadog);
        }
        if self.jira_input.is_some() {
            variants.push(IncidentProvider::Jira);
        }
        if self.blameless_input.is_some() {
            variants.push(IncidentProvider::Blameless);
        }
        if self.statuspage_input.is_some() {
            variants.push(IncidentProvider::Statuspage);
        }
        if self.opsgenie_input.is_some() {
            variants.push(IncidentProvider::Opsgenie);
        }
        if self.firehydrant_input.is_some() {
            variants.push(IncidentProvider::Firehydrant);
        }
        if self.clubhouse_input.is_some() {
            variants.push(IncidentProvider::Clubhouse);
        }
        variants
    }
}

pub struct IncidentImpactSourceResource;

impl IncidentImpactSourceResource {
    /// Pre-flight: the provider name must parse, and exactly the matching
    /// block must be configured (none for CUSTOM_INCIDENT).
    fn validate(plan: &IncidentImpactSourcePlan) -> ProviderResult<IncidentProvider> {
        let provider = IncidentProvider::parse(&plan.provider_name).ok_or_else(|| {
            ProviderError::Validation(format!(
                "unknown incident provider name: {}",
                plan.provider_name
            ))
        })?;
        let configured = plan.configured_variants();
        match provider {
            IncidentProvider::CustomIncident => {
                if !configured.is_empty() {
                    return Err(ProviderError::Validation(
                        "provider_name CUSTOM_INCIDENT takes no provider block".to_string(),
                    ));
                }
            }
            _ => match configured.as_slice() {
                [single] if *single == provider => {}
                [] => {
                    return Err(ProviderError::Validation(format!(
                        "provider_name {} requires its provider block",
                        provider
                    )));
                }
                [single] => {
                    return Err(ProviderError::Validation(format!(
                        "provider_name {} does not match the configured {} block",
                        plan.provider_name, single
                    )));
                }
                _ => {
                    return Err(ProviderError::Validation(
                        "exactly one provider block must be set".to_string(),
                    ));
                }
            },
        }
        Ok(provider)
    }

    /// Build the wire input: eight nullable fields with exactly one set.
    fn mutable_fields(
        plan: &IncidentImpactSourcePlan,
        provider: IncidentProvider,
    ) -> MutableIncidentImpactSource {
        MutableIncidentImpactSource {
            name: plan.name.clone(),
            environment_name: plan.environment_name.clone(),
            provider: provider.as_str().to_string(),
            pagerduty_input: plan.pagerduty_input.clone().map(Into::into),
            datadog_input: plan.datadog_input.clone().map(Into::into),
            jira_input: plan.jira_input.clone().map(Into::into),
            blameless_input: plan.blameless_input.clone().map(Into::into),
            statuspage_input: plan.statuspage_input.clone().map(Into::into),
            opsgenie_input: plan.opsgenie_input.clone().map(Into::into),
            firehydrant_input: plan.firehydrant_input.clone().map(Into::into),
            clubhouse_input: plan.clubhouse_input.clone().map(Into::into),
        }
    }

    /// Materialize state: the active block from the remote details, every
    /// other block null, `provider_name` with the caller's spelling.
    fn state_from(
        project_slug: &str,
        remote: IncidentImpactSource,
        provider_name: &str,
    ) -> IncidentImpactSourceState {
        let mut state = IncidentImpactSourceState {
            id: format!("{project_slug}/{}", remote.slug),
            project_slug: project_slug.to_string(),
            slug: remote.slug,
            name: remote.name,
            environment_name: remote.environment.name,
            provider_name: provider_name.to_string(),
            register_impact_link: remote.register_impact_link,
            pagerduty_input: None,
            datadog_input: None,
            jira_input: None,
            blameless_input: None,
            statuspage_input: None,
            opsgenie_input: None,
            firehydrant_input: None,
            clubhouse_input: None,
        };
        match remote.details {
            Some(IncidentProviderDetails::PagerDuty(d)) => {
                state.pagerduty_input = Some(d.into());
            }
            Some(IncidentProviderDetails::DataDog(d)) => {
                state.datadog_input = Some(d.into());
            }
            Some(IncidentProviderDetails::Jira(d)) => {
                state.jira_input = Some(d.into());
            }
            Some(IncidentProviderDetails::Blameless(d)) => {
                state.blameless_input = Some(d.into());
            }
            Some(IncidentProviderDetails::Statuspage(d)) => {
                state.statuspage_input = Some(d.into());
            }
            Some(IncidentProviderDetails::OpsGenie(d)) => {
                state.opsgenie_input = Some(d.into());
            }
            Some(IncidentProviderDetails::FireHydrant(d)) => {
                state.firehydrant_input = Some(d.into());
            }
            Some(IncidentProviderDetails::Clubhouse(d)) => {
                state.clubhouse_input = Some(d.into());
            }
            None => {}
        }
        state
    }
}

#[async_trait]
impl ResourceLifecycle for IncidentImpactSourceResource {
    type Plan = IncidentImpactSourcePlan;
    type State = IncidentImpactSourceState;

    fn type_name(&self) -> &'static str {
        "sleuth_incident_impact_source"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "An incident-tracker impact source. Exactly one provider block \
             must be configured, matching provider_name; CUSTOM_INCIDENT \
             takes none and relies on the register-impact webhook.",
            vec![
                Attribute::computed("id", AttrType::String),
                Attribute::computed("slug", AttrType::String),
                Attribute::computed("register_impact_link", AttrType::String),
                Attribute::required("project_slug", AttrType::String),
                Attribute::required("name", AttrType::String),
                Attribute::required("environment_name", AttrType::String),
                Attribute::required("provider_name", AttrType::String).describe(
                    "PAGERDUTY, DATADOG, JIRA, CUSTOM_INCIDENT, BLAMELESS, STATUSPAGE, \
                     OPSGENIE, FIREHYDRANT or CLUBHOUSE. Stored with the spelling used \
                     in the configuration.",
                ),
                Attribute::optional("pagerduty_input", AttrType::Block).with_block(vec![
                    Attribute::optional("remote_services", AttrType::String).with_default(""),
                    Attribute::optional("remote_urgency", AttrType::String),
                ]),
                Attribute::optional("datadog_input", AttrType::Block).with_block(vec![
                    Attribute::optional("query", AttrType::String).with_default(""),
                    Attribute::optional("remote_priority_threshold", AttrType::String)
                        .with_default("ALL"),
                    Attribute::optional("integration_slug", AttrType::String),
                ]),
                Attribute::optional("jira_input", AttrType::Block).with_block(vec![
                    Attribute::required("remote_jql", AttrType::String),
                    Attribute::optional("integration_slug", AttrType::String),
                ]),
                Attribute::optional("blameless_input", AttrType::Block).with_block(vec![
                    Attribute::optional("remote_types", AttrType::ListString),
                    Attribute::optional("remote_severity_threshold", AttrType::String),
                    Attribute::optional("integration_slug", AttrType::String),
                ]),
                Attribute::optional("statuspage_input", AttrType::Block).with_block(vec![
                    Attribute::required("remote_page", AttrType::String),
                    Attribute::optional("remote_component", AttrType::String),
                    Attribute::optional("remote_impact", AttrType::String),
                    Attribute::optional("integration_slug", AttrType::String),
                ]),
                Attribute::optional("opsgenie_input", AttrType::Block).with_block(vec![
                    Attribute::optional("remote_priority_threshold", AttrType::String)
                        .with_default("ALL"),
                    Attribute::optional("remote_use_alerts", AttrType::Bool).with_default(false),
                    Attribute::optional("remote_incident_tags", AttrType::String),
                    Attribute::optional("remote_alert_tags", AttrType::String),
                    Attribute::optional("integration_slug", AttrType::String),
                ]),
                Attribute::optional("firehydrant_input", AttrType::Block).with_block(vec![
                    Attribute::optional("remote_mitigated_is_healthy", AttrType::Bool)
                        .with_default(false),
                    Attribute::optional("remote_environments", AttrType::String),
                    Attribute::optional("integration_slug", AttrType::String),
                ]),
                Attribute::optional("clubhouse_input", AttrType::Block).with_block(vec![
                    Attribute::optional("remote_query", AttrType::String),
                    Attribute::optional("integration_slug", AttrType::String),
                ]),
            ],
        )
    }

    async fn create(&self, ctx: &OpContext, plan: Self::Plan) -> ProviderResult<Self::State> {
        let provider = Self::validate(&plan)?;
        let source = ctx
            .api
            .create_incident_impact_source(CreateIncidentImpactSourceInput {
                project_slug: plan.project_slug.clone(),
                fields: Self::mutable_fields(&plan, provider),
            })
            .await?;
        Ok(Self::state_from(
            &plan.project_slug,
            source,
            &plan.provider_name,
        ))
    }

    async fn read(
        &self,
        ctx: &OpContext,
        state: Self::State,
    ) -> ProviderResult<Option<Self::State>> {
        let found = ctx
            .api
            .get_incident_impact_source(&state.project_slug, &state.slug)
            .await?;
        Ok(found.map(|source| {
            Self::state_from(&state.project_slug, source, &state.provider_name)
        }))
    }

    async fn update(
        &self,
        ctx: &OpContext,
        plan: Self::Plan,
        state: Self::State,
    ) -> ProviderResult<Self::State> {
        let provider = Self::validate(&plan)?;
        let source = ctx
            .api
            .update_incident_impact_source(UpdateIncidentImpactSourceInput {
                project_slug: state.project_slug.clone(),
                slug: state.slug.clone(),
                fields: Self::mutable_fields(&plan, provider),
            })
            .await?;
        Ok(Self::state_from(
            &state.project_slug,
            source,
            &plan.provider_name,
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
            .get_incident_impact_source(&project_slug, &slug)
            .await?
        else {
            return Err(ProviderError::NotFound);
        };
        let provider_name = source.provider.clone();
        Ok(Self::state_from(&project_slug, source, &provider_name))
    }
}
