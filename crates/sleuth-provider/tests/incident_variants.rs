//! Incident impact source variant exclusivity across every provider.

use std::sync::Arc;

use sleuth_client::fakes::InMemorySleuth;
use sleuth_provider::resources::incident_impact_source::{
    IncidentImpactSourcePlan, IncidentImpactSourceResource, IncidentImpactSourceState,
};
use sleuth_provider::resources::project::{ProjectPlan, ProjectResource};
use sleuth_provider::{OpContext, ResourceLifecycle};

fn harness() -> (Arc<InMemorySleuth>, OpContext) {
    let api = Arc::new(InMemorySleuth::new());
    let ctx = OpContext::new(api.clone());
    (api, ctx)
}

async fn seed_project(ctx: &OpContext) -> String {
    ProjectResource
        .create(
            ctx,
            serde_json::from_value::<ProjectPlan>(serde_json::json!({ "name": "Proj" }))
                .expect("plan"),
        )
        .await
        .unwrap()
        .slug
}

/// A minimal valid plan for the given provider: `provider_name` plus
/// exactly the matching block.
fn variant_plan(project_slug: &str, provider_name: &str) -> IncidentImpactSourcePlan {
    let block = match provider_name {
        "PAGERDUTY" => Some(("pagerduty_input", serde_json::json!({}))),
        "DATADOG" => Some(("datadog_input", serde_json::json!({ "query": "status:error" }))),
        "JIRA" => Some((
            "jira_input",
            serde_json::json!({ "remote_jql": "project = OPS" }),
        )),
        "BLAMELESS" => Some(("blameless_input", serde_json::json!({}))),
        "STATUSPAGE" => Some((
            "statuspage_input",
            serde_json::json!({ "remote_page": "status.example.com" }),
        )),
        "OPSGENIE" => Some(("opsgenie_input", serde_json::json!({}))),
        "FIREHYDRANT" => Some(("firehydrant_input", serde_json::json!({}))),
        "CLUBHOUSE" => Some(("clubhouse_input", serde_json::json!({}))),
        "CUSTOM_INCIDENT" => None,
        other => panic!("unexpected provider {other}"),
    };
    let mut raw = serde_json::json!({
        "project_slug": project_slug,
        "name": format!("{provider_name} incidents"),
        "environment_name": "Production",
        "provider_name": provider_name,
    });
    if let Some((field, value)) = block {
        raw[field] = value;
    }
    serde_json::from_value(raw).expect("plan")
}

fn set_blocks(state: &IncidentImpactSourceState) -> Vec<&'static str> {
    let mut set = Vec::new();
    if state.pagerduty_input.is_some() {
        set.push("pagerduty_input");
    }
    if state.datadog_input.is_some() {
        set.push("datadog_input");
    }
    if state.jira_input.is_some() {
        set.push("jira_input");
    }
    if state.blameless_input.is_some() {
        set.push("blameless_input");
    }
    if state.statuspage_input.is_some() {
        set.push("statuspage_input");
    }
    if state.opsgenie_input.is_some() {
        set.push("opsgenie_input");
    }
    if state.firehydrant_input.is_some() {
        set.push("firehydrant_input");
    }
    if state.clubhouse_input.is_some() {
        set.push("clubhouse_input");
    }
    set
}

#[tokio::test]
async fn every_provider_keeps_exactly_its_own_variant() {
    let (_api, ctx) = harness();
    let project_slug = seed_project(&ctx).await;

    for provider_name in [
        "PAGERDUTY",
        "DATADOG",
        "JIRA",
        "BLAMELESS",
        "STATUSPAGE",
        "OPSGENIE",
        "FIREHYDRANT",
        "CLUBHOUSE",
    ] {
        let plan = variant_plan(&project_slug, provider_name);
        let state = IncidentImpactSourceResource
            .create(&ctx, plan)
            .await
            .unwrap();
        let expected_block = format!("{}_input", provider_name.to_ascii_lowercase());
        assert_eq!(
            set_blocks(&state),
            vec![expected_block.as_str()],
            "{provider_name} state must fill only its own block"
        );
        assert_eq!(state.provider_name, provider_name);
        assert!(state.register_impact_link.is_some());

        // Read-back preserves the exclusivity.
        let read = IncidentImpactSourceResource
            .read(&ctx, state.clone())
            .await
            .unwrap()
            .expect("present");
        assert_eq!(set_blocks(&read), vec![expected_block.as_str()]);
        assert_eq!(read, state);
    }
}

#[tokio::test]
async fn custom_incident_has_no_variant_block() {
    let (_api, ctx) = harness();
    let project_slug = seed_project(&ctx).await;

    let state = IncidentImpactSourceResource
        .create(&ctx, variant_plan(&project_slug, "CUSTOM_INCIDENT"))
        .await
        .unwrap();
    assert!(set_blocks(&state).is_empty());
    assert!(state.register_impact_link.is_some());
}

#[tokio::test]
async fn datadog_plan_keeps_lowercase_provider_name_in_state() {
    let (_api, ctx) = harness();
    let project_slug = seed_project(&ctx).await;

    let plan: IncidentImpactSourcePlan = serde_json::from_value(serde_json::json!({
        "project_slug": project_slug,
        "name": "Incidents",
        "environment_name": "Production",
        "provider_name": "datadog",
        "datadog_input": { "query": "x", "remote_priority_threshold": "P3" },
    }))
    .expect("plan");

    let state = IncidentImpactSourceResource
        .create(&ctx, plan)
        .await
        .unwrap();
    // Wire carries DATADOG; state keeps the plan's spelling.
    assert_eq!(state.provider_name, "datadog");
    let block = state.datadog_input.as_ref().expect("datadog block");
    assert_eq!(block.remote_priority_threshold, "P3");
    assert_eq!(set_blocks(&state), vec!["datadog_input"]);
}

#[tokio::test]
async fn update_can_switch_variants() {
    let (_api, ctx) = harness();
    let project_slug = seed_project(&ctx).await;

    let created = IncidentImpactSourceResource
        .create(&ctx, variant_plan(&project_slug, "DATADOG"))
        .await
        .unwrap();

    let mut switched = variant_plan(&project_slug, "OPSGENIE");
    switched.name = created.name.clone();
    let updated = IncidentImpactSourceResource
        .update(&ctx, switched, created)
        .await
        .unwrap();
    assert_eq!(set_blocks(&updated), vec!["opsgenie_input"]);
    assert_eq!(updated.provider_name, "OPSGENIE");
}
