//! Error and metric impact source lifecycle tests.

use std::sync::Arc;

use sleuth_client::fakes::InMemorySleuth;
use sleuth_provider::resources::error_impact_source::{
    ErrorImpactSourcePlan, ErrorImpactSourceResource,
};
use sleuth_provider::resources::metric_impact_source::{
    MetricImpactSourcePlan, MetricImpactSourceResource,
};
use sleuth_provider::resources::project::{ProjectPlan, ProjectResource};
use sleuth_provider::{OpContext, ProviderError, ResourceLifecycle};

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

fn error_plan(project_slug: &str, environment_slug: &str) -> ErrorImpactSourcePlan {
    serde_json::from_value(serde_json::json!({
        "project_slug": project_slug,
        "name": "Sentry",
        "environment_slug": environment_slug,
        "provider": "Sentry",
        "error_org_key": "my-org",
        "error_project_key": "backend",
        "error_environment": "prod",
    }))
    .expect("plan")
}

#[tokio::test]
async fn error_source_round_trips_with_composite_id() {
    let (_api, ctx) = harness();
    let project_slug = seed_project(&ctx).await;

    let created = ErrorImpactSourceResource
        .create(&ctx, error_plan(&project_slug, "production"))
        .await
        .unwrap();
    assert_eq!(created.id, format!("{project_slug}/{}", created.slug));
    assert_eq!(created.environment_slug, "production");
    // Plan spelling survives the upper-cased wire round trip.
    assert_eq!(created.provider, "Sentry");

    let read = ErrorImpactSourceResource
        .read(&ctx, created.clone())
        .await
        .unwrap()
        .expect("present");
    assert_eq!(read, created);

    let imported = ErrorImpactSourceResource
        .import(&ctx, &created.id)
        .await
        .unwrap();
    assert_eq!(imported.slug, created.slug);
}

#[tokio::test]
async fn error_source_accepts_qualified_environment_slug() {
    let (_api, ctx) = harness();
    let project_slug = seed_project(&ctx).await;

    let created = ErrorImpactSourceResource
        .create(
            &ctx,
            error_plan(&project_slug, &format!("{project_slug}/production")),
        )
        .await
        .unwrap();
    assert_eq!(created.environment_slug, "production");
}

#[tokio::test]
async fn metric_source_defaults_integration_slug() {
    let (_api, ctx) = harness();
    let project_slug = seed_project(&ctx).await;

    let plan: MetricImpactSourcePlan = serde_json::from_value(serde_json::json!({
        "project_slug": project_slug,
        "name": "Latency",
        "environment_slug": "production",
        "provider": "DataDog",
        "query": "avg:trace.web.request.duration",
        "less_is_better": true,
    }))
    .expect("plan");

    let created = MetricImpactSourceResource.create(&ctx, plan).await.unwrap();
    assert_eq!(created.integration_slug.as_deref(), Some("datadog"));
    assert_eq!(created.provider, "DataDog");

    let read = MetricImpactSourceResource
        .read(&ctx, created.clone())
        .await
        .unwrap()
        .expect("present");
    assert_eq!(read, created);
}

#[tokio::test]
async fn deleted_source_disappears_from_read() {
    let (_api, ctx) = harness();
    let project_slug = seed_project(&ctx).await;

    let created = ErrorImpactSourceResource
        .create(&ctx, error_plan(&project_slug, "production"))
        .await
        .unwrap();
    ErrorImpactSourceResource
        .delete(&ctx, created.clone())
        .await
        .unwrap();

    let read = ErrorImpactSourceResource.read(&ctx, created).await.unwrap();
    assert!(read.is_none());
}

#[tokio::test]
async fn import_rejects_malformed_composite_id() {
    let (_api, ctx) = harness();
    let err = ErrorImpactSourceResource
        .import(&ctx, "only-one-part")
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Validation(_)));
    assert_eq!(err.to_string(), "invalid resource ID: only-one-part");
}
