//! Environment adoption and cascade-delete scenarios.

use std::sync::Arc;

use sleuth_client::fakes::InMemorySleuth;
use sleuth_client::SleuthApi;
use sleuth_provider::resources::environment::{EnvironmentPlan, EnvironmentResource};
use sleuth_provider::resources::project::{ProjectPlan, ProjectResource};
use sleuth_provider::{OpContext, ResourceLifecycle};

fn harness() -> (Arc<InMemorySleuth>, OpContext) {
    let api = Arc::new(InMemorySleuth::new());
    let ctx = OpContext::new(api.clone());
    (api, ctx)
}

fn project_plan(name: &str) -> ProjectPlan {
    serde_json::from_value(serde_json::json!({ "name": name })).expect("plan")
}

fn environment_plan(project_slug: &str, name: &str, color: &str) -> EnvironmentPlan {
    serde_json::from_value(serde_json::json!({
        "project_slug": project_slug,
        "name": name,
        "color": color,
    }))
    .expect("plan")
}

#[tokio::test]
async fn creating_production_adopts_the_seeded_environment() {
    let (api, ctx) = harness();
    let project = ProjectResource
        .create(&ctx, project_plan("Proj"))
        .await
        .unwrap();

    // The server already auto-created "Production"; applying an
    // environment resource with that name must update it, not duplicate.
    let state = EnvironmentResource
        .create(
            &ctx,
            environment_plan(&project.slug, "Production", "#ff0000"),
        )
        .await
        .unwrap();
    assert_eq!(state.slug, "production");
    assert_eq!(state.color, "#ff0000");

    // Exactly one Production environment exists, with the new color.
    let envs_snapshot = api
        .environment_snapshot(&project.slug, "production")
        .expect("still present");
    assert_eq!(envs_snapshot.color.as_deref(), Some("#ff0000"));
    let by_name = api
        .get_environment_by_name(&project.slug, "Production")
        .await
        .unwrap()
        .expect("present");
    assert_eq!(by_name.slug, "production");
}

#[tokio::test]
async fn fresh_environment_is_created_not_adopted() {
    let (_api, ctx) = harness();
    let project = ProjectResource
        .create(&ctx, project_plan("Proj"))
        .await
        .unwrap();

    let state = EnvironmentResource
        .create(&ctx, environment_plan(&project.slug, "Staging", "#00ff00"))
        .await
        .unwrap();
    assert_eq!(state.slug, "staging");

    let read = EnvironmentResource
        .read(&ctx, state.clone())
        .await
        .unwrap()
        .expect("present");
    assert_eq!(read, state);
}

#[tokio::test]
async fn destroy_tolerates_project_cascade_delete() {
    let (api, ctx) = harness();
    let project = ProjectResource
        .create(&ctx, project_plan("P"))
        .await
        .unwrap();
    let environment = EnvironmentResource
        .create(
            &ctx,
            environment_plan(&project.slug, "Production", "#cecece"),
        )
        .await
        .unwrap();

    // Destroy order: environment first. Dropping the last environment
    // cascade-deletes the project server-side.
    EnvironmentResource.delete(&ctx, environment).await.unwrap();
    assert!(!api.project_exists(&project.slug));

    // The project delete then reports "Missing", which must not surface
    // as an error.
    ProjectResource.delete(&ctx, project).await.unwrap();
}

#[tokio::test]
async fn import_parses_composite_environment_id() {
    let (_api, ctx) = harness();
    let project = ProjectResource
        .create(&ctx, project_plan("Proj"))
        .await
        .unwrap();

    let imported = EnvironmentResource
        .import(&ctx, &format!("{}/production", project.slug))
        .await
        .unwrap();
    assert_eq!(imported.slug, "production");
    assert_eq!(imported.project_slug, project.slug);

    let err = EnvironmentResource
        .import(&ctx, "not-a-composite")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid resource ID: not-a-composite");
}
