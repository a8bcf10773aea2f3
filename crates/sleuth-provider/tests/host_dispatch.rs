//! Host-harness dispatch tests: JSON plan/state documents through the
//! registry, concurrent operations sharing one provider.

use std::sync::Arc;

use serde_json::json;
use sleuth_client::fakes::InMemorySleuth;
use sleuth_provider::host::{dispatch, HostOp, HostRequest};
use sleuth_provider::{Severity, SleuthProvider};

fn provider() -> (Arc<InMemorySleuth>, SleuthProvider) {
    let api = Arc::new(InMemorySleuth::new());
    let provider = SleuthProvider::with_api(api.clone());
    (api, provider)
}

fn request(id: u64, resource: &str, op: HostOp) -> HostRequest {
    HostRequest {
        id,
        resource: resource.to_string(),
        op,
        plan: None,
        state: None,
        import_id: None,
    }
}

#[tokio::test]
async fn create_then_read_through_the_harness() {
    let (_api, provider) = provider();

    let mut create = request(1, "sleuth_project", HostOp::Create);
    create.plan = Some(json!({ "name": "My App" }));
    let response = dispatch(&provider, create).await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let state = response.state.expect("state");
    assert_eq!(state["slug"], "my-app");

    let mut read = request(2, "sleuth_project", HostOp::Read);
    read.state = Some(state.clone());
    let response = dispatch(&provider, read).await;
    assert!(response.diagnostics.is_empty());
    assert!(!response.removed);
    assert_eq!(response.state.expect("state"), state);
}

#[tokio::test]
async fn read_of_deleted_entity_sets_removed() {
    let (_api, provider) = provider();

    let mut create = request(1, "sleuth_project", HostOp::Create);
    create.plan = Some(json!({ "name": "Gone" }));
    let state = dispatch(&provider, create).await.state.expect("state");

    let mut delete = request(2, "sleuth_project", HostOp::Delete);
    delete.state = Some(state.clone());
    let response = dispatch(&provider, delete).await;
    assert!(response.diagnostics.is_empty());

    let mut read = request(3, "sleuth_project", HostOp::Read);
    read.state = Some(state);
    let response = dispatch(&provider, read).await;
    assert!(response.removed);
    assert!(response.state.is_none());
}

#[tokio::test]
async fn unknown_resource_yields_a_diagnostic() {
    let (_api, provider) = provider();
    let response = dispatch(&provider, request(9, "sleuth_widget", HostOp::Create)).await;
    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].severity, Severity::Error);
    assert!(response.diagnostics[0].detail.contains("sleuth_widget"));
}

#[tokio::test]
async fn missing_plan_yields_a_diagnostic() {
    let (_api, provider) = provider();
    let response = dispatch(&provider, request(4, "sleuth_project", HostOp::Create)).await;
    assert_eq!(response.diagnostics.len(), 1);
    assert!(response.diagnostics[0].detail.contains("missing plan"));
}

#[tokio::test]
async fn schema_op_dumps_attributes() {
    let (_api, provider) = provider();
    let response = dispatch(&provider, request(5, "sleuth_environment", HostOp::Schema)).await;
    let schema = response.schema.expect("schema");
    let names: Vec<&str> = schema["attributes"]
        .as_array()
        .expect("attributes")
        .iter()
        .map(|a| a["name"].as_str().expect("name"))
        .collect();
    assert!(names.contains(&"project_slug"));
    assert!(names.contains(&"color"));
}

#[tokio::test]
async fn import_goes_through_the_composite_id_parser() {
    let (_api, provider) = provider();

    let mut create = request(1, "sleuth_project", HostOp::Create);
    create.plan = Some(json!({ "name": "Proj" }));
    dispatch(&provider, create).await.state.expect("state");

    let mut import = request(2, "sleuth_environment", HostOp::Import);
    import.import_id = Some("proj/production".to_string());
    let response = dispatch(&provider, import).await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(response.state.expect("state")["slug"], "production");

    let mut bad = request(3, "sleuth_environment", HostOp::Import);
    bad.import_id = Some("no-slash".to_string());
    let response = dispatch(&provider, bad).await;
    assert_eq!(response.diagnostics.len(), 1);
    assert!(response.diagnostics[0]
        .detail
        .contains("invalid resource ID: no-slash"));
}

#[tokio::test]
async fn concurrent_operations_share_the_provider() {
    let (_api, provider) = provider();
    let provider = Arc::new(provider);

    let mut handles = Vec::new();
    for n in 0..8 {
        let provider = Arc::clone(&provider);
        handles.push(tokio::spawn(async move {
            let mut create = request(n, "sleuth_project", HostOp::Create);
            create.plan = Some(json!({ "name": format!("Concurrent {n}") }));
            dispatch(&provider, create).await
        }));
    }
    for handle in handles {
        let response = handle.await.expect("join");
        assert!(response.diagnostics.is_empty());
        assert!(response.state.is_some());
    }
}
