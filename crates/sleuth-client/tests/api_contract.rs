//! Contract tests for the `SleuthApi` trait, run against the in-memory
//! fake. Any conforming backend must pass these.

use sleuth_client::fakes::{InMemorySleuth, MemberCall};
use sleuth_client::model::*;
use sleuth_client::{ApiError, SleuthApi};

fn project_input(name: &str) -> CreateProjectInput {
    CreateProjectInput {
        fields: MutableProject {
            name: name.to_string(),
            description: None,
            issue_tracker_provider: None,
            build_provider: None,
            change_failure_rate_boundary: None,
            impact_sensitivity: None,
            failure_sensitivity: Some(420),
            change_lead_time_start_definition: None,
            change_lead_time_issue_states: Vec::new(),
            change_lead_time_strict_matching: None,
        },
    }
}

// ===========================================================================
// Projects and environments
// ===========================================================================

#[tokio::test]
async fn project_create_seeds_production_environment() {
    let api = InMemorySleuth::new();
    let project = api.create_project(project_input("My App")).await.unwrap();
    assert_eq!(project.slug, "my-app");

    let production = api
        .get_environment_by_name(&project.slug, "Production")
        .await
        .unwrap()
        .expect("auto-created environment");
    assert_eq!(production.slug, "production");
    assert_eq!(production.color.as_deref(), Some("#cecece"));
}

#[tokio::test]
async fn project_slugs_are_unique_per_name() {
    let api = InMemorySleuth::new();
    let first = api.create_project(project_input("App")).await.unwrap();
    let second = api.create_project(project_input("App")).await.unwrap();
    assert_eq!(first.slug, "app");
    assert_eq!(second.slug, "app-2");
}

#[tokio::test]
async fn deleting_last_environment_cascades_to_project() {
    let api = InMemorySleuth::new();
    let project = api.create_project(project_input("Cascade")).await.unwrap();

    let payload = api
        .delete_environment(&project.slug, "production")
        .await
        .unwrap();
    assert!(payload.success);

    // The project went with it; a follow-up delete reports "Missing".
    assert!(api.get_project(&project.slug).await.unwrap().is_none());
    let payload = api.delete_project(&project.slug).await.unwrap();
    assert!(!payload.success);
    assert_eq!(payload.message.as_deref(), Some("Missing"));
}

#[tokio::test]
async fn get_environment_returns_none_on_miss() {
    let api = InMemorySleuth::new();
    let project = api.create_project(project_input("Lookup")).await.unwrap();
    let found = api.get_environment(&project.slug, "staging").await.unwrap();
    assert!(found.is_none());
}

// ===========================================================================
// Code change sources
// ===========================================================================

fn change_source_input(project_slug: &str) -> CreateCodeChangeSourceInput {
    CreateCodeChangeSourceInput {
        project_slug: project_slug.to_string(),
        initialize_changes: true,
        fields: MutableCodeChangeSource {
            name: "Backend".to_string(),
            repository: RepositoryInput {
                owner: "sleuth-io".to_string(),
                name: "backend".to_string(),
                url: "https://github.com/sleuth-io/backend".to_string(),
                provider: "GITHUB".to_string(),
                integration_slug: None,
                project_uid: None,
                repo_uid: None,
            },
            environment_mappings: vec![EnvironmentMapping {
                environment_slug: "production".to_string(),
                branch: "main".to_string(),
            }],
            build_mappings: Vec::new(),
            deploy_tracking_type: "build".to_string(),
            collect_impact: true,
            notify_in_slack: true,
            include_in_dashboard: true,
            path_prefix: None,
            auto_tracking_delay: 0,
        },
    }
}

#[tokio::test]
async fn change_source_create_mints_webhook() {
    let api = InMemorySleuth::new();
    let project = api.create_project(project_input("Hooked")).await.unwrap();
    let source = api
        .create_code_change_source(change_source_input(&project.slug))
        .await
        .unwrap();

    let webhook = source.repository.webhook.expect("minted webhook");
    assert!(webhook.url.starts_with("https://"));
    assert!(!webhook.secret.is_empty());
}

#[tokio::test]
async fn change_source_update_preserves_webhook() {
    let api = InMemorySleuth::new();
    let project = api.create_project(project_input("Stable")).await.unwrap();
    let created = api
        .create_code_change_source(change_source_input(&project.slug))
        .await
        .unwrap();
    let webhook = created.repository.webhook.clone().unwrap();

    let mut fields = change_source_input(&project.slug).fields;
    fields.name = "Renamed".to_string();
    let updated = api
        .update_code_change_source(UpdateCodeChangeSourceInput {
            project_slug: project.slug.clone(),
            slug: created.slug.clone(),
            fields,
        })
        .await
        .unwrap();

    assert_eq!(updated.repository.webhook, Some(webhook));
    assert_eq!(updated.slug, created.slug);
}

// ===========================================================================
// Impact sources
// ===========================================================================

#[tokio::test]
async fn incident_source_stores_single_variant() {
    let api = InMemorySleuth::new();
    let project = api.create_project(project_input("Paged")).await.unwrap();

    let source = api
        .create_incident_impact_source(CreateIncidentImpactSourceInput {
            project_slug: project.slug.clone(),
            fields: MutableIncidentImpactSource {
                name: "Pages".to_string(),
                environment_name: "Production".to_string(),
                provider: "PAGERDUTY".to_string(),
                pagerduty_input: Some(PagerDutyDetails {
                    remote_services: String::new(),
                    remote_urgency: Some("HIGH".to_string()),
                }),
                datadog_input: None,
                jira_input: None,
                blameless_input: None,
                statuspage_input: None,
                opsgenie_input: None,
                firehydrant_input: None,
                clubhouse_input: None,
            },
        })
        .await
        .unwrap();

    assert!(source.register_impact_link.is_some());
    match source.details {
        Some(IncidentProviderDetails::PagerDuty(d)) => {
            assert_eq!(d.remote_urgency.as_deref(), Some("HIGH"));
        }
        other => panic!("expected PagerDuty details, got {other:?}"),
    }
}

#[tokio::test]
async fn delete_impact_source_spans_all_kinds() {
    let api = InMemorySleuth::new();
    let project = api.create_project(project_input("Impacts")).await.unwrap();

    let error_source = api
        .create_error_impact_source(CreateErrorImpactSourceInput {
            project_slug: project.slug.clone(),
            fields: MutableErrorImpactSource {
                name: "Sentry".to_string(),
                environment_slug: "production".to_string(),
                provider: "SENTRY".to_string(),
                error_org_key: "org".to_string(),
                error_project_key: "proj".to_string(),
                error_environment: "prod".to_string(),
                manually_set_health_threshold: None,
                integration_slug: None,
            },
        })
        .await
        .unwrap();

    let payload = api
        .delete_impact_source(&project.slug, &error_source.slug)
        .await
        .unwrap();
    assert!(payload.success);

    let payload = api
        .delete_impact_source(&project.slug, &error_source.slug)
        .await
        .unwrap();
    assert!(!payload.success);
    assert_eq!(payload.message.as_deref(), Some("Missing"));
}

#[tokio::test]
async fn error_source_create_requires_known_environment() {
    let api = InMemorySleuth::new();
    let project = api.create_project(project_input("Strict")).await.unwrap();

    let err = api
        .create_error_impact_source(CreateErrorImpactSourceInput {
            project_slug: project.slug.clone(),
            fields: MutableErrorImpactSource {
                name: "Sentry".to_string(),
                environment_slug: "nonexistent".to_string(),
                provider: "SENTRY".to_string(),
                error_org_key: "org".to_string(),
                error_project_key: "proj".to_string(),
                error_environment: "prod".to_string(),
                manually_set_health_threshold: None,
                integration_slug: None,
            },
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Remote { .. }));
}

// ===========================================================================
// Teams and membership
// ===========================================================================

#[tokio::test]
async fn team_miss_reports_not_found_suffix() {
    let api = InMemorySleuth::new();
    let err = api.get_team("ghost").await.unwrap_err();
    match err {
        ApiError::Remote { messages } => {
            assert!(messages[0].ends_with(" not found"), "got {messages:?}");
        }
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn membership_is_an_ordered_set() {
    let api = InMemorySleuth::new();
    let alice = api.seed_user("alice@example.com");
    let bob = api.seed_user("bob@example.com");
    let team = api
        .create_team(CreateTeamInput {
            name: "Platform".to_string(),
            parent_team_slug: None,
        })
        .await
        .unwrap();

    api.add_team_members(&team.slug, &[alice.id.clone(), bob.id.clone()])
        .await
        .unwrap();
    // Re-adding is a no-op, not a duplicate.
    api.add_team_members(&team.slug, &[alice.id.clone()])
        .await
        .unwrap();

    let members = api.team_members(&team.slug).await.unwrap();
    let emails: Vec<&str> = members.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(emails, vec!["alice@example.com", "bob@example.com"]);

    api.remove_team_members(&team.slug, &[alice.id.clone()])
        .await
        .unwrap();
    let members = api.team_members(&team.slug).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].email, "bob@example.com");

    let calls = api.member_calls();
    assert_eq!(calls.len(), 3);
    assert!(matches!(calls[2], MemberCall::Remove { .. }));
}

#[tokio::test]
async fn find_users_filters_by_email() {
    let api = InMemorySleuth::new();
    api.seed_user("a@example.com");
    api.seed_user("b@example.com");

    let found = api
        .find_users_by_email(&["a@example.com".to_string(), "c@example.com".to_string()])
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].email, "a@example.com");
}

#[tokio::test]
async fn subteam_requires_existing_parent() {
    let api = InMemorySleuth::new();
    let err = api
        .create_team(CreateTeamInput {
            name: "Orphan".to_string(),
            parent_team_slug: Some("ghost".to_string()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Remote { .. }));
}
