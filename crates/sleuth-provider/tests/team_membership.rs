//! Team membership set-diff reconciliation scenarios.

use std::collections::HashSet;
use std::sync::Arc;

use sleuth_client::fakes::{InMemorySleuth, MemberCall};
use sleuth_provider::resources::team::{TeamPlan, TeamResource};
use sleuth_provider::{OpContext, ProviderError, ResourceLifecycle};

fn harness() -> (Arc<InMemorySleuth>, OpContext) {
    let api = Arc::new(InMemorySleuth::new());
    let ctx = OpContext::new(api.clone());
    (api, ctx)
}

fn plan(name: &str, members: Option<Vec<&str>>) -> TeamPlan {
    TeamPlan {
        name: name.to_string(),
        parent_slug: None,
        members: members.map(|m| m.into_iter().map(str::to_string).collect()),
    }
}

fn email_set(members: &Option<Vec<String>>) -> HashSet<&str> {
    members
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(String::as_str)
        .collect()
}

#[tokio::test]
async fn membership_diff_issues_minimal_mutations() {
    let (api, ctx) = harness();
    let a = api.seed_user("a@example.com");
    api.seed_user("b@example.com");
    let c = api.seed_user("c@example.com");

    let created = TeamResource
        .create(&ctx, plan("Platform", Some(vec!["a@example.com", "b@example.com"])))
        .await
        .unwrap();
    assert_eq!(
        email_set(&created.members),
        HashSet::from(["a@example.com", "b@example.com"])
    );

    // Prior members [a, b]; plan members [b, c]: exactly one add of c and
    // one remove of a.
    let updated = TeamResource
        .update(
            &ctx,
            plan("Platform", Some(vec!["b@example.com", "c@example.com"])),
            created,
        )
        .await
        .unwrap();
    assert_eq!(
        email_set(&updated.members),
        HashSet::from(["b@example.com", "c@example.com"])
    );

    let calls = api.member_calls();
    // First call is the create-time add; then the diff pair.
    assert_eq!(calls.len(), 3);
    assert_eq!(
        calls[1],
        MemberCall::Add {
            team_slug: updated.slug.clone(),
            ids: vec![c.id.clone()],
        }
    );
    assert_eq!(
        calls[2],
        MemberCall::Remove {
            team_slug: updated.slug.clone(),
            ids: vec![a.id.clone()],
        }
    );
}

#[tokio::test]
async fn unchanged_membership_issues_no_mutations() {
    let (api, ctx) = harness();
    api.seed_user("a@example.com");

    let created = TeamResource
        .create(&ctx, plan("Quiet", Some(vec!["a@example.com"])))
        .await
        .unwrap();
    let calls_before = api.member_calls().len();

    TeamResource
        .update(&ctx, plan("Quiet", Some(vec!["a@example.com"])), created)
        .await
        .unwrap();
    assert_eq!(api.member_calls().len(), calls_before);
}

#[tokio::test]
async fn unknown_email_fails_validation() {
    let (api, ctx) = harness();
    api.seed_user("known@example.com");

    let err = TeamResource
        .create(
            &ctx,
            plan("Broken", Some(vec!["known@example.com", "ghost@example.com"])),
        )
        .await
        .unwrap_err();
    match err {
        ProviderError::Validation(message) => {
            assert_eq!(message, "unknown user email(s): ghost@example.com");
        }
        other => panic!("expected Validation, got {other}"),
    }
}

#[tokio::test]
async fn null_members_stay_null_and_unmanaged() {
    let (api, ctx) = harness();
    let created = TeamResource
        .create(&ctx, plan("Unmanaged", None))
        .await
        .unwrap();
    assert_eq!(created.members, None);
    assert!(api.member_calls().is_empty());

    let read = TeamResource
        .read(&ctx, created)
        .await
        .unwrap()
        .expect("present");
    assert_eq!(read.members, None);
}

#[tokio::test]
async fn state_members_are_sorted_by_user_id() {
    let (api, ctx) = harness();
    let mut seeded: Vec<_> = ["z@example.com", "m@example.com", "a@example.com"]
        .into_iter()
        .map(|email| api.seed_user(email))
        .collect();

    let created = TeamResource
        .create(
            &ctx,
            plan(
                "Sorted",
                Some(vec!["z@example.com", "m@example.com", "a@example.com"]),
            ),
        )
        .await
        .unwrap();

    seeded.sort_by(|x, y| x.id.cmp(&y.id));
    let expected: Vec<String> = seeded.into_iter().map(|u| u.email).collect();
    assert_eq!(created.members, Some(expected));
}

#[tokio::test]
async fn read_treats_not_found_as_absent() {
    let (_api, ctx) = harness();
    let created = TeamResource
        .create(&ctx, plan("Ephemeral", None))
        .await
        .unwrap();

    TeamResource.delete(&ctx, created.clone()).await.unwrap();
    let read = TeamResource.read(&ctx, created.clone()).await.unwrap();
    assert!(read.is_none());

    // Delete is idempotent: the "not found" answer is absorbed.
    TeamResource.delete(&ctx, created).await.unwrap();
}

#[tokio::test]
async fn subteam_round_trips_parent_slug() {
    let (_api, ctx) = harness();
    let parent = TeamResource
        .create(&ctx, plan("Parent", None))
        .await
        .unwrap();

    let child = TeamResource
        .create(
            &ctx,
            TeamPlan {
                name: "Child".to_string(),
                parent_slug: Some(parent.slug.clone()),
                members: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(child.parent_slug.as_deref(), Some(parent.slug.as_str()));

    let read = TeamResource
        .read(&ctx, child)
        .await
        .unwrap()
        .expect("present");
    assert_eq!(read.parent_slug.as_deref(), Some(parent.slug.as_str()));
}
