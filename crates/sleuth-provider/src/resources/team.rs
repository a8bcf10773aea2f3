//! The `sleuth_team` resource.
//!
//! Members are specified as user emails but the API mutates membership by
//! opaque user ID, so every apply runs an email→ID resolution step and a
//! set-diff against the live membership. The add and remove mutations are
//! independent and not transactional: a failure of either surfaces with
//! full detail so the user can re-apply. Read-back sorts member IDs
//! ascending before materializing emails to keep state diffs stable.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sleuth_client::model::{CreateTeamInput, Team, UpdateTeamInput};
use sleuth_client::ApiError;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::resource::{resolve_delete, OpContext, ResourceLifecycle};
use crate::schema::{AttrType, Attribute, Schema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPlan {
    pub name: String,
    #[serde(default)]
    pub parent_slug: Option<String>,
    /// Member emails. Null means "unmanaged" and is preserved as null in
    /// state; an empty list means "managed and empty".
    #[serde(default)]
    pub members: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamState {
    /// Bare team slug.
    pub id: String,
    pub name: String,
    pub slug: String,
    pub parent_slug: Option<String>,
    pub members: Option<Vec<String>>,
}

/// Whether a remote error is the server's "<thing> not found" miss.
fn is_not_found(err: &ApiError) -> bool {
    match err {
        ApiError::Remote { messages } => messages.iter().any(|m| m.ends_with(" not found")),
        _ => false,
    }
}

pub struct TeamResource;

impl TeamResource {
    /// Resolve plan emails to user IDs via the paginated organization
    /// query. Every email must resolve.
    async fn resolve_emails(
        ctx: &OpContext,
        emails: &[String],
    ) -> ProviderResult<HashMap<String, String>> {
        if emails.is_empty() {
            return Ok(HashMap::new());
        }
        let users = ctx.api.find_users_by_email(emails).await?;
        let resolved: HashMap<String, String> = users
            .into_iter()
            .map(|u| (u.email, u.id))
            .collect();
        let mut unresolved: Vec<&str> = emails
            .iter()
            .filter(|e| !resolved.contains_key(*e))
            .map(String::as_str)
            .collect();
        if !unresolved.is_empty() {
            unresolved.sort_unstable();
            return Err(ProviderError::Validation(format!(
                "unknown user email(s): {}",
                unresolved.join(", ")
            )));
        }
        Ok(resolved)
    }

    /// Diff desired membership against the live membership and issue the
    /// add/remove mutations, each only when its set is non-empty.
    async fn reconcile_members(
        ctx: &OpContext,
        slug: &str,
        desired_emails: &[String],
    ) -> ProviderResult<()> {
        let resolved = Self::resolve_emails(ctx, desired_emails).await?;
        let desired_ids: HashSet<&String> = resolved.values().collect();

        let current = ctx.api.team_members(slug).await?;
        let current_ids: HashSet<&String> = current.iter().map(|u| &u.id).collect();

        let mut to_add: Vec<String> = desired_ids
            .difference(&current_ids)
            .map(|id| (*id).clone())
            .collect();
        let mut to_remove: Vec<String> = current_ids
            .difference(&desired_ids)
            .map(|id| (*id).clone())
            .collect();
        to_add.sort_unstable();
        to_remove.sort_unstable();

        debug!(
            team = %slug,
            adding = to_add.len(),
            removing = to_remove.len(),
            "reconciling team membership"
        );
        if !to_add.is_empty() {
            ctx.api.add_team_members(slug, &to_add).await?;
        }
        if !to_remove.is_empty() {
            ctx.api.remove_team_members(slug, &to_remove).await?;
        }
        Ok(())
    }

    /// Live membership, sorted by user ID ascending, materialized as
    /// emails.
    async fn read_members(ctx: &OpContext, slug: &str) -> ProviderResult<Vec<String>> {
        let mut users = ctx.api.team_members(slug).await?;
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users.into_iter().map(|u| u.email).collect())
    }

    async fn state_from(
        ctx: &OpContext,
        team: Team,
        members_managed: bool,
    ) -> ProviderResult<TeamState> {
        let members = if members_managed {
            Some(Self::read_members(ctx, &team.slug).await?)
        } else {
            None
        };
        Ok(TeamState {
            id: team.slug.clone(),
            name: team.name,
            slug: team.slug,
            parent_slug: team.parent_slug,
            members,
        })
    }
}

#[async_trait]
impl ResourceLifecycle for TeamResource {
    type Plan = TeamPlan;
    type State = TeamState;

    fn type_name(&self) -> &'static str {
        "sleuth_team"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "An organizational team, optionally nested under a parent team. \
             Membership is reconciled by set diff against the live team.",
            vec![
                Attribute::computed("id", AttrType::String),
                Attribute::computed("slug", AttrType::String),
                Attribute::required("name", AttrType::String),
                Attribute::optional("parent_slug", AttrType::String),
                Attribute::optional("members", AttrType::ListString)
                    .describe("Member emails. Leave unset to keep membership unmanaged."),
            ],
        )
    }

    async fn create(&self, ctx: &OpContext, plan: Self::Plan) -> ProviderResult<Self::State> {
        let team = ctx
            .api
            .create_team(CreateTeamInput {
                name: plan.name.clone(),
                parent_team_slug: plan.parent_slug.clone(),
            })
            .await?;
        if let Some(members) = &plan.members {
            Self::reconcile_members(ctx, &team.slug, members).await?;
        }
        Self::state_from(ctx, team, plan.members.is_some()).await
    }

    async fn read(
        &self,
        ctx: &OpContext,
        state: Self::State,
    ) -> ProviderResult<Option<Self::State>> {
        let team = match ctx.api.get_team(&state.id).await {
            Ok(team) => team,
            Err(err) if is_not_found(&err) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(
            Self::state_from(ctx, team, state.members.is_some()).await?,
        ))
    }

    async fn update(
        &self,
        ctx: &OpContext,
        plan: Self::Plan,
        state: Self::State,
    ) -> ProviderResult<Self::State> {
        let team = ctx
            .api
            .update_team(UpdateTeamInput {
                slug: state.id.clone(),
                name: plan.name.clone(),
                parent_team_slug: plan.parent_slug.clone(),
            })
            .await?;
        if let Some(members) = &plan.members {
            Self::reconcile_members(ctx, &team.slug, members).await?;
        }
        Self::state_from(ctx, team, plan.members.is_some()).await
    }

    async fn delete(&self, ctx: &OpContext, state: Self::State) -> ProviderResult<()> {
        let payload = ctx.api.delete_team(&state.id).await?;
        resolve_delete(payload)
    }

    async fn import(&self, ctx: &OpContext, id: &str) -> ProviderResult<Self::State> {
        let team = match ctx.api.get_team(id).await {
            Ok(team) => team,
            Err(err) if is_not_found(&err) => return Err(ProviderError::NotFound),
            Err(err) => return Err(err.into()),
        };
        Self::state_from(ctx, team, true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found_matches_suffix_only() {
        let miss = ApiError::remote("Team platform not found");
        assert!(is_not_found(&miss));

        let failure = ApiError::remote("internal error");
        assert!(!is_not_found(&failure));

        let transport = ApiError::Transport("connection refused".to_string());
        assert!(!is_not_found(&transport));
    }

    #[test]
    fn test_plan_members_default_to_null() {
        let plan: TeamPlan = serde_json::from_value(serde_json::json!({
            "name": "Platform",
        }))
        .expect("deserialize");
        assert_eq!(plan.members, None);

        let plan: TeamPlan = serde_json::from_value(serde_json::json!({
            "name": "Platform",
            "members": [],
        }))
        .expect("deserialize");
        assert_eq!(plan.members, Some(Vec::new()));
    }
}
