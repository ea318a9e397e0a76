//! Group domain service implementing [`GroupCommand`] and [`GroupQuery`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use super::moderation::Moderated;
use super::policy::{GroupAction, RecipeAction, evaluate_group, evaluate_recipe};
use super::ports::{
    GroupCommand, GroupDetail, GroupPersistenceError, GroupQuery, GroupRepository, GroupSummary,
    InviteCodeSource, InvitePreview, MemberProfile, PendingRequestProfile, RecipeRepository,
    UserRepository,
};
use super::search::{GROUP_SEARCH_LIMIT, SearchQuery, group_listed_for};
use super::service_support::{
    index_membership, load_group, map_group_error, map_recipe_error, map_user_error,
    persist_group, resolve_actor,
};
use super::{Actor, Error, Group, GroupDetails, GroupId, InviteCode, UserId};

/// How many invite codes to try before giving up on a collision streak.
pub const MAX_INVITE_CODE_ATTEMPTS: usize = 10;

/// Group service wiring the user, group and recipe repositories.
#[derive(Clone)]
pub struct GroupService<U, G, R> {
    users: Arc<U>,
    groups: Arc<G>,
    recipes: Arc<R>,
    invite_codes: Arc<dyn InviteCodeSource>,
    clock: Arc<dyn Clock>,
}

impl<U, G, R> GroupService<U, G, R> {
    pub fn new(
        users: Arc<U>,
        groups: Arc<G>,
        recipes: Arc<R>,
        invite_codes: Arc<dyn InviteCodeSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            groups,
            recipes,
            invite_codes,
            clock,
        }
    }
}

impl<U, G, R> GroupService<U, G, R>
where
    U: UserRepository,
    G: GroupRepository,
    R: RecipeRepository,
{
    /// Insert a new group, regenerating the invite code until it is unique.
    async fn insert_with_unique_code(
        &self,
        actor: &Actor,
        details: GroupDetails,
    ) -> Result<Group, Error> {
        for attempt in 1..=MAX_INVITE_CODE_ATTEMPTS {
            let code = self.invite_codes.generate();
            if self
                .groups
                .find_by_invite_code(&code)
                .await
                .map_err(map_group_error)?
                .is_some()
            {
                debug!(attempt, "invite code already taken, regenerating");
                continue;
            }

            let group = Group::create(
                GroupId::random(),
                details.clone(),
                code,
                actor,
                self.clock.utc(),
            );
            match self.groups.insert(&group).await {
                Ok(()) => return Ok(group),
                Err(GroupPersistenceError::DuplicateInviteCode { .. }) => {
                    debug!(attempt, "invite code collided on insert, regenerating");
                }
                Err(error) => return Err(map_group_error(error)),
            }
        }
        Err(Error::internal("could not allocate a unique invite code"))
    }

    async fn member_profiles(&self, group: &Group) -> Result<Vec<MemberProfile>, Error> {
        let ids: Vec<UserId> = group.members().iter().map(|m| m.user.clone()).collect();
        let users = self.users.find_by_ids(&ids).await.map_err(map_user_error)?;
        Ok(group
            .members()
            .iter()
            .filter_map(|membership| {
                let user = users.iter().find(|user| user.id() == &membership.user)?;
                Some(MemberProfile {
                    user: membership.user.clone(),
                    name: user.name().to_string(),
                    profile_picture: user
                        .profile()
                        .profile_picture
                        .as_ref()
                        .map(ToString::to_string),
                    role: membership.role,
                })
            })
            .collect())
    }

    async fn pending_profiles(&self, group: &Group) -> Result<Vec<PendingRequestProfile>, Error> {
        let ids: Vec<UserId> = group
            .pending_requests()
            .iter()
            .map(|request| request.user.clone())
            .collect();
        let users = self.users.find_by_ids(&ids).await.map_err(map_user_error)?;
        Ok(group
            .pending_requests()
            .iter()
            .filter_map(|request| {
                let user = users.iter().find(|user| user.id() == &request.user)?;
                Some(PendingRequestProfile {
                    user: request.user.clone(),
                    name: user.name().to_string(),
                    requested_at: request.requested_at,
                })
            })
            .collect())
    }

    async fn visible_groups(&self, actor: &Actor) -> Result<Vec<GroupSummary>, Error> {
        let groups = self.groups.list_all().await.map_err(map_group_error)?;
        Ok(groups
            .into_iter()
            .filter(|group| group_listed_for(actor, group))
            .map(|group| GroupSummary::for_viewer(group, actor.id()))
            .collect())
    }
}

#[async_trait]
impl<U, G, R> GroupCommand for GroupService<U, G, R>
where
    U: UserRepository,
    G: GroupRepository,
    R: RecipeRepository,
{
    async fn create(&self, actor: &UserId, details: GroupDetails) -> Result<Group, Error> {
        let actor = resolve_actor(self.users.as_ref(), actor).await?;
        let group = self.insert_with_unique_code(&actor, details).await?;
        index_membership(self.users.as_ref(), actor.id(), group.id()).await;
        info!(
            group_id = %group.id(),
            user_id = %actor.id(),
            status = %group.moderation().status(),
            "group created"
        );
        Ok(group)
    }

    async fn update(
        &self,
        actor: &UserId,
        group: &GroupId,
        details: GroupDetails,
    ) -> Result<Group, Error> {
        let actor = resolve_actor(self.users.as_ref(), actor).await?;
        let mut group = load_group(self.groups.as_ref(), group).await?;
        evaluate_group(&actor, &group, GroupAction::Update).into_result()?;

        group.update_details(details);
        persist_group(self.groups.as_ref(), &mut group, self.clock.utc()).await?;
        info!(group_id = %group.id(), user_id = %actor.id(), "group updated");
        Ok(group)
    }

    async fn delete(&self, actor: &UserId, group: &GroupId) -> Result<(), Error> {
        let actor = resolve_actor(self.users.as_ref(), actor).await?;
        let existing = load_group(self.groups.as_ref(), group).await?;
        evaluate_group(&actor, &existing, GroupAction::Delete).into_result()?;

        if !self.groups.delete(group).await.map_err(map_group_error)? {
            return Err(Error::not_found("group not found"));
        }
        info!(group_id = %group, user_id = %actor.id(), "group deleted");

        // Cascades run after the delete; readers treat leftovers as dangling.
        match self.recipes.detach_group(group).await {
            Ok(count) => debug!(group_id = %group, count, "detached recipes from deleted group"),
            Err(error) => {
                warn!(%error, group_id = %group, "failed to detach recipes from deleted group");
            }
        }
        if let Err(error) = self.users.remove_group_from_all(group).await {
            warn!(%error, group_id = %group, "failed to drop deleted group from user indexes");
        }
        Ok(())
    }
}

#[async_trait]
impl<U, G, R> GroupQuery for GroupService<U, G, R>
where
    U: UserRepository,
    G: GroupRepository,
    R: RecipeRepository,
{
    async fn list(&self, viewer: &UserId) -> Result<Vec<GroupSummary>, Error> {
        let actor = resolve_actor(self.users.as_ref(), viewer).await?;
        self.visible_groups(&actor).await
    }

    async fn search(
        &self,
        viewer: &UserId,
        query: SearchQuery,
    ) -> Result<Vec<GroupSummary>, Error> {
        let actor = resolve_actor(self.users.as_ref(), viewer).await?;
        let mut matches: Vec<GroupSummary> = self
            .visible_groups(&actor)
            .await?
            .into_iter()
            .filter(|summary| query.matches(summary.group.name()))
            .collect();
        matches.truncate(GROUP_SEARCH_LIMIT);
        Ok(matches)
    }

    async fn get(&self, viewer: &UserId, group: &GroupId) -> Result<GroupDetail, Error> {
        let actor = resolve_actor(self.users.as_ref(), viewer).await?;
        let group = load_group(self.groups.as_ref(), group).await?;
        evaluate_group(&actor, &group, GroupAction::View).into_result()?;

        let members = self.member_profiles(&group).await?;
        let pending_requests = if evaluate_group(&actor, &group, GroupAction::ManageMembers).is_allowed() {
            Some(self.pending_profiles(&group).await?)
        } else {
            None
        };
        let recipes = self
            .recipes
            .list_by_group(group.id())
            .await
            .map_err(map_recipe_error)?
            .into_iter()
            .filter(|recipe| {
                evaluate_recipe(&actor, recipe, Some(&group), RecipeAction::View).is_allowed()
            })
            .collect();

        Ok(GroupDetail {
            summary: GroupSummary::for_viewer(group, actor.id()),
            members,
            pending_requests,
            recipes,
        })
    }

    async fn preview_invite(
        &self,
        viewer: &UserId,
        code: &InviteCode,
    ) -> Result<InvitePreview, Error> {
        let actor = resolve_actor(self.users.as_ref(), viewer).await?;
        let group = self
            .groups
            .find_by_invite_code(code)
            .await
            .map_err(map_group_error)?
            .ok_or_else(|| Error::not_found("invite code not recognised"))?;
        evaluate_group(&actor, &group, GroupAction::PreviewInvite).into_result()?;
        Ok(InvitePreview::for_viewer(&group, actor.id()))
    }
}

#[cfg(test)]
mod tests;
