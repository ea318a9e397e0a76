//! Invitation and membership workflow implementing [`MembershipCommand`].
//!
//! Every operation loads the group, checks the caller's authority before
//! looking at the target, mutates the roster in memory and writes the whole
//! group back with a revision check. A lost race surfaces as a conflict.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::moderation::Moderated;
use super::policy::{GroupAction, evaluate_group};
use super::ports::{
    GroupRepository, InvitePreview, JoinResult, MembershipCommand, UserRepository,
};
use super::service_support::{
    index_membership, load_group, map_group_error, persist_group, resolve_actor,
    unindex_membership,
};
use super::{AssignableRole, Error, Group, GroupId, InviteCode, JoinOutcome, UserId};

#[derive(Clone)]
pub struct MembershipService<U, G> {
    users: Arc<U>,
    groups: Arc<G>,
    clock: Arc<dyn Clock>,
}

impl<U, G> MembershipService<U, G> {
    pub fn new(users: Arc<U>, groups: Arc<G>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            groups,
            clock,
        }
    }
}

impl<U, G> MembershipService<U, G>
where
    U: UserRepository,
    G: GroupRepository,
{
    /// Load the caller and group, and check the caller may take `action`.
    async fn authorise(
        &self,
        actor: &UserId,
        group: &GroupId,
        action: GroupAction<'_>,
    ) -> Result<Group, Error> {
        let actor = resolve_actor(self.users.as_ref(), actor).await?;
        let group = load_group(self.groups.as_ref(), group).await?;
        evaluate_group(&actor, &group, action).into_result()?;
        Ok(group)
    }

    async fn save(&self, group: &mut Group) -> Result<(), Error> {
        persist_group(self.groups.as_ref(), group, self.clock.utc()).await
    }
}

#[async_trait]
impl<U, G> MembershipCommand for MembershipService<U, G>
where
    U: UserRepository,
    G: GroupRepository,
{
    async fn join(&self, actor: &UserId, code: &InviteCode) -> Result<JoinResult, Error> {
        let actor = resolve_actor(self.users.as_ref(), actor).await?;
        let mut group = self
            .groups
            .find_by_invite_code(code)
            .await
            .map_err(map_group_error)?
            .ok_or_else(|| Error::not_found("invite code not recognised"))?;
        if !group.moderation().is_approved() && !actor.is_admin() {
            return Err(Error::forbidden("this group has not been approved yet"));
        }

        let outcome = group.request_join(actor.id(), self.clock.utc())?;
        self.save(&mut group).await?;
        info!(
            group_id = %group.id(),
            user_id = %actor.id(),
            outcome = ?outcome,
            "join request handled"
        );
        match outcome {
            JoinOutcome::Joined => {
                index_membership(self.users.as_ref(), actor.id(), group.id()).await;
                Ok(JoinResult::Joined(group))
            }
            JoinOutcome::Requested => Ok(JoinResult::Requested(InvitePreview::for_viewer(
                &group,
                actor.id(),
            ))),
        }
    }

    async fn approve_request(
        &self,
        actor: &UserId,
        group: &GroupId,
        requester: &UserId,
    ) -> Result<Group, Error> {
        let mut group = self
            .authorise(actor, group, GroupAction::ManageMembers)
            .await?;
        group.approve_request(requester)?;
        self.save(&mut group).await?;
        index_membership(self.users.as_ref(), requester, group.id()).await;
        info!(group_id = %group.id(), user_id = %requester, "join request approved");
        Ok(group)
    }

    async fn reject_request(
        &self,
        actor: &UserId,
        group: &GroupId,
        requester: &UserId,
    ) -> Result<Group, Error> {
        let mut group = self
            .authorise(actor, group, GroupAction::ManageMembers)
            .await?;
        group.reject_request(requester)?;
        self.save(&mut group).await?;
        info!(group_id = %group.id(), user_id = %requester, "join request rejected");
        Ok(group)
    }

    async fn change_role(
        &self,
        actor: &UserId,
        group: &GroupId,
        target: &UserId,
        role: AssignableRole,
    ) -> Result<Group, Error> {
        let mut group = self
            .authorise(actor, group, GroupAction::ManageMembers)
            .await?;
        group.change_member_role(target, role)?;
        self.save(&mut group).await?;
        info!(group_id = %group.id(), user_id = %target, role = ?role, "member role changed");
        Ok(group)
    }

    async fn remove_member(
        &self,
        actor: &UserId,
        group: &GroupId,
        target: &UserId,
    ) -> Result<Option<Group>, Error> {
        let mut group = self
            .authorise(actor, group, GroupAction::RemoveMember(target))
            .await?;
        group.remove_member(target)?;
        self.save(&mut group).await?;
        unindex_membership(self.users.as_ref(), target, group.id()).await;
        info!(group_id = %group.id(), user_id = %target, "member removed");
        Ok((target != actor).then_some(group))
    }

    async fn leave(&self, actor: &UserId, group: &GroupId) -> Result<(), Error> {
        self.remove_member(actor, group, actor).await.map(drop)
    }
}
