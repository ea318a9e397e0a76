//! Driving port for the invitation and membership workflow.

use async_trait::async_trait;

use super::InvitePreview;
use crate::domain::{AssignableRole, Error, Group, GroupId, InviteCode, JoinOutcome, UserId};

/// Result of redeeming an invite code.
///
/// Only a caller who became a member gets the full group back; a queued
/// request sees the invite preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinResult {
    Joined(Group),
    Requested(InvitePreview),
}

impl JoinResult {
    pub fn outcome(&self) -> JoinOutcome {
        match self {
            Self::Joined(_) => JoinOutcome::Joined,
            Self::Requested(_) => JoinOutcome::Requested,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipCommand: Send + Sync {
    /// Join a public group or request to join a private one.
    async fn join(&self, actor: &UserId, code: &InviteCode) -> Result<JoinResult, Error>;

    async fn approve_request(
        &self,
        actor: &UserId,
        group: &GroupId,
        requester: &UserId,
    ) -> Result<Group, Error>;

    async fn reject_request(
        &self,
        actor: &UserId,
        group: &GroupId,
        requester: &UserId,
    ) -> Result<Group, Error>;

    async fn change_role(
        &self,
        actor: &UserId,
        group: &GroupId,
        target: &UserId,
        role: AssignableRole,
    ) -> Result<Group, Error>;

    /// Remove `target`; the updated group is returned only while the caller
    /// still belongs to it.
    async fn remove_member(
        &self,
        actor: &UserId,
        group: &GroupId,
        target: &UserId,
    ) -> Result<Option<Group>, Error>;

    /// Remove the caller from the group.
    async fn leave(&self, actor: &UserId, group: &GroupId) -> Result<(), Error>;
}
