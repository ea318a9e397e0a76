//! Driving port for reading groups.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Error, Group, GroupId, InviteCode, MemberRole, Recipe, SearchQuery, UserId};

/// A group as listed for one viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub group: Group,
    /// The viewer's role in the group, if they belong to it.
    pub user_role: Option<MemberRole>,
}

impl GroupSummary {
    pub fn for_viewer(group: Group, viewer: &UserId) -> Self {
        let user_role = group.member_role(viewer);
        Self { group, user_role }
    }

    pub fn is_member(&self) -> bool {
        self.user_role.is_some()
    }
}

/// Roster entry joined with the member's public profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberProfile {
    pub user: UserId,
    pub name: String,
    pub profile_picture: Option<String>,
    pub role: MemberRole,
}

/// Pending join request joined with the requester's public profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequestProfile {
    pub user: UserId,
    pub name: String,
    pub requested_at: DateTime<Utc>,
}

/// Full group page for one viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDetail {
    pub summary: GroupSummary,
    pub members: Vec<MemberProfile>,
    /// Present only when the viewer may manage the roster.
    pub pending_requests: Option<Vec<PendingRequestProfile>>,
    /// Recipes of the group the viewer may read, newest first.
    pub recipes: Vec<Recipe>,
}

/// What a prospective member learns from an invite code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitePreview {
    pub id: GroupId,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub is_private: bool,
    pub member_count: usize,
    pub is_member: bool,
    pub has_pending_request: bool,
}

impl InvitePreview {
    pub fn for_viewer(group: &Group, viewer: &UserId) -> Self {
        let details = group.details();
        Self {
            id: group.id().clone(),
            name: details.name.clone(),
            description: details.description.clone(),
            image: details.image.as_ref().map(ToString::to_string),
            is_private: details.is_private,
            member_count: group.members().len(),
            is_member: group.is_member(viewer),
            has_pending_request: group.has_pending_request(viewer),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupQuery: Send + Sync {
    /// Groups visible to `viewer`, ordered by name.
    async fn list(&self, viewer: &UserId) -> Result<Vec<GroupSummary>, Error>;

    /// Name search over the groups visible to `viewer`, capped at
    /// [`GROUP_SEARCH_LIMIT`](crate::domain::GROUP_SEARCH_LIMIT).
    async fn search(&self, viewer: &UserId, query: SearchQuery)
    -> Result<Vec<GroupSummary>, Error>;

    async fn get(&self, viewer: &UserId, group: &GroupId) -> Result<GroupDetail, Error>;

    async fn preview_invite(&self, viewer: &UserId, code: &InviteCode)
    -> Result<InvitePreview, Error>;
}
