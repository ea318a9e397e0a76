//! Request and response payloads for the group and membership endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    GroupDetail, GroupSummary, InvitePreview, JoinResult, MemberProfile, PendingRequestProfile,
};
use crate::domain::{
    AssignableRole, Error, Group, GroupDetails, JoinOutcome, MemberRole, Moderated, SearchQuery,
};
use crate::inbound::http::moderation::ModerationFields;
use crate::inbound::http::recipes_dto::RecipeResponse;

/// Body for creating or updating a group.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupRequest {
    #[schema(example = "Family")]
    pub name: String,
    #[schema(example = "Shared recipes for the family")]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_private: bool,
}

impl TryFrom<GroupRequest> for GroupDetails {
    type Error = Error;

    fn try_from(value: GroupRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            &value.name,
            &value.description,
            value.image.as_deref(),
            value.is_private,
        )
        .map_err(Error::from)
    }
}

/// Query string accepted by `GET /api/v1/groups/search`.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GroupSearchQuery {
    /// Case-insensitive name substring; must not be blank.
    pub q: Option<String>,
}

impl TryFrom<GroupSearchQuery> for SearchQuery {
    type Error = Error;

    fn try_from(value: GroupSearchQuery) -> Result<Self, Self::Error> {
        Self::new(value.q.as_deref().unwrap_or_default()).map_err(Error::from)
    }
}

/// Body for `POST /api/v1/groups/join`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinGroupRequest {
    #[schema(example = "K3Q9ZP2A")]
    pub invite_code: String,
}

/// Body for `PUT /api/v1/groups/{id}/members/{userId}/role`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RoleChangeRequest {
    #[schema(value_type = AssignableRole)]
    pub role: String,
}

impl TryFrom<RoleChangeRequest> for AssignableRole {
    type Error = Error;

    fn try_from(value: RoleChangeRequest) -> Result<Self, Self::Error> {
        Self::parse(&value.role).map_err(Error::from)
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct MembershipResponse {
    #[schema(format = "uuid")]
    pub user: String,
    pub role: MemberRole,
}

/// Group as listed to clients. Pending join requests only appear in the
/// detail view, and only for members who manage the group.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub is_private: bool,
    pub invite_code: String,
    #[schema(format = "uuid")]
    pub creator: String,
    pub members: Vec<MembershipResponse>,
    pub member_count: usize,
    #[serde(flatten)]
    pub moderation: ModerationFields,
    pub revision: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Group> for GroupResponse {
    fn from(group: &Group) -> Self {
        let details = group.details();
        Self {
            id: group.id().to_string(),
            name: details.name.clone(),
            description: details.description.clone(),
            image: details.image.as_ref().map(ToString::to_string),
            is_private: details.is_private,
            invite_code: group.invite_code().to_string(),
            creator: group.creator().to_string(),
            members: group
                .members()
                .iter()
                .map(|membership| MembershipResponse {
                    user: membership.user.to_string(),
                    role: membership.role,
                })
                .collect(),
            member_count: group.members().len(),
            moderation: ModerationFields::from(group.moderation()),
            revision: group.revision(),
            created_at: group.created_at(),
            updated_at: group.updated_at(),
        }
    }
}

impl From<Group> for GroupResponse {
    fn from(group: Group) -> Self {
        Self::from(&group)
    }
}

/// Group plus the caller's place in it.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummaryResponse {
    #[serde(flatten)]
    pub group: GroupResponse,
    pub user_role: Option<MemberRole>,
    pub is_member: bool,
}

impl From<GroupSummary> for GroupSummaryResponse {
    fn from(summary: GroupSummary) -> Self {
        Self {
            is_member: summary.is_member(),
            user_role: summary.user_role,
            group: GroupResponse::from(&summary.group),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfileResponse {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    pub profile_picture: Option<String>,
    pub role: MemberRole,
}

impl From<MemberProfile> for MemberProfileResponse {
    fn from(member: MemberProfile) -> Self {
        Self {
            id: member.user.to_string(),
            name: member.name,
            profile_picture: member.profile_picture,
            role: member.role,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequestResponse {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    pub requested_at: DateTime<Utc>,
}

impl From<PendingRequestProfile> for PendingRequestResponse {
    fn from(request: PendingRequestProfile) -> Self {
        Self {
            id: request.user.to_string(),
            name: request.name,
            requested_at: request.requested_at,
        }
    }
}

/// Full group view for `GET /api/v1/groups/{id}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupDetailResponse {
    pub group: GroupSummaryResponse,
    pub members: Vec<MemberProfileResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_requests: Option<Vec<PendingRequestResponse>>,
    pub recipes: Vec<RecipeResponse>,
}

impl From<GroupDetail> for GroupDetailResponse {
    fn from(detail: GroupDetail) -> Self {
        Self {
            group: detail.summary.into(),
            members: detail.members.into_iter().map(Into::into).collect(),
            pending_requests: detail
                .pending_requests
                .map(|requests| requests.into_iter().map(Into::into).collect()),
            recipes: detail.recipes.into_iter().map(Into::into).collect(),
        }
    }
}

/// What an invite link reveals before the caller joins.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitePreviewResponse {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub is_private: bool,
    pub member_count: usize,
    pub is_member: bool,
    pub has_pending_request: bool,
}

impl From<InvitePreview> for InvitePreviewResponse {
    fn from(preview: InvitePreview) -> Self {
        Self {
            id: preview.id.to_string(),
            name: preview.name,
            description: preview.description,
            image: preview.image,
            is_private: preview.is_private,
            member_count: preview.member_count,
            is_member: preview.is_member,
            has_pending_request: preview.has_pending_request,
        }
    }
}

/// `group` is present once the caller is a member; a filed request only
/// carries the invite `preview`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct JoinGroupResponse {
    pub status: JoinOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<InvitePreviewResponse>,
}

impl From<JoinResult> for JoinGroupResponse {
    fn from(result: JoinResult) -> Self {
        let status = result.outcome();
        match result {
            JoinResult::Joined(group) => Self {
                status,
                group: Some(group.into()),
                preview: None,
            },
            JoinResult::Requested(preview) => Self {
                status,
                group: None,
                preview: Some(preview.into()),
            },
        }
    }
}
