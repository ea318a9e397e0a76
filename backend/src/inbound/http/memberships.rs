//! Membership workflow handlers: joining, join requests, roles and leaving.
//!
//! ```text
//! POST   /api/v1/groups/join {"inviteCode":"K3Q9ZP2A"}
//! POST   /api/v1/groups/{id}/requests/{userId}/approve
//! POST   /api/v1/groups/{id}/requests/{userId}/reject
//! PUT    /api/v1/groups/{id}/members/{userId}/role {"role":"admin"}
//! DELETE /api/v1/groups/{id}/members/{userId}
//! POST   /api/v1/groups/{id}/leave
//! ```

use actix_web::{HttpResponse, delete, post, put, web};

use crate::domain::{AssignableRole, Error, GroupId, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::groups_dto::{
    GroupResponse, JoinGroupRequest, JoinGroupResponse, RoleChangeRequest,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_group_id, parse_invite_code, parse_user_id,
};

fn member_path(path: web::Path<(String, String)>) -> Result<(GroupId, UserId), Error> {
    let (group, user) = path.into_inner();
    Ok((
        parse_group_id(&group, FieldName::new("id"))?,
        parse_user_id(&user, FieldName::new("userId"))?,
    ))
}

/// Join a public group, or file a request for a private one.
#[utoipa::path(
    post,
    path = "/api/v1/groups/join",
    request_body = JoinGroupRequest,
    responses(
        (status = 200, description = "Joined, or request filed", body = JoinGroupResponse),
        (status = 400, description = "Malformed invite code", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Group not open for joining", body = Error),
        (status = 404, description = "Unknown invite code", body = Error),
        (status = 409, description = "Already a member or already requested", body = Error)
    ),
    tags = ["memberships"],
    operation_id = "joinGroup"
)]
#[post("/groups/join")]
pub async fn join_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<JoinGroupRequest>,
) -> ApiResult<web::Json<JoinGroupResponse>> {
    let actor = session.require_user()?;
    let code = parse_invite_code(&payload.into_inner().invite_code)?;
    let result = state.membership.join(&actor, &code).await?;
    Ok(web::Json(result.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/groups/{id}/requests/{userId}/approve",
    params(
        ("id" = String, Path, description = "Group id"),
        ("userId" = String, Path, description = "Requesting user")
    ),
    responses(
        (status = 200, description = "Requester is now a member", body = GroupResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Owners and group admins only", body = Error),
        (status = 404, description = "No such group or request", body = Error),
        (status = 409, description = "Concurrent modification", body = Error)
    ),
    tags = ["memberships"],
    operation_id = "approveJoinRequest"
)]
#[post("/groups/{id}/requests/{user_id}/approve")]
pub async fn approve_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<GroupResponse>> {
    let actor = session.require_user()?;
    let (group_id, requester) = member_path(path)?;
    let group = state
        .membership
        .approve_request(&actor, &group_id, &requester)
        .await?;
    Ok(web::Json(group.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/groups/{id}/requests/{userId}/reject",
    params(
        ("id" = String, Path, description = "Group id"),
        ("userId" = String, Path, description = "Requesting user")
    ),
    responses(
        (status = 200, description = "Request dropped", body = GroupResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Owners and group admins only", body = Error),
        (status = 404, description = "No such group or request", body = Error),
        (status = 409, description = "Concurrent modification", body = Error)
    ),
    tags = ["memberships"],
    operation_id = "rejectJoinRequest"
)]
#[post("/groups/{id}/requests/{user_id}/reject")]
pub async fn reject_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<GroupResponse>> {
    let actor = session.require_user()?;
    let (group_id, requester) = member_path(path)?;
    let group = state
        .membership
        .reject_request(&actor, &group_id, &requester)
        .await?;
    Ok(web::Json(group.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/groups/{id}/members/{userId}/role",
    params(
        ("id" = String, Path, description = "Group id"),
        ("userId" = String, Path, description = "Member whose role changes")
    ),
    request_body = RoleChangeRequest,
    responses(
        (status = 200, description = "Role changed", body = GroupResponse),
        (status = 400, description = "Unknown role", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Owners and group admins only", body = Error),
        (status = 404, description = "No such group or member", body = Error),
        (status = 422, description = "The owner's role cannot change", body = Error)
    ),
    tags = ["memberships"],
    operation_id = "changeMemberRole"
)]
#[put("/groups/{id}/members/{user_id}/role")]
pub async fn change_role(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
    payload: web::Json<RoleChangeRequest>,
) -> ApiResult<web::Json<GroupResponse>> {
    let actor = session.require_user()?;
    let (group_id, target) = member_path(path)?;
    let role = AssignableRole::try_from(payload.into_inner())?;
    let group = state
        .membership
        .change_role(&actor, &group_id, &target, role)
        .await?;
    Ok(web::Json(group.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/groups/{id}/members/{userId}",
    params(
        ("id" = String, Path, description = "Group id"),
        ("userId" = String, Path, description = "Member to remove")
    ),
    responses(
        (status = 200, description = "Member removed", body = GroupResponse),
        (status = 204, description = "Caller removed themself"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Owners and group admins only", body = Error),
        (status = 404, description = "No such group or member", body = Error),
        (status = 422, description = "The owner cannot be removed", body = Error)
    ),
    tags = ["memberships"],
    operation_id = "removeMember"
)]
#[delete("/groups/{id}/members/{user_id}")]
pub async fn remove_member(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user()?;
    let (group_id, target) = member_path(path)?;
    let remaining = state
        .membership
        .remove_member(&actor, &group_id, &target)
        .await?;
    Ok(match remaining {
        Some(group) => HttpResponse::Ok().json(GroupResponse::from(group)),
        None => HttpResponse::NoContent().finish(),
    })
}

/// Leave a group. The owner cannot leave.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{id}/leave",
    params(("id" = String, Path, description = "Group id")),
    responses(
        (status = 204, description = "Left the group"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not a member", body = Error),
        (status = 422, description = "The owner cannot leave", body = Error)
    ),
    tags = ["memberships"],
    operation_id = "leaveGroup"
)]
#[post("/groups/{id}/leave")]
pub async fn leave_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user()?;
    let group_id = parse_group_id(&path.into_inner(), FieldName::new("id"))?;
    state.membership.leave(&actor, &group_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests;
