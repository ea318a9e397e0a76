//! Group API handlers.
//!
//! ```text
//! GET    /api/v1/groups
//! POST   /api/v1/groups {"name":"Family","description":"...","isPrivate":true}
//! GET    /api/v1/groups/search?q=pasta
//! GET    /api/v1/groups/invite/{code}
//! GET    /api/v1/groups/{id}
//! PUT    /api/v1/groups/{id}
//! DELETE /api/v1/groups/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::domain::{Error, GroupDetails, SearchQuery};
use crate::inbound::http::ApiResult;
use crate::inbound::http::groups_dto::{
    GroupDetailResponse, GroupRequest, GroupResponse, GroupSearchQuery, GroupSummaryResponse,
    InvitePreviewResponse,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_group_id, parse_invite_code};

/// Groups visible to the caller, each with the caller's role.
#[utoipa::path(
    get,
    path = "/api/v1/groups",
    responses(
        (status = 200, description = "Visible groups", body = [GroupSummaryResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["groups"],
    operation_id = "listGroups"
)]
#[get("/groups")]
pub async fn list_groups(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<GroupSummaryResponse>>> {
    let actor = session.require_user()?;
    let groups = state.groups_query.list(&actor).await?;
    Ok(web::Json(groups.into_iter().map(Into::into).collect()))
}

/// Create a group owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/groups",
    request_body = GroupRequest,
    responses(
        (status = 201, description = "Group created", body = GroupResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "No free invite code", body = Error)
    ),
    tags = ["groups"],
    operation_id = "createGroup"
)]
#[post("/groups")]
pub async fn create_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<GroupRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user()?;
    let details = GroupDetails::try_from(payload.into_inner())?;
    let group = state.groups.create(&actor, details).await?;
    Ok(HttpResponse::Created().json(GroupResponse::from(group)))
}

/// Search visible groups by name.
#[utoipa::path(
    get,
    path = "/api/v1/groups/search",
    params(GroupSearchQuery),
    responses(
        (status = 200, description = "Matching groups, by name", body = [GroupSummaryResponse]),
        (status = 400, description = "Missing search text", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["groups"],
    operation_id = "searchGroups"
)]
#[get("/groups/search")]
pub async fn search_groups(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<GroupSearchQuery>,
) -> ApiResult<web::Json<Vec<GroupSummaryResponse>>> {
    let actor = session.require_user()?;
    let query = SearchQuery::try_from(query.into_inner())?;
    let groups = state.groups_query.search(&actor, query).await?;
    Ok(web::Json(groups.into_iter().map(Into::into).collect()))
}

/// Preview the group behind an invite code.
#[utoipa::path(
    get,
    path = "/api/v1/groups/invite/{code}",
    params(("code" = String, Path, description = "Invite code")),
    responses(
        (status = 200, description = "Invite preview", body = InvitePreviewResponse),
        (status = 400, description = "Malformed code", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Group awaiting moderation", body = Error),
        (status = 404, description = "Unknown code", body = Error)
    ),
    tags = ["groups"],
    operation_id = "previewInvite"
)]
#[get("/groups/invite/{code}")]
pub async fn preview_invite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<InvitePreviewResponse>> {
    let actor = session.require_user()?;
    let code = parse_invite_code(&path.into_inner())?;
    let preview = state.groups_query.preview_invite(&actor, &code).await?;
    Ok(web::Json(preview.into()))
}

/// Group with member profiles, pending requests for managers, and recipes.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}",
    params(("id" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Group detail", body = GroupDetailResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not visible to the caller", body = Error),
        (status = 404, description = "Group not found", body = Error)
    ),
    tags = ["groups"],
    operation_id = "getGroup"
)]
#[get("/groups/{id}")]
pub async fn get_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<GroupDetailResponse>> {
    let actor = session.require_user()?;
    let group_id = parse_group_id(&path.into_inner(), FieldName::new("id"))?;
    let detail = state.groups_query.get(&actor, &group_id).await?;
    Ok(web::Json(detail.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/groups/{id}",
    params(("id" = String, Path, description = "Group id")),
    request_body = GroupRequest,
    responses(
        (status = 200, description = "Updated group", body = GroupResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Owners and group admins only", body = Error),
        (status = 404, description = "Group not found", body = Error),
        (status = 409, description = "Concurrent modification", body = Error)
    ),
    tags = ["groups"],
    operation_id = "updateGroup"
)]
#[put("/groups/{id}")]
pub async fn update_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<GroupRequest>,
) -> ApiResult<web::Json<GroupResponse>> {
    let actor = session.require_user()?;
    let group_id = parse_group_id(&path.into_inner(), FieldName::new("id"))?;
    let details = GroupDetails::try_from(payload.into_inner())?;
    let group = state.groups.update(&actor, &group_id, details).await?;
    Ok(web::Json(group.into()))
}

/// Delete a group, detaching its recipes.
#[utoipa::path(
    delete,
    path = "/api/v1/groups/{id}",
    params(("id" = String, Path, description = "Group id")),
    responses(
        (status = 204, description = "Group deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Creator or platform admin only", body = Error),
        (status = 404, description = "Group not found", body = Error)
    ),
    tags = ["groups"],
    operation_id = "deleteGroup"
)]
#[delete("/groups/{id}")]
pub async fn delete_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user()?;
    let group_id = parse_group_id(&path.into_inner(), FieldName::new("id"))?;
    state.groups.delete(&actor, &group_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
