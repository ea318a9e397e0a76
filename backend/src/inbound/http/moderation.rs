//! Admin moderation queue handlers.
//!
//! ```text
//! GET  /api/v1/moderation/groups/pending
//! GET  /api/v1/moderation/recipes/pending
//! POST /api/v1/moderation/groups/{id}/approve
//! POST /api/v1/moderation/groups/{id}/reject {"rejectionReason":"Spam"}
//! POST /api/v1/moderation/recipes/{id}/approve
//! POST /api/v1/moderation/recipes/{id}/reject
//! GET  /api/v1/moderation/counts
//! ```

use actix_web::{get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::ModerationCounts;
use crate::domain::{Error, ModerationState, ModerationStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::groups_dto::GroupResponse;
use crate::inbound::http::recipes_dto::RecipeResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_group_id, parse_recipe_id};

/// Moderation columns shared by group and recipe payloads.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModerationFields {
    pub moderation_status: ModerationStatus,
    #[schema(format = "uuid")]
    pub moderated_by: Option<String>,
    pub moderated_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

impl From<&ModerationState> for ModerationFields {
    fn from(state: &ModerationState) -> Self {
        Self {
            moderation_status: state.status(),
            moderated_by: state.moderated_by().map(ToString::to_string),
            moderated_at: state.moderated_at(),
            rejection_reason: state.rejection_reason().map(str::to_owned),
        }
    }
}

/// Optional body for the reject endpoints.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectionRequest {
    #[serde(default)]
    #[schema(example = "Contains advertising")]
    pub rejection_reason: Option<String>,
}

impl RejectionRequest {
    fn into_reason(body: Option<web::Json<Self>>) -> Option<String> {
        body.and_then(|json| json.into_inner().rejection_reason)
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModerationCountsResponse {
    pub pending_groups: u64,
    pub pending_recipes: u64,
}

impl From<ModerationCounts> for ModerationCountsResponse {
    fn from(value: ModerationCounts) -> Self {
        Self {
            pending_groups: value.pending_groups,
            pending_recipes: value.pending_recipes,
        }
    }
}

/// Groups awaiting a decision, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/moderation/groups/pending",
    responses(
        (status = 200, description = "Pending groups", body = [GroupResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admins only", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["moderation"],
    operation_id = "listPendingGroups"
)]
#[get("/moderation/groups/pending")]
pub async fn pending_groups(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<GroupResponse>>> {
    let actor = session.require_user()?;
    let groups = state.moderation_query.pending_groups(&actor).await?;
    Ok(web::Json(groups.into_iter().map(Into::into).collect()))
}

/// Recipes awaiting a decision, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/moderation/recipes/pending",
    responses(
        (status = 200, description = "Pending recipes", body = [RecipeResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admins only", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["moderation"],
    operation_id = "listPendingRecipes"
)]
#[get("/moderation/recipes/pending")]
pub async fn pending_recipes(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<RecipeResponse>>> {
    let actor = session.require_user()?;
    let recipes = state.moderation_query.pending_recipes(&actor).await?;
    Ok(web::Json(recipes.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/moderation/groups/{id}/approve",
    params(("id" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Approved group", body = GroupResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admins only", body = Error),
        (status = 404, description = "Group not found", body = Error),
        (status = 409, description = "Concurrent modification", body = Error)
    ),
    tags = ["moderation"],
    operation_id = "approveGroup"
)]
#[post("/moderation/groups/{id}/approve")]
pub async fn approve_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<GroupResponse>> {
    let actor = session.require_user()?;
    let group_id = parse_group_id(&path.into_inner(), FieldName::new("id"))?;
    let group = state.moderation.approve_group(&actor, &group_id).await?;
    Ok(web::Json(group.into()))
}

/// Reject a group. Without a reason the platform default is recorded.
#[utoipa::path(
    post,
    path = "/api/v1/moderation/groups/{id}/reject",
    params(("id" = String, Path, description = "Group id")),
    request_body(content = Option<RejectionRequest>),
    responses(
        (status = 200, description = "Rejected group", body = GroupResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admins only", body = Error),
        (status = 404, description = "Group not found", body = Error),
        (status = 409, description = "Concurrent modification", body = Error)
    ),
    tags = ["moderation"],
    operation_id = "rejectGroup"
)]
#[post("/moderation/groups/{id}/reject")]
pub async fn reject_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    body: Option<web::Json<RejectionRequest>>,
) -> ApiResult<web::Json<GroupResponse>> {
    let actor = session.require_user()?;
    let group_id = parse_group_id(&path.into_inner(), FieldName::new("id"))?;
    let reason = RejectionRequest::into_reason(body);
    let group = state
        .moderation
        .reject_group(&actor, &group_id, reason)
        .await?;
    Ok(web::Json(group.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/moderation/recipes/{id}/approve",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Approved recipe", body = RecipeResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admins only", body = Error),
        (status = 404, description = "Recipe not found", body = Error),
        (status = 409, description = "Concurrent modification", body = Error)
    ),
    tags = ["moderation"],
    operation_id = "approveRecipe"
)]
#[post("/moderation/recipes/{id}/approve")]
pub async fn approve_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let actor = session.require_user()?;
    let recipe_id = parse_recipe_id(&path.into_inner(), FieldName::new("id"))?;
    let recipe = state.moderation.approve_recipe(&actor, &recipe_id).await?;
    Ok(web::Json(recipe.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/moderation/recipes/{id}/reject",
    params(("id" = String, Path, description = "Recipe id")),
    request_body(content = Option<RejectionRequest>),
    responses(
        (status = 200, description = "Rejected recipe", body = RecipeResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admins only", body = Error),
        (status = 404, description = "Recipe not found", body = Error),
        (status = 409, description = "Concurrent modification", body = Error)
    ),
    tags = ["moderation"],
    operation_id = "rejectRecipe"
)]
#[post("/moderation/recipes/{id}/reject")]
pub async fn reject_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    body: Option<web::Json<RejectionRequest>>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let actor = session.require_user()?;
    let recipe_id = parse_recipe_id(&path.into_inner(), FieldName::new("id"))?;
    let reason = RejectionRequest::into_reason(body);
    let recipe = state
        .moderation
        .reject_recipe(&actor, &recipe_id, reason)
        .await?;
    Ok(web::Json(recipe.into()))
}

/// Sizes of both moderation queues.
#[utoipa::path(
    get,
    path = "/api/v1/moderation/counts",
    responses(
        (status = 200, description = "Pending counts", body = ModerationCountsResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admins only", body = Error)
    ),
    tags = ["moderation"],
    operation_id = "moderationCounts"
)]
#[get("/moderation/counts")]
pub async fn counts(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ModerationCountsResponse>> {
    let actor = session.require_user()?;
    let counts = state.moderation_query.counts(&actor).await?;
    Ok(web::Json(counts.into()))
}
