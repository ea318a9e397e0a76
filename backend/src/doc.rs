//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer (users, groups,
//!   memberships, recipes, moderation, health)
//! - **Schemas**: request and response DTOs plus the domain enums they embed
//! - **Security**: session cookie authentication scheme
//!
//! The generated document is served by Swagger UI in debug builds.

use crate::domain::{
    AssignableRole, Category, Difficulty, Error, ErrorCode, Ingredient, JoinOutcome, MemberRole,
    ModerationStatus, Step, UserRole,
};
use crate::inbound::http::groups_dto::{
    GroupDetailResponse, GroupRequest, GroupResponse, GroupSummaryResponse,
    InvitePreviewResponse, JoinGroupRequest, JoinGroupResponse, MemberProfileResponse,
    MembershipResponse, PendingRequestResponse, RoleChangeRequest,
};
use crate::inbound::http::moderation::{
    ModerationCountsResponse, ModerationFields, RejectionRequest,
};
use crate::inbound::http::recipes_dto::{RecipeRequest, RecipeResponse};
use crate::inbound::http::users::{
    LoginRequest, RegisterRequest, UpdateProfileRequest, UserResponse,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/users/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Cookbook API",
        description = "Recipe sharing with groups, invite codes and content moderation.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::groups::list_groups,
        crate::inbound::http::groups::create_group,
        crate::inbound::http::groups::search_groups,
        crate::inbound::http::groups::preview_invite,
        crate::inbound::http::groups::get_group,
        crate::inbound::http::groups::update_group,
        crate::inbound::http::groups::delete_group,
        crate::inbound::http::memberships::join_group,
        crate::inbound::http::memberships::approve_request,
        crate::inbound::http::memberships::reject_request,
        crate::inbound::http::memberships::change_role,
        crate::inbound::http::memberships::remove_member,
        crate::inbound::http::memberships::leave_group,
        crate::inbound::http::recipes::list_recipes,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::get_recipe,
        crate::inbound::http::recipes::update_recipe,
        crate::inbound::http::recipes::delete_recipe,
        crate::inbound::http::moderation::pending_groups,
        crate::inbound::http::moderation::pending_recipes,
        crate::inbound::http::moderation::approve_group,
        crate::inbound::http::moderation::reject_group,
        crate::inbound::http::moderation::approve_recipe,
        crate::inbound::http::moderation::reject_recipe,
        crate::inbound::http::moderation::counts,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        UserRole,
        MemberRole,
        AssignableRole,
        JoinOutcome,
        ModerationStatus,
        Category,
        Difficulty,
        Ingredient,
        Step,
        RegisterRequest,
        LoginRequest,
        UpdateProfileRequest,
        UserResponse,
        GroupRequest,
        GroupResponse,
        GroupSummaryResponse,
        GroupDetailResponse,
        MembershipResponse,
        MemberProfileResponse,
        PendingRequestResponse,
        InvitePreviewResponse,
        JoinGroupRequest,
        JoinGroupResponse,
        RoleChangeRequest,
        RecipeRequest,
        RecipeResponse,
        ModerationFields,
        RejectionRequest,
        ModerationCountsResponse,
    )),
    tags(
        (name = "users", description = "Registration, login and profiles"),
        (name = "groups", description = "Group lifecycle, search and invite previews"),
        (name = "memberships", description = "Joining, join requests and member roles"),
        (name = "recipes", description = "Recipe authoring and discovery"),
        (name = "moderation", description = "Platform admin review queues"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
