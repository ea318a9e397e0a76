//! Domain primitives, aggregates and services.
//!
//! Purpose: Define the strongly typed entities of the recipe-sharing
//! platform (users, groups, recipes), the access policy that guards them and
//! the services that implement every use-case. Nothing in here knows about
//! HTTP or SQL; adapters talk to the domain through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, Group, Recipe: aggregates with their validated field types.
//! - `policy`: pure allow/deny evaluation for group and recipe actions.
//! - `*Service`: port implementations wired up by the server.

pub mod error;
pub mod fields;
pub mod identifiers;
pub mod policy;
pub mod ports;
pub mod search;
pub mod trace_id;

mod account_service;
mod actor;
mod auth;
mod group;
mod group_service;
mod membership_service;
mod moderation;
mod moderation_service;
mod recipe;
mod recipe_service;
mod service_support;
mod user;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use self::account_service::AccountService;
pub use self::actor::Actor;
pub use self::auth::{
    LoginCredentials, LoginValidationError, NewPassword, PASSWORD_MAX, PASSWORD_MIN, PasswordHash,
    Registration,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::fields::{FieldError, FieldIssue, ImageUrl};
pub use self::group::{
    AssignableRole, GROUP_DESCRIPTION_MAX, GROUP_DESCRIPTION_MIN, GROUP_NAME_MAX, GROUP_NAME_MIN,
    Group, GroupDetails, GroupRecord, GroupRecordError, INVITE_CODE_ALPHABET, INVITE_CODE_LEN,
    InviteCode, JoinOutcome, JoinRequest, MemberRole, Membership, MembershipError,
};
pub use self::group_service::{GroupService, MAX_INVITE_CODE_ATTEMPTS};
pub use self::identifiers::{GroupId, IdentifierError, RecipeId, UserId};
pub use self::membership_service::MembershipService;
pub use self::moderation::{
    DEFAULT_REJECTION_REASON, Moderated, ModerationRecordError, ModerationState, ModerationStatus,
};
pub use self::moderation_service::ModerationService;
pub use self::recipe::{
    Category, Difficulty, Ingredient, MAX_INGREDIENTS, MAX_MINUTES, MAX_SERVINGS, MAX_STEPS,
    MAX_TAGS, RECIPE_DESCRIPTION_MAX, RECIPE_DESCRIPTION_MIN, RECIPE_TITLE_MAX, RECIPE_TITLE_MIN,
    Recipe, RecipeContent, RecipeFields, RecipeRecord, Step, TAG_MAX,
};
pub use self::recipe_service::RecipeService;
pub use self::search::{GROUP_SEARCH_LIMIT, RecipeFilter, SearchQuery};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{BIO_MAX, Email, Profile, USER_NAME_MAX, USER_NAME_MIN, User, UserName, UserRole};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use cookbook::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
