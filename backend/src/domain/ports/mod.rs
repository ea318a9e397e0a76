//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`PasswordHasher`], [`InviteCodeSource`]) are
//! implemented by outbound adapters. Driving ports (`*Command`, `*Query`,
//! [`LoginService`]) are implemented by domain services and called by inbound
//! adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod group_command;
mod group_query;
mod group_repository;
mod invite_code_source;
mod login_service;
mod membership_command;
mod moderation_command;
mod moderation_query;
mod password_hasher;
mod recipe_command;
mod recipe_query;
mod recipe_repository;
mod user_profile_query;
mod user_repository;

pub use account_command::AccountCommand;
#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use group_command::GroupCommand;
#[cfg(test)]
pub use group_command::MockGroupCommand;
#[cfg(test)]
pub use group_query::MockGroupQuery;
pub use group_query::{
    GroupDetail, GroupQuery, GroupSummary, InvitePreview, MemberProfile, PendingRequestProfile,
};
#[cfg(test)]
pub use group_repository::MockGroupRepository;
pub use group_repository::{GroupPersistenceError, GroupRepository};
pub use invite_code_source::InviteCodeSource;
#[cfg(test)]
pub use invite_code_source::MockInviteCodeSource;
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use membership_command::MockMembershipCommand;
pub use membership_command::{JoinResult, MembershipCommand};
#[cfg(test)]
pub use moderation_command::MockModerationCommand;
pub use moderation_command::ModerationCommand;
#[cfg(test)]
pub use moderation_query::MockModerationQuery;
pub use moderation_query::{ModerationCounts, ModerationQuery};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use recipe_command::MockRecipeCommand;
pub use recipe_command::RecipeCommand;
#[cfg(test)]
pub use recipe_query::MockRecipeQuery;
pub use recipe_query::RecipeQuery;
#[cfg(test)]
pub use recipe_repository::MockRecipeRepository;
pub use recipe_repository::{RecipePersistenceError, RecipeRepository};
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::UserProfileQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
