//! Helpers shared by the domain services: actor resolution, aggregate
//! loading and persistence error mapping.

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::warn;

use super::ports::{
    GroupPersistenceError, GroupRepository, RecipePersistenceError, RecipeRepository,
    UserPersistenceError, UserRepository,
};
use super::{Actor, Error, Group, GroupId, Recipe, RecipeId, UserId};

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => {
            Error::conflict("an account with this email already exists")
        }
    }
}

fn revision_conflict(entity: &str, expected: u32, actual: u32) -> Error {
    Error::conflict(format!("{entity} was modified concurrently")).with_details(json!({
        "expectedRevision": expected,
        "actualRevision": actual,
        "code": "revision_mismatch",
    }))
}

pub(crate) fn map_group_error(error: GroupPersistenceError) -> Error {
    match error {
        GroupPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("group repository unavailable: {message}"))
        }
        GroupPersistenceError::Query { message } | GroupPersistenceError::Corrupt { message } => {
            Error::internal(format!("group repository error: {message}"))
        }
        GroupPersistenceError::DuplicateInviteCode { code } => {
            Error::internal(format!("unexpected invite code collision: {code}"))
        }
        GroupPersistenceError::RevisionMismatch { expected, actual } => {
            revision_conflict("group", expected, actual)
        }
        GroupPersistenceError::Missing { .. } => Error::not_found("group not found"),
    }
}

pub(crate) fn map_recipe_error(error: RecipePersistenceError) -> Error {
    match error {
        RecipePersistenceError::Connection { message } => {
            Error::service_unavailable(format!("recipe repository unavailable: {message}"))
        }
        RecipePersistenceError::Query { message } | RecipePersistenceError::Corrupt { message } => {
            Error::internal(format!("recipe repository error: {message}"))
        }
        RecipePersistenceError::RevisionMismatch { expected, actual } => {
            revision_conflict("recipe", expected, actual)
        }
        RecipePersistenceError::Missing { .. } => Error::not_found("recipe not found"),
    }
}

/// Load the caller's account and turn it into an [`Actor`].
///
/// A session pointing at a user that no longer exists is treated as
/// unauthenticated.
pub(crate) async fn resolve_actor<U>(users: &U, id: &UserId) -> Result<Actor, Error>
where
    U: UserRepository + ?Sized,
{
    users
        .find_by_id(id)
        .await
        .map_err(map_user_error)?
        .map(|user| Actor::from(&user))
        .ok_or_else(|| Error::unauthorized("login required"))
}

pub(crate) async fn load_group<G>(groups: &G, id: &GroupId) -> Result<Group, Error>
where
    G: GroupRepository + ?Sized,
{
    groups
        .find_by_id(id)
        .await
        .map_err(map_group_error)?
        .ok_or_else(|| Error::not_found("group not found"))
}

/// Load the group a recipe points at. Dangling references resolve to `None`.
pub(crate) async fn load_recipe_group<G>(
    groups: &G,
    recipe: &Recipe,
) -> Result<Option<Group>, Error>
where
    G: GroupRepository + ?Sized,
{
    match recipe.group() {
        Some(id) => groups.find_by_id(id).await.map_err(map_group_error),
        None => Ok(None),
    }
}

pub(crate) async fn load_recipe<R>(recipes: &R, id: &RecipeId) -> Result<Recipe, Error>
where
    R: RecipeRepository + ?Sized,
{
    recipes
        .find_by_id(id)
        .await
        .map_err(map_recipe_error)?
        .ok_or_else(|| Error::not_found("recipe not found"))
}

/// Bump the group's revision and write it with a compare-and-swap.
pub(crate) async fn persist_group<G>(
    groups: &G,
    group: &mut Group,
    now: DateTime<Utc>,
) -> Result<(), Error>
where
    G: GroupRepository + ?Sized,
{
    let expected = group.advance_revision(now);
    groups.save(group, expected).await.map_err(map_group_error)
}

/// Bump the recipe's revision and write it with a compare-and-swap.
pub(crate) async fn persist_recipe<R>(
    recipes: &R,
    recipe: &mut Recipe,
    now: DateTime<Utc>,
) -> Result<(), Error>
where
    R: RecipeRepository + ?Sized,
{
    let expected = recipe.advance_revision(now);
    recipes.save(recipe, expected).await.map_err(map_recipe_error)
}

/// Add `group` to a user's group index. Failures are logged, not surfaced:
/// the roster is the source of truth.
pub(crate) async fn index_membership<U>(users: &U, user: &UserId, group: &GroupId)
where
    U: UserRepository + ?Sized,
{
    if let Err(error) = users.add_group(user, group).await {
        warn!(%error, user_id = %user, group_id = %group, "failed to index group membership");
    }
}

/// Remove `group` from a user's group index, logging failures.
pub(crate) async fn unindex_membership<U>(users: &U, user: &UserId, group: &GroupId)
where
    U: UserRepository + ?Sized,
{
    if let Err(error) = users.remove_group(user, group).await {
        warn!(%error, user_id = %user, group_id = %group, "failed to unindex group membership");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockUserRepository;
    use rstest::rstest;

    #[rstest]
    #[case(GroupPersistenceError::connection("down"), ErrorCode::ServiceUnavailable)]
    #[case(GroupPersistenceError::query("syntax"), ErrorCode::InternalError)]
    #[case(GroupPersistenceError::revision_mismatch(1_u32, 2_u32), ErrorCode::Conflict)]
    #[case(GroupPersistenceError::missing("x"), ErrorCode::NotFound)]
    fn group_errors_map_to_codes(#[case] error: GroupPersistenceError, #[case] code: ErrorCode) {
        assert_eq!(map_group_error(error).code(), code);
    }

    #[rstest]
    fn revision_conflicts_carry_details() {
        let error = map_recipe_error(RecipePersistenceError::revision_mismatch(3_u32, 4_u32));
        let details = error.details().expect("details present");
        assert_eq!(details["expectedRevision"], 3);
        assert_eq!(details["actualRevision"], 4);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_session_user_is_unauthorized() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().times(1).return_once(|_| Ok(None));

        let error = resolve_actor(&users, &UserId::random())
            .await
            .expect_err("unknown user");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn index_failures_are_swallowed() {
        let mut users = MockUserRepository::new();
        users
            .expect_add_group()
            .times(1)
            .return_once(|_, _| Err(UserPersistenceError::connection("down")));

        index_membership(&users, &UserId::random(), &GroupId::random()).await;
    }
}
