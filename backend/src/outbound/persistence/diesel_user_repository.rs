//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! The per-user group index lives in the `group_ids` array column. Index
//! maintenance uses `array_append`/`array_remove` in place so concurrent
//! membership changes on different groups never overwrite each other.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, GroupId, PasswordHash, Profile, User, UserId};

use super::diesel_helpers::{
    DieselFailure, classify_diesel_error, collect_rows, map_pool_error_message,
};
use super::models::{NewUserRow, ProfileUpdate, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        DieselFailure::Query(message) => UserPersistenceError::query(message),
        DieselFailure::UniqueViolation { .. } => UserPersistenceError::query("unique violation"),
    }
}

fn map_insert_error(error: diesel::result::Error, email: &Email) -> UserPersistenceError {
    let failure = classify_diesel_error(error);
    if failure.violates(EMAIL_CONSTRAINT) {
        return UserPersistenceError::duplicate_email(email.as_ref());
    }
    match failure {
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        DieselFailure::Query(message) => UserPersistenceError::query(message),
        DieselFailure::UniqueViolation { .. } => UserPersistenceError::query("unique violation"),
    }
}

fn corrupt(message: String) -> UserPersistenceError {
    UserPersistenceError::query(format!("stored user is invalid: {message}"))
}

fn row_to_user(row: UserRow) -> Result<User, String> {
    row.into_user().map(|(user, _)| user)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(&NewUserRow::new(user, password_hash))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| map_insert_error(error, user.email()))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose().map_err(corrupt)
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(&uuids))
            .select(UserRow::as_select())
            .order_by(users::created_at.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows.into_iter().map(row_to_user), corrupt)
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, PasswordHash)>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(UserRow::into_user).transpose().map_err(corrupt)
    }

    async fn update_profile(
        &self,
        id: &UserId,
        profile: &Profile,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(&ProfileUpdate::new(profile, chrono::Utc::now()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn add_group(&self, id: &UserId, group: &GroupId) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::sql_query(
            "UPDATE users SET group_ids = array_append(group_ids, $1), updated_at = now() \
             WHERE id = $2 AND NOT ($1 = ANY(group_ids))",
        )
        .bind::<sql_types::Uuid, _>(group.as_uuid())
        .bind::<sql_types::Uuid, _>(id.as_uuid())
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        debug!(user_id = %id, group_id = %group, updated, "group index append");
        Ok(())
    }

    async fn remove_group(
        &self,
        id: &UserId,
        group: &GroupId,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::sql_query(
            "UPDATE users SET group_ids = array_remove(group_ids, $1), updated_at = now() \
             WHERE id = $2",
        )
        .bind::<sql_types::Uuid, _>(group.as_uuid())
        .bind::<sql_types::Uuid, _>(id.as_uuid())
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(map_diesel_error)
    }

    async fn remove_group_from_all(&self, group: &GroupId) -> Result<u64, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::sql_query(
            "UPDATE users SET group_ids = array_remove(group_ids, $1), updated_at = now() \
             WHERE $1 = ANY(group_ids)",
        )
        .bind::<sql_types::Uuid, _>(group.as_uuid())
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated as u64)
    }
}
