//! PostgreSQL-backed `GroupRepository` implementation using Diesel ORM.
//!
//! A group row carries its roster and pending requests as JSONB, so each save
//! replaces the whole document in one revision-checked `UPDATE`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{GroupPersistenceError, GroupRepository};
use crate::domain::{Group, GroupId, InviteCode, ModerationStatus};

use super::diesel_helpers::{
    DieselFailure, cast_count, cast_revision, cast_revision_for_db, classify_diesel_error,
    collect_rows, map_pool_error_message,
};
use super::models::GroupRow;
use super::pool::{DbPool, PoolError};
use super::schema::groups;

const INVITE_CODE_CONSTRAINT: &str = "groups_invite_code_key";

/// Diesel-backed implementation of the `GroupRepository` port.
#[derive(Clone)]
pub struct DieselGroupRepository {
    pool: DbPool,
}

impl DieselGroupRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> GroupPersistenceError {
    GroupPersistenceError::connection(map_pool_error_message(error))
}

fn map_failure(failure: DieselFailure) -> GroupPersistenceError {
    match failure {
        DieselFailure::Connection(message) => GroupPersistenceError::connection(message),
        DieselFailure::Query(message) => GroupPersistenceError::query(message),
        DieselFailure::UniqueViolation { constraint } => GroupPersistenceError::query(format!(
            "unique violation on {}",
            constraint.as_deref().unwrap_or("unknown constraint")
        )),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> GroupPersistenceError {
    map_failure(classify_diesel_error(error))
}

fn to_row(group: &Group) -> Result<GroupRow, GroupPersistenceError> {
    GroupRow::from_group(group).map_err(GroupPersistenceError::query)
}

fn to_groups(rows: Vec<GroupRow>) -> Result<Vec<Group>, GroupPersistenceError> {
    collect_rows(
        rows.into_iter().map(GroupRow::into_group),
        GroupPersistenceError::corrupt,
    )
}

/// Explain why a revision-filtered update touched no rows.
async fn handle_group_update_failure<C>(
    conn: &mut C,
    id: uuid::Uuid,
    expected_revision: u32,
) -> GroupPersistenceError
where
    C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    let current = groups::table
        .filter(groups::id.eq(id))
        .select(groups::revision)
        .first::<i32>(conn)
        .await
        .optional()
        .map_err(map_diesel_error);

    match current {
        Ok(Some(actual)) => {
            GroupPersistenceError::revision_mismatch(expected_revision, cast_revision(actual))
        }
        Ok(None) => GroupPersistenceError::missing(id.to_string()),
        Err(error) => error,
    }
}

#[async_trait]
impl GroupRepository for DieselGroupRepository {
    async fn insert(&self, group: &Group) -> Result<(), GroupPersistenceError> {
        let row = to_row(group)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(groups::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| {
                let failure = classify_diesel_error(error);
                if failure.violates(INVITE_CODE_CONSTRAINT) {
                    GroupPersistenceError::duplicate_invite_code(group.invite_code().as_ref())
                } else {
                    map_failure(failure)
                }
            })
    }

    async fn find_by_id(&self, id: &GroupId) -> Result<Option<Group>, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<GroupRow> = groups::table
            .filter(groups::id.eq(id.as_uuid()))
            .select(GroupRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(GroupRow::into_group)
            .transpose()
            .map_err(GroupPersistenceError::corrupt)
    }

    async fn find_by_invite_code(
        &self,
        code: &InviteCode,
    ) -> Result<Option<Group>, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<GroupRow> = groups::table
            .filter(groups::invite_code.eq(code.as_ref()))
            .select(GroupRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(GroupRow::into_group)
            .transpose()
            .map_err(GroupPersistenceError::corrupt)
    }

    async fn list_all(&self) -> Result<Vec<Group>, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<GroupRow> = groups::table
            .select(GroupRow::as_select())
            .order_by((groups::name.asc(), groups::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_groups(rows)
    }

    async fn list_pending(&self) -> Result<Vec<Group>, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<GroupRow> = groups::table
            .filter(groups::moderation_status.eq(ModerationStatus::Pending.as_str()))
            .select(GroupRow::as_select())
            .order_by(groups::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_groups(rows)
    }

    async fn count_pending(&self) -> Result<u64, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = groups::table
            .filter(groups::moderation_status.eq(ModerationStatus::Pending.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(cast_count(count))
    }

    async fn save(
        &self,
        group: &Group,
        expected_revision: u32,
    ) -> Result<(), GroupPersistenceError> {
        let row = to_row(group)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated_rows = diesel::update(groups::table)
            .filter(
                groups::id
                    .eq(row.id)
                    .and(groups::revision.eq(cast_revision_for_db(expected_revision))),
            )
            .set(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated_rows == 0 {
            return Err(handle_group_update_failure(&mut conn, row.id, expected_revision).await);
        }
        Ok(())
    }

    async fn delete(&self, id: &GroupId) -> Result<bool, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(groups::table.filter(groups::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
