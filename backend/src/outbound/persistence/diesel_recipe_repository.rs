//! PostgreSQL-backed `RecipeRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RecipePersistenceError, RecipeRepository};
use crate::domain::{GroupId, ModerationStatus, Recipe, RecipeId};

use super::diesel_helpers::{
    DieselFailure, cast_count, cast_revision, cast_revision_for_db, classify_diesel_error,
    collect_rows, map_pool_error_message,
};
use super::models::RecipeRow;
use super::pool::{DbPool, PoolError};
use super::schema::recipes;

/// Diesel-backed implementation of the `RecipeRepository` port.
#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
}

impl DieselRecipeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RecipePersistenceError {
    RecipePersistenceError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> RecipePersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => RecipePersistenceError::connection(message),
        DieselFailure::Query(message) => RecipePersistenceError::query(message),
        DieselFailure::UniqueViolation { .. } => RecipePersistenceError::query("unique violation"),
    }
}

fn to_row(recipe: &Recipe) -> Result<RecipeRow, RecipePersistenceError> {
    RecipeRow::from_recipe(recipe).map_err(RecipePersistenceError::query)
}

fn to_recipes(rows: Vec<RecipeRow>) -> Result<Vec<Recipe>, RecipePersistenceError> {
    collect_rows(
        rows.into_iter().map(RecipeRow::into_recipe),
        RecipePersistenceError::corrupt,
    )
}

/// Explain why a revision-filtered update touched no rows.
async fn handle_recipe_update_failure<C>(
    conn: &mut C,
    id: uuid::Uuid,
    expected_revision: u32,
) -> RecipePersistenceError
where
    C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    let current = recipes::table
        .filter(recipes::id.eq(id))
        .select(recipes::revision)
        .first::<i32>(conn)
        .await
        .optional()
        .map_err(map_diesel_error);

    match current {
        Ok(Some(actual)) => {
            RecipePersistenceError::revision_mismatch(expected_revision, cast_revision(actual))
        }
        Ok(None) => RecipePersistenceError::missing(id.to_string()),
        Err(error) => error,
    }
}

#[async_trait]
impl RecipeRepository for DieselRecipeRepository {
    async fn insert(&self, recipe: &Recipe) -> Result<(), RecipePersistenceError> {
        let row = to_row(recipe)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(recipes::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<RecipeRow> = recipes::table
            .filter(recipes::id.eq(id.as_uuid()))
            .select(RecipeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(RecipeRow::into_recipe)
            .transpose()
            .map_err(RecipePersistenceError::corrupt)
    }

    async fn list_all(&self) -> Result<Vec<Recipe>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RecipeRow> = recipes::table
            .select(RecipeRow::as_select())
            .order_by((recipes::created_at.desc(), recipes::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_recipes(rows)
    }

    async fn list_by_group(&self, group: &GroupId) -> Result<Vec<Recipe>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RecipeRow> = recipes::table
            .filter(recipes::group_id.eq(group.as_uuid()))
            .select(RecipeRow::as_select())
            .order_by((recipes::created_at.desc(), recipes::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_recipes(rows)
    }

    async fn list_pending(&self) -> Result<Vec<Recipe>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RecipeRow> = recipes::table
            .filter(recipes::moderation_status.eq(ModerationStatus::Pending.as_str()))
            .select(RecipeRow::as_select())
            .order_by((recipes::created_at.desc(), recipes::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_recipes(rows)
    }

    async fn count_pending(&self) -> Result<u64, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = recipes::table
            .filter(recipes::moderation_status.eq(ModerationStatus::Pending.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(cast_count(count))
    }

    async fn save(
        &self,
        recipe: &Recipe,
        expected_revision: u32,
    ) -> Result<(), RecipePersistenceError> {
        let row = to_row(recipe)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated_rows = diesel::update(recipes::table)
            .filter(
                recipes::id
                    .eq(row.id)
                    .and(recipes::revision.eq(cast_revision_for_db(expected_revision))),
            )
            .set(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated_rows == 0 {
            return Err(handle_recipe_update_failure(&mut conn, row.id, expected_revision).await);
        }
        Ok(())
    }

    async fn delete(&self, id: &RecipeId) -> Result<bool, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(recipes::table.filter(recipes::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn detach_group(&self, group: &GroupId) -> Result<u64, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let detached = diesel::update(recipes::table.filter(recipes::group_id.eq(group.as_uuid())))
            .set((
                recipes::group_id.eq(None::<uuid::Uuid>),
                recipes::updated_at.eq(chrono::Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(detached as u64)
    }
}
