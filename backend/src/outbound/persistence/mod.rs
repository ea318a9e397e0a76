//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the domain repository
//! ports backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) never leak into the domain layer.
//! - **Validated reads**: Rows are rebuilt through the domain constructors,
//!   so a corrupt row surfaces as an error rather than a broken aggregate.
//! - **Optimistic concurrency**: Group and recipe saves are filtered by the
//!   revision the caller loaded.
//!
//! # Example
//!
//! ```ignore
//! use cookbook::outbound::persistence::{DbPool, PoolConfig, DieselGroupRepository};
//!
//! let config = PoolConfig::new("postgres://localhost/cookbook");
//! let pool = DbPool::new(config).await?;
//! let groups = DieselGroupRepository::new(pool);
//! ```

mod diesel_group_repository;
pub(crate) mod diesel_helpers;
mod diesel_recipe_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_group_repository::DieselGroupRepository;
pub use diesel_recipe_repository::DieselRecipeRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
