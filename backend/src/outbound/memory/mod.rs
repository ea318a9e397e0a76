//! In-process repository adapters.
//!
//! These keep every aggregate in a mutex-guarded map and honour the same
//! contracts as the PostgreSQL adapters: unique e-mails and invite codes,
//! revision compare-and-swap and the documented list orderings. The server
//! uses them when no database URL is configured, and integration tests use
//! them to drive the real services without a cluster.

mod group_repository;
mod recipe_repository;
mod user_repository;

use std::sync::{Mutex, MutexGuard};

pub use group_repository::InMemoryGroupRepository;
pub use recipe_repository::InMemoryRecipeRepository;
pub use user_repository::InMemoryUserRepository;

/// Lock a store, recovering the data if a previous holder panicked.
fn lock<T>(store: &Mutex<T>) -> MutexGuard<'_, T> {
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
