//! Driving port for account mutations: sign-up and profile edits.

use async_trait::async_trait;

use crate::domain::{Error, Profile, Registration, User, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account. Duplicate e-mails yield
    /// [`ErrorCode::Conflict`](crate::domain::ErrorCode::Conflict).
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Replace the caller's editable profile fields.
    async fn update_profile(&self, user_id: &UserId, profile: Profile) -> Result<User, Error>;
}
