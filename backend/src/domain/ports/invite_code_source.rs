//! Port for invite code generation.

use crate::domain::InviteCode;

/// Source of fresh invite codes. Uniqueness is checked by the caller.
#[cfg_attr(test, mockall::automock)]
pub trait InviteCodeSource: Send + Sync {
    fn generate(&self) -> InviteCode;
}
