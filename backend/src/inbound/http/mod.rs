//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod groups;
pub mod groups_dto;
pub mod health;
pub mod memberships;
pub mod moderation;
pub mod recipes;
pub mod recipes_dto;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub(crate) mod validation;

pub use error::ApiResult;
