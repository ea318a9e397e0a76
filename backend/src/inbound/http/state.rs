//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, GroupCommand, GroupQuery, LoginService, MembershipCommand, ModerationCommand,
    ModerationQuery, RecipeCommand, RecipeQuery, UserProfileQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountCommand>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub groups: Arc<dyn GroupCommand>,
    pub groups_query: Arc<dyn GroupQuery>,
    pub membership: Arc<dyn MembershipCommand>,
    pub recipes: Arc<dyn RecipeCommand>,
    pub recipes_query: Arc<dyn RecipeQuery>,
    pub moderation: Arc<dyn ModerationCommand>,
    pub moderation_query: Arc<dyn ModerationQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountCommand>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub groups: Arc<dyn GroupCommand>,
    pub groups_query: Arc<dyn GroupQuery>,
    pub membership: Arc<dyn MembershipCommand>,
    pub recipes: Arc<dyn RecipeCommand>,
    pub recipes_query: Arc<dyn RecipeQuery>,
    pub moderation: Arc<dyn ModerationCommand>,
    pub moderation_query: Arc<dyn ModerationQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// The server wires every port to one of the domain services; tests swap
    /// in mocks for the ports a handler touches.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            accounts,
            profile,
            groups,
            groups_query,
            membership,
            recipes,
            recipes_query,
            moderation,
            moderation_query,
        } = ports;
        Self {
            login,
            accounts,
            profile,
            groups,
            groups_query,
            membership,
            recipes,
            recipes_query,
            moderation,
            moderation_query,
        }
    }
}
