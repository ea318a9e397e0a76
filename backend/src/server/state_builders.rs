//! Builders wiring repositories into the domain services behind HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use cookbook::domain::ports::{
    GroupRepository, InviteCodeSource, PasswordHasher, RecipeRepository, UserRepository,
};
use cookbook::domain::{
    AccountService, Email, GroupService, MembershipService, ModerationService, RecipeService,
};
use cookbook::inbound::http::state::{HttpState, HttpStatePorts};
use cookbook::outbound::memory::{
    InMemoryGroupRepository, InMemoryRecipeRepository, InMemoryUserRepository,
};
use cookbook::outbound::persistence::{
    DieselGroupRepository, DieselRecipeRepository, DieselUserRepository,
};
use cookbook::outbound::security::{Argon2PasswordHasher, RandomInviteCodes};

use super::ServerConfig;

/// Infrastructure shared by every service instance.
pub(crate) struct Collaborators {
    pub(crate) hasher: Arc<dyn PasswordHasher>,
    pub(crate) invite_codes: Arc<dyn InviteCodeSource>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) bootstrap_admin: Option<Email>,
}

impl Collaborators {
    fn production(bootstrap_admin: Option<Email>) -> Self {
        Self {
            hasher: Arc::new(Argon2PasswordHasher::new()),
            invite_codes: Arc::new(RandomInviteCodes),
            clock: Arc::new(DefaultClock),
            bootstrap_admin,
        }
    }
}

/// Wire one repository triple into every driving port.
///
/// All services share the same repositories, so a membership change made
/// through one port is immediately visible through the others.
pub(crate) fn build_ports<U, G, R>(
    users: Arc<U>,
    groups: Arc<G>,
    recipes: Arc<R>,
    collaborators: Collaborators,
) -> HttpStatePorts
where
    U: UserRepository + 'static,
    G: GroupRepository + 'static,
    R: RecipeRepository + 'static,
{
    let Collaborators {
        hasher,
        invite_codes,
        clock,
        bootstrap_admin,
    } = collaborators;

    let accounts = Arc::new(
        AccountService::new(users.clone(), hasher, clock.clone())
            .with_bootstrap_admin(bootstrap_admin),
    );
    let group_service = Arc::new(GroupService::new(
        users.clone(),
        groups.clone(),
        recipes.clone(),
        invite_codes,
        clock.clone(),
    ));
    let membership = Arc::new(MembershipService::new(
        users.clone(),
        groups.clone(),
        clock.clone(),
    ));
    let recipe_service = Arc::new(RecipeService::new(
        users.clone(),
        groups.clone(),
        recipes.clone(),
        clock.clone(),
    ));
    let moderation = Arc::new(ModerationService::new(users, groups, recipes, clock));

    HttpStatePorts {
        login: accounts.clone(),
        accounts: accounts.clone(),
        profile: accounts,
        groups: group_service.clone(),
        groups_query: group_service,
        membership,
        recipes: recipe_service.clone(),
        recipes_query: recipe_service,
        moderation: moderation.clone(),
        moderation_query: moderation,
    }
}

/// Build HTTP state backed by PostgreSQL when a pool is configured, or by
/// in-process repositories otherwise.
pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let collaborators = Collaborators::production(config.bootstrap_admin.clone());
    let ports = match &config.db_pool {
        Some(pool) => build_ports(
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselGroupRepository::new(pool.clone())),
            Arc::new(DieselRecipeRepository::new(pool.clone())),
            collaborators,
        ),
        None => build_ports(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryGroupRepository::new()),
            Arc::new(InMemoryRecipeRepository::new()),
            collaborators,
        ),
    };
    web::Data::new(HttpState::new(ports))
}

#[cfg(test)]
mod tests {
    //! Wiring checks over the in-memory repositories.

    use super::*;
    use actix_web::cookie::{Key, SameSite};
    use cookbook::domain::{GroupDetails, Registration, UserRole};
    use rstest::rstest;

    fn memory_state(admin: Option<&str>) -> HttpState {
        let config = ServerConfig::new(
            Key::generate(),
            false,
            SameSite::Lax,
            "127.0.0.1:0".parse().expect("literal address"),
        )
        .with_bootstrap_admin(admin.map(|raw| Email::new(raw).expect("valid e-mail")));
        build_http_state(&config).get_ref().clone()
    }

    #[rstest]
    #[tokio::test]
    async fn bootstrap_admin_is_applied_on_registration() {
        let state = memory_state(Some("chef@example.com"));

        let user = state
            .accounts
            .register(
                Registration::try_from_parts("Head Chef", "chef@example.com", "correct horse")
                    .expect("valid registration"),
            )
            .await
            .expect("registered");

        assert_eq!(user.role(), UserRole::Admin);
    }

    #[rstest]
    #[tokio::test]
    async fn ports_share_one_store() {
        let state = memory_state(None);
        let user = state
            .accounts
            .register(
                Registration::try_from_parts("Ada Lovelace", "ada@example.com", "correct horse")
                    .expect("valid registration"),
            )
            .await
            .expect("registered");

        let group = state
            .groups
            .create(
                user.id(),
                GroupDetails::try_from_parts(
                    "Family",
                    "Shared recipes for the family",
                    None,
                    true,
                )
                .expect("valid details"),
            )
            .await
            .expect("created");

        let listed = state.groups_query.list(user.id()).await.expect("listed");
        assert!(listed.iter().any(|summary| summary.group.id() == group.id()));
        let profile = state.profile.fetch_profile(user.id()).await.expect("profile");
        assert!(profile.groups().contains(group.id()));
    }
}
