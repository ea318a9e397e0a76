//! Account service: sign-up, login and profile maintenance.
//!
//! Implements [`AccountCommand`], [`LoginService`] and [`UserProfileQuery`]
//! over a [`UserRepository`] and a [`PasswordHasher`]. Login failures are
//! deliberately indistinguishable: an unknown e-mail and a wrong password
//! both yield the same unauthorised error.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::ports::{
    AccountCommand, LoginService, PasswordHashError, PasswordHasher, UserProfileQuery,
    UserRepository,
};
use super::service_support::map_user_error;
use super::{Email, Error, LoginCredentials, Profile, Registration, User, UserId, UserRole};

const INVALID_CREDENTIALS: &str = "invalid credentials";

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(format!("password hashing failed: {error}"))
}

#[derive(Clone)]
pub struct AccountService<U> {
    users: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    bootstrap_admin: Option<Email>,
}

impl<U> AccountService<U> {
    pub fn new(users: Arc<U>, hasher: Arc<dyn PasswordHasher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            clock,
            bootstrap_admin: None,
        }
    }

    /// Grant the system admin role to whoever registers with `email`.
    pub fn with_bootstrap_admin(mut self, email: Option<Email>) -> Self {
        self.bootstrap_admin = email;
        self
    }

    fn role_for(&self, email: &Email) -> UserRole {
        if self.bootstrap_admin.as_ref() == Some(email) {
            UserRole::Admin
        } else {
            UserRole::Member
        }
    }
}

impl<U: UserRepository> AccountService<U> {
    async fn current_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

#[async_trait]
impl<U: UserRepository> AccountCommand for AccountService<U> {
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let Registration {
            email,
            profile,
            password,
        } = registration;
        if self
            .users
            .find_credentials(&email)
            .await
            .map_err(map_user_error)?
            .is_some()
        {
            return Err(Error::conflict("an account with this email already exists"));
        }

        let hash = self
            .hasher
            .hash(password.expose())
            .map_err(map_hash_error)?;
        let role = self.role_for(&email);
        let user = User::new(UserId::random(), email, role, profile, self.clock.utc());
        self.users
            .insert(&user, &hash)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id(), role = role.as_str(), "account registered");
        Ok(user)
    }

    async fn update_profile(&self, user_id: &UserId, profile: Profile) -> Result<User, Error> {
        let mut user = self.current_user(user_id).await?;
        if !self
            .users
            .update_profile(user_id, &profile)
            .await
            .map_err(map_user_error)?
        {
            return Err(Error::unauthorized("login required"));
        }
        user.set_profile(profile);
        info!(user_id = %user_id, "profile updated");
        Ok(user)
    }
}

#[async_trait]
impl<U: UserRepository> LoginService for AccountService<U> {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let Ok(email) = Email::new(credentials.email()) else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let Some((user, hash)) = self
            .users
            .find_credentials(&email)
            .await
            .map_err(map_user_error)?
        else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        match self.hasher.verify(credentials.password(), &hash) {
            Ok(true) => Ok(user.id().clone()),
            Ok(false) => Err(Error::unauthorized(INVALID_CREDENTIALS)),
            Err(error) => {
                warn!(%error, user_id = %user.id(), "stored password hash rejected");
                Err(map_hash_error(error))
            }
        }
    }
}

#[async_trait]
impl<U: UserRepository> UserProfileQuery for AccountService<U> {
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.current_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockPasswordHasher, MockUserRepository, UserPersistenceError};
    use crate::domain::test_fixtures::{fixture_clock, user};
    use crate::domain::{ErrorCode, PasswordHash};
    use rstest::rstest;

    fn hasher_accepting(password: &'static str) -> MockPasswordHasher {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .returning(|raw| Ok(PasswordHash::new(format!("hashed:{raw}"))));
        hasher
            .expect_verify()
            .returning(move |raw, _| Ok(raw == password));
        hasher
    }

    fn make_service(users: MockUserRepository, hasher: MockPasswordHasher) -> AccountService<MockUserRepository> {
        AccountService::new(Arc::new(users), Arc::new(hasher), fixture_clock())
    }

    fn registration(email: &str) -> Registration {
        Registration::try_from_parts("Ada Lovelace", email, "correct horse").expect("valid registration")
    }

    #[rstest]
    #[tokio::test]
    async fn register_hashes_password_and_defaults_to_member() {
        let mut users = MockUserRepository::new();
        users.expect_find_credentials().return_once(|_| Ok(None));
        users
            .expect_insert()
            .withf(|_, hash| hash.as_str() == "hashed:correct horse")
            .times(1)
            .return_once(|_, _| Ok(()));

        let created = make_service(users, hasher_accepting("correct horse"))
            .register(registration("Ada@Example.com"))
            .await
            .expect("registered");
        assert_eq!(created.email().as_ref(), "ada@example.com");
        assert_eq!(created.role(), UserRole::Member);
        assert!(created.groups().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn bootstrap_email_registers_as_admin() {
        let mut users = MockUserRepository::new();
        users.expect_find_credentials().return_once(|_| Ok(None));
        users.expect_insert().return_once(|_, _| Ok(()));

        let service = make_service(users, hasher_accepting("correct horse"))
            .with_bootstrap_admin(Some(Email::new("root@example.com").expect("email")));
        let created = service
            .register(registration("root@example.com"))
            .await
            .expect("registered");
        assert!(created.is_admin());
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let existing = user("Ada", UserRole::Member);
        let mut users = MockUserRepository::new();
        users
            .expect_find_credentials()
            .return_once(move |_| Ok(Some((existing, PasswordHash::new("x")))));
        users.expect_insert().times(0);

        let error = make_service(users, hasher_accepting("correct horse"))
            .register(registration("ada@example.com"))
            .await
            .expect_err("duplicate");
        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn racing_duplicate_insert_is_conflict() {
        let mut users = MockUserRepository::new();
        users.expect_find_credentials().return_once(|_| Ok(None));
        users
            .expect_insert()
            .return_once(|_, _| Err(UserPersistenceError::duplicate_email("ada@example.com")));

        let error = make_service(users, hasher_accepting("correct horse"))
            .register(registration("ada@example.com"))
            .await
            .expect_err("duplicate");
        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[case("correct horse", true)]
    #[case("wrong horse", false)]
    #[tokio::test]
    async fn authenticate_checks_password(#[case] password: &str, #[case] accepted: bool) {
        let existing = user("Ada", UserRole::Member);
        let expected = existing.id().clone();
        let mut users = MockUserRepository::new();
        users
            .expect_find_credentials()
            .return_once(move |_| Ok(Some((existing, PasswordHash::new("stored")))));

        let credentials =
            LoginCredentials::try_from_parts("ada@example.com", password).expect("credentials");
        let result = make_service(users, hasher_accepting("correct horse"))
            .authenticate(&credentials)
            .await;
        match result {
            Ok(id) => {
                assert!(accepted);
                assert_eq!(id, expected);
            }
            Err(error) => {
                assert!(!accepted);
                assert_eq!(error.code(), ErrorCode::Unauthorized);
            }
        }
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_email_looks_like_wrong_password() {
        let mut users = MockUserRepository::new();
        users.expect_find_credentials().return_once(|_| Ok(None));

        let credentials =
            LoginCredentials::try_from_parts("nobody@example.com", "whatever").expect("credentials");
        let error = make_service(users, MockPasswordHasher::new())
            .authenticate(&credentials)
            .await
            .expect_err("unknown");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
        assert_eq!(error.message(), INVALID_CREDENTIALS);
    }

    #[rstest]
    #[tokio::test]
    async fn update_profile_returns_updated_user() {
        let existing = user("Ada", UserRole::Member);
        let id = existing.id().clone();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(existing)));
        users
            .expect_update_profile()
            .times(1)
            .return_once(|_, _| Ok(true));

        let profile = Profile::try_from_parts("Ada L.", Some("Bakes bread"), None).expect("profile");
        let updated = make_service(users, MockPasswordHasher::new())
            .update_profile(&id, profile)
            .await
            .expect("updated");
        assert_eq!(updated.name().as_ref(), "Ada L.");
        assert_eq!(updated.profile().bio.as_deref(), Some("Bakes bread"));
    }
}
