//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{Session, SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::{HttpResponse, test as actix_test, web};

use crate::domain::ports::{
    MockAccountCommand, MockGroupCommand, MockGroupQuery, MockLoginService,
    MockMembershipCommand, MockModerationCommand, MockModerationQuery, MockRecipeCommand,
    MockRecipeQuery, MockUserProfileQuery,
};
use crate::domain::UserId;

use super::session::SESSION_USER_KEY;
use super::state::{HttpState, HttpStatePorts};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Mock ports with no expectations. Tests set expectations on the ports a
/// handler should call; any other call panics.
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub accounts: MockAccountCommand,
    pub profile: MockUserProfileQuery,
    pub groups: MockGroupCommand,
    pub groups_query: MockGroupQuery,
    pub membership: MockMembershipCommand,
    pub recipes: MockRecipeCommand,
    pub recipes_query: MockRecipeQuery,
    pub moderation: MockModerationCommand,
    pub moderation_query: MockModerationQuery,
}

impl MockPorts {
    pub fn into_state(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            login: Arc::new(self.login),
            accounts: Arc::new(self.accounts),
            profile: Arc::new(self.profile),
            groups: Arc::new(self.groups),
            groups_query: Arc::new(self.groups_query),
            membership: Arc::new(self.membership),
            recipes: Arc::new(self.recipes),
            recipes_query: Arc::new(self.recipes_query),
            moderation: Arc::new(self.moderation),
            moderation_query: Arc::new(self.moderation_query),
        })
    }
}

/// Route that stores a user id in the session, for tests that need a
/// logged-in caller without going through the login handler.
pub const TEST_LOGIN_PATH: &str = "/__test/login/{user}";

pub async fn test_login(session: Session, user: web::Path<String>) -> HttpResponse {
    match session.insert(SESSION_USER_KEY, user.into_inner()) {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(_) => HttpResponse::InternalServerError().finish(),
    }
}

/// Request that logs `user` in through [`test_login`].
pub fn login_request(user: &UserId) -> actix_test::TestRequest {
    actix_test::TestRequest::post().uri(&format!("/__test/login/{user}"))
}

/// Extract the session cookie set by a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}
