//! Sign-in state carried in the session cookie.
//!
//! Handlers never touch Actix sessions directly. They extract a
//! [`SessionContext`] and ask it who is signed in.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, UserId};

pub(crate) const SESSION_USER_KEY: &str = "user_id";

/// Session wrapper exposing sign-in, sign-out and the current caller.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Mark `user` as signed in.
    ///
    /// The session is renewed before the id is written, so a cookie issued
    /// before login never carries an authenticated identity.
    pub fn sign_in(&self, user: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0.insert(SESSION_USER_KEY, user).map_err(|error| {
            tracing::error!(%error, "session write failed");
            Error::internal("failed to start session")
        })
    }

    /// The signed-in user, if any. A malformed id is treated as signed out.
    pub fn user(&self) -> Result<Option<UserId>, Error> {
        let stored = self.0.get::<String>(SESSION_USER_KEY).map_err(|error| {
            tracing::error!(%error, "session read failed");
            Error::internal("failed to read session")
        })?;
        Ok(stored.and_then(|raw| {
            UserId::new(&raw)
                .inspect_err(|error| tracing::warn!(%error, "discarding malformed session user"))
                .ok()
        }))
    }

    /// The signed-in user, or `401 Unauthorized`.
    pub fn require_user(&self) -> Result<UserId, Error> {
        self.user()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Forget the caller; the response clears the cookie.
    pub fn sign_out(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = Session::from_request(req, payload);
        Box::pin(async move { session.await.map(Self::new) })
    }
}
