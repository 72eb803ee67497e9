//! Session cookie definitions.

use axum::{async_trait, extract::FromRequestParts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use derive_more::{AsRef, Deref};
use service::{
    command::{self, Command as _},
    domain::user::{self, session},
};
use tracing as log;

use crate::{config, define_error, Error};

/// Name of the cookie carrying a [`session::Token`].
pub const COOKIE_NAME: &str = "drama-phim-session";

/// Verifier of [`session::Token`]s.
///
/// Checks the signature and the expiration only, so needs no storage.
#[derive(Clone, Debug)]
pub struct Verifier(service::Service<()>);

impl Verifier {
    /// Creates a new [`Verifier`] out of the provided [`service::Config`].
    #[must_use]
    pub fn new(config: service::Config) -> Self {
        Self(service::Service::new(config, ()))
    }

    /// Verifies the provided raw `token`.
    ///
    /// Any malformed, forged or expired `token` gives [`None`].
    pub async fn verify(&self, token: &str) -> Option<user::Session> {
        // SAFETY: Garbage is rejected by the signature check below.
        #[expect(unsafe_code, reason = "verified right away")]
        let token = unsafe { session::Token::new_unchecked(token.to_owned()) };
        self.0
            .execute(command::AuthorizeUserSession { token })
            .await
            .map_err(|e| log::debug!("rejected session token: {e}"))
            .ok()
    }

    /// Verifies the session cookie of the provided [`CookieJar`], if any.
    pub async fn verify_jar(&self, jar: &CookieJar) -> Option<user::Session> {
        let token = jar.get(COOKIE_NAME)?.value().to_owned();
        if token.is_empty() {
            return None;
        }
        self.verify(&token).await
    }
}

/// Attributes of the issued session cookies.
#[derive(Clone, Copy, Debug)]
pub struct CookiePolicy {
    /// Lifetime of a session cookie.
    pub max_age: time::Duration,

    /// Indicator whether a session cookie is sent over HTTPS only.
    pub secure: bool,
}

impl From<config::Session> for CookiePolicy {
    fn from(value: config::Session) -> Self {
        Self {
            max_age: value.ttl.try_into().unwrap_or(time::Duration::MAX),
            secure: value.secure_cookie,
        }
    }
}

impl CookiePolicy {
    /// Builds a session cookie carrying the provided [`session::Token`].
    #[must_use]
    pub fn issue(&self, token: &session::Token) -> Cookie<'static> {
        self.build(token.to_string(), self.max_age)
    }

    /// Builds a cookie wiping out the session cookie.
    #[must_use]
    pub fn clear(&self) -> Cookie<'static> {
        self.build(String::new(), time::Duration::ZERO)
    }

    /// Builds a session cookie with the provided `value` and `max_age`.
    fn build(&self, value: String, max_age: time::Duration) -> Cookie<'static> {
        Cookie::build((COOKIE_NAME, value))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(max_age)
            .path("/")
            .build()
    }
}

/// Verified [`user::Session`] of the current request.
///
/// Rejects the request with `401 Unauthorized` if there is none.
#[derive(AsRef, Clone, Debug, Deref)]
pub struct Session(pub user::Session);

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        // Already verified by the `gate`.
        if let Some(session) = parts.extensions.get::<Self>() {
            return Ok(session.clone());
        }

        let verifier =
            parts.extensions.get::<Verifier>().cloned().ok_or_else(|| {
                Error::internal(&"missing `Verifier` extension")
            })?;
        verifier
            .verify_jar(&CookieJar::from_headers(&parts.headers))
            .await
            .map(Self)
            .ok_or_else(|| AccessError::Unauthenticated.into())
    }
}

define_error! {
    enum AccessError {
        #[code = "UNAUTHENTICATED"]
        #[status = UNAUTHORIZED]
        #[message = "Chưa đăng nhập"]
        Unauthenticated,

        #[code = "FORBIDDEN"]
        #[status = FORBIDDEN]
        #[message = "Bạn không có quyền truy cập"]
        Forbidden,
    }
}
