//! Authentication endpoints.

use axum::{Extension, Json};
use axum_extra::extract::{cookie::CookieJar, WithRejection};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::user,
    query::{self, Query as _},
};

use crate::{
    api::{self, Body},
    define_error,
    session::{CookiePolicy, Session},
    AsError, Error, Service,
};

/// Registers a new [`user::Role::User`] and signs them in.
#[tracing::instrument(skip_all, fields(username, email))]
pub(crate) async fn register(
    Extension(service): Extension<Service>,
    Extension(cookies): Extension<CookiePolicy>,
    jar: CookieJar,
    WithRejection(Json(input), _): Body<api::user::NewUser>,
) -> Result<(CookieJar, Json<api::user::Envelope>), Error> {
    let span = tracing::Span::current();
    _ = span.record("username", input.username.as_deref());
    _ = span.record("email", input.email.as_deref());

    let user = service
        .execute(input.validate(user::Role::User)?)
        .await
        .map_err(AsError::into_error)?;

    let command::create_user_session::Output { token, user, .. } = service
        .execute(command::CreateUserSession::ByUserId(user.id))
        .await
        .map_err(AsError::into_error)?;

    Ok((jar.add(cookies.issue(&token)), Json(Some(user).into())))
}

/// Credentials of a [`login()`] request.
#[derive(Debug, Deserialize)]
pub(crate) struct Credentials {
    /// Username or email.
    username: String,

    /// Password in plain text.
    password: String,
}

/// Signs a user in by their credentials.
#[tracing::instrument(skip_all, fields(login = %input.username))]
pub(crate) async fn login(
    Extension(service): Extension<Service>,
    Extension(cookies): Extension<CookiePolicy>,
    jar: CookieJar,
    WithRejection(Json(input), _): Body<Credentials>,
) -> Result<(CookieJar, Json<api::user::Envelope>), Error> {
    let Credentials { username, password } = input;

    let login = api::valid(user::Login::new(username), "username")?;
    let password = user::Password::from(password);
    let command::create_user_session::Output { token, user, .. } = service
        .execute(command::CreateUserSession::ByCredentials {
            login,
            password: secrecy::SecretBox::init_with(move || password),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((jar.add(cookies.issue(&token)), Json(Some(user).into())))
}

/// Acknowledgement of a [`logout()`].
#[derive(Debug, Serialize)]
pub(crate) struct LoggedOut {
    /// Always `true`.
    ok: bool,
}

/// Signs the current user out by wiping the session cookie.
#[expect(clippy::unused_async, reason = "`async` is required by `axum`")]
pub(crate) async fn logout(
    Extension(cookies): Extension<CookiePolicy>,
    jar: CookieJar,
) -> (CookieJar, Json<LoggedOut>) {
    (jar.add(cookies.clear()), Json(LoggedOut { ok: true }))
}

/// Returns the signed-in user, if any.
#[tracing::instrument(skip_all)]
pub(crate) async fn me(
    Extension(service): Extension<Service>,
    session: Option<Session>,
) -> Result<Json<api::user::Envelope>, Error> {
    let Some(session) = session else {
        return Ok(Json(None.into()));
    };

    let user = service
        .execute(query::user::ById::by(session.user_id))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(user.into()))
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_REQUEST"]
                #[status = BAD_REQUEST]
                #[message = "Phải có username hoặc email"]
                NoLogin,

                #[code = "USERNAME_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "Tên đăng nhập đã tồn tại"]
                UsernameOccupied,

                #[code = "EMAIL_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "Email đã được sử dụng"]
                EmailOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NoLogin => Some(Error::NoLogin.into()),
            Self::UsernameOccupied(_) => Some(Error::UsernameOccupied.into()),
            Self::EmailOccupied(_) => Some(Error::EmailOccupied.into()),
            Self::PasswordHash(_) => None,
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WRONG_CREDENTIALS"]
                #[status = UNAUTHORIZED]
                #[message = "Sai tên đăng nhập hoặc mật khẩu"]
                WrongCredentials,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::UserNotExists(_) | Self::WrongCredentials => {
                Some(Error::WrongCredentials.into())
            }
        }
    }
}
