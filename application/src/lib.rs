//! Application provides API for interacting with the [`Service`].

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod api;
pub mod args;
pub mod config;
pub mod error;
pub mod gate;
pub mod pages;
pub mod policy;
pub mod session;

use axum::{middleware, Extension, Router};
// Used in binary.
use axum_client_ip as _;
use refinery as _;
use service::{
    command::{self, Command as _},
    domain::user,
};
use tokio as _;
use tower_http as _;
use tracing as log;
use tracing_subscriber as _;

pub use self::{
    args::Args,
    config::Config,
    error::{AsError, Error},
    session::{CookiePolicy, Session, Verifier},
};

/// [`Service`] with filled infrastructure dependencies.
///
/// [`Service`]: service::Service
pub type Service = service::Service<service::infra::Postgres>;

/// Builds the whole application [`Router`].
///
/// Every request passes the [`gate`] first.
pub fn app(service: Service, verifier: Verifier, cookies: CookiePolicy) -> Router {
    Router::new()
        .merge(api::router())
        .merge(pages::router())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(verifier.clone(), gate::check))
        .layer(Extension(cookies))
        .layer(Extension(verifier))
        .layer(Extension(service))
}

define_error! {
    enum RouteError {
        #[code = "NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Không tìm thấy"]
        NotFound,
    }
}

/// Answers requests matching no route.
#[expect(clippy::unused_async, reason = "`async` is required by `axum`")]
async fn not_found() -> Error {
    RouteError::NotFound.into()
}

/// Ensures the configured administrator account exists.
///
/// An account already occupying the username or the email is left as is.
///
/// # Errors
///
/// If the credentials are malformed or the account cannot be created.
pub async fn ensure_admin(
    service: &Service,
    admin: config::Admin,
) -> Result<(), Error> {
    let config::Admin {
        username,
        password,
        email,
    } = admin;

    let cmd = api::user::NewUser {
        username: Some(username),
        password,
        name: None,
        email,
        role: None,
    }
    .validate(user::Role::Admin)?;
    match service.execute(cmd).await {
        Ok(user) => {
            log::info!("created administrator `{}`", user.username);
            Ok(())
        }
        Err(e)
            if matches!(
                e.as_ref(),
                command::create_user::ExecutionError::UsernameOccupied(_)
                    | command::create_user::ExecutionError::EmailOccupied(_),
            ) =>
        {
            log::debug!("administrator is already present: {e}");
            Ok(())
        }
        Err(e) => Err(e.into_error()),
    }
}
