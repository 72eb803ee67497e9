//! JSON API definitions.

mod auth;
mod catalog;
mod dashboard;
pub mod movie;
mod profile;
pub mod user;

use axum::{
    routing::{get, patch, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;

use crate::{define_error, Error};

pub use self::{movie::Movie, user::User};

/// JSON request body, rejected with an [`Error`] if malformed.
pub type Body<T> = WithRejection<Json<T>, Error>;

/// Builds the [`Router`] of the whole JSON API.
///
/// Handlers expect a [`Service`], a [`Verifier`] and a [`CookiePolicy`]
/// to be provided as [`Extension`]s.
///
/// [`CookiePolicy`]: crate::session::CookiePolicy
/// [`Extension`]: axum::Extension
/// [`Service`]: crate::Service
/// [`Verifier`]: crate::session::Verifier
pub fn router() -> Router {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/movies", get(catalog::movies))
        .route("/api/movies/:slug", get(catalog::movie))
        .route("/api/movies/:slug/episodes", get(catalog::episodes))
        .route(
            "/api/movies/:slug/episodes/:number",
            get(catalog::episode),
        )
        .route("/api/episodes/:id/servers", get(catalog::servers))
        .route("/watch/:segment", get(catalog::watch))
        .route(
            "/api/profile/favorites",
            get(profile::favorites).post(profile::toggle_favorite),
        )
        .route(
            "/api/profile/watch-history",
            get(profile::watch_history).post(profile::record_watch_history),
        )
        .route(
            "/api/dashboard/users",
            get(dashboard::users).post(dashboard::create_user),
        )
        .route(
            "/api/dashboard/users/:id",
            patch(dashboard::update_user).delete(dashboard::delete_user),
        )
        .route("/api/dashboard/movies", post(dashboard::create_movie))
        .route(
            "/api/dashboard/movies/:slug",
            get(dashboard::movie)
                .patch(dashboard::update_movie)
                .delete(dashboard::delete_movie),
        )
        .route("/api/dashboard/genres", get(dashboard::genres))
        .route("/api/dashboard/tags", get(dashboard::tags))
}

/// Drops the provided `value` if it's blank.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Rejects the provided `field` as malformed if it failed validation.
pub(crate) fn valid<T>(value: Option<T>, field: &str) -> Result<T, Error> {
    value.ok_or_else(|| {
        Error::invalid_request(&format!("Dữ liệu không hợp lệ: {field}"))
    })
}

define_error! {
    enum LookupError {
        #[code = "MOVIE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Phim không tồn tại"]
        MovieNotExists,

        #[code = "EPISODE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Tập phim không tồn tại"]
        EpisodeNotExists,

        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Người dùng không tồn tại"]
        UserNotExists,
    }
}
