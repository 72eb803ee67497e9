//! [`Command`] definition.

pub mod authorize_user_session;
pub mod create_movie;
pub mod create_user;
pub mod create_user_session;
pub mod delete_movie;
pub mod delete_user;
pub mod record_watch_history;
pub mod toggle_favorite;
pub mod update_movie;
pub mod update_user;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession, create_movie::CreateMovie,
    create_user::CreateUser, create_user_session::CreateUserSession,
    delete_movie::DeleteMovie, delete_user::DeleteUser,
    record_watch_history::RecordWatchHistory, toggle_favorite::ToggleFavorite,
    update_movie::UpdateMovie, update_user::UpdateUser,
};
