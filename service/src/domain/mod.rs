//! Domain definitions.

pub mod episode;
pub mod favorite;
pub mod genre;
pub mod movie;
pub mod server;
pub mod tag;
pub mod user;
pub mod watch;
pub mod watch_history;

pub use self::{
    episode::Episode, favorite::Favorite, genre::Genre, movie::Movie,
    server::Server, tag::Tag, user::User, watch_history::WatchHistory,
};
