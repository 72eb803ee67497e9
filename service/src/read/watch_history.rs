//! [`WatchHistory`]-related read definitions.

use serde::Serialize;

use crate::{
    domain::{episode, movie, watch_history},
    read,
};
#[cfg(doc)]
use crate::domain::WatchHistory;

/// Maximum number of [`Entry`]s listed for a single user.
pub const LIMIT: i64 = 50;

/// [`WatchHistory`] along with the watched [`movie::Summary`].
///
/// [`movie::Summary`]: read::movie::Summary
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// ID of the [`WatchHistory`].
    pub id: watch_history::Id,

    /// ID of the watched movie.
    pub movie_id: movie::Id,

    /// ID of the last watched episode.
    pub episode_id: Option<episode::Id>,

    /// Playback position in seconds.
    pub progress_seconds: watch_history::Progress,

    /// When the movie was last watched.
    pub last_watched_at: watch_history::WatchingDateTime,

    /// Watched movie.
    pub movie: read::movie::Summary,
}
