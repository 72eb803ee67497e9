//! [`WatchHistory`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::Serialize;

use crate::domain::{episode, movie, user};

/// Viewing progress of a [`User`] through a [`Movie`].
///
/// There is at most one [`WatchHistory`] per [`User`] and [`Movie`].
///
/// [`Movie`]: crate::domain::Movie
/// [`User`]: crate::domain::User
#[derive(Clone, Debug)]
pub struct WatchHistory {
    /// ID of this [`WatchHistory`].
    pub id: Id,

    /// ID of the watching [`User`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// ID of the watched [`Movie`].
    ///
    /// [`Movie`]: crate::domain::Movie
    pub movie_id: movie::Id,

    /// ID of the last watched [`Episode`], if known.
    ///
    /// [`Episode`]: crate::domain::Episode
    pub episode_id: Option<episode::Id>,

    /// Playback position within the last watched [`Episode`].
    ///
    /// [`Episode`]: crate::domain::Episode
    pub progress: Progress,

    /// [`DateTime`] when the [`Movie`] was last watched.
    ///
    /// [`Movie`]: crate::domain::Movie
    pub last_watched_at: WatchingDateTime,
}

impl WatchHistory {
    /// Starts a new [`WatchHistory`] out of its first [`Report`].
    #[must_use]
    pub fn start(id: Id, report: Report) -> Self {
        Self {
            id,
            user_id: report.user_id,
            movie_id: report.movie_id,
            episode_id: report.episode_id,
            progress: report.progress.unwrap_or_default(),
            last_watched_at: report.at,
        }
    }

    /// Merges the provided [`Report`] into this [`WatchHistory`].
    ///
    /// Omitted episode and progress keep their previous values.
    pub fn record(&mut self, report: Report) {
        if let Some(episode_id) = report.episode_id {
            self.episode_id = Some(episode_id);
        }
        if let Some(progress) = report.progress {
            self.progress = progress;
        }
        self.last_watched_at = report.at;
    }
}

/// Reported viewing progress, merged into the existing [`WatchHistory`].
#[derive(Clone, Copy, Debug)]
pub struct Report {
    /// ID of the watching [`User`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// ID of the watched [`Movie`].
    ///
    /// [`Movie`]: crate::domain::Movie
    pub movie_id: movie::Id,

    /// ID of the watched [`Episode`], keeping the previous one if [`None`].
    ///
    /// [`Episode`]: crate::domain::Episode
    pub episode_id: Option<episode::Id>,

    /// Playback [`Progress`], keeping the previous one if [`None`].
    pub progress: Option<Progress>,

    /// [`DateTime`] of this [`Report`].
    pub at: WatchingDateTime,
}

/// ID of a [`WatchHistory`].
#[derive(
    Clone, Copy, Debug, Display, Eq, From, Hash, Into, PartialEq, Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i32);

/// Playback position in whole seconds.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Progress(i32);

impl Progress {
    /// Creates a new [`Progress`] if the given `seconds` are non-negative.
    #[must_use]
    pub fn new(seconds: i64) -> Option<Self> {
        i32::try_from(seconds).ok().filter(|s| *s >= 0).map(Self)
    }
}

/// [`DateTime`] when a [`Movie`] was last watched.
///
/// [`Movie`]: crate::domain::Movie
pub type WatchingDateTime = DateTimeOf<(WatchHistory, unit::Watching)>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::domain::{episode, movie, user};

    use super::{Id, Progress, Report, WatchHistory};

    fn report(episode: Option<i64>, progress: Option<i64>) -> Report {
        Report {
            user_id: user::Id::new(),
            movie_id: movie::Id::new(1).unwrap(),
            episode_id: episode.and_then(episode::Id::new),
            progress: progress.and_then(Progress::new),
            at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn starts_from_zero_progress() {
        let history = WatchHistory::start(Id::from(1), report(None, None));

        assert_eq!(history.progress, Progress::default());
        assert!(history.episode_id.is_none());
    }

    #[test]
    fn record_keeps_omitted_fields() {
        let mut history =
            WatchHistory::start(Id::from(1), report(Some(4), Some(90)));

        history.record(report(None, None));
        assert_eq!(history.episode_id, episode::Id::new(4));
        assert_eq!(history.progress, Progress::new(90).unwrap());

        history.record(report(Some(5), None));
        assert_eq!(history.episode_id, episode::Id::new(5));
        assert_eq!(history.progress, Progress::new(90).unwrap());

        history.record(report(None, Some(0)));
        assert_eq!(history.episode_id, episode::Id::new(5));
        assert_eq!(history.progress, Progress::default());
    }

    #[test]
    fn progress_is_non_negative() {
        assert!(Progress::new(0).is_some());
        assert!(Progress::new(-1).is_none());
        assert!(Progress::new(i64::MAX).is_none());
    }
}
