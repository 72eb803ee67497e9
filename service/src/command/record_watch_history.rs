//! [`Command`] for recording a [`WatchHistory`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::WatchHistory;
use crate::{
    domain::{episode, movie, user, watch_history, Episode, Movie},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for merging a [`watch_history::Report`] into the
/// [`WatchHistory`] of its [`User`] and [`Movie`].
///
/// [`User`]: crate::domain::User
#[derive(Clone, Copy, Debug, From)]
pub struct RecordWatchHistory(pub watch_history::Report);

impl<Db> Command<RecordWatchHistory> for Service<Db>
where
    Db: Database<
            Select<By<Option<Movie>, movie::Id>>,
            Ok = Option<Movie>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Episode>, episode::Id>>,
            Ok = Option<Episode>,
            Err = Traced<database::Error>,
        > + Database<
            Update<watch_history::Report>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<
                By<
                    Option<read::watch_history::Entry>,
                    (user::Id, movie::Id),
                >,
            >,
            Ok = Option<read::watch_history::Entry>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = read::watch_history::Entry;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RecordWatchHistory,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RecordWatchHistory(report) = cmd;

        drop(
            self.database()
                .execute(Select(By::<Option<Movie>, _>::new(report.movie_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::MovieNotExists(report.movie_id))
                .map_err(tracerr::wrap!())?,
        );

        if let Some(episode_id) = report.episode_id {
            let episode = self
                .database()
                .execute(Select(By::<Option<Episode>, _>::new(episode_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if episode.is_none_or(|e| e.movie_id != report.movie_id) {
                return Err(tracerr::new!(E::EpisodeNotExists(episode_id)));
            }
        }

        self.database()
            .execute(Update(report))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        self.database()
            .execute(Select(By::new((report.user_id, report.movie_id))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::MovieNotExists(report.movie_id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`RecordWatchHistory`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Movie`] doesn't exist.
    #[display("`Movie(id: {_0})` does not exist")]
    #[from(ignore)]
    MovieNotExists(#[error(not(source))] movie::Id),

    /// [`Episode`] doesn't exist within the [`Movie`].
    #[display("`Episode(id: {_0})` does not exist")]
    #[from(ignore)]
    EpisodeNotExists(#[error(not(source))] episode::Id),
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::{
        domain::{episode, movie, user, watch_history},
        infra::database::memory::Memory,
        Command as _,
    };

    use super::{ExecutionError, RecordWatchHistory};

    fn report(
        user_id: user::Id,
        movie_id: movie::Id,
        episode_id: Option<episode::Id>,
        progress: Option<i64>,
    ) -> RecordWatchHistory {
        RecordWatchHistory(watch_history::Report {
            user_id,
            movie_id,
            episode_id,
            progress: progress.and_then(watch_history::Progress::new),
            at: DateTime::now().coerce(),
        })
    }

    #[tokio::test]
    async fn upserts_keeping_omitted_fields() {
        let db = Memory::default();
        let viewer = db.user("viewer", None, user::Role::User);
        let movie = db.movie("phim", &[1, 2]);
        let first = db.episodes(movie.id)[0].0.id;

        let entry = db
            .service()
            .execute(report(viewer.id, movie.id, Some(first), Some(120)))
            .await
            .unwrap();
        assert_eq!(entry.episode_id, Some(first));
        assert_eq!(i32::from(entry.progress_seconds), 120);
        assert_eq!(entry.movie.episodes, 2);

        let entry = db
            .service()
            .execute(report(viewer.id, movie.id, None, None))
            .await
            .unwrap();
        assert_eq!(entry.episode_id, Some(first));
        assert_eq!(i32::from(entry.progress_seconds), 120);
        assert_eq!(db.history().len(), 1);
    }

    #[tokio::test]
    async fn starts_without_progress() {
        let db = Memory::default();
        let viewer = db.user("viewer", None, user::Role::User);
        let movie = db.movie("phim", &[1]);

        let entry = db
            .service()
            .execute(report(viewer.id, movie.id, None, None))
            .await
            .unwrap();

        assert!(entry.episode_id.is_none());
        assert_eq!(i32::from(entry.progress_seconds), 0);
    }

    #[tokio::test]
    async fn keeps_users_apart() {
        let db = Memory::default();
        let movie = db.movie("phim", &[1]);

        for name in ["one", "two"] {
            let viewer = db.user(name, None, user::Role::User);
            _ = db
                .service()
                .execute(report(viewer.id, movie.id, None, Some(5)))
                .await
                .unwrap();
        }

        assert_eq!(db.history().len(), 2);
    }

    #[tokio::test]
    async fn rejects_episode_of_another_movie() {
        let db = Memory::default();
        let viewer = db.user("viewer", None, user::Role::User);
        let movie = db.movie("phim", &[1]);
        let other = db.movie("phim-khac", &[1]);
        let foreign = db.episodes(other.id)[0].0.id;

        let err = db
            .service()
            .execute(report(viewer.id, movie.id, Some(foreign), None))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::EpisodeNotExists(_)));
        assert!(db.history().is_empty());
    }

    #[tokio::test]
    async fn rejects_unknown_movie() {
        let db = Memory::default();
        let viewer = db.user("viewer", None, user::Role::User);

        let err = db
            .service()
            .execute(report(viewer.id, movie::Id::new(42).unwrap(), None, None))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::MovieNotExists(_)));
    }
}
