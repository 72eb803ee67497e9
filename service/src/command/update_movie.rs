//! [`Command`] for updating a [`Movie`].

use common::{
    operations::{
        By, Commit, Delete, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::movie::Slug;
use crate::{
    domain::{episode, movie, Episode, Movie},
    infra::{database, Database},
    Service,
};

use super::{create_movie::first_duplicate, Command};

/// [`Command`] for updating a [`Movie`].
///
/// [`Episode`]s of the [`Movie`] are replaced wholesale.
#[derive(Clone, Debug)]
pub struct UpdateMovie {
    /// Current [`Slug`] of the [`Movie`].
    pub slug: movie::Slug,

    /// New contents of the [`Movie`].
    pub movie: movie::Draft,

    /// New [`episode::Draft`]s of the [`Movie`].
    pub episodes: Vec<episode::Draft>,
}

impl<Db> Command<UpdateMovie> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: for<'l> Database<
            Select<By<Option<Movie>, &'l movie::Slug>>,
            Ok = Option<Movie>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Movie>, movie::Id>>,
            Ok = Option<Movie>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Movie, movie::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<Movie>, Ok = (), Err = Traced<database::Error>>
        + Database<
            Delete<By<Vec<Episode>, movie::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Insert<(movie::Id, Vec<episode::Draft>)>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Movie;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateMovie) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateMovie {
            slug,
            movie: draft,
            episodes,
        } = cmd;

        if let Some(n) = first_duplicate(&episodes) {
            return Err(tracerr::new!(E::DuplicateEpisode(n)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let id = tx
            .execute(Select(By::<Option<Movie>, _>::new(&slug)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::MovieNotExists(slug.clone()))
            .map_err(tracerr::wrap!())?
            .id;

        // Avoid concurrent actions upon the same `Movie`.
        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut movie = tx
            .execute(Select(By::<Option<Movie>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::MovieNotExists(slug.clone()))
            .map_err(tracerr::wrap!())?;

        if draft.slug != movie.slug {
            let occupied = tx
                .execute(Select(By::new(&draft.slug)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if occupied.is_some_and(|m| m.id != id) {
                return Err(tracerr::new!(E::SlugOccupied(draft.slug)));
            }
        }

        movie.apply(draft);
        movie.updated_at = DateTime::now().coerce();
        tx.execute(Update(movie.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Delete(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert((id, episodes)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(movie)
    }
}

/// Error of [`UpdateMovie`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Movie`] doesn't exist.
    #[display("`Movie(slug: {_0})` does not exist")]
    #[from(ignore)]
    MovieNotExists(#[error(not(source))] movie::Slug),

    /// [`Slug`] is occupied by another [`Movie`].
    #[display("`{_0}` slug is occupied")]
    #[from(ignore)]
    SlugOccupied(#[error(not(source))] movie::Slug),

    /// [`episode::Number`] is given to more than one [`Episode`].
    #[display("Episode `{_0}` is given more than once")]
    #[from(ignore)]
    DuplicateEpisode(#[error(not(source))] episode::Number),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{episode, movie, server},
        infra::database::memory::Memory,
        Command as _,
    };

    use super::{ExecutionError, UpdateMovie};

    fn draft(slug: &str, title: &str) -> movie::Draft {
        movie::Draft {
            slug: movie::Slug::new(slug).unwrap(),
            title: movie::Title::new(title).unwrap(),
            original_title: None,
            description: None,
            poster: None,
            backdrop: None,
            year: movie::Year::new(2024),
            status: movie::Status::Completed,
            genres: vec![],
            tags: vec![],
        }
    }

    fn episode(n: i64, servers: &[&str]) -> episode::Draft {
        let number = episode::Number::new(n).unwrap();
        episode::Draft {
            number,
            name: episode::Name::fallback(number),
            servers: servers
                .iter()
                .enumerate()
                .map(|(i, url)| server::Draft {
                    name: server::Name::new(format!("Server {i}")).unwrap(),
                    embed_url: server::EmbedUrl::new(url).unwrap(),
                    priority: server::Priority::at(i),
                })
                .collect(),
        }
    }

    fn slug(s: &str) -> movie::Slug {
        movie::Slug::new(s).unwrap()
    }

    #[tokio::test]
    async fn replaces_episodes_wholesale() {
        let db = Memory::default();
        let stored = db.movie("phim-hay", &[1, 2, 3]);

        let updated = db
            .service()
            .execute(UpdateMovie {
                slug: slug("phim-hay"),
                movie: draft("phim-hay", "Phim Hay Lắm"),
                episodes: vec![
                    episode(5, &["https://e.mbed/5a", "https://e.mbed/5b"]),
                    episode(6, &[]),
                ],
            })
            .await
            .unwrap();

        assert_eq!(updated.id, stored.id);
        assert_eq!(updated.title.to_string(), "Phim Hay Lắm");
        assert_eq!(updated.status, movie::Status::Completed);

        let episodes = db.episodes(stored.id);
        let numbers: Vec<_> = episodes.iter().map(|(e, _)| e.number).collect();
        assert_eq!(
            numbers,
            [episode::Number::new(5).unwrap(), episode::Number::new(6).unwrap()],
        );
        assert_eq!(episodes[0].1.len(), 2);
        assert!(episodes[1].1.is_empty());
        assert_eq!(db.commits(), 1);
    }

    #[tokio::test]
    async fn renames_slug() {
        let db = Memory::default();
        let stored = db.movie("phim-cu", &[1]);

        let updated = db
            .service()
            .execute(UpdateMovie {
                slug: slug("phim-cu"),
                movie: draft("phim-moi", "Phim Mới"),
                episodes: vec![episode(1, &[])],
            })
            .await
            .unwrap();

        assert_eq!(updated.id, stored.id);
        assert_eq!(db.movies()[0].slug, slug("phim-moi"));
    }

    #[tokio::test]
    async fn rejects_occupied_slug() {
        let db = Memory::default();
        let stored = db.movie("phim-a", &[1, 2]);
        _ = db.movie("phim-b", &[]);

        let err = db
            .service()
            .execute(UpdateMovie {
                slug: slug("phim-a"),
                movie: draft("phim-b", "Phim A"),
                episodes: vec![],
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::SlugOccupied(_)));
        assert_eq!(db.episodes(stored.id).len(), 2);
        assert_eq!(db.commits(), 0);
    }

    #[tokio::test]
    async fn rejects_duplicate_episodes() {
        let db = Memory::default();
        let stored = db.movie("phim", &[1]);

        let err = db
            .service()
            .execute(UpdateMovie {
                slug: slug("phim"),
                movie: draft("phim", "Phim"),
                episodes: vec![episode(2, &[]), episode(2, &[])],
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::DuplicateEpisode(_)));
        assert_eq!(db.episodes(stored.id).len(), 1);
    }

    #[tokio::test]
    async fn rejects_unknown_movie() {
        let err = Memory::default()
            .service()
            .execute(UpdateMovie {
                slug: slug("khong-co"),
                movie: draft("khong-co", "Không có"),
                episodes: vec![],
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::MovieNotExists(_)));
    }
}
