//! In-memory [`Database`] exercising [`Command`]s in tests.
//!
//! Transactions are not isolated: writes are visible right away and
//! [`Commit`] only counts itself.
//!
//! [`Command`]: crate::Command
//! [`Database`]: crate::infra::Database

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use common::{
    operations::{By, Commit, Delete, Insert, Lock, Select, Transact, Update},
    DateTime, Handler,
};
use tracerr::Traced;

use crate::{
    domain::{
        episode, movie, server, user, watch_history, Episode, Movie, User,
        WatchHistory,
    },
    infra::database,
    read, Config, Service,
};

/// Contents of a [`Memory`].
#[derive(Default)]
struct Store {
    /// Stored [`User`]s.
    users: Vec<User>,

    /// Stored [`Movie`]s.
    movies: Vec<Movie>,

    /// Stored [`Episode`]s along with their servers.
    episodes: Vec<(Episode, Vec<server::Draft>)>,

    /// Stored [`WatchHistory`]s.
    history: Vec<WatchHistory>,

    /// Last issued integer ID.
    sequence: i32,

    /// Number of [`Commit`]s done.
    commits: usize,
}

impl Store {
    /// Issues a new integer ID.
    fn next_id(&mut self) -> i32 {
        self.sequence += 1;
        self.sequence
    }
}

/// Shared in-memory [`Database`].
///
/// [`Database`]: crate::infra::Database
#[derive(Clone, Default)]
pub(crate) struct Memory(Arc<Mutex<Store>>);

impl Memory {
    /// Locks the [`Store`] of this [`Memory`].
    fn lock(&self) -> MutexGuard<'_, Store> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a [`Service`] over this [`Memory`].
    pub(crate) fn service(&self) -> Service<Self> {
        Service::new(
            Config::new(b"secret", Duration::from_secs(60)),
            self.clone(),
        )
    }

    /// Stores a new [`User`] with the `secret1` password.
    pub(crate) fn user(
        &self,
        username: &str,
        email: Option<&str>,
        role: user::Role,
    ) -> User {
        let password = user::Password::new("secret1").unwrap();
        let user = User {
            id: user::Id::new(),
            username: user::Username::new(username).unwrap(),
            name: None,
            email: email.map(|e| user::Email::new(e).unwrap()),
            password_hash: user::PasswordHash::new(&password).unwrap(),
            role,
            created_at: DateTime::now().coerce(),
        };
        self.lock().users.push(user.clone());
        user
    }

    /// Stores a new [`Movie`] with episodes of the provided `numbers`.
    pub(crate) fn movie(&self, slug: &str, numbers: &[i64]) -> Movie {
        let mut store = self.lock();
        let movie = Movie {
            id: movie::Id::from(store.next_id()),
            slug: movie::Slug::new(slug).unwrap(),
            title: movie::Title::new(slug).unwrap(),
            original_title: None,
            description: None,
            poster: None,
            backdrop: None,
            year: None,
            status: movie::Status::default(),
            views: movie::Views::default(),
            genres: vec![],
            tags: vec![],
            created_at: DateTime::now().coerce(),
            updated_at: DateTime::now().coerce(),
        };
        store.movies.push(movie.clone());
        for &n in numbers {
            let number = episode::Number::new(n).unwrap();
            insert_episode(
                &mut store,
                movie.id,
                episode::Draft {
                    number,
                    name: episode::Name::fallback(number),
                    servers: vec![],
                },
            );
        }
        movie
    }

    /// Returns all the stored [`User`]s.
    pub(crate) fn users(&self) -> Vec<User> {
        self.lock().users.clone()
    }

    /// Returns all the stored [`Movie`]s.
    pub(crate) fn movies(&self) -> Vec<Movie> {
        self.lock().movies.clone()
    }

    /// Returns the [`Episode`]s of the provided [`Movie`] along with their
    /// servers, in insertion order.
    pub(crate) fn episodes(
        &self,
        movie_id: movie::Id,
    ) -> Vec<(Episode, Vec<server::Draft>)> {
        self.lock()
            .episodes
            .iter()
            .filter(|(e, _)| e.movie_id == movie_id)
            .cloned()
            .collect()
    }

    /// Returns all the stored [`WatchHistory`]s.
    pub(crate) fn history(&self) -> Vec<WatchHistory> {
        self.lock().history.clone()
    }

    /// Returns the number of [`Commit`]s done.
    pub(crate) fn commits(&self) -> usize {
        self.lock().commits
    }
}

/// Stores a new [`Episode`] of the provided [`Movie`].
fn insert_episode(store: &mut Store, movie_id: movie::Id, d: episode::Draft) {
    let id = episode::Id::from(store.next_id());
    store.episodes.push((
        Episode {
            id,
            movie_id,
            number: d.number,
            name: Some(d.name),
            slug: None,
            created_at: DateTime::now().coerce(),
        },
        d.servers,
    ));
}

impl Handler<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Handler<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.lock().commits += 1;
        Ok(())
    }
}

impl Handler<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }
}

impl<'l> Handler<Select<By<Option<User>, &'l user::Username>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        let username = by.into_inner();
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.username == *username)
            .cloned())
    }
}

impl<'l> Handler<Select<By<Option<User>, &'l user::Email>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.email.as_ref() == Some(email))
            .cloned())
    }
}

impl Handler<Lock<By<User, user::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Handler<Insert<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.lock().users.push(user);
        Ok(())
    }
}

impl Handler<Update<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut store = self.lock();
        if let Some(stored) = store.users.iter_mut().find(|u| u.id == user.id)
        {
            *stored = user;
        }
        Ok(())
    }
}

impl Handler<Delete<By<User, user::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let mut store = self.lock();
        store.users.retain(|u| u.id != id);
        store.history.retain(|h| h.user_id != id);
        Ok(())
    }
}

impl Handler<Select<By<Option<Movie>, movie::Id>>> for Memory {
    type Ok = Option<Movie>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Movie>, movie::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.lock().movies.iter().find(|m| m.id == id).cloned())
    }
}

impl<'l> Handler<Select<By<Option<Movie>, &'l movie::Slug>>> for Memory {
    type Ok = Option<Movie>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Movie>, &'l movie::Slug>>,
    ) -> Result<Self::Ok, Self::Err> {
        let slug = by.into_inner();
        Ok(self.lock().movies.iter().find(|m| m.slug == *slug).cloned())
    }
}

impl Handler<Lock<By<Movie, movie::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Movie, movie::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Handler<Update<Movie>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(movie): Update<Movie>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut store = self.lock();
        if let Some(stored) =
            store.movies.iter_mut().find(|m| m.id == movie.id)
        {
            *stored = movie;
        }
        Ok(())
    }
}

impl Handler<Delete<By<Movie, movie::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Movie, movie::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let mut store = self.lock();
        store.movies.retain(|m| m.id != id);
        store.episodes.retain(|(e, _)| e.movie_id != id);
        store.history.retain(|h| h.movie_id != id);
        Ok(())
    }
}

impl Handler<Delete<By<Vec<Episode>, movie::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<Episode>, movie::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.lock().episodes.retain(|(e, _)| e.movie_id != id);
        Ok(())
    }
}

impl Handler<Insert<(movie::Id, Vec<episode::Draft>)>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert((movie_id, drafts)): Insert<(movie::Id, Vec<episode::Draft>)>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut store = self.lock();
        for draft in drafts {
            insert_episode(&mut store, movie_id, draft);
        }
        Ok(())
    }
}

impl Handler<Select<By<Option<Episode>, episode::Id>>> for Memory {
    type Ok = Option<Episode>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Episode>, episode::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .lock()
            .episodes
            .iter()
            .find(|(e, _)| e.id == id)
            .map(|(e, _)| e.clone()))
    }
}

impl Handler<Update<watch_history::Report>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(report): Update<watch_history::Report>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut store = self.lock();
        if let Some(history) = store.history.iter_mut().find(|h| {
            h.user_id == report.user_id && h.movie_id == report.movie_id
        }) {
            history.record(report);
        } else {
            let id = watch_history::Id::from(store.next_id());
            store.history.push(WatchHistory::start(id, report));
        }
        Ok(())
    }
}

impl
    Handler<
        Select<By<Option<read::watch_history::Entry>, (user::Id, movie::Id)>>,
    > for Memory
{
    type Ok = Option<read::watch_history::Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<read::watch_history::Entry>, (user::Id, movie::Id)>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let (user_id, movie_id) = by.into_inner();
        let store = self.lock();
        let Some(history) = store
            .history
            .iter()
            .find(|h| h.user_id == user_id && h.movie_id == movie_id)
        else {
            return Ok(None);
        };
        let Some(movie) = store.movies.iter().find(|m| m.id == movie_id)
        else {
            return Ok(None);
        };
        let episodes = store
            .episodes
            .iter()
            .filter(|(e, _)| e.movie_id == movie_id)
            .count();

        Ok(Some(read::watch_history::Entry {
            id: history.id,
            movie_id,
            episode_id: history.episode_id,
            progress_seconds: history.progress,
            last_watched_at: history.last_watched_at,
            movie: read::movie::Summary {
                id: movie.id,
                slug: movie.slug.clone(),
                title: movie.title.clone(),
                original_title: movie.original_title.clone(),
                poster: movie.poster.clone(),
                backdrop: movie.backdrop.clone(),
                year: movie.year,
                status: movie.status,
                views: movie.views,
                episodes: i64::try_from(episodes).unwrap(),
            },
        }))
    }
}
