//! [`Command`] for creating a new [`Movie`].

use std::collections::HashSet;

use common::operations::{By, Commit, Insert, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{movie::Slug, Episode};
use crate::{
    domain::{episode, movie, Movie},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Movie`] along with its [`Episode`]s.
#[derive(Clone, Debug)]
pub struct CreateMovie {
    /// [`movie::Draft`] of the new [`Movie`].
    pub movie: movie::Draft,

    /// [`episode::Draft`]s of the new [`Movie`].
    pub episodes: Vec<episode::Draft>,
}

impl<Db> Command<CreateMovie> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<Movie>, &'l movie::Slug>>,
            Ok = Option<Movie>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Insert<movie::Draft>,
            Ok = Movie,
            Err = Traced<database::Error>,
        > + Database<
            Insert<(movie::Id, Vec<episode::Draft>)>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Movie;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateMovie) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateMovie { movie, episodes } = cmd;

        if let Some(n) = first_duplicate(&episodes) {
            return Err(tracerr::new!(E::DuplicateEpisode(n)));
        }

        let occupied = self
            .database()
            .execute(Select(By::new(&movie.slug)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if occupied.is_some() {
            return Err(tracerr::new!(E::SlugOccupied(movie.slug)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let movie = tx
            .execute(Insert(movie))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert((movie.id, episodes)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(movie)
    }
}

/// Returns the first [`episode::Number`] repeated among the `episodes`, if
/// any.
pub(super) fn first_duplicate(
    episodes: &[episode::Draft],
) -> Option<episode::Number> {
    let mut seen = HashSet::with_capacity(episodes.len());
    episodes.iter().map(|e| e.number).find(|n| !seen.insert(*n))
}

/// Error of [`CreateMovie`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Slug`] is occupied by another [`Movie`].
    #[display("`{_0}` slug is occupied")]
    #[from(ignore)]
    SlugOccupied(#[error(not(source))] movie::Slug),

    /// [`episode::Number`] is given to more than one [`Episode`].
    #[display("Episode `{_0}` is given more than once")]
    #[from(ignore)]
    DuplicateEpisode(#[error(not(source))] episode::Number),
}
