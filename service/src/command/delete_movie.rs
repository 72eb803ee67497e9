//! [`Command`] for deleting a [`Movie`].

use common::operations::{By, Delete, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::movie::Slug;
use crate::{
    domain::{movie, Movie},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Movie`] along with everything attached to it.
#[derive(Clone, Debug, From)]
pub struct DeleteMovie {
    /// [`Slug`] of the [`Movie`] to be deleted.
    pub slug: movie::Slug,
}

impl<Db> Command<DeleteMovie> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<Movie>, &'l movie::Slug>>,
            Ok = Option<Movie>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Movie, movie::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
{
    type Ok = Movie;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteMovie) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteMovie { slug } = cmd;

        let movie = self
            .database()
            .execute(Select(By::<Option<Movie>, _>::new(&slug)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::MovieNotExists(slug.clone()))
            .map_err(tracerr::wrap!())?;

        self.database()
            .execute(Delete(By::new(movie.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(movie)
    }
}

/// Error of [`DeleteMovie`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Movie`] doesn't exist.
    #[display("`Movie(slug: {_0})` does not exist")]
    #[from(ignore)]
    MovieNotExists(#[error(not(source))] movie::Slug),
}
