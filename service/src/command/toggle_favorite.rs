//! [`Command`] for toggling a [`Favorite`].

use common::operations::{By, Delete, Insert, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{favorite, movie, user, Favorite, Movie},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for bookmarking a [`Movie`], or removing the bookmark if it
/// already exists.
#[derive(Clone, Copy, Debug)]
pub struct ToggleFavorite {
    /// ID of the bookmarking [`User`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// ID of the [`Movie`] to be bookmarked.
    pub movie_id: movie::Id,
}

/// Output of [`ToggleFavorite`] [`Command`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Output {
    /// [`Favorite`] has been added.
    Added,

    /// [`Favorite`] has been removed.
    Removed,
}

impl<Db> Command<ToggleFavorite> for Service<Db>
where
    Db: Database<
            Select<By<Option<Movie>, movie::Id>>,
            Ok = Option<Movie>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Favorite>, (user::Id, movie::Id)>>,
            Ok = Option<Favorite>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<favorite::Draft>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Favorite, favorite::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ToggleFavorite,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ToggleFavorite { user_id, movie_id } = cmd;

        drop(
            self.database()
                .execute(Select(By::<Option<Movie>, _>::new(movie_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::MovieNotExists(movie_id))
                .map_err(tracerr::wrap!())?,
        );

        let existing = self
            .database()
            .execute(Select(By::<Option<Favorite>, _>::new((
                user_id, movie_id,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        if let Some(favorite) = existing {
            self.database()
                .execute(Delete(By::new(favorite.id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            return Ok(Output::Removed);
        }

        self.database()
            .execute(Insert(favorite::Draft { user_id, movie_id }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Output::Added)
    }
}

/// Error of [`ToggleFavorite`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Movie`] doesn't exist.
    #[display("`Movie(id: {_0})` does not exist")]
    #[from(ignore)]
    MovieNotExists(#[error(not(source))] movie::Id),
}
