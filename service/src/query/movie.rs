//! [`Query`] collection related to a single [`Movie`].

use common::operations::{By, Select};
use derive_more::From;
use tracerr::Traced;

use crate::{
    domain::{movie, Episode, Genre, Movie, Server, Tag},
    infra::{database, Database},
    read::{self, server::OfEpisodes},
    Service,
};

use super::{DatabaseQuery, Query};

/// Queries a [`Movie`] by its [`movie::Id`].
pub type ById = DatabaseQuery<By<Option<Movie>, movie::Id>>;

/// Queries a [`Movie`] by its [`movie::Slug`].
pub type BySlug<'s> = DatabaseQuery<By<Option<Movie>, &'s movie::Slug>>;

/// Queries the [`read::movie::Detail`] of a [`Movie`] by its
/// [`movie::Slug`].
#[derive(Clone, Debug, From)]
pub struct Detail(pub movie::Slug);

impl<Db> Query<Detail> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<Movie>, &'l movie::Slug>>,
            Ok = Option<Movie>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Genre>, ()>>,
            Ok = Vec<Genre>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Tag>, ()>>,
            Ok = Vec<Tag>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Episode>, movie::Id>>,
            Ok = Vec<Episode>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Server>, OfEpisodes>>,
            Ok = Vec<Server>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Option<read::movie::Detail>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Detail(slug): Detail,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(movie) = self
            .database()
            .execute(Select(By::new(&slug)))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let genres = self
            .database()
            .execute(Select(By::<Vec<Genre>, _>::new(())))
            .await
            .map_err(tracerr::wrap!())?;
        let tags = self
            .database()
            .execute(Select(By::<Vec<Tag>, _>::new(())))
            .await
            .map_err(tracerr::wrap!())?;
        let episodes = self
            .database()
            .execute(Select(By::new(movie.id)))
            .await
            .map_err(tracerr::wrap!())?;
        let servers = self
            .database()
            .execute(Select(By::new(OfEpisodes {
                episodes: episodes.iter().map(|e| e.id).collect(),
                active_only: false,
            })))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Some(read::movie::Detail::assemble(
            movie, genres, tags, episodes, servers,
        )))
    }
}
