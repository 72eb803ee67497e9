//! [`Query`] of a watch page.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{movie, watch, Episode, Movie, Server},
    infra::{database, Database},
    read::{self, server::OfEpisodes},
    Service,
};

use super::Query;

/// Queries the [`read::watch::View`] of the [`watch::Locator`]ed episode.
///
/// Resolves to [`None`] if there is no such [`Movie`] or episode.
#[derive(Clone, Debug)]
pub struct ByLocator(pub watch::Locator);

impl<Db> Query<ByLocator> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<Movie>, &'l movie::Slug>>,
            Ok = Option<Movie>,
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
    type Ok = Option<read::watch::View>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        ByLocator(locator): ByLocator,
    ) -> Result<Self::Ok, Self::Err> {
        let Ok(slug) = movie::Slug::new(locator.movie_slug()) else {
            return Ok(None);
        };

        let Some(movie) = self
            .database()
            .execute(Select(By::new(&slug)))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let episodes = self
            .database()
            .execute(Select(By::new(movie.id)))
            .await
            .map_err(tracerr::wrap!())?;
        let Some(current) =
            episodes.iter().find(|e| e.number == locator.episode())
        else {
            return Ok(None);
        };

        let servers = self
            .database()
            .execute(Select(By::new(OfEpisodes::active(current.id))))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(read::watch::View::assemble(&locator, movie, episodes, servers))
    }
}
