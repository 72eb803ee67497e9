//! Public catalog endpoints.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use service::{
    domain::{episode, movie, watch, Episode, Movie, Server},
    query::{self, Query as _},
    read::{self, movie::list},
};

use crate::{
    api::{self, movie::EpisodeWithServers, LookupError},
    AsError, Error, Service,
};

/// Query parameters of the [`movies()`] endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListParams {
    /// Airing status to filter by.
    status: Option<String>,

    /// Maximum number of items.
    limit: Option<String>,

    /// Number of items to skip.
    offset: Option<String>,

    /// Sorting column.
    order_by: Option<String>,
}

impl ListParams {
    /// Converts these [`ListParams`] into a [`list::Selector`].
    ///
    /// Unparsable values fall back to their defaults.
    fn selector(&self) -> list::Selector {
        let int = |v: &Option<String>| -> Option<i64> {
            v.as_deref()?.trim().parse().ok()
        };
        list::Selector {
            arguments: list::Arguments::new(int(&self.limit), int(&self.offset)),
            filter: list::Filter {
                status: self.status.as_deref().and_then(|s| s.parse().ok()),
                order_by: list::OrderBy::from_param(self.order_by.as_deref()),
            },
        }
    }
}

/// Single page of the catalog.
#[derive(Debug, Serialize)]
pub(crate) struct Page {
    /// Movies of this [`Page`].
    items: Vec<read::movie::Summary>,

    /// Total number of the matching movies.
    total: usize,

    /// Applied limit.
    limit: usize,

    /// Applied offset.
    offset: usize,
}

impl From<list::Page> for Page {
    fn from(page: list::Page) -> Self {
        Self {
            items: page.items,
            total: page.total,
            limit: page.arguments.limit,
            offset: page.arguments.offset,
        }
    }
}

/// Lists the catalog page by page.
#[tracing::instrument(skip_all)]
pub(crate) async fn movies(
    Extension(service): Extension<Service>,
    WithRejection(Query(params), _): WithRejection<Query<ListParams>, Error>,
) -> Result<Json<Page>, Error> {
    service
        .execute(query::movies::List::by(params.selector()))
        .await
        .map(|page| Json(page.into()))
        .map_err(AsError::into_error)
}

/// Returns a movie with its episodes.
#[tracing::instrument(skip_all, fields(slug = %slug))]
pub(crate) async fn movie(
    Extension(service): Extension<Service>,
    WithRejection(Path(slug), _): WithRejection<Path<String>, Error>,
) -> Result<Json<api::movie::WithEpisodes>, Error> {
    let movie = find_movie(&service, slug).await?;
    let episodes = episodes_of(&service, &movie).await?;

    Ok(Json(api::movie::WithEpisodes {
        movie: movie.into(),
        episodes: episodes.into_iter().map(Into::into).collect(),
    }))
}

/// Episodes of a movie.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Episodes {
    /// Episodes ordered by number.
    items: Vec<api::movie::Episode>,

    /// ID of the movie.
    movie_id: movie::Id,
}

/// Lists the episodes of a movie.
#[tracing::instrument(skip_all, fields(slug = %slug))]
pub(crate) async fn episodes(
    Extension(service): Extension<Service>,
    WithRejection(Path(slug), _): WithRejection<Path<String>, Error>,
) -> Result<Json<Episodes>, Error> {
    let movie = find_movie(&service, slug).await?;
    let items = episodes_of(&service, &movie).await?;

    Ok(Json(Episodes {
        items: items.into_iter().map(Into::into).collect(),
        movie_id: movie.id,
    }))
}

/// Episode along with the movie it belongs to.
#[derive(Debug, Serialize)]
pub(crate) struct EpisodeOfMovie {
    /// Movie of the episode.
    movie: api::Movie,

    /// Episode with its active servers.
    episode: EpisodeWithServers,
}

/// Returns an episode of a movie by its number.
#[tracing::instrument(skip_all, fields(slug = %slug, number = %number))]
pub(crate) async fn episode(
    Extension(service): Extension<Service>,
    WithRejection(Path((slug, number)), _): WithRejection<
        Path<(String, String)>,
        Error,
    >,
) -> Result<Json<EpisodeOfMovie>, Error> {
    let number = number.parse::<episode::Number>().map_err(|_| {
        Error::invalid_request(&"Số tập không hợp lệ")
    })?;
    let movie = find_movie(&service, slug).await?;
    let episode = service
        .execute(query::episode::ByNumber::by((movie.id, number)))
        .await
        .map_err(AsError::into_error)?
        .ok_or(LookupError::EpisodeNotExists)?;
    let servers = active_servers(&service, episode.id).await?;

    Ok(Json(EpisodeOfMovie {
        movie: movie.into(),
        episode: EpisodeWithServers::new(episode, servers),
    }))
}

/// Active servers of an episode.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Servers {
    /// Servers by ascending priority.
    items: Vec<api::movie::Server>,

    /// ID of the episode.
    episode_id: episode::Id,
}

/// Lists the active servers of an episode.
#[tracing::instrument(skip_all, fields(episode = id))]
pub(crate) async fn servers(
    Extension(service): Extension<Service>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, Error>,
) -> Result<Json<Servers>, Error> {
    let episode_id =
        episode::Id::new(id).ok_or(LookupError::EpisodeNotExists)?;
    let episode = service
        .execute(query::episode::ById::by(episode_id))
        .await
        .map_err(AsError::into_error)?
        .ok_or(LookupError::EpisodeNotExists)?;
    let items = active_servers(&service, episode.id).await?;

    Ok(Json(Servers {
        items: items.into_iter().map(Into::into).collect(),
        episode_id: episode.id,
    }))
}

/// Returns the watch page of the episode addressed by a watch path segment.
#[tracing::instrument(skip_all, fields(segment = %segment))]
pub(crate) async fn watch(
    Extension(service): Extension<Service>,
    WithRejection(Path(segment), _): WithRejection<Path<String>, Error>,
) -> Result<Json<api::movie::WatchView>, Error> {
    let locator = watch::Locator::decode(&segment)
        .ok_or(LookupError::EpisodeNotExists)?;

    service
        .execute(query::watch::ByLocator(locator))
        .await
        .map_err(AsError::into_error)?
        .map(|view| Json(view.into()))
        .ok_or_else(|| LookupError::EpisodeNotExists.into())
}

/// Looks up a [`Movie`] by the provided raw `slug`.
pub(crate) async fn find_movie(
    service: &Service,
    slug: String,
) -> Result<Movie, Error> {
    let slug =
        movie::Slug::new(slug).map_err(|_| LookupError::MovieNotExists)?;
    service
        .execute(query::movie::BySlug::by(&slug))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| LookupError::MovieNotExists.into())
}

/// Returns the episodes of the provided [`Movie`] ordered by number.
async fn episodes_of(
    service: &Service,
    movie: &Movie,
) -> Result<Vec<Episode>, Error> {
    let mut episodes = service
        .execute(query::episodes::OfMovie::by(movie.id))
        .await
        .map_err(AsError::into_error)?;
    episodes.sort_by_key(|e| e.number);
    Ok(episodes)
}

/// Returns the active servers of the provided episode by ascending priority.
async fn active_servers(
    service: &Service,
    episode: episode::Id,
) -> Result<Vec<Server>, Error> {
    let mut servers = service
        .execute(query::servers::OfEpisodes::by(
            read::server::OfEpisodes::active(episode),
        ))
        .await
        .map_err(AsError::into_error)?;
    servers.sort_by_key(|s| s.priority);
    Ok(servers)
}

#[cfg(test)]
mod spec {
    use service::{domain::movie, read::movie::list};

    use super::ListParams;

    fn params(json: serde_json::Value) -> ListParams {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn defaults_selector() {
        let selector = ListParams::default().selector();

        assert_eq!(selector.arguments, list::Arguments::default());
        assert_eq!(selector.filter.status, None);
        assert_eq!(selector.filter.order_by, list::OrderBy::UpdatedAt);
    }

    #[test]
    fn parses_selector() {
        let selector = params(serde_json::json!({
            "status": "COMPLETED",
            "limit": "10",
            "offset": "30",
            "orderBy": "createdAt",
        }))
        .selector();

        assert_eq!(selector.arguments.limit, 10);
        assert_eq!(selector.arguments.offset, 30);
        assert_eq!(selector.filter.status, Some(movie::Status::Completed));
        assert_eq!(selector.filter.order_by, list::OrderBy::CreatedAt);
    }

    #[test]
    fn ignores_garbage() {
        let selector = params(serde_json::json!({
            "status": "PAUSED",
            "limit": "many",
            "offset": "-5",
            "orderBy": "title",
        }))
        .selector();

        assert_eq!(selector.arguments, list::Arguments::default());
        assert_eq!(selector.filter.status, None);
        assert_eq!(selector.filter.order_by, list::OrderBy::UpdatedAt);
    }

    #[test]
    fn caps_limit() {
        let selector = params(serde_json::json!({"limit": "500"})).selector();

        assert_eq!(selector.arguments.limit, 50);
    }
}
