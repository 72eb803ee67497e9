//! [`Movie`]-related read definitions.

use serde::Serialize;

use crate::domain::{movie, Episode, Genre, Movie, Server, Tag};

/// Short card of a [`Movie`] shown in listings.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// ID of the [`Movie`].
    pub id: movie::Id,

    /// Slug of the [`Movie`].
    pub slug: movie::Slug,

    /// Title of the [`Movie`].
    pub title: movie::Title,

    /// Original title of the [`Movie`].
    pub original_title: Option<movie::Title>,

    /// Poster of the [`Movie`].
    pub poster: Option<movie::ImageUrl>,

    /// Backdrop of the [`Movie`].
    pub backdrop: Option<movie::ImageUrl>,

    /// Release year of the [`Movie`].
    pub year: Option<movie::Year>,

    /// Airing status of the [`Movie`].
    pub status: movie::Status,

    /// Views count of the [`Movie`].
    pub views: movie::Views,

    /// Number of episodes the [`Movie`] has.
    pub episodes: i64,
}

pub mod list {
    //! [`Movie`] list definitions.

    use common::define_pagination;

    use crate::domain::movie;
    #[cfg(doc)]
    use crate::domain::Movie;

    define_pagination!(super::Summary, Filter);

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// [`movie::Status`] to narrow the list down to, if any.
        pub status: Option<movie::Status>,

        /// Ordering of the list.
        pub order_by: OrderBy,
    }

    /// Ordering of a [`Movie`] list, newest first.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub enum OrderBy {
        /// By creation time.
        CreatedAt,

        /// By last modification time.
        #[default]
        UpdatedAt,
    }

    impl OrderBy {
        /// Parses an [`OrderBy`] out of its query parameter value.
        ///
        /// Anything unknown falls back to [`OrderBy::UpdatedAt`].
        #[must_use]
        pub fn from_param(param: Option<&str>) -> Self {
            match param {
                Some("createdAt") => Self::CreatedAt,
                _ => Self::UpdatedAt,
            }
        }
    }
}

/// Complete contents of a [`Movie`], as edited in the dashboard.
#[derive(Clone, Debug)]
pub struct Detail {
    /// The [`Movie`] itself.
    pub movie: Movie,

    /// [`Genre`]s of the [`Movie`], in their display order.
    pub genres: Vec<Genre>,

    /// [`Tag`]s of the [`Movie`], in their display order.
    pub tags: Vec<Tag>,

    /// [`Episode`]s of the [`Movie`] by their number, each with all its
    /// [`Server`]s by priority.
    pub episodes: Vec<(Episode, Vec<Server>)>,
}

impl Detail {
    /// Assembles a [`Detail`] of the provided [`Movie`] out of the whole
    /// catalog of [`Genre`]s and [`Tag`]s and the [`Server`]s of its
    /// `episodes`.
    #[must_use]
    pub fn assemble(
        movie: Movie,
        genres: Vec<Genre>,
        tags: Vec<Tag>,
        mut episodes: Vec<Episode>,
        servers: Vec<Server>,
    ) -> Self {
        let genres = genres
            .into_iter()
            .filter(|g| movie.genres.contains(&g.id))
            .collect();
        let tags = tags
            .into_iter()
            .filter(|t| movie.tags.contains(&t.id))
            .collect();

        episodes.sort_by_key(|e| e.number);
        let episodes = episodes
            .into_iter()
            .map(|e| {
                let servers = servers
                    .iter()
                    .filter(|s| s.episode_id == e.id)
                    .cloned()
                    .collect();
                (e, servers)
            })
            .collect();

        Self {
            movie,
            genres,
            tags,
            episodes,
        }
    }
}
