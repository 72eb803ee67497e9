//! [`Movie`]-related API definitions.

use serde::{Deserialize, Serialize};
use service::{
    domain::{self, episode, genre, movie, server, tag, Genre, Tag},
    read,
};

use crate::{api, define_error, Error};

/// Movie, as exposed by the API.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    /// ID of this [`Movie`].
    pub id: movie::Id,

    /// URL slug of this [`Movie`].
    pub slug: movie::Slug,

    /// Title of this [`Movie`].
    pub title: movie::Title,

    /// Title of this [`Movie`] in its original language.
    pub original_title: Option<movie::Title>,

    /// Synopsis of this [`Movie`].
    pub description: Option<movie::Description>,

    /// Poster image URL.
    pub poster: Option<movie::ImageUrl>,

    /// Backdrop image URL.
    pub backdrop: Option<movie::ImageUrl>,

    /// Release year.
    pub year: Option<movie::Year>,

    /// Airing status.
    pub status: movie::Status,

    /// Number of views.
    pub views: movie::Views,

    /// When this [`Movie`] was created.
    pub created_at: movie::CreationDateTime,

    /// When this [`Movie`] was last modified.
    pub updated_at: movie::ModificationDateTime,
}

impl From<domain::Movie> for Movie {
    fn from(movie: domain::Movie) -> Self {
        let domain::Movie {
            id,
            slug,
            title,
            original_title,
            description,
            poster,
            backdrop,
            year,
            status,
            views,
            genres: _,
            tags: _,
            created_at,
            updated_at,
        } = movie;
        Self {
            id,
            slug,
            title,
            original_title,
            description,
            poster,
            backdrop,
            year,
            status,
            views,
            created_at,
            updated_at,
        }
    }
}

/// Episode, as exposed by the API.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    /// ID of this [`Episode`].
    pub id: episode::Id,

    /// ID of the [`Movie`] this [`Episode`] belongs to.
    pub movie_id: movie::Id,

    /// Number of this [`Episode`] within its [`Movie`].
    pub episode_number: episode::Number,

    /// Name of this [`Episode`].
    pub name: Option<episode::Name>,

    /// Legacy slug of this [`Episode`].
    pub slug: Option<String>,

    /// When this [`Episode`] was created.
    pub created_at: episode::CreationDateTime,
}

impl From<domain::Episode> for Episode {
    fn from(episode: domain::Episode) -> Self {
        let domain::Episode {
            id,
            movie_id,
            number,
            name,
            slug,
            created_at,
        } = episode;
        Self {
            id,
            movie_id,
            episode_number: number,
            name,
            slug,
            created_at,
        }
    }
}

/// Streaming server, as exposed by the API.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    /// ID of this [`Server`].
    pub id: server::Id,

    /// ID of the [`Episode`] this [`Server`] streams.
    pub episode_id: episode::Id,

    /// Name of this [`Server`].
    pub name: server::Name,

    /// URL of the embeddable player.
    pub embed_url: server::EmbedUrl,

    /// Priority of this [`Server`], the lowest goes first.
    pub priority: server::Priority,

    /// Indicator whether this [`Server`] is offered to viewers.
    pub is_active: bool,

    /// When this [`Server`] was created.
    pub created_at: server::CreationDateTime,
}

impl From<domain::Server> for Server {
    fn from(server: domain::Server) -> Self {
        let domain::Server {
            id,
            episode_id,
            name,
            embed_url,
            priority,
            is_active,
            created_at,
        } = server;
        Self {
            id,
            episode_id,
            name,
            embed_url,
            priority,
            is_active,
            created_at,
        }
    }
}

/// [`Episode`] along with its [`Server`]s.
#[derive(Clone, Debug, Serialize)]
pub struct EpisodeWithServers {
    /// [`Episode`] itself.
    #[serde(flatten)]
    pub episode: Episode,

    /// [`Server`]s of the [`Episode`].
    pub servers: Vec<Server>,
}

impl EpisodeWithServers {
    /// Pairs the provided [`Episode`] with its [`Server`]s.
    pub fn new(
        episode: domain::Episode,
        servers: impl IntoIterator<Item = domain::Server>,
    ) -> Self {
        Self {
            episode: episode.into(),
            servers: servers.into_iter().map(Into::into).collect(),
        }
    }
}

/// [`Movie`] along with its [`Episode`]s.
#[derive(Clone, Debug, Serialize)]
pub struct WithEpisodes {
    /// [`Movie`] itself.
    #[serde(flatten)]
    pub movie: Movie,

    /// [`Episode`]s of the [`Movie`], ordered by number.
    pub episodes: Vec<Episode>,
}

/// Everything known about a [`Movie`].
#[derive(Clone, Debug, Serialize)]
pub struct Detail {
    /// [`Movie`] itself.
    #[serde(flatten)]
    pub movie: Movie,

    /// Genres of the [`Movie`].
    pub genres: Vec<Genre>,

    /// Tags of the [`Movie`].
    pub tags: Vec<Tag>,

    /// [`Episode`]s of the [`Movie`], ordered by number.
    pub episodes: Vec<EpisodeWithServers>,
}

impl From<read::movie::Detail> for Detail {
    fn from(detail: read::movie::Detail) -> Self {
        let read::movie::Detail {
            movie,
            genres,
            tags,
            episodes,
        } = detail;
        Self {
            movie: movie.into(),
            genres,
            tags,
            episodes: episodes
                .into_iter()
                .map(|(e, s)| EpisodeWithServers::new(e, s))
                .collect(),
        }
    }
}

/// Watch page of an [`Episode`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchView {
    /// [`Movie`] being watched.
    pub movie: Movie,

    /// [`Episode`] being watched.
    pub episode: Episode,

    /// [`Server`] to start playback with.
    pub primary_server: Option<Server>,

    /// Other active [`Server`]s of the [`Episode`].
    pub other_servers: Vec<Server>,

    /// All [`Episode`]s of the [`Movie`].
    pub episodes: Vec<Episode>,

    /// Watch page of the previous [`Episode`], if any.
    pub prev_href: Option<String>,

    /// Watch page of the next [`Episode`], if any.
    pub next_href: Option<String>,
}

impl From<read::watch::View> for WatchView {
    fn from(view: read::watch::View) -> Self {
        let read::watch::View {
            movie,
            episode,
            primary,
            alternatives,
            episodes,
            prev_href,
            next_href,
        } = view;
        Self {
            movie: movie.into(),
            episode: episode.into(),
            primary_server: primary.map(Into::into),
            other_servers: alternatives.into_iter().map(Into::into).collect(),
            episodes: episodes.into_iter().map(Into::into).collect(),
            prev_href,
            next_href,
        }
    }
}

/// Submitted [`Movie`] form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    /// Title.
    pub title: String,

    /// Requested slug, derived from the `title` if absent.
    #[serde(default)]
    pub slug: Option<String>,

    /// Title in the original language.
    #[serde(default)]
    pub original_title: Option<String>,

    /// Synopsis.
    #[serde(default)]
    pub description: Option<String>,

    /// Poster image URL.
    #[serde(default)]
    pub poster: Option<String>,

    /// Backdrop image URL.
    #[serde(default)]
    pub backdrop: Option<String>,

    /// Release year.
    #[serde(default)]
    pub year: Option<i64>,

    /// Airing status.
    #[serde(default)]
    pub status: movie::Status,

    /// IDs of the genres.
    #[serde(default)]
    pub genre_ids: Vec<i64>,

    /// IDs of the tags.
    #[serde(default)]
    pub tag_ids: Vec<i64>,

    /// Episodes, replacing the existing ones.
    #[serde(default)]
    pub episodes: Vec<EpisodeForm>,
}

/// Submitted [`Episode`] form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeForm {
    /// Number of the episode.
    pub episode_number: i64,

    /// Name of the episode, `Tập {n}` if absent.
    #[serde(default)]
    pub name: Option<String>,

    /// Streaming servers of the episode.
    #[serde(default)]
    pub servers: Vec<ServerForm>,
}

/// Submitted [`Server`] form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerForm {
    /// Name of the server.
    pub name: String,

    /// URL of the embeddable player.
    pub embed_url: String,

    /// Priority, the position in the list if absent.
    #[serde(default)]
    pub priority: Option<i64>,
}

impl Form {
    /// Validates this [`Form`].
    ///
    /// The `fallback` slug is used when neither a slug is requested nor the
    /// title yields one.
    ///
    /// # Errors
    ///
    /// With `INVALID_REQUEST` or `RESERVED_SLUG` if any field is malformed.
    pub fn validate(
        self,
        fallback: impl FnOnce() -> movie::Slug,
    ) -> Result<(movie::Draft, Vec<episode::Draft>), Error> {
        let Self {
            title,
            slug,
            original_title,
            description,
            poster,
            backdrop,
            year,
            status,
            genre_ids,
            tag_ids,
            episodes,
        } = self;

        let title = api::valid(movie::Title::new(title), "title")?;
        let slug = api::non_blank(slug)
            .map(|s| movie::Slug::new(s.trim()))
            .transpose()
            .map_err(slug_error)?;
        let movie = movie::Draft {
            slug: movie::Slug::pick(slug, &title, fallback),
            original_title: api::non_blank(original_title)
                .map(|t| api::valid(movie::Title::new(t), "originalTitle"))
                .transpose()?,
            description: api::non_blank(description)
                .and_then(movie::Description::new),
            poster: api::non_blank(poster)
                .map(|u| api::valid(movie::ImageUrl::new(u.trim()), "poster"))
                .transpose()?,
            backdrop: api::non_blank(backdrop)
                .map(|u| api::valid(movie::ImageUrl::new(u.trim()), "backdrop"))
                .transpose()?,
            year: year
                .map(|y| api::valid(movie::Year::new(y), "year"))
                .transpose()?,
            status,
            genres: genre_ids
                .into_iter()
                .map(|id| api::valid(genre::Id::new(id), "genreIds"))
                .collect::<Result<_, _>>()?,
            tags: tag_ids
                .into_iter()
                .map(|id| api::valid(tag::Id::new(id), "tagIds"))
                .collect::<Result<_, _>>()?,
            title,
        };
        let episodes = episodes
            .into_iter()
            .map(EpisodeForm::validate)
            .collect::<Result<_, _>>()?;

        Ok((movie, episodes))
    }
}

impl EpisodeForm {
    /// Validates this [`EpisodeForm`].
    fn validate(self) -> Result<episode::Draft, Error> {
        let Self {
            episode_number,
            name,
            servers,
        } = self;

        let number =
            api::valid(episode::Number::new(episode_number), "episodeNumber")?;
        Ok(episode::Draft {
            number,
            name: api::non_blank(name)
                .and_then(episode::Name::new)
                .unwrap_or_else(|| episode::Name::fallback(number)),
            servers: servers
                .into_iter()
                .enumerate()
                .map(|(i, s)| s.validate(i))
                .collect::<Result<_, _>>()?,
        })
    }
}

impl ServerForm {
    /// Validates this [`ServerForm`] standing at the provided `index`.
    fn validate(self, index: usize) -> Result<server::Draft, Error> {
        let Self {
            name,
            embed_url,
            priority,
        } = self;

        Ok(server::Draft {
            name: api::valid(server::Name::new(name), "servers.name")?,
            embed_url: api::valid(
                server::EmbedUrl::new(embed_url),
                "servers.embedUrl",
            )?,
            priority: priority
                .map(|p| api::valid(server::Priority::new(p), "servers.priority"))
                .transpose()?
                .unwrap_or_else(|| server::Priority::at(index)),
        })
    }
}

/// Converts the provided [`movie::SlugError`] into an [`Error`].
fn slug_error(e: movie::SlugError) -> Error {
    define_error! {
        enum SlugError {
            #[code = "RESERVED_SLUG"]
            #[status = BAD_REQUEST]
            #[message = "Slug không được kết thúc bằng `-tap-<số>`"]
            Reserved,
        }
    }

    match e {
        movie::SlugError::Malformed => Error::invalid_request(&format!(
            "Dữ liệu không hợp lệ: slug ({e})",
        )),
        movie::SlugError::Reserved => SlugError::Reserved.into(),
    }
}

#[cfg(test)]
mod spec {
    use service::domain::{episode, movie, server};

    use super::Form;

    fn form(json: serde_json::Value) -> Form {
        serde_json::from_value(json).unwrap()
    }

    fn fallback() -> movie::Slug {
        movie::Slug::new("phim-fallback").unwrap()
    }

    #[test]
    fn derives_slug_and_defaults() {
        let (movie, episodes) = form(serde_json::json!({
            "title": "Đội Đặc Nhiệm",
            "poster": "",
            "episodes": [
                {"episodeNumber": 1, "servers": [
                    {"name": "A", "embedUrl": "https://a/1"},
                    {"name": "B", "embedUrl": "https://b/1"},
                ]},
                {"episodeNumber": 2, "name": "  "},
            ],
        }))
        .validate(fallback)
        .unwrap();

        assert_eq!(movie.slug.to_string(), "doi-dac-nhiem");
        assert_eq!(movie.status, movie::Status::Ongoing);
        assert!(movie.poster.is_none());
        assert_eq!(episodes[0].name.to_string(), "Tập 1");
        assert_eq!(episodes[1].name.to_string(), "Tập 2");
        assert_eq!(episodes[0].servers[0].priority, server::Priority::at(0));
        assert_eq!(episodes[0].servers[1].priority, server::Priority::at(1));
        assert_eq!(episodes[0].number, episode::Number::FIRST);
    }

    #[test]
    fn falls_back_on_unusable_title() {
        let (movie, _) = form(serde_json::json!({"title": "!!!"}))
            .validate(fallback)
            .unwrap();

        assert_eq!(movie.slug.to_string(), "phim-fallback");
    }

    #[test]
    fn rejects_reserved_slug() {
        let err = form(serde_json::json!({
            "title": "Phim",
            "slug": "phim-tap-3",
        }))
        .validate(fallback)
        .unwrap_err();

        assert_eq!(err.code, "RESERVED_SLUG");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rejects_malformed_fields() {
        for json in [
            serde_json::json!({"title": " "}),
            serde_json::json!({"title": "A", "slug": "Bad Slug"}),
            serde_json::json!({"title": "A", "poster": "ftp://x"}),
            serde_json::json!({"title": "A", "year": 1800}),
            serde_json::json!({"title": "A", "genreIds": [0]}),
            serde_json::json!({"title": "A", "episodes": [
                {"episodeNumber": 0},
            ]}),
            serde_json::json!({"title": "A", "episodes": [
                {"episodeNumber": 1, "servers": [
                    {"name": "A", "embedUrl": " "},
                ]},
            ]}),
        ] {
            let err = form(json).validate(fallback).unwrap_err();

            assert_eq!(err.code, "INVALID_REQUEST");
        }
    }
}
