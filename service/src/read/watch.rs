//! Watch page read definitions.

use crate::domain::{watch, Episode, Movie, Server};

/// Everything a watch page shows for a single [`Episode`].
#[derive(Clone, Debug)]
pub struct View {
    /// [`Movie`] being watched.
    pub movie: Movie,

    /// Current [`Episode`].
    pub episode: Episode,

    /// [`Server`] played by default, if the [`Episode`] has any active one.
    pub primary: Option<Server>,

    /// Other active [`Server`]s of the current [`Episode`].
    pub alternatives: Vec<Server>,

    /// All the [`Episode`]s of the [`Movie`], by their number.
    pub episodes: Vec<Episode>,

    /// Watch page path of the preceding [`Episode`], if it exists.
    pub prev_href: Option<String>,

    /// Watch page path of the following [`Episode`], if it exists.
    pub next_href: Option<String>,
}

impl View {
    /// Assembles a [`View`] of the [`Episode`] the `locator` points to.
    ///
    /// The `servers` are expected to be the active ones of that [`Episode`],
    /// in their priority order, the first one becoming the primary.
    ///
    /// [`None`] is returned if the [`Movie`] has no such [`Episode`].
    #[must_use]
    pub fn assemble(
        locator: &watch::Locator,
        movie: Movie,
        mut episodes: Vec<Episode>,
        servers: Vec<Server>,
    ) -> Option<Self> {
        episodes.sort_by_key(|e| e.number);
        let episode = episodes
            .iter()
            .find(|e| e.number == locator.episode())
            .cloned()?;

        let href_of = |n: Option<_>| {
            let n = n?;
            episodes
                .iter()
                .any(|e| e.number == n)
                .then(|| watch::Locator::new(movie.slug.to_string(), n))
                .flatten()
                .map(|l| l.href())
        };
        let prev_href = href_of(episode.number.prev());
        let next_href = href_of(episode.number.next());

        let mut servers = servers
            .into_iter()
            .filter(|s| s.episode_id == episode.id && s.is_active);
        let primary = servers.next();
        let alternatives = servers.collect();

        Some(Self {
            movie,
            episode,
            primary,
            alternatives,
            episodes,
            prev_href,
            next_href,
        })
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::domain::{
        episode, movie, server, watch::Locator, Episode, Movie, Server,
    };

    use super::View;

    fn movie() -> Movie {
        Movie {
            id: movie::Id::new(1).unwrap(),
            slug: movie::Slug::new("phim-drama1").unwrap(),
            title: movie::Title::new("Phim Drama 1").unwrap(),
            original_title: None,
            description: None,
            poster: None,
            backdrop: None,
            year: None,
            status: movie::Status::Ongoing,
            views: movie::Views::default(),
            genres: vec![],
            tags: vec![],
            created_at: DateTime::now().coerce(),
            updated_at: DateTime::now().coerce(),
        }
    }

    fn episode(id: i64, number: i64) -> Episode {
        Episode {
            id: episode::Id::new(id).unwrap(),
            movie_id: movie::Id::new(1).unwrap(),
            number: episode::Number::new(number).unwrap(),
            name: None,
            slug: None,
            created_at: DateTime::now().coerce(),
        }
    }

    fn server(id: i32, episode: i64, active: bool) -> Server {
        Server {
            id: id.into(),
            episode_id: episode::Id::new(episode).unwrap(),
            name: server::Name::new(format!("S{id}")).unwrap(),
            embed_url: server::EmbedUrl::new("https://e.mbed/x").unwrap(),
            priority: server::Priority::at(0),
            is_active: active,
            created_at: DateTime::now().coerce(),
        }
    }

    fn at(n: i64) -> Locator {
        Locator::new("phim-drama1", episode::Number::new(n).unwrap()).unwrap()
    }

    #[test]
    fn picks_first_active_server_as_primary() {
        let view = View::assemble(
            &at(2),
            movie(),
            vec![episode(10, 1), episode(20, 2), episode(30, 3)],
            vec![server(1, 20, false), server(2, 20, true), server(3, 20, true)],
        )
        .unwrap();

        assert_eq!(view.episode.id, episode::Id::new(20).unwrap());
        assert_eq!(view.primary.map(|s| s.id), Some(2.into()));
        assert_eq!(
            view.alternatives.iter().map(|s| s.id).collect::<Vec<_>>(),
            [3.into()],
        );
    }

    #[test]
    fn links_neighbour_episodes() {
        let view = View::assemble(
            &at(2),
            movie(),
            vec![episode(30, 3), episode(10, 1), episode(20, 2)],
            vec![],
        )
        .unwrap();

        assert_eq!(view.prev_href.as_deref(), Some("/watch/phim-drama1-tap-1"));
        assert_eq!(view.next_href.as_deref(), Some("/watch/phim-drama1-tap-3"));
        assert_eq!(
            view.episodes.iter().map(|e| e.number).collect::<Vec<_>>(),
            [1, 2, 3].map(|n| episode::Number::new(n).unwrap()),
        );
    }

    #[test]
    fn skips_missing_neighbours() {
        let view =
            View::assemble(&at(1), movie(), vec![episode(10, 1)], vec![])
                .unwrap();

        assert!(view.primary.is_none());
        assert!(view.prev_href.is_none());
        assert!(view.next_href.is_none());
    }

    #[test]
    fn rejects_unknown_episode() {
        assert!(
            View::assemble(&at(5), movie(), vec![episode(10, 1)], vec![])
                .is_none()
        );
    }
}
