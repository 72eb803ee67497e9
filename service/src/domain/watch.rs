//! [`Locator`] of a watch page.
//!
//! A watch page URL carries both the [`Movie`] slug and the [`Episode`] number
//! in a single path segment: `/watch/{movie_slug}-tap-{episode_number}`.
//!
//! [`Episode`]: crate::domain::Episode
//! [`Movie`]: crate::domain::Movie

use std::{fmt, sync::LazyLock};

use regex::Regex;

use crate::domain::episode;

/// Path prefix of watch pages.
pub const PATH_PREFIX: &str = "/watch/";

/// Separator between the [`Movie`] slug and the [`Episode`] number.
///
/// [`Episode`]: crate::domain::Episode
/// [`Movie`]: crate::domain::Movie
const SEPARATOR: &str = "-tap-";

/// Position of an [`Episode`] to be watched.
///
/// [`Episode`]: crate::domain::Episode
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Locator {
    /// Slug of the [`Movie`].
    ///
    /// [`Movie`]: crate::domain::Movie
    movie_slug: String,

    /// Number of the [`Episode`].
    ///
    /// [`Episode`]: crate::domain::Episode
    episode: episode::Number,
}

impl Locator {
    /// Creates a new [`Locator`].
    ///
    /// [`None`] is returned if the `movie_slug` is empty.
    #[must_use]
    pub fn new(
        movie_slug: impl Into<String>,
        episode: episode::Number,
    ) -> Option<Self> {
        let movie_slug = movie_slug.into();
        (!movie_slug.is_empty()).then_some(Self {
            movie_slug,
            episode,
        })
    }

    /// Decodes a [`Locator`] out of the provided watch path `segment`.
    ///
    /// The episode suffix is matched at the very end of the `segment`, so a
    /// slug containing the separator itself still decodes. [`None`] is
    /// returned if there is no suffix, the number is not a positive [`i32`],
    /// or nothing is left of the slug.
    #[must_use]
    pub fn decode(segment: &str) -> Option<Self> {
        /// Regular expression matching the episode suffix.
        static SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"-tap-([0-9]+)$").expect("valid regex")
        });

        let caps = SUFFIX.captures(segment)?;
        let whole = caps.get(0)?;
        let episode = caps.get(1)?.as_str().parse().ok()?;
        Self::new(&segment[..whole.start()], episode)
    }

    /// Encodes this [`Locator`] into a watch path segment.
    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Returns the absolute path of the watch page of this [`Locator`].
    #[must_use]
    pub fn href(&self) -> String {
        format!("{PATH_PREFIX}{self}")
    }

    /// Returns the slug of the [`Movie`] to be watched.
    ///
    /// [`Movie`]: crate::domain::Movie
    #[must_use]
    pub fn movie_slug(&self) -> &str {
        &self.movie_slug
    }

    /// Returns the number of the [`Episode`] to be watched.
    ///
    /// [`Episode`]: crate::domain::Episode
    #[must_use]
    pub fn episode(&self) -> episode::Number {
        self.episode
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.movie_slug, self.episode)
    }
}

#[cfg(test)]
mod spec {
    use super::{episode::Number, Locator};

    fn n(v: i64) -> Number {
        Number::new(v).unwrap()
    }

    #[test]
    fn encodes() {
        let l = Locator::new("phim-drama1", n(2)).unwrap();

        assert_eq!(l.encode(), "phim-drama1-tap-2");
        assert_eq!(l.href(), "/watch/phim-drama1-tap-2");
    }

    #[test]
    fn rejects_empty_slug() {
        assert!(Locator::new("", n(1)).is_none());
    }

    #[test]
    fn decodes() {
        let l = Locator::decode("phim-drama1-tap-1").unwrap();

        assert_eq!(l.movie_slug(), "phim-drama1");
        assert_eq!(l.episode(), n(1));
    }

    #[test]
    fn decodes_last_suffix() {
        let l = Locator::decode("a-tap-1-tap-2").unwrap();

        assert_eq!(l.movie_slug(), "a-tap-1");
        assert_eq!(l.episode(), n(2));
    }

    #[test]
    fn decodes_leading_zeros() {
        assert_eq!(Locator::decode("phim-tap-007").unwrap().episode(), n(7));
    }

    #[test]
    fn rejects_missing_suffix() {
        assert!(Locator::decode("no-suffix-here").is_none());
        assert!(Locator::decode("phim-tap-").is_none());
        assert!(Locator::decode("phim-tap-2x").is_none());
        assert!(Locator::decode("").is_none());
    }

    #[test]
    fn rejects_zero() {
        assert!(Locator::decode("phim-tap-0").is_none());
    }

    #[test]
    fn rejects_empty_prefix() {
        assert!(Locator::decode("-tap-3").is_none());
    }

    #[test]
    fn rejects_overflow() {
        assert!(Locator::decode("phim-tap-99999999999999999999").is_none());
    }

    #[test]
    fn rejects_non_ascii_digits() {
        assert!(Locator::decode("phim-tap-٣").is_none());
    }

    #[test]
    fn round_trips() {
        for slug in ["phim-drama1", "a", "a-tap-1", "tap", "x-tap-y", "Phim"] {
            for num in [1, 2, 10, 99, 2_147_483_647] {
                let l = Locator::new(slug, n(num)).unwrap();

                assert_eq!(Locator::decode(&l.encode()), Some(l));
            }
        }
    }
}
