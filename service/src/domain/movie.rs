//! [`Movie`] definitions.

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization as _};

use crate::domain::{genre, tag, watch};

/// Show in the catalog, made of episodes.
#[derive(Clone, Debug)]
pub struct Movie {
    /// ID of this [`Movie`].
    pub id: Id,

    /// Unique [`Slug`] of this [`Movie`].
    pub slug: Slug,

    /// [`Title`] of this [`Movie`].
    pub title: Title,

    /// [`Title`] of this [`Movie`] in its original language, if any.
    pub original_title: Option<Title>,

    /// [`Description`] of this [`Movie`], if any.
    pub description: Option<Description>,

    /// Poster [`ImageUrl`] of this [`Movie`], if any.
    pub poster: Option<ImageUrl>,

    /// Backdrop [`ImageUrl`] of this [`Movie`], if any.
    pub backdrop: Option<ImageUrl>,

    /// Release [`Year`] of this [`Movie`], if known.
    pub year: Option<Year>,

    /// Airing [`Status`] of this [`Movie`].
    pub status: Status,

    /// [`Views`] count of this [`Movie`].
    pub views: Views,

    /// [`genre::Id`]s this [`Movie`] is classified under.
    pub genres: Vec<genre::Id>,

    /// [`tag::Id`]s this [`Movie`] is labeled with.
    pub tags: Vec<tag::Id>,

    /// [`DateTime`] when this [`Movie`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Movie`] was last modified.
    pub updated_at: ModificationDateTime,
}

/// Editable contents of a [`Movie`], as entered in the dashboard.
#[derive(Clone, Debug)]
pub struct Draft {
    /// [`Slug`] of the [`Movie`].
    pub slug: Slug,

    /// [`Title`] of the [`Movie`].
    pub title: Title,

    /// Original [`Title`] of the [`Movie`].
    pub original_title: Option<Title>,

    /// [`Description`] of the [`Movie`].
    pub description: Option<Description>,

    /// Poster [`ImageUrl`] of the [`Movie`].
    pub poster: Option<ImageUrl>,

    /// Backdrop [`ImageUrl`] of the [`Movie`].
    pub backdrop: Option<ImageUrl>,

    /// Release [`Year`] of the [`Movie`].
    pub year: Option<Year>,

    /// Airing [`Status`] of the [`Movie`].
    pub status: Status,

    /// [`genre::Id`]s of the [`Movie`].
    pub genres: Vec<genre::Id>,

    /// [`tag::Id`]s of the [`Movie`].
    pub tags: Vec<tag::Id>,
}

impl Movie {
    /// Overwrites the editable contents of this [`Movie`] with the provided
    /// [`Draft`].
    pub fn apply(&mut self, draft: Draft) {
        let Draft {
            slug,
            title,
            original_title,
            description,
            poster,
            backdrop,
            year,
            status,
            genres,
            tags,
        } = draft;

        self.slug = slug;
        self.title = title;
        self.original_title = original_title;
        self.description = description;
        self.poster = poster;
        self.backdrop = backdrop;
        self.year = year;
        self.status = status;
        self.genres = genres;
        self.tags = tags;
    }
}

/// ID of a [`Movie`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i32);

impl Id {
    /// Creates a new [`Id`] if the given `id` is positive.
    #[must_use]
    pub fn new(id: i64) -> Option<Self> {
        i32::try_from(id).ok().filter(|id| *id > 0).map(Self)
    }
}

/// URL-safe unique identifier of a [`Movie`].
///
/// Consists of lowercase ASCII letters, digits and single hyphens. A [`Slug`]
/// never ends with the episode suffix of a [`watch::Locator`], so every watch
/// segment decodes back unambiguously.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Slug(String);

impl Slug {
    /// Creates a new [`Slug`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `slug` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// Creates a new [`Slug`] if the given `slug` is valid.
    ///
    /// # Errors
    ///
    /// See [`SlugError`] variants.
    pub fn new(slug: impl Into<String>) -> Result<Self, SlugError> {
        /// Regular expression checking [`Slug`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid regex")
        });

        let slug = slug.into();
        if slug.len() > 255 || !REGEX.is_match(&slug) {
            return Err(SlugError::Malformed);
        }
        if watch::Locator::decode(&slug).is_some() {
            return Err(SlugError::Reserved);
        }
        Ok(Self(slug))
    }

    /// Derives a [`Slug`] out of the provided [`Movie`] `title`.
    ///
    /// Diacritics are stripped (`đ` becomes `d`), whitespace runs become a
    /// single hyphen and anything outside `[a-z0-9-]` is dropped.
    ///
    /// [`None`] is returned if nothing usable is left.
    #[must_use]
    pub fn from_title(title: &str) -> Option<Self> {
        let mut slug = String::with_capacity(title.len());
        for c in title.trim().to_lowercase().nfd() {
            match c {
                c if is_combining_mark(c) => {}
                'đ' => slug.push('d'),
                c if c.is_whitespace() || c == '-' => {
                    if !slug.is_empty() && !slug.ends_with('-') {
                        slug.push('-');
                    }
                }
                'a'..='z' | '0'..='9' => slug.push(c),
                _ => {}
            }
        }
        while slug.ends_with('-') {
            _ = slug.pop();
        }

        Self::new(slug).ok()
    }

    /// Picks the [`Slug`] of a [`Movie`] being saved: the `requested` one if
    /// any, otherwise the one derived [`from_title()`], otherwise the
    /// `fallback`.
    ///
    /// [`from_title()`]: Slug::from_title
    #[must_use]
    pub fn pick(
        requested: Option<Self>,
        title: &Title,
        fallback: impl FnOnce() -> Self,
    ) -> Self {
        requested
            .or_else(|| Self::from_title(title.as_ref()))
            .unwrap_or_else(fallback)
    }

    /// Returns the [`Slug`] of a [`Movie`] created at the given moment, for
    /// titles no [`Slug`] can be derived from.
    #[must_use]
    pub fn timestamped<Of: ?Sized>(at: DateTimeOf<Of>) -> Self {
        Self(format!("phim-{}", at.unix_timestamp_millis()))
    }
}

impl FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Error of creating a [`Slug`].
#[derive(Clone, Copy, Debug, Display, derive_more::Error, Eq, PartialEq)]
pub enum SlugError {
    /// [`Slug`] contains characters outside `[a-z0-9-]`, or is empty.
    #[display("malformed `Slug`")]
    Malformed,

    /// [`Slug`] ends with the episode suffix of a [`watch::Locator`].
    #[display("`Slug` ends with a reserved episode suffix")]
    Reserved,
}

/// Title of a [`Movie`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`] out of the given `title`, trimming it.
    ///
    /// [`None`] is returned if the `title` is blank or too long.
    #[must_use]
    pub fn new(title: impl AsRef<str>) -> Option<Self> {
        let title = title.as_ref().trim();
        (!title.is_empty() && title.chars().count() <= 255)
            .then(|| Self(title.to_owned()))
    }
}

/// Description of a [`Movie`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`] out of the given `text`, trimming it.
    ///
    /// [`None`] is returned if the `text` is blank.
    #[must_use]
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let text = text.as_ref().trim();
        (!text.is_empty()).then(|| Self(text.to_owned()))
    }
}

/// Absolute `http(s)` URL of a [`Movie`] image.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct ImageUrl(String);

impl ImageUrl {
    /// Creates a new [`ImageUrl`] if the given `url` is valid.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        /// Regular expression checking [`ImageUrl`] scheme.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^https?://\S+$").expect("valid regex")
        });

        let url = url.into();
        REGEX.is_match(&url).then_some(Self(url))
    }
}

/// Release year of a [`Movie`].
#[derive(
    Clone, Copy, Debug, Display, Eq, Into, Ord, PartialEq, PartialOrd, Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Year(i32);

impl Year {
    /// Earliest allowed [`Year`].
    pub const MIN: i32 = 1900;

    /// Latest allowed [`Year`].
    pub const MAX: i32 = 2100;

    /// Creates a new [`Year`] if the given `year` is in range.
    #[must_use]
    pub fn new(year: i64) -> Option<Self> {
        i32::try_from(year)
            .ok()
            .filter(|y| (Self::MIN..=Self::MAX).contains(y))
            .map(Self)
    }
}

/// Number of times a [`Movie`] was viewed.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    From,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Views(i32);

define_kind! {
    #[doc = "Airing status of a [`Movie`]."]
    #[derive(Default, Deserialize, Serialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    enum Status {
        #[doc = "New episodes are still being released."]
        #[default]
        Ongoing = 1,

        #[doc = "All episodes are released."]
        Completed = 2,
    }
}

/// [`DateTime`] when a [`Movie`] was created.
pub type CreationDateTime = DateTimeOf<(Movie, unit::Creation)>;

/// [`DateTime`] when a [`Movie`] was last modified.
pub type ModificationDateTime = DateTimeOf<(Movie, unit::Modification)>;
