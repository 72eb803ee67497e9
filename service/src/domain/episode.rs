//! [`Episode`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

use crate::domain::{movie, server};

/// Single episode of a [`Movie`].
///
/// [`Movie`]: crate::domain::Movie
#[derive(Clone, Debug)]
pub struct Episode {
    /// ID of this [`Episode`].
    pub id: Id,

    /// ID of the [`Movie`] this [`Episode`] belongs to.
    ///
    /// [`Movie`]: crate::domain::Movie
    pub movie_id: movie::Id,

    /// [`Number`] of this [`Episode`], unique within its [`Movie`].
    ///
    /// [`Movie`]: crate::domain::Movie
    pub number: Number,

    /// [`Name`] of this [`Episode`], if any.
    pub name: Option<Name>,

    /// Free-form slug of this [`Episode`], if any.
    pub slug: Option<String>,

    /// [`DateTime`] when this [`Episode`] was created.
    pub created_at: CreationDateTime,
}

/// [`Episode`] to be created together with its [`server::Draft`]s.
#[derive(Clone, Debug)]
pub struct Draft {
    /// [`Number`] of the [`Episode`].
    pub number: Number,

    /// [`Name`] of the [`Episode`].
    pub name: Name,

    /// [`server::Draft`]s of the [`Episode`].
    pub servers: Vec<server::Draft>,
}

/// ID of an [`Episode`].
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

/// One-based number of an [`Episode`] within its [`Movie`].
///
/// [`Movie`]: crate::domain::Movie
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Number(i32);

impl Number {
    /// The first [`Number`].
    pub const FIRST: Self = Self(1);

    /// Creates a new [`Number`] if the given `n` is positive.
    #[must_use]
    pub fn new(n: i64) -> Option<Self> {
        i32::try_from(n).ok().filter(|n| *n >= 1).map(Self)
    }

    /// Returns the preceding [`Number`], if any.
    #[must_use]
    pub fn prev(self) -> Option<Self> {
        (self.0 > 1).then(|| Self(self.0 - 1))
    }

    /// Returns the following [`Number`].
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl FromStr for Number {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        (!s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
            .then(|| s.parse::<u32>().ok())
            .flatten()
            .and_then(|n| Self::new(n.into()))
            .ok_or("invalid episode `Number`")
    }
}

/// Display name of an [`Episode`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] out of the given `name`, trimming it.
    ///
    /// [`None`] is returned if the `name` is blank.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Option<Self> {
        let name = name.as_ref().trim();
        (!name.is_empty()).then(|| Self(name.to_owned()))
    }

    /// Returns the [`Name`] an [`Episode`] gets when none is provided.
    #[must_use]
    pub fn fallback(number: Number) -> Self {
        Self(format!("Tập {number}"))
    }
}

/// [`DateTime`] when an [`Episode`] was created.
pub type CreationDateTime = DateTimeOf<(Episode, unit::Creation)>;
