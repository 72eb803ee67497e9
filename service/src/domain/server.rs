//! [`Server`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

use crate::domain::episode;

/// Embeddable video source of an [`Episode`].
///
/// [`Episode`]: crate::domain::Episode
#[derive(Clone, Debug)]
pub struct Server {
    /// ID of this [`Server`].
    pub id: Id,

    /// ID of the [`Episode`] this [`Server`] plays.
    ///
    /// [`Episode`]: crate::domain::Episode
    pub episode_id: episode::Id,

    /// [`Name`] of this [`Server`].
    pub name: Name,

    /// [`EmbedUrl`] of this [`Server`].
    pub embed_url: EmbedUrl,

    /// [`Priority`] of this [`Server`], lower goes first.
    pub priority: Priority,

    /// Indicator whether this [`Server`] is offered to viewers.
    pub is_active: bool,

    /// [`DateTime`] when this [`Server`] was created.
    pub created_at: CreationDateTime,
}

/// [`Server`] to be created along with its [`Episode`].
///
/// [`Episode`]: crate::domain::Episode
#[derive(Clone, Debug)]
pub struct Draft {
    /// [`Name`] of the [`Server`].
    pub name: Name,

    /// [`EmbedUrl`] of the [`Server`].
    pub embed_url: EmbedUrl,

    /// [`Priority`] of the [`Server`].
    pub priority: Priority,
}

/// ID of a [`Server`].
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
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i32);

/// Display name of a [`Server`].
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
}

/// URL of a player page to be embedded in an `<iframe>`.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct EmbedUrl(String);

impl EmbedUrl {
    /// Creates a new [`EmbedUrl`] out of the given `url`, trimming it.
    ///
    /// [`None`] is returned if the `url` is blank.
    #[must_use]
    pub fn new(url: impl AsRef<str>) -> Option<Self> {
        let url = url.as_ref().trim();
        (!url.is_empty()).then(|| Self(url.to_owned()))
    }
}

/// Ordering of [`Server`]s of the same [`Episode`].
///
/// [`Episode`]: crate::domain::Episode
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Priority(i32);

impl Priority {
    /// Creates a new [`Priority`] if the given `priority` is non-negative.
    #[must_use]
    pub fn new(priority: i64) -> Option<Self> {
        i32::try_from(priority).ok().filter(|p| *p >= 0).map(Self)
    }

    /// Returns the [`Priority`] of a [`Server`] listed at the given `index`.
    #[must_use]
    pub fn at(index: usize) -> Self {
        Self(i32::try_from(index).unwrap_or(i32::MAX))
    }
}

/// [`DateTime`] when a [`Server`] was created.
pub type CreationDateTime = DateTimeOf<(Server, unit::Creation)>;
