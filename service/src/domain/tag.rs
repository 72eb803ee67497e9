//! [`Tag`] definitions.

use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

/// Label a [`Movie`] is tagged with.
///
/// [`Movie`]: crate::domain::Movie
#[derive(Clone, Debug, Serialize)]
pub struct Tag {
    /// ID of this [`Tag`].
    pub id: Id,

    /// Unique slug of this [`Tag`].
    pub slug: Slug,

    /// Display name of this [`Tag`].
    pub name: String,

    /// Position of this [`Tag`] in listings.
    #[serde(skip)]
    pub order: i32,
}

/// ID of a [`Tag`].
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

impl Id {
    /// Creates a new [`Id`] if the given `id` is positive.
    #[must_use]
    pub fn new(id: i64) -> Option<Self> {
        i32::try_from(id).ok().filter(|id| *id > 0).map(Self)
    }
}

/// URL-safe unique identifier of a [`Tag`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Slug(String);
