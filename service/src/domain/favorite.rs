//! [`Favorite`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::Serialize;

use crate::domain::{movie, user};

/// [`Movie`] bookmarked by a [`User`].
///
/// [`Movie`]: crate::domain::Movie
/// [`User`]: crate::domain::User
#[derive(Clone, Debug)]
pub struct Favorite {
    /// ID of this [`Favorite`].
    pub id: Id,

    /// ID of the [`User`] who bookmarked the [`Movie`].
    ///
    /// [`Movie`]: crate::domain::Movie
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// ID of the bookmarked [`Movie`].
    ///
    /// [`Movie`]: crate::domain::Movie
    pub movie_id: movie::Id,

    /// [`DateTime`] when this [`Favorite`] was created.
    pub created_at: CreationDateTime,
}

/// [`Favorite`] to be created.
#[derive(Clone, Copy, Debug)]
pub struct Draft {
    /// ID of the bookmarking [`User`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// ID of the bookmarked [`Movie`].
    ///
    /// [`Movie`]: crate::domain::Movie
    pub movie_id: movie::Id,
}

/// ID of a [`Favorite`].
#[derive(
    Clone, Copy, Debug, Display, Eq, From, Hash, Into, PartialEq, Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i32);

/// [`DateTime`] when a [`Favorite`] was created.
pub type CreationDateTime = DateTimeOf<(Favorite, unit::Creation)>;
