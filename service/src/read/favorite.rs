//! [`Favorite`]-related read definitions.

use serde::Serialize;

use crate::{
    domain::{favorite, movie},
    read,
};
#[cfg(doc)]
use crate::domain::Favorite;

/// [`Favorite`] along with the bookmarked [`movie::Summary`].
///
/// [`movie::Summary`]: read::movie::Summary
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// ID of the [`Favorite`].
    pub id: favorite::Id,

    /// ID of the bookmarked movie.
    pub movie_id: movie::Id,

    /// When the [`Favorite`] was created.
    pub created_at: favorite::CreationDateTime,

    /// Bookmarked movie.
    pub movie: read::movie::Summary,
}
