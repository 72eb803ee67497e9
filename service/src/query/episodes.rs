//! [`Query`] collection related to the multiple [`Episode`]s.

use common::operations::By;

use crate::domain::{movie, Episode};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Episode`]s of a [`Movie`], by their number.
///
/// [`Movie`]: crate::domain::Movie
pub type OfMovie = DatabaseQuery<By<Vec<Episode>, movie::Id>>;
