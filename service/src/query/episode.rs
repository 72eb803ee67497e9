//! [`Query`] collection related to a single [`Episode`].

use common::operations::By;

use crate::domain::{episode, movie, Episode};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries an [`Episode`] by its [`episode::Id`].
pub type ById = DatabaseQuery<By<Option<Episode>, episode::Id>>;

/// Queries an [`Episode`] of a [`Movie`] by its [`episode::Number`].
///
/// [`Movie`]: crate::domain::Movie
pub type ByNumber =
    DatabaseQuery<By<Option<Episode>, (movie::Id, episode::Number)>>;
