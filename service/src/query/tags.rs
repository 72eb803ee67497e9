//! [`Query`] collection related to the multiple [`Tag`]s.

use common::operations::By;

use crate::domain::Tag;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Tag`]s, in their display order.
pub type All = DatabaseQuery<By<Vec<Tag>, ()>>;
