//! [`Query`] collection related to the multiple [`Genre`]s.

use common::operations::By;

use crate::domain::Genre;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Genre`]s, in their display order.
pub type All = DatabaseQuery<By<Vec<Genre>, ()>>;
