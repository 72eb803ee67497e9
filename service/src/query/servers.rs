//! [`Query`] collection related to the multiple [`Server`]s.

use common::operations::By;

use crate::{domain::Server, read::server};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries [`Server`]s of the selected [`Episode`]s, by their priority.
///
/// [`Episode`]: crate::domain::Episode
pub type OfEpisodes = DatabaseQuery<By<Vec<Server>, server::OfEpisodes>>;
