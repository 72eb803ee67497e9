//! [`Query`] collection related to the [`WatchHistory`].

use common::operations::By;

use crate::{domain::user, read::watch_history};
#[cfg(doc)]
use crate::{domain::WatchHistory, Query};

use super::DatabaseQuery;

/// Queries the most recently watched [`WatchHistory`] of a [`User`].
///
/// [`User`]: crate::domain::User
pub type OfUser = DatabaseQuery<By<Vec<watch_history::Entry>, user::Id>>;
