//! [`Query`] collection related to the multiple [`Favorite`]s.

use common::operations::By;

use crate::{domain::user, read::favorite};
#[cfg(doc)]
use crate::{domain::Favorite, Query};

use super::DatabaseQuery;

/// Queries [`Favorite`]s of a [`User`], newest first.
///
/// [`User`]: crate::domain::User
pub type OfUser = DatabaseQuery<By<Vec<favorite::Entry>, user::Id>>;
