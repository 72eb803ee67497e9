//! [`Query`] resolving the account behind a session.

use common::operations::By;

use crate::domain::{user, User};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Resolves the signed-in [`User`] from the [`user::Id`] stored in the session
/// token. [`None`] once the account was deleted.
pub type ById = DatabaseQuery<By<Option<User>, user::Id>>;
