//! [`Query`] collection related to the multiple [`Movie`]s.

use common::operations::By;

use crate::read::movie::list;
#[cfg(doc)]
use crate::{domain::Movie, Query};

use super::DatabaseQuery;

/// Queries a page of [`Movie`] summaries.
pub type List = DatabaseQuery<By<list::Page, list::Selector>>;
