//! [`Database`] backends.
//!
//! Every read and write of the [`Service`] is a [`Database`] operation, so a
//! backend is simply a type implementing the operations the [`Service`]
//! commands and queries require.
//!
//! [`Service`]: crate::Service

#[cfg(test)]
pub(crate) mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Storage operation.
pub use common::Handler as Database;

/// Failure of a [`Database`] backend.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "postgres")]
    /// [`Postgres`] failure.
    Postgres(postgres::Error),
}
