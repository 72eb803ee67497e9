//! Postgres [`Database`] storing the catalog, accounts and viewing activity.

pub mod client;
pub mod connection;
mod impls;

use deadpool_postgres::Runtime;
use derive_more::{Deref, Display, Error as StdError, From};
use tokio_postgres::NoTls;
use tracerr::Traced;

use crate::infra::database;
#[cfg(doc)]
use crate::infra::Database;

pub use refinery::embed_migrations;

pub use self::{
    client::{NonTx, Tx},
    connection::Connection,
};

pub use deadpool_postgres::Config;

/// Postgres [`Database`] client.
///
/// Starts out as a [`NonTx`] client; `Transact` turns it into a [`Tx`] one
/// sharing the same connection.
#[derive(Clone, Copy, Debug, Deref)]
pub struct Postgres<T = NonTx>(T);

impl Postgres {
    /// Creates a new [`Postgres`] client pooling connections as the provided
    /// [`Config`] describes.
    ///
    /// No connection is opened until the first statement runs.
    ///
    /// # Errors
    ///
    /// If the [`Config`] cannot describe a pool.
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        let pool = conf
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self(NonTx::from_pool(pool)))
    }
}

/// Postgres database [`Error`].
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// Statement or transaction failure.
    #[display("Postgres statement failed: {_0}")]
    Connection(connection::Error),

    /// Invalid pool configuration.
    #[display("Failed to create a Postgres pool: {_0}")]
    PoolCreationError(connection::PoolCreationError),

    /// No connection could be checked out of the pool.
    #[display("Failed to check a Postgres connection out: {_0}")]
    PoolError(connection::PoolError),
}
