//! Lazy Postgres clients handed to the [`Service`].
//!
//! Neither client touches the [`connection::Pool`] until the first statement
//! runs, so requests rejected before reaching the database never hold a
//! connection.
//!
//! [`Service`]: crate::Service

use std::{future::Future, sync::Arc};

use tokio::sync::{RwLock, RwLockReadGuard};
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

/// Returns the value in the `slot`, filling it with `init` first if empty.
async fn lazily<T, F, Fut>(
    slot: &RwLock<Option<T>>,
    init: F,
) -> Result<RwLockReadGuard<'_, T>, Traced<database::Error>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, Traced<database::Error>>>,
{
    let read = slot.read().await;
    let guard = if read.is_some() {
        read
    } else {
        drop(read);

        let mut write = slot.write().await;
        if write.is_none() {
            *write = Some(init().await.map_err(tracerr::wrap!())?);
        }
        write.downgrade()
    };

    Ok(RwLockReadGuard::map(guard, |conn| {
        conn.as_ref()
            .expect("connection cannot be dropped while guard is alive")
    }))
}

/// Checks a raw connection out of the `pool`.
pub(super) async fn checkout(
    pool: &connection::Pool,
) -> Result<connection::NonTx, Traced<database::Error>> {
    pool.get()
        .await
        .map_err(tracerr::from_and_wrap!(=> postgres::Error))
        .map_err(tracerr::map_from)
}

/// Client running every statement in autocommit mode.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] the connection is checked out from.
    pub(crate) pool: connection::Pool,

    /// Checked out connection, if any statement ran already.
    conn: Arc<RwLock<Option<connection::NonTx>>>,
}

impl NonTx {
    /// Creates a new [`NonTx`] client over the provided [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self {
            pool,
            conn: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the connection of this client, checking one out if needed.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::NonTx>, Traced<database::Error>>
    {
        lazily(&self.conn, || checkout(&self.pool))
            .await
            .map_err(tracerr::wrap!())
    }

    /// Detaches the checked out connection, if any, so a [`Tx`] can `BEGIN`
    /// on it instead of checking out another one.
    async fn take_connection(&self) -> Option<connection::NonTx> {
        self.conn.write().await.take()
    }
}

/// Client running every statement inside one transaction, opened on the first
/// statement and closed by [`Tx::commit()`].
///
/// Dropping the last clone without committing rolls the transaction back.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`connection::Pool`] to check a connection out from, if the [`NonTx`]
    /// client this one was created from had none.
    pool: connection::Pool,

    /// [`NonTx`] client this one was created from, until the transaction
    /// opens.
    origin: Arc<RwLock<Option<NonTx>>>,

    /// Open transaction, if any.
    tx: Arc<RwLock<Option<connection::Tx>>>,
}

impl Tx {
    /// Creates a new [`Tx`] client reusing the connection of the provided
    /// [`NonTx`] client, if it has one.
    #[must_use]
    pub fn from_non_tx(client: NonTx) -> Self {
        Self {
            pool: client.pool.clone(),
            origin: Arc::new(RwLock::new(Some(client))),
            tx: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the transaction of this client, opening it if needed.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        lazily(&self.tx, || async {
            let origin = self.origin.write().await.take();
            let reused = match origin {
                Some(client) => client.take_connection().await,
                None => None,
            };
            let conn = match reused {
                Some(conn) => conn,
                None => checkout(&self.pool).await.map_err(tracerr::wrap!())?,
            };
            connection::Tx::begin(conn).await.map_err(tracerr::wrap!())
        })
        .await
        .map_err(tracerr::wrap!())
    }

    /// Commits the transaction of this client, if one was opened.
    ///
    /// The next statement opens a new transaction.
    ///
    /// # Errors
    ///
    /// If Postgres fails to `COMMIT`.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let Some(tx) = self.tx.write().await.take() else {
            return Ok(());
        };
        tx.commit().await.map_err(tracerr::wrap!())
    }
}

/// Implements [`Connection`] for a lazy client by forwarding every call to the
/// connection its `connection()` method resolves to.
macro_rules! forward_to_lazy {
    ($ty:ty) => {
        impl Connection for $ty {
            async fn query<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<Vec<Row>, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .query(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn query_opt<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<Option<Row>, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .query_opt(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn exec<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<u64, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .exec(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }
        }
    };
}

forward_to_lazy!(NonTx);
forward_to_lazy!(Tx);

#[cfg(test)]
mod spec {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::RwLock;
    use tracerr::Traced;

    use crate::infra::database;

    use super::lazily;

    #[tokio::test]
    async fn fills_slot_once() {
        let slot = RwLock::new(None);
        let calls = &AtomicUsize::new(0);
        let init = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Traced<database::Error>>(7)
        };

        assert_eq!(*lazily(&slot, init).await.unwrap(), 7);
        assert_eq!(*lazily(&slot, init).await.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn keeps_prefilled_slot() {
        let slot = RwLock::new(Some("reused"));
        let guard = lazily(&slot, || async {
            Ok::<_, Traced<database::Error>>("checked out")
        })
        .await
        .unwrap();

        assert_eq!(*guard, "reused");
    }
}
