//! [`Tx`] definitions.

use std::{fmt, sync::Arc};

use futures::{FutureExt as _, TryFutureExt as _};
use ouroboros::self_referencing;
use tokio::sync::{Mutex, MutexGuard};
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{
        self,
        connection::{self, Pool, Pooled},
        Connection,
    },
};

/// Transaction owning the [`Pooled`] connection it runs on.
#[self_referencing]
struct Held {
    /// [`Pooled`] connection the transaction runs on.
    conn: Pooled,

    /// Transaction itself, [`None`] once committed.
    #[borrows(mut conn)]
    #[not_covariant]
    tx: Option<deadpool_postgres::Transaction<'this>>,
}

impl Held {
    /// Checks out a connection from the provided [`Pool`] and begins a
    /// transaction on it.
    async fn begin(pool: &Pool) -> Result<Self, Traced<database::Error>> {
        let conn = connection::checkout(pool)
            .await
            .map_err(tracerr::wrap!())?;
        Self::try_new_async_send(conn, |c| c.transaction().map_ok(Some).boxed())
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    /// Returns the running transaction.
    fn tx(&self) -> &deadpool_postgres::Transaction<'_> {
        self.with_tx(|tx| tx.as_ref().expect("already committed"))
    }
}

/// Postgres transaction shared by all the clones of a [`Postgres<Tx>`].
///
/// The transaction begins on the first statement, so a [`Tx`] not used for
/// anything never touches the [`Pool`]. Dropping the last clone without
/// [`Tx::commit()`]ting rolls the transaction back.
///
/// [`Postgres<Tx>`]: postgres::Postgres
#[derive(Clone)]
pub struct Tx {
    /// [`Pool`] to check out the connection from.
    pool: Pool,

    /// Lazily begun transaction.
    held: Arc<Mutex<Option<Held>>>,
}

impl fmt::Debug for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tx")
            .field("pool", &self.pool.status())
            .finish_non_exhaustive()
    }
}

impl Tx {
    /// Creates a new [`Tx`] over the provided [`Pool`].
    #[must_use]
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            held: Arc::new(Mutex::new(None)),
        }
    }

    /// Locks the transaction of this [`Tx`], beginning it if not yet.
    async fn begun(
        &self,
    ) -> Result<MutexGuard<'_, Option<Held>>, Traced<database::Error>> {
        let mut held = self.held.lock().await;
        if held.is_none() {
            let begun =
                Held::begin(&self.pool).await.map_err(tracerr::wrap!())?;
            *held = Some(begun);
        }
        Ok(held)
    }

    /// Commits this [`Tx`], if it has begun.
    ///
    /// Statements issued afterwards run in a new transaction.
    ///
    /// # Errors
    ///
    /// If the commit fails.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let Some(mut held) = self.held.lock().await.take() else {
            return Ok(());
        };
        #[expect(
            clippy::redundant_closure_for_method_calls,
            reason = "different variance, see \
                      https://doc.rust-lang.org/nomicon/subtyping.html#variance"
        )]
        held.with_tx_mut(|tx| tx.take())
            .expect("committed only once")
            .commit()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

impl Connection for Tx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + Sync + ?Sized,
    {
        let held = self.begun().await.map_err(tracerr::wrap!())?;
        held.as_ref()
            .expect("just begun")
            .tx()
            .query(stmt, params)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + Sync + ?Sized,
    {
        let held = self.begun().await.map_err(tracerr::wrap!())?;
        held.as_ref()
            .expect("just begun")
            .tx()
            .query_opt(stmt, params)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + Sync + ?Sized,
    {
        let held = self.begun().await.map_err(tracerr::wrap!())?;
        held.as_ref()
            .expect("just begun")
            .tx()
            .execute(stmt, params)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}
