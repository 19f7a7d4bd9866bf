//! Postgres [`Database`] implementation.

pub mod connection;

mod impls;
pub mod tx;
mod word_patterns;

use deadpool_postgres::Runtime;
use derive_more::{Deref, Display, Error as StdError, From};
use tokio_postgres::NoTls;
use tracerr::Traced;

use crate::infra::database;
#[cfg(doc)]
use crate::infra::Database;

pub use refinery::embed_migrations;

pub use self::{
    connection::{Connection, Pool},
    tx::Tx,
    word_patterns::WordPatterns,
};

pub use deadpool_postgres::Config;

/// Postgres [`Database`] running statements over a [`Connection`].
///
/// By default, statements run outside of any transaction, see [`Tx`]
/// otherwise.
#[derive(Clone, Debug, Deref)]
pub struct Postgres<C = Pool>(C);

impl Postgres {
    /// Creates a new [`Postgres`] [`Database`] connecting with the provided
    /// [`Config`].
    ///
    /// Connections are established lazily, so this doesn't fail on an
    /// unreachable server.
    ///
    /// # Errors
    ///
    /// If the [`Config`] is invalid.
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        conf.create_pool(Some(Runtime::Tokio1), NoTls)
            .map(Self)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

/// Postgres [`Database`] error.
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// Statement execution error.
    #[display("Statement failed: {_0}")]
    Statement(connection::Error),

    /// Invalid [`Config`] of a [`Pool`].
    #[display("Failed to create `Pool`: {_0}")]
    PoolCreation(connection::PoolCreationError),

    /// [`Pool`] failed to provide a connection.
    #[display("Failed to check out a `Pool` connection: {_0}")]
    Pool(connection::PoolError),
}
