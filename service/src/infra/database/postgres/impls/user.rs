//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of the `users` table, in the order [`from_row()`] expects.
const COLUMNS: &str = "id, name, email, password_hash, created_at";

/// Builds a [`User`] out of the provided [`COLUMNS`] [`Row`].
fn from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1::UUID");
        let row = self
            .query_opt(&sql, &[&by.into_inner()])
            .await
            .map_err(tracerr::wrap!())?;
        Ok(row.as_ref().map(from_row))
    }
}

/// Emails are matched exactly, as they're stored.
impl<'e, C> Database<Select<By<Option<User>, &'e user::Email>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'e user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql =
            format!("SELECT {COLUMNS} FROM users WHERE email = $1::VARCHAR");
        let row = self
            .query_opt(&sql, &[by.into_inner()])
            .await
            .map_err(tracerr::wrap!())?;
        Ok(row.as_ref().map(from_row))
    }
}

/// Fails on a duplicate email with a `users_email_key` unique violation.
impl<C> Database<Insert<User>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            INSERT INTO users (\
                id, name, email, password_hash, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                $5::TIMESTAMPTZ\
            )";

        let User {
            id,
            name,
            email,
            password_hash,
            created_at,
        } = &user;
        _ = self
            .exec(SQL, &[id, name, email, password_hash, created_at])
            .await
            .map_err(tracerr::wrap!())?;
        Ok(())
    }
}
