//! [`Booking`]-related [`Database`] implementations.

use std::num::NonZeroU16;

use common::operations::{By, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{booking, user, Booking},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of the `bookings` table, in the order [`from_row()`] expects.
const COLUMNS: &str = "\
    id, listing_id, user_id, \
    check_in, check_out, \
    num_guests, units, guest_name, \
    price, created_at";

/// Converts the provided `INT4` column value into a positive count.
fn count(row: &Row, column: &str) -> NonZeroU16 {
    // Guarded by the `CHECK` constraints.
    u16::try_from(row.get::<_, i32>(column))
        .ok()
        .and_then(NonZeroU16::new)
        .unwrap_or_else(|| panic!("`{column}` out of range"))
}

/// Builds a [`Booking`] out of the provided [`COLUMNS`] [`Row`].
fn from_row(row: &Row) -> Booking {
    Booking {
        id: row.get("id"),
        listing_id: row.get("listing_id"),
        user_id: row.get("user_id"),
        stay: booking::Stay::new(row.get("check_in"), row.get("check_out"))
            .expect("`check_out` not after `check_in`"),
        num_guests: count(row, "num_guests"),
        units: count(row, "units"),
        guest_name: row.get("guest_name"),
        price: row.get("price"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Vec<Booking>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings \
             WHERE user_id = $1::UUID \
             ORDER BY created_at DESC, id",
        );
        Ok(self
            .query(&sql, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Booking>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        let Booking {
            id,
            listing_id,
            user_id,
            stay,
            num_guests,
            units,
            guest_name,
            price,
            created_at,
        } = booking;
        let (check_in, check_out) = (stay.check_in(), stay.check_out());
        let num_guests = i32::from(num_guests.get());
        let units = i32::from(units.get());

        const SQL: &str = "\
            INSERT INTO bookings (\
                id, listing_id, user_id, \
                check_in, check_out, \
                num_guests, units, guest_name, \
                price, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, \
                $4::DATE, $5::DATE, \
                $6::INT4, $7::INT4, $8::VARCHAR, \
                $9::NUMERIC, $10::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &listing_id,
                &user_id,
                &check_in,
                &check_out,
                &num_guests,
                &units,
                &guest_name,
                &price,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
