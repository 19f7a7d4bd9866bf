//! [`Listing`]-related [`Database`] implementations.

use std::{collections::HashMap, num::NonZeroU16};

use common::operations::{By, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{listing, user, Listing},
    infra::{
        database::{
            self,
            postgres::{Connection, WordPatterns},
            Postgres,
        },
        Database,
    },
    read,
};

/// Columns of the `listings` table, in the order [`from_row()`] expects.
const COLUMNS: &str = "\
    id, owner_id, \
    title, address, city, phone, description, \
    perks, extra_info, \
    check_in, check_out, \
    max_guests, price, photos, \
    created_at";

/// Builds a [`Listing`] out of the provided [`COLUMNS`] [`Row`].
fn from_row(row: &Row) -> Listing {
    Listing {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        title: row.get("title"),
        address: row.get("address"),
        city: row.get("city"),
        phone: row.get("phone"),
        description: row.get("description"),
        perks: row.get("perks"),
        extra_info: row.get("extra_info"),
        check_in: row.get("check_in"),
        check_out: row.get("check_out"),
        // Guarded by the `CHECK` constraint.
        max_guests: u16::try_from(row.get::<_, i32>("max_guests"))
            .ok()
            .and_then(NonZeroU16::new)
            .expect("`max_guests` out of range"),
        price: row.get("price"),
        photos: row.get("photos"),
        created_at: row.get("created_at"),
    }
}

impl<C, IDs> Database<Select<By<HashMap<listing::Id, Listing>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[listing::Id]>,
{
    type Ok = HashMap<listing::Id, Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<listing::Id, Listing>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        let ids: &[listing::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM listings \
             WHERE id = ANY($1::UUID[])",
        );
        Ok(self
            .query(&sql, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let listing = from_row(row);
                (listing.id, listing)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Listing>, listing::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<listing::Id, Listing>, [listing::Id; 1]>>,
        Ok = HashMap<listing::Id, Listing>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Vec<Listing>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Listing>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM listings \
             ORDER BY created_at, id",
        );
        Ok(self
            .query(&sql, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Listing>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Listing>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let owner_id: user::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM listings \
             WHERE owner_id = $1::UUID \
             ORDER BY created_at, id",
        );
        Ok(self
            .query(&sql, &[&owner_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Listing>, read::listing::list::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Listing>, read::listing::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::listing::list::Filter { city, guests } = by.into_inner();

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];

        let city_words = city.as_ref().map(|c| WordPatterns::new(c.as_ref()));
        let city_idx = city_words.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });

        let guests = guests.map(|g| i32::from(g.get()));
        let guests_idx = guests.as_ref().map(|g| {
            ps.push(g);
            ps.len()
        });

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM listings \
             WHERE TRUE \
                   {city_filtering} \
                   {guests_filtering} \
             ORDER BY created_at, id",
            city_filtering = city_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!(
                    "AND city ILIKE ANY(${idx}::VARCHAR[])"
                ))
            }),
            guests_filtering =
                guests_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND max_guests >= ${idx}::INT4"))
                }),
        );
        Ok(self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Listing>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Listing>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(listing)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Listing>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(listing): Update<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        let Listing {
            id,
            owner_id,
            title,
            address,
            city,
            phone,
            description,
            perks,
            extra_info,
            check_in,
            check_out,
            max_guests,
            price,
            photos,
            created_at,
        } = listing;
        let max_guests = i32::from(max_guests.get());

        // `owner_id` and `created_at` are never updated.
        const SQL: &str = "\
            INSERT INTO listings (\
                id, owner_id, \
                title, address, city, phone, description, \
                perks, extra_info, \
                check_in, check_out, \
                max_guests, price, photos, \
                created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, \
                $3::VARCHAR, $4::VARCHAR, $5::VARCHAR, $6::VARCHAR, \
                $7::VARCHAR, \
                $8::VARCHAR[], $9::VARCHAR, \
                $10::VARCHAR, $11::VARCHAR, \
                $12::INT4, $13::NUMERIC, $14::VARCHAR[], \
                $15::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET title = EXCLUDED.title, \
                address = EXCLUDED.address, \
                city = EXCLUDED.city, \
                phone = EXCLUDED.phone, \
                description = EXCLUDED.description, \
                perks = EXCLUDED.perks, \
                extra_info = EXCLUDED.extra_info, \
                check_in = EXCLUDED.check_in, \
                check_out = EXCLUDED.check_out, \
                max_guests = EXCLUDED.max_guests, \
                price = EXCLUDED.price, \
                photos = EXCLUDED.photos";
        self.exec(
            SQL,
            &[
                &id,
                &owner_id,
                &title,
                &address,
                &city,
                &phone,
                &description,
                &perks,
                &extra_info,
                &check_in,
                &check_out,
                &max_guests,
                &price,
                &photos,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Listing, listing::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Listing, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: listing::Id = by.into_inner();

        // `DO UPDATE` row-locks an existing entry until the transaction ends.
        const SQL: &str = "\
            INSERT INTO listings_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE SET id = EXCLUDED.id";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
