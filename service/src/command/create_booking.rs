//! [`Command`] for creating a new [`Booking`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::{pricing::Fees, User};
use crate::{
    domain::{booking, listing, user, Booking, Listing},
    infra::{database, Database},
    Service,
};

use super::Command;

/// Policy of accepting a client-provided [`Booking`] price.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PricePolicy {
    /// Client-provided price is stored as is, without looking up the
    /// [`Listing`].
    TrustClient,

    /// Price is recomputed from the [`Listing`] nightly rate and the
    /// configured [`Fees`], ignoring the client-provided one.
    #[default]
    Recompute,
}

/// [`Command`] for reserving a [`Listing`] on behalf of a [`User`].
#[derive(Clone, Debug)]
pub struct CreateBooking {
    /// ID of the [`User`] making a new [`Booking`].
    pub user_id: user::Id,

    /// ID of the [`Listing`] to book.
    pub listing_id: listing::Id,

    /// [`booking::Stay`] of a new [`Booking`].
    pub stay: booking::Stay,

    /// Number of guests of a new [`Booking`].
    pub num_guests: booking::GuestsCount,

    /// Number of units reserved by a new [`Booking`].
    pub units: booking::UnitsCount,

    /// [`booking::GuestName`] of a new [`Booking`].
    pub guest_name: booking::GuestName,

    /// Total price computed by the client.
    pub price: Money,
}

impl<Db> Command<CreateBooking> for Service<Db>
where
    Db: Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateBooking {
            user_id,
            listing_id,
            stay,
            num_guests,
            units,
            guest_name,
            price: client_price,
        } = cmd;

        let price = match self.config().price_policy {
            PricePolicy::TrustClient => client_price,
            PricePolicy::Recompute => {
                let listing = self
                    .database()
                    .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::ListingNotExists(listing_id))
                    .map_err(tracerr::wrap!())?;

                let price = self
                    .config()
                    .fees
                    .total(listing.price.amount(), stay.nights(), units.get())
                    .ok_or(E::PriceOverflow)
                    .map_err(tracerr::wrap!())?;
                if price != client_price {
                    log::warn!(
                        %listing_id,
                        %user_id,
                        %client_price,
                        %price,
                        "client-provided booking price mismatch",
                    );
                }
                price
            }
        };

        let booking = Booking {
            id: booking::Id::new(),
            listing_id,
            user_id,
            stay,
            num_guests,
            units,
            guest_name,
            price,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(booking)
    }
}

/// Error of [`CreateBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// Recomputed [`Booking`] price doesn't fit into [`Money`].
    #[display("Recomputed `Booking` price overflows")]
    PriceOverflow,
}

#[cfg(test)]
mod spec {
    use std::num::NonZeroU16;

    use common::{operations::Insert, Date, Money};

    use crate::{
        domain::{booking, listing, user, Listing},
        infra::{database::memory, Database as _},
        query, Command as _, Query as _,
    };

    use super::{CreateBooking, ExecutionError, PricePolicy};

    fn cmd(
        user_id: user::Id,
        listing_id: listing::Id,
        price: i64,
    ) -> CreateBooking {
        let date = |s: &str| s.parse::<Date>().unwrap();
        CreateBooking {
            user_id,
            listing_id,
            stay: booking::Stay::new(date("2024-01-10"), date("2024-01-13"))
                .unwrap(),
            num_guests: NonZeroU16::new(2).unwrap(),
            units: NonZeroU16::new(1).unwrap(),
            guest_name: booking::GuestName::new("Jane Doe").unwrap(),
            price: Money::from(price),
        }
    }

    #[tokio::test]
    async fn recomputes_price_from_listing() {
        let svc = memory::service();
        let listing =
            Listing::new(user::Id::new(), listing::spec::details("Loft", 100));
        svc.database().execute(Insert(listing.clone())).await.unwrap();

        let booking = svc
            .execute(cmd(user::Id::new(), listing.id, 1))
            .await
            .unwrap();

        assert_eq!(booking.price, Money::from(580_i64));
        assert_eq!(booking.nights(), 3);
    }

    #[tokio::test]
    async fn recompute_requires_existing_listing() {
        let svc = memory::service();
        let listing_id = listing::Id::new();

        let err = svc
            .execute(cmd(user::Id::new(), listing_id, 580))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ListingNotExists(id) if *id == listing_id,
        ));
        assert_eq!(svc.database().bookings_count(), 0);
    }

    #[tokio::test]
    async fn rejects_overflowing_price() {
        let svc = memory::service();
        let listing = Listing::new(
            user::Id::new(),
            listing::spec::details("Palace", i64::MAX),
        );
        svc.database().execute(Insert(listing.clone())).await.unwrap();

        let date = |s: &str| s.parse::<Date>().unwrap();
        let stay = booking::Stay::new(date("0001-01-01"), date("9999-12-31"))
            .unwrap();
        let err = svc
            .execute(CreateBooking {
                stay,
                units: NonZeroU16::new(u16::MAX).unwrap(),
                ..cmd(user::Id::new(), listing.id, 580)
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::PriceOverflow));
        assert_eq!(svc.database().bookings_count(), 0);
    }

    #[tokio::test]
    async fn trusts_client_price_verbatim() {
        let svc = memory::service_with(|c| {
            c.price_policy = PricePolicy::TrustClient;
        });

        // No lookup happens, so an unknown `Listing` is fine.
        let booking = svc
            .execute(cmd(user::Id::new(), listing::Id::new(), 1))
            .await
            .unwrap();

        assert_eq!(booking.price, Money::from(1_i64));
    }

    #[tokio::test]
    async fn never_mutates_listing() {
        let svc = memory::service();
        let listing =
            Listing::new(user::Id::new(), listing::spec::details("Loft", 100));
        svc.database().execute(Insert(listing.clone())).await.unwrap();

        for _ in 0..2 {
            _ = svc
                .execute(cmd(user::Id::new(), listing.id, 580))
                .await
                .unwrap();
        }

        let stored = svc
            .execute(query::listing::ById::by(listing.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.title, listing.title);
        assert_eq!(stored.price, listing.price);
        assert_eq!(stored.max_guests, listing.max_guests);
        // Overlapping stays are not rejected.
        assert_eq!(svc.database().bookings_count(), 2);
    }
}
