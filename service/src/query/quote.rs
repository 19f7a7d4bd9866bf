//! [`Quote`] [`Query`] definition.

use common::{
    operations::{By, Select},
    Date,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::pricing::Fees;
use crate::{
    domain::{booking, listing, pricing, Listing},
    infra::{database, Database},
    Query, Service,
};

/// [`Query`] pricing a prospective stay at a [`Listing`] with the configured
/// [`Fees`].
///
/// Resolves to [`None`] if the [`Listing`] doesn't exist.
#[derive(Clone, Copy, Debug)]
pub struct Quote {
    /// ID of the [`Listing`] to price.
    pub listing_id: listing::Id,

    /// Check-in [`Date`].
    pub check_in: Date,

    /// Check-out [`Date`].
    ///
    /// Not validated against the `check_in`, so the quoted nights may be
    /// zero or negative.
    pub check_out: Date,

    /// Number of units to price.
    pub units: booking::UnitsCount,
}

impl<Db> Query<Quote> for Service<Db>
where
    Db: Database<
        Select<By<Option<Listing>, listing::Id>>,
        Ok = Option<Listing>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<pricing::Quote>;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: Quote) -> Result<Self::Ok, Self::Err> {
        let Quote {
            listing_id,
            check_in,
            check_out,
            units,
        } = query;

        let Some(listing) = self
            .database()
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))?
        else {
            return Ok(None);
        };

        self.config()
            .fees
            .quote(
                listing.price.amount(),
                pricing::nights(check_in, check_out),
                units.get(),
            )
            .map(Some)
            .ok_or_else(|| tracerr::new!(ExecutionError::PriceOverflow))
    }
}

/// Error of [`Quote`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Quoted price doesn't fit into [`Money`].
    ///
    /// [`Money`]: common::Money
    #[display("Quoted price overflows")]
    PriceOverflow,
}

#[cfg(test)]
mod spec {
    use std::num::NonZeroU16;

    use common::{operations::Insert, Money};

    use crate::{
        domain::{listing, user, Listing},
        infra::{database::memory, Database as _},
        Query as _,
    };

    use super::{ExecutionError, Quote};

    fn query(listing_id: listing::Id, check_out: &str) -> Quote {
        Quote {
            listing_id,
            check_in: "2024-01-10".parse().unwrap(),
            check_out: check_out.parse().unwrap(),
            units: NonZeroU16::new(1).unwrap(),
        }
    }

    #[tokio::test]
    async fn prices_stay() {
        let svc = memory::service();
        let listing =
            Listing::new(user::Id::new(), listing::spec::details("Loft", 100));
        svc.database().execute(Insert(listing.clone())).await.unwrap();

        let quote = svc
            .execute(query(listing.id, "2024-01-13"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(quote.nights, 3);
        assert_eq!(quote.total, Money::from(580_i64));

        let same_day = svc
            .execute(query(listing.id, "2024-01-10"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(same_day.total, Money::from(160_i64));
    }

    #[tokio::test]
    async fn none_for_missing_listing() {
        let svc = memory::service();

        let quote = svc
            .execute(query(listing::Id::new(), "2024-01-13"))
            .await
            .unwrap();

        assert!(quote.is_none());
    }

    #[tokio::test]
    async fn errors_on_price_overflow() {
        let svc = memory::service();
        let listing = Listing::new(
            user::Id::new(),
            listing::spec::details("Palace", i64::MAX),
        );
        svc.database().execute(Insert(listing.clone())).await.unwrap();

        let err = svc
            .execute(Quote {
                check_in: "0001-01-01".parse().unwrap(),
                units: NonZeroU16::new(u16::MAX).unwrap(),
                ..query(listing.id, "9999-12-31")
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::PriceOverflow));
    }
}
