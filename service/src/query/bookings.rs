//! [`Query`] collection related to the multiple [`Booking`]s.

use std::collections::HashMap;

use common::operations::{By, Select};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{listing, user, Booking, Listing},
    infra::{database, Database},
    read::booking::Populated,
    Query, Service,
};

/// [`Query`] of all the [`Booking`]s made by a [`User`], newest first, with
/// their [`Listing`]s resolved.
#[derive(Clone, Copy, Debug)]
pub struct ByUser(pub user::Id);

impl<Db> Query<ByUser> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Booking>, user::Id>>,
            Ok = Vec<Booking>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<HashMap<listing::Id, Listing>, Vec<listing::Id>>>,
            Ok = HashMap<listing::Id, Listing>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<Populated>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        ByUser(user_id): ByUser,
    ) -> Result<Self::Ok, Self::Err> {
        let bookings = self
            .database()
            .execute(Select(By::<Vec<Booking>, _>::new(user_id)))
            .await
            .map_err(tracerr::wrap!())?;
        if bookings.is_empty() {
            return Ok(vec![]);
        }

        let mut ids = bookings.iter().map(|b| b.listing_id).collect::<Vec<_>>();
        ids.sort_unstable();
        ids.dedup();
        let listings = self
            .database()
            .execute(Select(By::<HashMap<listing::Id, Listing>, _>::new(ids)))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(bookings
            .into_iter()
            .map(|booking| Populated {
                listing: listings.get(&booking.listing_id).cloned(),
                booking,
            })
            .collect())
    }
}

#[cfg(test)]
mod spec {
    use std::num::NonZeroU16;

    use common::{operations::Insert, Date, DateTime, Money};

    use crate::{
        domain::{booking, listing, user, Booking, Listing},
        infra::{database::memory, Database as _},
        Query as _,
    };

    use super::ByUser;

    fn booking(user_id: user::Id, listing_id: listing::Id) -> Booking {
        let date = |s: &str| s.parse::<Date>().unwrap();
        Booking {
            id: booking::Id::new(),
            listing_id,
            user_id,
            stay: booking::Stay::new(date("2024-01-10"), date("2024-01-13"))
                .unwrap(),
            num_guests: NonZeroU16::new(2).unwrap(),
            units: NonZeroU16::new(1).unwrap(),
            guest_name: booking::GuestName::new("Jane Doe").unwrap(),
            price: Money::from(580_i64),
            created_at: DateTime::now().coerce(),
        }
    }

    #[tokio::test]
    async fn returns_only_own_bookings_populated() {
        let svc = memory::service();
        let (me, other) = (user::Id::new(), user::Id::new());
        let listing =
            Listing::new(user::Id::new(), listing::spec::details("Loft", 100));
        svc.database().execute(Insert(listing.clone())).await.unwrap();

        let mine = booking(me, listing.id);
        let orphan = booking(me, listing::Id::new());
        for b in [mine.clone(), orphan.clone(), booking(other, listing.id)] {
            svc.database().execute(Insert(b)).await.unwrap();
        }

        let found = svc.execute(ByUser(me)).await.unwrap();

        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.booking.user_id == me));

        let populated = found
            .iter()
            .find(|p| p.booking.id == mine.id)
            .and_then(|p| p.listing.as_ref())
            .unwrap();
        assert_eq!(populated.id, listing.id);

        let unresolved = found.iter().find(|p| p.booking.id == orphan.id);
        assert!(unresolved.unwrap().listing.is_none());
    }

    #[tokio::test]
    async fn empty_for_user_without_bookings() {
        let svc = memory::service();

        let found = svc.execute(ByUser(user::Id::new())).await.unwrap();

        assert!(found.is_empty());
    }
}
