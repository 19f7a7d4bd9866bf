//! [`Query`] collection related to a single [`Listing`].

use common::operations::By;

use crate::domain::{listing, Listing};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Listing`] by its [`listing::Id`].
pub type ById = DatabaseQuery<By<Option<Listing>, listing::Id>>;

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        domain::{listing, user, Listing},
        infra::{database::memory, Database as _},
        Query as _,
    };

    use super::ById;

    #[tokio::test]
    async fn finds_existing() {
        let svc = memory::service();
        let listing =
            Listing::new(user::Id::new(), listing::spec::details("Loft", 100));
        svc.database().execute(Insert(listing.clone())).await.unwrap();

        let found = svc.execute(ById::by(listing.id)).await.unwrap();

        assert_eq!(found.map(|l| l.id), Some(listing.id));
    }

    #[tokio::test]
    async fn none_for_unknown_id() {
        let svc = memory::service();
        let loft =
            Listing::new(user::Id::new(), listing::spec::details("Loft", 100));
        svc.database().execute(Insert(loft)).await.unwrap();

        let found = svc.execute(ById::by(listing::Id::new())).await.unwrap();

        assert!(found.is_none());
    }
}
