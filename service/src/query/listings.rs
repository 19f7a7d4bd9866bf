//! [`Query`] collection related to the multiple [`Listing`]s.

use common::operations::By;

use crate::{
    domain::{user, Listing},
    read,
};
#[cfg(doc)]
use crate::{domain::User, Query};

use super::DatabaseQuery;

/// Queries all the [`Listing`]s, oldest first.
pub type All = DatabaseQuery<By<Vec<Listing>, ()>>;

/// Queries [`Listing`]s owned by a [`User`], oldest first.
pub type ByOwner = DatabaseQuery<By<Vec<Listing>, user::Id>>;

/// Queries [`Listing`]s matching a [`read::listing::list::Filter`], oldest
/// first.
pub type Search = DatabaseQuery<By<Vec<Listing>, read::listing::list::Filter>>;

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        domain::{listing, user, Listing},
        infra::{database::memory, Database as _},
        Query as _,
    };

    use super::{All, ByOwner};

    #[tokio::test]
    async fn filters_by_owner() {
        let svc = memory::service();
        let (host, other) = (user::Id::new(), user::Id::new());
        let loft = Listing::new(host, listing::spec::details("Loft", 100));
        let villa = Listing::new(other, listing::spec::details("Villa", 300));
        let cabin = Listing::new(host, listing::spec::details("Cabin", 80));
        for l in [loft.clone(), villa.clone(), cabin.clone()] {
            svc.database().execute(Insert(l)).await.unwrap();
        }

        let owned = svc.execute(ByOwner::by(host)).await.unwrap();
        assert_eq!(
            owned.iter().map(|l| l.id).collect::<Vec<_>>(),
            [loft.id, cabin.id],
        );

        let theirs = svc.execute(ByOwner::by(other)).await.unwrap();
        assert_eq!(
            theirs.iter().map(|l| l.id).collect::<Vec<_>>(),
            [villa.id],
        );

        let none = svc.execute(ByOwner::by(user::Id::new())).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn returns_all_owners_listings() {
        let svc = memory::service();
        let loft =
            Listing::new(user::Id::new(), listing::spec::details("Loft", 100));
        let villa =
            Listing::new(user::Id::new(), listing::spec::details("Villa", 300));
        for l in [loft.clone(), villa.clone()] {
            svc.database().execute(Insert(l)).await.unwrap();
        }

        let all = svc.execute(All::by(())).await.unwrap();

        assert_eq!(
            all.iter().map(|l| l.id).collect::<Vec<_>>(),
            [loft.id, villa.id],
        );
    }

    #[tokio::test]
    async fn empty_without_listings() {
        let svc = memory::service();

        assert!(svc.execute(All::by(())).await.unwrap().is_empty());
    }
}
