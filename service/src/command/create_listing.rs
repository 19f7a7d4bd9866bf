//! [`Command`] for creating a new [`Listing`].

use common::operations::{By, Commit, Insert, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{listing, user, Listing, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for publishing a new [`Listing`] on behalf of its owner.
#[derive(Clone, Debug)]
pub struct CreateListing {
    /// ID of the [`User`] owning a new [`Listing`].
    pub owner_id: user::Id,

    /// [`listing::Details`] of a new [`Listing`].
    pub details: listing::Details,
}

impl<Db> Command<CreateListing> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Listing>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateListing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateListing { owner_id, details } = cmd;

        self.database()
            .execute(Select(By::<Option<User>, _>::new(owner_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(owner_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let listing = Listing::new(owner_id, details);

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(listing.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(listing)
    }
}

/// Error of [`CreateListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Owner [`User`] does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        domain::{listing, user},
        infra::{database::memory, Database as _},
        query, Command as _, Query as _,
    };

    use super::{CreateListing, ExecutionError};

    #[tokio::test]
    async fn creates_listing_of_existing_owner() {
        let svc = memory::service();
        let owner = memory::user("host@example.com");
        svc.database().execute(Insert(owner.clone())).await.unwrap();

        let listing = svc
            .execute(CreateListing {
                owner_id: owner.id,
                details: listing::spec::details("Loft", 100),
            })
            .await
            .unwrap();

        assert_eq!(listing.owner_id, owner.id);
        assert_eq!(listing.perks.iter().count(), 2);

        let stored = svc
            .execute(query::listing::ById::by(listing.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.title, listing.title);
    }

    #[tokio::test]
    async fn rejects_unknown_owner() {
        let svc = memory::service();
        let owner_id = user::Id::new();

        let err = svc
            .execute(CreateListing {
                owner_id,
                details: listing::spec::details("Loft", 100),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::UserNotExists(id) if *id == owner_id,
        ));
        assert_eq!(svc.database().listings_count(), 0);
    }
}
