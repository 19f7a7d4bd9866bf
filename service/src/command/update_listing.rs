//! [`Command`] for updating a [`Listing`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{listing, user, Listing},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for overwriting [`listing::Details`] of a [`Listing`].
///
/// Only the owner of the [`Listing`] is allowed to update it.
#[derive(Clone, Debug)]
pub struct UpdateListing {
    /// ID of the [`Listing`] to update.
    pub listing_id: listing::Id,

    /// ID of the [`User`] requesting the update.
    pub requester_id: user::Id,

    /// New [`listing::Details`] of the [`Listing`].
    pub details: listing::Details,
}

impl<Db> Command<UpdateListing> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Listing, listing::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<Update<Listing>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateListing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateListing {
            listing_id,
            requester_id,
            details,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent updates of the same `Listing`.
        tx.execute(Lock(By::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut listing = tx
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(listing_id))
            .map_err(tracerr::wrap!())?;
        if !listing.is_owned_by(requester_id) {
            return Err(tracerr::new!(E::NotOwner {
                listing_id,
                requester_id,
            }));
        }

        listing.update(details);
        tx.execute(Update(listing.clone()))
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

/// Error of [`UpdateListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// Requester is not the owner of the [`Listing`].
    #[display(
        "`User(id: {requester_id})` doesn't own `Listing(id: {listing_id})`"
    )]
    #[from(ignore)]
    NotOwner {
        /// ID of the [`Listing`] requested to update.
        listing_id: listing::Id,

        /// ID of the [`User`] requested the update.
        requester_id: user::Id,
    },
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        domain::{listing, user, Listing},
        infra::{database::memory, Database as _},
        query, Command as _, Query as _,
    };

    use super::{ExecutionError, UpdateListing};

    #[tokio::test]
    async fn owner_overwrites_details() {
        let svc = memory::service();
        let owner = user::Id::new();
        let listing = Listing::new(owner, listing::spec::details("Old", 100));
        svc.database().execute(Insert(listing.clone())).await.unwrap();

        let updated = svc
            .execute(UpdateListing {
                listing_id: listing.id,
                requester_id: owner,
                details: listing::spec::details("New", 150),
            })
            .await
            .unwrap();

        let stored = svc
            .execute(query::listing::ById::by(listing.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.title, updated.title);
        assert_eq!(AsRef::<str>::as_ref(&stored.title), "New");
        assert_eq!(stored.created_at, listing.created_at);
    }

    #[tokio::test]
    async fn non_owner_never_mutates() {
        let svc = memory::service();
        let owner = user::Id::new();
        let intruder = user::Id::new();
        let listing = Listing::new(owner, listing::spec::details("Old", 100));
        svc.database().execute(Insert(listing.clone())).await.unwrap();

        let err = svc
            .execute(UpdateListing {
                listing_id: listing.id,
                requester_id: intruder,
                details: listing::spec::details("Hijacked", 1),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::NotOwner { requester_id, .. }
                if *requester_id == intruder,
        ));

        let stored = svc
            .execute(query::listing::ById::by(listing.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.title, listing.title);
        assert_eq!(stored.price, listing.price);
    }

    #[tokio::test]
    async fn rejects_missing_listing() {
        let svc = memory::service();
        let listing_id = listing::Id::new();

        let err = svc
            .execute(UpdateListing {
                listing_id,
                requester_id: user::Id::new(),
                details: listing::spec::details("New", 150),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ListingNotExists(id) if *id == listing_id,
        ));
    }
}
