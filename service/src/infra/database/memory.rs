//! In-memory [`Database`] backing [`Service`] tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Update},
    DateTime,
};
use tracerr::Traced;

use crate::{
    domain::{listing, pricing::Fees, user, Booking, Listing, User},
    infra::{database, Database},
    read, Config, Service,
};

/// [`Database`] keeping everything in process memory.
///
/// [`Transact`] shares the same state, so a transaction observes and
/// publishes its changes immediately and [`Commit`] does nothing.
#[derive(Clone, Debug, Default)]
pub(crate) struct Memory(Arc<Mutex<State>>);

/// Data stored in a [`Memory`] database.
#[derive(Debug, Default)]
struct State {
    /// Stored [`User`]s.
    users: Vec<User>,

    /// Stored [`Listing`]s, in insertion order.
    listings: Vec<Listing>,

    /// Stored [`Booking`]s, in insertion order.
    bookings: Vec<Booking>,
}

impl Memory {
    fn state(&self) -> MutexGuard<'_, State> {
        self.0.lock().unwrap()
    }

    /// Removes the [`User`] with the provided ID, if any.
    pub(crate) fn forget_user(&self, id: user::Id) {
        self.state().users.retain(|u| u.id != id);
    }

    /// Returns the number of stored [`User`]s.
    pub(crate) fn users_count(&self) -> usize {
        self.state().users.len()
    }

    /// Returns the number of stored [`Listing`]s.
    pub(crate) fn listings_count(&self) -> usize {
        self.state().listings.len()
    }

    /// Returns the number of stored [`Booking`]s.
    pub(crate) fn bookings_count(&self) -> usize {
        self.state().bookings.len()
    }
}

/// Creates a new [`Service`] over an empty [`Memory`] database.
pub(crate) fn service() -> Service<Memory> {
    service_with(|_| {})
}

/// Creates a new [`Service`] over an empty [`Memory`] database, with its
/// default [`Config`] adjusted by the provided function.
pub(crate) fn service_with(f: impl FnOnce(&mut Config)) -> Service<Memory> {
    let secret = b"test";
    let mut config = Config {
        jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(secret),
        jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(secret),
        session_ttl: Duration::from_secs(30 * 60),
        fees: Fees::default(),
        price_policy: Default::default(),
    };
    f(&mut config);
    Service::new(config, Memory::default())
}

/// Creates a new [`User`] with the provided email, not stored anywhere.
pub(crate) fn user(email: &str) -> User {
    let password = user::Password::new("password").unwrap();
    User {
        id: user::Id::new(),
        name: user::Name::new("Test User").unwrap(),
        email: user::Email::new(email).unwrap(),
        password_hash: user::PasswordHash::new(&password).unwrap(),
        created_at: DateTime::now().coerce(),
    }
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.state().users.iter().find(|u| u.id == id).cloned())
    }
}

impl<'e> Database<Select<By<Option<User>, &'e user::Email>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'e user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        Ok(self
            .state()
            .users
            .iter()
            .find(|u| &u.email == email)
            .cloned())
    }
}

impl Database<Insert<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        state.users.retain(|u| u.id != user.id);
        state.users.push(user);
        Ok(())
    }
}

impl Database<Select<By<Option<Listing>, listing::Id>>> for Memory {
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.state().listings.iter().find(|l| l.id == id).cloned())
    }
}

impl<IDs> Database<Select<By<HashMap<listing::Id, Listing>, IDs>>> for Memory
where
    IDs: AsRef<[listing::Id]>,
{
    type Ok = HashMap<listing::Id, Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<listing::Id, Listing>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        Ok(self
            .state()
            .listings
            .iter()
            .filter(|l| ids.as_ref().contains(&l.id))
            .map(|l| (l.id, l.clone()))
            .collect())
    }
}

impl Database<Select<By<Vec<Listing>, ()>>> for Memory {
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Listing>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().listings.clone())
    }
}

impl Database<Select<By<Vec<Listing>, user::Id>>> for Memory {
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Listing>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let owner_id = by.into_inner();
        Ok(self
            .state()
            .listings
            .iter()
            .filter(|l| l.is_owned_by(owner_id))
            .cloned()
            .collect())
    }
}

impl Database<Select<By<Vec<Listing>, read::listing::list::Filter>>>
    for Memory
{
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Listing>, read::listing::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        Ok(self
            .state()
            .listings
            .iter()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect())
    }
}

impl Database<Insert<Listing>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(listing)).await
    }
}

impl Database<Update<Listing>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(listing): Update<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        if let Some(stored) =
            state.listings.iter_mut().find(|l| l.id == listing.id)
        {
            *stored = listing;
        } else {
            state.listings.push(listing);
        }
        Ok(())
    }
}

impl Database<Lock<By<Listing, listing::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Listing, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Insert<Booking>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.state().bookings.push(booking);
        Ok(())
    }
}

impl Database<Select<By<Vec<Booking>, user::Id>>> for Memory {
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();
        Ok(self
            .state()
            .bookings
            .iter()
            .rev()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }
}
