//! Storage operations a [`Handler`] may execute.
//!
//! Each operation is a plain wrapper, so a storage implements
//! `Handler<Insert<Booking>>`, `Handler<Select<By<Option<User>, Email>>>`
//! and so on, only for the combinations it actually supports.

use std::marker::PhantomData;

use crate::Handler;

/// Stores a new `T`.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Overwrites a stored `T`.
#[derive(Clone, Copy, Debug)]
pub struct Update<T>(pub T);

/// Reads a `T`, usually a [`By`] selector.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Reads a `T` preventing concurrent modifications of it until the current
/// transaction ends.
#[derive(Clone, Copy, Debug)]
pub struct Lock<T>(pub T);

/// Begins a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// Transactional counterpart of a `T` storage.
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Commits the current transaction.
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Selects a `W`hat by the provided `B` key.
///
/// The same key may select different things, like a single listing or all
/// the bookings of it, so `W` disambiguates them.
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Key to select by.
    key: B,

    /// Selected type.
    _what: PhantomData<W>,
}

impl<W, B> By<W, B> {
    /// Selects a `W` by the provided `key`.
    #[must_use]
    pub fn new(key: B) -> Self {
        Self {
            key,
            _what: PhantomData,
        }
    }

    /// Unwraps the key of this [`By`] selector.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.key
    }
}
