//! [`Booking`] definitions.

use std::num::NonZeroU16;

#[cfg(doc)]
use common::DateTime;
use common::{unit, Date, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::{Listing, User};
use crate::domain::{listing, text::define_text, user};

/// Reservation of a [`Listing`] by a [`User`] for a [`Stay`].
///
/// Immutable once created.
#[derive(Clone, Debug)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// ID of the booked [`Listing`].
    pub listing_id: listing::Id,

    /// ID of the [`User`] who made this [`Booking`].
    pub user_id: user::Id,

    /// [`Stay`] of this [`Booking`].
    pub stay: Stay,

    /// Number of guests of this [`Booking`].
    pub num_guests: GuestsCount,

    /// Number of identical units reserved by this [`Booking`].
    pub units: UnitsCount,

    /// [`GuestName`] to display for this [`Booking`].
    pub guest_name: GuestName,

    /// Total price captured when this [`Booking`] was made.
    pub price: Money,

    /// [`DateTime`] when this [`Booking`] was created.
    pub created_at: CreationDateTime,
}

impl Booking {
    /// Returns the number of nights of this [`Booking`].
    #[must_use]
    pub fn nights(&self) -> i64 {
        self.stay.nights()
    }

    /// Indicates whether this [`Booking`] is over as of the provided `today`.
    ///
    /// Derived at read time and never persisted.
    #[must_use]
    pub fn is_completed(&self, today: Date) -> bool {
        self.stay.check_out < today
    }
}

/// ID of a [`Booking`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Check-in and check-out [`Date`]s of a [`Booking`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Stay {
    /// [`Date`] of arrival.
    check_in: Date,

    /// [`Date`] of departure, strictly after the `check_in`.
    check_out: Date,
}

impl Stay {
    /// Creates a new [`Stay`] if the `check_out` is strictly after the
    /// `check_in`.
    #[must_use]
    pub fn new(check_in: Date, check_out: Date) -> Option<Self> {
        (check_out > check_in).then_some(Self {
            check_in,
            check_out,
        })
    }

    /// Returns the check-in [`Date`] of this [`Stay`].
    #[must_use]
    pub const fn check_in(&self) -> Date {
        self.check_in
    }

    /// Returns the check-out [`Date`] of this [`Stay`].
    #[must_use]
    pub const fn check_out(&self) -> Date {
        self.check_out
    }

    /// Returns the number of nights of this [`Stay`], always positive.
    #[must_use]
    pub fn nights(&self) -> i64 {
        self.check_in.days_until(self.check_out)
    }
}

/// Number of guests of a [`Booking`].
pub type GuestsCount = NonZeroU16;

/// Number of units reserved by a [`Booking`].
pub type UnitsCount = NonZeroU16;

define_text! {
    #[doc = "Name of a [`Booking`] guest, as entered on reservation."]
    struct GuestName { max_len: 512, non_empty: true, trimmed: true }
}

/// [`DateTime`] when a [`Booking`] was created.
pub type CreationDateTime = DateTimeOf<(Booking, unit::Creation)>;
