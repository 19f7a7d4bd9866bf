//! [`Booking`]-related definitions.

use common::{Date, DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLObject, GraphQLScalar};
use service::{domain, read};
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    Context,
};

/// A reservation with its `Listing` resolved.
#[derive(Clone, Debug, From, Into)]
pub struct Booking(read::booking::Populated);

impl From<domain::Booking> for Booking {
    fn from(booking: domain::Booking) -> Self {
        Self(read::booking::Populated {
            booking,
            listing: None,
        })
    }
}

/// A reservation of a `Listing` made by a `User`.
#[graphql_object(context = Context)]
impl Booking {
    /// Unique identifier of this `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.booking.id.into()
    }

    /// ID of the booked `Listing`.
    pub fn listing_id(&self) -> api::listing::Id {
        self.0.booking.listing_id.into()
    }

    /// Booked `Listing`.
    ///
    /// `null` if it doesn't exist anymore.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.listing",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn listing(&self) -> Option<api::Listing> {
        self.0.listing.clone().map(Into::into)
    }

    /// `User` who made this `Booking`.
    pub fn user(&self) -> api::User {
        #[expect(unsafe_code, reason = "`Booking` is made by existing `User`")]
        unsafe {
            api::User::new_unchecked(self.0.booking.user_id)
        }
    }

    /// Date of arrival.
    pub fn check_in(&self) -> Date {
        self.0.booking.stay.check_in()
    }

    /// Date of departure.
    pub fn check_out(&self) -> Date {
        self.0.booking.stay.check_out()
    }

    /// Number of nights of this `Booking`.
    pub fn nights(&self) -> i32 {
        api::int(self.0.booking.nights())
    }

    /// Number of guests of this `Booking`.
    pub fn number_of_guests(&self) -> i32 {
        self.0.booking.num_guests.get().into()
    }

    /// Number of units reserved by this `Booking`.
    pub fn units(&self) -> i32 {
        self.0.booking.units.get().into()
    }

    /// Name of the guest this `Booking` is made for.
    pub fn guest_name(&self) -> GuestName {
        self.0.booking.guest_name.clone().into()
    }

    /// Total price captured when this `Booking` was made.
    pub fn price(&self) -> Money {
        self.0.booking.price
    }

    /// Indicator whether this `Booking` is over as of today.
    pub fn is_completed(&self) -> bool {
        self.0.booking.is_completed(Date::today())
    }

    /// Breakdown of taxes and fees on top of the `price`.
    ///
    /// `null` if the `price` is too large to compute it.
    pub fn charges(&self) -> Option<Charges> {
        let b = &self.0.booking;
        domain::pricing::Charges::new(b.price, b.nights(), b.units.get())
            .map(Into::into)
    }

    /// `DateTime` when this `Booking` was created.
    pub fn created_at(&self) -> DateTime {
        self.0.booking.created_at.coerce()
    }
}

/// Unique identifier of a `Booking`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::booking::Id)]
#[into(domain::booking::Id)]
#[graphql(name = "BookingId", transparent)]
pub struct Id(Uuid);

/// Name of a `Booking` guest.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "BookingGuestName",
    with = scalar::Via::<domain::booking::GuestName>,
)]
pub struct GuestName(domain::booking::GuestName);

/// Breakdown of taxes and fees on top of a `Booking` price.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(name = "BookingCharges", context = Context)]
pub struct Charges {
    /// `Booking` price the breakdown is computed from.
    pub subtotal: Money,

    /// Value added tax, 7% of the `subtotal`.
    pub tax: Money,

    /// Tourism fee, 10 per unit per night.
    pub tourism: Money,

    /// Municipality fee, 5% of the `subtotal`.
    pub municipality: Money,

    /// Grand total to pay, rounded to whole units.
    pub total: Money,
}

impl From<domain::pricing::Charges> for Charges {
    fn from(charges: domain::pricing::Charges) -> Self {
        let domain::pricing::Charges {
            subtotal,
            tax,
            tourism,
            municipality,
            total,
        } = charges;
        Self {
            subtotal,
            tax,
            tourism,
            municipality,
            total,
        }
    }
}
