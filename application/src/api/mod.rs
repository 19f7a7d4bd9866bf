//! GraphQL API definitions.

pub mod booking;
pub mod listing;
mod mutation;
mod query;
pub mod scalar;
pub mod user;

use std::num::NonZeroU16;

use crate::{define_error, Context};

pub use self::{
    booking::Booking, listing::Listing, mutation::Mutation, query::Query,
    user::User,
};

/// Root of all GraphQL subscriptions.
///
/// None are provided.
pub type Subscription = juniper::EmptySubscription<Context>;

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, Subscription>;

define_error! {
    enum ValidationError {
        #[code = "INVALID_STAY"]
        #[status = BAD_REQUEST]
        #[message = "Check-out date must be after the check-in date"]
        Stay,

        #[code = "INVALID_GUESTS_COUNT"]
        #[status = BAD_REQUEST]
        #[message = "Number of guests must be between 1 and 65535"]
        GuestsCount,

        #[code = "INVALID_UNITS_COUNT"]
        #[status = BAD_REQUEST]
        #[message = "Number of units must be between 1 and 65535"]
        UnitsCount,

        #[code = "INVALID_PRICE"]
        #[status = BAD_REQUEST]
        #[message = "Price must be neither negative nor too large"]
        Price,
    }
}

/// Converts the provided GraphQL `Int` into a positive count, if it fits.
fn count(value: i32) -> Option<NonZeroU16> {
    u16::try_from(value).ok().and_then(NonZeroU16::new)
}

/// Converts the provided number into a GraphQL `Int`, saturating on overflow.
fn int(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value.is_negative() {
        i32::MIN
    } else {
        i32::MAX
    })
}
