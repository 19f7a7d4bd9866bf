//! Domain definitions.

pub mod booking;
pub mod listing;
pub mod pricing;
mod text;
pub mod user;

pub use self::{booking::Booking, listing::Listing, user::User};
