//! [`Booking`]-related read definitions.

use crate::domain::{Booking, Listing};

/// [`Booking`] with its [`Listing`] resolved.
#[derive(Clone, Debug)]
pub struct Populated {
    /// [`Booking`] itself.
    pub booking: Booking,

    /// [`Listing`] of the [`Booking`].
    ///
    /// [`None`] if it doesn't resolve anymore.
    pub listing: Option<Listing>,
}
