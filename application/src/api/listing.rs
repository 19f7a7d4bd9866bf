//! [`Listing`]-related definitions.

use common::{DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::domain::{self, pricing};
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    Context,
};

/// A rentable property.
#[derive(Clone, Debug, From, Into)]
pub struct Listing(domain::Listing);

/// A rentable property published by its owning `User`.
#[graphql_object(context = Context)]
impl Listing {
    /// Unique identifier of this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// `User` owning this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.owner",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn owner(&self) -> api::User {
        #[expect(unsafe_code, reason = "owner is referenced by `Listing`")]
        unsafe {
            api::User::new_unchecked(self.0.owner_id)
        }
    }

    /// Title of this `Listing`.
    pub fn title(&self) -> Title {
        self.0.title.clone().into()
    }

    /// Street address of this `Listing`.
    pub fn address(&self) -> Address {
        self.0.address.clone().into()
    }

    /// City this `Listing` is located in.
    pub fn city(&self) -> City {
        self.0.city.clone().into()
    }

    /// Contact phone of this `Listing` host.
    pub fn phone(&self) -> Phone {
        self.0.phone.clone().into()
    }

    /// Description of this `Listing`.
    pub fn description(&self) -> Description {
        self.0.description.clone().into()
    }

    /// Amenities offered by this `Listing`, without duplicates.
    pub fn perks(&self) -> Vec<Perk> {
        self.0.perks.iter().cloned().map(Into::into).collect()
    }

    /// Additional notes of this `Listing`, possibly empty.
    pub fn extra_info(&self) -> ExtraInfo {
        self.0.extra_info.clone().into()
    }

    /// Check-in hour of this `Listing`.
    pub fn check_in(&self) -> Hour {
        self.0.check_in.clone().into()
    }

    /// Check-out hour of this `Listing`.
    pub fn check_out(&self) -> Hour {
        self.0.check_out.clone().into()
    }

    /// Maximum number of guests this `Listing` accommodates.
    pub fn max_guests(&self) -> i32 {
        self.0.max_guests.get().into()
    }

    /// Nightly rate of this `Listing`.
    pub fn price(&self) -> Money {
        self.0.price.amount()
    }

    /// Photos of this `Listing`, in display order.
    pub fn photos(&self) -> Vec<Photo> {
        self.0.photos.iter().cloned().map(Into::into).collect()
    }

    /// `DateTime` when this `Listing` was created.
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `Listing`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::listing::Id)]
#[into(domain::listing::Id)]
#[graphql(name = "ListingId", transparent)]
pub struct Id(Uuid);

/// Title of a `Listing`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingTitle",
    with = scalar::Via::<domain::listing::Title>,
)]
pub struct Title(domain::listing::Title);

/// Street address of a `Listing`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingAddress",
    with = scalar::Via::<domain::listing::Address>,
)]
pub struct Address(domain::listing::Address);

/// City of a `Listing`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingCity",
    with = scalar::Via::<domain::listing::City>,
)]
pub struct City(domain::listing::City);

/// Contact phone of a `Listing`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingPhone",
    with = scalar::Via::<domain::listing::Phone>,
)]
pub struct Phone(domain::listing::Phone);

/// Description of a `Listing`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingDescription",
    with = scalar::Via::<domain::listing::Description>,
)]
pub struct Description(domain::listing::Description);

/// Additional notes of a `Listing`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingExtraInfo",
    with = scalar::Via::<domain::listing::ExtraInfo>,
)]
pub struct ExtraInfo(domain::listing::ExtraInfo);

/// Check-in or check-out hour of a `Listing`, in any format (`14:00`).
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingHour",
    with = scalar::Via::<domain::listing::Hour>,
)]
pub struct Hour(domain::listing::Hour);

/// Amenity tag of a `Listing`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingPerk",
    with = scalar::Via::<domain::listing::Perk>,
)]
pub struct Perk(domain::listing::Perk);

/// Reference to a `Listing` photo.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingPhoto",
    with = scalar::Via::<domain::listing::Photo>,
)]
pub struct Photo(domain::listing::Photo);

/// Itemised price of a prospective stay.
#[derive(Clone, Copy, Debug, From, Into)]
pub struct Quote(pricing::Quote);

/// Itemised price of a prospective stay at a `Listing`.
#[graphql_object(name = "BookingQuote", context = Context)]
impl Quote {
    /// Number of quoted nights.
    ///
    /// Zero or negative if the check-out is not after the check-in.
    pub fn nights(&self) -> i32 {
        api::int(self.0.nights)
    }

    /// Number of quoted units.
    pub fn units(&self) -> i32 {
        self.0.units.into()
    }

    /// Nightly rate multiplied by nights and units.
    pub fn accommodation(&self) -> Money {
        self.0.accommodation
    }

    /// Cleaning fee multiplied by nights and units.
    pub fn cleaning(&self) -> Money {
        self.0.cleaning
    }

    /// Flat service fee.
    pub fn service(&self) -> Money {
        self.0.service
    }

    /// Total price of the stay.
    pub fn total(&self) -> Money {
        self.0.total
    }
}
