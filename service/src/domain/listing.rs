//! [`Listing`] definitions.

use std::num::NonZeroU16;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{text::define_text, user};
#[cfg(doc)]
use crate::domain::User;

/// Rentable property published by its owning [`User`].
#[derive(Clone, Debug)]
pub struct Listing {
    /// ID of this [`Listing`].
    pub id: Id,

    /// ID of the [`User`] owning this [`Listing`].
    pub owner_id: user::Id,

    /// [`Title`] of this [`Listing`].
    pub title: Title,

    /// [`Address`] of this [`Listing`].
    pub address: Address,

    /// [`City`] this [`Listing`] is located in.
    pub city: City,

    /// Contact [`Phone`] of this [`Listing`].
    pub phone: Phone,

    /// [`Description`] of this [`Listing`].
    pub description: Description,

    /// [`Perks`] offered by this [`Listing`].
    pub perks: Perks,

    /// [`ExtraInfo`] of this [`Listing`].
    pub extra_info: ExtraInfo,

    /// Check-in [`Hour`] of this [`Listing`].
    pub check_in: Hour,

    /// Check-out [`Hour`] of this [`Listing`].
    pub check_out: Hour,

    /// Maximum number of guests this [`Listing`] accommodates.
    pub max_guests: MaxGuests,

    /// Nightly [`Price`] of this [`Listing`].
    pub price: Price,

    /// [`Photo`]s of this [`Listing`], in display order.
    pub photos: Vec<Photo>,

    /// [`DateTime`] when this [`Listing`] was created.
    pub created_at: CreationDateTime,
}

impl Listing {
    /// Creates a new [`Listing`] owned by the provided [`User`].
    #[must_use]
    pub fn new(owner_id: user::Id, details: Details) -> Self {
        let Details {
            title,
            address,
            city,
            phone,
            description,
            perks,
            extra_info,
            check_in,
            check_out,
            max_guests,
            price,
            photos,
        } = details;

        Self {
            id: Id::new(),
            owner_id,
            title,
            address,
            city,
            phone,
            description,
            perks,
            extra_info,
            check_in,
            check_out,
            max_guests,
            price,
            photos,
            created_at: common::DateTime::now().coerce(),
        }
    }

    /// Overwrites all the mutable fields of this [`Listing`] with the
    /// provided [`Details`].
    pub fn update(&mut self, details: Details) {
        let Details {
            title,
            address,
            city,
            phone,
            description,
            perks,
            extra_info,
            check_in,
            check_out,
            max_guests,
            price,
            photos,
        } = details;

        self.title = title;
        self.address = address;
        self.city = city;
        self.phone = phone;
        self.description = description;
        self.perks = perks;
        self.extra_info = extra_info;
        self.check_in = check_in;
        self.check_out = check_out;
        self.max_guests = max_guests;
        self.price = price;
        self.photos = photos;
    }

    /// Indicates whether the provided [`User`] owns this [`Listing`].
    #[must_use]
    pub fn is_owned_by(&self, user_id: user::Id) -> bool {
        self.owner_id == user_id
    }
}

/// Owner-editable fields of a [`Listing`].
#[derive(Clone, Debug)]
pub struct Details {
    /// [`Title`] of a [`Listing`].
    pub title: Title,

    /// [`Address`] of a [`Listing`].
    pub address: Address,

    /// [`City`] of a [`Listing`].
    pub city: City,

    /// Contact [`Phone`] of a [`Listing`].
    pub phone: Phone,

    /// [`Description`] of a [`Listing`].
    pub description: Description,

    /// [`Perks`] of a [`Listing`].
    pub perks: Perks,

    /// [`ExtraInfo`] of a [`Listing`].
    pub extra_info: ExtraInfo,

    /// Check-in [`Hour`] of a [`Listing`].
    pub check_in: Hour,

    /// Check-out [`Hour`] of a [`Listing`].
    pub check_out: Hour,

    /// Maximum number of guests of a [`Listing`].
    pub max_guests: MaxGuests,

    /// Nightly [`Price`] of a [`Listing`].
    pub price: Price,

    /// [`Photo`]s of a [`Listing`].
    pub photos: Vec<Photo>,
}

/// ID of a [`Listing`].
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
    Ord,
    PartialEq,
    PartialOrd,
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

define_text! {
    #[doc = "Title of a [`Listing`]."]
    struct Title { max_len: 256, non_empty: true, trimmed: true }
}

define_text! {
    #[doc = "Street address of a [`Listing`]."]
    struct Address { max_len: 512, non_empty: true, trimmed: true }
}

define_text! {
    #[doc = "City a [`Listing`] is located in."]
    struct City { max_len: 128, non_empty: true, trimmed: true }
}

define_text! {
    #[doc = "Contact phone of a [`Listing`] host, in any format."]
    struct Phone { max_len: 64, non_empty: true, trimmed: true }
}

define_text! {
    #[doc = "Free-form description of a [`Listing`]."]
    struct Description { max_len: 8192, non_empty: true, trimmed: false }
}

define_text! {
    #[doc = "Additional free-form notes of a [`Listing`], possibly empty."]
    struct ExtraInfo { max_len: 8192, non_empty: false, trimmed: false }
}

define_text! {
    #[doc = "Check-in or check-out hour marker of a [`Listing`] (`14:00`)."]
    struct Hour { max_len: 32, non_empty: true, trimmed: true }
}

define_text! {
    #[doc = "Amenity tag of a [`Listing`] (`wifi`, `parking`)."]
    struct Perk { max_len: 64, non_empty: true, trimmed: true }
}

define_text! {
    #[doc = "Reference to a [`Listing`] photo: an URL or a file name."]
    struct Photo { max_len: 2048, non_empty: true, trimmed: true }
}

/// Set of [`Perk`]s of a [`Listing`], preserving the first-seen order.
#[derive(AsRef, Clone, Debug, Default, Eq, PartialEq)]
#[as_ref(forward)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Perks(Vec<Perk>);

impl Perks {
    /// Creates new [`Perks`] out of the provided ones, dropping duplicates.
    #[must_use]
    pub fn new(perks: impl IntoIterator<Item = Perk>) -> Self {
        let mut unique = Vec::<Perk>::new();
        for perk in perks {
            if !unique.contains(&perk) {
                unique.push(perk);
            }
        }
        Self(unique)
    }

    /// Returns an iterator over these [`Perks`].
    pub fn iter(&self) -> impl Iterator<Item = &Perk> {
        self.0.iter()
    }
}

impl FromIterator<Perk> for Perks {
    fn from_iter<I: IntoIterator<Item = Perk>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Maximum number of guests a [`Listing`] accommodates.
pub type MaxGuests = NonZeroU16;

/// Nightly rate of a [`Listing`], never negative.
#[derive(Clone, Copy, Debug, Display, Eq, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Price(Money);

impl Price {
    /// Creates a new [`Price`] if the given `amount` is not negative.
    #[must_use]
    pub fn new(amount: Money) -> Option<Self> {
        (!amount.is_negative()).then_some(Self(amount))
    }

    /// Returns the [`Money`] amount of this [`Price`].
    #[must_use]
    pub const fn amount(self) -> Money {
        self.0
    }
}

/// [`DateTime`] when a [`Listing`] was created.
pub type CreationDateTime = DateTimeOf<(Listing, unit::Creation)>;
