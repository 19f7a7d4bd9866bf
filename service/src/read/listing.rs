//! [`Listing`]-related read definitions.

#[cfg(doc)]
use crate::domain::Listing;

pub mod list {
    //! [`Listing`]s list definitions.

    use crate::domain::{listing, Listing};

    /// Filter narrowing a [`Listing`]s list.
    ///
    /// Default [`Filter`] matches all the [`Listing`]s.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`listing::City`] (or its part) to fuzzy search for.
        ///
        /// Matches if any of its words is contained in the [`Listing`] city,
        /// case-insensitively.
        pub city: Option<listing::City>,

        /// Minimal number of guests a [`Listing`] must accommodate.
        pub guests: Option<listing::MaxGuests>,
    }

    impl Filter {
        /// Indicates whether the provided [`Listing`] matches this
        /// [`Filter`].
        #[must_use]
        pub fn matches(&self, listing: &Listing) -> bool {
            let city = self.city.as_ref().is_none_or(|pattern| {
                let city = AsRef::<str>::as_ref(&listing.city).to_lowercase();
                AsRef::<str>::as_ref(pattern)
                    .split_whitespace()
                    .any(|word| city.contains(&word.to_lowercase()))
            });
            let guests = self.guests.is_none_or(|g| listing.max_guests >= g);

            city && guests
        }
    }

    #[cfg(test)]
    mod spec {
        use std::num::NonZeroU16;

        use crate::domain::{
            listing::{self, City},
            user, Listing,
        };

        use super::Filter;

        #[test]
        fn matches() {
            let listing =
                Listing::new(user::Id::new(), listing::spec::details("A", 1));
            let filter = |city: Option<&str>, guests: Option<u16>| Filter {
                city: city.map(|c| City::new(c).unwrap()),
                guests: guests.and_then(NonZeroU16::new),
            };

            assert!(Filter::default().matches(&listing));
            assert!(filter(Some("lisbon"), None).matches(&listing));
            assert!(filter(Some("LIS"), Some(4)).matches(&listing));
            assert!(filter(Some("Porto Lisbon"), Some(1)).matches(&listing));

            assert!(!filter(Some("Porto"), None).matches(&listing));
            assert!(!filter(None, Some(5)).matches(&listing));
        }
    }
}
