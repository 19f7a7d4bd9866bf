//! [`Percent`]-related definitions.

use std::str::FromStr;

use derive_more::Display;
use rust_decimal::Decimal;

use crate::Money;

/// Floating-point percentage.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub struct Percent(Decimal);

impl Percent {
    /// Creates a new [`Percent`] by checking the provided value lies within
    /// `0..=100` range.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        if val < Decimal::ZERO || val > Decimal::ONE_HUNDRED {
            None
        } else {
            #[expect(
                clippy::allow_attributes,
                reason = "TODO: Remove once clippy is fixed"
            )]
            #[allow(unsafe_code, reason = "invariants checked already")]
            Some(unsafe { Self::new_unchecked(val) })
        }
    }

    /// Creates a new [`Percent`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The provided value must lie within `0..=100` range.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(val: Decimal) -> Self {
        Self(val)
    }

    /// Calculates this [`Percent`] of the provided [`Money`] amount.
    #[must_use]
    pub fn of(self, amount: Money) -> Money {
        amount * (self.0 / Decimal::ONE_HUNDRED)
    }
}

impl FromStr for Percent {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid percent value")
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::Money;

    use super::Percent;

    #[test]
    fn bounds() {
        assert!(Percent::new(Decimal::ZERO).is_some());
        assert!(Percent::new(Decimal::ONE_HUNDRED).is_some());
        assert!(Percent::new(Decimal::NEGATIVE_ONE).is_none());
        assert!(Percent::new(Decimal::new(1001, 1)).is_none());
        assert!("7".parse::<Percent>().is_ok());
        assert!("abc".parse::<Percent>().is_err());
    }

    #[test]
    fn of() {
        let seven = Percent::new(Decimal::new(7, 0)).unwrap();
        let five = Percent::new(Decimal::new(5, 0)).unwrap();

        assert_eq!(
            seven.of(Money::from(580_i64)),
            Money::new(Decimal::new(406, 1)),
        );
        assert_eq!(five.of(Money::from(580_i64)), Money::from(29_i64));
        assert_eq!(five.of(Money::ZERO), Money::ZERO);
    }
}
