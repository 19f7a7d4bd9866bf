//! [`Money`]-related definitions.

use std::{fmt, iter::Sum, ops, str::FromStr};

use derive_more::Display;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::{Decimal, RoundingStrategy};

/// Currency-agnostic amount of money.
///
/// May be negative, so arithmetic on degenerate inputs stays observable.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(transparent)
)]
pub struct Money(Decimal);

impl Money {
    /// Zero [`Money`].
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Money`] out of the provided `amount`.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Returns the amount of this [`Money`].
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Indicates whether this [`Money`] is below zero.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Rounds this [`Money`] to whole units, with midpoints away from zero.
    #[must_use]
    pub fn round(self) -> Self {
        Self(self.0.round_dp_with_strategy(
            0,
            RoundingStrategy::MidpointAwayFromZero,
        ))
    }

    /// Adds the `other` [`Money`] to this one.
    ///
    /// [`None`] on overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Multiplies this [`Money`] by the provided `times`.
    ///
    /// [`None`] on overflow.
    #[must_use]
    pub fn checked_mul(self, times: i64) -> Option<Self> {
        self.0.checked_mul(Decimal::from(times)).map(Self)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<i64> for Money {
    fn from(amount: i64) -> Self {
        Self(amount.into())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Money {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() != s || s.is_empty() {
            return Err(ParseError);
        }
        Decimal::from_str(s).map(Self).map_err(|_| ParseError)
    }
}

/// Error of parsing [`Money`] from a string.
#[derive(Clone, Copy, Debug, Display, derive_more::Error)]
#[display("invalid amount")]
pub struct ParseError;

impl ops::Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl ops::Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl ops::Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl ops::Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, ops::Add::add)
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Currency-agnostic amount of money in `{major}.{minor}` format, where
    /// `minor` part is optional.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Money = super::Money;

    impl Money {
        fn to_output<S: ScalarValue>(m: &Money) -> Value<S> {
            Value::scalar(m.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Money` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Money` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::Money;

    fn money(s: &str) -> Money {
        Money::new(s.parse::<Decimal>().unwrap())
    }

    #[test]
    fn from_str() {
        assert_eq!(Money::from_str("123.45").unwrap(), money("123.45"));
        assert_eq!(Money::from_str("123").unwrap(), money("123"));
        assert_eq!(Money::from_str("-5").unwrap(), money("-5"));

        assert!(Money::from_str("").is_err());
        assert!(Money::from_str(" 12").is_err());
        assert!(Money::from_str("123.45USD").is_err());
        assert!(Money::from_str("$123").is_err());
    }

    #[test]
    fn to_string() {
        assert_eq!(money("123.45").to_string(), "123.45");
        assert_eq!(money("123.00").to_string(), "123");
        assert_eq!(money("123.0").to_string(), "123");
        assert_eq!(money("123.50").to_string(), "123.5");
        assert_eq!(money("-40").to_string(), "-40");
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(money("40.6").round(), money("41"));
        assert_eq!(money("40.5").round(), money("41"));
        assert_eq!(money("40.4").round(), money("40"));
        assert_eq!(money("-40.5").round(), money("-41"));
    }

    #[test]
    fn arithmetic() {
        assert_eq!(money("100") * 3 + money("40") * 3, money("420"));
        assert_eq!(money("580") - money("80"), money("500"));
        assert_eq!(
            [money("1.5"), money("2"), money("0.5")]
                .into_iter()
                .sum::<Money>(),
            money("4"),
        );
        assert!(money("-1").is_negative());
        assert!(!Money::ZERO.is_negative());
        assert!(!money("-0").is_negative());
    }

    #[test]
    fn checked_arithmetic() {
        assert_eq!(money("100").checked_mul(3), Some(money("300")));
        assert_eq!(money("0.5").checked_add(money("1")), Some(money("1.5")));

        let max = Money::new(Decimal::MAX);
        assert_eq!(max.checked_add(money("1")), None);
        assert_eq!(max.checked_mul(2), None);
        assert_eq!(max.checked_mul(-1), Some(Money::new(Decimal::MIN)));
    }
}
