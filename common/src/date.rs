//! Calendar [`Date`] without time and offset.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{fmt, str::FromStr};

#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::Month;

use crate::DateTime;

/// Calendar date in the proleptic Gregorian calendar.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Date(time::Date);

impl Date {
    /// Creates a new [`Date`] out of the provided components.
    ///
    /// [`None`] is returned if the components don't form a valid date.
    #[must_use]
    pub fn from_ymd(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = Month::try_from(month).ok()?;
        time::Date::from_calendar_date(year, month, day).ok().map(Self)
    }

    /// Returns the current UTC [`Date`].
    #[must_use]
    pub fn today() -> Self {
        DateTime::now().date()
    }

    /// Returns the number of calendar days from this [`Date`] to the `other`
    /// one.
    ///
    /// Negative if the `other` [`Date`] is earlier.
    #[must_use]
    pub fn days_until(self, other: Self) -> i64 {
        (other.0 - self.0).whole_days()
    }
}

impl From<time::Date> for Date {
    fn from(date: time::Date) -> Self {
        Self(date)
    }
}

impl From<Date> for time::Date {
    fn from(date: Date) -> Self {
        date.0
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day(),
        )
    }
}

impl FromStr for Date {
    type Err = &'static str;

    /// Parses a `YYYY-MM-DD` string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '-');
        let (Some(year), Some(month), Some(day)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err("expected `YYYY-MM-DD` format");
        };
        if year.len() != 4 || month.len() != 2 || day.len() != 2 {
            return Err("expected `YYYY-MM-DD` format");
        }

        let year = year.parse().map_err(|_| "invalid year")?;
        let month = month.parse().map_err(|_| "invalid month")?;
        let day = day.parse().map_err(|_| "invalid day")?;
        Self::from_ymd(year, month, day).ok_or("date out of range")
    }
}

#[cfg(feature = "postgres")]
impl FromSql<'_> for Date {
    accepts!(DATE);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::Date::from_sql(ty, raw).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl ToSql for Date {
    accepts!(DATE);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.0.to_sql(ty, w)
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Calendar date in a `YYYY-MM-DD` format.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Date = super::Date;

    impl Date {
        fn to_output<S: ScalarValue>(d: &Date) -> Value<S> {
            Value::scalar(d.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Date` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Date` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use super::Date;

    #[test]
    fn from_str() {
        assert_eq!(
            Date::from_str("2024-01-10").unwrap(),
            Date::from_ymd(2024, 1, 10).unwrap(),
        );
        assert_eq!(
            Date::from_str("2024-02-29").unwrap(),
            Date::from_ymd(2024, 2, 29).unwrap(),
        );

        assert!(Date::from_str("2023-02-29").is_err());
        assert!(Date::from_str("2024-1-10").is_err());
        assert!(Date::from_str("2024-01").is_err());
        assert!(Date::from_str("10.01.2024").is_err());
        assert!(Date::from_str("").is_err());
    }

    #[test]
    fn to_string() {
        assert_eq!(
            Date::from_ymd(2024, 1, 10).unwrap().to_string(),
            "2024-01-10",
        );
        assert_eq!(
            Date::from_ymd(999, 12, 1).unwrap().to_string(),
            "0999-12-01",
        );
    }

    #[test]
    fn days_until() {
        let jan10 = Date::from_ymd(2024, 1, 10).unwrap();
        let jan13 = Date::from_ymd(2024, 1, 13).unwrap();
        let mar1 = Date::from_ymd(2024, 3, 1).unwrap();

        assert_eq!(jan10.days_until(jan13), 3);
        assert_eq!(jan10.days_until(jan10), 0);
        assert_eq!(jan13.days_until(jan10), -3);
        assert_eq!(jan10.days_until(mar1), 51);
    }
}
