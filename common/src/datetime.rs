//! Date and time utilities.

use std::{cmp::Ordering, fmt, marker::PhantomData, ops, str::FromStr};

use derive_more::{Display, Error};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::Date;

/// Untyped date and time.
pub type DateTime = DateTimeOf;

/// Instant in UTC, truncated to microseconds, tagged with the kind `Of` what
/// it describes.
///
/// Kinds prevent mixing up instants of different meaning (creation of a
/// user with an expiration of a session, for example), while
/// [`DateTimeOf::coerce()`] converts between them explicitly.
pub struct DateTimeOf<Of: ?Sized = ()> {
    /// UTC instant.
    utc: OffsetDateTime,

    /// Kind of this instant.
    kind: PhantomData<Of>,
}

impl<Of: ?Sized> DateTimeOf<Of> {
    /// Normalizes the provided instant into a [`DateTimeOf`].
    fn normalized(dt: OffsetDateTime) -> Self {
        let utc = dt.to_offset(time::UtcOffset::UTC);
        let micros = utc.nanosecond() / 1_000 * 1_000;
        Self {
            utc: utc.replace_nanosecond(micros).unwrap_or(utc),
            kind: PhantomData,
        }
    }

    /// Returns the current instant.
    #[must_use]
    pub fn now() -> Self {
        Self::normalized(OffsetDateTime::now_utc())
    }

    /// Creates a new [`DateTimeOf`] out of the provided Unix timestamp in
    /// seconds.
    ///
    /// [`None`] is returned if the timestamp is out of range.
    #[must_use]
    pub fn from_unix_timestamp(secs: i64) -> Option<Self> {
        OffsetDateTime::from_unix_timestamp(secs)
            .ok()
            .map(Self::normalized)
    }

    /// Returns the Unix timestamp of this [`DateTimeOf`] in seconds.
    #[must_use]
    pub fn unix_timestamp(&self) -> i64 {
        self.utc.unix_timestamp()
    }

    /// Returns the UTC calendar [`Date`] of this [`DateTimeOf`].
    #[must_use]
    pub fn date(&self) -> Date {
        self.utc.date().into()
    }

    /// Reinterprets this [`DateTimeOf`] as another kind.
    #[must_use]
    pub fn coerce<To: ?Sized>(self) -> DateTimeOf<To> {
        DateTimeOf {
            utc: self.utc,
            kind: PhantomData,
        }
    }
}

/// Error of parsing a [`DateTime`] out of an [RFC 3339] string.
///
/// [RFC 3339]: https://tools.ietf.org/html/rfc3339
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("invalid RFC 3339 date and time: {_0}")]
pub struct ParseError(time::error::Parse);

/// Parses an [RFC 3339] string with any offset.
///
/// [RFC 3339]: https://tools.ietf.org/html/rfc3339
impl<Of: ?Sized> FromStr for DateTimeOf<Of> {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OffsetDateTime::parse(s, &Rfc3339)
            .map(Self::normalized)
            .map_err(ParseError)
    }
}

/// Formats as an [RFC 3339] string in UTC.
///
/// [RFC 3339]: https://tools.ietf.org/html/rfc3339
impl<Of: ?Sized> fmt::Display for DateTimeOf<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.utc.format(&Rfc3339).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

impl<Of: ?Sized> fmt::Debug for DateTimeOf<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DateTime({self})")
    }
}

impl<Of: ?Sized> Copy for DateTimeOf<Of> {}
impl<Of: ?Sized> Clone for DateTimeOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateTimeOf<Of> {}
impl<Of: ?Sized> PartialEq for DateTimeOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.utc == other.utc
    }
}

impl<Of: ?Sized> Ord for DateTimeOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.utc.cmp(&other.utc)
    }
}
impl<Of: ?Sized> PartialOrd for DateTimeOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Of: ?Sized> From<OffsetDateTime> for DateTimeOf<Of> {
    fn from(dt: OffsetDateTime) -> Self {
        Self::normalized(dt)
    }
}

impl<Of: ?Sized> From<DateTimeOf<Of>> for OffsetDateTime {
    fn from(dt: DateTimeOf<Of>) -> Self {
        dt.utc
    }
}

impl<Of: ?Sized> ops::Add<std::time::Duration> for DateTimeOf<Of> {
    type Output = Self;

    fn add(self, rhs: std::time::Duration) -> Self::Output {
        Self::normalized(self.utc + rhs)
    }
}

impl<Of: ?Sized> ops::Sub<std::time::Duration> for DateTimeOf<Of> {
    type Output = Self;

    fn sub(self, rhs: std::time::Duration) -> Self::Output {
        Self::normalized(self.utc - rhs)
    }
}

#[cfg(feature = "postgres")]
mod postgres {
    //! Module providing integration with [`postgres_types`] crate.

    use std::error::Error as StdError;

    use postgres_types::{
        accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql,
        Type,
    };
    use time::OffsetDateTime;

    use super::DateTimeOf;

    impl<Of: ?Sized> FromSql<'_> for DateTimeOf<Of> {
        accepts!(TIMESTAMPTZ);

        fn from_sql(
            ty: &Type,
            raw: &[u8],
        ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
            OffsetDateTime::from_sql(ty, raw).map(Self::normalized)
        }
    }

    impl<Of: ?Sized> ToSql for DateTimeOf<Of> {
        accepts!(TIMESTAMPTZ);
        to_sql_checked!();

        fn to_sql(
            &self,
            ty: &Type,
            w: &mut BytesMut,
        ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
            self.utc.to_sql(ty, w)
        }
    }
}

#[cfg(feature = "serde")]
pub mod serde {
    //! Module providing integration with [`serde`] crate.

    pub mod unix_timestamp {
        //! (De)serialization of a [`DateTimeOf`] as a Unix timestamp in
        //! seconds, as [JWT] `exp` claim is.
        //!
        //! [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
        //! [`DateTimeOf`]: crate::DateTimeOf

        use serde::{
            de::Error as _, Deserialize as _, Deserializer, Serializer,
        };

        use crate::DateTimeOf;

        /// Serializes the provided [`DateTimeOf`] as a Unix timestamp.
        ///
        /// # Errors
        ///
        /// If the `serializer` fails.
        pub fn serialize<Of, S>(
            dt: &DateTimeOf<Of>,
            serializer: S,
        ) -> Result<S::Ok, S::Error>
        where
            Of: ?Sized,
            S: Serializer,
        {
            serializer.serialize_i64(dt.unix_timestamp())
        }

        /// Deserializes a [`DateTimeOf`] from a Unix timestamp.
        ///
        /// # Errors
        ///
        /// If the timestamp is not an integer or is out of range.
        pub fn deserialize<'de, Of, D>(
            deserializer: D,
        ) -> Result<DateTimeOf<Of>, D::Error>
        where
            Of: ?Sized,
            D: Deserializer<'de>,
        {
            let secs = i64::deserialize(deserializer)?;
            DateTimeOf::from_unix_timestamp(secs).ok_or_else(|| {
                D::Error::custom(format!("`{secs}` timestamp is out of range"))
            })
        }
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Instant in [RFC 3339] format, in UTC with microsecond precision.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    #[graphql_scalar(with = Self, parse_token(String))]
    type DateTime = crate::DateTime;

    impl DateTime {
        fn to_output<S: ScalarValue>(dt: &DateTime) -> Value<S> {
            Value::scalar(dt.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            let s = input.as_string_value().ok_or_else(|| {
                format!("Expected `DateTime` string, found: {input}")
            })?;
            s.parse().map_err(|e| format!("Cannot parse `DateTime`: {e}"))
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use crate::Date;

    use super::DateTime;

    #[test]
    fn rfc3339_is_normalized_to_utc() {
        let dt = "2024-01-10T23:30:00.1234567+02:00"
            .parse::<DateTime>()
            .unwrap();

        assert_eq!(dt.to_string(), "2024-01-10T21:30:00.123456Z");
        assert_eq!(dt.date(), Date::from_ymd(2024, 1, 10).unwrap());
    }

    #[test]
    fn date_follows_utc_midnight() {
        let dt = "2024-01-10T23:30:00Z".parse::<DateTime>().unwrap();

        assert_eq!(
            (dt + Duration::from_secs(60 * 60)).date(),
            Date::from_ymd(2024, 1, 11).unwrap(),
        );
        assert!(dt - Duration::from_secs(1) < dt);
    }

    #[test]
    fn unix_timestamp_drops_subseconds() {
        let dt = "2024-01-10T00:00:00.5Z".parse::<DateTime>().unwrap();

        let secs = dt.unix_timestamp();
        assert_eq!(secs, 1_704_844_800);
        assert_eq!(
            DateTime::from_unix_timestamp(secs).unwrap().to_string(),
            "2024-01-10T00:00:00Z",
        );
    }
}
