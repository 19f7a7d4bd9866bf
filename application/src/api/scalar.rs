//! GraphQL scalar definitions.

use std::{fmt, marker::PhantomData, str::FromStr};

use juniper::{
    GraphQLType, InputValue, ParseScalarResult, ParseScalarValue, ScalarToken,
    ScalarValue, Value,
};

/// Helper type to use in `#[graphql(with = ..)]` attribute.
///
/// Represents a wrapper over a validated domain `As` type as a GraphQL string
/// scalar, so the validation happens while parsing the input.
///
/// Wrapper type must implement [`From`] and [`AsRef`] for `As` type.
#[derive(Debug)]
pub struct Via<As>(PhantomData<As>);

impl<As> Via<As> {
    /// Converts the wrapper into a scalar [`Value`] via [`fmt::Display`] of
    /// the wrapped `As` type.
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        As: fmt::Display,
        T: AsRef<As>,
        S: ScalarValue,
    {
        Value::from(value.as_ref().to_string())
    }

    /// Parses the wrapper from a scalar [`InputValue`] via [`FromStr`] of the
    /// wrapped `As` type.
    ///
    /// # Errors
    ///
    /// If the input value is not a string, or it doesn't represent a valid
    /// `As` type.
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        As: FromStr,
        As::Err: fmt::Display,
        T: From<As> + GraphQLType<S, TypeInfo = ()>,
        S: ScalarValue,
    {
        let name = T::name(&()).unwrap_or_default();
        let s = input.as_string_value().ok_or_else(|| {
            format!(
                "Cannot parse input scalar `{name}`: expected string input \
                 value, found: {input}",
            )
        })?;
        s.parse::<As>().map(T::from).map_err(|e| {
            format!("Cannot parse input scalar `{name}` from \"{s}\": {e}")
        })
    }

    /// Parses the provided [`ScalarToken`] as a string.
    ///
    /// # Errors
    ///
    /// If the token is not a string.
    pub fn parse_token<S: ScalarValue>(
        value: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <String as ParseScalarValue<S>>::from_str(value)
    }
}

#[cfg(test)]
mod spec {
    use juniper::{DefaultScalarValue, InputValue};

    use crate::api::listing::City;

    use super::Via;

    type Scalar = DefaultScalarValue;

    #[test]
    fn parses_valid_input() {
        let city: City = Via::<service::domain::listing::City>::from_input(
            &InputValue::<Scalar>::scalar("Lisbon"),
        )
        .unwrap();

        assert_eq!(city.to_string(), "Lisbon");
    }

    #[test]
    fn rejects_invalid_input() {
        let err = Via::<service::domain::listing::City>::from_input::<City, _>(
            &InputValue::<Scalar>::scalar(""),
        )
        .unwrap_err();
        assert!(err.contains("ListingCity"), "{err}");

        let err = Via::<service::domain::listing::City>::from_input::<City, _>(
            &InputValue::<Scalar>::scalar(1),
        )
        .unwrap_err();
        assert!(err.contains("expected string"), "{err}");
    }
}
