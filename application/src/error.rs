//! [`Error`]-related definitions.

use std::fmt;

use axum_extra::typed_header::TypedHeaderRejection;
use derive_more::Error as StdError;
use juniper::{FieldError, IntoFieldError, Object, Value};
use service::infra::database;
use tracerr::{Trace, Traced};

/// Defines a fieldless error enum, each variant of which converts into an
/// [`Error`] with the provided code, HTTP status and message.
///
/// ```rust,ignore
/// define_error! {
///     enum ListingError {
///         #[code = "LISTING_NOT_EXISTS"]
///         #[status = NOT_FOUND]
///         #[message = "`Listing` does not exist"]
///         NotExists,
///     }
/// }
/// ```
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        #[doc = concat!("`", stringify!($name), "` of the GraphQL API.")]
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                let (code, status) = match err {
                    $(
                        $name::$variant => {
                            ($code, ::http::StatusCode::$status)
                        }
                    )*
                };
                Self::new(code, status, err.to_string())
            }
        }
    };
}

/// Error returned by the GraphQL API.
///
/// Exposed to clients as a GraphQL error with `code` and `backtrace`
/// extensions.
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// Machine-readable [`Code`] of this [`Error`].
    pub code: Code,

    /// [`http::StatusCode`] to respond with if this [`Error`] fails the
    /// request.
    pub status_code: http::StatusCode,

    /// Human-readable description of this [`Error`].
    pub message: String,

    /// Where this [`Error`] has been propagated through, if traced.
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,
}

impl Error {
    /// Creates a new untraced [`Error`].
    #[must_use]
    pub fn new(
        code: Code,
        status_code: http::StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            status_code,
            message: message.into(),
            backtrace: None,
        }
    }

    /// Creates a new `INTERNAL_SERVER_ERROR` out of an unexpected failure.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self::new(
            "INTERNAL_SERVER_ERROR",
            http::StatusCode::INTERNAL_SERVER_ERROR,
            msg.to_string(),
        )
    }

    /// Returns the frames of the [`Trace`] of this [`Error`], if any.
    fn frames(&self) -> impl Iterator<Item = String> + '_ {
        self.backtrace
            .iter()
            .flat_map(|trace| trace.iter())
            .map(ToString::to_string)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {}", self.code, self.message)?;
        for frame in self.frames() {
            write!(f, "\n{frame}")?;
        }
        Ok(())
    }
}

impl<S: From<String>> IntoFieldError<S> for Error {
    fn into_field_error(self) -> FieldError<S> {
        let mut extensions = Object::with_capacity(2);
        _ = extensions.add_field("code", Value::scalar(self.code.to_owned()));
        _ = extensions.add_field(
            "backtrace",
            Value::list(self.frames().map(Value::scalar).collect()),
        );
        FieldError::new(self.message, Value::object(extensions))
    }
}

/// Machine-readable code of an [`Error`], like `LISTING_NOT_EXISTS`.
pub type Code = &'static str;

/// Conversion of a failure into an [`Error`] exposable to clients.
pub trait AsError {
    /// Returns the [`Error`] this failure is exposed as, or [`None`] if it's
    /// an unexpected one.
    fn try_as_error(&self) -> Option<Error>;

    /// Same as [`AsError::try_as_error()`], but exposes unexpected failures
    /// as [`Error::internal()`] ones.
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error().unwrap_or_else(|| Error::internal(&self))
    }

    /// Consuming version of [`AsError::as_error()`].
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        self.as_ref().try_as_error().map(|err| Error {
            backtrace: Some(self.trace().clone()),
            ..err
        })
    }
}

impl AsError for TypedHeaderRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::new(
            "BAD_REQUEST",
            http::StatusCode::BAD_REQUEST,
            self.to_string(),
        ))
    }
}

/// Database failures are never expected.
impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

#[cfg(test)]
mod spec {
    use juniper::{DefaultScalarValue, FieldError, IntoFieldError as _};

    use super::{AsError, Error};

    define_error! {
        enum TestError {
            #[code = "TEST_CONFLICT"]
            #[status = CONFLICT]
            #[message = "Conflicting request"]
            Conflict,
        }
    }

    #[derive(Debug, derive_more::Display)]
    #[display("opaque failure")]
    struct Opaque;

    impl AsError for Opaque {
        fn try_as_error(&self) -> Option<Error> {
            None
        }
    }

    #[test]
    fn defined_error_carries_code_and_status() {
        let err = Error::from(TestError::Conflict);

        assert_eq!(err.code, "TEST_CONFLICT");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "[TEST_CONFLICT]: Conflicting request");
    }

    #[test]
    fn unknown_error_becomes_internal() {
        let err = Opaque.into_error();

        assert_eq!(err.code, "INTERNAL_SERVER_ERROR");
        assert_eq!(err.status_code, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "opaque failure");
    }

    #[test]
    fn field_error_exposes_code() {
        let field: FieldError<DefaultScalarValue> =
            Error::from(TestError::Conflict).into_field_error();

        assert_eq!(field.message(), "Conflicting request");
        let code = field
            .extensions()
            .as_object_value()
            .and_then(|ext| ext.get_field_value("code"))
            .and_then(|code| code.as_string_value());
        assert_eq!(code, Some("TEST_CONFLICT"));
    }
}
