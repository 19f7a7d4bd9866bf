//! Macro for defining textual newtypes.

/// Defines a [`String`] newtype with `new()`, `new_unchecked()` and
/// [`FromStr`] constructors.
///
/// Options:
/// - `max_len` is the maximum length in bytes;
/// - `non_empty` rejects empty values;
/// - `trimmed` rejects values with leading or trailing whitespace.
///
/// # Example
///
/// ```rust,ignore
/// define_text! {
///     #[doc = "Title of a listing."]
///     struct Title { max_len: 256, non_empty: true, trimmed: true }
/// }
/// ```
///
/// [`FromStr`]: std::str::FromStr
macro_rules! define_text {
    (
        #[doc = $doc:literal]
        struct $name:ident {
            max_len: $max_len:literal,
            non_empty: $non_empty:literal,
            trimmed: $trimmed:literal $(,)?
        }
    ) => {
        #[doc = $doc]
        #[derive(
            ::derive_more::AsRef,
            Clone,
            Debug,
            ::derive_more::Display,
            Eq,
            Hash,
            PartialEq,
        )]
        #[as_ref(str, String)]
        #[cfg_attr(
            feature = "postgres",
            derive(::postgres_types::FromSql, ::postgres_types::ToSql),
            postgres(transparent)
        )]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new [`", stringify!($name), "`].")]
            ///
            /// # Safety
            ///
            /// The caller must ensure that the given `value` matches the
            /// format.
            #[expect(unsafe_code, reason = "bypass")]
            #[must_use]
            pub unsafe fn new_unchecked(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[doc = concat!(
                "Creates a new [`", stringify!($name), "`] if the given ",
                "`value` is valid.",
            )]
            #[must_use]
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let value = value.into();
                Self::check(&value).then_some(Self(value))
            }

            #[doc = concat!(
                "Checks whether the given `value` is a valid [`",
                stringify!($name), "`].",
            )]
            fn check(value: impl AsRef<str>) -> bool {
                let value = value.as_ref();
                (!$trimmed || value.trim() == value)
                    && (!$non_empty || !value.is_empty())
                    && value.len() <= $max_len
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s).ok_or(concat!("invalid `", stringify!($name), "`"))
            }
        }
    };
}

pub(crate) use define_text;
