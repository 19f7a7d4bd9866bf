//! [`User`] definitions.

pub mod session;

use std::sync::LazyLock;

use argon2::{
    password_hash::{
        self, rand_core::OsRng, PasswordHasher as _, PasswordVerifier as _,
        SaltString,
    },
    Argon2,
};
#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::text::define_text;

pub use self::session::Session;

/// Guest or host of the platform.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`]
    pub id: Id,

    /// [`Name`] of this [`User`].
    pub name: Name,

    /// [`Email`] of this [`User`], unique across all [`User`]s.
    pub email: Email,

    /// [`PasswordHash`] of this [`User`].
    pub password_hash: PasswordHash,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`User`].
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
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Generates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_text! {
    #[doc = "Display name of a [`User`]."]
    struct Name { max_len: 512, non_empty: true, trimmed: true }
}

/// Maximum length of an [`Email`] in bytes.
const EMAIL_MAX_LEN: usize = 254;

/// Email address of a [`User`], compared case-sensitively.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Parses an [`Email`] of a `local@domain` form, where the domain has at
    /// least one dot and neither part contains whitespace.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        /// `local@domain.tld` with no whitespace in any part.
        static FORMAT: LazyLock<Option<Regex>> = LazyLock::new(|| {
            Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").ok()
        });

        let address = address.into();
        let valid = address.len() <= EMAIL_MAX_LEN
            && FORMAT.as_ref().is_some_and(|re| re.is_match(&address));
        valid.then_some(Self(address))
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("malformed email address")
    }
}

/// Maximum length of a [`Password`] in bytes.
const PASSWORD_MAX_LEN: usize = 128;

/// Plain-text password of a [`User`], kept only until it's hashed or
/// verified.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct Password(String);

impl Password {
    /// Accepts any non-empty [`Password`] up to [`PASSWORD_MAX_LEN`] bytes.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        (1..=PASSWORD_MAX_LEN)
            .contains(&password.len())
            .then_some(Self(password))
    }

    /// Bytes to feed into [Argon2].
    ///
    /// [Argon2]: https://en.wikipedia.org/wiki/Argon2
    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for Password {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or_else(|| {
            format!("must be from 1 to {PASSWORD_MAX_LEN} bytes long")
        })
    }
}

impl CloneableSecret for Password {}

impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// [Argon2id] hash of a [`Password`] in the [PHC string format], salted
/// individually.
///
/// [Argon2id]: https://en.wikipedia.org/wiki/Argon2
/// [PHC string format]: https://tinyurl.com/phc-string-format
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes the provided [`Password`] with a fresh random salt.
    ///
    /// # Errors
    ///
    /// If hashing fails.
    pub fn new(password: &Password) -> Result<Self, password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash =
            Argon2::default().hash_password(password.as_bytes(), &salt)?;
        Ok(Self(hash.to_string()))
    }

    /// Wraps the provided PHC string without parsing it.
    ///
    /// # Safety
    ///
    /// A malformed `phc` string never verifies any [`Password`].
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// Checks the provided [`Password`] against this [`PasswordHash`].
    #[must_use]
    pub fn verify(&self, password: &Password) -> bool {
        let Ok(parsed) = password_hash::PasswordHash::new(&self.0) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;
