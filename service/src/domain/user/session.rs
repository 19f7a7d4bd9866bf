//! [`Session`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::DateTimeOf;
use derive_more::{AsRef, Display, FromStr};
use jsonwebtoken::{
    errors::Error as JwtError, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use serde::{Deserialize, Serialize};

use crate::domain::user;
#[cfg(doc)]
use crate::domain::User;

/// Authenticated session of a [`User`], carried as [JWT] claims signed with
/// `HS256`.
///
/// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Session {
    /// ID of the [`User`] this [`Session`] belongs to.
    pub user_id: user::Id,

    /// [`DateTime`] when this [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

impl Session {
    /// Signs this [`Session`] into a [`Token`].
    ///
    /// # Errors
    ///
    /// If the `key` is unusable for `HS256`.
    pub fn sign(&self, key: &EncodingKey) -> Result<Token, JwtError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), self, key)
            .map(Token)
    }

    /// Verifies the signature and the expiration of the provided [`Token`].
    ///
    /// # Errors
    ///
    /// If the [`Token`] is malformed, forged or expired.
    pub fn verify(token: &Token, key: &DecodingKey) -> Result<Self, JwtError> {
        jsonwebtoken::decode(&token.0, key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
    }
}

/// Access token of a [`Session`].
#[derive(AsRef, Clone, Debug, Display, FromStr)]
pub struct Token(String);

impl Token {
    /// Wraps the provided `token` as is.
    ///
    /// # Safety
    ///
    /// Unverified [`Token`]s must be passed through [`Session::verify()`]
    /// before being trusted.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// Marker type describing a [`Session`] expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, Expiration)>;
