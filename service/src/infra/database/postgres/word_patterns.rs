//! [`WordPatterns`] definition.

use postgres_types::{FromSql, ToSql};

/// `ILIKE` patterns matching any of the words of a search input.
///
/// Meant to be bound as a `VARCHAR[]` in `column ILIKE ANY($n)`.
#[derive(Clone, Debug, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct WordPatterns(Vec<String>);

impl WordPatterns {
    /// Splits the provided `input` into whitespace-separated words, each
    /// matched as a substring.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self(
            input
                .split_whitespace()
                .map(|word| {
                    let mut pattern = String::with_capacity(word.len() + 2);
                    pattern.push('%');
                    for c in word.chars() {
                        if matches!(c, '\\' | '%' | '_') {
                            pattern.push('\\');
                        }
                        pattern.push(c);
                    }
                    pattern.push('%');
                    pattern
                })
                .collect(),
        )
    }
}
