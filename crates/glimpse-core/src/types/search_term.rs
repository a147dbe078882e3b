//! Search term type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A validated, non-empty search term.
///
/// The term is trimmed on construction; a term that is empty after trimming
/// is rejected, so an empty query can never reach the wire.
///
/// # Example
///
/// ```
/// use glimpse_core::SearchTerm;
///
/// let term = SearchTerm::new("cute cats").unwrap();
/// assert_eq!(term.as_str(), "cute cats");
/// assert!(SearchTerm::new("   ").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Create a new search term, validating that it is non-empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the term is empty or whitespace-only.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let trimmed = s.as_ref().trim();
        if trimmed.is_empty() {
            return Err(InvalidInputError::SearchTerm {
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the term as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SearchTerm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for SearchTerm {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for SearchTerm {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SearchTerm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SearchTerm::new(&s).map_err(serde::de::Error::custom)
    }
}
