//! API key type.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A non-empty service API key.
///
/// The key is a static secret; its `Debug` output is redacted so it never
/// lands in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Create a new API key, validating that it is non-empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(InvalidInputError::ApiKey {
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        Ok(Self(s))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&"[REDACTED]").finish()
    }
}

impl FromStr for ApiKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_key() {
        let key = ApiKey::new("3e7cc266ae2b0e0d78e279ce8e361736").unwrap();
        assert_eq!(key.as_str(), "3e7cc266ae2b0e0d78e279ce8e361736");
    }

    #[test]
    fn rejects_empty() {
        assert!(ApiKey::new("").is_err());
        assert!(ApiKey::new("   ").is_err());
    }

    #[test]
    fn debug_is_redacted() {
        let key = ApiKey::new("secret-key").unwrap();
        let debug = format!("{:?}", key);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("REDACTED"));
    }
}
