//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier (SHA)
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use git_buildnumber::core::types::Oid;
//!
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! assert_eq!(oid.short(7), "abc123d");
//!
//! assert!(Oid::new("not-a-sha").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidOid(String),
}

/// Longest abbreviation handed out for a revision.
pub const MAX_SHORT_LEN: usize = 40;

/// A Git object identifier (SHA-1 or SHA-256).
///
/// OIDs are normalized to lowercase for consistency. Ordering is the
/// lexicographic order of the hex string, which is what the ancestry walk
/// uses to break timestamp ties.
///
/// # Example
///
/// ```
/// use git_buildnumber::core::types::Oid;
///
/// // Create from hex string (normalized to lowercase)
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
///
/// // Get abbreviated form
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// The OID is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    /// Get an abbreviated form of the OID.
    ///
    /// Returns the first `len` characters, with `len` clamped to
    /// [`MAX_SHORT_LEN`]. A length of zero yields an empty string.
    ///
    /// # Example
    ///
    /// ```
    /// use git_buildnumber::core::types::Oid;
    ///
    /// let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
    /// assert_eq!(oid.short(7), "abc123d");
    /// assert_eq!(oid.short(0), "");
    /// assert_eq!(oid.short(99).len(), 40);
    /// ```
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(MAX_SHORT_LEN).min(self.0.len());
        &self.0[..end]
    }

    /// Check whether `prefix` abbreviates this OID.
    pub fn starts_with(&self, prefix: &str) -> bool {
        !prefix.is_empty() && self.0.starts_with(&prefix.to_ascii_lowercase())
    }

    /// Validate an object id.
    fn validate(oid: &str) -> Result<(), TypeError> {
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Join OIDs with `;`, the separator used for every multi-valued field.
pub fn join_oids<'a>(oids: impl IntoIterator<Item = &'a Oid>, short_len: Option<usize>) -> String {
    oids.into_iter()
        .map(|oid| match short_len {
            Some(len) => oid.short(len),
            None => oid.as_str(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    mod oid {
        use super::*;

        #[test]
        fn valid_sha1() {
            assert!(Oid::new("abc123def4567890abc123def4567890abc12345").is_ok());
        }

        #[test]
        fn valid_sha256() {
            let sha256 = "abc123def4567890abc123def4567890abc123def4567890abc123def456789a";
            assert_eq!(sha256.len(), 64);
            assert!(Oid::new(sha256).is_ok());
        }

        #[test]
        fn normalizes_to_lowercase() {
            let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
            assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
        }

        #[test]
        fn short_form() {
            let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
            assert_eq!(oid.short(7), "abc123d");
            assert_eq!(oid.short(4), "abc1");
            assert_eq!(oid.short(0), "");
            assert_eq!(oid.short(40), oid.as_str());
        }

        #[test]
        fn short_form_is_clamped_to_forty() {
            let sha256 = "abc123def4567890abc123def4567890abc123def4567890abc123def456789a";
            let oid = Oid::new(sha256).unwrap();
            assert_eq!(oid.short(64).len(), 40);
        }

        #[test]
        fn prefix_matching() {
            let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
            assert!(oid.starts_with("abc123"));
            assert!(oid.starts_with("ABC123"));
            assert!(!oid.starts_with("abd"));
            assert!(!oid.starts_with(""));
        }

        #[test]
        fn invalid_length_rejected() {
            assert!(Oid::new("abc123").is_err());
            assert!(Oid::new("").is_err());
        }

        #[test]
        fn non_hex_rejected() {
            assert!(Oid::new("ghijklmnopqrstuvwxyzghijklmnopqrstuvwxyz").is_err());
        }

        #[test]
        fn serde_roundtrip() {
            let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
            let json = serde_json::to_string(&oid).unwrap();
            let parsed: Oid = serde_json::from_str(&json).unwrap();
            assert_eq!(oid, parsed);
        }

        #[test]
        fn ordering_is_lexicographic() {
            let a = Oid::new("a".repeat(40)).unwrap();
            let b = Oid::new("b".repeat(40)).unwrap();
            assert!(a < b);
        }
    }

    mod join {
        use super::*;

        #[test]
        fn joins_full_and_short() {
            let a = Oid::new("a".repeat(40)).unwrap();
            let b = Oid::new("b".repeat(40)).unwrap();
            assert_eq!(
                join_oids([&a, &b], None),
                format!("{};{}", a.as_str(), b.as_str())
            );
            assert_eq!(join_oids([&a, &b], Some(3)), "aaa;bbb");
        }

        #[test]
        fn empty_is_empty_string() {
            assert_eq!(join_oids(std::iter::empty(), None), "");
        }
    }
}
