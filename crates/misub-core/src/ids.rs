//! Identifier types for MiSub records.
//!
//! Node group ids are opaque strings. New ids are UUID v4 values in simple
//! (hyphen-less) form, but any non-empty string read back from storage or
//! submitted by a client is accepted so older timestamp-based ids stay
//! addressable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdError {
    /// The identifier was empty or whitespace only.
    #[error("identifier must not be empty")]
    Empty,
}

/// Identifier of a node group.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeGroupId(String);

impl NodeGroupId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Wrap an existing id, rejecting blank input.
    ///
    /// The value is kept byte for byte; callers handling user input trim it
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::Empty`] if the id is empty or whitespace only.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        if s.trim().is_empty() {
            return Err(IdError::Empty);
        }
        Ok(Self(s.to_string()))
    }

    /// Returns true if this id, ignoring surrounding whitespace, is `other`.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.0.trim() == other
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for NodeGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeGroupId({})", self.0)
    }
}

impl fmt::Display for NodeGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NodeGroupId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for NodeGroupId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Err(IdError::Empty);
        }
        Ok(Self(value))
    }
}

impl From<NodeGroupId> for String {
    fn from(id: NodeGroupId) -> Self {
        id.0
    }
}

impl AsRef<str> for NodeGroupId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = NodeGroupId::generate();
        let b = NodeGroupId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn parse_keeps_value_exact() {
        let id = NodeGroupId::parse("  group-1 ").unwrap();
        assert_eq!(id.as_str(), "  group-1 ");
        assert!(id.matches("group-1"));
        assert!(!id.matches("group-2"));
    }

    #[test]
    fn stored_whitespace_survives_serde() {
        let id: NodeGroupId = serde_json::from_str("\" legacy-1 \"").unwrap();
        assert_eq!(id.as_str(), " legacy-1 ");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\" legacy-1 \"");
    }

    #[test]
    fn parse_rejects_blank() {
        assert_eq!(NodeGroupId::parse(""), Err(IdError::Empty));
        assert_eq!(NodeGroupId::parse("   "), Err(IdError::Empty));
    }

    #[test]
    fn legacy_ids_are_accepted() {
        let id: NodeGroupId = "1718000000000abc123".parse().unwrap();
        assert_eq!(id.to_string(), "1718000000000abc123");
    }

    #[test]
    fn serde_json_roundtrip() {
        let id = NodeGroupId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let parsed: NodeGroupId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn serde_rejects_blank() {
        for json in ["\"\"", "\"  \""] {
            let result: Result<NodeGroupId, _> = serde_json::from_str(json);
            assert!(result.is_err(), "{json}");
        }
    }
}
