//! Common ID Types
//!
//! Type-safe wrappers over the integer primary keys handed out by the database.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Generic typed ID wrapper
///
/// Serialized as a bare integer so the wire format stays `{"id": 3}`.
///
/// ```
/// use kernel::id::{CaseId, DocumentId};
///
/// let case_id = CaseId::from_i64(3);
/// let doc_id = DocumentId::from_i64(3);
/// assert_eq!(case_id.as_i64(), doc_id.as_i64());
/// // `case_id == doc_id` does not compile.
/// ```
pub struct Id<T> {
    value: i64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub const fn from_i64(value: i64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub const fn as_i64(&self) -> i64 {
        self.value
    }
}

// derive would put bounds on T, which the markers don't implement
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> From<i64> for Id<T> {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl<T> From<Id<T>> for i64 {
    fn from(id: Id<T>) -> Self {
        id.value
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.value)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Self::from_i64)
    }
}

/// Marker types for different entity IDs
pub mod markers {
    pub struct User;
    pub struct Case;
    pub struct Document;
    pub struct Attorney;
    pub struct Client;
}

pub type UserId = Id<markers::User>;
pub type CaseId = Id<markers::Case>;
pub type DocumentId = Id<markers::Document>;
pub type AttorneyId = Id<markers::Attorney>;
pub type ClientId = Id<markers::Client>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_plain_integer() {
        let id = CaseId::from_i64(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");

        let back: CaseId = serde_json::from_str("42").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_rejects_non_integer() {
        assert!(serde_json::from_str::<UserId>("\"abc\"").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(DocumentId::from_i64(9).to_string(), "9");
    }
}
