//! Item identity and payload

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, stable identifier of an item in the remote collection.
///
/// Two items are the same entity iff their ids match, even when their
/// payloads differ between fetches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create an id from an existing string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random id (UUID v4)
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<Uuid> for ItemId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }
}

/// An element of the remote collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item<P> {
    /// Stable identity
    pub id: ItemId,
    /// Arbitrary row data
    pub payload: P,
}

impl<P> Item<P> {
    /// Create an item with the given id
    pub fn new(id: impl Into<ItemId>, payload: P) -> Self {
        Self {
            id: id.into(),
            payload,
        }
    }

    /// Create an item with a freshly generated id
    pub fn with_generated_id(payload: P) -> Self {
        Self {
            id: ItemId::generate(),
            payload,
        }
    }
}
