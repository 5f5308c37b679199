//! Domain types for the remote item collection.
//!
//! # Design
//! Identifiers are opaque to the client. The backend may key items by integer
//! or by string, so `ItemId` accepts either on the wire and normalises to a
//! string. Wire payloads (`NewItem`, `ItemUpdate`, `ItemSnapshot`) are kept
//! separate from `Item` so each HTTP operation serialises exactly the fields
//! the contract names.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned identifier of an item. Never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
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

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => ItemId(s),
            RawId::Signed(n) => ItemId(n.to_string()),
            RawId::Unsigned(n) => ItemId(n.to_string()),
        })
    }
}

/// A single entry of the collection as the client holds it.
///
/// `created_at` is `None` for items added during this session: the create
/// call only returns an identifier, and the timestamp is learned on the next
/// full reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub description: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Item {
    /// The client-side view of a freshly created item.
    pub fn created(id: ItemId, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            done: false,
            created_at: None,
        }
    }
}

/// Request payload for `POST {base}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub description: String,
}

/// Request payload for `PUT {base}/{id}`. Both fields are always sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub description: String,
    pub done: bool,
}

/// The authoritative mutable fields returned by `GET {base}/{id}`.
/// Any other fields in the body are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub description: String,
    #[serde(default)]
    pub done: bool,
}

/// Fields merged into a stored item by `ItemStore::patch`. `None` leaves the
/// stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub description: Option<String>,
    pub done: Option<bool>,
}

impl From<ItemSnapshot> for ItemPatch {
    fn from(snapshot: ItemSnapshot) -> Self {
        Self {
            description: Some(snapshot.description),
            done: Some(snapshot.done),
        }
    }
}
