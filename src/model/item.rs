//! Items — the nodes of the administrative hierarchy.

use serde::{Deserialize, Serialize};

/// Opaque item identifier (the gazetteer's numeric primary key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub i64);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Administrative type code (e.g. 150 = Stadt, 32 = Kreis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub i32);

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the item table.
///
/// `textual_id` is the gazetteer's externally-published stable identifier
/// (e.g. `"AACHEN_JO30MB"`). Deleted items are filtered out of every other
/// table during index construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub textual_id: String,
    pub deleted: bool,
}

impl Item {
    pub fn new(id: i64, textual_id: impl Into<String>) -> Self {
        Self {
            id: ItemId(id),
            textual_id: textual_id.into(),
            deleted: false,
        }
    }

    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }
}
