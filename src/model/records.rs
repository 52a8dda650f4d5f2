//! Property and relation rows of the raw gazetteer tables.

use serde::{Deserialize, Serialize};

use super::{ItemId, TimeSpan, TypeId};

/// A name attached to an item for some validity interval.
///
/// `content` is stored lower-cased; the matcher operates on lower-cased
/// queries throughout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameRecord {
    pub item_id: ItemId,
    pub content: String,
    /// Three-letter language code (`"deu"`, `"fre"`, `"pol"`, ...).
    pub language: String,
    pub span: TimeSpan,
}

impl NameRecord {
    pub fn new(item_id: i64, content: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            item_id: ItemId(item_id),
            content: content.into().to_lowercase(),
            language: language.into(),
            span: TimeSpan::unbounded(),
        }
    }

    pub fn valid(mut self, begin: i64, end: i64) -> Self {
        self.span = TimeSpan::new(begin, end);
        self
    }
}

/// An administrative type held by an item for some validity interval.
/// Items may carry several types at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRecord {
    pub item_id: ItemId,
    pub code: TypeId,
    pub span: TimeSpan,
}

impl TypeRecord {
    pub fn new(item_id: i64, code: i32) -> Self {
        Self {
            item_id: ItemId(item_id),
            code: TypeId(code),
            span: TimeSpan::unbounded(),
        }
    }

    pub fn valid(mut self, begin: i64, end: i64) -> Self {
        self.span = TimeSpan::new(begin, end);
        self
    }
}

/// A directed hierarchy edge: the parent administratively contains the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub parent: ItemId,
    pub child: ItemId,
    pub span: TimeSpan,
}

impl Relation {
    pub fn new(parent: i64, child: i64) -> Self {
        Self {
            parent: ItemId(parent),
            child: ItemId(child),
            span: TimeSpan::unbounded(),
        }
    }

    pub fn valid(mut self, begin: i64, end: i64) -> Self {
        self.span = TimeSpan::new(begin, end);
        self
    }
}

/// Display name of a type code in some language. Only German rows are indexed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeName {
    pub type_id: TypeId,
    pub language: String,
    pub value: String,
}

impl TypeName {
    pub fn new(type_id: i32, language: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            type_id: TypeId(type_id),
            language: language.into(),
            value: value.into(),
        }
    }
}
