//! # Gazetteer Data Model
//!
//! Clean DTOs shared by every layer: loader ↔ graph index ↔ matcher ↔ user.
//!
//! This module is pure data — no I/O, no state, no locks.

pub mod item;
pub mod path;
pub mod records;
pub mod time;

pub use item::{Item, ItemId, TypeId};
pub use path::HierarchyPath;
pub use records::{NameRecord, Relation, TypeName, TypeRecord};
pub use time::{julian_year_spans, TimeSpan, TIME_MAX, TIME_MIN};
