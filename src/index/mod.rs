//! Search indices built over name subsets.
//!
//! Both structures are read-only once constructed and carry no reference to
//! the graph: the matcher builds them over whatever name pool a resolution
//! stage needs.

pub mod phonetic;
pub mod trie;

pub use phonetic::PhoneticIndex;
pub use trie::EditDistanceIndex;
