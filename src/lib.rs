//! # govlink — GOV Gazetteer Record Linkage
//!
//! Resolves noisy, historically-spelled place-name strings (WWI-era
//! casualty lists) against the GOV administrative-hierarchy graph.
//!
//! ## Design Principles
//!
//! 1. **Build once, query forever**: `GraphIndex` is immutable after
//!    construction and shared read-only across matching workers
//! 2. **Clean DTOs**: `Item`, `NameRecord`, `Relation`, `QueryResult` cross
//!    all boundaries
//! 3. **The matcher never fails a query**: unresolved input yields an empty
//!    result record with a diagnostic tag, not an error
//! 4. **Search indices are disposable**: tries and phonetic buckets are
//!    built over whatever name pool a resolution stage needs
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use govlink::{Gazetteer, IndexConfig, MatcherOptions};
//!
//! # fn example() -> govlink::Result<()> {
//! // Load the five GOV tables and build the hierarchy index.
//! let gazetteer = Gazetteer::open("data/", IndexConfig::default())?;
//!
//! // Resolve query strings (already normalized and lower-cased).
//! let matcher = gazetteer.matcher(MatcherOptions::default());
//! let result = matcher.resolve("neustadt, sachsen");
//!
//! for candidate in &result.possible_matches {
//!     println!("{:?}", candidate.parts);
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod graph;
pub mod index;
pub mod loader;
pub mod matcher;
pub mod model;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::IndexConfig;
pub use graph::GraphIndex;
pub use index::{EditDistanceIndex, PhoneticIndex};
pub use loader::RawTables;
pub use matcher::{AnchorMethod, IdInfo, Match, Matcher, MatcherOptions, PartResult, QueryResult};
pub use model::{HierarchyPath, Item, ItemId, NameRecord, Relation, TypeId, TypeRecord};

// ============================================================================
// Top-level Gazetteer handle
// ============================================================================

use std::path::Path;

/// The primary entry point: owns a built [`GraphIndex`] and hands out
/// matchers borrowing it.
pub struct Gazetteer {
    graph: GraphIndex,
}

impl Gazetteer {
    /// Load the raw tables from a dump directory and build the index.
    pub fn open(data_root: impl AsRef<Path>, config: IndexConfig) -> Result<Self> {
        let tables = RawTables::from_dir(data_root)?;
        Self::from_tables(&tables, config)
    }

    /// Build from tables already in memory.
    pub fn from_tables(tables: &RawTables, config: IndexConfig) -> Result<Self> {
        let graph = GraphIndex::build(tables, config)?;
        Ok(Self { graph })
    }

    /// Wrap an already-built index (e.g. restored from a cache).
    pub fn with_graph(graph: GraphIndex) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &GraphIndex {
        &self.graph
    }

    /// A matcher borrowing this gazetteer's index.
    pub fn matcher(&self, options: MatcherOptions) -> Matcher<'_> {
        Matcher::new(&self.graph, options)
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The raw tables are corrupt (duplicate ids); matching against them
    /// would be unsafe, so construction aborts.
    #[error("data integrity error: {0}")]
    DataIntegrity(String),

    /// A raw table failed to parse.
    #[error("table {table}: {source}")]
    Table {
        table: String,
        #[source]
        source: csv::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
