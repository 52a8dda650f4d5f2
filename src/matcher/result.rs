//! Per-query result records.
//!
//! The matcher never fails a query: it always produces a `QueryResult`,
//! possibly with empty candidate lists and no feasible match, plus a
//! diagnostic tag saying which resolution stage anchored the query.

use hashbrown::HashMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::{ItemId, TypeId};

// ============================================================================
// AnchorMethod
// ============================================================================

/// Which stage produced the query's first candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorMethod {
    /// Every part matched the graph verbatim.
    Complete,
    /// Some parts matched verbatim and bootstrapped the rest.
    Partial,
    /// A phonetic bucket produced the first candidates.
    Phonetic,
    /// Edit-distance search scoped to district-or-higher / city names,
    /// at the given cost.
    Scoped(u32),
    /// Full-dictionary edit-distance search at the given cost.
    Full(u32),
    /// No stage produced a candidate for any part.
    None,
}

impl std::fmt::Display for AnchorMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::Partial => write!(f, "partial"),
            Self::Phonetic => write!(f, "phonetic"),
            Self::Scoped(cost) => write!(f, "scoped:{cost}"),
            Self::Full(cost) => write!(f, "full:{cost}"),
            Self::None => write!(f, "none"),
        }
    }
}

impl std::str::FromStr for AnchorMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "complete" => return Ok(Self::Complete),
            "partial" => return Ok(Self::Partial),
            "phonetic" => return Ok(Self::Phonetic),
            "none" => return Ok(Self::None),
            _ => {}
        }
        if let Some(cost) = s.strip_prefix("scoped:") {
            return cost.parse().map(Self::Scoped).map_err(|e| e.to_string());
        }
        if let Some(cost) = s.strip_prefix("full:") {
            return cost.parse().map(Self::Full).map_err(|e| e.to_string());
        }
        Err(format!("unknown anchor method: {s:?}"))
    }
}

impl Serialize for AnchorMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AnchorMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

// ============================================================================
// Result records
// ============================================================================

/// Resolution state of one query part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartResult {
    /// True if the part matched a graph name verbatim.
    pub in_graph: bool,
    /// Candidate names for this part, best cost first where applicable.
    pub candidates: Vec<String>,
    /// True if this part helped anchor the query.
    pub anchor: bool,
}

/// Where one resolved name landed in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdInfo {
    pub graph_id: ItemId,
    pub textual_id: String,
    pub type_ids: Vec<TypeId>,
    pub type_names: Vec<String>,
}

/// One feasible assignment of graph ids to the query's resolved names:
/// all chosen ids lie on a single administrative chain. Serializes as the
/// bare name → id-info map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Match {
    pub parts: HashMap<String, IdInfo>,
}

/// The full record produced for one query string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Per-part resolution state, keyed by the trimmed part string.
    pub parts: HashMap<String, PartResult>,
    /// Diagnostic: which stage anchored the query.
    pub anchor_method: AnchorMethod,
    /// Every feasible id combination; the caller chooses among ambiguity.
    pub possible_matches: Vec<Match>,
}

impl QueryResult {
    /// True if no part produced any candidate.
    pub fn is_unresolved(&self) -> bool {
        self.parts.values().all(|p| p.candidates.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_anchor_method_round_trip() {
        for method in [
            AnchorMethod::Complete,
            AnchorMethod::Partial,
            AnchorMethod::Phonetic,
            AnchorMethod::Scoped(2),
            AnchorMethod::Full(3),
            AnchorMethod::None,
        ] {
            let tag = method.to_string();
            assert_eq!(tag.parse::<AnchorMethod>().unwrap(), method);
        }
    }

    #[test]
    fn test_serialized_shape() {
        let result = QueryResult {
            parts: HashMap::new(),
            anchor_method: AnchorMethod::Full(2),
            possible_matches: Vec::new(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["anchor_method"], "full:2");
        assert!(json["possible_matches"].as_array().unwrap().is_empty());
    }
}
