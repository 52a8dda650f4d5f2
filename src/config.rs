//! Index configuration.
//!
//! Everything the graph builder and matcher treat as policy rather than data:
//! the study window, the root supernodes, which type codes are excluded from
//! indexing, which type scopes the scoped search ladder uses, and the
//! language priority for display names.
//!
//! The defaults reproduce the WWI casualty-list study setup: the window runs
//! from 1872-01-01 to 1917-12-31 (scaled Julian days, flag digit 2) and the
//! supernodes are the top-level states of the period.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::model::{ItemId, TypeId};

// ============================================================================
// Default study window
// ============================================================================

/// 1872-01-01 (Julian day 2404794, flag 2).
pub const DEFAULT_STUDY_BEGIN: i64 = 2404794 * 10 + 2;

/// 1917-12-31 (Julian day 2421594, flag 2).
pub const DEFAULT_STUDY_END: i64 = 2421594 * 10 + 2;

/// Deutsches Reich, Schweiz, Österreich-Ungarn, Liechtenstein, Luxemburg.
const DEFAULT_SUPERNODES: [i64; 5] = [190315, 191050, 306245, 220100, 218129];

// ============================================================================
// Type code groups
// ============================================================================

// Politische Verwaltung down to Kreis level, per state. Codes recurring
// across levels or states collapse in the set union.
const DEUTSCHES_REICH_DISTRICT_OR_HIGHER: [i32; 31] = [
    130, // Reich
    31, 61, 23, 60, 34, 16, 7, 45, // Bundesstaaten
    201, 45, // Provinzebene
    46, 100, 45, 32, // Regierungsbezirksebene
    5, 32, 222, 36, 37, 110, 78, 99, 149, 212, 95, 53, 22, 161, 86, 73, // Kreisähnliche Gebilde
];

const OESTERREICH_UNGARN_DISTRICT_OR_HIGHER: [i32; 15] = [
    71, 215, 80, 192, 23, 31, 188, 137, 62, 80, 113, 146, 112, 270, 190,
];

const SCHWEIZ_DISTRICT_OR_HIGHER: [i32; 3] = [50, 25, 134];

const LUXEMBURG_DISTRICT_OR_HIGHER: [i32; 3] = [61, 170, 25];

const LIECHTENSTEIN_DISTRICT_OR_HIGHER: [i32; 1] = [60];

// Städte (Deutsches Reich + Österreich-Ungarn).
const CITY_TYPES: [i32; 3] = [150, 51, 273];

// Excluded groups: geographische Typen, Gericht, Verkehrswesen, Kirche,
// Zivilverwaltung, Sonstige, plus three known data errors (223, 10, 278).
const GEOGRAPHIC_TYPES: [i32; 5] = [47, 107, 15, 89, 166];
const CIVIL_TYPES: [i32; 3] = [242, 172, 103];
const COURT_TYPES: [i32; 6] = [3, 202, 228, 19, 105, 151];
const TRAFFIC_TYPES: [i32; 2] = [118, 119];
const MISC_TYPES: [i32; 11] = [98, 195, 198, 199, 200, 74, 196, 147, 104, 197, 187];
const CHURCH_TYPES: [i32; 33] = [
    124, 250, 6, 91, 9, 260, 11, 12, 249, 96, 219, 13, 245, 26, 210, 92, 27, 28, 29, 30, 153, 35,
    244, 41, 42, 43, 44, 243, 155, 206, 253, 49, 263,
];
const SPECIAL_CASE_TYPES: [i32; 3] = [223, 10, 278];

// ============================================================================
// IndexConfig
// ============================================================================

/// Configuration injected into `GraphIndex::build` and shared with the
/// matcher. Immutable once the index is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Lower bound of the study window (scaled Julian encoding).
    pub study_begin: i64,
    /// Upper bound of the study window.
    pub study_end: i64,
    /// Root items seeding the hierarchy traversal.
    pub supernodes: HashSet<ItemId>,
    /// Type codes that never contribute to an item's indexed types.
    pub undesired_types: HashSet<TypeId>,
    /// District-level-or-above scope for the scoped search ladder.
    pub district_or_higher_types: HashSet<TypeId>,
    /// City scope for the scoped search ladder.
    pub city_types: HashSet<TypeId>,
    /// Language whose names are preferred outright.
    pub primary_language: String,
    /// Languages preferred over the remainder when no primary name fits.
    pub favored_languages: HashSet<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        let undesired_types = GEOGRAPHIC_TYPES
            .iter()
            .chain(&CIVIL_TYPES)
            .chain(&COURT_TYPES)
            .chain(&TRAFFIC_TYPES)
            .chain(&MISC_TYPES)
            .chain(&CHURCH_TYPES)
            .chain(&SPECIAL_CASE_TYPES)
            .map(|&c| TypeId(c))
            .collect();

        let district_or_higher_types = DEUTSCHES_REICH_DISTRICT_OR_HIGHER
            .iter()
            .chain(&OESTERREICH_UNGARN_DISTRICT_OR_HIGHER)
            .chain(&SCHWEIZ_DISTRICT_OR_HIGHER)
            .chain(&LUXEMBURG_DISTRICT_OR_HIGHER)
            .chain(&LIECHTENSTEIN_DISTRICT_OR_HIGHER)
            .map(|&c| TypeId(c))
            .collect();

        Self {
            study_begin: DEFAULT_STUDY_BEGIN,
            study_end: DEFAULT_STUDY_END,
            supernodes: DEFAULT_SUPERNODES.iter().map(|&id| ItemId(id)).collect(),
            undesired_types,
            district_or_higher_types,
            city_types: CITY_TYPES.iter().map(|&c| TypeId(c)).collect(),
            primary_language: "deu".to_string(),
            favored_languages: ["fre", "pol", "eng"].iter().map(|&l| l.to_string()).collect(),
        }
    }
}

impl IndexConfig {
    /// Config with the default policy sets but a caller-chosen study window
    /// and supernode seed. Handy for tests and smaller extracts.
    pub fn with_roots(
        study_begin: i64,
        study_end: i64,
        supernodes: impl IntoIterator<Item = i64>,
    ) -> Self {
        Self {
            study_begin,
            study_end,
            supernodes: supernodes.into_iter().map(ItemId).collect(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window_is_wwi_study() {
        let config = IndexConfig::default();
        assert_eq!(config.study_begin, 24047942);
        assert_eq!(config.study_end, 24215942);
        assert_eq!(config.supernodes.len(), 5);
        assert!(config.supernodes.contains(&ItemId(190315)));
    }

    #[test]
    fn test_exclusion_set_contents() {
        let config = IndexConfig::default();
        // Church and court codes are excluded; Stadt and Kreis are not.
        assert!(config.undesired_types.contains(&TypeId(124)));
        assert!(config.undesired_types.contains(&TypeId(3)));
        assert!(config.undesired_types.contains(&TypeId(223)));
        assert!(!config.undesired_types.contains(&TypeId(150)));
        assert!(!config.undesired_types.contains(&TypeId(32)));
    }

    #[test]
    fn test_scope_sets() {
        let config = IndexConfig::default();
        assert!(config.district_or_higher_types.contains(&TypeId(130)));
        assert!(config.city_types.contains(&TypeId(150)));
        assert!(config.favored_languages.contains("pol"));
    }
}
