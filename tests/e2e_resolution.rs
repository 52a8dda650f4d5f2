//! End-to-end tests for query resolution.
//!
//! Exercises the full ladder: verbatim lookup, phonetic and edit-distance
//! broadening, reachability-restricted completion of partially anchored
//! queries, and the hierarchy-consistency filter over id combinations.

use govlink::model::{Item, NameRecord, Relation, TypeName, TypeRecord};
use govlink::{
    AnchorMethod, Gazetteer, GraphIndex, IndexConfig, MatcherOptions, QueryResult, RawTables,
};
use pretty_assertions::assert_eq;

// ============================================================================
// Helper: same tree as e2e_build, plus dresden under sachsen.
//
//   100 deutsches reich (130)
//   ├── 200 sachsen (45)
//   │   ├── 300 pirna (32)
//   │   │   └── 400 neustadt (150)
//   │   └── 500 dresden (150)
//   └── 210 westfalen (45)
//       ├── 410 neustadt (150)
//       └── 420 aachen (150)
// ============================================================================

fn fixture_tables() -> RawTables {
    RawTables {
        items: vec![
            Item::new(100, "object_100"),
            Item::new(200, "object_200"),
            Item::new(210, "object_210"),
            Item::new(300, "object_300"),
            Item::new(400, "object_400"),
            Item::new(410, "object_410"),
            Item::new(420, "object_420"),
            Item::new(500, "object_500"),
        ],
        names: vec![
            NameRecord::new(100, "Deutsches Reich", "deu"),
            NameRecord::new(200, "Sachsen", "deu"),
            NameRecord::new(210, "Westfalen", "deu"),
            NameRecord::new(300, "Pirna", "deu"),
            NameRecord::new(400, "Neustadt", "deu"),
            NameRecord::new(410, "Neustadt", "deu"),
            NameRecord::new(420, "Aachen", "deu"),
            NameRecord::new(500, "Dresden", "deu"),
        ],
        types: vec![
            TypeRecord::new(100, 130),
            TypeRecord::new(200, 45),
            TypeRecord::new(210, 45),
            TypeRecord::new(300, 32),
            TypeRecord::new(400, 150),
            TypeRecord::new(410, 150),
            TypeRecord::new(420, 150),
            TypeRecord::new(500, 150),
        ],
        relations: vec![
            Relation::new(100, 200),
            Relation::new(100, 210),
            Relation::new(200, 300),
            Relation::new(300, 400),
            Relation::new(210, 410),
            Relation::new(210, 420),
            Relation::new(200, 500),
        ],
        type_names: vec![
            TypeName::new(130, "deu", "Reich"),
            TypeName::new(45, "deu", "Provinz"),
            TypeName::new(32, "deu", "Kreis"),
            TypeName::new(150, "deu", "Stadt"),
        ],
    }
}

fn fixture() -> Gazetteer {
    let config = IndexConfig::with_roots(0, 1_000_000, [100]);
    let graph = GraphIndex::build(&fixture_tables(), config).unwrap();
    Gazetteer::with_graph(graph)
}

fn match_ids(result: &QueryResult) -> Vec<Vec<i64>> {
    let mut all: Vec<Vec<i64>> = result
        .possible_matches
        .iter()
        .map(|m| {
            let mut ids: Vec<i64> = m.parts.values().map(|info| info.graph_id.0).collect();
            ids.sort_unstable();
            ids
        })
        .collect();
    all.sort();
    all
}

// ============================================================================
// 1. Exact single-part match
// ============================================================================

#[test]
fn test_exact_match_is_complete() {
    let gazetteer = fixture();
    let matcher = gazetteer.matcher(MatcherOptions::default());

    let result = matcher.resolve("aachen");
    assert_eq!(result.anchor_method, AnchorMethod::Complete);
    assert!(result.parts["aachen"].in_graph);
    assert!(result.parts["aachen"].anchor);

    assert_eq!(match_ids(&result), vec![vec![420]]);
    let info = &result.possible_matches[0].parts["aachen"];
    assert_eq!(info.textual_id, "object_420");
    assert_eq!(info.type_names, vec!["Stadt"]);
}

// ============================================================================
// 2. Combination filtering: ids must share one administrative chain
// ============================================================================

#[test]
fn test_homonym_filtered_by_hierarchy() {
    let gazetteer = fixture();
    let matcher = gazetteer.matcher(MatcherOptions::default());

    // "neustadt" is ambiguous (400 in sachsen, 410 in westfalen); the
    // sachsen context must keep only the 400 chain.
    let result = matcher.resolve("neustadt, sachsen");
    assert_eq!(result.anchor_method, AnchorMethod::Complete);
    assert_eq!(match_ids(&result), vec![vec![200, 400]]);
}

#[test]
fn test_single_part_ambiguity_is_returned_in_full() {
    let gazetteer = fixture();
    let matcher = gazetteer.matcher(MatcherOptions::default());

    let result = matcher.resolve("neustadt");
    assert_eq!(match_ids(&result), vec![vec![400], vec![410]]);
}

#[test]
fn test_unrelated_parts_produce_no_combination() {
    let gazetteer = fixture();
    let matcher = gazetteer.matcher(MatcherOptions::default());

    // dresden and westfalen are on disjoint chains.
    let result = matcher.resolve("dresden, westfalen");
    assert_eq!(result.anchor_method, AnchorMethod::Complete);
    assert!(result.possible_matches.is_empty());
}

// ============================================================================
// 3. Cost ladder
// ============================================================================

#[test]
fn test_one_edit_query_resolves_at_cost_one() {
    let gazetteer = fixture();
    let matcher = gazetteer.matcher(MatcherOptions::default());

    let result = matcher.resolve("aachn");
    assert_eq!(result.anchor_method, AnchorMethod::Full(1));
    assert_eq!(result.parts["aachn"].candidates, vec!["aachen"]);
    assert!(!result.parts["aachn"].in_graph);
    assert!(result.parts["aachn"].anchor);
    assert_eq!(match_ids(&result), vec![vec![420]]);
}

#[test]
fn test_two_edit_query_needs_cost_two() {
    let gazetteer = fixture();
    let matcher = gazetteer.matcher(MatcherOptions::default());

    let result = matcher.resolve("aacn");
    assert_eq!(result.anchor_method, AnchorMethod::Full(2));
    assert_eq!(result.parts["aacn"].candidates, vec!["aachen"]);
}

// ============================================================================
// 4. Partial anchoring via reachable-set restriction
// ============================================================================

#[test]
fn test_partial_anchor_searches_near_the_anchor() {
    let gazetteer = fixture();
    let matcher = gazetteer.matcher(MatcherOptions::default());

    let result = matcher.resolve("neustdt, sachsen");
    assert_eq!(result.anchor_method, AnchorMethod::Partial);
    assert!(result.parts["sachsen"].in_graph);
    assert_eq!(result.parts["neustdt"].candidates, vec!["neustadt"]);

    // Even though the name "neustadt" maps to both 400 and 410, only the
    // combination on the sachsen chain survives.
    assert_eq!(match_ids(&result), vec![vec![200, 400]]);
}

// ============================================================================
// 5. Phonetic fallback
// ============================================================================

#[test]
fn test_phonetic_bucket_anchors_before_edit_distance() {
    let gazetteer = fixture();
    let matcher = gazetteer.matcher(MatcherOptions {
        use_phonetic: true,
        ..MatcherOptions::default()
    });

    // "achen" shares the Kölner code of "aachen".
    let result = matcher.resolve("achen");
    assert_eq!(result.anchor_method, AnchorMethod::Phonetic);
    assert_eq!(result.parts["achen"].candidates, vec!["aachen"]);
}

// ============================================================================
// 6. Scoped search
// ============================================================================

#[test]
fn test_scoped_search_hits_district_names_first() {
    let gazetteer = fixture();
    let matcher = gazetteer.matcher(MatcherOptions {
        scoped_search_first: true,
        ..MatcherOptions::default()
    });

    let result = matcher.resolve("sachsn");
    assert_eq!(result.anchor_method, AnchorMethod::Scoped(1));
    assert_eq!(result.parts["sachsn"].candidates, vec!["sachsen"]);
}

// ============================================================================
// 7. Garbage input and unresolvable queries
// ============================================================================

#[test]
fn test_garbage_part_yields_empty_result() {
    let gazetteer = fixture();
    let matcher = gazetteer.matcher(MatcherOptions::default());

    let result = matcher.resolve("?!");
    assert_eq!(result.anchor_method, AnchorMethod::None);
    assert!(result.is_unresolved());
    assert!(result.possible_matches.is_empty());
}

#[test]
fn test_empty_query_does_not_crash() {
    let gazetteer = fixture();
    let matcher = gazetteer.matcher(MatcherOptions::default());

    let result = matcher.resolve("");
    assert!(result.possible_matches.is_empty());
}

// ============================================================================
// 8. Batch resolution
// ============================================================================

#[test]
fn test_batch_preserves_input_order() {
    let gazetteer = fixture();
    let matcher = gazetteer.matcher(MatcherOptions::default());

    let queries = vec!["aachen".to_string(), "?!".to_string(), "dresden".to_string()];
    let results = matcher.resolve_all(&queries);

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].anchor_method, AnchorMethod::Complete);
    assert_eq!(results[1].anchor_method, AnchorMethod::None);
    assert_eq!(match_ids(&results[2]), vec![vec![500]]);
}

// ============================================================================
// 9. Serialized output shape
// ============================================================================

#[test]
fn test_result_serializes_to_documented_record() {
    let gazetteer = fixture();
    let matcher = gazetteer.matcher(MatcherOptions::default());

    let result = matcher.resolve("pirna, sachsen");
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["anchor_method"], "complete");
    assert_eq!(json["parts"]["pirna"]["in_graph"], true);
    assert_eq!(json["parts"]["pirna"]["candidates"][0], "pirna");
    let first = &json["possible_matches"][0];
    assert_eq!(first["pirna"]["textual_id"], "object_300");
    assert_eq!(first["pirna"]["type_names"][0], "Kreis");
}
