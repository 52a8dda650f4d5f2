//! # Matcher — Query Resolution Orchestrator
//!
//! Resolves a multi-part place-name string against the built [`GraphIndex`].
//! Per query: split on commas, look every part up verbatim, and if that
//! fails broaden the search in strict priority order — phonetic bucket,
//! optionally type-scoped edit distance, then full-dictionary edit distance
//! on an ascending cost ladder. Parts still open after an anchor is found
//! are searched only among names reachable from the anchor's ids. Finally
//! every combination of candidate ids is checked for hierarchy consistency.
//!
//! Queries are independent; `resolve_all` fans out over a rayon pool.
//! The matcher holds no per-query state and never mutates the index.

pub mod result;

use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use parking_lot::RwLock;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::graph::GraphIndex;
use crate::index::{EditDistanceIndex, PhoneticIndex};
use crate::model::{ItemId, TypeId};

pub use result::{AnchorMethod, IdInfo, Match, PartResult, QueryResult};

// ============================================================================
// Options
// ============================================================================

/// Tuning knobs for the resolution ladder.
#[derive(Debug, Clone, Copy)]
pub struct MatcherOptions {
    /// Try the phonetic bucket before any edit-distance search.
    pub use_phonetic: bool,
    /// Try district-or-higher / city name subsets before the full dictionary.
    pub scoped_search_first: bool,
    /// Ceiling of the full-dictionary cost ladder.
    pub max_cost: u32,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self { use_phonetic: false, scoped_search_first: false, max_cost: 3 }
    }
}

// ============================================================================
// Matcher
// ============================================================================

/// Cached dictionaries for the query-independent search scopes. Built on
/// first use, shared across worker threads afterwards.
#[derive(Default)]
struct ScopeTries {
    full: RwLock<Option<Arc<EditDistanceIndex>>>,
    district: RwLock<Option<Arc<EditDistanceIndex>>>,
    city: RwLock<Option<Arc<EditDistanceIndex>>>,
}

fn cached(
    slot: &RwLock<Option<Arc<EditDistanceIndex>>>,
    build: impl FnOnce() -> EditDistanceIndex,
) -> Arc<EditDistanceIndex> {
    if let Some(trie) = slot.read().as_ref() {
        return Arc::clone(trie);
    }
    let mut guard = slot.write();
    if let Some(trie) = guard.as_ref() {
        return Arc::clone(trie);
    }
    let trie = Arc::new(build());
    *guard = Some(Arc::clone(&trie));
    trie
}

/// Resolves query strings against a built graph index.
pub struct Matcher<'g> {
    graph: &'g GraphIndex,
    options: MatcherOptions,
    phonetic: Option<PhoneticIndex>,
    tries: ScopeTries,
}

impl<'g> Matcher<'g> {
    pub fn new(graph: &'g GraphIndex, options: MatcherOptions) -> Self {
        let phonetic = options
            .use_phonetic
            .then(|| PhoneticIndex::from_names(graph.loc_names().map(str::to_string)));
        info!(
            names = graph.loc_names().count(),
            phonetic = options.use_phonetic,
            "initialized matcher"
        );
        Self { graph, options, phonetic, tries: ScopeTries::default() }
    }

    pub fn options(&self) -> &MatcherOptions {
        &self.options
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Resolve one query. Infallible: unresolved queries come back with
    /// empty candidate lists and `anchor_method == "none"`.
    pub fn resolve(&self, query: &str) -> QueryResult {
        let parts = split_query(query);

        // Stage 1+2: direct lookup of every part.
        let mut results: HashMap<String, PartResult> = HashMap::with_capacity(parts.len());
        for part in &parts {
            let in_graph = self.graph.contains_name(part);
            results.insert(
                part.clone(),
                PartResult {
                    in_graph,
                    candidates: if in_graph { vec![part.clone()] } else { Vec::new() },
                    anchor: in_graph,
                },
            );
        }

        let anchored = |results: &HashMap<String, PartResult>| {
            parts.iter().filter(|p| !results[p.as_str()].candidates.is_empty()).count()
        };

        // Stage 3-4: tag the anchor method, broadening if nothing matched.
        let anchor_method = match anchored(&results) {
            n if n == parts.len() => AnchorMethod::Complete,
            0 => match self.find_best_anchor(&parts) {
                Some((part, candidates, method)) => {
                    let entry = results.get_mut(&part).expect("part came from this query");
                    entry.candidates.extend(candidates);
                    entry.anchor = true;
                    method
                }
                None => AnchorMethod::None,
            },
            _ => AnchorMethod::Partial,
        };

        // Stage 5: resolve leftover parts near the anchors.
        let unmatched: Vec<&String> =
            parts.iter().filter(|p| results[p.as_str()].candidates.is_empty()).collect();
        if !unmatched.is_empty() && anchored(&results) > 0 {
            let pool = self.reachable_name_pool(&parts, &results);
            let trie = EditDistanceIndex::from_words(pool);
            for part in unmatched {
                let candidates = trie.best_candidates(part, self.options.max_cost);
                results
                    .get_mut(part.as_str())
                    .expect("part came from this query")
                    .candidates
                    .extend(candidates);
            }
        }

        // Stage 6: combine candidate ids into hierarchy-consistent matches.
        let possible_matches = self.combine(&parts, &results);
        debug!(%query, method = %anchor_method, matches = possible_matches.len(), "resolved query");

        QueryResult { parts: results, anchor_method, possible_matches }
    }

    /// Resolve a batch in parallel. Output order follows input order.
    pub fn resolve_all(&self, queries: &[String]) -> Vec<QueryResult> {
        info!(queries = queries.len(), "resolving batch");
        queries.par_iter().map(|query| self.resolve(query)).collect()
    }

    // ========================================================================
    // Anchor broadening ladder
    // ========================================================================

    /// Find candidates for any part, trying the cheapest stage first.
    /// Returns the part, its candidates, and the stage tag.
    fn find_best_anchor(&self, parts: &[String]) -> Option<(String, Vec<String>, AnchorMethod)> {
        if let Some(phonetic) = &self.phonetic {
            for part in parts {
                let candidates = phonetic.candidates_for(part);
                if !candidates.is_empty() {
                    return Some((part.clone(), candidates, AnchorMethod::Phonetic));
                }
            }
        }

        if self.options.scoped_search_first {
            for scope in [ScopedPool::District, ScopedPool::City] {
                let trie = self.scoped_trie(scope);
                for cost in 1..=3 {
                    for part in parts {
                        let candidates = trie.best_candidates(part, cost);
                        if !candidates.is_empty() {
                            return Some((part.clone(), candidates, AnchorMethod::Scoped(cost)));
                        }
                    }
                }
            }
        }

        let trie = self.full_trie();
        for cost in 1..=self.options.max_cost {
            for part in parts {
                let candidates = trie.best_candidates(part, cost);
                if !candidates.is_empty() {
                    return Some((part.clone(), candidates, AnchorMethod::Full(cost)));
                }
            }
        }

        None
    }

    fn full_trie(&self) -> Arc<EditDistanceIndex> {
        cached(&self.tries.full, || EditDistanceIndex::from_words(self.graph.loc_names()))
    }

    fn scoped_trie(&self, scope: ScopedPool) -> Arc<EditDistanceIndex> {
        let (slot, types) = match scope {
            ScopedPool::District => {
                (&self.tries.district, &self.graph.config().district_or_higher_types)
            }
            ScopedPool::City => (&self.tries.city, &self.graph.config().city_types),
        };
        cached(slot, || {
            let ids = self.graph.ids_for_types(types);
            EditDistanceIndex::from_words(self.graph.names_for_ids(ids.iter().copied()))
        })
    }

    /// Names of every node reachable from the ids already resolved for the
    /// anchored parts — the sibling-context search space of stage 5.
    fn reachable_name_pool(
        &self,
        parts: &[String],
        results: &HashMap<String, PartResult>,
    ) -> HashSet<&str> {
        let mut relevant_ids: HashSet<ItemId> = HashSet::new();
        for part in parts {
            let candidates = &results[part.as_str()].candidates;
            if candidates.is_empty() {
                continue;
            }
            let ids = self.graph.ids_for_names(candidates.iter().map(String::as_str));
            relevant_ids.extend(self.graph.reachable_for_ids(&ids));
        }
        self.graph.names_for_ids(relevant_ids)
    }

    // ========================================================================
    // Combination
    // ========================================================================

    /// Cartesian product of candidate names, then of candidate ids; keep a
    /// combination only if every id lies on the senior id's chain.
    fn combine(&self, parts: &[String], results: &HashMap<String, PartResult>) -> Vec<Match> {
        let candidate_lists: Vec<&[String]> = parts
            .iter()
            .map(|p| results[p.as_str()].candidates.as_slice())
            .filter(|candidates| !candidates.is_empty())
            .collect();
        if candidate_lists.is_empty() {
            return Vec::new();
        }

        let mut matches = Vec::new();
        for_each_product(&candidate_lists, |names| {
            let id_lists: Vec<Vec<ItemId>> = names
                .iter()
                .map(|name| {
                    let mut ids: Vec<ItemId> = self
                        .graph
                        .ids_for_name(name)
                        .map(|set| set.iter().copied().collect())
                        .unwrap_or_default();
                    ids.sort_unstable();
                    ids
                })
                .collect();
            let id_slices: Vec<&[ItemId]> = id_lists.iter().map(Vec::as_slice).collect();

            for_each_product(&id_slices, |ids| {
                if !self.is_consistent_chain(ids) {
                    return;
                }
                let mut match_parts = HashMap::with_capacity(ids.len());
                for (name, &&id) in names.iter().zip(ids) {
                    match_parts.insert((*name).clone(), self.describe(id));
                }
                matches.push(Match { parts: match_parts });
            });
        });
        matches
    }

    /// A multi-id combination is feasible only if the id with the largest
    /// reachable set covers all others — one consistent administrative chain.
    fn is_consistent_chain(&self, ids: &[&ItemId]) -> bool {
        if ids.len() <= 1 {
            return true;
        }
        let reach_len =
            |id: ItemId| self.graph.reachable_from(id).map_or(0, HashSet::len);
        let mut senior = *ids[0];
        for &&id in &ids[1..] {
            if reach_len(id) > reach_len(senior) {
                senior = id;
            }
        }
        let Some(senior_reach) = self.graph.reachable_from(senior) else {
            return false;
        };
        ids.iter().all(|&&id| id == senior || senior_reach.contains(&id))
    }

    fn describe(&self, id: ItemId) -> IdInfo {
        let mut type_ids: Vec<TypeId> = self
            .graph
            .types_for_id(id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        type_ids.sort_unstable();
        let type_names = type_ids
            .iter()
            .filter_map(|&code| self.graph.type_name(code))
            .map(str::to_string)
            .collect();
        IdInfo {
            graph_id: id,
            textual_id: self.graph.textual_id(id).unwrap_or_default().to_string(),
            type_ids,
            type_names,
        }
    }
}

#[derive(Clone, Copy)]
enum ScopedPool {
    District,
    City,
}

// ============================================================================
// Helpers
// ============================================================================

/// Split on commas, trim, lower-case, deduplicate while keeping query order.
fn split_query(query: &str) -> Vec<String> {
    let mut parts = Vec::new();
    for part in query.split(',') {
        let part = part.trim().to_lowercase();
        if !parts.contains(&part) {
            parts.push(part);
        }
    }
    parts
}

/// Visit the Cartesian product of the given slices. No allocation per tuple
/// beyond the reused index vector; empty input or any empty slice visits
/// nothing.
fn for_each_product<'a, T>(lists: &[&'a [T]], mut visit: impl FnMut(&[&'a T])) {
    if lists.is_empty() || lists.iter().any(|list| list.is_empty()) {
        return;
    }
    let mut indices = vec![0usize; lists.len()];
    let mut current: Vec<&T> = lists.iter().map(|list| &list[0]).collect();
    'outer: loop {
        visit(&current);
        let mut pos = lists.len() - 1;
        loop {
            indices[pos] += 1;
            if indices[pos] < lists[pos].len() {
                current[pos] = &lists[pos][indices[pos]];
                break;
            }
            indices[pos] = 0;
            current[pos] = &lists[pos][0];
            if pos == 0 {
                break 'outer;
            }
            pos -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_query_trims_and_folds() {
        assert_eq!(split_query("Aachen, Alsdorf "), vec!["aachen", "alsdorf"]);
        assert_eq!(split_query("x,x , x"), vec!["x"]);
        assert_eq!(split_query(""), vec![""]);
    }

    #[test]
    fn test_product_visits_all_tuples() {
        let a = vec![1, 2];
        let b = vec![10, 20, 30];
        let mut seen = Vec::new();
        for_each_product(&[&a, &b], |tuple| {
            seen.push((*tuple[0], *tuple[1]));
        });
        assert_eq!(seen.len(), 6);
        assert_eq!(seen[0], (1, 10));
        assert_eq!(seen[5], (2, 30));
    }

    #[test]
    fn test_product_with_empty_list_visits_nothing() {
        let a = vec![1, 2];
        let b: Vec<i32> = Vec::new();
        let mut count = 0;
        for_each_product(&[&a, &b], |_| count += 1);
        assert_eq!(count, 0);
    }
}
