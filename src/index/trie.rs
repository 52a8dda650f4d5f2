//! Trie-bounded Levenshtein search.
//!
//! The dictionary lives in a character trie; a search walks it depth-first
//! carrying one dynamic-programming row per depth and prunes a whole subtree
//! as soon as no completion can stay within budget. Cost is therefore
//! proportional to the trie region within edit distance of the query, not to
//! dictionary size — the reason this exists instead of pairwise distances.

use std::collections::BTreeMap;

// ============================================================================
// Trie
// ============================================================================

#[derive(Debug, Default)]
struct TrieNode {
    /// Set on terminal nodes; holds the inserted word.
    word: Option<String>,
    /// BTreeMap keeps child traversal order stable across runs.
    children: BTreeMap<char, TrieNode>,
}

/// A dictionary of candidate strings supporting bounded edit-distance search.
#[derive(Debug, Default)]
pub struct EditDistanceIndex {
    root: TrieNode,
    word_count: usize,
}

impl EditDistanceIndex {
    /// Build from any collection of words. Words are lower-cased on insert.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::default();
        for word in words {
            index.insert(word.as_ref());
        }
        index
    }

    fn insert(&mut self, word: &str) {
        let word = word.to_lowercase();
        let mut node = &mut self.root;
        for ch in word.chars() {
            node = node.children.entry(ch).or_default();
        }
        if node.word.is_none() {
            self.word_count += 1;
        }
        node.word = Some(word);
    }

    pub fn len(&self) -> usize {
        self.word_count
    }

    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }

    /// Every dictionary word within `max_cost` edits of `query`, with its
    /// exact distance. Order follows the trie walk.
    pub fn search(&self, query: &str, max_cost: u32) -> Vec<(String, u32)> {
        let query: Vec<char> = query.to_lowercase().chars().collect();
        let first_row: Vec<u32> = (0..=query.len() as u32).collect();

        let mut results = Vec::new();
        for (&ch, child) in &self.root.children {
            search_recursive(child, ch, &query, &first_row, max_cost, &mut results);
        }
        results
    }

    /// The candidates achieving the minimum cost actually observed, sorted.
    /// Looser matches are discarded even when nominally within budget.
    pub fn best_candidates(&self, query: &str, max_cost: u32) -> Vec<String> {
        let found = self.search(query, max_cost);
        let Some(best) = found.iter().map(|&(_, cost)| cost).min() else {
            return Vec::new();
        };
        let mut candidates: Vec<String> = found
            .into_iter()
            .filter(|&(_, cost)| cost == best)
            .map(|(word, _)| word)
            .collect();
        candidates.sort();
        candidates.dedup();
        candidates
    }
}

/// One step of the walk: compute the DP row for `ch` from the parent's row,
/// emit the node's word if it lands within budget, descend while any cell
/// still can.
fn search_recursive(
    node: &TrieNode,
    ch: char,
    query: &[char],
    previous_row: &[u32],
    max_cost: u32,
    results: &mut Vec<(String, u32)>,
) {
    let columns = query.len() + 1;
    let mut current_row = Vec::with_capacity(columns);
    current_row.push(previous_row[0] + 1);

    for column in 1..columns {
        let insert_cost = current_row[column - 1] + 1;
        let delete_cost = previous_row[column] + 1;
        let replace_cost = if query[column - 1] == ch {
            previous_row[column - 1]
        } else {
            previous_row[column - 1] + 1
        };
        current_row.push(insert_cost.min(delete_cost).min(replace_cost));
    }

    if let Some(word) = &node.word {
        let cost = current_row[columns - 1];
        if cost <= max_cost {
            results.push((word.clone(), cost));
        }
    }

    if current_row.iter().copied().min().unwrap_or(u32::MAX) <= max_cost {
        for (&next_ch, child) in &node.children {
            search_recursive(child, next_ch, query, &current_row, max_cost, results);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn index() -> EditDistanceIndex {
        EditDistanceIndex::from_words(["aachen", "ahen", "preussen", "neustadt", "neusttadt"])
    }

    #[test]
    fn test_exact_match_has_cost_zero() {
        let found = index().search("aachen", 2);
        assert!(found.contains(&("aachen".to_string(), 0)));
    }

    #[test]
    fn test_search_respects_budget() {
        // "aaachen" is 1 edit from "aachen", 3 from "ahen".
        let found = index().search("aaachen", 1);
        assert_eq!(found, vec![("aachen".to_string(), 1)]);

        let found = index().search("aaachen", 3);
        assert!(found.contains(&("aachen".to_string(), 1)));
        assert!(found.contains(&("ahen".to_string(), 3)));
    }

    #[test]
    fn test_best_candidates_keep_only_minimum_cost() {
        // Both variants of neustadt are within 2 edits, but only the
        // distance-1 one survives.
        let candidates = index().best_candidates("neusstadt", 2);
        assert_eq!(candidates, vec!["neustadt".to_string(), "neusttadt".to_string()]);

        let candidates = index().best_candidates("neustadt", 2);
        assert_eq!(candidates, vec!["neustadt".to_string()]);
    }

    #[test]
    fn test_case_folding() {
        let found = index().search("AACHEN", 0);
        assert_eq!(found, vec![("aachen".to_string(), 0)]);
    }

    #[test]
    fn test_empty_dictionary() {
        let index = EditDistanceIndex::from_words(Vec::<String>::new());
        assert!(index.is_empty());
        assert!(index.search("anything", 3).is_empty());
    }

    /// Reference single-pair Levenshtein for the property test.
    fn levenshtein(a: &str, b: &str) -> u32 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let mut prev: Vec<u32> = (0..=b.len() as u32).collect();
        for (i, &ca) in a.iter().enumerate() {
            let mut row = vec![i as u32 + 1];
            for (j, &cb) in b.iter().enumerate() {
                let subst = prev[j] + u32::from(ca != cb);
                row.push(subst.min(prev[j + 1] + 1).min(row[j] + 1));
            }
            prev = row;
        }
        prev[b.len()]
    }

    proptest::proptest! {
        #[test]
        fn prop_search_agrees_with_pairwise_distance(
            words in proptest::collection::vec("[a-cß]{0,6}", 1..12),
            query in "[a-cß]{0,6}",
            max_cost in 0u32..4,
        ) {
            let index = EditDistanceIndex::from_words(words.clone());
            let found = index.search(&query, max_cost);

            for (word, cost) in &found {
                proptest::prop_assert_eq!(levenshtein(&query, word), *cost);
                proptest::prop_assert!(*cost <= max_cost);
            }

            // Nothing in budget is missed.
            let mut unique: Vec<&String> = words.iter().collect();
            unique.sort();
            unique.dedup();
            let in_budget = unique
                .iter()
                .filter(|w| levenshtein(&query, w) <= max_cost)
                .count();
            proptest::prop_assert_eq!(found.len(), in_budget);
        }
    }
}
