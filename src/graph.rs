//! # GraphIndex — Temporal Hierarchy Builder
//!
//! Turns the raw item/name/type/relation tables into a navigable
//! administrative hierarchy: item, type, and name indices, the set of all
//! root-to-descendant paths, and the reachability (same-chain) relation.
//!
//! Construction is a single-threaded fixed-point computation: a frontier of
//! partial paths is expanded level by level, each extension intersecting the
//! edge's validity interval with the interval accumulated along the path.
//! A branch whose interval empties is pruned silently. After `build()` the
//! index is immutable and can be shared read-only across matching workers.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use crate::config::IndexConfig;
use crate::loader::RawTables;
use crate::model::{julian_year_spans, HierarchyPath, ItemId, NameRecord, Relation, TypeId, TypeRecord};
use crate::{Error, Result};

// ============================================================================
// Build-time scratch types
// ============================================================================

/// Raw rows grouped by item id, deleted rows already dropped.
struct FilteredTables {
    /// id → textual id, for every surviving item.
    items: HashMap<ItemId, String>,
    names: HashMap<ItemId, Vec<NameRecord>>,
    types: HashMap<ItemId, Vec<TypeRecord>>,
    relations: Vec<Relation>,
}

/// A partial path still on the frontier, with its accumulated validity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PendingPath {
    ids: SmallVec<[ItemId; 8]>,
    tmin: i64,
    tmax: i64,
}

impl PendingPath {
    fn root(id: ItemId, tmin: i64, tmax: i64) -> Self {
        let mut ids = SmallVec::new();
        ids.push(id);
        Self { ids, tmin, tmax }
    }

    fn extended(&self, child: ItemId, tmin: i64, tmax: i64) -> Self {
        let mut ids = self.ids.clone();
        ids.push(child);
        Self { ids, tmin, tmax }
    }
}

// ============================================================================
// GraphIndex
// ============================================================================

/// The fully-built hierarchy index. Immutable after `build()`.
///
/// Only items actually reached from a supernode appear in the indexed maps;
/// the raw tables are not retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphIndex {
    config: IndexConfig,
    /// Reached item → its textual id.
    items_by_id: HashMap<ItemId, String>,
    /// Reached item → type codes valid on at least one accepted path.
    types_by_id: HashMap<ItemId, HashSet<TypeId>>,
    /// Reached item → display name(s) chosen by the language/time priority.
    names_by_id: HashMap<ItemId, HashSet<String>>,
    /// Inverse of `names_by_id`.
    ids_by_name: HashMap<String, HashSet<ItemId>>,
    /// Inverse of `types_by_id`.
    ids_by_type: HashMap<TypeId, HashSet<ItemId>>,
    /// Type code → German display name.
    type_names_by_type: HashMap<TypeId, String>,
    /// Every maximal root-to-descendant chain.
    all_paths: HashSet<HierarchyPath>,
    /// Same-chain co-occurrence; never contains the key itself.
    reachable_by_id: HashMap<ItemId, HashSet<ItemId>>,
}

impl GraphIndex {
    /// Build the full index from raw tables.
    ///
    /// Fatal on duplicate item ids; everything else (unknown references,
    /// branches losing temporal validity) is filtered or pruned silently.
    pub fn build(tables: &RawTables, config: IndexConfig) -> Result<Self> {
        info!(items = tables.items.len(), "building hierarchy index");
        let filtered = prefilter(tables, &config)?;
        let years = julian_year_spans();
        let type_names_by_type = index_type_names(tables, &config);

        let mut index = Self {
            config,
            items_by_id: HashMap::new(),
            types_by_id: HashMap::new(),
            names_by_id: HashMap::new(),
            ids_by_name: HashMap::new(),
            ids_by_type: HashMap::new(),
            type_names_by_type,
            all_paths: HashSet::new(),
            reachable_by_id: HashMap::new(),
        };

        index.expand_paths(&filtered, &years);
        index.invert_indices();
        index.collect_reachability();

        info!(
            reached = index.items_by_id.len(),
            paths = index.all_paths.len(),
            names = index.ids_by_name.len(),
            "finished hierarchy index"
        );
        Ok(index)
    }

    // ========================================================================
    // Fixed-point frontier expansion
    // ========================================================================

    fn expand_paths(&mut self, filtered: &FilteredTables, years: &HashSet<(i64, i64)>) {
        let (t_begin, t_end) = (self.config.study_begin, self.config.study_end);

        // Seed the frontier at the supernodes with the full study window.
        let mut frontier: HashMap<ItemId, HashSet<PendingPath>> = HashMap::new();
        let supernodes: Vec<ItemId> = self.config.supernodes.iter().copied().collect();
        for root in supernodes {
            let Some(textual) = filtered.items.get(&root) else {
                warn!(%root, "supernode missing from item table, skipping");
                continue;
            };
            self.items_by_id.insert(root, textual.clone());
            self.collect_types(filtered, years, root, t_begin, t_end);
            self.collect_names(filtered, years, root, t_begin, t_end);
            frontier
                .entry(root)
                .or_default()
                .insert(PendingPath::root(root, t_begin, t_end));
        }

        let mut final_paths: HashSet<PendingPath> = HashSet::new();
        loop {
            let mut next: HashMap<ItemId, HashSet<PendingPath>> = HashMap::new();
            let mut extended_leaves: HashSet<ItemId> = HashSet::new();

            for rel in &filtered.relations {
                let Some(pending) = frontier.get(&rel.parent) else { continue };
                for path in pending {
                    let tmin = rel.span.begin.max(path.tmin);
                    let mut tmax = rel.span.end.min(path.tmax);
                    // A validity of exactly one calendar year means "since
                    // that year": keep the inherited upper bound.
                    if years.contains(&(rel.span.begin, rel.span.end)) {
                        tmax = path.tmax;
                    }
                    if tmin > tmax {
                        continue;
                    }
                    if self.collect_types(filtered, years, rel.child, tmin, tmax) {
                        extended_leaves.insert(rel.parent);
                        next.entry(rel.child)
                            .or_default()
                            .insert(path.extended(rel.child, tmin, tmax));
                        if let Some(textual) = filtered.items.get(&rel.child) {
                            self.items_by_id.insert(rel.child, textual.clone());
                        }
                        self.collect_names(filtered, years, rel.child, tmin, tmax);
                    }
                }
            }

            // A leaf that extended moves on; every path still sitting on the
            // frontier found no extension and is final.
            for leaf in &extended_leaves {
                frontier.remove(leaf);
            }
            for paths in frontier.values() {
                final_paths.extend(paths.iter().cloned());
            }
            debug!(
                finalized = final_paths.len(),
                extended = extended_leaves.len(),
                "frontier round complete"
            );

            let fixed_point = extended_leaves.is_empty();
            frontier = next;
            if fixed_point {
                break;
            }
        }

        self.all_paths = final_paths
            .into_iter()
            .map(|p| p.ids.into_iter().collect())
            .collect();
    }

    /// Record the item's type codes that are admissible over `[tmin, tmax]`.
    /// Returns false if none are, which rejects the path extension.
    fn collect_types(
        &mut self,
        filtered: &FilteredTables,
        years: &HashSet<(i64, i64)>,
        id: ItemId,
        tmin: i64,
        tmax: i64,
    ) -> bool {
        let Some(records) = filtered.types.get(&id) else { return false };
        let mut found = false;
        for t in records {
            if self.config.undesired_types.contains(&t.code) {
                continue;
            }
            let time_ok = t.span.overlaps(tmin, tmax)
                || (years.contains(&(t.span.begin, t.span.end)) && t.span.begin <= tmax);
            if time_ok {
                self.types_by_id.entry(id).or_default().insert(t.code);
                found = true;
            }
        }
        found
    }

    /// Resolve the item's display name(s) with the six-tier priority:
    /// time-valid German > time-valid favored-foreign > time-valid other,
    /// then the same language cascade ignoring time. The first non-empty
    /// tier is taken in full; ties are kept.
    fn collect_names(
        &mut self,
        filtered: &FilteredTables,
        years: &HashSet<(i64, i64)>,
        id: ItemId,
        tmin: i64,
        tmax: i64,
    ) {
        let Some(records) = filtered.names.get(&id) else { return };

        let mut tiers: [Vec<&str>; 6] = Default::default();
        for n in records {
            let time_ok = n.span.overlaps(tmin, tmax)
                || (years.contains(&(n.span.begin, n.span.end)) && n.span.begin <= tmax);
            let language_rank = if n.language == self.config.primary_language {
                0
            } else if self.config.favored_languages.contains(&n.language) {
                1
            } else {
                2
            };
            let tier = if time_ok { language_rank } else { language_rank + 3 };
            tiers[tier].push(n.content.as_str());
        }

        if let Some(winning) = tiers.iter().find(|tier| !tier.is_empty()) {
            self.names_by_id
                .entry(id)
                .or_default()
                .extend(winning.iter().map(|s| s.to_string()));
        }
    }

    // ========================================================================
    // Derived indices
    // ========================================================================

    fn invert_indices(&mut self) {
        for (&id, names) in &self.names_by_id {
            for name in names {
                self.ids_by_name.entry(name.clone()).or_default().insert(id);
            }
        }
        for (&id, types) in &self.types_by_id {
            for &code in types {
                self.ids_by_type.entry(code).or_default().insert(id);
            }
        }
    }

    fn collect_reachability(&mut self) {
        for path in &self.all_paths {
            let members: HashSet<ItemId> = path.iter().collect();
            for &id in &members {
                let entry = self.reachable_by_id.entry(id).or_default();
                entry.extend(members.iter().copied().filter(|&other| other != id));
            }
        }
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// All location names known to the index.
    pub fn loc_names(&self) -> impl Iterator<Item = &str> {
        self.ids_by_name.keys().map(String::as_str)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.ids_by_name.contains_key(name)
    }

    pub fn ids_for_name(&self, name: &str) -> Option<&HashSet<ItemId>> {
        self.ids_by_name.get(name)
    }

    pub fn names_for_id(&self, id: ItemId) -> Option<&HashSet<String>> {
        self.names_by_id.get(&id)
    }

    pub fn types_for_id(&self, id: ItemId) -> Option<&HashSet<TypeId>> {
        self.types_by_id.get(&id)
    }

    pub fn textual_id(&self, id: ItemId) -> Option<&str> {
        self.items_by_id.get(&id).map(String::as_str)
    }

    /// German display name of a type code.
    pub fn type_name(&self, code: TypeId) -> Option<&str> {
        self.type_names_by_type.get(&code).map(String::as_str)
    }

    pub fn reachable_from(&self, id: ItemId) -> Option<&HashSet<ItemId>> {
        self.reachable_by_id.get(&id)
    }

    pub fn all_paths(&self) -> &HashSet<HierarchyPath> {
        &self.all_paths
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Number of items reached by the traversal.
    pub fn item_count(&self) -> usize {
        self.items_by_id.len()
    }

    // ========================================================================
    // Set-union lookups (the matcher's working vocabulary)
    // ========================================================================

    /// Union of the ids carrying any of the given type codes.
    pub fn ids_for_types(&self, types: &HashSet<TypeId>) -> HashSet<ItemId> {
        let mut out = HashSet::new();
        for code in types {
            if let Some(ids) = self.ids_by_type.get(code) {
                out.extend(ids.iter().copied());
            }
        }
        out
    }

    /// Union of the display names of the given ids.
    pub fn names_for_ids<'a>(
        &'a self,
        ids: impl IntoIterator<Item = ItemId>,
    ) -> HashSet<&'a str> {
        let mut out = HashSet::new();
        for id in ids {
            if let Some(names) = self.names_by_id.get(&id) {
                out.extend(names.iter().map(String::as_str));
            }
        }
        out
    }

    /// Union of the ids resolved from the given names.
    pub fn ids_for_names<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> HashSet<ItemId> {
        let mut out = HashSet::new();
        for name in names {
            if let Some(ids) = self.ids_by_name.get(name) {
                out.extend(ids.iter().copied());
            }
        }
        out
    }

    /// Union of the reachable sets of the given ids.
    pub fn reachable_for_ids(&self, ids: &HashSet<ItemId>) -> HashSet<ItemId> {
        let mut out = HashSet::new();
        for id in ids {
            if let Some(reachable) = self.reachable_by_id.get(id) {
                out.extend(reachable.iter().copied());
            }
        }
        out
    }

    // ========================================================================
    // Path decoding (presentation helpers)
    // ========================================================================

    /// Textual ids along a path.
    pub fn decode_path_textual(&self, path: &HierarchyPath) -> Vec<&str> {
        path.iter().filter_map(|id| self.textual_id(id)).collect()
    }

    /// One display name per path member (lexicographically first of the
    /// tied names, for stable output).
    pub fn decode_path_names(&self, path: &HierarchyPath) -> Vec<&str> {
        path.iter()
            .filter_map(|id| {
                self.names_by_id
                    .get(&id)
                    .and_then(|names| names.iter().map(String::as_str).min())
            })
            .collect()
    }

    /// One type display name per path member.
    pub fn decode_path_types(&self, path: &HierarchyPath) -> Vec<&str> {
        path.iter()
            .filter_map(|id| {
                let types = self.types_by_id.get(&id)?;
                let code = types.iter().min()?;
                self.type_name(*code)
            })
            .collect()
    }
}

// ============================================================================
// Pre-filtering
// ============================================================================

/// Drop rows touching deleted or unknown items, and relations outside the
/// study window.
fn prefilter(tables: &RawTables, config: &IndexConfig) -> Result<FilteredTables> {
    let mut items = HashMap::with_capacity(tables.items.len());
    let mut deleted = HashSet::new();
    for item in &tables.items {
        if items.insert(item.id, item.textual_id.clone()).is_some() {
            return Err(Error::DataIntegrity(format!("duplicate item id {}", item.id)));
        }
        if item.deleted {
            deleted.insert(item.id);
        }
    }
    let alive = |id: ItemId| items.contains_key(&id) && !deleted.contains(&id);

    let mut names: HashMap<ItemId, Vec<NameRecord>> = HashMap::new();
    for n in tables.names.iter().filter(|n| alive(n.item_id)) {
        names.entry(n.item_id).or_default().push(n.clone());
    }

    let mut types: HashMap<ItemId, Vec<TypeRecord>> = HashMap::new();
    for t in tables.types.iter().filter(|t| alive(t.item_id)) {
        types.entry(t.item_id).or_default().push(*t);
    }

    let relations: Vec<Relation> = tables
        .relations
        .iter()
        .filter(|r| {
            r.span.begin < config.study_end
                && r.span.end > config.study_begin
                && alive(r.parent)
                && alive(r.child)
        })
        .copied()
        .collect();

    for id in &deleted {
        items.remove(id);
    }

    debug!(
        items = items.len(),
        relations = relations.len(),
        "pre-filtered raw tables"
    );
    Ok(FilteredTables { items, names, types, relations })
}

/// Type code → German display name.
fn index_type_names(tables: &RawTables, config: &IndexConfig) -> HashMap<TypeId, String> {
    tables
        .type_names
        .iter()
        .filter(|tn| tn.language == config.primary_language)
        .map(|tn| (tn.type_id, tn.value.clone()))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
