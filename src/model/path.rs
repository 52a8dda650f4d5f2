//! HierarchyPath — one full administrative chain.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::ItemId;

/// An ordered id sequence from a supernode down to a descendant.
///
/// Paths are maximal chains: the last member found no accepted extension
/// during construction. The validity interval accumulated while building the
/// path is not retained.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HierarchyPath {
    ids: SmallVec<[ItemId; 8]>,
}

impl HierarchyPath {
    /// Path consisting of a single root node.
    pub fn root(id: ItemId) -> Self {
        let mut ids = SmallVec::new();
        ids.push(id);
        Self { ids }
    }

    /// The supernode this chain starts at.
    pub fn start(&self) -> ItemId {
        self.ids[0]
    }

    /// The deepest member of the chain.
    pub fn end(&self) -> ItemId {
        self.ids[self.ids.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.ids.iter().copied()
    }

    /// New path extended by one child.
    pub fn extended(&self, child: ItemId) -> Self {
        let mut ids = self.ids.clone();
        ids.push(child);
        Self { ids }
    }
}

impl FromIterator<ItemId> for HierarchyPath {
    fn from_iter<T: IntoIterator<Item = ItemId>>(iter: T) -> Self {
        Self { ids: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a HierarchyPath {
    type Item = ItemId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, ItemId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter().copied()
    }
}
