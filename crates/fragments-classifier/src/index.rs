// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Classification index data structure
//!
//! A two-level named mapping: system name -> class name -> group. All
//! creation and pruning goes through the methods here; callers never reach
//! into the maps to do their own existence checks.

use fragments_model::{ExpressId, FragmentId};
use rustc_hash::{FxHashMap, FxHashSet};

/// Fragments and the entity ids they matched
pub type FragmentIdMap = FxHashMap<FragmentId, FxHashSet<ExpressId>>;

/// Union `from` into `into`, merging per-fragment id sets
///
/// Combines query results: a fragment present in both keeps the union of its
/// matched ids.
pub fn merge(into: &mut FragmentIdMap, from: FragmentIdMap) {
    for (fragment_id, ids) in from {
        into.entry(fragment_id).or_default().extend(ids);
    }
}

/// One class within a classification system
///
/// `parent_id` links spatial classes to the express id of the containing
/// entity (the storey or space); `None` for every other criterion.
#[derive(Debug, Clone, Default)]
pub struct ClassificationGroup {
    /// Matched entity ids per fragment
    pub map: FragmentIdMap,
    /// Class name, duplicated from the index key for export convenience
    pub name: String,
    /// Express id of the containing entity, when applicable
    pub parent_id: Option<ExpressId>,
}

impl ClassificationGroup {
    pub fn new(name: impl Into<String>, parent_id: Option<ExpressId>) -> Self {
        Self {
            map: FragmentIdMap::default(),
            name: name.into(),
            parent_id,
        }
    }

    /// Record one matched entity on one fragment
    pub fn insert(&mut self, fragment_id: FragmentId, id: ExpressId) {
        self.map.entry(fragment_id).or_default().insert(id);
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// One classification system: class name -> group
pub type ClassificationSystem = FxHashMap<String, ClassificationGroup>;

/// The root index: system name -> system
#[derive(Debug, Default)]
pub struct ClassificationIndex {
    systems: FxHashMap<String, ClassificationSystem>,
}

impl ClassificationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a system by name
    pub fn system(&self, name: &str) -> Option<&ClassificationSystem> {
        self.systems.get(name)
    }

    /// Names of all populated systems
    pub fn system_names(&self) -> Vec<String> {
        self.systems.keys().cloned().collect()
    }

    /// Get or lazily create a class group
    ///
    /// An existing group keeps its original `parent_id`; the argument only
    /// applies on first creation.
    pub fn group_mut(
        &mut self,
        system: &str,
        class: &str,
        parent_id: Option<ExpressId>,
    ) -> &mut ClassificationGroup {
        self.systems
            .entry(system.to_string())
            .or_default()
            .entry(class.to_string())
            .or_insert_with(|| ClassificationGroup::new(class, parent_id))
    }

    /// Delete one fragment's entry from every class of every system
    ///
    /// Empty classes and systems are left in place. Disposal cleanup prunes;
    /// this removal path intentionally does not (legacy behavior callers may
    /// rely on).
    pub fn purge_fragment(&mut self, fragment_id: &FragmentId) {
        for system in self.systems.values_mut() {
            for group in system.values_mut() {
                group.map.remove(fragment_id);
            }
        }
    }

    /// React to a fragment disposal notification
    ///
    /// Per system: a class named after the disposed group is deleted whole;
    /// otherwise the disposed fragment ids are purged from every class.
    /// Classes and systems left empty are pruned.
    pub fn apply_disposal(&mut self, group_id: &str, fragment_ids: &[FragmentId]) {
        for system in self.systems.values_mut() {
            if system.remove(group_id).is_none() {
                for group in system.values_mut() {
                    for fragment_id in fragment_ids {
                        group.map.remove(fragment_id);
                    }
                }
                system.retain(|_, group| !group.is_empty());
            }
        }
        self.systems.retain(|_, system| !system.is_empty());
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.systems.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}
