// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loaded-model contract
//!
//! A [`FragmentsGroup`] is one loaded model: the entity records materialized
//! by the loader plus an async [`PropertySource`] for everything that was not
//! materialized up front. Property lookups are the only suspension points in
//! the classification engine, so the source is a trait seam rather than a
//! concrete map: an in-memory backend answers immediately, a WASM- or
//! network-backed one does not.

use crate::{ExpressId, FragmentId, GeometryKey, ItemData, ItemProperties};
use std::collections::HashMap;
use std::future::Future;

/// Async entity property lookup
///
/// Implementations must return `None` for unknown ids rather than erroring;
/// absent properties are an expected condition.
pub trait PropertySource {
    /// Look up the decoded property record of one entity
    fn properties(
        &self,
        id: ExpressId,
    ) -> impl Future<Output = Option<ItemProperties>> + '_;

    /// All express ids that have a property record
    fn all_ids(&self) -> Vec<ExpressId>;
}

/// In-memory property source
///
/// The trivial backend: a prebuilt map. Used by tests and by loaders that
/// materialize all properties at load time.
#[derive(Clone, Debug, Default)]
pub struct MemoryPropertySource {
    entries: HashMap<ExpressId, ItemProperties>,
}

impl MemoryPropertySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ExpressId, properties: ItemProperties) {
        self.entries.insert(id, properties);
    }
}

impl PropertySource for MemoryPropertySource {
    fn properties(
        &self,
        id: ExpressId,
    ) -> impl Future<Output = Option<ItemProperties>> + '_ {
        std::future::ready(self.entries.get(&id).cloned())
    }

    fn all_ids(&self) -> Vec<ExpressId> {
        self.entries.keys().copied().collect()
    }
}

/// One loaded model
///
/// `data` holds every entity's geometry keys and category code;
/// `key_fragments` resolves geometry keys to the fragment batches the
/// renderer owns. Property access goes through the generic source.
#[derive(Clone, Debug)]
pub struct FragmentsGroup<P: PropertySource> {
    /// Model identifier (loader-assigned uuid)
    pub id: String,
    /// Human-readable model name
    pub name: String,
    /// Entity records keyed by express id
    pub data: HashMap<ExpressId, ItemData>,
    /// Geometry key to fragment resolution table
    pub key_fragments: HashMap<GeometryKey, FragmentId>,
    /// Property lookup backend
    pub properties: P,
}

impl<P: PropertySource> FragmentsGroup<P> {
    pub fn new(id: impl Into<String>, name: impl Into<String>, properties: P) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data: HashMap::new(),
            key_fragments: HashMap::new(),
            properties,
        }
    }

    /// Look up one entity's properties through the backend
    pub async fn get_properties(&self, id: ExpressId) -> Option<ItemProperties> {
        self.properties.properties(id).await
    }

    /// All express ids with a property record
    pub fn all_properties_ids(&self) -> Vec<ExpressId> {
        self.properties.all_ids()
    }

    /// Resolve the fragments an entity's geometry is batched into
    ///
    /// Geometry keys with no entry in `key_fragments` are skipped.
    pub fn fragments_of(&self, id: ExpressId) -> Vec<&FragmentId> {
        let Some(item) = self.data.get(&id) else {
            return Vec::new();
        };
        item.geometry_keys
            .iter()
            .filter_map(|key| self.key_fragments.get(key))
            .collect()
    }
}
