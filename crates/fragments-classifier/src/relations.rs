// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-model relation index
//!
//! Stores precomputed entity relations per model: for every express id, the
//! related ids under each inverse-attribute name. Spatial classification
//! requires a model's map to exist and fails fast when it does not.

use fragments_model::{ExpressId, IfcRelation, ItemProperties, RelationName};
use rustc_hash::FxHashMap;

/// Relations of a single entity, keyed by inverse-attribute name
pub type EntityRelations = FxHashMap<RelationName, Vec<ExpressId>>;

/// Relation map of one model: express id to its indexed relations
pub type ModelRelations = FxHashMap<ExpressId, EntityRelations>;

/// Precomputed relation maps keyed by model identifier
#[derive(Debug, Default)]
pub struct RelationsIndexer {
    /// One relation map per indexed model
    pub relation_maps: FxHashMap<String, ModelRelations>,
}

impl RelationsIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a model has been indexed
    pub fn has_model(&self, model_id: &str) -> bool {
        self.relation_maps.contains_key(model_id)
    }

    /// Related ids of one entity under one relation name
    pub fn get_entity_relations(
        &self,
        model_id: &str,
        id: ExpressId,
        name: RelationName,
    ) -> Option<&[ExpressId]> {
        self.relation_maps
            .get(model_id)?
            .get(&id)?
            .get(&name)
            .map(Vec::as_slice)
    }

    /// Record related ids for one entity
    ///
    /// Creates the model's map on first use. Repeated calls for the same
    /// (entity, name) pair append without deduplication, matching how
    /// relationship records accumulate.
    pub fn set_entity_relations(
        &mut self,
        model_id: &str,
        id: ExpressId,
        name: RelationName,
        related: impl IntoIterator<Item = ExpressId>,
    ) {
        self.relation_maps
            .entry(model_id.to_string())
            .or_default()
            .entry(id)
            .or_default()
            .entry(name)
            .or_default()
            .extend(related);
    }

    /// Index one relationship record into both of its directions
    ///
    /// Given a recognized relationship and its decoded record, stores the
    /// related ids on the relating entity and the relating id on each related
    /// entity, under the relationship's two inverse-attribute names.
    pub fn index_relation(
        &mut self,
        model_id: &str,
        relation: IfcRelation,
        record: &ItemProperties,
    ) {
        let Some(relating) = record
            .get(relation.relating_attribute())
            .and_then(|value| value.as_entity_ref())
        else {
            return;
        };
        let related = record
            .get(relation.related_attribute())
            .map(|value| value.as_refs())
            .unwrap_or_default();
        if related.is_empty() {
            return;
        }

        let (on_relating, on_related) = relation.relation_names();
        self.set_entity_relations(model_id, relating, on_relating, related.iter().copied());
        for id in related {
            self.set_entity_relations(model_id, id, on_related, [relating]);
        }
    }

    /// Drop a model's relation map
    pub fn remove_model(&mut self, model_id: &str) {
        self.relation_maps.remove(model_id);
    }
}
