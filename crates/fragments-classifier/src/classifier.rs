// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Multi-criteria classification engine
//!
//! The [`Classifier`] populates a [`ClassificationIndex`] from different
//! criteria over loaded [`FragmentsGroup`]s and answers intersection queries
//! over it. Builders are cooperative: the only suspension points are property
//! lookups, and no two builders should be interleaved against the same
//! classifier. The disposal subscription only ever deletes entries, so it is
//! safe to run between suspension points.

use crate::event::{Event, HandlerId};
use crate::fragments::FragmentsManager;
use crate::index::{ClassificationIndex, ClassificationSystem, FragmentIdMap};
use crate::relations::RelationsIndexer;
use fragments_model::{
    ClassifierError, Color, ExpressId, FragmentId, FragmentsGroup, IfcCategory, IfcRelation,
    PropertySource, RelationName, Result,
};
use log::warn;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Well-known system names produced by the built-in builders
pub mod systems {
    pub const MODELS: &str = "models";
    pub const PREDEFINED_TYPES: &str = "predefinedTypes";
    pub const ENTITIES: &str = "entities";
    pub const SPATIAL_STRUCTURES: &str = "spatialStructures";
}

/// Class name used when a relating entity's name cannot be resolved
pub const NO_REL_NAME: &str = "NO REL NAME";

/// Class name used when a category code is not in the category table
pub const UNKNOWN_CATEGORY: &str = "UNKNOWN";

/// Options for spatial-structure classification
#[derive(Clone, Debug)]
pub struct SpatialStructureConfig {
    /// Resolve class names through each container's `Name` property.
    /// When disabled the container's identifier string is used instead,
    /// which avoids one property lookup per container.
    pub use_properties: bool,
    /// Restrict classification to containers whose category code is in this
    /// set (e.g. only building storeys). `None` classifies all containers.
    pub isolate: Option<FxHashSet<u32>>,
}

impl Default for SpatialStructureConfig {
    fn default() -> Self {
        Self {
            use_properties: true,
            isolate: None,
        }
    }
}

/// Query filter: system name -> accepted class names
///
/// Deliberately the std map rather than the engine's `FxHashMap`: filters are
/// small, caller-built values, and the public seam should not force a hasher
/// choice on callers.
pub type FindFilter = HashMap<String, Vec<String>>;

/// Classification engine over loaded fragment models
///
/// Owns the nested classification index and keeps it consistent with the
/// [`FragmentsManager`]'s live state through a disposal subscription taken at
/// construction and released in [`Classifier::dispose`].
pub struct Classifier {
    list: Rc<RefCell<ClassificationIndex>>,
    fragments: Rc<RefCell<FragmentsManager>>,
    subscription: Option<HandlerId>,
    /// Fired once when the classifier is disposed
    pub on_disposed: Event<()>,
}

impl Classifier {
    /// Create an empty classifier subscribed to fragment disposal
    pub fn new(fragments: Rc<RefCell<FragmentsManager>>) -> Self {
        let list = Rc::new(RefCell::new(ClassificationIndex::new()));

        let index = Rc::clone(&list);
        let subscription = fragments.borrow_mut().on_fragments_disposed.subscribe(
            Box::new(move |event| {
                index
                    .borrow_mut()
                    .apply_disposal(&event.group_id, &event.fragment_ids);
            }),
        );

        Self {
            list,
            fragments,
            subscription: Some(subscription),
            on_disposed: Event::new(),
        }
    }

    /// Look up one classification system
    pub fn system(&self, name: &str) -> Option<Ref<'_, ClassificationSystem>> {
        Ref::filter_map(self.list.borrow(), |index| index.system(name)).ok()
    }

    /// Names of all populated systems
    pub fn system_names(&self) -> Vec<String> {
        self.list.borrow().system_names()
    }

    /// Export one system to plain maps (class name -> fragment map)
    pub fn export_system(&self, name: &str) -> Option<HashMap<String, FragmentIdMap>> {
        let index = self.list.borrow();
        let system = index.system(name)?;
        Some(
            system
                .iter()
                .map(|(class, group)| (class.clone(), group.map.clone()))
                .collect(),
        )
    }

    /// Shared insertion primitive used by every builder
    ///
    /// Resolves the entity's fragments through the group's key table and adds
    /// the express id to the class. Entities without a data record, and
    /// geometry keys without a fragment, are silently skipped.
    pub fn save_item<P: PropertySource>(
        &mut self,
        group: &FragmentsGroup<P>,
        system: &str,
        class: &str,
        id: ExpressId,
        parent_id: Option<ExpressId>,
    ) {
        let Some(item) = group.data.get(&id) else {
            return;
        };
        let mut index = self.list.borrow_mut();
        for key in &item.geometry_keys {
            let Some(fragment_id) = group.key_fragments.get(key) else {
                continue;
            };
            index
                .group_mut(system, class, parent_id)
                .insert(fragment_id.clone(), id);
        }
    }

    /// Classify every entity of a model under one class named after it
    pub fn by_model<P: PropertySource>(&mut self, model_id: &str, group: &FragmentsGroup<P>) {
        for id in group.data.keys().copied() {
            self.save_item(group, systems::MODELS, model_id, id, None);
        }
    }

    /// Classify entities by their IFC category
    ///
    /// Synchronous: category codes are already materialized in the group's
    /// data records. Codes missing from the table go to the
    /// [`UNKNOWN_CATEGORY`] class.
    pub fn by_entity<P: PropertySource>(&mut self, group: &FragmentsGroup<P>) {
        for (id, item) in &group.data {
            let class = IfcCategory::from_code(item.category)
                .map(IfcCategory::name)
                .unwrap_or(UNKNOWN_CATEGORY);
            self.save_item(group, systems::ENTITIES, class, *id, None);
        }
    }

    /// Classify entities by their uppercased `PredefinedType` property
    ///
    /// Entities without the property go to the `"undefined"` class. Unlike
    /// every other builder, a geometry key that resolves to no fragment is a
    /// hard error here.
    pub async fn by_predefined_type<P: PropertySource>(
        &mut self,
        group: &FragmentsGroup<P>,
    ) -> Result<()> {
        for id in group.all_properties_ids() {
            let Some(props) = group.get_properties(id).await else {
                continue;
            };
            let Some(item) = group.data.get(&id) else {
                continue;
            };
            let class = props
                .get("PredefinedType")
                .and_then(|value| value.as_enum().or_else(|| value.as_string()))
                .map(str::to_uppercase)
                .unwrap_or_else(|| "undefined".to_string());

            let mut index = self.list.borrow_mut();
            for key in &item.geometry_keys {
                let fragment_id = group
                    .key_fragments
                    .get(key)
                    .ok_or_else(|| {
                        ClassifierError::fragment_not_found(*key, group.name.as_str())
                    })?;
                index
                    .group_mut(systems::PREDEFINED_TYPES, &class, None)
                    .insert(fragment_id.clone(), id);
            }
        }
        Ok(())
    }

    /// Classify entities reached through one IFC relationship kind
    ///
    /// Walks every relationship record of the given category code; each
    /// related entity is classified under the relating entity's resolved
    /// name ([`NO_REL_NAME`] when it has none). A code the relationship
    /// table does not recognize makes this a no-op.
    pub async fn by_ifc_rel<P: PropertySource>(
        &mut self,
        group: &FragmentsGroup<P>,
        rel_code: u32,
        system_name: &str,
    ) -> Result<()> {
        let Some(rel) = IfcRelation::from_code(rel_code) else {
            warn!("relationship code {rel_code} is not recognized; nothing classified");
            return Ok(());
        };

        for id in group.all_properties_ids() {
            let Some(props) = group.get_properties(id).await else {
                continue;
            };
            if props.category != rel_code {
                continue;
            }
            let Some(relating) = props
                .get(rel.relating_attribute())
                .and_then(|value| value.as_entity_ref())
            else {
                continue;
            };
            let related = props
                .get(rel.related_attribute())
                .map(|value| value.as_refs())
                .unwrap_or_default();

            let class = match group.get_properties(relating).await {
                Some(relating_props) => relating_props.name().map(str::to_string),
                None => None,
            }
            .unwrap_or_else(|| NO_REL_NAME.to_string());

            for related_id in related {
                self.save_item(group, system_name, &class, related_id, None);
            }
        }
        Ok(())
    }

    /// Classify entities by their spatial containment hierarchy
    ///
    /// Walks each indexed entity's `Decomposes` and `ContainsElements`
    /// relations, then reattaches decomposed sub-parts through a nested
    /// `IsDecomposedBy` pass so assemblies and their parts land in the same
    /// spatial class. Fails fast when the model's relations were never
    /// indexed.
    pub async fn by_spatial_structure<P: PropertySource>(
        &mut self,
        group: &FragmentsGroup<P>,
        indexer: &RelationsIndexer,
        config: &SpatialStructureConfig,
    ) -> Result<()> {
        let Some(model_relations) = indexer.relation_maps.get(&group.id) else {
            return Err(ClassifierError::relations_not_indexed(group.name.as_str()));
        };
        let ids: Vec<ExpressId> = model_relations.keys().copied().collect();

        for express_id in ids {
            // entity -> spatial container
            if let Some(containers) =
                indexer.get_entity_relations(&group.id, express_id, RelationName::Decomposes)
            {
                for &container in containers {
                    if !spatial_candidate(group, container, config) {
                        continue;
                    }
                    let class = spatial_class_name(group, container, config).await;
                    self.save_item(
                        group,
                        systems::SPATIAL_STRUCTURES,
                        &class,
                        express_id,
                        Some(container),
                    );
                }
            }

            // container -> contained elements
            if let Some(contained) =
                indexer.get_entity_relations(&group.id, express_id, RelationName::ContainsElements)
            {
                if !spatial_candidate(group, express_id, config) {
                    continue;
                }
                let class = spatial_class_name(group, express_id, config).await;
                for &element in contained {
                    self.save_item(
                        group,
                        systems::SPATIAL_STRUCTURES,
                        &class,
                        element,
                        Some(express_id),
                    );
                    // sub-parts of a contained assembly inherit its class
                    if let Some(parts) = indexer.get_entity_relations(
                        &group.id,
                        element,
                        RelationName::IsDecomposedBy,
                    ) {
                        for &part in parts {
                            self.save_item(
                                group,
                                systems::SPATIAL_STRUCTURES,
                                &class,
                                part,
                                Some(express_id),
                            );
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Query fragments and entity ids
    ///
    /// Without a filter, exports the manager's full live state. With one,
    /// an entity matches when every filter key has at least one listed class
    /// containing it (AND across systems, OR within a system's classes).
    /// Filter keys naming a missing system are warned about and contribute
    /// no matches.
    pub fn find(&self, filter: Option<&FindFilter>) -> Result<FragmentIdMap> {
        let fragments = self.fragments.borrow();

        let Some(filter) = filter else {
            let mut result = FragmentIdMap::default();
            for (fragment_id, fragment) in &fragments.list {
                result.insert(fragment_id.clone(), fragment.ids.iter().copied().collect());
            }
            return Ok(result);
        };

        let index = self.list.borrow();
        let filter_count = filter.len();
        let mut matches: FxHashMap<FragmentId, FxHashMap<ExpressId, usize>> =
            FxHashMap::default();

        for (system_name, class_names) in filter {
            let Some(system) = index.system(system_name) else {
                warn!("classification system {system_name} does not exist; skipping filter key");
                continue;
            };
            // One count per filter key, however many of its classes matched
            let mut key_matches: FragmentIdMap = FragmentIdMap::default();
            for class_name in class_names {
                if let Some(group) = system.get(class_name) {
                    for (fragment_id, ids) in &group.map {
                        key_matches
                            .entry(fragment_id.clone())
                            .or_default()
                            .extend(ids.iter().copied());
                    }
                }
            }
            for (fragment_id, ids) in key_matches {
                let counts = matches.entry(fragment_id).or_default();
                for id in ids {
                    *counts.entry(id).or_insert(0) += 1;
                }
            }
        }

        let mut result = FragmentIdMap::default();
        for (fragment_id, counts) in matches {
            // Fragments disposed ahead of stale index entries are skipped
            if !fragments.list.contains_key(&fragment_id) {
                continue;
            }
            for (id, count) in counts {
                if count > filter_count {
                    return Err(ClassifierError::MalformedFilterState {
                        fragment: fragment_id.clone(),
                        id,
                    });
                }
                if count == filter_count {
                    result.entry(fragment_id.clone()).or_default().insert(id);
                }
            }
        }
        Ok(result)
    }

    /// Purge one fragment from every class of every system
    ///
    /// Intentionally leaves empty classes and systems in place; only the
    /// disposal path prunes. Callers may rely on either behavior, so the
    /// asymmetry is preserved rather than unified.
    pub fn remove(&mut self, guid: &FragmentId) {
        self.list.borrow_mut().purge_fragment(guid);
    }

    /// Tint the given fragments' items
    ///
    /// Fragments not currently loaded are silently skipped.
    pub fn set_color(&self, items: &FragmentIdMap, color: Color, override_existing: bool) {
        let mut fragments = self.fragments.borrow_mut();
        for (fragment_id, ids) in items {
            let Some(fragment) = fragments.list.get_mut(fragment_id) else {
                continue;
            };
            fragment.set_color(color, ids.iter().copied(), override_existing);
        }
    }

    /// Restore the given fragments' base colors
    pub fn reset_color(&self, items: &FragmentIdMap) {
        let mut fragments = self.fragments.borrow_mut();
        for (fragment_id, ids) in items {
            let Some(fragment) = fragments.list.get_mut(fragment_id) else {
                continue;
            };
            fragment.reset_color(ids.iter().copied());
        }
    }

    /// Release the index and the disposal subscription
    ///
    /// Notifies this classifier's own subscribers once, then drops them.
    pub fn dispose(&mut self) {
        self.list.borrow_mut().clear();
        if let Some(handle) = self.subscription.take() {
            self.fragments
                .borrow_mut()
                .on_fragments_disposed
                .unsubscribe(handle);
        }
        self.on_disposed.trigger(&());
        self.on_disposed.clear();
    }
}

impl Drop for Classifier {
    fn drop(&mut self) {
        // The subscription must not outlive the classifier
        if let Some(handle) = self.subscription.take() {
            if let Ok(mut fragments) = self.fragments.try_borrow_mut() {
                fragments.on_fragments_disposed.unsubscribe(handle);
            }
        }
    }
}

/// Whether a container passes the isolation set
///
/// Containers without a data record cannot have their category checked and
/// only pass when no isolation is requested.
fn spatial_candidate<P: PropertySource>(
    group: &FragmentsGroup<P>,
    id: ExpressId,
    config: &SpatialStructureConfig,
) -> bool {
    let Some(isolate) = &config.isolate else {
        return true;
    };
    group
        .data
        .get(&id)
        .is_some_and(|item| isolate.contains(&item.category))
}

/// Resolve a spatial container's class name
///
/// The `Name` property when `use_properties` is set and present, the
/// identifier string otherwise.
async fn spatial_class_name<P: PropertySource>(
    group: &FragmentsGroup<P>,
    id: ExpressId,
    config: &SpatialStructureConfig,
) -> String {
    if config.use_properties {
        if let Some(props) = group.get_properties(id).await {
            if let Some(name) = props.name() {
                return name.to_string();
            }
        }
    }
    id.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragments::Fragment;
    use fragments_model::{
        AttributeValue, GeometryKey, ItemData, ItemProperties, MemoryPropertySource,
    };

    const MODEL_ID: &str = "model-a";

    fn cat(category: IfcCategory) -> u32 {
        category.code()
    }

    /// Two fragments: f1 with walls #1 #2, f2 with slab #3, stair assembly
    /// #10, flight #11. Storey #100 ("Level 3") has no geometry of its own.
    fn test_group() -> FragmentsGroup<MemoryPropertySource> {
        let mut source = MemoryPropertySource::new();
        source.insert(
            ExpressId(1),
            ItemProperties::new(cat(IfcCategory::Wall))
                .with("Name", AttributeValue::String("Wall 1".into()))
                .with("PredefinedType", AttributeValue::Enum("solidwall".into())),
        );
        source.insert(
            ExpressId(2),
            ItemProperties::new(cat(IfcCategory::Wall))
                .with("Name", AttributeValue::String("Wall 2".into())),
        );
        source.insert(
            ExpressId(3),
            ItemProperties::new(cat(IfcCategory::Slab))
                .with("Name", AttributeValue::String("Slab 1".into())),
        );
        source.insert(
            ExpressId(10),
            ItemProperties::new(cat(IfcCategory::Stair))
                .with("Name", AttributeValue::String("Stair assembly".into())),
        );
        source.insert(
            ExpressId(11),
            ItemProperties::new(cat(IfcCategory::StairFlight))
                .with("Name", AttributeValue::String("Flight".into())),
        );
        source.insert(
            ExpressId(100),
            ItemProperties::new(cat(IfcCategory::BuildingStorey))
                .with("Name", AttributeValue::String("Level 3".into())),
        );

        let mut group = FragmentsGroup::new(MODEL_ID, "Test Model", source);
        group.key_fragments.insert(GeometryKey(0), frag("f1"));
        group.key_fragments.insert(GeometryKey(1), frag("f2"));

        let wall = cat(IfcCategory::Wall);
        group
            .data
            .insert(ExpressId(1), ItemData::new(vec![GeometryKey(0)], wall));
        group
            .data
            .insert(ExpressId(2), ItemData::new(vec![GeometryKey(0)], wall));
        group.data.insert(
            ExpressId(3),
            ItemData::new(vec![GeometryKey(1)], cat(IfcCategory::Slab)),
        );
        group.data.insert(
            ExpressId(10),
            ItemData::new(vec![GeometryKey(1)], cat(IfcCategory::Stair)),
        );
        group.data.insert(
            ExpressId(11),
            ItemData::new(vec![GeometryKey(1)], cat(IfcCategory::StairFlight)),
        );
        group.data.insert(
            ExpressId(100),
            ItemData::new(Vec::new(), cat(IfcCategory::BuildingStorey)),
        );
        group
    }

    fn frag(id: &str) -> FragmentId {
        FragmentId::from(id)
    }

    fn test_manager() -> Rc<RefCell<FragmentsManager>> {
        let mut manager = FragmentsManager::new();
        manager.add(Fragment::new(frag("f1"), [ExpressId(1), ExpressId(2)]));
        manager.add(Fragment::new(
            frag("f2"),
            [ExpressId(3), ExpressId(10), ExpressId(11)],
        ));
        Rc::new(RefCell::new(manager))
    }

    fn test_indexer() -> RelationsIndexer {
        let mut indexer = RelationsIndexer::new();
        indexer.set_entity_relations(
            MODEL_ID,
            ExpressId(100),
            RelationName::ContainsElements,
            [ExpressId(1), ExpressId(2), ExpressId(3), ExpressId(10)],
        );
        for id in [1, 2, 3, 10] {
            indexer.set_entity_relations(
                MODEL_ID,
                ExpressId(id),
                RelationName::IsContainedIn,
                [ExpressId(100)],
            );
        }
        indexer.set_entity_relations(
            MODEL_ID,
            ExpressId(10),
            RelationName::IsDecomposedBy,
            [ExpressId(11)],
        );
        indexer.set_entity_relations(
            MODEL_ID,
            ExpressId(11),
            RelationName::Decomposes,
            [ExpressId(10)],
        );
        indexer
    }

    fn filter(entries: &[(&str, &[&str])]) -> FindFilter {
        entries
            .iter()
            .map(|(system, classes)| {
                (
                    system.to_string(),
                    classes.iter().map(|class| class.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_by_model_round_trip() {
        let manager = test_manager();
        let group = test_group();
        let mut classifier = Classifier::new(Rc::clone(&manager));
        classifier.by_model(MODEL_ID, &group);

        let found = classifier
            .find(Some(&filter(&[(systems::MODELS, &[MODEL_ID])])))
            .unwrap();

        let f1 = found.get(&frag("f1")).unwrap();
        assert_eq!(
            f1,
            &FxHashSet::from_iter([ExpressId(1), ExpressId(2)])
        );
        let f2 = found.get(&frag("f2")).unwrap();
        assert_eq!(
            f2,
            &FxHashSet::from_iter([ExpressId(3), ExpressId(10), ExpressId(11)])
        );
    }

    #[test]
    fn test_find_without_filter_exports_live_state() {
        let manager = test_manager();
        let classifier = Classifier::new(Rc::clone(&manager));

        // Full export regardless of (empty) classification index
        let all = classifier.find(None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all.get(&frag("f1")).unwrap().len(), 2);
        assert_eq!(all.get(&frag("f2")).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_find_and_across_systems_or_within() {
        let manager = test_manager();
        let group = test_group();
        let mut classifier = Classifier::new(Rc::clone(&manager));
        classifier.by_entity(&group);
        classifier.by_predefined_type(&group).await.unwrap();

        // OR within one system's classes
        let walls_and_slabs = classifier
            .find(Some(&filter(&[("entities", &["IFCWALL", "IFCSLAB"])])))
            .unwrap();
        let all_ids: FxHashSet<ExpressId> = walls_and_slabs
            .values()
            .flat_map(|ids| ids.iter().copied())
            .collect();
        assert_eq!(
            all_ids,
            FxHashSet::from_iter([ExpressId(1), ExpressId(2), ExpressId(3)])
        );

        // AND across systems: wall #1 is SOLIDWALL, wall #2 is "undefined"
        let solid_walls = classifier
            .find(Some(&filter(&[
                ("entities", &["IFCWALL"]),
                ("predefinedTypes", &["SOLIDWALL"]),
            ])))
            .unwrap();
        let ids = solid_walls.get(&frag("f1")).unwrap();
        assert_eq!(ids, &FxHashSet::from_iter([ExpressId(1)]));
    }

    #[test]
    fn test_find_unknown_system_is_skipped() {
        let manager = test_manager();
        let group = test_group();
        let mut classifier = Classifier::new(Rc::clone(&manager));
        classifier.by_entity(&group);

        // The unknown key contributes no matches, so the AND yields nothing,
        // but the query itself does not fail
        let found = classifier
            .find(Some(&filter(&[
                ("entities", &["IFCWALL"]),
                ("nope", &["anything"]),
            ])))
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_by_predefined_type_buckets() {
        let manager = test_manager();
        let group = test_group();
        let mut classifier = Classifier::new(Rc::clone(&manager));
        classifier.by_predefined_type(&group).await.unwrap();

        let system = classifier.export_system(systems::PREDEFINED_TYPES).unwrap();
        // Uppercased value
        assert!(system.contains_key("SOLIDWALL"));
        // Entities without the property share the undefined bucket
        let undefined = system.get("undefined").unwrap();
        let ids: FxHashSet<ExpressId> = undefined
            .values()
            .flat_map(|ids| ids.iter().copied())
            .collect();
        assert!(ids.contains(&ExpressId(2)));
        assert!(ids.contains(&ExpressId(3)));
    }

    #[tokio::test]
    async fn test_by_predefined_type_missing_fragment_is_fatal() {
        let manager = test_manager();
        let mut group = test_group();
        // Wall #1 now points at a key with no fragment
        group.data.insert(
            ExpressId(1),
            ItemData::new(vec![GeometryKey(9)], cat(IfcCategory::Wall)),
        );
        let mut classifier = Classifier::new(Rc::clone(&manager));

        let result = classifier.by_predefined_type(&group).await;
        assert!(matches!(
            result,
            Err(ClassifierError::FragmentNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_by_ifc_rel_groups_by_relating_name() {
        let manager = test_manager();
        let mut group = test_group();
        group.properties.insert(
            ExpressId(300),
            ItemProperties::new(cat(IfcCategory::Wall))
                .with("Name", AttributeValue::String("Zone A".into())),
        );
        group.properties.insert(
            ExpressId(500),
            ItemProperties::new(IfcRelation::AssignsToGroup.code())
                .with("RelatingGroup", AttributeValue::EntityRef(ExpressId(300)))
                .with(
                    "RelatedObjects",
                    AttributeValue::List(vec![
                        AttributeValue::EntityRef(ExpressId(1)),
                        AttributeValue::EntityRef(ExpressId(3)),
                    ]),
                ),
        );

        let mut classifier = Classifier::new(Rc::clone(&manager));
        classifier
            .by_ifc_rel(&group, IfcRelation::AssignsToGroup.code(), "zones")
            .await
            .unwrap();

        let zones = classifier.export_system("zones").unwrap();
        let zone_a = zones.get("Zone A").unwrap();
        let ids: FxHashSet<ExpressId> =
            zone_a.values().flat_map(|ids| ids.iter().copied()).collect();
        assert_eq!(ids, FxHashSet::from_iter([ExpressId(1), ExpressId(3)]));
    }

    #[tokio::test]
    async fn test_by_ifc_rel_falls_back_to_no_rel_name() {
        let manager = test_manager();
        let mut group = test_group();
        // Relating entity #301 exists but has no Name attribute
        group
            .properties
            .insert(ExpressId(301), ItemProperties::new(cat(IfcCategory::Wall)));
        group.properties.insert(
            ExpressId(501),
            ItemProperties::new(IfcRelation::AssignsToGroup.code())
                .with("RelatingGroup", AttributeValue::EntityRef(ExpressId(301)))
                .with(
                    "RelatedObjects",
                    AttributeValue::List(vec![AttributeValue::EntityRef(ExpressId(2))]),
                ),
        );

        let mut classifier = Classifier::new(Rc::clone(&manager));
        classifier
            .by_ifc_rel(&group, IfcRelation::AssignsToGroup.code(), "zones")
            .await
            .unwrap();

        let zones = classifier.export_system("zones").unwrap();
        assert!(zones.contains_key(NO_REL_NAME));
    }

    #[tokio::test]
    async fn test_by_ifc_rel_unknown_code_is_noop() {
        let manager = test_manager();
        let group = test_group();
        let mut classifier = Classifier::new(Rc::clone(&manager));

        classifier.by_ifc_rel(&group, 42, "zones").await.unwrap();

        assert!(classifier.system_names().is_empty());
        assert!(classifier.export_system("zones").is_none());
    }

    #[tokio::test]
    async fn test_by_spatial_structure_nesting() {
        let manager = test_manager();
        let group = test_group();
        let indexer = test_indexer();
        let mut classifier = Classifier::new(Rc::clone(&manager));

        let config = SpatialStructureConfig {
            use_properties: true,
            isolate: Some(FxHashSet::from_iter([cat(IfcCategory::BuildingStorey)])),
        };
        classifier
            .by_spatial_structure(&group, &indexer, &config)
            .await
            .unwrap();

        let system = classifier.export_system(systems::SPATIAL_STRUCTURES).unwrap();
        let level = system.get("Level 3").unwrap();
        let ids: FxHashSet<ExpressId> =
            level.values().flat_map(|ids| ids.iter().copied()).collect();
        // Contained elements, the assembly, and its decomposed sub-part
        assert_eq!(
            ids,
            FxHashSet::from_iter([
                ExpressId(1),
                ExpressId(2),
                ExpressId(3),
                ExpressId(10),
                ExpressId(11),
            ])
        );
        // With storey isolation the stair assembly spawns no class of its own
        assert_eq!(system.len(), 1);

        // parent_id records the containing entity
        let spatial = classifier.system(systems::SPATIAL_STRUCTURES).unwrap();
        assert_eq!(spatial.get("Level 3").unwrap().parent_id, Some(ExpressId(100)));
    }

    #[tokio::test]
    async fn test_by_spatial_structure_identifier_names() {
        let manager = test_manager();
        let group = test_group();
        let indexer = test_indexer();
        let mut classifier = Classifier::new(Rc::clone(&manager));

        let config = SpatialStructureConfig {
            use_properties: false,
            isolate: Some(FxHashSet::from_iter([cat(IfcCategory::BuildingStorey)])),
        };
        classifier
            .by_spatial_structure(&group, &indexer, &config)
            .await
            .unwrap();

        let system = classifier.export_system(systems::SPATIAL_STRUCTURES).unwrap();
        assert!(system.contains_key("#100"));
        assert!(!system.contains_key("Level 3"));
    }

    #[tokio::test]
    async fn test_by_spatial_structure_requires_indexed_relations() {
        let manager = test_manager();
        let group = test_group();
        let indexer = RelationsIndexer::new();
        let mut classifier = Classifier::new(Rc::clone(&manager));

        let result = classifier
            .by_spatial_structure(&group, &indexer, &SpatialStructureConfig::default())
            .await;
        assert!(matches!(
            result,
            Err(ClassifierError::RelationsNotIndexed { .. })
        ));
    }

    #[test]
    fn test_remove_does_not_prune() {
        let manager = test_manager();
        let group = test_group();
        let mut classifier = Classifier::new(Rc::clone(&manager));
        classifier.by_entity(&group);

        classifier.remove(&frag("f1"));

        // The now-empty wall class survives as an empty husk
        let entities = classifier.system(systems::ENTITIES).unwrap();
        let walls = entities.get("IFCWALL").unwrap();
        assert!(walls.is_empty());
    }

    #[test]
    fn test_disposal_prunes_where_remove_does_not() {
        let manager = test_manager();
        let group = test_group();
        let mut classifier = Classifier::new(Rc::clone(&manager));
        classifier.by_entity(&group);

        manager
            .borrow_mut()
            .dispose_group(MODEL_ID, vec![frag("f1")]);

        // Same situation as remove(), but the disposal path prunes
        let entities = classifier.system(systems::ENTITIES).unwrap();
        assert!(!entities.contains_key("IFCWALL"));
        assert!(entities.contains_key("IFCSLAB"));
    }

    #[test]
    fn test_disposal_by_group_name_and_idempotence() {
        let manager = test_manager();
        let group = test_group();
        let mut classifier = Classifier::new(Rc::clone(&manager));
        classifier.by_model(MODEL_ID, &group);

        manager
            .borrow_mut()
            .dispose_group(MODEL_ID, vec![frag("f1"), frag("f2")]);
        assert!(classifier.system(systems::MODELS).is_none());

        // Repeating the disposal notification stays a no-op
        manager
            .borrow_mut()
            .dispose_group(MODEL_ID, vec![frag("f1"), frag("f2")]);
        assert!(classifier.system(systems::MODELS).is_none());
        assert!(classifier.system_names().is_empty());
    }

    #[test]
    fn test_set_color_and_reset() {
        let manager = test_manager();
        let group = test_group();
        let mut classifier = Classifier::new(Rc::clone(&manager));
        classifier.by_entity(&group);

        let red = Color::new(1.0, 0.0, 0.0);
        let walls = classifier
            .find(Some(&filter(&[("entities", &["IFCWALL"])])))
            .unwrap();
        classifier.set_color(&walls, red, true);

        assert_eq!(
            manager.borrow().list[&frag("f1")].color_of(ExpressId(1)),
            red
        );
        // Non-wall items keep their base color
        assert_eq!(
            manager.borrow().list[&frag("f2")].color_of(ExpressId(3)),
            Color::WHITE
        );

        classifier.reset_color(&walls);
        assert_eq!(
            manager.borrow().list[&frag("f1")].color_of(ExpressId(1)),
            Color::WHITE
        );
    }

    #[test]
    fn test_set_color_skips_unloaded_fragments() {
        let manager = test_manager();
        let classifier = Classifier::new(Rc::clone(&manager));

        let mut items = FragmentIdMap::default();
        items.insert(frag("gone"), FxHashSet::from_iter([ExpressId(1)]));
        // Must not panic or error
        classifier.set_color(&items, Color::new(0.0, 1.0, 0.0), true);
        classifier.reset_color(&items);
    }

    #[test]
    fn test_dispose_detaches_and_notifies() {
        let manager = test_manager();
        let group = test_group();
        let mut classifier = Classifier::new(Rc::clone(&manager));
        classifier.by_entity(&group);

        let disposed = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&disposed);
        classifier
            .on_disposed
            .subscribe(Box::new(move |()| *sink.borrow_mut() += 1));

        classifier.dispose();
        assert_eq!(*disposed.borrow(), 1);
        assert!(classifier.system_names().is_empty());
        assert!(manager.borrow().on_fragments_disposed.is_empty());
        assert!(classifier.on_disposed.is_empty());
    }

    #[test]
    fn test_drop_releases_subscription() {
        let manager = test_manager();
        {
            let _classifier = Classifier::new(Rc::clone(&manager));
            assert_eq!(manager.borrow().on_fragments_disposed.len(), 1);
        }
        assert!(manager.borrow().on_fragments_disposed.is_empty());
    }

    #[test]
    fn test_export_system_serializes() {
        let manager = test_manager();
        let group = test_group();
        let mut classifier = Classifier::new(Rc::clone(&manager));
        classifier.by_entity(&group);

        let exported = classifier.export_system(systems::ENTITIES).unwrap();
        let json = serde_json::to_string(&exported).unwrap();
        assert!(json.contains("IFCWALL"));
        assert!(json.contains("f1"));
    }
}
