// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC relationship vocabulary
//!
//! Two views of the same relationships: [`RelationName`] is the per-entity
//! inverse-attribute vocabulary the relations indexer speaks ("give me what
//! this wall Decomposes into"), while [`IfcRelation`] classifies the
//! relationship records themselves and knows which attributes hold the
//! relating and related sides.

use crate::IfcCategory;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inverse-attribute name under which indexed relations are stored
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum RelationName {
    /// Entity is part of a larger whole (entity -> container)
    Decomposes,
    /// Entity is decomposed into sub-parts (assembly -> parts)
    IsDecomposedBy,
    /// Spatial container holds elements (container -> contained)
    ContainsElements,
    /// Element is held by a spatial container
    IsContainedIn,
    /// Type object defines occurrences
    Defines,
    /// Occurrence is defined by a type object
    IsDefinedBy,
    /// Entity carries material/classification associations
    HasAssociations,
    /// Entity is assigned to a group
    HasAssignments,
    /// Group collects assigned entities
    IsGroupedBy,
}

impl RelationName {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationName::Decomposes => "Decomposes",
            RelationName::IsDecomposedBy => "IsDecomposedBy",
            RelationName::ContainsElements => "ContainsElements",
            RelationName::IsContainedIn => "IsContainedIn",
            RelationName::Defines => "Defines",
            RelationName::IsDefinedBy => "IsDefinedBy",
            RelationName::HasAssociations => "HasAssociations",
            RelationName::HasAssignments => "HasAssignments",
            RelationName::IsGroupedBy => "IsGroupedBy",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let name = match s {
            "Decomposes" => RelationName::Decomposes,
            "IsDecomposedBy" => RelationName::IsDecomposedBy,
            "ContainsElements" => RelationName::ContainsElements,
            "IsContainedIn" => RelationName::IsContainedIn,
            "Defines" => RelationName::Defines,
            "IsDefinedBy" => RelationName::IsDefinedBy,
            "HasAssociations" => RelationName::HasAssociations,
            "HasAssignments" => RelationName::HasAssignments,
            "IsGroupedBy" => RelationName::IsGroupedBy,
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for RelationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recognized IFC relationship kinds
///
/// The recognition gate for relation-based classification: a caller-supplied
/// code that [`IfcRelation::from_code`] does not accept makes the whole
/// classification pass a no-op.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum IfcRelation {
    Aggregates,
    ContainedInSpatialStructure,
    DefinesByType,
    DefinesByProperties,
    AssociatesMaterial,
    AssignsToGroup,
    AssociatesClassification,
}

impl IfcRelation {
    /// Recognize a relationship category code
    pub fn from_code(code: u32) -> Option<Self> {
        let rel = match IfcCategory::from_code(code)? {
            IfcCategory::RelAggregates => IfcRelation::Aggregates,
            IfcCategory::RelContainedInSpatialStructure => {
                IfcRelation::ContainedInSpatialStructure
            }
            IfcCategory::RelDefinesByType => IfcRelation::DefinesByType,
            IfcCategory::RelDefinesByProperties => IfcRelation::DefinesByProperties,
            IfcCategory::RelAssociatesMaterial => IfcRelation::AssociatesMaterial,
            IfcCategory::RelAssignsToGroup => IfcRelation::AssignsToGroup,
            IfcCategory::RelAssociatesClassification => IfcRelation::AssociatesClassification,
            _ => return None,
        };
        Some(rel)
    }

    /// Get the relationship's category code
    pub fn code(self) -> u32 {
        self.category().code()
    }

    /// Get the relationship's category
    pub fn category(self) -> IfcCategory {
        match self {
            IfcRelation::Aggregates => IfcCategory::RelAggregates,
            IfcRelation::ContainedInSpatialStructure => {
                IfcCategory::RelContainedInSpatialStructure
            }
            IfcRelation::DefinesByType => IfcCategory::RelDefinesByType,
            IfcRelation::DefinesByProperties => IfcCategory::RelDefinesByProperties,
            IfcRelation::AssociatesMaterial => IfcCategory::RelAssociatesMaterial,
            IfcRelation::AssignsToGroup => IfcCategory::RelAssignsToGroup,
            IfcRelation::AssociatesClassification => IfcCategory::RelAssociatesClassification,
        }
    }

    /// Attribute holding the relating (one) side of the record
    pub fn relating_attribute(self) -> &'static str {
        match self {
            IfcRelation::Aggregates => "RelatingObject",
            IfcRelation::ContainedInSpatialStructure => "RelatingStructure",
            IfcRelation::DefinesByType => "RelatingType",
            IfcRelation::DefinesByProperties => "RelatingPropertyDefinition",
            IfcRelation::AssociatesMaterial => "RelatingMaterial",
            IfcRelation::AssignsToGroup => "RelatingGroup",
            IfcRelation::AssociatesClassification => "RelatingClassification",
        }
    }

    /// Attribute holding the related (many) side of the record
    pub fn related_attribute(self) -> &'static str {
        match self {
            IfcRelation::Aggregates => "RelatedObjects",
            IfcRelation::ContainedInSpatialStructure => "RelatedElements",
            IfcRelation::DefinesByType
            | IfcRelation::DefinesByProperties
            | IfcRelation::AssociatesMaterial
            | IfcRelation::AssignsToGroup
            | IfcRelation::AssociatesClassification => "RelatedObjects",
        }
    }

    /// Inverse-attribute names this relationship indexes under:
    /// (on the relating entity, on the related entities)
    pub fn relation_names(self) -> (RelationName, RelationName) {
        match self {
            IfcRelation::Aggregates => {
                (RelationName::IsDecomposedBy, RelationName::Decomposes)
            }
            IfcRelation::ContainedInSpatialStructure => {
                (RelationName::ContainsElements, RelationName::IsContainedIn)
            }
            IfcRelation::DefinesByType => (RelationName::Defines, RelationName::IsDefinedBy),
            IfcRelation::DefinesByProperties => {
                (RelationName::Defines, RelationName::IsDefinedBy)
            }
            IfcRelation::AssociatesMaterial | IfcRelation::AssociatesClassification => {
                (RelationName::HasAssociations, RelationName::HasAssociations)
            }
            IfcRelation::AssignsToGroup => {
                (RelationName::IsGroupedBy, RelationName::HasAssignments)
            }
        }
    }
}

impl fmt::Display for IfcRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category().name())
    }
}
