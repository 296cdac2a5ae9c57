// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC category table
//!
//! Loaded group records carry entities as numeric category codes. This module
//! is the static code-to-name table the classification engine resolves them
//! through. Codes follow the schema hashes used by WASM-based IFC loaders.

use serde::{Deserialize, Serialize};
use std::fmt;

/// IFC entity category known to the classifier
///
/// Covers the categories that classification touches: spatial containers,
/// common building elements, and relationship records. Codes outside this
/// table are reported as unknown by [`IfcCategory::from_code`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u32)]
pub enum IfcCategory {
    // Spatial structure
    Project = 103_090_709,
    Site = 4_097_777_520,
    Building = 4_031_249_490,
    BuildingStorey = 3_124_254_112,
    Space = 3_856_911_033,

    // Building elements
    Wall = 2_391_406_946,
    WallStandardCase = 3_512_223_829,
    CurtainWall = 3_495_092_785,
    Slab = 1_529_196_076,
    Roof = 2_016_517_767,
    Beam = 753_842_376,
    Column = 843_113_511,
    Door = 395_920_057,
    Window = 3_304_561_284,
    Stair = 331_165_859,
    StairFlight = 4_252_922_144,
    Railing = 2_262_370_178,
    Covering = 1_973_544_240,
    Plate = 3_171_933_400,
    Member = 1_073_191_201,
    Footing = 900_683_007,
    Pile = 1_687_234_759,
    BuildingElementProxy = 1_095_909_175,
    FurnishingElement = 263_784_265,
    Furniture = 1_509_553_395,
    OpeningElement = 3_588_315_303,
    FlowTerminal = 2_223_149_337,
    FlowSegment = 987_401_354,
    FlowFitting = 4_037_862_832,

    // Relationship records
    RelAggregates = 160_246_688,
    RelContainedInSpatialStructure = 3_242_617_779,
    RelDefinesByType = 781_010_003,
    RelDefinesByProperties = 4_186_316_022,
    RelAssociatesMaterial = 2_655_215_786,
    RelAssignsToGroup = 1_307_041_759,
    RelAssociatesClassification = 919_958_153,
}

impl IfcCategory {
    /// Resolve a numeric category code
    pub fn from_code(code: u32) -> Option<Self> {
        use IfcCategory::*;
        let category = match code {
            103_090_709 => Project,
            4_097_777_520 => Site,
            4_031_249_490 => Building,
            3_124_254_112 => BuildingStorey,
            3_856_911_033 => Space,
            2_391_406_946 => Wall,
            3_512_223_829 => WallStandardCase,
            3_495_092_785 => CurtainWall,
            1_529_196_076 => Slab,
            2_016_517_767 => Roof,
            753_842_376 => Beam,
            843_113_511 => Column,
            395_920_057 => Door,
            3_304_561_284 => Window,
            331_165_859 => Stair,
            4_252_922_144 => StairFlight,
            2_262_370_178 => Railing,
            1_973_544_240 => Covering,
            3_171_933_400 => Plate,
            1_073_191_201 => Member,
            900_683_007 => Footing,
            1_687_234_759 => Pile,
            1_095_909_175 => BuildingElementProxy,
            263_784_265 => FurnishingElement,
            1_509_553_395 => Furniture,
            3_588_315_303 => OpeningElement,
            2_223_149_337 => FlowTerminal,
            987_401_354 => FlowSegment,
            4_037_862_832 => FlowFitting,
            160_246_688 => RelAggregates,
            3_242_617_779 => RelContainedInSpatialStructure,
            781_010_003 => RelDefinesByType,
            4_186_316_022 => RelDefinesByProperties,
            2_655_215_786 => RelAssociatesMaterial,
            1_307_041_759 => RelAssignsToGroup,
            919_958_153 => RelAssociatesClassification,
            _ => return None,
        };
        Some(category)
    }

    /// Get the numeric category code
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Get the category name as a string
    pub fn name(self) -> &'static str {
        use IfcCategory::*;
        match self {
            Project => "IFCPROJECT",
            Site => "IFCSITE",
            Building => "IFCBUILDING",
            BuildingStorey => "IFCBUILDINGSTOREY",
            Space => "IFCSPACE",
            Wall => "IFCWALL",
            WallStandardCase => "IFCWALLSTANDARDCASE",
            CurtainWall => "IFCCURTAINWALL",
            Slab => "IFCSLAB",
            Roof => "IFCROOF",
            Beam => "IFCBEAM",
            Column => "IFCCOLUMN",
            Door => "IFCDOOR",
            Window => "IFCWINDOW",
            Stair => "IFCSTAIR",
            StairFlight => "IFCSTAIRFLIGHT",
            Railing => "IFCRAILING",
            Covering => "IFCCOVERING",
            Plate => "IFCPLATE",
            Member => "IFCMEMBER",
            Footing => "IFCFOOTING",
            Pile => "IFCPILE",
            BuildingElementProxy => "IFCBUILDINGELEMENTPROXY",
            FurnishingElement => "IFCFURNISHINGELEMENT",
            Furniture => "IFCFURNITURE",
            OpeningElement => "IFCOPENINGELEMENT",
            FlowTerminal => "IFCFLOWTERMINAL",
            FlowSegment => "IFCFLOWSEGMENT",
            FlowFitting => "IFCFLOWFITTING",
            RelAggregates => "IFCRELAGGREGATES",
            RelContainedInSpatialStructure => "IFCRELCONTAINEDINSPATIALSTRUCTURE",
            RelDefinesByType => "IFCRELDEFINESBYTYPE",
            RelDefinesByProperties => "IFCRELDEFINESBYPROPERTIES",
            RelAssociatesMaterial => "IFCRELASSOCIATESMATERIAL",
            RelAssignsToGroup => "IFCRELASSIGNSTOGROUP",
            RelAssociatesClassification => "IFCRELASSOCIATESCLASSIFICATION",
        }
    }

    /// Check if this category is a spatial structure container
    pub fn is_spatial(self) -> bool {
        matches!(
            self,
            IfcCategory::Project
                | IfcCategory::Site
                | IfcCategory::Building
                | IfcCategory::BuildingStorey
                | IfcCategory::Space
        )
    }

    /// Check if this category is a relationship record
    pub fn is_relationship(self) -> bool {
        matches!(
            self,
            IfcCategory::RelAggregates
                | IfcCategory::RelContainedInSpatialStructure
                | IfcCategory::RelDefinesByType
                | IfcCategory::RelDefinesByProperties
                | IfcCategory::RelAssociatesMaterial
                | IfcCategory::RelAssignsToGroup
                | IfcCategory::RelAssociatesClassification
        )
    }
}

impl fmt::Display for IfcCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
