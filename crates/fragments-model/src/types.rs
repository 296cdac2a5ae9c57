// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for the fragments data model

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Type-safe express identifier
///
/// Wraps the integer id of one semantic entity from the originating CAD
/// record (e.g. #123 becomes ExpressId(123)).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
pub struct ExpressId(pub u32);

impl fmt::Display for ExpressId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for ExpressId {
    fn from(id: u32) -> Self {
        ExpressId(id)
    }
}

impl From<ExpressId> for u32 {
    fn from(id: ExpressId) -> Self {
        id.0
    }
}

/// Opaque key identifying one fragment
///
/// A fragment is a batch of renderable geometry belonging to one model. The
/// key format is owned by the loader; this type only guarantees equality and
/// hashing.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct FragmentId(String);

impl FragmentId {
    pub fn new(id: impl Into<String>) -> Self {
        FragmentId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FragmentId {
    fn from(id: &str) -> Self {
        FragmentId(id.to_string())
    }
}

impl From<String> for FragmentId {
    fn from(id: String) -> Self {
        FragmentId(id)
    }
}

/// Per-model geometry key
///
/// Entities reference their geometry through these keys; a group's
/// `key_fragments` table resolves them to [`FragmentId`]s.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
pub struct GeometryKey(pub u32);

impl fmt::Display for GeometryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k{}", self.0)
    }
}

impl From<u32> for GeometryKey {
    fn from(key: u32) -> Self {
        GeometryKey(key)
    }
}

/// RGB color used for fragment recoloring
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b }
    }

    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// One entity's record inside a loaded group
///
/// Holds the geometry keys that carry the entity and its IFC category code
/// (resolvable through [`crate::IfcCategory`]).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemData {
    /// Geometry keys of the fragments this entity is batched into
    pub geometry_keys: Vec<GeometryKey>,
    /// IFC category code of the entity
    pub category: u32,
}

impl ItemData {
    pub fn new(geometry_keys: Vec<GeometryKey>, category: u32) -> Self {
        Self {
            geometry_keys,
            category,
        }
    }
}

/// Decoded attribute value
///
/// Any value that can appear in an entity's property record. Unlike raw STEP
/// attributes these are keyed by name, not by position.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum AttributeValue {
    /// Null value ($)
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Enumeration value (.VALUE.)
    Enum(String),
    /// Reference to another entity (#123)
    EntityRef(ExpressId),
    /// List of values
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    /// Try to get as string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as enum string
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            AttributeValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as entity reference
    pub fn as_entity_ref(&self) -> Option<ExpressId> {
        match self {
            AttributeValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Try to get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as list
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(list) => Some(list),
            _ => None,
        }
    }

    /// Get all entity references contained in a list value
    pub fn as_refs(&self) -> Vec<ExpressId> {
        match self {
            AttributeValue::List(list) => {
                list.iter().filter_map(|v| v.as_entity_ref()).collect()
            }
            AttributeValue::EntityRef(id) => vec![*id],
            _ => Vec::new(),
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

/// Named attribute map of one entity
pub type ItemAttributes = HashMap<String, AttributeValue>;

/// Decoded property record of one entity
///
/// Returned by [`crate::PropertySource`] lookups. `category` is the entity's
/// IFC category code, so relationship records can be recognized without a
/// separate type lookup.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemProperties {
    /// IFC category code of the entity
    pub category: u32,
    /// Attribute values keyed by attribute name
    pub attributes: ItemAttributes,
}

impl ItemProperties {
    pub fn new(category: u32) -> Self {
        Self {
            category,
            attributes: ItemAttributes::new(),
        }
    }

    /// Builder-style attribute insertion
    pub fn with(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Get an attribute by name
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Get the entity's `Name` attribute as a string
    pub fn name(&self) -> Option<&str> {
        self.get("Name").and_then(|v| v.as_string())
    }
}
