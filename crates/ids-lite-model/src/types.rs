// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for the audited entity graph
//!
//! This module defines the fundamental types used throughout the audit system.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe entity identifier
///
/// Wraps the raw entity ID (e.g., #123 becomes EntityId(123))
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize, Default)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        EntityId(id)
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// IFC structural-class enumeration
///
/// Covers the classes the audit engine needs to recognize: auditable building
/// elements, spatial structure, relationship records, and the property,
/// classification and material support classes. Unknown classes are captured
/// with their original string representation.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IfcClass {
    // ========================================================================
    // Spatial Structure
    // ========================================================================
    IfcProject,
    IfcSite,
    IfcBuilding,
    IfcBuildingStorey,
    IfcSpace,

    // ========================================================================
    // Building Elements
    // ========================================================================
    IfcWall,
    IfcWallStandardCase,
    IfcCurtainWall,
    IfcSlab,
    IfcRoof,
    IfcBeam,
    IfcColumn,
    IfcDoor,
    IfcWindow,
    IfcStair,
    IfcStairFlight,
    IfcRamp,
    IfcRampFlight,
    IfcRailing,
    IfcCovering,
    IfcPlate,
    IfcMember,
    IfcFooting,
    IfcPile,
    IfcBuildingElementProxy,
    IfcFurnishingElement,
    IfcFurniture,
    IfcDistributionElement,
    IfcFlowTerminal,
    IfcFlowSegment,
    IfcFlowFitting,
    IfcOpeningElement,

    // ========================================================================
    // Relationships
    // ========================================================================
    IfcRelDefinesByProperties,
    IfcRelAssociatesClassification,
    IfcRelAssociatesMaterial,
    IfcRelAggregates,
    IfcRelContainedInSpatialStructure,
    IfcRelNests,

    // ========================================================================
    // Properties and Quantities
    // ========================================================================
    IfcPropertySet,
    IfcPropertySingleValue,
    IfcElementQuantity,
    IfcQuantityLength,
    IfcQuantityArea,
    IfcQuantityVolume,
    IfcQuantityCount,
    IfcQuantityWeight,
    IfcQuantityTime,

    // ========================================================================
    // Classification
    // ========================================================================
    IfcClassification,
    IfcClassificationReference,

    // ========================================================================
    // Materials
    // ========================================================================
    IfcMaterial,
    IfcMaterialLayer,
    IfcMaterialLayerSet,
    IfcMaterialLayerSetUsage,
    IfcMaterialList,
    IfcMaterialConstituentSet,
    IfcMaterialConstituent,

    /// Unknown class - stores the original class name string
    Unknown(String),
}

impl FromStr for IfcClass {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl IfcClass {
    /// Parse a class name string into an IfcClass (case-insensitive)
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            // Spatial structure
            "IFCPROJECT" => IfcClass::IfcProject,
            "IFCSITE" => IfcClass::IfcSite,
            "IFCBUILDING" => IfcClass::IfcBuilding,
            "IFCBUILDINGSTOREY" => IfcClass::IfcBuildingStorey,
            "IFCSPACE" => IfcClass::IfcSpace,

            // Building elements
            "IFCWALL" => IfcClass::IfcWall,
            "IFCWALLSTANDARDCASE" => IfcClass::IfcWallStandardCase,
            "IFCCURTAINWALL" => IfcClass::IfcCurtainWall,
            "IFCSLAB" => IfcClass::IfcSlab,
            "IFCROOF" => IfcClass::IfcRoof,
            "IFCBEAM" => IfcClass::IfcBeam,
            "IFCCOLUMN" => IfcClass::IfcColumn,
            "IFCDOOR" => IfcClass::IfcDoor,
            "IFCWINDOW" => IfcClass::IfcWindow,
            "IFCSTAIR" => IfcClass::IfcStair,
            "IFCSTAIRFLIGHT" => IfcClass::IfcStairFlight,
            "IFCRAMP" => IfcClass::IfcRamp,
            "IFCRAMPFLIGHT" => IfcClass::IfcRampFlight,
            "IFCRAILING" => IfcClass::IfcRailing,
            "IFCCOVERING" => IfcClass::IfcCovering,
            "IFCPLATE" => IfcClass::IfcPlate,
            "IFCMEMBER" => IfcClass::IfcMember,
            "IFCFOOTING" => IfcClass::IfcFooting,
            "IFCPILE" => IfcClass::IfcPile,
            "IFCBUILDINGELEMENTPROXY" => IfcClass::IfcBuildingElementProxy,
            "IFCFURNISHINGELEMENT" => IfcClass::IfcFurnishingElement,
            "IFCFURNITURE" => IfcClass::IfcFurniture,
            "IFCDISTRIBUTIONELEMENT" => IfcClass::IfcDistributionElement,
            "IFCFLOWTERMINAL" => IfcClass::IfcFlowTerminal,
            "IFCFLOWSEGMENT" => IfcClass::IfcFlowSegment,
            "IFCFLOWFITTING" => IfcClass::IfcFlowFitting,
            "IFCOPENINGELEMENT" => IfcClass::IfcOpeningElement,

            // Relationships
            "IFCRELDEFINESBYPROPERTIES" => IfcClass::IfcRelDefinesByProperties,
            "IFCRELASSOCIATESCLASSIFICATION" => IfcClass::IfcRelAssociatesClassification,
            "IFCRELASSOCIATESMATERIAL" => IfcClass::IfcRelAssociatesMaterial,
            "IFCRELAGGREGATES" => IfcClass::IfcRelAggregates,
            "IFCRELCONTAINEDINSPATIALSTRUCTURE" => IfcClass::IfcRelContainedInSpatialStructure,
            "IFCRELNESTS" => IfcClass::IfcRelNests,

            // Properties and quantities
            "IFCPROPERTYSET" => IfcClass::IfcPropertySet,
            "IFCPROPERTYSINGLEVALUE" => IfcClass::IfcPropertySingleValue,
            "IFCELEMENTQUANTITY" => IfcClass::IfcElementQuantity,
            "IFCQUANTITYLENGTH" => IfcClass::IfcQuantityLength,
            "IFCQUANTITYAREA" => IfcClass::IfcQuantityArea,
            "IFCQUANTITYVOLUME" => IfcClass::IfcQuantityVolume,
            "IFCQUANTITYCOUNT" => IfcClass::IfcQuantityCount,
            "IFCQUANTITYWEIGHT" => IfcClass::IfcQuantityWeight,
            "IFCQUANTITYTIME" => IfcClass::IfcQuantityTime,

            // Classification
            "IFCCLASSIFICATION" => IfcClass::IfcClassification,
            "IFCCLASSIFICATIONREFERENCE" => IfcClass::IfcClassificationReference,

            // Materials
            "IFCMATERIAL" => IfcClass::IfcMaterial,
            "IFCMATERIALLAYER" => IfcClass::IfcMaterialLayer,
            "IFCMATERIALLAYERSET" => IfcClass::IfcMaterialLayerSet,
            "IFCMATERIALLAYERSETUSAGE" => IfcClass::IfcMaterialLayerSetUsage,
            "IFCMATERIALLIST" => IfcClass::IfcMaterialList,
            "IFCMATERIALCONSTITUENTSET" => IfcClass::IfcMaterialConstituentSet,
            "IFCMATERIALCONSTITUENT" => IfcClass::IfcMaterialConstituent,

            // Unknown
            _ => IfcClass::Unknown(s.to_string()),
        }
    }

    /// Get the class name as an upper-case string
    pub fn name(&self) -> &str {
        match self {
            IfcClass::IfcProject => "IFCPROJECT",
            IfcClass::IfcSite => "IFCSITE",
            IfcClass::IfcBuilding => "IFCBUILDING",
            IfcClass::IfcBuildingStorey => "IFCBUILDINGSTOREY",
            IfcClass::IfcSpace => "IFCSPACE",
            IfcClass::IfcWall => "IFCWALL",
            IfcClass::IfcWallStandardCase => "IFCWALLSTANDARDCASE",
            IfcClass::IfcCurtainWall => "IFCCURTAINWALL",
            IfcClass::IfcSlab => "IFCSLAB",
            IfcClass::IfcRoof => "IFCROOF",
            IfcClass::IfcBeam => "IFCBEAM",
            IfcClass::IfcColumn => "IFCCOLUMN",
            IfcClass::IfcDoor => "IFCDOOR",
            IfcClass::IfcWindow => "IFCWINDOW",
            IfcClass::IfcStair => "IFCSTAIR",
            IfcClass::IfcStairFlight => "IFCSTAIRFLIGHT",
            IfcClass::IfcRamp => "IFCRAMP",
            IfcClass::IfcRampFlight => "IFCRAMPFLIGHT",
            IfcClass::IfcRailing => "IFCRAILING",
            IfcClass::IfcCovering => "IFCCOVERING",
            IfcClass::IfcPlate => "IFCPLATE",
            IfcClass::IfcMember => "IFCMEMBER",
            IfcClass::IfcFooting => "IFCFOOTING",
            IfcClass::IfcPile => "IFCPILE",
            IfcClass::IfcBuildingElementProxy => "IFCBUILDINGELEMENTPROXY",
            IfcClass::IfcFurnishingElement => "IFCFURNISHINGELEMENT",
            IfcClass::IfcFurniture => "IFCFURNITURE",
            IfcClass::IfcDistributionElement => "IFCDISTRIBUTIONELEMENT",
            IfcClass::IfcFlowTerminal => "IFCFLOWTERMINAL",
            IfcClass::IfcFlowSegment => "IFCFLOWSEGMENT",
            IfcClass::IfcFlowFitting => "IFCFLOWFITTING",
            IfcClass::IfcOpeningElement => "IFCOPENINGELEMENT",
            IfcClass::IfcRelDefinesByProperties => "IFCRELDEFINESBYPROPERTIES",
            IfcClass::IfcRelAssociatesClassification => "IFCRELASSOCIATESCLASSIFICATION",
            IfcClass::IfcRelAssociatesMaterial => "IFCRELASSOCIATESMATERIAL",
            IfcClass::IfcRelAggregates => "IFCRELAGGREGATES",
            IfcClass::IfcRelContainedInSpatialStructure => "IFCRELCONTAINEDINSPATIALSTRUCTURE",
            IfcClass::IfcRelNests => "IFCRELNESTS",
            IfcClass::IfcPropertySet => "IFCPROPERTYSET",
            IfcClass::IfcPropertySingleValue => "IFCPROPERTYSINGLEVALUE",
            IfcClass::IfcElementQuantity => "IFCELEMENTQUANTITY",
            IfcClass::IfcQuantityLength => "IFCQUANTITYLENGTH",
            IfcClass::IfcQuantityArea => "IFCQUANTITYAREA",
            IfcClass::IfcQuantityVolume => "IFCQUANTITYVOLUME",
            IfcClass::IfcQuantityCount => "IFCQUANTITYCOUNT",
            IfcClass::IfcQuantityWeight => "IFCQUANTITYWEIGHT",
            IfcClass::IfcQuantityTime => "IFCQUANTITYTIME",
            IfcClass::IfcClassification => "IFCCLASSIFICATION",
            IfcClass::IfcClassificationReference => "IFCCLASSIFICATIONREFERENCE",
            IfcClass::IfcMaterial => "IFCMATERIAL",
            IfcClass::IfcMaterialLayer => "IFCMATERIALLAYER",
            IfcClass::IfcMaterialLayerSet => "IFCMATERIALLAYERSET",
            IfcClass::IfcMaterialLayerSetUsage => "IFCMATERIALLAYERSETUSAGE",
            IfcClass::IfcMaterialList => "IFCMATERIALLIST",
            IfcClass::IfcMaterialConstituentSet => "IFCMATERIALCONSTITUENTSET",
            IfcClass::IfcMaterialConstituent => "IFCMATERIALCONSTITUENT",
            IfcClass::Unknown(s) => s,
        }
    }

    /// Check if this class is an auditable building element
    pub fn is_element(&self) -> bool {
        matches!(
            self,
            IfcClass::IfcWall
                | IfcClass::IfcWallStandardCase
                | IfcClass::IfcCurtainWall
                | IfcClass::IfcSlab
                | IfcClass::IfcRoof
                | IfcClass::IfcBeam
                | IfcClass::IfcColumn
                | IfcClass::IfcDoor
                | IfcClass::IfcWindow
                | IfcClass::IfcStair
                | IfcClass::IfcStairFlight
                | IfcClass::IfcRamp
                | IfcClass::IfcRampFlight
                | IfcClass::IfcRailing
                | IfcClass::IfcCovering
                | IfcClass::IfcPlate
                | IfcClass::IfcMember
                | IfcClass::IfcFooting
                | IfcClass::IfcPile
                | IfcClass::IfcBuildingElementProxy
                | IfcClass::IfcFurnishingElement
                | IfcClass::IfcFurniture
                | IfcClass::IfcDistributionElement
                | IfcClass::IfcFlowTerminal
                | IfcClass::IfcFlowSegment
                | IfcClass::IfcFlowFitting
                | IfcClass::IfcOpeningElement
        )
    }

    /// Check if this class is a spatial structure element
    pub fn is_spatial(&self) -> bool {
        matches!(
            self,
            IfcClass::IfcProject
                | IfcClass::IfcSite
                | IfcClass::IfcBuilding
                | IfcClass::IfcBuildingStorey
                | IfcClass::IfcSpace
        )
    }
}

impl Default for IfcClass {
    fn default() -> Self {
        IfcClass::Unknown(String::new())
    }
}

impl fmt::Display for IfcClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The static table of auditable structural classes.
///
/// Entity facets resolve their name constraint against this table, and the
/// orchestrator counts its `totalElements` over it. Elements and the spatial
/// structure are auditable; relationship and support records are not.
pub static AUDITABLE: &[IfcClass] = &[
    IfcClass::IfcProject,
    IfcClass::IfcSite,
    IfcClass::IfcBuilding,
    IfcClass::IfcBuildingStorey,
    IfcClass::IfcSpace,
    IfcClass::IfcWall,
    IfcClass::IfcWallStandardCase,
    IfcClass::IfcCurtainWall,
    IfcClass::IfcSlab,
    IfcClass::IfcRoof,
    IfcClass::IfcBeam,
    IfcClass::IfcColumn,
    IfcClass::IfcDoor,
    IfcClass::IfcWindow,
    IfcClass::IfcStair,
    IfcClass::IfcStairFlight,
    IfcClass::IfcRamp,
    IfcClass::IfcRampFlight,
    IfcClass::IfcRailing,
    IfcClass::IfcCovering,
    IfcClass::IfcPlate,
    IfcClass::IfcMember,
    IfcClass::IfcFooting,
    IfcClass::IfcPile,
    IfcClass::IfcBuildingElementProxy,
    IfcClass::IfcFurnishingElement,
    IfcClass::IfcFurniture,
    IfcClass::IfcDistributionElement,
    IfcClass::IfcFlowTerminal,
    IfcClass::IfcFlowSegment,
    IfcClass::IfcFlowFitting,
    IfcClass::IfcOpeningElement,
];

/// Decoded attribute value
///
/// Represents any scalar or reference value that can appear among an entity's
/// named attributes.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum AttributeValue {
    /// Null value ($)
    #[default]
    Null,
    /// Entity reference (#123)
    EntityRef(EntityId),
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
    /// List of values
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    /// Try to get as entity reference
    pub fn as_entity_ref(&self) -> Option<EntityId> {
        match self {
            AttributeValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Try to get as string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
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

    /// Try to get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            AttributeValue::Enum(s) => match s.to_uppercase().as_str() {
                "TRUE" | "T" => Some(true),
                "FALSE" | "F" => Some(false),
                _ => None,
            },
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

    /// Collect entity references from a list value
    pub fn as_refs(&self) -> Vec<EntityId> {
        match self {
            AttributeValue::List(list) => list.iter().filter_map(|v| v.as_entity_ref()).collect(),
            AttributeValue::EntityRef(id) => vec![*id],
            _ => Vec::new(),
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Format the value as the string the matching grammar sees.
    ///
    /// Null, references and lists have no string form; booleans format as
    /// `true`/`false`, floats drop trailing zeros.
    pub fn display_string(&self) -> Option<String> {
        match self {
            AttributeValue::String(s) => Some(s.clone()),
            AttributeValue::Enum(e) => Some(e.clone()),
            AttributeValue::Integer(i) => Some(i.to_string()),
            AttributeValue::Float(f) => Some(
                format!("{:.6}", f)
                    .trim_end_matches('0')
                    .trim_end_matches('.')
                    .to_string(),
            ),
            AttributeValue::Bool(b) => Some(b.to_string()),
            AttributeValue::Null
            | AttributeValue::EntityRef(_)
            | AttributeValue::List(_) => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<f64> for AttributeValue {
    fn from(f: f64) -> Self {
        AttributeValue::Float(f)
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        AttributeValue::Integer(i)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

impl From<EntityId> for AttributeValue {
    fn from(id: EntityId) -> Self {
        AttributeValue::EntityRef(id)
    }
}

/// Decoded entity record
///
/// One entity of the audited graph: class tag, named scalar attributes, and
/// the relation lists audit checks read (property-set, classification and
/// material links).
#[derive(Clone, Debug, Default)]
pub struct EntityRecord {
    /// Entity ID
    pub id: EntityId,
    /// Structural class
    pub class: IfcClass,
    /// Named attribute values
    pub attributes: FxHashMap<String, AttributeValue>,
    /// Linked property-set / element-quantity entity ids
    pub property_sets: Vec<EntityId>,
    /// Linked classification-reference entity ids
    pub classifications: Vec<EntityId>,
    /// Linked material entity ids
    pub materials: Vec<EntityId>,
}

impl EntityRecord {
    /// Create a new record with no attributes
    pub fn new(id: impl Into<EntityId>, class: IfcClass) -> Self {
        Self {
            id: id.into(),
            class,
            ..Default::default()
        }
    }

    /// Set a named attribute (builder style)
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Get attribute by exact name
    pub fn attr(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Get a non-null attribute by exact name
    pub fn attr_present(&self, name: &str) -> Option<&AttributeValue> {
        self.attr(name).filter(|v| !v.is_null())
    }

    /// Get string form of an attribute
    pub fn attr_string(&self, name: &str) -> Option<String> {
        self.attr_present(name).and_then(|v| v.display_string())
    }

    /// Entity's Name attribute
    pub fn name(&self) -> Option<&str> {
        self.attr("Name").and_then(|v| v.as_string())
    }

    /// Entity's GlobalId attribute
    pub fn global_id(&self) -> Option<&str> {
        self.attr("GlobalId").and_then(|v| v.as_string())
    }

    /// Entity's PredefinedType attribute, as a string
    pub fn predefined_type(&self) -> Option<String> {
        self.attr_string("PredefinedType")
    }
}
