// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parsed compliance-document model
//!
//! A document is parsed once per loaded file and immutable thereafter.

use crate::ValueConstraint;
use std::fmt;

/// One typed condition clause, usable in applicability or as a requirement
///
/// The six kinds form a closed set; every dispatch site matches exhaustively.
#[derive(Clone, Debug, PartialEq)]
pub enum Facet {
    /// Structural class, optionally narrowed by predefined type
    Entity {
        name: ValueConstraint,
        predefined_type: Option<ValueConstraint>,
    },
    /// Classification association (system and/or reference value)
    Classification {
        system: Option<ValueConstraint>,
        value: Option<ValueConstraint>,
    },
    /// Direct attribute presence/value
    Attribute {
        name: ValueConstraint,
        value: Option<ValueConstraint>,
    },
    /// Property inside a named property set
    Property {
        property_set: ValueConstraint,
        base_name: ValueConstraint,
        value: Option<ValueConstraint>,
        data_type: Option<String>,
    },
    /// Material assignment
    Material { value: Option<ValueConstraint> },
    /// Membership in a decomposition / containment relation
    PartOf {
        entity: ValueConstraint,
        relation: Option<String>,
    },
}

impl Facet {
    /// Short kind tag, used in logs and messages
    pub fn kind(&self) -> &'static str {
        match self {
            Facet::Entity { .. } => "entity",
            Facet::Classification { .. } => "classification",
            Facet::Attribute { .. } => "attribute",
            Facet::Property { .. } => "property",
            Facet::Material { .. } => "material",
            Facet::PartOf { .. } => "partOf",
        }
    }

    /// Human-readable description, used as the requirement description in
    /// audit results
    pub fn describe(&self) -> String {
        match self {
            Facet::Entity {
                name,
                predefined_type,
            } => match predefined_type {
                Some(pt) => format!("Entity {name} of predefined type {pt}"),
                None => format!("Entity {name}"),
            },
            Facet::Classification { system, value } => match (system, value) {
                (Some(s), Some(v)) => format!("Classification {v} in system {s}"),
                (Some(s), None) => format!("Classification in system {s}"),
                (None, Some(v)) => format!("Classification {v}"),
                (None, None) => "Any classification".to_string(),
            },
            Facet::Attribute { name, value } => match value {
                Some(v) => format!("Attribute {name} = {v}"),
                None => format!("Attribute {name}"),
            },
            Facet::Property {
                property_set,
                base_name,
                value,
                ..
            } => match value {
                Some(v) => format!("Property {property_set}.{base_name} = {v}"),
                None => format!("Property {property_set}.{base_name}"),
            },
            Facet::Material { value } => match value {
                Some(v) => format!("Material {v}"),
                None => "Any material".to_string(),
            },
            Facet::PartOf { entity, relation } => match relation {
                Some(rel) => format!("Part of {entity} via {rel}"),
                None => format!("Part of {entity}"),
            },
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// Occurrence upper bound of a requirement
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MaxOccurs {
    /// At most this many occurrences
    Bounded(u32),
    /// No upper bound
    #[default]
    Unbounded,
}

/// One condition selected entities must satisfy
#[derive(Clone, Debug, PartialEq)]
pub struct Requirement {
    /// The condition itself
    pub facet: Facet,
    /// Minimum occurrences; 0 marks the requirement optional
    pub min_occurs: u32,
    /// Maximum occurrences
    pub max_occurs: MaxOccurs,
    /// Author guidance shown alongside failures
    pub instructions: Option<String>,
}

impl Requirement {
    /// Wrap a facet with the default occurrence policy (required, unbounded)
    pub fn new(facet: Facet) -> Self {
        Self {
            facet,
            min_occurs: 1,
            max_occurs: MaxOccurs::Unbounded,
            instructions: None,
        }
    }

    /// Absence of the matched condition is itself a pass
    pub fn is_optional(&self) -> bool {
        self.min_occurs == 0
    }
}

/// One named rule: applicability filter plus requirements
///
/// Invariant: `applicability` is never empty; the parser drops specifications
/// that would apply to nothing.
#[derive(Clone, Debug, PartialEq)]
pub struct Specification {
    pub name: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    /// Schema versions the rule targets, e.g. "IFC4"
    pub ifc_versions: Vec<String>,
    /// Facets selecting which entities the rule governs (all must hold)
    pub applicability: Vec<Facet>,
    /// Conditions the selected entities must satisfy
    pub requirements: Vec<Requirement>,
}

/// The parsed compliance document
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IdsDocument {
    pub title: String,
    pub version: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub purpose: Option<String>,
    pub specifications: Vec<Specification>,
}
