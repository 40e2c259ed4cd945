// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Requirement checking
//!
//! Evaluates one requirement against one resolved entity. Any error raised
//! while checking is caught at this boundary and converted to a `Warning`
//! result carrying the error text - a single malformed entity never aborts
//! the overall audit.

use crate::reader::GraphReader;
use crate::result::{AuditResult, CheckStatus};
use ids_lite_model::{EntityRecord, Result};
use ids_lite_spec::{matches_opt, Facet, Requirement, ValueConstraint};
use tracing::warn;

/// Verdict plus justification, before it is wrapped into an [`AuditResult`]
struct Outcome {
    status: CheckStatus,
    message: String,
    details: Option<String>,
}

impl Outcome {
    fn new(status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }
}

/// Check one requirement against one entity
pub(crate) fn check(
    reader: &mut GraphReader,
    entity: &EntityRecord,
    specification_name: &str,
    requirement: &Requirement,
) -> AuditResult {
    let outcome = match evaluate(reader, entity, requirement) {
        Ok(outcome) => outcome,
        Err(error) => {
            warn!(entity = %entity.id, %error, "requirement check degraded to warning");
            Outcome::new(
                CheckStatus::Warning,
                format!("Could not be conclusively judged: {error}"),
            )
        }
    };

    AuditResult {
        status: outcome.status,
        entity_id: entity.id,
        entity_name: entity
            .name()
            .or(entity.global_id())
            .unwrap_or("(unnamed)")
            .to_string(),
        entity_type: reader.class_name(entity),
        specification_name: specification_name.to_string(),
        requirement_description: requirement.facet.describe(),
        message: outcome.message,
        details: outcome.details,
    }
}

/// Facet-kind dispatch for the actual evaluation
fn evaluate(
    reader: &mut GraphReader,
    entity: &EntityRecord,
    requirement: &Requirement,
) -> Result<Outcome> {
    match &requirement.facet {
        Facet::Property {
            property_set,
            base_name,
            value,
            ..
        } => check_property(reader, entity, requirement, property_set, base_name, value),
        Facet::Attribute { name, value } => {
            Ok(check_attribute(entity, requirement, name, value))
        }
        Facet::Classification { system, value } => {
            check_classification(reader, entity, requirement, system, value)
        }
        Facet::Material { value } => check_material(reader, entity, requirement, value),
        // Entity and partOf conditions are fully captured by applicability;
        // they have no well-defined check against a single resolved entity
        // and are flagged rather than silently skipped.
        Facet::Entity { .. } | Facet::PartOf { .. } => Ok(Outcome::new(
            CheckStatus::NotApplicable,
            format!(
                "{} requirements are evaluated through applicability and have no per-entity check",
                requirement.facet.kind()
            ),
        )),
    }
}

fn check_property(
    reader: &mut GraphReader,
    entity: &EntityRecord,
    requirement: &Requirement,
    property_set: &ValueConstraint,
    base_name: &ValueConstraint,
    value: &Option<ValueConstraint>,
) -> Result<Outcome> {
    let resolved = reader.matching_properties(entity.id, property_set, base_name)?;
    let present: Vec<_> = resolved.iter().filter(|p| p.value.is_some()).collect();

    if present.is_empty() {
        return Ok(absent_outcome(
            requirement,
            format!("Property {base_name} in set {property_set}"),
        ));
    }

    match value {
        None => Ok(Outcome::new(
            CheckStatus::Pass,
            format!(
                "Property present with value '{}'",
                present[0].value.as_deref().unwrap_or_default()
            ),
        )),
        Some(constraint) => {
            let hit = present
                .iter()
                .find(|p| constraint.matches(p.value.as_deref()));
            let details = Some(constraint.to_string());
            match hit {
                Some(p) => Ok(Outcome::new(
                    CheckStatus::Pass,
                    format!(
                        "Value '{}' matches the expected value",
                        p.value.as_deref().unwrap_or_default()
                    ),
                )
                .with_details(details)),
                None => Ok(Outcome::new(
                    CheckStatus::Fail,
                    format!(
                        "Value '{}' does not match the expected value",
                        found_values(&present)
                    ),
                )
                .with_details(details)),
            }
        }
    }
}

fn check_attribute(
    entity: &EntityRecord,
    requirement: &Requirement,
    name: &ValueConstraint,
    value: &Option<ValueConstraint>,
) -> Outcome {
    // The name constraint may itself be a pattern or enumeration, so walk
    // the attribute map instead of a direct lookup.
    let present: Vec<(&String, String)> = entity
        .attributes
        .iter()
        .filter(|(attr_name, attr_value)| {
            name.matches(Some(attr_name.as_str())) && !attr_value.is_null()
        })
        .filter_map(|(attr_name, attr_value)| {
            attr_value.display_string().map(|v| (attr_name, v))
        })
        .collect();

    if present.is_empty() {
        return absent_outcome(requirement, format!("Attribute {name}"));
    }

    match value {
        None => Outcome::new(
            CheckStatus::Pass,
            format!("Attribute present with value '{}'", present[0].1),
        ),
        Some(constraint) => {
            let hit = present.iter().find(|(_, v)| constraint.matches(Some(v.as_str())));
            let details = Some(constraint.to_string());
            match hit {
                Some((_, v)) => Outcome::new(
                    CheckStatus::Pass,
                    format!("Value '{v}' matches the expected value"),
                )
                .with_details(details),
                None => Outcome::new(
                    CheckStatus::Fail,
                    format!(
                        "Value '{}' does not match the expected value",
                        present
                            .iter()
                            .map(|(_, v)| v.as_str())
                            .collect::<Vec<_>>()
                            .join("', '")
                    ),
                )
                .with_details(details),
            }
        }
    }
}

fn check_classification(
    reader: &mut GraphReader,
    entity: &EntityRecord,
    requirement: &Requirement,
    system: &Option<ValueConstraint>,
    value: &Option<ValueConstraint>,
) -> Result<Outcome> {
    let refs = reader.classifications(entity.id)?;

    if refs.is_empty() {
        return Ok(absent_outcome(requirement, "Classification".to_string()));
    }

    let hit = refs.iter().find(|r| {
        matches_opt(r.system.as_deref(), system.as_ref())
            && matches_opt(r.value.as_deref(), value.as_ref())
    });
    match hit {
        Some(reference) => Ok(Outcome::new(
            CheckStatus::Pass,
            format!("Classification {} matches", reference.label()),
        )),
        None => Ok(Outcome::new(
            CheckStatus::Fail,
            format!(
                "No classification matches; found: {}",
                refs.iter()
                    .map(|r| r.label())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        )),
    }
}

fn check_material(
    reader: &mut GraphReader,
    entity: &EntityRecord,
    requirement: &Requirement,
    value: &Option<ValueConstraint>,
) -> Result<Outcome> {
    let names = reader.materials_of(entity.id)?;

    if names.is_empty() {
        return Ok(absent_outcome(requirement, "Material".to_string()));
    }

    match value {
        None => Ok(Outcome::new(
            CheckStatus::Pass,
            format!("Material present: {}", names.join(", ")),
        )),
        Some(constraint) => {
            let details = Some(constraint.to_string());
            match names.iter().find(|name| constraint.matches(Some(name.as_str()))) {
                Some(name) => Ok(Outcome::new(
                    CheckStatus::Pass,
                    format!("Material '{name}' matches"),
                )
                .with_details(details)),
                None => Ok(Outcome::new(
                    CheckStatus::Fail,
                    format!("No material matches; found: {}", names.join(", ")),
                )
                .with_details(details)),
            }
        }
    }
}

/// The optional/required split applied when the targeted condition is absent
fn absent_outcome(requirement: &Requirement, subject: String) -> Outcome {
    if requirement.is_optional() {
        Outcome::new(
            CheckStatus::Pass,
            format!("Optional {} absent, which is allowed", lowercase_first(&subject)),
        )
    } else {
        Outcome::new(
            CheckStatus::Fail,
            format!("no {} found", lowercase_first(&subject)),
        )
    }
}

fn found_values(present: &[&crate::reader::ResolvedProperty]) -> String {
    present
        .iter()
        .filter_map(|p| p.value.as_deref())
        .collect::<Vec<_>>()
        .join("', '")
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
