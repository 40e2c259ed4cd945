// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Applicability resolution
//!
//! Given a specification's applicability facets, compute the set of entity
//! ids for which *all* facets hold. Each facet contributes an id set via
//! facet-kind dispatch; the sets intersect on entity id. A facet whose
//! evaluation fails against the model contributes no ids instead of
//! aborting the resolution.

use crate::reader::{any_property_matches, GraphReader};
use ids_lite_model::{AttributeValue, EntityId, IfcClass, Result, AUDITABLE};
use ids_lite_spec::{matches_opt, Facet};
use std::collections::BTreeSet;
use tracing::warn;

/// Resolve the applicability facet list to the governed entity set
///
/// A list with zero facets yields the empty set, never "everything" - the
/// parser already rejects such specifications, this guards direct callers.
pub(crate) fn resolve_applicability(
    reader: &mut GraphReader,
    facets: &[Facet],
) -> BTreeSet<EntityId> {
    let mut running: Option<BTreeSet<EntityId>> = None;

    for facet in facets {
        let ids = match facet_ids(reader, facet) {
            Ok(ids) => ids,
            Err(error) => {
                warn!(facet = facet.kind(), %error, "applicability facet skipped");
                BTreeSet::new()
            }
        };
        running = Some(match running.take() {
            None => ids,
            Some(current) => current.intersection(&ids).copied().collect(),
        });
        if running.as_ref().is_some_and(BTreeSet::is_empty) {
            break;
        }
    }

    running.unwrap_or_default()
}

/// Entity ids matching one facet, by facet-kind dispatch
fn facet_ids(reader: &mut GraphReader, facet: &Facet) -> Result<BTreeSet<EntityId>> {
    let mut ids = BTreeSet::new();

    match facet {
        Facet::Entity {
            name,
            predefined_type,
        } => {
            // Resolve the class-name constraint against the static table;
            // patterns and enumerations select several classes at once.
            for class in AUDITABLE {
                if !name.matches(Some(class.name())) {
                    continue;
                }
                for id in reader.ids_of_class(class)? {
                    match predefined_type {
                        None => {
                            ids.insert(id);
                        }
                        Some(constraint) => {
                            let Some(record) = reader.record(id)? else {
                                continue;
                            };
                            let declared = reader.predefined_type(&record);
                            if constraint.matches(declared.as_deref()) {
                                ids.insert(id);
                            }
                        }
                    }
                }
            }
        }

        Facet::Classification { system, value } => {
            for rel_id in reader.ids_of_class(&IfcClass::IfcRelAssociatesClassification)? {
                let Some(rel) = reader.record(rel_id)? else {
                    continue;
                };
                let Some(target) = rel
                    .attr("RelatingClassification")
                    .and_then(AttributeValue::as_entity_ref)
                else {
                    continue;
                };
                let Some(reference) = reader.classification_ref(target)? else {
                    continue;
                };
                if matches_opt(reference.system.as_deref(), system.as_ref())
                    && matches_opt(reference.value.as_deref(), value.as_ref())
                {
                    ids.extend(related_objects(&rel, "RelatedObjects"));
                }
            }
        }

        Facet::Attribute { name, value } => {
            // Full-model scan; allowed to be slow, not on a latency path.
            for class in AUDITABLE {
                for id in reader.ids_of_class(class)? {
                    let Some(record) = reader.record(id)? else {
                        continue;
                    };
                    let hit = record.attributes.iter().any(|(attr_name, attr_value)| {
                        name.matches(Some(attr_name.as_str()))
                            && !attr_value.is_null()
                            && matches_opt(attr_value.display_string().as_deref(), value.as_ref())
                    });
                    if hit {
                        ids.insert(id);
                    }
                }
            }
        }

        Facet::Property {
            property_set,
            base_name,
            value,
            ..
        } => {
            for class in AUDITABLE {
                for id in reader.ids_of_class(class)? {
                    let matched = reader.matching_properties(id, property_set, base_name)?;
                    if any_property_matches(&matched, value.as_ref()) {
                        ids.insert(id);
                    }
                }
            }
        }

        Facet::Material { value } => {
            for rel_id in reader.ids_of_class(&IfcClass::IfcRelAssociatesMaterial)? {
                let Some(rel) = reader.record(rel_id)? else {
                    continue;
                };
                let Some(target) = rel
                    .attr("RelatingMaterial")
                    .and_then(AttributeValue::as_entity_ref)
                else {
                    continue;
                };
                let hit = match value {
                    None => true,
                    Some(constraint) => {
                        let names = reader.material_names(target)?;
                        names.iter().any(|name| constraint.matches(Some(name.as_str())))
                    }
                };
                if hit {
                    ids.extend(related_objects(&rel, "RelatedObjects"));
                }
            }
        }

        Facet::PartOf { entity, relation } => {
            // Decomposition, containment and nesting relations; the facet's
            // relation field narrows the scan to one relation class.
            let scans: [(IfcClass, &str, &str); 3] = [
                (IfcClass::IfcRelAggregates, "RelatingObject", "RelatedObjects"),
                (
                    IfcClass::IfcRelContainedInSpatialStructure,
                    "RelatingStructure",
                    "RelatedElements",
                ),
                (IfcClass::IfcRelNests, "RelatingObject", "RelatedObjects"),
            ];
            for (class, relating_attr, related_attr) in scans {
                if let Some(wanted) = relation {
                    if !wanted.eq_ignore_ascii_case(class.name()) {
                        continue;
                    }
                }
                for rel_id in reader.ids_of_class(&class)? {
                    let Some(rel) = reader.record(rel_id)? else {
                        continue;
                    };
                    let Some(relating) = rel
                        .attr(relating_attr)
                        .and_then(AttributeValue::as_entity_ref)
                    else {
                        continue;
                    };
                    let Some(relating_record) = reader.record(relating)? else {
                        continue;
                    };
                    if entity.matches(Some(relating_record.class.name())) {
                        ids.extend(related_objects(&rel, related_attr));
                    }
                }
            }
        }
    }

    Ok(ids)
}

fn related_objects(rel: &ids_lite_model::EntityRecord, attr: &str) -> Vec<EntityId> {
    rel.attr(attr).map(AttributeValue::as_refs).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ids_lite_model::{EntityRecord, MemoryModel};
    use ids_lite_spec::{Restriction, ValueConstraint};
    use std::sync::Arc;

    fn literal(s: &str) -> ValueConstraint {
        ValueConstraint::Literal(s.into())
    }

    fn model() -> MemoryModel {
        MemoryModel::builder()
            .add(
                EntityRecord::new(1u32, IfcClass::IfcWall)
                    .with_attr("Name", "W1")
                    .with_attr("PredefinedType", AttributeValue::Enum("SOLIDWALL".into())),
            )
            .add(EntityRecord::new(2u32, IfcClass::IfcWall).with_attr("Name", "W2"))
            .add(EntityRecord::new(3u32, IfcClass::IfcSlab).with_attr("Name", "S1"))
            .add(EntityRecord::new(4u32, IfcClass::IfcBuildingStorey).with_attr("Name", "Level 1"))
            .relate(
                400u32,
                IfcClass::IfcRelAssociatesMaterial,
                "RelatingMaterial",
                30u32,
                &[EntityId(1), EntityId(3)],
            )
            .add(EntityRecord::new(30u32, IfcClass::IfcMaterial).with_attr("Name", "Concrete"))
            .finish()
    }

    fn resolve(facets: &[Facet]) -> BTreeSet<EntityId> {
        let mut reader = GraphReader::new(Arc::new(model()));
        resolve_applicability(&mut reader, facets)
    }

    #[test]
    fn test_empty_facet_list_yields_empty_set() {
        assert!(resolve(&[]).is_empty());
    }

    #[test]
    fn test_entity_facet_by_class_name() {
        let ids = resolve(&[Facet::Entity {
            name: literal("IFCWALL"),
            predefined_type: None,
        }]);
        assert_eq!(ids, BTreeSet::from([EntityId(1), EntityId(2)]));
    }

    #[test]
    fn test_entity_facet_with_predefined_type() {
        let ids = resolve(&[Facet::Entity {
            name: literal("IFCWALL"),
            predefined_type: Some(literal("SOLIDWALL")),
        }]);
        assert_eq!(ids, BTreeSet::from([EntityId(1)]));
    }

    #[test]
    fn test_entity_facet_with_pattern_selects_several_classes() {
        let mut restriction = Restriction::default();
        restriction.set_pattern("IFC(WALL|SLAB)").unwrap();
        let ids = resolve(&[Facet::Entity {
            name: ValueConstraint::Restriction(restriction),
            predefined_type: None,
        }]);
        assert_eq!(ids, BTreeSet::from([EntityId(1), EntityId(2), EntityId(3)]));
    }

    #[test]
    fn test_attribute_facet_scans_all_classes() {
        let ids = resolve(&[Facet::Attribute {
            name: literal("Name"),
            value: Some(literal("Level 1")),
        }]);
        assert_eq!(ids, BTreeSet::from([EntityId(4)]));
    }

    #[test]
    fn test_material_facet() {
        let ids = resolve(&[Facet::Material {
            value: Some(literal("Concrete")),
        }]);
        assert_eq!(ids, BTreeSet::from([EntityId(1), EntityId(3)]));

        let ids = resolve(&[Facet::Material {
            value: Some(literal("Steel")),
        }]);
        assert!(ids.is_empty());
    }

    #[test]
    fn test_intersection_across_facets() {
        // Walls intersected with concrete-bearing entities: only wall #1
        let ids = resolve(&[
            Facet::Entity {
                name: literal("IFCWALL"),
                predefined_type: None,
            },
            Facet::Material {
                value: Some(literal("Concrete")),
            },
        ]);
        assert_eq!(ids, BTreeSet::from([EntityId(1)]));
    }

    #[test]
    fn test_disjoint_facets_intersect_to_empty() {
        let ids = resolve(&[
            Facet::Entity {
                name: literal("IFCSLAB"),
                predefined_type: None,
            },
            Facet::Attribute {
                name: literal("Name"),
                value: Some(literal("W2")),
            },
        ]);
        assert!(ids.is_empty());
    }
}
