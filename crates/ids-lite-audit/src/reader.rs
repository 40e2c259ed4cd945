// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cached graph reading for one audit run
//!
//! [`GraphReader`] wraps the host's [`ModelAccess`] adapter with the three
//! run-scoped memoization caches: entity records, class names, and resolved
//! property sets. A reader is constructed fresh per run and discarded with
//! it; it is exclusively owned by the in-flight run, so lookups take
//! `&mut self` and need no locking.

use ids_lite_model::{
    AttributeValue, EntityId, EntityRecord, IfcClass, ModelAccess, ModelError, Result,
};
use ids_lite_spec::{matches_opt, ValueConstraint};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// A property resolved from a property set or element quantity
#[derive(Clone, Debug)]
pub(crate) struct ResolvedProperty {
    pub set_name: String,
    pub name: String,
    /// String form of the value; `None` when the value is null or not scalar
    pub value: Option<String>,
}

/// Classification attached to an entity
#[derive(Clone, Debug)]
pub(crate) struct ClassificationRef {
    /// Name of the classification system, from the reference source chain
    pub system: Option<String>,
    /// Identification / reference / name of the classification entry
    pub value: Option<String>,
}

impl ClassificationRef {
    pub fn label(&self) -> String {
        match (&self.system, &self.value) {
            (Some(s), Some(v)) => format!("{s}:{v}"),
            (Some(s), None) => s.clone(),
            (None, Some(v)) => v.clone(),
            (None, None) => "(unnamed)".to_string(),
        }
    }
}

pub(crate) struct GraphReader {
    model: Arc<dyn ModelAccess>,
    record_cache: FxHashMap<u32, Option<Arc<EntityRecord>>>,
    class_name_cache: FxHashMap<u32, String>,
    property_cache: FxHashMap<u32, Arc<Vec<ResolvedProperty>>>,
}

impl GraphReader {
    pub fn new(model: Arc<dyn ModelAccess>) -> Self {
        Self {
            model,
            record_cache: FxHashMap::default(),
            class_name_cache: FxHashMap::default(),
            property_cache: FxHashMap::default(),
        }
    }

    pub fn ids_of_class(&self, class: &IfcClass) -> Result<Vec<EntityId>> {
        self.model.ids_of_class(class)
    }

    pub fn record(&mut self, id: EntityId) -> Result<Option<Arc<EntityRecord>>> {
        if let Some(cached) = self.record_cache.get(&id.0) {
            return Ok(cached.clone());
        }
        let record = self.model.record(id)?;
        self.record_cache.insert(id.0, record.clone());
        Ok(record)
    }

    pub fn record_or_err(&mut self, id: EntityId) -> Result<Arc<EntityRecord>> {
        self.record(id)?.ok_or(ModelError::NotFound(id))
    }

    pub fn class_name(&mut self, record: &EntityRecord) -> String {
        if let Some(cached) = self.class_name_cache.get(&record.id.0) {
            return cached.clone();
        }
        let name = self.model.class_name(record);
        self.class_name_cache.insert(record.id.0, name.clone());
        name
    }

    /// Predefined type of an entity, with the USERDEFINED escape to ObjectType
    pub fn predefined_type(&mut self, record: &EntityRecord) -> Option<String> {
        let declared = record.predefined_type()?;
        if declared.eq_ignore_ascii_case("USERDEFINED") {
            if let Some(object_type) = record.attr_string("ObjectType") {
                return Some(object_type);
            }
        }
        Some(declared)
    }

    /// All properties of an entity, resolved through its property-set links
    ///
    /// Property sets contribute their single-value properties; element
    /// quantities contribute their named quantities through the same path, so
    /// property facets can target Qto_* sets as well.
    pub fn properties(&mut self, id: EntityId) -> Result<Arc<Vec<ResolvedProperty>>> {
        if let Some(cached) = self.property_cache.get(&id.0) {
            return Ok(Arc::clone(cached));
        }

        let mut resolved = Vec::new();
        let set_ids = match self.record(id)? {
            Some(record) => record.property_sets.clone(),
            None => Vec::new(),
        };

        for set_id in set_ids {
            let Some(set) = self.record(set_id)? else {
                continue;
            };
            let Some(set_name) = set.attr_string("Name") else {
                continue;
            };
            let members = match set.class {
                IfcClass::IfcPropertySet => set
                    .attr("HasProperties")
                    .map(AttributeValue::as_refs)
                    .unwrap_or_default(),
                IfcClass::IfcElementQuantity => set
                    .attr("Quantities")
                    .map(AttributeValue::as_refs)
                    .unwrap_or_default(),
                _ => continue,
            };
            for member_id in members {
                let Some(member) = self.record(member_id)? else {
                    continue;
                };
                if let Some(property) = resolve_member(&member, &set_name) {
                    resolved.push(property);
                }
            }
        }

        let resolved = Arc::new(resolved);
        self.property_cache.insert(id.0, Arc::clone(&resolved));
        Ok(resolved)
    }

    /// Properties of an entity matching a property-set and name constraint
    ///
    /// Both selector constraints may use patterns or enumerations, so the
    /// resolution walks every set rather than looking names up directly.
    pub fn matching_properties(
        &mut self,
        id: EntityId,
        set: &ValueConstraint,
        name: &ValueConstraint,
    ) -> Result<Vec<ResolvedProperty>> {
        Ok(self
            .properties(id)?
            .iter()
            .filter(|p| set.matches(Some(p.set_name.as_str())) && name.matches(Some(p.name.as_str())))
            .cloned()
            .collect())
    }

    /// Classifications attached to an entity
    pub fn classifications(&mut self, id: EntityId) -> Result<Vec<ClassificationRef>> {
        let reference_ids = match self.record(id)? {
            Some(record) => record.classifications.clone(),
            None => Vec::new(),
        };
        let mut refs = Vec::with_capacity(reference_ids.len());
        for reference_id in reference_ids {
            if let Some(reference) = self.classification_ref(reference_id)? {
                refs.push(reference);
            }
        }
        Ok(refs)
    }

    /// Resolve one classification reference: its value and, following the
    /// reference source chain, the owning system's name
    pub fn classification_ref(&mut self, id: EntityId) -> Result<Option<ClassificationRef>> {
        let Some(record) = self.record(id)? else {
            return Ok(None);
        };

        let value = match record.class {
            IfcClass::IfcClassificationReference => record
                .attr_string("Identification")
                .or_else(|| record.attr_string("ItemReference"))
                .or_else(|| record.attr_string("Name")),
            IfcClass::IfcClassification => record.attr_string("Name"),
            _ => return Ok(None),
        };

        // Walk ReferencedSource up to the classification system. The chain
        // is acyclic in well-formed models; the cap guards against bad data.
        let mut system = None;
        let mut cursor = record;
        for _ in 0..16 {
            match cursor.class {
                IfcClass::IfcClassification => {
                    system = cursor.attr_string("Name");
                    break;
                }
                IfcClass::IfcClassificationReference => {
                    let Some(source) = cursor
                        .attr("ReferencedSource")
                        .and_then(AttributeValue::as_entity_ref)
                    else {
                        break;
                    };
                    let Some(next) = self.record(source)? else {
                        break;
                    };
                    cursor = next;
                }
                _ => break,
            }
        }

        Ok(Some(ClassificationRef { system, value }))
    }

    /// Names of all materials assigned through a material entity
    ///
    /// A plain material contributes its own name; layer sets, layer-set
    /// usages, material lists and constituent sets contribute every
    /// contained material name.
    pub fn material_names(&mut self, id: EntityId) -> Result<Vec<String>> {
        let mut visited = FxHashSet::default();
        self.material_names_inner(id, &mut visited)
    }

    /// Materials assigned to an entity, as names
    pub fn materials_of(&mut self, id: EntityId) -> Result<Vec<String>> {
        let material_ids = match self.record(id)? {
            Some(record) => record.materials.clone(),
            None => Vec::new(),
        };
        let mut names = Vec::new();
        let mut visited = FxHashSet::default();
        for material_id in material_ids {
            names.extend(self.material_names_inner(material_id, &mut visited)?);
        }
        Ok(names)
    }

    // Material reference graphs in bad data can be cyclic; a revisited id
    // contributes nothing, same as the capped ReferencedSource walk above.
    fn material_names_inner(
        &mut self,
        id: EntityId,
        visited: &mut FxHashSet<EntityId>,
    ) -> Result<Vec<String>> {
        if !visited.insert(id) {
            return Ok(Vec::new());
        }
        let Some(record) = self.record(id)? else {
            return Ok(Vec::new());
        };

        let mut names = Vec::new();
        match record.class {
            IfcClass::IfcMaterial => {
                if let Some(name) = record.attr_string("Name") {
                    names.push(name);
                }
            }
            IfcClass::IfcMaterialLayerSet => {
                for layer_id in collect_refs(&record, "MaterialLayers") {
                    names.extend(self.indirect_material_name(layer_id, "Material", visited)?);
                }
            }
            IfcClass::IfcMaterialLayerSetUsage => {
                if let Some(set_id) = record
                    .attr("ForLayerSet")
                    .and_then(AttributeValue::as_entity_ref)
                {
                    names.extend(self.material_names_inner(set_id, visited)?);
                }
            }
            IfcClass::IfcMaterialList => {
                for material_id in collect_refs(&record, "Materials") {
                    names.extend(self.material_names_inner(material_id, visited)?);
                }
            }
            IfcClass::IfcMaterialConstituentSet => {
                for constituent_id in collect_refs(&record, "MaterialConstituents") {
                    names.extend(self.indirect_material_name(constituent_id, "Material", visited)?);
                }
            }
            _ => {}
        }
        Ok(names)
    }

    fn indirect_material_name(
        &mut self,
        id: EntityId,
        attr: &str,
        visited: &mut FxHashSet<EntityId>,
    ) -> Result<Vec<String>> {
        let Some(record) = self.record(id)? else {
            return Ok(Vec::new());
        };
        let Some(material_id) = record.attr(attr).and_then(AttributeValue::as_entity_ref) else {
            return Ok(Vec::new());
        };
        self.material_names_inner(material_id, visited)
    }
}

fn collect_refs(record: &EntityRecord, attr: &str) -> Vec<EntityId> {
    record.attr(attr).map(AttributeValue::as_refs).unwrap_or_default()
}

fn resolve_member(member: &EntityRecord, set_name: &str) -> Option<ResolvedProperty> {
    let name = member.attr_string("Name")?;
    let value = match member.class {
        IfcClass::IfcPropertySingleValue => member.attr_string("NominalValue"),
        IfcClass::IfcQuantityLength => member.attr_string("LengthValue"),
        IfcClass::IfcQuantityArea => member.attr_string("AreaValue"),
        IfcClass::IfcQuantityVolume => member.attr_string("VolumeValue"),
        IfcClass::IfcQuantityCount => member.attr_string("CountValue"),
        IfcClass::IfcQuantityWeight => member.attr_string("WeightValue"),
        IfcClass::IfcQuantityTime => member.attr_string("TimeValue"),
        _ => return None,
    };
    Some(ResolvedProperty {
        set_name: set_name.to_string(),
        name,
        value,
    })
}

/// True when any resolved property is present, honoring an optional value
/// constraint
pub(crate) fn any_property_matches(
    properties: &[ResolvedProperty],
    value: Option<&ValueConstraint>,
) -> bool {
    properties
        .iter()
        .any(|p| p.value.is_some() && matches_opt(p.value.as_deref(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ids_lite_model::MemoryModel;

    fn wall_with_pset() -> MemoryModel {
        MemoryModel::builder()
            .add(EntityRecord::new(1u32, IfcClass::IfcWall).with_attr("Name", "W1"))
            .add(
                EntityRecord::new(10u32, IfcClass::IfcPropertySet)
                    .with_attr("Name", "Pset_WallCommon")
                    .with_attr(
                        "HasProperties",
                        AttributeValue::List(vec![AttributeValue::EntityRef(EntityId(11))]),
                    ),
            )
            .add(
                EntityRecord::new(11u32, IfcClass::IfcPropertySingleValue)
                    .with_attr("Name", "LoadBearing")
                    .with_attr("NominalValue", true),
            )
            .relate(
                100u32,
                IfcClass::IfcRelDefinesByProperties,
                "RelatingPropertyDefinition",
                10u32,
                &[EntityId(1)],
            )
            .finish()
    }

    #[test]
    fn test_property_resolution_and_cache() {
        let mut reader = GraphReader::new(Arc::new(wall_with_pset()));
        let properties = reader.properties(EntityId(1)).unwrap();
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].set_name, "Pset_WallCommon");
        assert_eq!(properties[0].name, "LoadBearing");
        assert_eq!(properties[0].value.as_deref(), Some("true"));

        // Second lookup serves the same Arc from the cache
        let again = reader.properties(EntityId(1)).unwrap();
        assert!(Arc::ptr_eq(&properties, &again));
    }

    #[test]
    fn test_matching_properties_with_pattern_selector() {
        let mut reader = GraphReader::new(Arc::new(wall_with_pset()));
        let mut set = ids_lite_spec::Restriction::default();
        set.set_pattern("Pset_.*").unwrap();
        let matches = reader
            .matching_properties(
                EntityId(1),
                &ValueConstraint::Restriction(set),
                &ValueConstraint::Literal("LoadBearing".into()),
            )
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert!(any_property_matches(
            &matches,
            Some(&ValueConstraint::Literal("TRUE".into()))
        ));
    }

    #[test]
    fn test_classification_source_chain() {
        let model = MemoryModel::builder()
            .add(EntityRecord::new(1u32, IfcClass::IfcWall))
            .add(EntityRecord::new(20u32, IfcClass::IfcClassification).with_attr("Name", "Uniclass"))
            .add(
                EntityRecord::new(21u32, IfcClass::IfcClassificationReference)
                    .with_attr("Identification", "EF_25_10")
                    .with_attr("ReferencedSource", EntityId(20)),
            )
            .relate(
                200u32,
                IfcClass::IfcRelAssociatesClassification,
                "RelatingClassification",
                21u32,
                &[EntityId(1)],
            )
            .finish();

        let mut reader = GraphReader::new(Arc::new(model));
        let refs = reader.classifications(EntityId(1)).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].system.as_deref(), Some("Uniclass"));
        assert_eq!(refs[0].value.as_deref(), Some("EF_25_10"));
        assert_eq!(refs[0].label(), "Uniclass:EF_25_10");
    }

    #[test]
    fn test_cyclic_material_references_terminate() {
        // A material list that lists itself, next to a real material
        let model = MemoryModel::builder()
            .add(EntityRecord::new(1u32, IfcClass::IfcWall))
            .add(EntityRecord::new(30u32, IfcClass::IfcMaterial).with_attr("Name", "Concrete"))
            .add(
                EntityRecord::new(31u32, IfcClass::IfcMaterialList).with_attr(
                    "Materials",
                    AttributeValue::List(vec![
                        AttributeValue::EntityRef(EntityId(31)),
                        AttributeValue::EntityRef(EntityId(30)),
                    ]),
                ),
            )
            .relate(
                300u32,
                IfcClass::IfcRelAssociatesMaterial,
                "RelatingMaterial",
                31u32,
                &[EntityId(1)],
            )
            .finish();

        let mut reader = GraphReader::new(Arc::new(model));
        let names = reader.materials_of(EntityId(1)).unwrap();
        assert_eq!(names, vec!["Concrete".to_string()]);
    }

    #[test]
    fn test_mutually_referencing_layer_sets_terminate() {
        // Usage -> set -> layer -> usage: the revisit stops the walk
        let model = MemoryModel::builder()
            .add(
                EntityRecord::new(40u32, IfcClass::IfcMaterialLayerSetUsage)
                    .with_attr("ForLayerSet", EntityId(41)),
            )
            .add(
                EntityRecord::new(41u32, IfcClass::IfcMaterialLayerSet).with_attr(
                    "MaterialLayers",
                    AttributeValue::List(vec![AttributeValue::EntityRef(EntityId(42))]),
                ),
            )
            .add(
                EntityRecord::new(42u32, IfcClass::IfcMaterialLayer)
                    .with_attr("Material", EntityId(40)),
            )
            .finish();

        let mut reader = GraphReader::new(Arc::new(model));
        assert!(reader.material_names(EntityId(40)).unwrap().is_empty());
    }

    #[test]
    fn test_layer_set_material_names() {
        let model = MemoryModel::builder()
            .add(EntityRecord::new(1u32, IfcClass::IfcWall))
            .add(EntityRecord::new(30u32, IfcClass::IfcMaterial).with_attr("Name", "Concrete"))
            .add(EntityRecord::new(31u32, IfcClass::IfcMaterial).with_attr("Name", "Insulation"))
            .add(
                EntityRecord::new(32u32, IfcClass::IfcMaterialLayer)
                    .with_attr("Material", EntityId(30)),
            )
            .add(
                EntityRecord::new(33u32, IfcClass::IfcMaterialLayer)
                    .with_attr("Material", EntityId(31)),
            )
            .add(
                EntityRecord::new(34u32, IfcClass::IfcMaterialLayerSet).with_attr(
                    "MaterialLayers",
                    AttributeValue::List(vec![
                        AttributeValue::EntityRef(EntityId(32)),
                        AttributeValue::EntityRef(EntityId(33)),
                    ]),
                ),
            )
            .relate(
                300u32,
                IfcClass::IfcRelAssociatesMaterial,
                "RelatingMaterial",
                34u32,
                &[EntityId(1)],
            )
            .finish();

        let mut reader = GraphReader::new(Arc::new(model));
        let names = reader.materials_of(EntityId(1)).unwrap();
        assert_eq!(names, vec!["Concrete".to_string(), "Insulation".to_string()]);
    }
}
