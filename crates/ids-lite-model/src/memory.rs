// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory ModelAccess implementation
//!
//! Hosts that already hold a decoded entity graph (and tests) assemble a
//! [`MemoryModel`] through [`MemoryModelBuilder`]. The builder wires relation
//! backlinks (property sets, classifications, materials) onto the related
//! records and builds a class index for O(1) `ids_of_class` lookups.

use crate::{
    AttributeValue, EntityId, EntityRecord, IfcClass, ModelAccess, Result,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// In-memory entity graph
pub struct MemoryModel {
    /// Entity id -> record
    records: FxHashMap<u32, Arc<EntityRecord>>,
    /// Class -> entity ids, in insertion order
    class_index: FxHashMap<IfcClass, Vec<EntityId>>,
}

impl MemoryModel {
    /// Start building a model
    pub fn builder() -> MemoryModelBuilder {
        MemoryModelBuilder::default()
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the model holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ModelAccess for MemoryModel {
    fn record(&self, id: EntityId) -> Result<Option<Arc<EntityRecord>>> {
        Ok(self.records.get(&id.0).map(Arc::clone))
    }

    fn ids_of_class(&self, class: &IfcClass) -> Result<Vec<EntityId>> {
        Ok(self.class_index.get(class).cloned().unwrap_or_default())
    }
}

/// Builder for [`MemoryModel`]
#[derive(Default)]
pub struct MemoryModelBuilder {
    records: Vec<EntityRecord>,
}

impl MemoryModelBuilder {
    /// Add a record
    pub fn add(mut self, record: EntityRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Convenience: add an association relation record
    ///
    /// `relating_attr` is the relation's reference attribute name, e.g.
    /// `RelatingClassification` or `RelatingMaterial`.
    pub fn relate(
        self,
        rel_id: impl Into<EntityId>,
        class: IfcClass,
        relating_attr: &str,
        relating: impl Into<EntityId>,
        related: &[EntityId],
    ) -> Self {
        let relating: EntityId = relating.into();
        let record = EntityRecord::new(rel_id, class)
            .with_attr(relating_attr, relating)
            .with_attr(
                "RelatedObjects",
                AttributeValue::List(
                    related.iter().map(|id| AttributeValue::EntityRef(*id)).collect(),
                ),
            );
        self.add(record)
    }

    /// Finish building: wire relation backlinks and the class index
    pub fn finish(self) -> MemoryModel {
        let mut records: FxHashMap<u32, EntityRecord> = FxHashMap::default();
        let mut class_index: FxHashMap<IfcClass, Vec<EntityId>> = FxHashMap::default();
        let mut order: Vec<EntityId> = Vec::with_capacity(self.records.len());

        for record in self.records {
            order.push(record.id);
            records.insert(record.id.0, record);
        }

        // Backlinks from association relations onto the related records
        let backlinks: Vec<(EntityId, IfcClass, Vec<EntityId>, Option<EntityId>)> = order
            .iter()
            .filter_map(|id| records.get(&id.0))
            .filter_map(|rel| {
                let relating = match rel.class {
                    IfcClass::IfcRelDefinesByProperties => {
                        rel.attr("RelatingPropertyDefinition")?.as_entity_ref()
                    }
                    IfcClass::IfcRelAssociatesClassification => {
                        rel.attr("RelatingClassification")?.as_entity_ref()
                    }
                    IfcClass::IfcRelAssociatesMaterial => {
                        rel.attr("RelatingMaterial")?.as_entity_ref()
                    }
                    _ => return None,
                };
                let related = rel.attr("RelatedObjects")?.as_refs();
                Some((rel.id, rel.class.clone(), related, relating))
            })
            .collect();

        for (_rel_id, class, related, relating) in backlinks {
            let Some(target) = relating else { continue };
            for related_id in related {
                if let Some(record) = records.get_mut(&related_id.0) {
                    match class {
                        IfcClass::IfcRelDefinesByProperties => {
                            record.property_sets.push(target)
                        }
                        IfcClass::IfcRelAssociatesClassification => {
                            record.classifications.push(target)
                        }
                        IfcClass::IfcRelAssociatesMaterial => record.materials.push(target),
                        _ => {}
                    }
                }
            }
        }

        // Class index in insertion order keeps audit output deterministic
        for id in &order {
            if let Some(record) = records.get(&id.0) {
                class_index.entry(record.class.clone()).or_default().push(*id);
            }
        }

        MemoryModel {
            records: records
                .into_iter()
                .map(|(id, record)| (id, Arc::new(record)))
                .collect(),
            class_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelAccessExt;

    #[test]
    fn test_class_index_lookup() {
        let model = MemoryModel::builder()
            .add(EntityRecord::new(1u32, IfcClass::IfcWall).with_attr("Name", "W1"))
            .add(EntityRecord::new(2u32, IfcClass::IfcWall).with_attr("Name", "W2"))
            .add(EntityRecord::new(3u32, IfcClass::IfcSlab).with_attr("Name", "S1"))
            .finish();

        let walls = model.ids_of_class(&IfcClass::IfcWall).unwrap();
        assert_eq!(walls, vec![EntityId(1), EntityId(2)]);
        assert!(model.ids_of_class(&IfcClass::IfcDoor).unwrap().is_empty());
        assert_eq!(model.record_or_err(EntityId(3)).unwrap().name(), Some("S1"));
    }

    #[test]
    fn test_property_set_backlinks() {
        let model = MemoryModel::builder()
            .add(EntityRecord::new(1u32, IfcClass::IfcWall))
            .add(EntityRecord::new(10u32, IfcClass::IfcPropertySet).with_attr("Name", "Pset_WallCommon"))
            .relate(
                100u32,
                IfcClass::IfcRelDefinesByProperties,
                "RelatingPropertyDefinition",
                10u32,
                &[EntityId(1)],
            )
            .finish();

        let wall = model.record(EntityId(1)).unwrap().unwrap();
        assert_eq!(wall.property_sets, vec![EntityId(10)]);
    }

    #[test]
    fn test_classification_and_material_backlinks() {
        let model = MemoryModel::builder()
            .add(EntityRecord::new(1u32, IfcClass::IfcWall))
            .add(EntityRecord::new(20u32, IfcClass::IfcClassificationReference))
            .add(EntityRecord::new(30u32, IfcClass::IfcMaterial).with_attr("Name", "Concrete"))
            .relate(
                200u32,
                IfcClass::IfcRelAssociatesClassification,
                "RelatingClassification",
                20u32,
                &[EntityId(1)],
            )
            .relate(
                300u32,
                IfcClass::IfcRelAssociatesMaterial,
                "RelatingMaterial",
                30u32,
                &[EntityId(1)],
            )
            .finish();

        let wall = model.record(EntityId(1)).unwrap().unwrap();
        assert_eq!(wall.classifications, vec![EntityId(20)]);
        assert_eq!(wall.materials, vec![EntityId(30)]);
    }
}
