// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model access trait for reading the audited entity graph

use crate::{EntityRecord, EntityId, IfcClass, Result};
use std::sync::Arc;

/// Read-only access to the audited entity graph
///
/// Implemented by the host application (or by [`crate::MemoryModel`] for
/// in-process graphs). Calls must be referentially stable within one audit
/// run: repeated calls with the same id return equivalent data. The graph is
/// treated as a frozen snapshot for the duration of a run.
///
/// # Example
///
/// ```ignore
/// use ids_lite_model::{ModelAccess, IfcClass};
///
/// fn count_walls(model: &dyn ModelAccess) -> usize {
///     model
///         .ids_of_class(&IfcClass::IfcWall)
///         .map(|ids| ids.len())
///         .unwrap_or(0)
/// }
/// ```
pub trait ModelAccess: Send + Sync {
    /// Get the record for an entity id
    ///
    /// Returns `Ok(None)` when the id does not exist; `Err` only when the
    /// backing store itself fails.
    fn record(&self, id: EntityId) -> Result<Option<Arc<EntityRecord>>>;

    /// All entity ids whose structural class equals the given class
    fn ids_of_class(&self, class: &IfcClass) -> Result<Vec<EntityId>>;

    /// Human-readable structural class name for a record
    fn class_name(&self, record: &EntityRecord) -> String {
        record.class.name().to_string()
    }
}

/// Extension methods for ModelAccess
pub trait ModelAccessExt: ModelAccess {
    /// Get a record or return an error when the id is unknown
    fn record_or_err(&self, id: EntityId) -> Result<Arc<EntityRecord>> {
        self.record(id)?.ok_or(crate::ModelError::NotFound(id))
    }

    /// Resolve a list of entity ids to their records, skipping unknown ids
    fn records_of(&self, ids: &[EntityId]) -> Result<Vec<Arc<EntityRecord>>> {
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(record) = self.record(*id)? {
                records.push(record);
            }
        }
        Ok(records)
    }
}

// Blanket implementation for all ModelAccess types
impl<T: ModelAccess + ?Sized> ModelAccessExt for T {}
