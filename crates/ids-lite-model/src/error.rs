// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for model access

use crate::EntityId;
use thiserror::Error;

/// Result type alias for model access operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors that can occur while reading the entity graph
///
/// Audit code catches these at the smallest enclosing facet or requirement
/// scope and degrades to a skipped contribution or a warning result; they
/// never abort a run.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Entity not found
    #[error("Entity {0} not found")]
    NotFound(EntityId),

    /// Reading an entity record failed
    #[error("Failed to read entity {entity}: {message}")]
    RecordAccess { entity: EntityId, message: String },

    /// Enumerating a class failed
    #[error("Failed to enumerate class {class}: {message}")]
    ClassAccess { class: String, message: String },

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl ModelError {
    /// Create a new record access error
    pub fn record_access(entity: EntityId, msg: impl Into<String>) -> Self {
        ModelError::RecordAccess {
            entity,
            message: msg.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        ModelError::Other(msg.into())
    }
}
