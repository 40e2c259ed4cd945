// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IDS-Lite Model - Entity-graph types and model access traits
//!
//! This crate provides the shared vocabulary for auditing IFC building models:
//! typed entity records with named attributes and relation lists, plus the
//! [`ModelAccess`] trait that audit code uses to read a model without caring
//! which parser or host application produced it.
//!
//! # Architecture
//!
//! - [`EntityId`], [`IfcClass`], [`AttributeValue`] - fundamental value types
//! - [`EntityRecord`] - one decoded entity: class tag, named attributes,
//!   relation lists
//! - [`ModelAccess`] - read-only adapter implemented by the host application
//! - [`MemoryModel`] - in-memory reference implementation with a builder,
//!   used by tests and by hosts that already hold a decoded graph
//!
//! # Example
//!
//! ```ignore
//! use ids_lite_model::{EntityId, IfcClass, ModelAccess};
//!
//! fn wall_names(model: &dyn ModelAccess) -> Vec<String> {
//!     let mut names = Vec::new();
//!     for id in model.ids_of_class(&IfcClass::IfcWall).unwrap_or_default() {
//!         if let Ok(Some(record)) = model.record(id) {
//!             if let Some(name) = record.name() {
//!                 names.push(name.to_string());
//!             }
//!         }
//!     }
//!     names
//! }
//! ```

pub mod error;
pub mod memory;
pub mod model;
pub mod types;

// Re-export all public types
pub use error::*;
pub use memory::*;
pub use model::*;
pub use types::*;
