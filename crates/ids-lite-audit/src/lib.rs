// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IDS-Lite Audit - Compliance audit engine
//!
//! Drives a one-shot, full-document audit of a frozen entity graph against a
//! parsed compliance document: applicability resolution (which entities each
//! specification governs), requirement checking (per entity, per
//! requirement), and summary aggregation with a compliance score.
//!
//! Per-entity and per-facet failures degrade locally - to a skipped
//! contribution during applicability resolution, or to a `Warning` result
//! during checking. No error escapes a run.
//!
//! # Example
//!
//! ```ignore
//! use ids_lite_audit::Auditor;
//!
//! let document = ids_lite_spec::parse(&xml)?;
//! let mut auditor = Auditor::new(model);
//! let summary = auditor.run(&document);
//! println!("score: {} ({} pass / {} fail)", summary.score, summary.pass, summary.fail);
//! ```

pub mod audit;
pub mod result;

mod checker;
mod reader;
mod resolver;

pub use audit::*;
pub use result::*;
