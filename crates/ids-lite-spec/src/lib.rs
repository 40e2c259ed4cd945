// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IDS-Lite Spec - Compliance-specification document model and parser
//!
//! A compliance document enumerates *specifications*. Each specification has
//! an applicability filter (which entities it governs) and a list of
//! requirements (conditions those entities must satisfy). Both sides are
//! built from the same six facet shapes; facet fields constrain values
//! through a small matching grammar (exact literal, enumeration, regex
//! pattern, length and numeric bounds).
//!
//! # Example
//!
//! ```ignore
//! use ids_lite_spec::parse;
//!
//! let document = parse(&xml_source)?;
//! for spec in &document.specifications {
//!     println!("{}: {} requirement(s)", spec.name, spec.requirements.len());
//! }
//! ```

pub mod document;
pub mod error;
pub mod parser;
pub mod value;

pub use document::*;
pub use error::*;
pub use parser::parse;
pub use value::*;
