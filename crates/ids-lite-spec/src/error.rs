// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for compliance-document parsing
//!
//! Parse failures are terminal for the document: no partial model is
//! returned, and no audit can start from a failed parse.

use thiserror::Error;

/// Result type alias for parser operations
pub type Result<T> = std::result::Result<T, SpecError>;

/// Errors that can occur while parsing a compliance document
#[derive(Error, Debug)]
pub enum SpecError {
    /// The source is not well-formed XML
    #[error("Invalid document markup: {0}")]
    Format(#[from] roxmltree::Error),

    /// A mandatory section is missing
    #[error("Missing mandatory section: {0}")]
    MissingSection(&'static str),

    /// A pattern restriction does not compile
    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },
}
