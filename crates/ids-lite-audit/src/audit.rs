// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Audit orchestration
//!
//! One [`Auditor`] owns the model handle; each `run` works on fresh
//! run-scoped caches and walks the document in order: resolve applicability,
//! then check every requirement against every governed entity, then
//! aggregate the summary. Progress reporting is advisory only - it never
//! affects ordering or results.

use crate::checker::check;
use crate::reader::GraphReader;
use crate::resolver::resolve_applicability;
use crate::result::{AuditResult, AuditSummary};
use ids_lite_model::{EntityId, ModelAccess, AUDITABLE};
use ids_lite_spec::IdsDocument;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Progress callback type receiving (specification_name, fraction_complete)
pub type ProgressCallback = Box<dyn Fn(&str, f32) + Send>;

/// Drives audit runs against one model
///
/// Runs take `&mut self`: the memoization caches inside a run are exclusively
/// owned by the in-flight run, so no two runs may interleave on the same
/// auditor. The caches are constructed fresh per run and discarded with it.
pub struct Auditor {
    model: Arc<dyn ModelAccess>,
}

impl Auditor {
    /// Create an auditor over a frozen model snapshot
    pub fn new(model: Arc<dyn ModelAccess>) -> Self {
        Self { model }
    }

    /// Audit the model against a parsed compliance document
    pub fn run(&mut self, document: &IdsDocument) -> AuditSummary {
        self.run_inner(document, None)
    }

    /// Audit with progress reporting
    pub fn run_with_progress(
        &mut self,
        document: &IdsDocument,
        on_progress: ProgressCallback,
    ) -> AuditSummary {
        self.run_inner(document, Some(&on_progress))
    }

    fn run_inner(
        &mut self,
        document: &IdsDocument,
        on_progress: Option<&ProgressCallback>,
    ) -> AuditSummary {
        let mut reader = GraphReader::new(Arc::clone(&self.model));
        let mut results: Vec<AuditResult> = Vec::new();
        let mut tested: BTreeSet<EntityId> = BTreeSet::new();
        let total = document.specifications.len();

        for (index, specification) in document.specifications.iter().enumerate() {
            if let Some(callback) = on_progress {
                callback(&specification.name, (index + 1) as f32 / total as f32);
            }

            let applicable = resolve_applicability(&mut reader, &specification.applicability);
            debug!(
                specification = %specification.name,
                matched = applicable.len(),
                "applicability resolved"
            );
            tested.extend(applicable.iter().copied());

            for id in &applicable {
                let record = match reader.record_or_err(*id) {
                    Ok(record) => record,
                    Err(error) => {
                        warn!(entity = %id, %error, "matched entity could not be read");
                        continue;
                    }
                };
                for requirement in &specification.requirements {
                    results.push(check(&mut reader, &record, &specification.name, requirement));
                }
            }
        }

        // All entities of every auditable class, independent of matching
        let total_elements = AUDITABLE
            .iter()
            .map(|class| reader.ids_of_class(class).map(|ids| ids.len()).unwrap_or(0))
            .sum();
        let total_requirements = document
            .specifications
            .iter()
            .map(|s| s.requirements.len())
            .sum();

        AuditSummary::aggregate(total_elements, tested.len(), total_requirements, results)
    }
}
