// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Audit verdicts and summary aggregation

use ids_lite_model::EntityId;
use serde::Serialize;

/// Verdict of one requirement check
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    /// The requirement holds
    Pass,
    /// The requirement is violated
    Fail,
    /// The requirement could not be conclusively judged
    Warning,
    /// The requirement kind has no per-entity meaning
    NotApplicable,
}

/// One verdict: (matched entity x requirement)
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    pub status: CheckStatus,
    pub entity_id: EntityId,
    pub entity_name: String,
    pub entity_type: String,
    pub specification_name: String,
    pub requirement_description: String,
    /// Human-readable justification
    pub message: String,
    /// Expected-value description, when a value constraint was involved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Aggregate outcome of one audit run
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    /// Entities of every auditable class, independent of matching
    pub total_elements: usize,
    /// Entities that matched at least one specification's applicability
    pub tested_elements: usize,
    /// Requirements declared across all specifications
    pub total_requirements: usize,
    pub pass: usize,
    pub fail: usize,
    pub warning: usize,
    pub not_applicable: usize,
    /// Percentage of contested requirements that passed; warnings and
    /// not-applicable results are excluded from the denominator
    pub score: u32,
    pub results: Vec<AuditResult>,
}

impl AuditSummary {
    /// Compute counts and score from collected results
    pub(crate) fn aggregate(
        total_elements: usize,
        tested_elements: usize,
        total_requirements: usize,
        results: Vec<AuditResult>,
    ) -> Self {
        let count = |status: CheckStatus| results.iter().filter(|r| r.status == status).count();
        let pass = count(CheckStatus::Pass);
        let fail = count(CheckStatus::Fail);
        let warning = count(CheckStatus::Warning);
        let not_applicable = count(CheckStatus::NotApplicable);

        // No contested requirements means vacuously compliant
        let contested = pass + fail;
        let score = if contested == 0 {
            100
        } else {
            ((pass as f64 / contested as f64) * 100.0).round() as u32
        };

        Self {
            total_elements,
            tested_elements,
            total_requirements,
            pass,
            fail,
            warning,
            not_applicable,
            score,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: CheckStatus) -> AuditResult {
        AuditResult {
            status,
            entity_id: EntityId(1),
            entity_name: "W1".into(),
            entity_type: "IFCWALL".into(),
            specification_name: "spec".into(),
            requirement_description: "req".into(),
            message: String::new(),
            details: None,
        }
    }

    #[test]
    fn test_score_is_vacuously_compliant_without_contested_results() {
        let summary = AuditSummary::aggregate(0, 0, 0, vec![]);
        assert_eq!(summary.score, 100);

        let summary = AuditSummary::aggregate(
            5,
            1,
            1,
            vec![result(CheckStatus::Warning), result(CheckStatus::NotApplicable)],
        );
        assert_eq!(summary.score, 100);
        assert_eq!(summary.warning, 1);
        assert_eq!(summary.not_applicable, 1);
    }

    #[test]
    fn test_score_excludes_warnings_from_denominator() {
        let summary = AuditSummary::aggregate(
            4,
            2,
            2,
            vec![
                result(CheckStatus::Pass),
                result(CheckStatus::Fail),
                result(CheckStatus::Warning),
            ],
        );
        assert_eq!(summary.score, 50);
    }

    #[test]
    fn test_score_rounding_and_bounds() {
        let summary = AuditSummary::aggregate(
            3,
            3,
            1,
            vec![
                result(CheckStatus::Pass),
                result(CheckStatus::Pass),
                result(CheckStatus::Fail),
            ],
        );
        assert_eq!(summary.score, 67);
        assert!(summary.score <= 100);
    }
}
