// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value-matching grammar
//!
//! A facet field either pins a value exactly ([`ValueConstraint::Literal`])
//! or restricts it through any subset of pattern / enumeration / length
//! bounds / numeric bounds ([`Restriction`]). An absent constraint means
//! "don't care"; a present constraint always requires a present value.
//!
//! When a restriction declares both an enumeration and a pattern, the
//! enumeration wins and the pattern is not consulted. The source format
//! permits both without stating an order; this crate treats
//! enumeration-over-pattern as settled behavior.

use regex::Regex;
use std::fmt;

/// Declared constraint on one facet field
#[derive(Clone, Debug)]
pub enum ValueConstraint {
    /// Exact case-insensitive string equality
    Literal(String),
    /// Any subset of pattern / enumeration / length / numeric bounds
    Restriction(Restriction),
}

/// The restriction form of a value constraint
///
/// A restriction with no clauses matches any present value (presence-only
/// check).
#[derive(Clone, Debug, Default)]
pub struct Restriction {
    /// Regex pattern, anchored to match the whole value
    pattern: Option<Regex>,
    /// Enumerated member values (case-insensitive membership)
    pub enumeration: Option<Vec<String>>,
    /// Minimum string length, in characters
    pub min_length: Option<usize>,
    /// Maximum string length, in characters
    pub max_length: Option<usize>,
    /// Inclusive numeric lower bound
    pub min_inclusive: Option<f64>,
    /// Inclusive numeric upper bound
    pub max_inclusive: Option<f64>,
}

impl Restriction {
    /// Compile and set the pattern clause.
    ///
    /// Patterns follow the source format's whole-value semantics, so the
    /// expression is anchored before compiling.
    pub fn set_pattern(&mut self, pattern: &str) -> Result<(), regex::Error> {
        self.pattern = Some(Regex::new(&format!("^(?:{pattern})$"))?);
        Ok(())
    }

    /// The raw pattern text, without the added anchors
    pub fn pattern_str(&self) -> Option<&str> {
        self.pattern.as_ref().map(|re| {
            let s = re.as_str();
            &s[4..s.len() - 2]
        })
    }

    /// True when no clause is set
    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
            && self.enumeration.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.min_inclusive.is_none()
            && self.max_inclusive.is_none()
    }

    fn matches(&self, actual: &str) -> bool {
        // Enumeration takes precedence over pattern; when either is present,
        // length and numeric bounds do not apply.
        if let Some(members) = &self.enumeration {
            return members.iter().any(|m| eq_ignore_case(m, actual));
        }
        if let Some(pattern) = &self.pattern {
            return pattern.is_match(actual);
        }

        let length = actual.chars().count();
        if let Some(min) = self.min_length {
            if length < min {
                return false;
            }
        }
        if let Some(max) = self.max_length {
            if length > max {
                return false;
            }
        }

        // Numeric bounds only bind when the actual value is a number;
        // a non-numeric value leaves them satisfied.
        if let Ok(number) = actual.trim().parse::<f64>() {
            if let Some(min) = self.min_inclusive {
                if number < min {
                    return false;
                }
            }
            if let Some(max) = self.max_inclusive {
                if number > max {
                    return false;
                }
            }
        }

        true
    }
}

impl PartialEq for Restriction {
    fn eq(&self, other: &Self) -> bool {
        self.pattern.as_ref().map(Regex::as_str) == other.pattern.as_ref().map(Regex::as_str)
            && self.enumeration == other.enumeration
            && self.min_length == other.min_length
            && self.max_length == other.max_length
            && self.min_inclusive == other.min_inclusive
            && self.max_inclusive == other.max_inclusive
    }
}

impl PartialEq for ValueConstraint {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ValueConstraint::Literal(a), ValueConstraint::Literal(b)) => a == b,
            (ValueConstraint::Restriction(a), ValueConstraint::Restriction(b)) => a == b,
            _ => false,
        }
    }
}

impl ValueConstraint {
    /// Does a present value satisfy this constraint?
    ///
    /// An absent value never matches once a constraint object exists -
    /// presence is required even against an empty restriction.
    pub fn matches(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        match self {
            ValueConstraint::Literal(expected) => eq_ignore_case(expected, actual),
            ValueConstraint::Restriction(restriction) => restriction.matches(actual),
        }
    }
}

impl fmt::Display for ValueConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueConstraint::Literal(v) => write!(f, "'{v}'"),
            ValueConstraint::Restriction(r) => {
                let mut clauses: Vec<String> = Vec::new();
                if let Some(members) = &r.enumeration {
                    clauses.push(format!(
                        "one of {}",
                        members
                            .iter()
                            .map(|m| format!("'{m}'"))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ));
                }
                if let Some(pattern) = r.pattern_str() {
                    clauses.push(format!("matching pattern '{pattern}'"));
                }
                match (r.min_length, r.max_length) {
                    (Some(min), Some(max)) => clauses.push(format!("length {min}..{max}")),
                    (Some(min), None) => clauses.push(format!("length >= {min}")),
                    (None, Some(max)) => clauses.push(format!("length <= {max}")),
                    (None, None) => {}
                }
                match (r.min_inclusive, r.max_inclusive) {
                    (Some(min), Some(max)) => clauses.push(format!("in range {min}..{max}")),
                    (Some(min), None) => clauses.push(format!(">= {min}")),
                    (None, Some(max)) => clauses.push(format!("<= {max}")),
                    (None, None) => {}
                }
                if clauses.is_empty() {
                    write!(f, "any value")
                } else {
                    write!(f, "{}", clauses.join(" and "))
                }
            }
        }
    }
}

/// Does a value satisfy an optional constraint?
///
/// A wholly absent constraint means "don't care" and matches anything,
/// including an absent value. A present constraint requires a present,
/// matching value.
pub fn matches_opt(actual: Option<&str>, constraint: Option<&ValueConstraint>) -> bool {
    match constraint {
        None => true,
        Some(constraint) => constraint.matches(actual),
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restriction(configure: impl FnOnce(&mut Restriction)) -> ValueConstraint {
        let mut r = Restriction::default();
        configure(&mut r);
        ValueConstraint::Restriction(r)
    }

    #[test]
    fn test_absent_value_never_matches() {
        assert!(!ValueConstraint::Literal("x".into()).matches(None));
        assert!(!restriction(|_| {}).matches(None));
    }

    #[test]
    fn test_absent_constraint_is_dont_care() {
        assert!(matches_opt(Some("anything"), None));
        assert!(matches_opt(None, None));
        assert!(!matches_opt(None, Some(&ValueConstraint::Literal("x".into()))));
    }

    #[test]
    fn test_literal_is_case_insensitive() {
        let c = ValueConstraint::Literal("LoadBearing".into());
        assert!(c.matches(Some("loadbearing")));
        assert!(c.matches(Some("LOADBEARING")));
        assert!(!c.matches(Some("loadbearing2")));
    }

    #[test]
    fn test_empty_restriction_is_presence_only() {
        let c = restriction(|_| {});
        assert!(c.matches(Some("")));
        assert!(c.matches(Some("anything")));
    }

    #[test]
    fn test_enumeration_membership() {
        let c = restriction(|r| r.enumeration = Some(vec!["A1".into(), "B2".into()]));
        assert!(c.matches(Some("a1")));
        assert!(c.matches(Some("B2")));
        assert!(!c.matches(Some("C3")));
    }

    #[test]
    fn test_pattern_is_anchored() {
        let c = restriction(|r| r.set_pattern("Pset_.*Common").unwrap());
        assert!(c.matches(Some("Pset_WallCommon")));
        assert!(!c.matches(Some("XPset_WallCommonX")));
    }

    #[test]
    fn test_enumeration_precedes_pattern() {
        // Pattern would reject "B2", enumeration accepts it; enumeration wins.
        let c = restriction(|r| {
            r.enumeration = Some(vec!["B2".into()]);
            r.set_pattern("A.*").unwrap();
        });
        assert!(c.matches(Some("B2")));
        assert!(!c.matches(Some("A9")));
    }

    #[test]
    fn test_length_bounds() {
        let c = restriction(|r| {
            r.min_length = Some(2);
            r.max_length = Some(4);
        });
        assert!(!c.matches(Some("x")));
        assert!(c.matches(Some("xyz")));
        assert!(!c.matches(Some("xyzzy")));
    }

    #[test]
    fn test_numeric_bounds_skip_non_numbers() {
        let c = restriction(|r| {
            r.min_inclusive = Some(10.0);
            r.max_inclusive = Some(20.0);
        });
        assert!(c.matches(Some("15")));
        assert!(c.matches(Some("10")));
        assert!(!c.matches(Some("9.99")));
        assert!(!c.matches(Some("20.5")));
        // Bounds on a non-numeric value are satisfied, not failed
        assert!(c.matches(Some("not-a-number")));
    }

    #[test]
    fn test_describe_forms() {
        assert_eq!(ValueConstraint::Literal("X".into()).to_string(), "'X'");
        let c = restriction(|r| r.enumeration = Some(vec!["A".into(), "B".into()]));
        assert_eq!(c.to_string(), "one of 'A', 'B'");
        let c = restriction(|r| r.set_pattern("A.*").unwrap());
        assert_eq!(c.to_string(), "matching pattern 'A.*'");
        assert_eq!(restriction(|_| {}).to_string(), "any value");
    }
}
