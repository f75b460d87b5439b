//! Core types for violations, fixes, and run results.

use miette::{Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::document::{Document, TokenSpan};
use crate::severity::SeverityKind;

/// An edit that resolves a violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FixAction {
    /// Replace the value of the first token of the span in place.
    Replace {
        /// New token text.
        value: String,
    },
    /// Resize the whitespace token at the start of the span; width 0 removes it.
    AdjustWhitespace {
        /// Target width in columns.
        width: usize,
    },
    /// Insert whitespace before the first token of the span.
    InsertWhitespace {
        /// Width of the inserted whitespace.
        width: usize,
    },
    /// Delete every token in the span.
    Remove,
}

impl FixAction {
    /// Returns `true` if applying this action shifts token indices.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        match self {
            Self::Replace { .. } => false,
            Self::AdjustWhitespace { width } => *width == 0,
            Self::InsertWhitespace { .. } | Self::Remove => true,
        }
    }
}

/// One non-conformance found by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Unique id of the rule that produced it (e.g. `entity_500`).
    pub rule: String,
    /// Line number (1-indexed).
    pub line: usize,
    /// Tokens the violation concerns.
    pub span: TokenSpan,
    /// Human-readable remedy.
    pub solution: String,
    /// Edit that resolves the violation, if the rule can fix it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<FixAction>,
}

impl Violation {
    /// Creates a violation without a fix action.
    #[must_use]
    pub fn new(
        rule: impl Into<String>,
        line: usize,
        span: TokenSpan,
        solution: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.into(),
            line,
            span,
            solution: solution.into(),
            action: None,
        }
    }

    /// Attaches a fix action.
    #[must_use]
    pub fn with_action(mut self, action: FixAction) -> Self {
        self.action = Some(action);
        self
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.rule, self.line, self.solution)
    }
}

/// Converts a violation to a miette diagnostic for rich terminal display.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{rule}: {solution}")]
pub struct ViolationDiagnostic {
    rule: String,
    solution: String,
    #[help]
    help: Option<String>,
    #[label("line {line}")]
    span: SourceSpan,
    line: usize,
    #[diagnostic(severity)]
    level: miette::Severity,
}

impl ViolationDiagnostic {
    /// Builds a diagnostic for `violation`, locating it in `doc`.
    #[must_use]
    pub fn new(violation: &Violation, severity: SeverityKind, doc: &Document) -> Self {
        let offset = doc.byte_offset_of(violation.span.start);
        let length = doc.tokens()[violation.span.range()]
            .iter()
            .map(|t| t.rendered().len())
            .sum::<usize>();
        Self {
            rule: violation.rule.clone(),
            solution: violation.solution.clone(),
            help: violation
                .action
                .as_ref()
                .map(|_| "fixable with --fix".to_string()),
            span: SourceSpan::from((offset, length)),
            line: violation.line,
            level: match severity {
                SeverityKind::Error => miette::Severity::Error,
                SeverityKind::Warning => miette::Severity::Warning,
            },
        }
    }
}

/// Violations of one rule after an analysis pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleReport {
    /// Unique id of the rule.
    pub rule: String,
    /// Phase the rule runs in.
    pub phase: u8,
    /// Name of the severity assigned to the rule.
    pub severity: String,
    /// Class of that severity.
    pub kind: SeverityKind,
    /// Violations found, in the order the rule reported them.
    pub violations: Vec<Violation>,
}

/// Result of one analysis pass over a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResult {
    /// Last phase that was analyzed.
    pub last_phase: u8,
    /// Number of rules that ran.
    pub rules_ran: usize,
    /// Reports for every rule with at least one violation, in rule order.
    pub reports: Vec<RuleReport>,
    /// Whether analysis stopped before phase 7 because of errors.
    pub halted_early: bool,
    /// Whether any error-class violation was found.
    pub has_errors: bool,
    /// Violations found per severity name.
    pub severity_counts: BTreeMap<String, usize>,
}

impl RunResult {
    /// All violations with their rule report, ordered by line.
    ///
    /// Violations on the same line keep rule order.
    #[must_use]
    pub fn violations_by_line(&self) -> Vec<(&RuleReport, &Violation)> {
        let mut all: Vec<(&RuleReport, &Violation)> = self
            .reports
            .iter()
            .flat_map(|r| r.violations.iter().map(move |v| (r, v)))
            .collect();
        all.sort_by_key(|(_, v)| v.line);
        all
    }

    /// Total number of violations.
    #[must_use]
    pub fn total_violations(&self) -> usize {
        self.reports.iter().map(|r| r.violations.len()).sum()
    }

    /// Number of error-class violations.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.kind == SeverityKind::Error)
            .map(|r| r.violations.len())
            .sum()
    }

    /// Violations reported by one rule.
    #[must_use]
    pub fn violations_for(&self, rule: &str) -> &[Violation] {
        self.reports
            .iter()
            .find(|r| r.rule == rule)
            .map_or(&[], |r| r.violations.as_slice())
    }
}

/// Result of one fix pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixSummary {
    /// Last phase that was processed.
    pub last_phase: u8,
    /// Number of violations fixed.
    pub fixed: usize,
    /// Number of warning-class violations recorded but left in place.
    pub warnings: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(rule: &str, kind: SeverityKind, lines: &[usize]) -> RuleReport {
        RuleReport {
            rule: rule.to_string(),
            phase: 1,
            severity: kind.to_string(),
            kind,
            violations: lines
                .iter()
                .map(|&l| Violation::new(rule, l, TokenSpan::single(0), "fix it"))
                .collect(),
        }
    }

    #[test]
    fn violations_by_line_interleaves_rules() {
        let result = RunResult {
            reports: vec![
                report("a_001", SeverityKind::Error, &[3, 1]),
                report("b_001", SeverityKind::Warning, &[2, 3]),
            ],
            ..RunResult::default()
        };
        let order: Vec<(&str, usize)> = result
            .violations_by_line()
            .iter()
            .map(|(r, v)| (r.rule.as_str(), v.line))
            .collect();
        assert_eq!(
            order,
            vec![("a_001", 1), ("b_001", 2), ("a_001", 3), ("b_001", 3)]
        );
    }

    #[test]
    fn counts() {
        let result = RunResult {
            reports: vec![
                report("a_001", SeverityKind::Error, &[1, 2]),
                report("b_001", SeverityKind::Warning, &[2]),
            ],
            ..RunResult::default()
        };
        assert_eq!(result.total_violations(), 3);
        assert_eq!(result.error_count(), 2);
        assert_eq!(result.violations_for("b_001").len(), 1);
        assert!(result.violations_for("c_001").is_empty());
    }

    #[test]
    fn structural_actions() {
        assert!(!FixAction::Replace { value: "X".into() }.is_structural());
        assert!(!FixAction::AdjustWhitespace { width: 2 }.is_structural());
        assert!(FixAction::AdjustWhitespace { width: 0 }.is_structural());
        assert!(FixAction::InsertWhitespace { width: 1 }.is_structural());
        assert!(FixAction::Remove.is_structural());
    }

    #[test]
    fn violation_display() {
        let v = Violation::new("entity_500", 4, TokenSpan::single(0), "Change to lower");
        assert_eq!(v.to_string(), "entity_500:4: Change to lower");
    }
}
