//! Severity classification of rules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::ConfigError;

/// Name of the built-in error-class severity.
pub const ERROR: &str = "Error";
/// Name of the built-in warning-class severity.
pub const WARNING: &str = "Warning";

/// Class of a named severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityKind {
    /// Violations halt later phases and are fixed.
    Error,
    /// Violations are recorded only.
    Warning,
}

impl std::fmt::Display for SeverityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// How the scheduler treats a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Error class.
    Error,
    /// Warning class.
    Warning,
    /// Never run.
    Disabled,
}

#[derive(Debug, Clone)]
struct Assignment {
    severity: String,
    enabled: bool,
}

/// Registry-wide mapping from rule to severity, plus running counts.
///
/// Every rule has exactly one severity at a time. Counts are per severity
/// name and only change through [`record`](Self::record).
#[derive(Debug, Clone)]
pub struct SeverityPolicy {
    severities: BTreeMap<String, SeverityKind>,
    assignments: BTreeMap<String, Assignment>,
    counts: BTreeMap<String, usize>,
}

impl Default for SeverityPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl SeverityPolicy {
    /// Creates a policy knowing the `Error` and `Warning` severities.
    #[must_use]
    pub fn new() -> Self {
        let severities = BTreeMap::from([
            (ERROR.to_string(), SeverityKind::Error),
            (WARNING.to_string(), SeverityKind::Warning),
        ]);
        Self {
            severities,
            assignments: BTreeMap::new(),
            counts: BTreeMap::new(),
        }
    }

    /// Defines (or redefines) a named severity.
    pub fn define(&mut self, name: impl Into<String>, kind: SeverityKind) {
        self.severities.insert(name.into(), kind);
    }

    /// Class of a named severity.
    #[must_use]
    pub fn kind_of(&self, severity: &str) -> Option<SeverityKind> {
        self.severities.get(severity).copied()
    }

    /// Names of all known severities.
    pub fn severity_names(&self) -> impl Iterator<Item = &str> {
        self.severities.keys().map(String::as_str)
    }

    /// Assigns a severity to a rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownSeverity`] if `severity` is not defined.
    pub fn assign(&mut self, rule: &str, severity: &str) -> Result<(), ConfigError> {
        if !self.severities.contains_key(severity) {
            return Err(ConfigError::UnknownSeverity {
                rule: rule.to_string(),
                severity: severity.to_string(),
            });
        }
        self.assignments
            .entry(rule.to_string())
            .and_modify(|a| a.severity = severity.to_string())
            .or_insert_with(|| Assignment {
                severity: severity.to_string(),
                enabled: true,
            });
        Ok(())
    }

    /// Enables or disables a rule. The rule must have been assigned first.
    pub fn set_enabled(&mut self, rule: &str, enabled: bool) {
        if let Some(assignment) = self.assignments.get_mut(rule) {
            assignment.enabled = enabled;
        }
    }

    /// Severity name assigned to a rule.
    #[must_use]
    pub fn severity_of(&self, rule: &str) -> Option<&str> {
        self.assignments.get(rule).map(|a| a.severity.as_str())
    }

    /// Returns `true` if the rule is known and enabled.
    #[must_use]
    pub fn is_enabled(&self, rule: &str) -> bool {
        self.assignments.get(rule).is_some_and(|a| a.enabled)
    }

    /// Classifies a rule. Unknown rules are disabled.
    #[must_use]
    pub fn classify(&self, rule: &str) -> Classification {
        let Some(assignment) = self.assignments.get(rule) else {
            return Classification::Disabled;
        };
        if !assignment.enabled {
            return Classification::Disabled;
        }
        match self.kind_of(&assignment.severity) {
            Some(SeverityKind::Error) => Classification::Error,
            Some(SeverityKind::Warning) => Classification::Warning,
            None => Classification::Disabled,
        }
    }

    /// Adds `count` violations to the running total of a severity.
    pub fn record(&mut self, severity: &str, count: usize) {
        *self.counts.entry(severity.to_string()).or_default() += count;
    }

    /// Running totals per severity name.
    #[must_use]
    pub fn counts(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }

    /// Zeroes all running totals.
    pub fn reset_counts(&mut self) {
        self.counts.clear();
    }
}
