//! Rule trait for defining style rules.

use std::collections::BTreeMap;

use crate::config::{FixFilter, OptionError};
use crate::document::Document;
use crate::severity::ERROR;
use crate::types::Violation;

/// A style rule over a [`Document`].
///
/// A rule is identified by its `name` (the rule family, e.g. `entity`) and
/// its `identifier` (e.g. `500`); together they form the unique id
/// `entity_500`. The scheduler owns the violation list of every rule and
/// passes it in on each invocation.
///
/// # Example
///
/// ```ignore
/// use vsg_core::{Document, Rule, TokenSpan, Violation};
///
/// pub struct NoTrailingSemicolonSpace;
///
/// impl Rule for NoTrailingSemicolonSpace {
///     fn name(&self) -> &str { "semicolon" }
///     fn identifier(&self) -> &str { "001" }
///     fn phase(&self) -> u8 { 2 }
///
///     fn analyze(&self, doc: &Document, violations: &mut Vec<Violation>) {
///         // push a Violation for every offending token
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Rule family (e.g. "entity").
    fn name(&self) -> &str;

    /// Identifier within the family (e.g. "500").
    fn identifier(&self) -> &str;

    /// Unique id, `name_identifier`.
    fn unique_id(&self) -> String {
        format!("{}_{}", self.name(), self.identifier())
    }

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &str {
        ""
    }

    /// Ordering bucket, 1 to 7.
    fn phase(&self) -> u8;

    /// Ordering bucket within the phase, 1 to 4.
    fn subphase(&self) -> u8 {
        1
    }

    /// Severity name assigned before any configuration.
    fn default_severity(&self) -> &str {
        ERROR
    }

    /// Whether the rule runs without being enabled in configuration.
    fn enabled_by_default(&self) -> bool {
        true
    }

    /// Whether [`fix`](Self::fix) can resolve violations.
    fn fixable(&self) -> bool {
        true
    }

    /// Appends the violations found in `doc`.
    ///
    /// Must not report the same violation twice for an unchanged document;
    /// callers clear `violations` before analyzing again.
    fn analyze(&self, doc: &Document, violations: &mut Vec<Violation>);

    /// Applies the fix of one violation. Returns `true` if the document changed.
    fn fix_violation(&self, doc: &mut Document, violation: &Violation) -> bool {
        match &violation.action {
            Some(action) => {
                doc.apply(violation.span, action);
                true
            }
            None => false,
        }
    }

    /// Re-analyzes `doc` and fixes the current violations.
    ///
    /// Violations rejected by `filter` are left in place. The rest are applied
    /// in descending span order, so that an insertion or deletion never shifts
    /// a span that is still to be applied. The line index is rebuilt
    /// afterwards and `violations` is left empty.
    ///
    /// Returns the number of violations fixed.
    fn fix(
        &self,
        doc: &mut Document,
        filter: Option<&FixFilter>,
        violations: &mut Vec<Violation>,
    ) -> usize {
        violations.clear();
        if !self.fixable() {
            return 0;
        }
        self.analyze(doc, violations);

        let mut pending: Vec<Violation> = violations
            .drain(..)
            .filter(|v| filter.map_or(true, |f| f.allows(&v.rule, v.line)))
            .collect();
        pending.sort_by(|a, b| b.span.cmp(&a.span));

        let mut fixed = 0;
        for violation in &pending {
            if self.fix_violation(doc, violation) {
                fixed += 1;
            }
        }
        if doc.is_stale() {
            doc.reindex();
        }
        fixed
    }

    /// Sets one option.
    ///
    /// # Errors
    ///
    /// Returns [`OptionError::Unknown`] for keys the rule does not have, and
    /// another variant if the value is rejected.
    fn configure_option(&mut self, key: &str, _value: &toml::Value) -> Result<(), OptionError> {
        Err(OptionError::Unknown {
            key: key.to_string(),
        })
    }

    /// Current option values, for reporting and export.
    fn options(&self) -> BTreeMap<String, toml::Value> {
        BTreeMap::new()
    }
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;
