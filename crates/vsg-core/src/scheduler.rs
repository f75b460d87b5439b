//! Phased rule scheduler.
//!
//! Rules run in buckets ordered by phase (1 to 7) and then subphase (1 to 4).
//! Inside a bucket they run in registration order. Disabled rules never run.
//!
//! An analysis pass stops after the first phase that produced error-class
//! violations unless [`AnalyzeOptions::all_phases`] is set. A fix pass fixes
//! error-class rules and only analyzes warning-class rules.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::{debug, info, warn};

use crate::config::{Config, ConfigError, FixFilter, OptionError, RuleConfig};
use crate::document::Document;
use crate::rule::{Rule, RuleBox};
use crate::severity::{Classification, SeverityKind, SeverityPolicy};
use crate::types::{FixSummary, RuleReport, RunResult, Violation};

/// Highest phase number.
pub const MAX_PHASE: u8 = 7;
/// Highest subphase number.
pub const MAX_SUBPHASE: u8 = 4;

/// Options for [`Scheduler::analyze`].
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Phases that are not analyzed.
    pub skip_phases: BTreeSet<u8>,
    /// Keep going after a phase with error-class violations.
    pub all_phases: bool,
}

impl AnalyzeOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Skips a phase.
    #[must_use]
    pub fn skip_phase(mut self, phase: u8) -> Self {
        self.skip_phases.insert(phase);
        self
    }

    /// Sets whether all phases run regardless of errors.
    #[must_use]
    pub fn all_phases(mut self, all: bool) -> Self {
        self.all_phases = all;
        self
    }
}

/// Options for [`Scheduler::fix`].
#[derive(Debug, Clone)]
pub struct FixOptions {
    /// Last phase to fix.
    pub up_to_phase: u8,
    /// Phases that are not fixed.
    pub skip_phases: BTreeSet<u8>,
    /// Restricts which violations may be fixed.
    pub filter: Option<FixFilter>,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            up_to_phase: MAX_PHASE,
            skip_phases: BTreeSet::new(),
            filter: None,
        }
    }
}

impl FixOptions {
    /// Creates default options (all phases, no filter).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the last phase to fix.
    #[must_use]
    pub fn up_to_phase(mut self, phase: u8) -> Self {
        self.up_to_phase = phase;
        self
    }

    /// Skips a phase.
    #[must_use]
    pub fn skip_phase(mut self, phase: u8) -> Self {
        self.skip_phases.insert(phase);
        self
    }

    /// Sets the fix filter.
    #[must_use]
    pub fn filter(mut self, filter: Option<FixFilter>) -> Self {
        self.filter = filter;
        self
    }
}

/// Builder for configuring a [`Scheduler`].
#[derive(Default)]
pub struct SchedulerBuilder {
    rules: Vec<RuleBox>,
    config: Option<Config>,
}

impl SchedulerBuilder {
    /// Creates a new builder with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several boxed rules.
    #[must_use]
    pub fn rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = RuleBox>,
    {
        self.rules.extend(rules);
        self
    }

    /// Sets the configuration applied at build time.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the scheduler.
    ///
    /// # Errors
    ///
    /// Returns an error if two rules share an id, a rule's default severity
    /// is undefined, or the configuration is invalid.
    pub fn build(self) -> Result<Scheduler, ConfigError> {
        let mut seen = HashSet::new();
        let mut policy = SeverityPolicy::new();
        if let Some(config) = &self.config {
            for (name, definition) in &config.severity {
                policy.define(name.clone(), definition.kind);
            }
        }
        for rule in &self.rules {
            let id = rule.unique_id();
            if !seen.insert(id.clone()) {
                return Err(ConfigError::DuplicateRule { rule: id });
            }
            policy.assign(&id, rule.default_severity())?;
            policy.set_enabled(&id, rule.enabled_by_default());
        }

        let violations = self.rules.iter().map(|_| Vec::new()).collect();
        let mut scheduler = Scheduler {
            rules: self.rules,
            policy,
            violations,
        };
        if let Some(config) = &self.config {
            scheduler.configure(config)?;
        }
        Ok(scheduler)
    }
}

/// Drives rules over documents in phase order.
///
/// Use [`Scheduler::builder()`] to construct an instance. The scheduler owns
/// the violation list of every rule; each pass starts by clearing them, so
/// one scheduler can be reused across files.
pub struct Scheduler {
    rules: Vec<RuleBox>,
    policy: SeverityPolicy,
    violations: Vec<Vec<Violation>>,
}

impl Scheduler {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> SchedulerBuilder {
        SchedulerBuilder::new()
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Highest phase of any registered rule, or 0 without rules.
    #[must_use]
    pub fn maximum_phase(&self) -> u8 {
        self.rules.iter().map(|r| r.phase()).max().unwrap_or(0)
    }

    /// Registered rules in registration order.
    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// The severity policy.
    #[must_use]
    pub fn policy(&self) -> &SeverityPolicy {
        &self.policy
    }

    /// Violations currently held for a rule.
    #[must_use]
    pub fn violations(&self, rule: &str) -> &[Violation] {
        self.index_of(rule)
            .map_or(&[], |i| self.violations[i].as_slice())
    }

    /// Drops all held violations.
    pub fn clear_violations(&mut self) {
        for list in &mut self.violations {
            list.clear();
        }
    }

    fn index_of(&self, rule: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.unique_id() == rule)
    }

    // ── Configuration ──

    /// Applies a configuration.
    ///
    /// Rule ids and severity names are validated before anything changes.
    /// The `global` table is applied to all rules first, then each rule's
    /// own table. Option keys a rule does not know are ignored. If a rule
    /// rejects an option value, the policy and every rule's options are
    /// restored to their state before the call.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownRule`] for unregistered ids,
    /// [`ConfigError::UnknownSeverity`] for undefined severity names and
    /// [`ConfigError::InvalidOption`] for rejected option values.
    pub fn configure(&mut self, config: &Config) -> Result<(), ConfigError> {
        let mut targets = Vec::new();
        for (id, rule_config) in config.rule_tables() {
            let index = self.index_of(id).ok_or_else(|| ConfigError::UnknownRule {
                rule: id.to_string(),
            })?;
            targets.push((index, rule_config));
        }
        for (id, rule_config) in &config.rule {
            let Some(severity) = &rule_config.severity else {
                continue;
            };
            if self.policy.kind_of(severity).is_none() && !config.severity.contains_key(severity)
            {
                return Err(ConfigError::UnknownSeverity {
                    rule: id.clone(),
                    severity: severity.clone(),
                });
            }
        }

        let saved_policy = self.policy.clone();
        let saved_options: Vec<_> = self.rules.iter().map(|r| r.options()).collect();
        if let Err(e) = self.apply_config(config, &targets) {
            self.policy = saved_policy;
            for (rule, options) in self.rules.iter_mut().zip(saved_options) {
                for (key, value) in &options {
                    if rule.configure_option(key, value).is_err() {
                        warn!("Could not restore option `{key}` of rule {}", rule.unique_id());
                    }
                }
            }
            return Err(e);
        }
        Ok(())
    }

    fn apply_config(
        &mut self,
        config: &Config,
        targets: &[(usize, &RuleConfig)],
    ) -> Result<(), ConfigError> {
        for (name, definition) in &config.severity {
            self.policy.define(name.clone(), definition.kind);
        }
        if let Some(global) = config.global() {
            for index in 0..self.rules.len() {
                self.apply_rule_config(index, global, true)?;
            }
        }
        for &(index, rule_config) in targets {
            self.apply_rule_config(index, rule_config, false)?;
        }
        Ok(())
    }

    fn apply_rule_config(
        &mut self,
        index: usize,
        config: &RuleConfig,
        global: bool,
    ) -> Result<(), ConfigError> {
        let rule = &mut self.rules[index];
        let id = rule.unique_id();

        if let Some(severity) = &config.severity {
            self.policy.assign(&id, severity)?;
        }
        if let Some(enabled) = config.enabled {
            self.policy.set_enabled(&id, enabled);
        }
        for (key, value) in &config.options {
            match rule.configure_option(key, value) {
                Ok(()) => {}
                Err(OptionError::Unknown { .. }) if global => {}
                Err(OptionError::Unknown { key }) => {
                    warn!("Ignoring unknown option `{key}` for rule {id}");
                }
                Err(source) => return Err(ConfigError::InvalidOption { rule: id, source }),
            }
        }
        Ok(())
    }

    /// Effective configuration of one rule.
    #[must_use]
    pub fn rule_configuration(&self, rule: &str) -> Option<RuleConfig> {
        let index = self.index_of(rule)?;
        Some(self.rule_config_at(index))
    }

    fn rule_config_at(&self, index: usize) -> RuleConfig {
        let rule = &self.rules[index];
        let id = rule.unique_id();
        RuleConfig {
            enabled: Some(self.policy.is_enabled(&id)),
            severity: self.policy.severity_of(&id).map(str::to_string),
            options: rule.options(),
        }
    }

    /// Effective configuration of every rule, suitable for [`configure`](Self::configure).
    #[must_use]
    pub fn configuration(&self) -> Config {
        let rule = (0..self.rules.len())
            .map(|i| (self.rules[i].unique_id(), self.rule_config_at(i)))
            .collect();
        Config {
            rule,
            ..Config::default()
        }
    }

    // ── Passes ──

    /// Indices of enabled rules in one bucket, in registration order.
    fn bucket(&self, phase: u8, subphase: u8) -> Vec<usize> {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, r)| r.phase() == phase && r.subphase() == subphase)
            .filter(|(_, r)| {
                let id = r.unique_id();
                let enabled = self.policy.is_enabled(&id);
                if !enabled {
                    debug!("Skipping disabled rule: {id}");
                }
                enabled
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Analyzes a document.
    ///
    /// Held violations and severity counts are reset first. Phases run in
    /// order; after all subphases of a phase, the pass halts if any
    /// error-class violation was found so far and
    /// [`AnalyzeOptions::all_phases`] is not set.
    pub fn analyze(&mut self, doc: &Document, options: &AnalyzeOptions) -> RunResult {
        info!("Analyzing {} lines with {} rules", doc.line_count(), self.rules.len());
        self.clear_violations();
        self.policy.reset_counts();

        let mut failures = 0;
        let mut rules_ran = 0;
        let mut last_phase = MAX_PHASE;
        let mut halted_early = false;
        let mut order = Vec::new();

        for phase in 1..=MAX_PHASE {
            if options.skip_phases.contains(&phase) {
                debug!("Skipping phase {phase}");
                continue;
            }
            for subphase in 1..=MAX_SUBPHASE {
                for index in self.bucket(phase, subphase) {
                    let id = self.rules[index].unique_id();
                    debug!("Analyzing {id} (phase {phase}.{subphase})");
                    self.rules[index].analyze(doc, &mut self.violations[index]);
                    rules_ran += 1;
                    order.push(index);

                    let found = self.violations[index].len();
                    if found == 0 {
                        continue;
                    }
                    if let Some(severity) = self.policy.severity_of(&id).map(str::to_string) {
                        self.policy.record(&severity, found);
                    }
                    if self.policy.classify(&id) == Classification::Error {
                        failures += found;
                    }
                }
            }
            if failures > 0 && !options.all_phases {
                info!("Stopping after phase {phase}: {failures} error(s)");
                last_phase = phase;
                halted_early = phase < MAX_PHASE;
                break;
            }
        }

        let reports = order
            .into_iter()
            .filter(|&i| !self.violations[i].is_empty())
            .map(|i| self.report(i))
            .collect();

        info!("Analysis finished at phase {last_phase}, {rules_ran} rules ran");
        RunResult {
            last_phase,
            rules_ran,
            reports,
            halted_early,
            has_errors: failures > 0,
            severity_counts: self.policy.counts().clone(),
        }
    }

    fn report(&self, index: usize) -> RuleReport {
        let rule = &self.rules[index];
        let id = rule.unique_id();
        let severity = self.policy.severity_of(&id).unwrap_or_default().to_string();
        let kind = self
            .policy
            .kind_of(&severity)
            .unwrap_or(SeverityKind::Warning);
        RuleReport {
            rule: id,
            phase: rule.phase(),
            severity,
            kind,
            violations: self.violations[index].clone(),
        }
    }

    /// Fixes a document in place.
    ///
    /// Phases `1..=up_to_phase` run in order. Error-class rules fix their
    /// violations; warning-class rules are analyzed only and keep their
    /// violations. If phase 1 is skipped the indent model is re-established
    /// instead. Blank-line markers are normalized once phase 1 is done.
    pub fn fix(&mut self, doc: &mut Document, options: &FixOptions) -> FixSummary {
        info!("Fixing up to phase {}", options.up_to_phase);
        self.clear_violations();

        let mut summary = FixSummary::default();
        let filter = options.filter.as_ref();

        for phase in 1..=options.up_to_phase.min(MAX_PHASE) {
            summary.last_phase = phase;
            if options.skip_phases.contains(&phase) {
                debug!("Skipping phase {phase}");
                if phase == 1 {
                    doc.set_token_indent();
                    doc.fix_blank_lines();
                }
                continue;
            }
            for subphase in 1..=MAX_SUBPHASE {
                for index in self.bucket(phase, subphase) {
                    let rule = &self.rules[index];
                    let id = rule.unique_id();
                    let list = &mut self.violations[index];
                    match self.policy.classify(&id) {
                        Classification::Error => {
                            let fixed = rule.fix(doc, filter, list);
                            debug!("Fixed {fixed} violation(s) of {id}");
                            summary.fixed += fixed;
                        }
                        Classification::Warning => {
                            list.clear();
                            rule.analyze(doc, list);
                            summary.warnings += list.len();
                        }
                        Classification::Disabled => {}
                    }
                }
            }
            if phase == 1 {
                doc.fix_blank_lines();
            }
        }

        info!("Fixed {} violation(s)", summary.fixed);
        summary
    }
}

/// Groups rules by phase, for listings.
#[must_use]
pub fn rules_by_phase(scheduler: &Scheduler) -> BTreeMap<u8, Vec<&dyn Rule>> {
    let mut phases: BTreeMap<u8, Vec<&dyn Rule>> = BTreeMap::new();
    for rule in scheduler.rules() {
        phases.entry(rule.phase()).or_default().push(rule);
    }
    for rules in phases.values_mut() {
        rules.sort_by_key(|r| r.subphase());
    }
    phases
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TokenSpan;
    use crate::severity::WARNING;
    use crate::types::FixAction;

    /// Flags every identifier equal to `word`, replacing it with `WORD`.
    struct Flag {
        id: &'static str,
        word: &'static str,
        phase: u8,
        subphase: u8,
    }

    impl Rule for Flag {
        fn name(&self) -> &str {
            "flag"
        }
        fn identifier(&self) -> &str {
            self.id
        }
        fn phase(&self) -> u8 {
            self.phase
        }
        fn subphase(&self) -> u8 {
            self.subphase
        }
        fn analyze(&self, doc: &Document, violations: &mut Vec<Violation>) {
            for (i, t) in doc.tokens().iter().enumerate() {
                if t.value == self.word {
                    violations.push(
                        Violation::new(self.unique_id(), doc.line_of(i), TokenSpan::single(i), "upper")
                            .with_action(FixAction::Replace {
                                value: self.word.to_uppercase(),
                            }),
                    );
                }
            }
        }
    }

    fn flag(id: &'static str, word: &'static str, phase: u8) -> Flag {
        Flag {
            id,
            word,
            phase,
            subphase: 1,
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Scheduler::builder()
            .rule(flag("001", "a", 1))
            .rule(flag("001", "b", 2))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::DuplicateRule { rule } if rule == "flag_001"));
    }

    #[test]
    fn maximum_phase() {
        let scheduler = Scheduler::builder()
            .rule(flag("001", "a", 2))
            .rule(flag("002", "b", 5))
            .build()
            .unwrap();
        assert_eq!(scheduler.maximum_phase(), 5);
        assert_eq!(Scheduler::builder().build().unwrap().maximum_phase(), 0);
    }

    #[test]
    fn buckets_run_in_phase_then_subphase_order() {
        let mut scheduler = Scheduler::builder()
            .rule(Flag { id: "003", word: "x", phase: 2, subphase: 2 })
            .rule(Flag { id: "002", word: "x", phase: 2, subphase: 1 })
            .rule(flag("001", "x", 1))
            .build()
            .unwrap();
        let doc = Document::parse("x;\n");
        let result = scheduler.analyze(&doc, &AnalyzeOptions::new().all_phases(true));
        let order: Vec<&str> = result.reports.iter().map(|r| r.rule.as_str()).collect();
        assert_eq!(order, vec!["flag_001", "flag_002", "flag_003"]);
    }

    #[test]
    fn unknown_option_is_ignored() {
        let config = Config::parse("[rule.flag_001]\nbogus = 1\n").unwrap();
        let scheduler = Scheduler::builder()
            .rule(flag("001", "a", 1))
            .config(config)
            .build();
        assert!(scheduler.is_ok());
    }

    #[test]
    fn configuration_round_trip() {
        let config = Config::parse("[rule.flag_001]\nseverity = \"Warning\"\nenabled = false\n")
            .unwrap();
        let scheduler = Scheduler::builder()
            .rule(flag("001", "a", 1))
            .rule(flag("002", "b", 1))
            .config(config)
            .build()
            .unwrap();

        let exported = scheduler.configuration();
        let rule = &exported.rule["flag_001"];
        assert_eq!(rule.severity.as_deref(), Some(WARNING));
        assert_eq!(rule.enabled, Some(false));

        let rebuilt = Scheduler::builder()
            .rule(flag("001", "a", 1))
            .rule(flag("002", "b", 1))
            .config(exported.clone())
            .build()
            .unwrap();
        assert_eq!(rebuilt.configuration(), exported);
    }

    #[test]
    fn warnings_are_not_fixed() {
        let config = Config::parse("[rule.flag_001]\nseverity = \"Warning\"\n").unwrap();
        let mut scheduler = Scheduler::builder()
            .rule(flag("001", "a", 1))
            .config(config)
            .build()
            .unwrap();
        let mut doc = Document::parse("a;\n");
        let summary = scheduler.fix(&mut doc, &FixOptions::new());
        assert_eq!(summary.fixed, 0);
        assert_eq!(summary.warnings, 1);
        assert_eq!(scheduler.violations("flag_001").len(), 1);
        assert_eq!(doc.render(), "a;\n");
    }

    #[test]
    fn fix_stops_at_requested_phase() {
        let mut scheduler = Scheduler::builder()
            .rule(flag("001", "a", 1))
            .rule(flag("003", "b", 3))
            .build()
            .unwrap();
        let mut doc = Document::parse("a b;\n");
        let summary = scheduler.fix(&mut doc, &FixOptions::new().up_to_phase(2));
        assert_eq!(summary.last_phase, 2);
        assert_eq!(doc.render(), "A b;\n");
    }

    #[test]
    fn rules_grouped_by_phase() {
        let scheduler = Scheduler::builder()
            .rule(flag("002", "b", 3))
            .rule(flag("001", "a", 1))
            .build()
            .unwrap();
        let phases = rules_by_phase(&scheduler);
        assert_eq!(phases.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
    }
}
