//! List rules command implementation.

use vsg_core::{rules_by_phase, Scheduler};

/// Runs the list-rules command.
pub fn run(scheduler: &Scheduler) {
    print!("{}", format(scheduler));
}

fn format(scheduler: &Scheduler) -> String {
    let policy = scheduler.policy();
    let mut out = String::from("Available rules:\n\n");
    out.push_str(&format!(
        "{:<20} {:<6} {:<9} {:<4} Description\n",
        "Rule", "Phase", "Severity", "Fix"
    ));
    out.push_str(&"-".repeat(80));
    out.push('\n');

    for (phase, rules) in rules_by_phase(scheduler) {
        for rule in rules {
            let id = rule.unique_id();
            let severity = if policy.is_enabled(&id) {
                policy.severity_of(&id).unwrap_or("-")
            } else {
                "disabled"
            };
            out.push_str(&format!(
                "{id:<20} {phase:<6} {severity:<9} {:<4} {}\n",
                if rule.fixable() { "yes" } else { "no" },
                rule.description()
            ));
        }
    }

    out.push_str("\nUse --rule-configuration to show the options of a rule, e.g.:\n");
    out.push_str("  vsg --rule-configuration entity_500\n");
    out
}
