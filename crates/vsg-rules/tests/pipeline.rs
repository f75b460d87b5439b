//! Integration test: built-in and local rules through the scheduler.

use vsg_core::{AnalyzeOptions, Config, ConfigError, Document, FixOptions, Scheduler, TokenKind};
use vsg_rules::{LoadError, RuleRegistry};

const MESSY: &str = concat!(
    "ENTITY counter is\n",
    "port (a,b : in bit);  \n",
    "END entity;\n",
    "\n",
    "\n",
    "architecture rtl OF counter is\n",
    "begin\n",
    "end architecture;",
);

fn scheduler(config: &str, local_rules: Option<&std::path::Path>) -> Scheduler {
    let registry = RuleRegistry::load(local_rules).unwrap();
    Scheduler::builder()
        .rules(registry.into_rules())
        .config(Config::parse(config).unwrap())
        .build()
        .unwrap()
}

#[test]
fn analysis_halts_in_phase_one() {
    let mut scheduler = scheduler("", None);
    let doc = Document::parse(MESSY);
    let result = scheduler.analyze(&doc, &AnalyzeOptions::new());
    assert_eq!(result.last_phase, 1);
    assert!(result.halted_early);
    assert_eq!(result.violations_for("whitespace_001").len(), 1);
    assert_eq!(result.violations_for("whitespace_001")[0].line, 2);
}

#[test]
fn all_phases_finds_every_family() {
    let mut scheduler = scheduler("", None);
    let doc = Document::parse(MESSY);
    let result = scheduler.analyze(&doc, &AnalyzeOptions::new().all_phases(true));
    let rules: Vec<&str> = result.reports.iter().map(|r| r.rule.as_str()).collect();
    assert_eq!(
        rules,
        vec![
            "whitespace_001",
            "comma_001",
            "blank_line_001",
            "indent_001",
            "entity_500",
            "architecture_500",
            "end_500",
        ]
    );
}

#[test]
fn fix_cleans_the_document() {
    let mut scheduler = scheduler("", None);
    let mut doc = Document::parse(MESSY);

    scheduler.fix(&mut doc, &FixOptions::new());
    insta::assert_snapshot!(doc.render(), @r"
    entity counter is
      port (a, b : in bit);
    end entity;

    architecture rtl of counter is
    begin
    end architecture;
    ");

    let result = scheduler.analyze(&doc, &AnalyzeOptions::new());
    assert_eq!(result.last_phase, 7);
    assert!(!result.has_errors);
    assert_eq!(result.total_violations(), 0);
}

#[test]
fn configured_options_change_fixes() {
    let config = r#"
[rule.global]
indent_size = 4
case = "upper"

[rule.blank_line_001]
max_blank_lines = 2
"#;
    let mut scheduler = scheduler(config, None);
    let mut doc = Document::parse(MESSY);

    scheduler.fix(&mut doc, &FixOptions::new());
    insta::assert_snapshot!(doc.render(), @r"
    ENTITY counter is
        PORT (a, b : in bit);
    END ENTITY;


    ARCHITECTURE rtl OF counter is
    begin
    END ARCHITECTURE;
    ");
}

#[test]
fn fix_up_to_phase_leaves_later_phases() {
    let mut scheduler = scheduler("", None);
    let mut doc = Document::parse(MESSY);

    scheduler.fix(&mut doc, &FixOptions::new().up_to_phase(2));
    assert_eq!(doc.line_text(1), "ENTITY counter is");
    assert_eq!(doc.line_text(2), "port (a, b : in bit);");
}

#[test]
fn fix_with_phase_one_skipped_still_indents() {
    let mut scheduler = scheduler("", None);
    let mut doc = Document::parse("entity e is\nport (a : in bit);\n   \nend entity;");

    scheduler.fix(&mut doc, &FixOptions::new().skip_phase(1));
    assert_eq!(doc.render(), "entity e is\n  port (a : in bit);\n\nend entity;");
    let blank = &doc.tokens()[doc.line_range(3)];
    assert_eq!(blank[0].kind, TokenKind::BlankLine);

    let result = scheduler.analyze(&doc, &AnalyzeOptions::new());
    assert_eq!(result.total_violations(), 0);
}

#[test]
fn local_rules_run_with_builtins() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("house.toml"),
        r#"
[[token-case]]
name = "house"
identifier = "001"
words = ["bit"]
case = "upper"

[[disallow-word]]
name = "house"
identifier = "002"
words = ["buffer"]
message = "Use out instead of buffer"
severity = "Warning"
"#,
    )
    .unwrap();

    let mut scheduler = scheduler("", Some(dir.path()));
    let mut doc = Document::parse("entity e is\n  port (a : buffer bit);\nend entity;");
    scheduler.fix(&mut doc, &FixOptions::new());
    assert_eq!(doc.line_text(2), "  port (a : buffer BIT);");

    let result = scheduler.analyze(&doc, &AnalyzeOptions::new());
    assert!(!result.has_errors);
    assert_eq!(result.violations_for("house_002").len(), 1);
}

#[test]
fn local_rule_with_configured_severity() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("note.toml"),
        "[[disallow-word]]\nname = \"user\"\nidentifier = \"001\"\nwords = [\"buffer\"]\nmessage = \"Avoid buffer\"\nseverity = \"Note\"\n",
    )
    .unwrap();

    let mut scheduler = scheduler("[severity.Note]\ntype = \"warning\"\n", Some(dir.path()));
    assert_eq!(scheduler.policy().severity_of("user_001"), Some("Note"));

    let doc = Document::parse("entity e is\n  port (a : buffer bit);\nend entity;");
    let result = scheduler.analyze(&doc, &AnalyzeOptions::new());
    assert!(!result.has_errors);
    assert_eq!(result.last_phase, 7);
    assert_eq!(result.severity_counts.get("Note"), Some(&1));
}

#[test]
fn local_rule_cannot_shadow_builtin() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("dup.toml"),
        "[[token-case]]\nname = \"entity\"\nidentifier = \"500\"\nwords = [\"entity\"]\n",
    )
    .unwrap();

    let registry = RuleRegistry::load(Some(dir.path())).unwrap();
    let err = Scheduler::builder()
        .rules(registry.into_rules())
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, ConfigError::DuplicateRule { rule } if rule == "entity_500"));
}

#[test]
fn missing_local_rules_directory() {
    let dir = tempfile::tempdir().unwrap();
    let err = RuleRegistry::load(Some(&dir.path().join("missing")))
        .err()
        .unwrap();
    assert!(matches!(err, LoadError::MissingDirectory { .. }));
}

#[test]
fn unknown_rule_in_config() {
    let registry = RuleRegistry::builtin();
    let err = Scheduler::builder()
        .rules(registry.into_rules())
        .config(Config::parse("[rule.not_a_real_rule_999]\nseverity = \"Error\"\n").unwrap())
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, ConfigError::UnknownRule { .. }));
}
