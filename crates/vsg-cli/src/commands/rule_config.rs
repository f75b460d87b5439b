//! Configuration export: `--output-configuration` and `--rule-configuration`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use vsg_core::{Config, Scheduler, SeverityDefinition};

/// Parts of the loaded configuration that the scheduler does not hold.
#[derive(Debug, Clone, Default)]
pub struct Export {
    /// Local rules directory in effect.
    pub local_rules: Option<PathBuf>,
    /// File patterns from the command line and configuration.
    pub file_list: Vec<String>,
    /// Extra severities defined by the configuration.
    pub severity: BTreeMap<String, SeverityDefinition>,
}

/// Full effective configuration: every rule with its severity, enabled flag,
/// and options.
#[must_use]
pub fn effective(scheduler: &Scheduler, export: &Export) -> Config {
    Config {
        local_rules: export.local_rules.clone(),
        file_list: export.file_list.clone(),
        severity: export.severity.clone(),
        rule: scheduler.configuration().rule,
        fix_only: None,
    }
}

/// Writes the effective configuration to `path` as JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write(scheduler: &Scheduler, export: &Export, path: &Path) -> Result<()> {
    let json = effective(scheduler, export).to_json()?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write configuration: {}", path.display()))?;
    tracing::info!("Wrote configuration to {}", path.display());
    Ok(())
}

/// Prints the configuration of one rule.
///
/// Returns `false` if no rule has that id.
///
/// # Errors
///
/// Returns an error if the configuration cannot be serialized.
pub fn print(scheduler: &Scheduler, export: &Export, id: &str) -> Result<bool> {
    let Some(rule) = scheduler.rule_configuration(id) else {
        eprintln!("ERROR: rule {id} was not found.");
        return Ok(false);
    };
    let config = Config {
        local_rules: export.local_rules.clone(),
        rule: BTreeMap::from([(id.to_string(), rule)]),
        ..Config::default()
    };
    println!("{}", config.to_json()?);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsg_rules::RuleRegistry;

    fn scheduler(config: &str) -> Scheduler {
        Scheduler::builder()
            .rules(RuleRegistry::builtin().into_rules())
            .config(Config::parse(config).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn written_configuration_reloads() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.json");
        let source = "[severity.Note]\ntype = \"warning\"\n[rule.entity_500]\nseverity = \"Note\"\ncase = \"upper\"\n";
        let export = Export {
            file_list: vec!["rtl/*.vhd".to_string()],
            severity: Config::parse(source).unwrap().severity,
            ..Export::default()
        };
        write(&scheduler(source), &export, &path).unwrap();

        let reloaded = Config::from_file(&path).unwrap();
        assert_eq!(reloaded.file_list, vec!["rtl/*.vhd"]);
        let entity = &reloaded.rule["entity_500"];
        assert_eq!(entity.severity.as_deref(), Some("Note"));
        assert_eq!(entity.get_str("case", "lower"), "upper");
        assert!(reloaded.rule.contains_key("whitespace_001"));

        // The export configures a fresh scheduler identically.
        let again = Scheduler::builder()
            .rules(RuleRegistry::builtin().into_rules())
            .config(reloaded)
            .build()
            .unwrap();
        assert_eq!(
            again.rule_configuration("entity_500"),
            scheduler(source).rule_configuration("entity_500")
        );
    }

    #[test]
    fn print_unknown_rule() {
        let found = print(&scheduler(""), &Export::default(), "nope_001").unwrap();
        assert!(!found);
        assert!(print(&scheduler(""), &Export::default(), "entity_500").unwrap());
    }
}
