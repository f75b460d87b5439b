//! Configuration types for the style checker.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::severity::SeverityKind;

/// Name of the rule table applied to every rule before its own table.
pub const GLOBAL_RULE: &str = "global";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory with additional rule definitions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_rules: Option<PathBuf>,

    /// Glob patterns of files to check.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_list: Vec<String>,

    /// Extra named severities.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub severity: BTreeMap<String, SeverityDefinition>,

    /// Per-rule configurations, keyed by unique rule id or `global`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rule: BTreeMap<String, RuleConfig>,

    /// Restricts which violations a fix pass may resolve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_only: Option<FixFilter>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file.
    ///
    /// Files ending in `.json` are read as JSON, everything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let result = if is_json {
            Self::parse_json(&content)
        } else {
            Self::parse(&content)
        };
        result.map_err(|e| match e {
            ConfigError::Parse { message } => ConfigError::Parse {
                message: format!("{}: {message}", path.display()),
            },
            other => other,
        })
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Parses configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid.
    pub fn parse_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Serializes the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if an option value cannot be represented in JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Merges `other` on top of `self`.
    ///
    /// Scalars from `other` win when set, `file_list` accumulates, and rule
    /// tables from `other` replace those of `self` wholesale.
    pub fn merge(&mut self, other: Self) {
        if other.local_rules.is_some() {
            self.local_rules = other.local_rules;
        }
        self.file_list.extend(other.file_list);
        self.severity.extend(other.severity);
        self.rule.extend(other.rule);
        if other.fix_only.is_some() {
            self.fix_only = other.fix_only;
        }
    }

    /// Rule tables except `global`.
    pub fn rule_tables(&self) -> impl Iterator<Item = (&str, &RuleConfig)> {
        self.rule
            .iter()
            .filter(|(id, _)| id.as_str() != GLOBAL_RULE)
            .map(|(id, c)| (id.as_str(), c))
    }

    /// The `global` rule table, if present.
    #[must_use]
    pub fn global(&self) -> Option<&RuleConfig> {
        self.rule.get(GLOBAL_RULE)
    }
}

/// Definition of a named severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityDefinition {
    /// Class of the severity.
    #[serde(rename = "type")]
    pub kind: SeverityKind,
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Severity name for this rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: BTreeMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets an option value as a specific type.
    #[must_use]
    pub fn get_option<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| v.clone().try_into().ok())
    }

    /// Gets a string option with a default value.
    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.options
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }
}

/// Allow-list for fix passes, keyed by unique rule id.
///
/// A rule missing from the list is never fixed while the filter is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixFilter {
    /// Line selection per rule.
    #[serde(default)]
    pub rule: BTreeMap<String, LineSelection>,
}

impl FixFilter {
    /// Returns `true` if a violation of `rule` on `line` may be fixed.
    #[must_use]
    pub fn allows(&self, rule: &str, line: usize) -> bool {
        match self.rule.get(rule) {
            Some(LineSelection::All(_)) => true,
            Some(LineSelection::Lines(lines)) => lines.contains(&line),
            None => false,
        }
    }
}

/// Lines of a rule that a fix pass may touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineSelection {
    /// Every line (`"all"`).
    All(AllLines),
    /// Only the listed 1-based lines.
    Lines(Vec<usize>),
}

/// The `"all"` keyword of a [`LineSelection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllLines {
    /// Every line.
    All,
}

/// Invalid value for a single rule option.
#[derive(Debug, thiserror::Error)]
pub enum OptionError {
    /// The rule has no option with this name.
    #[error("unknown option `{key}`")]
    Unknown {
        /// Option name.
        key: String,
    },

    /// The value has the wrong type.
    #[error("option `{key}` expects {expected}")]
    InvalidType {
        /// Option name.
        key: String,
        /// Description of the expected type.
        expected: &'static str,
    },

    /// The value has the right type but is not allowed.
    #[error("option `{key}` does not accept `{value}` (allowed: {allowed})")]
    InvalidValue {
        /// Option name.
        key: String,
        /// The rejected value.
        value: String,
        /// Allowed values.
        allowed: String,
    },
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(vsg::config::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    #[diagnostic(code(vsg::config::parse))]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// Configuration names a rule that is not registered.
    #[error("Unknown rule `{rule}` in configuration")]
    #[diagnostic(
        code(vsg::config::unknown_rule),
        help("run `vsg --list-rules` to see the available rule ids")
    )]
    UnknownRule {
        /// The offending rule id.
        rule: String,
    },

    /// A severity name is not defined.
    #[error("Rule `{rule}` uses undefined severity `{severity}`")]
    #[diagnostic(
        code(vsg::config::unknown_severity),
        help("use `Error`, `Warning`, or define it under [severity.<name>]")
    )]
    UnknownSeverity {
        /// Rule the severity was assigned to.
        rule: String,
        /// The undefined severity name.
        severity: String,
    },

    /// Two registered rules share one id.
    #[error("Rule `{rule}` is registered more than once")]
    #[diagnostic(
        code(vsg::config::duplicate_rule),
        help("local rules must not reuse the id of a built-in rule")
    )]
    DuplicateRule {
        /// The duplicated rule id.
        rule: String,
    },

    /// An option value was rejected by its rule.
    #[error("Invalid configuration for rule `{rule}`: {source}")]
    #[diagnostic(code(vsg::config::invalid_option))]
    InvalidOption {
        /// Rule the option belongs to.
        rule: String,
        /// What was wrong.
        source: OptionError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.rule.is_empty());
        assert!(config.fix_only.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
local_rules = "rules"
file_list = ["rtl/*.vhd"]

[severity.Note]
type = "warning"

[rule.global]
indent_size = 4

[rule.entity_500]
enabled = true
severity = "Warning"
case = "upper"

[fix_only.rule]
entity_500 = "all"
comma_001 = [3, 7]
"#;

        let config = Config::parse(toml).unwrap();
        assert_eq!(config.local_rules, Some(PathBuf::from("rules")));
        assert_eq!(config.severity["Note"].kind, SeverityKind::Warning);
        assert_eq!(config.global().unwrap().get_option::<i64>("indent_size"), Some(4));

        let rule = &config.rule["entity_500"];
        assert_eq!(rule.enabled, Some(true));
        assert_eq!(rule.severity.as_deref(), Some("Warning"));
        assert_eq!(rule.get_str("case", "lower"), "upper");
        assert!(!rule.options.contains_key("severity"));

        let filter = config.fix_only.unwrap();
        assert!(filter.allows("entity_500", 12));
        assert!(filter.allows("comma_001", 7));
        assert!(!filter.allows("comma_001", 4));
        assert!(!filter.allows("indent_001", 1));
    }

    #[test]
    fn rule_tables_skip_global() {
        let config = Config::parse("[rule.global]\n[rule.if_500]\n").unwrap();
        let ids: Vec<&str> = config.rule_tables().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["if_500"]);
    }

    #[test]
    fn parse_json_config() {
        let json = r#"{"rule": {"entity_500": {"severity": "Warning", "case": "upper"}}}"#;
        let config = Config::parse_json(json).unwrap();
        assert_eq!(config.rule["entity_500"].get_str("case", "lower"), "upper");
    }

    #[test]
    fn invalid_line_selection_is_a_parse_error() {
        let err = Config::parse("[fix_only.rule]\nentity_500 = \"some\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn merge_later_rule_table_wins() {
        let mut base = Config::parse(
            "file_list = [\"a.vhd\"]\n[rule.entity_500]\ncase = \"upper\"\nseverity = \"Warning\"\n",
        )
        .unwrap();
        let over = Config::parse("file_list = [\"b.vhd\"]\n[rule.entity_500]\ncase = \"lower\"\n")
            .unwrap();
        base.merge(over);
        assert_eq!(base.file_list, vec!["a.vhd", "b.vhd"]);
        let rule = &base.rule["entity_500"];
        assert_eq!(rule.get_str("case", ""), "lower");
        assert!(rule.severity.is_none());
    }

    #[test]
    fn json_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config::parse("[rule.if_500]\ncase = \"upper\"\n").unwrap();
        std::fs::write(&path, config.to_json().unwrap()).unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::from_file(Path::new("/nonexistent/vsg.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
