//! The rule registry: built-in rules plus local and programmatic rules.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use tracing::debug;
use vsg_core::{Rule, RuleBox};

use crate::{
    keyword_case_rules, ConsecutiveBlankLines, Indentation, LineLength, SpaceAfterComma,
    TabCharacters, TrailingWhitespace,
};

/// Errors while loading rules.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum LoadError {
    /// The local rules directory does not exist.
    #[error("Local rules directory {path} does not exist")]
    #[diagnostic(
        code(vsg::rules::missing_directory),
        help("check the `--local-rules` argument or the `local_rules` config key")
    )]
    MissingDirectory {
        /// The missing directory.
        path: PathBuf,
    },

    /// A local rules file could not be read.
    #[error("Failed to read local rules file {path}: {source}")]
    #[diagnostic(code(vsg::rules::io))]
    Io {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A local rules file is not valid TOML or has an unexpected shape.
    #[error("Failed to parse local rules file {path}: {message}")]
    #[diagnostic(code(vsg::rules::parse))]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// A rule definition was rejected.
    #[error("Invalid local rule in {path}: {message}")]
    #[diagnostic(code(vsg::rules::invalid))]
    Invalid {
        /// File that holds the rule.
        path: PathBuf,
        /// What was wrong.
        message: String,
    },

    /// The directory path cannot be used as a glob pattern.
    #[error("Invalid local rules path `{pattern}`: {message}")]
    #[diagnostic(code(vsg::rules::pattern))]
    Pattern {
        /// The glob pattern built from the directory.
        pattern: String,
        /// Pattern error message.
        message: String,
    },
}

/// Returns one instance of every built-in rule, in registration order.
#[must_use]
pub fn builtin_rules() -> Vec<RuleBox> {
    let mut rules: Vec<RuleBox> = vec![
        Box::new(TabCharacters::new()),
        Box::new(TrailingWhitespace::new()),
        Box::new(SpaceAfterComma::new()),
        Box::new(ConsecutiveBlankLines::new()),
        Box::new(Indentation::new()),
        Box::new(LineLength::new()),
    ];
    rules.extend(
        keyword_case_rules()
            .into_iter()
            .map(|r| Box::new(r) as RuleBox),
    );
    rules
}

/// Highest phase of any rule in `rules`, or 0 if empty.
#[must_use]
pub fn maximum_phase(rules: &[RuleBox]) -> u8 {
    rules.iter().map(|r| r.phase()).max().unwrap_or(0)
}

/// A flat collection of rule instances.
///
/// Duplicate ids are not rejected here; the scheduler refuses them when it
/// is built.
#[derive(Default)]
pub struct RuleRegistry {
    rules: Vec<RuleBox>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in rules.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            rules: builtin_rules(),
        }
    }

    /// Loads the built-in rules plus, if given, the rules of a local
    /// rules directory.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MissingDirectory`] if `local_rules` does not
    /// exist, or another [`LoadError`] if one of its files is invalid.
    pub fn load(local_rules: Option<&Path>) -> Result<Self, LoadError> {
        let mut registry = Self::builtin();
        if let Some(dir) = local_rules {
            for rule in crate::local::load_directory(dir)? {
                registry.register(rule);
            }
        }
        Ok(registry)
    }

    /// Adds a rule.
    pub fn register(&mut self, rule: RuleBox) {
        debug!("Registering rule {}", rule.unique_id());
        self.rules.push(rule);
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Registered rules in registration order.
    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Highest phase of any registered rule.
    #[must_use]
    pub fn maximum_phase(&self) -> u8 {
        maximum_phase(&self.rules)
    }

    /// Consumes the registry, returning its rules.
    #[must_use]
    pub fn into_rules(self) -> Vec<RuleBox> {
        self.rules
    }
}
