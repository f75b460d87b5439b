//! Keyword case rules (`*_500`).
//!
//! Each rule owns a set of reserved words and checks that they are written
//! in the configured case.
//!
//! # Configuration
//!
//! - `case`: `lower` (default) or `upper`

use std::collections::BTreeMap;

use vsg_core::{Document, FixAction, OptionError, Rule, TokenKind, TokenSpan, Violation};

use crate::options::Case;

/// Phase of all keyword case rules.
pub const PHASE: u8 = 6;

/// Checks the case of a set of keywords.
#[derive(Debug, Clone)]
pub struct KeywordCase {
    name: &'static str,
    keywords: &'static [&'static str],
    description: &'static str,
    case: Case,
}

impl KeywordCase {
    /// Creates a rule `<name>_500` over `keywords`.
    #[must_use]
    pub fn new(
        name: &'static str,
        keywords: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self {
            name,
            keywords,
            description,
            case: Case::Lower,
        }
    }

    /// Sets the required case.
    #[must_use]
    pub fn case(mut self, case: Case) -> Self {
        self.case = case;
        self
    }

    fn matches(&self, value: &str) -> bool {
        self.keywords.iter().any(|k| k.eq_ignore_ascii_case(value))
    }
}

impl Rule for KeywordCase {
    fn name(&self) -> &str {
        self.name
    }

    fn identifier(&self) -> &str {
        "500"
    }

    fn description(&self) -> &str {
        self.description
    }

    fn phase(&self) -> u8 {
        PHASE
    }

    fn analyze(&self, doc: &Document, violations: &mut Vec<Violation>) {
        for (i, token) in doc.tokens().iter().enumerate() {
            if token.kind != TokenKind::Keyword || !self.matches(&token.value) {
                continue;
            }
            let wanted = self.case.apply(&token.value);
            if token.value != wanted {
                violations.push(
                    Violation::new(
                        self.unique_id(),
                        doc.line_of(i),
                        TokenSpan::single(i),
                        format!("Change \"{}\" to \"{wanted}\"", token.value),
                    )
                    .with_action(FixAction::Replace { value: wanted }),
                );
            }
        }
    }

    fn configure_option(&mut self, key: &str, value: &toml::Value) -> Result<(), OptionError> {
        match key {
            "case" => {
                self.case = Case::from_option(key, value)?;
                Ok(())
            }
            _ => Err(OptionError::Unknown {
                key: key.to_string(),
            }),
        }
    }

    fn options(&self) -> BTreeMap<String, toml::Value> {
        BTreeMap::from([("case".to_string(), self.case.to_value())])
    }
}

/// Keyword case rules for the common VHDL constructs.
#[must_use]
pub fn keyword_case_rules() -> Vec<KeywordCase> {
    vec![
        KeywordCase::new("entity", &["entity"], "Checks the case of the \"entity\" keyword"),
        KeywordCase::new(
            "architecture",
            &["architecture", "of"],
            "Checks the case of the \"architecture\" and \"of\" keywords",
        ),
        KeywordCase::new("process", &["process"], "Checks the case of the \"process\" keyword"),
        KeywordCase::new(
            "procedure",
            &["procedure"],
            "Checks the case of the \"procedure\" keyword",
        ),
        KeywordCase::new(
            "function",
            &["function", "return", "pure", "impure"],
            "Checks the case of function keywords",
        ),
        KeywordCase::new(
            "if",
            &["if", "then", "elsif", "else"],
            "Checks the case of if statement keywords",
        ),
        KeywordCase::new(
            "case",
            &["case", "when", "others"],
            "Checks the case of case statement keywords",
        ),
        KeywordCase::new("signal", &["signal"], "Checks the case of the \"signal\" keyword"),
        KeywordCase::new("port", &["port", "map"], "Checks the case of port keywords"),
        KeywordCase::new("generic", &["generic"], "Checks the case of the \"generic\" keyword"),
        KeywordCase::new(
            "library",
            &["library", "use"],
            "Checks the case of library clause keywords",
        ),
        KeywordCase::new("end", &["end"], "Checks the case of the \"end\" keyword"),
    ]
}
