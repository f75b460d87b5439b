//! Rule implementations built from local rule definitions.

use std::collections::BTreeMap;

use vsg_core::{Document, FixAction, OptionError, Rule, Token, TokenKind, TokenSpan, Violation};

use crate::options::Case;

/// Identity and ordering shared by all local rules.
#[derive(Debug, Clone)]
pub struct LocalRuleMeta {
    pub(crate) name: String,
    pub(crate) identifier: String,
    pub(crate) phase: u8,
    pub(crate) subphase: u8,
    pub(crate) severity: String,
    pub(crate) description: String,
}

/// Lowercased word list matched against keywords and identifiers.
#[derive(Debug, Clone)]
pub struct WordSet(Vec<String>);

impl WordSet {
    pub(crate) fn new(words: &[String]) -> Self {
        Self(words.iter().map(|w| w.to_ascii_lowercase()).collect())
    }

    fn matches(&self, token: &Token) -> bool {
        matches!(token.kind, TokenKind::Keyword | TokenKind::Identifier)
            && self.0.iter().any(|w| w.eq_ignore_ascii_case(&token.value))
    }
}

/// Requires a set of words to be written in one case.
#[derive(Debug, Clone)]
pub struct TokenCaseRule {
    meta: LocalRuleMeta,
    words: WordSet,
    case: Case,
}

impl TokenCaseRule {
    pub(crate) fn new(meta: LocalRuleMeta, words: WordSet, case: Case) -> Self {
        Self { meta, words, case }
    }
}

impl Rule for TokenCaseRule {
    fn name(&self) -> &str {
        &self.meta.name
    }

    fn identifier(&self) -> &str {
        &self.meta.identifier
    }

    fn description(&self) -> &str {
        &self.meta.description
    }

    fn phase(&self) -> u8 {
        self.meta.phase
    }

    fn subphase(&self) -> u8 {
        self.meta.subphase
    }

    fn default_severity(&self) -> &str {
        &self.meta.severity
    }

    fn analyze(&self, doc: &Document, violations: &mut Vec<Violation>) {
        for (i, token) in doc.tokens().iter().enumerate() {
            if !self.words.matches(token) {
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

/// Reports any use of a set of words.
#[derive(Debug, Clone)]
pub struct DisallowWordRule {
    meta: LocalRuleMeta,
    words: WordSet,
    message: String,
}

impl DisallowWordRule {
    pub(crate) fn new(meta: LocalRuleMeta, words: WordSet, message: String) -> Self {
        Self {
            meta,
            words,
            message,
        }
    }
}

impl Rule for DisallowWordRule {
    fn name(&self) -> &str {
        &self.meta.name
    }

    fn identifier(&self) -> &str {
        &self.meta.identifier
    }

    fn description(&self) -> &str {
        &self.meta.description
    }

    fn phase(&self) -> u8 {
        self.meta.phase
    }

    fn subphase(&self) -> u8 {
        self.meta.subphase
    }

    fn default_severity(&self) -> &str {
        &self.meta.severity
    }

    fn fixable(&self) -> bool {
        false
    }

    fn analyze(&self, doc: &Document, violations: &mut Vec<Violation>) {
        for (i, token) in doc.tokens().iter().enumerate() {
            if self.words.matches(token) {
                violations.push(Violation::new(
                    self.unique_id(),
                    doc.line_of(i),
                    TokenSpan::single(i),
                    self.message.clone(),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: &str) -> LocalRuleMeta {
        LocalRuleMeta {
            name: name.to_string(),
            identifier: "001".to_string(),
            phase: 6,
            subphase: 1,
            severity: "Error".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn token_case_fixes_keywords_and_identifiers() {
        let rule = TokenCaseRule::new(
            meta("range"),
            WordSet::new(&["downto".to_string(), "std_logic".to_string()]),
            Case::Upper,
        );
        let mut doc = Document::parse("signal s : std_logic_vector(7 downto 0);\nsignal t : std_logic;\n");
        let fixed = rule.fix(&mut doc, None, &mut Vec::new());
        assert_eq!(fixed, 2);
        assert_eq!(
            doc.render(),
            "signal s : std_logic_vector(7 DOWNTO 0);\nsignal t : STD_LOGIC;\n"
        );
    }

    #[test]
    fn disallow_word_reports_with_message() {
        let rule = DisallowWordRule::new(
            meta("port"),
            WordSet::new(&["buffer".to_string()]),
            "Use out instead of buffer".to_string(),
        );
        let doc = Document::parse("port (q : BUFFER bit);\n");
        let mut violations = Vec::new();
        rule.analyze(&doc, &mut violations);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].solution, "Use out instead of buffer");
        assert!(!rule.fixable());
    }

    #[test]
    fn comments_are_not_matched() {
        let rule = DisallowWordRule::new(
            meta("port"),
            WordSet::new(&["buffer".to_string()]),
            String::new(),
        );
        let doc = Document::parse("-- buffer\n");
        let mut violations = Vec::new();
        rule.analyze(&doc, &mut violations);
        assert!(violations.is_empty());
    }
}
