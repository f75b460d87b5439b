//! Whitespace rules.
//!
//! - `whitespace_001`: no whitespace at the end of a line
//! - `whitespace_002`: no tab characters in whitespace

use vsg_core::{Document, FixAction, Rule, Token, TokenSpan, Violation};

/// Removes whitespace at the end of lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailingWhitespace;

impl TrailingWhitespace {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for TrailingWhitespace {
    fn name(&self) -> &str {
        "whitespace"
    }

    fn identifier(&self) -> &str {
        "001"
    }

    fn description(&self) -> &str {
        "Checks for whitespace at the end of lines"
    }

    fn phase(&self) -> u8 {
        1
    }

    fn subphase(&self) -> u8 {
        2
    }

    fn analyze(&self, doc: &Document, violations: &mut Vec<Violation>) {
        let tokens = doc.tokens();
        for (i, token) in tokens.iter().enumerate() {
            if !token.is_whitespace() {
                continue;
            }
            let at_line_end = tokens.get(i + 1).map_or(true, Token::is_carriage_return);
            if at_line_end {
                violations.push(
                    Violation::new(
                        self.unique_id(),
                        doc.line_of(i),
                        TokenSpan::single(i),
                        "Remove trailing whitespace",
                    )
                    .with_action(FixAction::Remove),
                );
            }
        }
    }
}

/// Replaces tab characters with spaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct TabCharacters;

impl TabCharacters {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for TabCharacters {
    fn name(&self) -> &str {
        "whitespace"
    }

    fn identifier(&self) -> &str {
        "002"
    }

    fn description(&self) -> &str {
        "Checks for tab characters"
    }

    fn phase(&self) -> u8 {
        1
    }

    fn analyze(&self, doc: &Document, violations: &mut Vec<Violation>) {
        for (i, token) in doc.tokens().iter().enumerate() {
            if token.is_whitespace() && token.value.contains('\t') {
                violations.push(
                    Violation::new(
                        self.unique_id(),
                        doc.line_of(i),
                        TokenSpan::single(i),
                        "Replace tab with space",
                    )
                    .with_action(FixAction::Replace {
                        value: token.value.replace('\t', " "),
                    }),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_whitespace_is_removed() {
        let mut doc = Document::parse("a;  \nb;\t\nc;");
        let mut violations = Vec::new();
        TrailingWhitespace.analyze(&doc, &mut violations);
        let lines: Vec<usize> = violations.iter().map(|v| v.line).collect();
        assert_eq!(lines, vec![1, 2]);

        assert_eq!(TrailingWhitespace.fix(&mut doc, None, &mut violations), 2);
        assert_eq!(doc.render(), "a;\nb;\nc;");
    }

    #[test]
    fn whitespace_only_line_counts_as_trailing() {
        let doc = Document::parse("a;\n   \nb;\n");
        let mut violations = Vec::new();
        TrailingWhitespace.analyze(&doc, &mut violations);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 2);
    }

    #[test]
    fn whitespace_at_end_of_file() {
        let doc = Document::parse("a;  ");
        let mut violations = Vec::new();
        TrailingWhitespace.analyze(&doc, &mut violations);
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn tabs_become_spaces() {
        let mut doc = Document::parse("a\t:\t\tbit;\n");
        let fixed = TabCharacters.fix(&mut doc, None, &mut Vec::new());
        assert_eq!(fixed, 2);
        assert_eq!(doc.render(), "a :  bit;\n");
    }
}
