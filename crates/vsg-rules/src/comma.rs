//! Rule `comma_001`: exactly one space after a comma.
//!
//! A comma at the end of a line or before a comment is left alone.

use vsg_core::{Document, FixAction, Rule, TokenKind, TokenSpan, Violation};

/// Checks the spacing after commas.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpaceAfterComma;

impl SpaceAfterComma {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for SpaceAfterComma {
    fn name(&self) -> &str {
        "comma"
    }

    fn identifier(&self) -> &str {
        "001"
    }

    fn description(&self) -> &str {
        "Checks for a single space after commas"
    }

    fn phase(&self) -> u8 {
        2
    }

    fn analyze(&self, doc: &Document, violations: &mut Vec<Violation>) {
        let tokens = doc.tokens();
        for (i, token) in tokens.iter().enumerate() {
            if !token.is_delimiter(",") {
                continue;
            }
            let Some(next) = tokens.get(i + 1) else {
                continue;
            };
            let action = match next.kind {
                TokenKind::CarriageReturn | TokenKind::Comment => None,
                TokenKind::Whitespace => {
                    let after = tokens.get(i + 2);
                    let ends_line = after.map_or(true, |t| {
                        t.is_carriage_return() || t.kind == TokenKind::Comment
                    });
                    (!ends_line && next.value != " ")
                        .then_some(FixAction::AdjustWhitespace { width: 1 })
                }
                _ => Some(FixAction::InsertWhitespace { width: 1 }),
            };
            if let Some(action) = action {
                violations.push(
                    Violation::new(
                        self.unique_id(),
                        doc.line_of(i),
                        TokenSpan::single(i + 1),
                        "Use a single space after the comma",
                    )
                    .with_action(action),
                );
            }
        }
    }
}
