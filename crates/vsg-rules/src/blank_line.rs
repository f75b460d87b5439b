//! Rule `blank_line_001`: limits runs of consecutive blank lines.
//!
//! # Configuration
//!
//! - `max_blank_lines`: longest allowed run (default: 1)

use std::collections::BTreeMap;

use vsg_core::{Document, FixAction, OptionError, Rule, Token, TokenSpan, Violation};

use crate::options::{usize_option, usize_value};

/// Removes blank lines beyond the allowed run length.
#[derive(Debug, Clone, Copy)]
pub struct ConsecutiveBlankLines {
    max_blank_lines: usize,
}

impl Default for ConsecutiveBlankLines {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsecutiveBlankLines {
    /// Creates the rule allowing one blank line in a row.
    #[must_use]
    pub fn new() -> Self {
        Self { max_blank_lines: 1 }
    }

    /// Sets the longest allowed run.
    #[must_use]
    pub fn max_blank_lines(mut self, max: usize) -> Self {
        self.max_blank_lines = max;
        self
    }
}

impl Rule for ConsecutiveBlankLines {
    fn name(&self) -> &str {
        "blank_line"
    }

    fn identifier(&self) -> &str {
        "001"
    }

    fn description(&self) -> &str {
        "Checks for too many consecutive blank lines"
    }

    fn phase(&self) -> u8 {
        3
    }

    fn analyze(&self, doc: &Document, violations: &mut Vec<Violation>) {
        let mut run = 0;
        for line in 1..=doc.line_count() {
            let range = doc.line_range(line);
            let blank = doc.tokens()[range.clone()].iter().all(Token::is_layout);
            if !blank {
                run = 0;
                continue;
            }
            run += 1;
            if run > self.max_blank_lines {
                violations.push(
                    Violation::new(
                        self.unique_id(),
                        line,
                        TokenSpan::new(range.start, range.end),
                        "Remove blank line",
                    )
                    .with_action(FixAction::Remove),
                );
            }
        }
    }

    fn configure_option(&mut self, key: &str, value: &toml::Value) -> Result<(), OptionError> {
        match key {
            "max_blank_lines" => {
                self.max_blank_lines = usize_option(key, value)?;
                Ok(())
            }
            _ => Err(OptionError::Unknown {
                key: key.to_string(),
            }),
        }
    }

    fn options(&self) -> BTreeMap<String, toml::Value> {
        BTreeMap::from([(
            "max_blank_lines".to_string(),
            usize_value(self.max_blank_lines),
        )])
    }
}
