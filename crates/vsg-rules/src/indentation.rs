//! Rule `indent_001`: leading whitespace matches the structural indent.
//!
//! # Configuration
//!
//! - `indent_size`: spaces per indent level (default: 2)

use std::collections::BTreeMap;

use vsg_core::{Document, FixAction, OptionError, Rule, TokenSpan, Violation};

use crate::options::{usize_option, usize_value};

/// Checks the indentation of every non-blank line.
#[derive(Debug, Clone, Copy)]
pub struct Indentation {
    indent_size: usize,
}

impl Default for Indentation {
    fn default() -> Self {
        Self::new()
    }
}

impl Indentation {
    /// Creates the rule with two spaces per level.
    #[must_use]
    pub fn new() -> Self {
        Self { indent_size: 2 }
    }

    /// Sets the number of spaces per level.
    #[must_use]
    pub fn indent_size(mut self, size: usize) -> Self {
        self.indent_size = size;
        self
    }
}

impl Rule for Indentation {
    fn name(&self) -> &str {
        "indent"
    }

    fn identifier(&self) -> &str {
        "001"
    }

    fn description(&self) -> &str {
        "Checks the indentation of lines"
    }

    fn phase(&self) -> u8 {
        4
    }

    fn analyze(&self, doc: &Document, violations: &mut Vec<Violation>) {
        let tokens = doc.tokens();
        for line in 1..=doc.line_count() {
            let range = doc.line_range(line);
            let Some(first) = range.clone().find(|&i| !tokens[i].is_layout()) else {
                continue;
            };
            let Some(level) = tokens[first].indent else {
                continue;
            };
            let expected = level * self.indent_size;
            let leading = &tokens[range.start];
            let (actual, action) = if leading.is_whitespace() {
                (
                    leading.value.chars().count(),
                    FixAction::AdjustWhitespace { width: expected },
                )
            } else {
                (0, FixAction::InsertWhitespace { width: expected })
            };
            if actual != expected {
                violations.push(
                    Violation::new(
                        self.unique_id(),
                        line,
                        TokenSpan::single(range.start),
                        format!("Indent to column {expected}"),
                    )
                    .with_action(action),
                );
            }
        }
    }

    fn configure_option(&mut self, key: &str, value: &toml::Value) -> Result<(), OptionError> {
        match key {
            "indent_size" => {
                self.indent_size = usize_option(key, value)?;
                Ok(())
            }
            _ => Err(OptionError::Unknown {
                key: key.to_string(),
            }),
        }
    }

    fn options(&self) -> BTreeMap<String, toml::Value> {
        BTreeMap::from([("indent_size".to_string(), usize_value(self.indent_size))])
    }
}
