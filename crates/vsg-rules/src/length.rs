//! Rule `length_001`: line length limit. Not fixable.

use std::collections::BTreeMap;

use vsg_core::{Document, OptionError, Rule, TokenSpan, Violation};

use crate::options::{usize_option, usize_value};

/// Reports lines longer than the limit.
#[derive(Debug, Clone, Copy)]
pub struct LineLength {
    length: usize,
}

impl Default for LineLength {
    fn default() -> Self {
        Self::new()
    }
}

impl LineLength {
    /// Creates the rule with a limit of 120 characters.
    #[must_use]
    pub fn new() -> Self {
        Self { length: 120 }
    }

    /// Sets the limit.
    #[must_use]
    pub fn length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }
}

impl Rule for LineLength {
    fn name(&self) -> &str {
        "length"
    }

    fn identifier(&self) -> &str {
        "001"
    }

    fn description(&self) -> &str {
        "Checks the length of lines"
    }

    fn phase(&self) -> u8 {
        7
    }

    fn fixable(&self) -> bool {
        false
    }

    fn analyze(&self, doc: &Document, violations: &mut Vec<Violation>) {
        for line in 1..=doc.line_count() {
            let width = doc.line_text(line).chars().count();
            if width > self.length {
                violations.push(Violation::new(
                    self.unique_id(),
                    line,
                    TokenSpan::single(doc.line_range(line).start),
                    format!("Reduce line to {} characters or less", self.length),
                ));
            }
        }
    }

    fn configure_option(&mut self, key: &str, value: &toml::Value) -> Result<(), OptionError> {
        match key {
            "length" => {
                self.length = usize_option(key, value)?;
                Ok(())
            }
            _ => Err(OptionError::Unknown {
                key: key.to_string(),
            }),
        }
    }

    fn options(&self) -> BTreeMap<String, toml::Value> {
        BTreeMap::from([("length".to_string(), usize_value(self.length))])
    }
}
