//! TOML deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are validated and turned into rules by the parent module.

use serde::Deserialize;

use crate::options::Case;

/// Raw TOML representation of one local rules file.
///
/// A file holds any number of `[[token-case]]` and `[[disallow-word]]`
/// sections.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocalRulesDto {
    /// Word case rules.
    #[serde(rename = "token-case", default)]
    pub token_case: Vec<TokenCaseDto>,

    /// Forbidden word rules.
    #[serde(rename = "disallow-word", default)]
    pub disallow_word: Vec<DisallowWordDto>,
}

/// TOML representation of a token-case rule.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenCaseDto {
    /// Rule family (e.g. "user").
    pub name: String,
    /// Identifier within the family (e.g. "001").
    pub identifier: String,
    /// Words (keywords or identifiers) the rule checks.
    pub words: Vec<String>,
    /// Required case (default: lower).
    #[serde(default)]
    pub case: Case,
    /// Phase (default: 6).
    #[serde(default = "default_case_phase")]
    pub phase: u8,
    /// Subphase (default: 1).
    #[serde(default = "default_subphase")]
    pub subphase: u8,
    /// Severity name (default: "Error").
    #[serde(default)]
    pub severity: Option<String>,
    /// Description shown in rule listings.
    #[serde(default)]
    pub description: Option<String>,
}

/// TOML representation of a disallow-word rule.
#[derive(Debug, Clone, Deserialize)]
pub struct DisallowWordDto {
    /// Rule family.
    pub name: String,
    /// Identifier within the family.
    pub identifier: String,
    /// Words that must not appear.
    pub words: Vec<String>,
    /// Violation message.
    pub message: String,
    /// Phase (default: 7).
    #[serde(default = "default_disallow_phase")]
    pub phase: u8,
    /// Subphase (default: 1).
    #[serde(default = "default_subphase")]
    pub subphase: u8,
    /// Severity name (default: "Error").
    #[serde(default)]
    pub severity: Option<String>,
    /// Description shown in rule listings.
    #[serde(default)]
    pub description: Option<String>,
}

fn default_case_phase() -> u8 {
    6
}

fn default_disallow_phase() -> u8 {
    7
}

fn default_subphase() -> u8 {
    1
}
