//! Local rules defined in TOML files.
//!
//! A local rules directory holds `*.toml` files; every file may declare
//! several rules. Each becomes an ordinary [`Rule`](vsg_core::Rule) and
//! runs alongside the built-in rules.
//!
//! ```text
//! rules/*.toml
//!   ↓ serde (DTO layer)
//! config_dto types
//!   ↓ validate + convert
//! Vec<RuleBox>
//! ```

use std::path::Path;

use tracing::{debug, info};
use vsg_core::{RuleBox, ERROR, MAX_PHASE, MAX_SUBPHASE};

use crate::registry::LoadError;

pub mod config_dto;
pub mod rules;

use config_dto::{DisallowWordDto, LocalRulesDto, TokenCaseDto};
use rules::{DisallowWordRule, LocalRuleMeta, TokenCaseRule, WordSet};

/// Loads every `*.toml` file of `dir`, in file name order.
///
/// # Errors
///
/// Returns [`LoadError::MissingDirectory`] if `dir` is not a directory, and
/// another variant if a file cannot be read, parsed, or validated.
pub fn load_directory(dir: &Path) -> Result<Vec<RuleBox>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::MissingDirectory {
            path: dir.to_path_buf(),
        });
    }

    let pattern = dir.join("*.toml");
    let pattern = pattern.to_string_lossy();
    let mut files = glob::glob(&pattern)
        .map_err(|e| LoadError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?
        .filter_map(Result::ok)
        .collect::<Vec<_>>();
    files.sort();

    let mut result = Vec::new();
    for file in &files {
        let content = std::fs::read_to_string(file).map_err(|e| LoadError::Io {
            path: file.clone(),
            source: e,
        })?;
        let rules = load_rules_from_toml(&content, file)?;
        debug!("Loaded {} rule(s) from {}", rules.len(), file.display());
        result.extend(rules);
    }

    info!("Loaded {} local rule(s) from {}", result.len(), dir.display());
    Ok(result)
}

/// Parses one local rules file.
///
/// `origin` is only used in error messages.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or a rule definition is rejected.
pub fn load_rules_from_toml(content: &str, origin: &Path) -> Result<Vec<RuleBox>, LoadError> {
    let dto: LocalRulesDto = toml::from_str(content).map_err(|e| LoadError::Parse {
        path: origin.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut result: Vec<RuleBox> = Vec::new();
    for rule in dto.token_case {
        result.push(Box::new(convert_token_case(rule, origin)?));
    }
    for rule in dto.disallow_word {
        result.push(Box::new(convert_disallow_word(rule, origin)?));
    }
    Ok(result)
}

fn convert_token_case(dto: TokenCaseDto, origin: &Path) -> Result<TokenCaseRule, LoadError> {
    let meta = convert_meta(
        origin,
        "token-case",
        MetaDto {
            name: dto.name,
            identifier: dto.identifier,
            phase: dto.phase,
            subphase: dto.subphase,
            severity: dto.severity,
            description: dto.description,
            words: &dto.words,
        },
    )?;
    Ok(TokenCaseRule::new(meta, WordSet::new(&dto.words), dto.case))
}

fn convert_disallow_word(
    dto: DisallowWordDto,
    origin: &Path,
) -> Result<DisallowWordRule, LoadError> {
    let meta = convert_meta(
        origin,
        "disallow-word",
        MetaDto {
            name: dto.name,
            identifier: dto.identifier,
            phase: dto.phase,
            subphase: dto.subphase,
            severity: dto.severity,
            description: dto.description,
            words: &dto.words,
        },
    )?;
    Ok(DisallowWordRule::new(
        meta,
        WordSet::new(&dto.words),
        dto.message,
    ))
}

struct MetaDto<'a> {
    name: String,
    identifier: String,
    phase: u8,
    subphase: u8,
    severity: Option<String>,
    description: Option<String>,
    words: &'a [String],
}

fn convert_meta(origin: &Path, kind: &str, dto: MetaDto<'_>) -> Result<LocalRuleMeta, LoadError> {
    let invalid = |message: String| LoadError::Invalid {
        path: origin.to_path_buf(),
        message,
    };
    let is_word = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !is_word(&dto.name) || !is_word(&dto.identifier) {
        return Err(invalid(format!(
            "{kind} `{}_{}`: name and identifier must be non-empty words",
            dto.name, dto.identifier
        )));
    }
    let id = format!("{}_{}", dto.name, dto.identifier);
    if !(1..=MAX_PHASE).contains(&dto.phase) {
        return Err(invalid(format!(
            "{kind} `{id}`: phase {} is outside 1..={MAX_PHASE}",
            dto.phase
        )));
    }
    if !(1..=MAX_SUBPHASE).contains(&dto.subphase) {
        return Err(invalid(format!(
            "{kind} `{id}`: subphase {} is outside 1..={MAX_SUBPHASE}",
            dto.subphase
        )));
    }
    if dto.words.is_empty() {
        return Err(invalid(format!("{kind} `{id}`: `words` must not be empty")));
    }

    Ok(LocalRuleMeta {
        name: dto.name,
        identifier: dto.identifier,
        phase: dto.phase,
        subphase: dto.subphase,
        severity: dto.severity.unwrap_or_else(|| ERROR.to_string()),
        description: dto.description.unwrap_or_default(),
    })
}
