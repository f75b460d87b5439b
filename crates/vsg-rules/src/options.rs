//! Parsing of rule option values.

use serde::{Deserialize, Serialize};
use vsg_core::OptionError;

/// Letter case a word must be written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Case {
    /// All lowercase.
    #[default]
    Lower,
    /// All uppercase.
    Upper,
}

impl Case {
    /// Rewrites `word` in this case.
    #[must_use]
    pub fn apply(self, word: &str) -> String {
        match self {
            Self::Lower => word.to_ascii_lowercase(),
            Self::Upper => word.to_ascii_uppercase(),
        }
    }

    /// Option spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lower => "lower",
            Self::Upper => "upper",
        }
    }

    pub(crate) fn from_option(key: &str, value: &toml::Value) -> Result<Self, OptionError> {
        match value.as_str() {
            Some("lower") => Ok(Self::Lower),
            Some("upper") => Ok(Self::Upper),
            Some(other) => Err(OptionError::InvalidValue {
                key: key.to_string(),
                value: other.to_string(),
                allowed: "lower, upper".to_string(),
            }),
            None => Err(OptionError::InvalidType {
                key: key.to_string(),
                expected: "a string",
            }),
        }
    }

    pub(crate) fn to_value(self) -> toml::Value {
        toml::Value::String(self.as_str().to_string())
    }
}

/// Reads a non-negative integer option.
pub(crate) fn usize_option(key: &str, value: &toml::Value) -> Result<usize, OptionError> {
    value
        .as_integer()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| OptionError::InvalidType {
            key: key.to_string(),
            expected: "a non-negative integer",
        })
}

pub(crate) fn usize_value(n: usize) -> toml::Value {
    toml::Value::Integer(i64::try_from(n).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_from_option() {
        let upper = toml::Value::String("upper".into());
        assert_eq!(Case::from_option("case", &upper).unwrap(), Case::Upper);

        let title = toml::Value::String("title".into());
        assert!(matches!(
            Case::from_option("case", &title),
            Err(OptionError::InvalidValue { .. })
        ));
        assert!(matches!(
            Case::from_option("case", &toml::Value::Integer(1)),
            Err(OptionError::InvalidType { .. })
        ));
    }

    #[test]
    fn usize_option_rejects_negative() {
        assert_eq!(usize_option("n", &toml::Value::Integer(3)).unwrap(), 3);
        assert!(usize_option("n", &toml::Value::Integer(-1)).is_err());
        assert!(usize_option("n", &toml::Value::Boolean(true)).is_err());
    }

    #[test]
    fn apply_case() {
        assert_eq!(Case::Upper.apply("Entity"), "ENTITY");
        assert_eq!(Case::Lower.apply("Entity"), "entity");
    }
}
