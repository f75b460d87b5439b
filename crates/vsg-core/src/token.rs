//! Lexical tokens held by a [`Document`](crate::Document).

use serde::{Deserialize, Serialize};

/// Classification of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// A VHDL reserved word (matched case-insensitively).
    Keyword,
    /// A basic or extended identifier.
    Identifier,
    /// Numeric, string, character, or bit-string literal.
    Literal,
    /// Punctuation or an operator such as `;`, `(`, `<=`.
    Delimiter,
    /// A run of spaces and tabs inside a line.
    Whitespace,
    /// A `--` comment up to the end of its line.
    Comment,
    /// End of a source line.
    CarriageReturn,
    /// Marker for a line without content.
    BlankLine,
}

/// A single token of a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// The source text of the token.
    pub value: String,
    /// Structural indent level; set only on the first non-whitespace token of a line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<usize>,
}

impl Token {
    /// Creates a token without indent information.
    #[must_use]
    pub fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            indent: None,
        }
    }

    /// Creates a whitespace token of the given width.
    #[must_use]
    pub fn whitespace(width: usize) -> Self {
        Self::new(TokenKind::Whitespace, " ".repeat(width))
    }

    /// Creates an end-of-line token.
    #[must_use]
    pub fn carriage_return() -> Self {
        Self::new(TokenKind::CarriageReturn, "\n")
    }

    /// Creates a blank-line marker.
    #[must_use]
    pub fn blank_line() -> Self {
        Self::new(TokenKind::BlankLine, "")
    }

    /// Returns `true` if this token is a keyword equal to `word` (case-insensitive).
    #[must_use]
    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.value.eq_ignore_ascii_case(word)
    }

    /// Returns `true` if this token is the given delimiter.
    #[must_use]
    pub fn is_delimiter(&self, text: &str) -> bool {
        self.kind == TokenKind::Delimiter && self.value == text
    }

    /// Returns `true` for whitespace tokens.
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }

    /// Returns `true` for tokens that end a line.
    #[must_use]
    pub fn is_carriage_return(&self) -> bool {
        self.kind == TokenKind::CarriageReturn
    }

    /// Returns `true` for tokens with no rendered width in a line
    /// (whitespace, blank-line markers, line ends).
    #[must_use]
    pub fn is_layout(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::BlankLine | TokenKind::CarriageReturn
        )
    }

    /// Text written to the output file for this token.
    #[must_use]
    pub fn rendered(&self) -> &str {
        match self.kind {
            TokenKind::CarriageReturn => "\n",
            TokenKind::BlankLine => "",
            _ => &self.value,
        }
    }
}

/// VHDL-2008 reserved words.
const KEYWORDS: &[&str] = &[
    "abs", "access", "after", "alias", "all", "and", "architecture", "array", "assert",
    "attribute", "begin", "block", "body", "buffer", "bus", "case", "component",
    "configuration", "constant", "context", "disconnect", "downto", "else", "elsif", "end",
    "entity", "exit", "file", "for", "force", "function", "generate", "generic", "group",
    "guarded", "if", "impure", "in", "inertial", "inout", "is", "label", "library", "linkage",
    "literal", "loop", "map", "mod", "nand", "new", "next", "nor", "not", "null", "of", "on",
    "open", "or", "others", "out", "package", "port", "postponed", "procedure", "process",
    "protected", "pure", "range", "record", "register", "reject", "release", "rem", "report",
    "return", "rol", "ror", "select", "severity", "shared", "signal", "sla", "sll", "sra",
    "srl", "subtype", "then", "to", "transport", "type", "unaffected", "units", "until", "use",
    "variable", "wait", "when", "while", "with", "xnor", "xor",
];

/// Returns `true` if `word` is a VHDL reserved word, ignoring case.
#[must_use]
pub fn is_reserved_word(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    KEYWORDS.binary_search(&lower.as_str()).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_table_is_sorted() {
        let mut sorted = KEYWORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, KEYWORDS);
    }

    #[test]
    fn reserved_words_ignore_case() {
        assert!(is_reserved_word("entity"));
        assert!(is_reserved_word("ENTITY"));
        assert!(is_reserved_word("Architecture"));
        assert!(!is_reserved_word("clk"));
    }

    #[test]
    fn is_keyword_matches_any_case() {
        let token = Token::new(TokenKind::Keyword, "BEGIN");
        assert!(token.is_keyword("begin"));
        assert!(!Token::new(TokenKind::Identifier, "begin").is_keyword("begin"));
    }

    #[test]
    fn rendered_text() {
        assert_eq!(Token::carriage_return().rendered(), "\n");
        assert_eq!(Token::blank_line().rendered(), "");
        assert_eq!(Token::whitespace(3).rendered(), "   ");
    }
}
