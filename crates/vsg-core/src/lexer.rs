//! Line-preserving tokenizer for VHDL source text.
//!
//! Unlike a compiler lexer, this keeps every byte of layout: whitespace runs,
//! comments, and line ends all become tokens so that the token stream can be
//! edited and written back. Every source line produces its tokens followed by
//! a [`TokenKind::CarriageReturn`]; an empty line produces a
//! [`TokenKind::BlankLine`] marker first.

use crate::token::{is_reserved_word, Token, TokenKind};

/// Bit-string base specifiers (`x"FF"`, `ub"0101"`, ...).
const BIT_STRING_BASES: &[&str] = &["b", "o", "x", "d", "ub", "uo", "ux", "sb", "so", "sx"];

/// Lexes source text into a layout-preserving token sequence.
#[must_use]
pub fn lex(source: &str) -> Vec<Token> {
    let mut lexer = Lexer {
        chars: source.chars().filter(|&c| c != '\r').collect(),
        pos: 0,
        tokens: Vec::new(),
    };
    lexer.lex_all();
    lexer.tokens
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    fn lex_all(&mut self) {
        let mut line_start = true;
        while self.pos < self.chars.len() {
            let c = self.chars[self.pos];
            if c == '\n' {
                if line_start {
                    self.tokens.push(Token::blank_line());
                }
                self.pos += 1;
                self.tokens.push(Token::carriage_return());
                line_start = true;
                continue;
            }
            line_start = false;
            let token = self.next_token();
            self.tokens.push(token);
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.pos < self.chars.len() && pred(self.chars[self.pos]) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn next_token(&mut self) -> Token {
        let c = self.chars[self.pos];

        if c == ' ' || c == '\t' {
            let text = self.take_while(|c| c == ' ' || c == '\t');
            return Token::new(TokenKind::Whitespace, text);
        }
        if c == '-' && self.peek_at(1) == Some('-') {
            let text = self.take_while(|c| c != '\n');
            return Token::new(TokenKind::Comment, text);
        }
        if c.is_ascii_alphabetic() {
            return self.word();
        }
        if c == '\\' {
            return self.extended_identifier();
        }
        if c.is_ascii_digit() {
            return self.number();
        }
        if c == '"' {
            let text = self.string_body();
            return Token::new(TokenKind::Literal, text);
        }
        if c == '\'' && self.is_character_literal() {
            let text: String = self.chars[self.pos..self.pos + 3].iter().collect();
            self.pos += 3;
            return Token::new(TokenKind::Literal, text);
        }
        self.delimiter()
    }

    fn word(&mut self) -> Token {
        let text = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let lower = text.to_ascii_lowercase();
        if self.peek_at(0) == Some('"') && BIT_STRING_BASES.contains(&lower.as_str()) {
            let body = self.string_body();
            return Token::new(TokenKind::Literal, format!("{text}{body}"));
        }
        if is_reserved_word(&text) {
            Token::new(TokenKind::Keyword, text)
        } else {
            Token::new(TokenKind::Identifier, text)
        }
    }

    fn extended_identifier(&mut self) -> Token {
        let start = self.pos;
        self.pos += 1;
        while self.pos < self.chars.len() && self.chars[self.pos] != '\n' {
            let c = self.chars[self.pos];
            self.pos += 1;
            if c == '\\' {
                if self.peek_at(0) == Some('\\') {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        Token::new(TokenKind::Identifier, text)
    }

    fn number(&mut self) -> Token {
        let mut text = self.take_while(|c| c.is_ascii_digit() || c == '_');
        if self.peek_at(0) == Some('#') {
            self.pos += 1;
            text.push('#');
            text.push_str(&self.take_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.'));
            if self.peek_at(0) == Some('#') {
                self.pos += 1;
                text.push('#');
            }
        } else if self.peek_at(0) == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit())
        {
            self.pos += 1;
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit() || c == '_'));
        }
        if matches!(self.peek_at(0), Some('e' | 'E')) {
            let sign = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_at = if sign { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                let prefix: String = self.chars[self.pos..self.pos + digit_at].iter().collect();
                self.pos += digit_at;
                text.push_str(&prefix);
                text.push_str(&self.take_while(|c| c.is_ascii_digit() || c == '_'));
            }
        }
        Token::new(TokenKind::Literal, text)
    }

    /// Consumes a `"..."` string (with `""` escapes) starting at the opening quote.
    fn string_body(&mut self) -> String {
        let start = self.pos;
        self.pos += 1;
        while self.pos < self.chars.len() && self.chars[self.pos] != '\n' {
            let c = self.chars[self.pos];
            self.pos += 1;
            if c == '"' {
                if self.peek_at(0) == Some('"') {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// A tick starts a character literal unless it follows a name (attribute tick).
    fn is_character_literal(&self) -> bool {
        if self.peek_at(2) != Some('\'') || self.peek_at(1) == Some('\n') {
            return false;
        }
        let previous = self.tokens.iter().rev().find(|t| !t.is_whitespace());
        !matches!(
            previous,
            Some(t) if t.kind == TokenKind::Identifier || t.is_delimiter(")") || t.is_keyword("all")
        )
    }

    fn delimiter(&mut self) -> Token {
        const COMPOUND: &[&str] = &["=>", "<=", ">=", ":=", "/=", "**", "<>"];
        if let Some(next) = self.peek_at(1) {
            let pair: String = [self.chars[self.pos], next].iter().collect();
            if COMPOUND.contains(&pair.as_str()) {
                self.pos += 2;
                return Token::new(TokenKind::Delimiter, pair);
            }
        }
        let c = self.chars[self.pos];
        self.pos += 1;
        Token::new(TokenKind::Delimiter, c.to_string())
    }
}
