//! The mutable token document rules analyze and fix.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::indent::assign_indents;
use crate::lexer::lex;
use crate::token::{Token, TokenKind};
use crate::types::FixAction;

/// A half-open range `[start, end)` of token indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenSpan {
    /// First token index in the span.
    pub start: usize,
    /// One past the last token index.
    pub end: usize,
}

impl TokenSpan {
    /// Creates a span covering `start..end`.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Creates a span covering a single token.
    #[must_use]
    pub fn single(index: usize) -> Self {
        Self {
            start: index,
            end: index + 1,
        }
    }

    /// Number of tokens in the span.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the span covers no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The span as a `Range`.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// An ordered, mutable token sequence for one source file.
///
/// The document owns its tokens; rules address them by index for the
/// duration of one pass. A derived line index maps lines to token ranges.
///
/// # Index invalidation
///
/// [`set_value`](Self::set_value) edits a token in place and keeps every
/// index valid. [`insert`](Self::insert) and [`remove`](Self::remove) shift
/// indices and mark the line index stale; [`reindex`](Self::reindex) must run
/// before the next line-based read.
#[derive(Debug, Clone, Default)]
pub struct Document {
    tokens: Vec<Token>,
    /// Token index at which each line starts; entry 0 is line 1.
    line_starts: Vec<usize>,
    /// Line number (1-based) of every token.
    token_lines: Vec<usize>,
    stale: bool,
}

impl Document {
    /// Creates a document from a token sequence and establishes its indexes.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut doc = Self {
            tokens,
            line_starts: Vec::new(),
            token_lines: Vec::new(),
            stale: true,
        };
        doc.reindex();
        doc.set_token_indent();
        doc
    }

    /// Tokenizes `source` and builds a document from it.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        Self::new(lex(source))
    }

    /// Writes the document back to source text.
    #[must_use]
    pub fn render(&self) -> String {
        self.tokens.iter().map(Token::rendered).collect()
    }

    // ── Reads ──

    /// All tokens in document order.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The token at `index`, if any.
    #[must_use]
    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if the document has no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns `true` if a structural edit happened since the last reindex.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Number of lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.assert_fresh();
        self.line_starts.len()
    }

    /// Line number (1-based) of the token at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn line_of(&self, index: usize) -> usize {
        self.assert_fresh();
        self.token_lines[index]
    }

    /// Token range of a 1-based `line`, including its line end.
    ///
    /// Returns an empty range for lines outside the document.
    #[must_use]
    pub fn line_range(&self, line: usize) -> Range<usize> {
        self.assert_fresh();
        if line == 0 || line > self.line_starts.len() {
            return self.tokens.len()..self.tokens.len();
        }
        let start = self.line_starts[line - 1];
        let end = self
            .line_starts
            .get(line)
            .copied()
            .unwrap_or(self.tokens.len());
        start..end
    }

    /// Rendered text of a 1-based `line` without its line end.
    #[must_use]
    pub fn line_text(&self, line: usize) -> String {
        self.tokens[self.line_range(line)]
            .iter()
            .filter(|t| !t.is_carriage_return())
            .map(Token::rendered)
            .collect()
    }

    /// Rendered text of every line.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        (1..=self.line_count()).map(|l| self.line_text(l)).collect()
    }

    /// Index of the first token of the line containing `index`.
    fn start_of_line(&self, index: usize) -> usize {
        self.tokens[..index]
            .iter()
            .rposition(Token::is_carriage_return)
            .map_or(0, |i| i + 1)
    }

    /// Zero-based column at which the token at `index` starts.
    ///
    /// Computed from the tokens themselves, so it is valid even on a stale
    /// document.
    #[must_use]
    pub fn column_of(&self, index: usize) -> usize {
        let start = self.start_of_line(index);
        self.tokens[start..index]
            .iter()
            .map(|t| t.rendered().chars().count())
            .sum()
    }

    /// Structural indent level of the line containing `index`.
    ///
    /// Returns `None` for blank lines or if the indent model has not been
    /// established for that line.
    #[must_use]
    pub fn indent_of(&self, index: usize) -> Option<usize> {
        let start = self.start_of_line(index);
        self.tokens[start..]
            .iter()
            .take_while(|t| !t.is_carriage_return())
            .find(|t| !t.is_layout())
            .and_then(|t| t.indent)
    }

    /// Byte offset of the token at `index` in the rendered document.
    #[must_use]
    pub fn byte_offset_of(&self, index: usize) -> usize {
        self.tokens[..index.min(self.tokens.len())]
            .iter()
            .map(|t| t.rendered().len())
            .sum()
    }

    // ── Mutations ──

    /// Replaces the value of a token in place.
    ///
    /// Token identity and every index stay valid.
    pub fn set_value(&mut self, index: usize, value: impl Into<String>) {
        if let Some(token) = self.tokens.get_mut(index) {
            token.value = value.into();
        }
    }

    /// Inserts `tokens` before `index`, shifting later tokens.
    pub fn insert(&mut self, index: usize, tokens: Vec<Token>) {
        let index = index.min(self.tokens.len());
        self.tokens.splice(index..index, tokens);
        self.stale = true;
    }

    /// Removes every token in `span`.
    pub fn remove(&mut self, span: TokenSpan) {
        let end = span.end.min(self.tokens.len());
        let start = span.start.min(end);
        self.tokens.drain(start..end);
        self.stale = true;
    }

    /// Applies one fix action to the tokens in `span`.
    pub fn apply(&mut self, span: TokenSpan, action: &FixAction) {
        match action {
            FixAction::Replace { value } => self.set_value(span.start, value.clone()),
            FixAction::AdjustWhitespace { width } => {
                let is_whitespace = self.token(span.start).is_some_and(Token::is_whitespace);
                match (is_whitespace, *width) {
                    (true, 0) => self.remove(TokenSpan::single(span.start)),
                    (true, w) => self.set_value(span.start, " ".repeat(w)),
                    (false, 0) => {}
                    (false, w) => self.insert(span.start, vec![Token::whitespace(w)]),
                }
            }
            FixAction::InsertWhitespace { width } => {
                if *width > 0 {
                    self.insert(span.start, vec![Token::whitespace(*width)]);
                }
            }
            FixAction::Remove => self.remove(span),
        }
    }

    /// Re-derives the line index after structural edits.
    pub fn reindex(&mut self) {
        self.line_starts.clear();
        self.token_lines.clear();
        self.token_lines.reserve(self.tokens.len());

        let mut line = 0;
        let mut at_line_start = true;
        for (i, token) in self.tokens.iter().enumerate() {
            if at_line_start {
                self.line_starts.push(i);
                line += 1;
                at_line_start = false;
            }
            self.token_lines.push(line);
            if token.is_carriage_return() {
                at_line_start = true;
            }
        }
        self.stale = false;
    }

    /// (Re)establishes the structural indent model on line-leading tokens.
    pub fn set_token_indent(&mut self) {
        assign_indents(&mut self.tokens);
    }

    /// Normalizes blank-line markers after structural edits.
    ///
    /// Lines that contain nothing but whitespace become a single
    /// [`TokenKind::BlankLine`] marker; markers on lines with content are
    /// dropped. Reindexes and re-establishes indents afterwards.
    pub fn fix_blank_lines(&mut self) {
        let mut normalized = Vec::with_capacity(self.tokens.len());
        let mut line: Vec<Token> = Vec::new();

        for token in std::mem::take(&mut self.tokens) {
            if token.is_carriage_return() {
                push_normalized_line(&mut normalized, std::mem::take(&mut line));
                normalized.push(token);
            } else {
                line.push(token);
            }
        }
        if line.iter().any(|t| !t.is_layout()) {
            push_normalized_line(&mut normalized, line);
        }

        self.tokens = normalized;
        self.reindex();
        self.set_token_indent();
    }

    fn assert_fresh(&self) {
        debug_assert!(
            !self.stale,
            "line index read after a structural edit without reindex()"
        );
    }
}

fn push_normalized_line(out: &mut Vec<Token>, line: Vec<Token>) {
    if line.iter().all(Token::is_layout) {
        out.push(Token::blank_line());
    } else {
        out.extend(line.into_iter().filter(|t| t.kind != TokenKind::BlankLine));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "entity e is\n  port (a : in bit);\nend entity;\n";

    #[test]
    fn line_index() {
        let doc = Document::parse(SOURCE);
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_of(0), 1);
        let port = doc.tokens().iter().position(|t| t.is_keyword("port")).unwrap();
        assert_eq!(doc.line_of(port), 2);
        assert_eq!(doc.column_of(port), 2);
        assert_eq!(doc.line_text(2), "  port (a : in bit);");
    }

    #[test]
    fn file_without_trailing_newline() {
        let doc = Document::parse("a;\nb;");
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.line_text(2), "b;");
        assert_eq!(doc.render(), "a;\nb;");
    }

    #[test]
    fn indent_of_any_token_in_line() {
        let doc = Document::parse(SOURCE);
        let bit = doc.tokens().iter().position(|t| t.value == "bit").unwrap();
        assert_eq!(doc.indent_of(bit), Some(1));
        assert_eq!(doc.indent_of(0), Some(0));
    }

    #[test]
    fn set_value_keeps_indexes() {
        let mut doc = Document::parse(SOURCE);
        doc.set_value(0, "ENTITY");
        assert!(!doc.is_stale());
        assert_eq!(doc.line_of(0), 1);
        assert!(doc.render().starts_with("ENTITY e is"));
    }

    #[test]
    fn structural_edits_mark_stale_until_reindex() {
        let mut doc = Document::parse(SOURCE);
        doc.insert(0, vec![Token::carriage_return()]);
        assert!(doc.is_stale());
        doc.reindex();
        assert_eq!(doc.line_count(), 4);
        assert_eq!(doc.line_of(1), 2);
    }

    #[test]
    fn apply_adjust_and_insert_whitespace() {
        let mut doc = Document::parse("a,b,  c");
        // tokens: a , b , <ws> c
        doc.apply(TokenSpan::single(4), &FixAction::AdjustWhitespace { width: 1 });
        doc.apply(TokenSpan::single(2), &FixAction::InsertWhitespace { width: 1 });
        doc.reindex();
        assert_eq!(doc.render(), "a, b, c");
    }

    #[test]
    fn adjust_to_zero_removes_whitespace() {
        let mut doc = Document::parse("x  ;");
        doc.apply(TokenSpan::single(1), &FixAction::AdjustWhitespace { width: 0 });
        doc.reindex();
        assert_eq!(doc.render(), "x;");
    }

    #[test]
    fn fix_blank_lines_normalizes_markers() {
        let mut doc = Document::parse("a;\n   \n\nb;\n");
        doc.fix_blank_lines();
        let blank_markers = doc
            .tokens()
            .iter()
            .filter(|t| t.kind == TokenKind::BlankLine)
            .count();
        assert_eq!(blank_markers, 2);
        assert_eq!(doc.render(), "a;\n\n\nb;\n");
        assert_eq!(doc.line_count(), 4);
    }

    #[test]
    fn fix_blank_lines_drops_marker_on_line_with_content() {
        let mut doc = Document::new(vec![
            Token::blank_line(),
            Token::new(TokenKind::Identifier, "a"),
            Token::carriage_return(),
        ]);
        doc.fix_blank_lines();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.render(), "a\n");
    }

    #[test]
    fn rendered_document_snapshot() {
        let mut doc = Document::parse("entity e is\nend entity;");
        doc.set_value(0, "ENTITY");
        insta::assert_snapshot!(doc.render(), @r"
        ENTITY e is
        end entity;
        ");
    }
}
