//! Structural indent model.
//!
//! Walks the token stream once, tracking nesting of design units,
//! subprograms, processes, `if`/`case`/`loop`/`generate` statements, records,
//! and parenthesized lists. The resulting level is written into the first
//! non-whitespace token of every line.

use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Region,
    If,
    Case,
    When,
    Paren,
}

/// A construct whose region opens at a later keyword (`is`, `begin`, `then`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Region,
    If,
    Case,
}

/// Keywords that open a region once followed by `is` or `begin`.
const DEFERRED_REGIONS: &[&str] = &[
    "entity",
    "architecture",
    "package",
    "configuration",
    "function",
    "procedure",
    "process",
    "block",
];

/// Keywords that open a region immediately.
const IMMEDIATE_REGIONS: &[&str] = &["loop", "generate", "record", "units", "protected"];

/// Assigns indent levels to the line-leading tokens of `tokens`.
pub(crate) fn assign_indents(tokens: &mut [Token]) {
    let mut stack: Vec<Frame> = Vec::new();
    let mut pending: Option<Pending> = None;
    let mut in_end = false;
    let mut at_line_start = true;
    let mut after_colon = false;

    for token in tokens.iter_mut() {
        token.indent = None;
        match token.kind {
            TokenKind::CarriageReturn => {
                at_line_start = true;
                continue;
            }
            TokenKind::Whitespace | TokenKind::BlankLine => continue,
            _ => {}
        }

        if at_line_start {
            token.indent = Some(line_level(token, &stack, pending));
            at_line_start = false;
        }

        if token.kind == TokenKind::Comment {
            continue;
        }

        let inside_paren = stack.last() == Some(&Frame::Paren);
        let colon_before = after_colon;
        after_colon = token.is_delimiter(":");

        if token.kind == TokenKind::Delimiter {
            match token.value.as_str() {
                "(" => stack.push(Frame::Paren),
                ")" if inside_paren => {
                    stack.pop();
                }
                ";" if !inside_paren => {
                    pending = None;
                    in_end = false;
                }
                _ => {}
            }
            continue;
        }

        if token.kind != TokenKind::Keyword || inside_paren || in_end {
            continue;
        }

        let word = token.value.to_ascii_lowercase();
        match word.as_str() {
            "end" => {
                if stack.last() == Some(&Frame::When) {
                    stack.pop();
                }
                stack.pop();
                pending = None;
                in_end = true;
            }
            "entity" | "configuration" if colon_before => {}
            "component" => {
                if !colon_before {
                    stack.push(Frame::Region);
                }
            }
            w if DEFERRED_REGIONS.contains(&w) => pending = Some(Pending::Region),
            w if IMMEDIATE_REGIONS.contains(&w) => {
                stack.push(Frame::Region);
                pending = None;
            }
            "is" => {
                match pending {
                    Some(Pending::Region) => stack.push(Frame::Region),
                    Some(Pending::Case) => stack.push(Frame::Case),
                    _ => {}
                }
                pending = None;
            }
            "begin" => {
                if pending == Some(Pending::Region) {
                    stack.push(Frame::Region);
                }
                pending = None;
            }
            "if" => pending = Some(Pending::If),
            "then" => {
                if pending == Some(Pending::If) {
                    stack.push(Frame::If);
                }
                pending = None;
            }
            "case" => pending = Some(Pending::Case),
            "when" => {
                if stack.last() == Some(&Frame::Case) {
                    stack.push(Frame::When);
                }
            }
            _ => {}
        }
    }
}

/// Level of a line, decided by its first token and the nesting before it.
fn line_level(token: &Token, stack: &[Frame], pending: Option<Pending>) -> usize {
    let depth = stack.len();
    let top = stack.last().copied();

    if token.is_delimiter(")") && top == Some(Frame::Paren) {
        return depth - 1;
    }
    if token.kind != TokenKind::Keyword {
        return depth;
    }

    let word = token.value.to_ascii_lowercase();
    match word.as_str() {
        "end" if top == Some(Frame::When) => depth.saturating_sub(2),
        "end" => depth.saturating_sub(1),
        "begin" if pending == Some(Pending::Region) => depth,
        "begin" => depth.saturating_sub(1),
        "elsif" | "else" if top == Some(Frame::If) => depth - 1,
        "when" if top == Some(Frame::When) => depth - 1,
        _ => depth,
    }
}
