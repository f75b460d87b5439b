//! # vsg-rules
//!
//! Built-in style rules and the rule registry for the VHDL style guide.
//!
//! ## Available Rules
//!
//! | Id | Phase | Description |
//! |----|-------|-------------|
//! | `whitespace_002` | 1 | Replaces tab characters with spaces |
//! | `whitespace_001` | 1 | Removes whitespace at the end of lines |
//! | `comma_001` | 2 | Single space after commas |
//! | `blank_line_001` | 3 | Limits consecutive blank lines |
//! | `indent_001` | 4 | Indents lines by structural level |
//! | `*_500` | 6 | Keyword case (`entity`, `architecture`, `process`, ...) |
//! | `length_001` | 7 | Line length limit (not fixable) |
//!
//! Additional rules can be declared in TOML files of a local rules
//! directory (see [`local`]) or registered directly on a [`RuleRegistry`].
//!
//! ## Usage
//!
//! ```ignore
//! use vsg_core::Scheduler;
//! use vsg_rules::RuleRegistry;
//!
//! let registry = RuleRegistry::load(config.local_rules.as_deref())?;
//! let scheduler = Scheduler::builder()
//!     .rules(registry.into_rules())
//!     .config(config)
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod blank_line;
mod comma;
mod indentation;
mod keyword_case;
mod length;
pub mod local;
mod options;
mod registry;
mod whitespace;

pub use blank_line::ConsecutiveBlankLines;
pub use comma::SpaceAfterComma;
pub use indentation::Indentation;
pub use keyword_case::{keyword_case_rules, KeywordCase};
pub use length::LineLength;
pub use options::Case;
pub use registry::{builtin_rules, maximum_phase, LoadError, RuleRegistry};
pub use whitespace::{TabCharacters, TrailingWhitespace};

/// Re-export core types for convenience.
pub use vsg_core::{Rule, RuleBox, Violation};
