//! # vsg-core
//!
//! Rule execution engine for the VHDL style guide.
//!
//! This crate provides the foundational types for checking and fixing VHDL
//! source style. It includes:
//!
//! - [`Document`], the mutable token sequence of one source file
//! - [`Rule`] trait for style checks that can fix what they find
//! - [`Scheduler`] for running rules phase by phase
//! - [`SeverityPolicy`] for error/warning/disabled classification
//! - [`Violation`] for representing findings
//!
//! ## Example
//!
//! ```ignore
//! use vsg_core::{AnalyzeOptions, Document, FixOptions, Scheduler};
//!
//! let mut scheduler = Scheduler::builder()
//!     .rules(my_rules())
//!     .config(config)
//!     .build()?;
//!
//! let mut doc = Document::parse(&source);
//! scheduler.fix(&mut doc, &FixOptions::new());
//! let result = scheduler.analyze(&doc, &AnalyzeOptions::new());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod document;
mod indent;
mod lexer;
mod rule;
mod scheduler;
mod severity;
mod token;
mod types;

pub use config::{
    AllLines, Config, ConfigError, FixFilter, LineSelection, OptionError, RuleConfig,
    SeverityDefinition, GLOBAL_RULE,
};
pub use document::{Document, TokenSpan};
pub use lexer::lex;
pub use rule::{Rule, RuleBox};
pub use scheduler::{
    rules_by_phase, AnalyzeOptions, FixOptions, Scheduler, SchedulerBuilder, MAX_PHASE,
    MAX_SUBPHASE,
};
pub use severity::{Classification, SeverityKind, SeverityPolicy, ERROR, WARNING};
pub use token::{is_reserved_word, Token, TokenKind};
pub use types::{FixAction, FixSummary, RuleReport, RunResult, Violation, ViolationDiagnostic};
