//! Shared output formatting for check results.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;
use vsg_core::{Document, RunResult, SeverityKind, ViolationDiagnostic, MAX_PHASE};

use crate::OutputFormat;

const RULE_WIDTH: usize = 28;

/// Result of one file, as serialized by the JSON format.
#[derive(Debug, Serialize)]
pub struct FileReport {
    /// The analyzed file.
    pub file: PathBuf,
    /// Why the file could not be processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Analysis result; empty when `error` is set.
    #[serde(flatten)]
    pub result: RunResult,
}

/// Prints results file by file, or collects them for formats that need the
/// whole run.
pub struct Reporter {
    format: OutputFormat,
    collected: Vec<FileReport>,
}

impl Reporter {
    /// Creates a reporter for `format`.
    #[must_use]
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            collected: Vec::new(),
        }
    }

    /// Reports the result of one file.
    ///
    /// # Errors
    ///
    /// Returns an error if the result cannot be serialized.
    pub fn file(&mut self, file: &Path, result: &RunResult, doc: &Document) -> Result<()> {
        match self.format {
            OutputFormat::Vsg => print!("{}", format_vsg(file, result)),
            OutputFormat::Syntastic => print!("{}", format_syntastic(file, result)),
            OutputFormat::Summary => println!("{}", format_summary(file, result)),
            OutputFormat::Fancy => print_fancy(file, result, doc),
            OutputFormat::Json => self.collected.push(FileReport {
                file: file.to_path_buf(),
                error: None,
                result: result.clone(),
            }),
        }
        Ok(())
    }

    /// Reports a file that could not be processed.
    pub fn failure(&mut self, file: &Path, message: &str) {
        match self.format {
            OutputFormat::Vsg => print!("{}", format_vsg_failure(file, message)),
            OutputFormat::Syntastic => println!("ERROR: {}(0) io -- {message}", file.display()),
            OutputFormat::Summary | OutputFormat::Fancy => {
                println!("{}", format_failure_summary(file, message));
            }
            OutputFormat::Json => self.collected.push(FileReport {
                file: file.to_path_buf(),
                error: Some(message.to_string()),
                result: RunResult::default(),
            }),
        }
    }

    /// Flushes collected results.
    ///
    /// # Errors
    ///
    /// Returns an error if the results cannot be serialized.
    pub fn finish(self) -> Result<()> {
        if self.format == OutputFormat::Json {
            let json = serde_json::to_string_pretty(&self.collected)?;
            println!("{json}");
        }
        Ok(())
    }
}

fn join_lines(lines: &[String]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn file_header(file: &Path) -> Vec<String> {
    let rule = "=".repeat(80);
    vec![rule.clone(), format!("File:  {}", file.display()), rule]
}

/// Per-file table of violations followed by a severity summary.
#[must_use]
pub fn format_vsg(file: &Path, result: &RunResult) -> String {
    let separator = format!(
        "{}+{}+{}+{}+{}",
        "-".repeat(7),
        "-".repeat(RULE_WIDTH + 2),
        "-".repeat(10),
        "-".repeat(8),
        "-".repeat(30)
    );

    let mut lines = file_header(file);
    lines.push(format!("Phase {} of {MAX_PHASE}... Reporting", result.last_phase));
    lines.push(format!("Total Rules Checked: {}", result.rules_ran));
    lines.push(format!("Total Violations:    {}", result.total_violations()));
    lines.extend(
        result
            .severity_counts
            .iter()
            .map(|(severity, count)| format!("  {severity:<8}: {count:>5}")),
    );

    let violations = result.violations_by_line();
    if !violations.is_empty() {
        lines.push(separator.clone());
        lines.push(format!(
            " Phase | {:<RULE_WIDTH$} | Severity | Line   | Solution",
            "Rule"
        ));
        lines.push(separator.clone());
        lines.extend(violations.into_iter().map(|(report, violation)| {
            format!(
                " {:>5} | {:<RULE_WIDTH$} | {:<8} | {:>6} | {}",
                report.phase, report.rule, report.severity, violation.line, violation.solution
            )
        }));
        lines.push(separator);
    }
    join_lines(&lines)
}

fn format_vsg_failure(file: &Path, message: &str) -> String {
    let mut lines = file_header(file);
    lines.push(format!("ERROR: {message}"));
    join_lines(&lines)
}

/// One line per violation: `ERROR: file(line) rule -- solution`.
#[must_use]
pub fn format_syntastic(file: &Path, result: &RunResult) -> String {
    result
        .violations_by_line()
        .into_iter()
        .map(|(report, violation)| {
            let level = match report.kind {
                SeverityKind::Error => "ERROR",
                SeverityKind::Warning => "WARNING",
            };
            format!(
                "{level}: {}({}) {} -- {}\n",
                file.display(),
                violation.line,
                report.rule,
                violation.solution
            )
        })
        .collect()
}

/// One status line for the file.
#[must_use]
pub fn format_summary(file: &Path, result: &RunResult) -> String {
    let status = if result.has_errors {
        "ERROR"
    } else if result.total_violations() > 0 {
        "WARNING"
    } else {
        "OK"
    };
    let counts = result
        .severity_counts
        .iter()
        .map(|(name, count)| format!("{name}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "File: {} {status} (phase {} of {MAX_PHASE}, {} rules checked) [{counts}]",
        file.display(),
        result.last_phase,
        result.rules_ran
    )
}

/// Status line for a file that could not be processed.
#[must_use]
pub fn format_failure_summary(file: &Path, message: &str) -> String {
    format!("File: {} FAILED ({message})", file.display())
}

fn print_fancy(file: &Path, result: &RunResult, doc: &Document) {
    let source = doc.render();
    let name = file.display().to_string();
    for (report, violation) in result.violations_by_line() {
        let diagnostic = ViolationDiagnostic::new(violation, report.kind, doc);
        let report = miette::Report::new(diagnostic)
            .with_source_code(miette::NamedSource::new(&name, source.clone()));
        println!("{report:?}");
    }
    println!("{}", format_summary(file, result));
}
