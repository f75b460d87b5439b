//! Check command implementation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use vsg_core::{
    AnalyzeOptions, Document, FixFilter, FixOptions, RunResult, Scheduler, MAX_PHASE,
};

use super::output::Reporter;
use crate::OutputFormat;

/// Options of one check run, taken from the command line and config.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Run a fix pass before analysis and write files back.
    pub fix: bool,
    /// Last phase to fix.
    pub fix_phase: Option<u8>,
    /// Phases to skip in both passes.
    pub skip_phases: Vec<u8>,
    /// Keep analyzing after a phase with errors.
    pub all_phases: bool,
    /// Copy files to `<file>.bak` before fixing.
    pub backup: bool,
    /// Report format.
    pub format: OutputFormat,
    /// Restricts which violations the fix pass resolves.
    pub fix_only: Option<FixFilter>,
}

impl CheckOptions {
    fn analyze_options(&self) -> AnalyzeOptions {
        self.skip_phases
            .iter()
            .fold(AnalyzeOptions::new(), |o, &p| o.skip_phase(p))
            .all_phases(self.all_phases)
    }

    fn fix_options(&self) -> FixOptions {
        self.skip_phases
            .iter()
            .fold(FixOptions::new(), |o, &p| o.skip_phase(p))
            .up_to_phase(self.fix_phase.unwrap_or(MAX_PHASE))
            .filter(self.fix_only.clone())
    }
}

/// Expands glob patterns into a list of files.
///
/// Patterns without glob characters are taken as plain paths, so a missing
/// file is reported when it is read.
///
/// # Errors
///
/// Returns an error if a pattern is not a valid glob.
pub fn expand_files(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            files.push(PathBuf::from(pattern));
            continue;
        }
        let mut matched = glob::glob(pattern)
            .with_context(|| format!("Invalid file pattern: {pattern}"))?
            .filter_map(std::result::Result::ok)
            .filter(|p| p.is_file())
            .collect::<Vec<_>>();
        if matched.is_empty() {
            tracing::warn!("No files match {pattern}");
        }
        matched.sort();
        files.append(&mut matched);
    }
    Ok(files)
}

/// Path of the backup copy of `file`.
#[must_use]
pub fn backup_path(file: &Path) -> PathBuf {
    let mut name = OsString::from(file.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// Runs fix (optionally) and analysis over every file and reports results.
///
/// A file that cannot be read, backed up, or written is reported as failed
/// and the run continues with the next file.
///
/// Returns `true` if any file failed or still has error-class violations.
///
/// # Errors
///
/// Returns an error if the report cannot be serialized.
pub fn run(scheduler: &mut Scheduler, files: &[PathBuf], options: &CheckOptions) -> Result<bool> {
    let analyze_options = options.analyze_options();
    let fix_options = options.fix_options();
    let mut reporter = Reporter::new(options.format);
    let mut failed = false;

    tracing::info!(
        "Analyzing {} file(s) with {} rules",
        files.len(),
        scheduler.rule_count()
    );

    for file in files {
        match check_file(scheduler, file, options, &analyze_options, &fix_options) {
            Ok((doc, result)) => {
                failed |= result.has_errors;
                reporter.file(file, &result, &doc)?;
            }
            Err(e) => {
                tracing::warn!("{e:#}");
                failed = true;
                reporter.failure(file, &format!("{e:#}"));
            }
        }
    }

    reporter.finish()?;
    Ok(failed)
}

fn check_file(
    scheduler: &mut Scheduler,
    file: &Path,
    options: &CheckOptions,
    analyze_options: &AnalyzeOptions,
    fix_options: &FixOptions,
) -> Result<(Document, RunResult)> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("Cannot read {}", file.display()))?;
    let mut doc = Document::parse(&source);

    if options.fix {
        if options.backup {
            let backup = backup_path(file);
            std::fs::copy(file, &backup)
                .with_context(|| format!("Failed to write backup: {}", backup.display()))?;
        }
        let summary = scheduler.fix(&mut doc, fix_options);
        tracing::debug!(
            "Fixed {} violation(s) in {}",
            summary.fixed,
            file.display()
        );
        std::fs::write(file, doc.render())
            .with_context(|| format!("Failed to write {}", file.display()))?;
    }

    let result = scheduler.analyze(&doc, analyze_options);
    Ok((doc, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use vsg_core::Config;
    use vsg_rules::RuleRegistry;

    fn scheduler() -> Scheduler {
        Scheduler::builder()
            .rules(RuleRegistry::builtin().into_rules())
            .build()
            .unwrap()
    }

    fn options(fix: bool) -> CheckOptions {
        CheckOptions {
            fix,
            fix_phase: None,
            skip_phases: Vec::new(),
            all_phases: false,
            backup: fix,
            format: OutputFormat::Summary,
            fix_only: None,
        }
    }

    #[test]
    fn fix_writes_file_and_backup() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("e.vhd");
        fs::write(&file, "ENTITY e is  \nend entity;\n").unwrap();

        let failed = run(&mut scheduler(), &[file.clone()], &options(true)).unwrap();
        assert!(!failed);
        assert_eq!(fs::read_to_string(&file).unwrap(), "entity e is\nend entity;\n");
        assert_eq!(
            fs::read_to_string(backup_path(&file)).unwrap(),
            "ENTITY e is  \nend entity;\n"
        );
    }

    #[test]
    fn analysis_only_leaves_file_untouched() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("e.vhd");
        fs::write(&file, "ENTITY e is\nend entity;\n").unwrap();

        let failed = run(&mut scheduler(), &[file.clone()], &options(false)).unwrap();
        assert!(failed);
        assert_eq!(fs::read_to_string(&file).unwrap(), "ENTITY e is\nend entity;\n");
        assert!(!backup_path(&file).exists());
    }

    #[test]
    fn unreadable_file_fails_without_stopping_the_run() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.vhd");
        let good = tmp.path().join("good.vhd");
        fs::write(&good, "ENTITY e is\nend entity;\n").unwrap();

        let failed = run(&mut scheduler(), &[missing.clone(), good.clone()], &options(true)).unwrap();
        assert!(failed);
        assert!(!missing.exists());
        assert_eq!(fs::read_to_string(&good).unwrap(), "entity e is\nend entity;\n");
    }

    #[test]
    fn unwritable_backup_skips_only_that_file() {
        let tmp = TempDir::new().unwrap();
        let blocked = tmp.path().join("blocked.vhd");
        let good = tmp.path().join("good.vhd");
        fs::write(&blocked, "ENTITY b is\nend entity;\n").unwrap();
        fs::create_dir(backup_path(&blocked)).unwrap();
        fs::write(&good, "ENTITY e is\nend entity;\n").unwrap();

        let failed = run(&mut scheduler(), &[blocked.clone(), good.clone()], &options(true)).unwrap();
        assert!(failed);
        assert_eq!(fs::read_to_string(&blocked).unwrap(), "ENTITY b is\nend entity;\n");
        assert_eq!(fs::read_to_string(&good).unwrap(), "entity e is\nend entity;\n");
    }

    #[test]
    fn directory_is_reported_as_failed() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("good.vhd");
        fs::write(&good, "entity e is\nend entity;\n").unwrap();

        let failed = run(
            &mut scheduler(),
            &[tmp.path().to_path_buf(), good.clone()],
            &options(false),
        )
        .unwrap();
        assert!(failed);
    }

    #[test]
    fn fix_only_limits_fixes() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("e.vhd");
        fs::write(&file, "ENTITY e is\nEND entity;\n").unwrap();

        let config = Config::parse("[fix_only.rule]\nentity_500 = \"all\"\n").unwrap();
        let mut opts = options(true);
        opts.fix_only = config.fix_only;

        let failed = run(&mut scheduler(), &[file.clone()], &opts).unwrap();
        assert!(failed);
        assert_eq!(fs::read_to_string(&file).unwrap(), "entity e is\nEND entity;\n");
    }

    #[test]
    fn expand_globs_sorted() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.vhd"), "").unwrap();
        fs::write(tmp.path().join("a.vhd"), "").unwrap();
        fs::write(tmp.path().join("c.txt"), "").unwrap();

        let pattern = tmp.path().join("*.vhd").to_string_lossy().to_string();
        let files = expand_files(&[pattern, "plain.vhd".to_string()]).unwrap();
        assert_eq!(
            files,
            vec![
                tmp.path().join("a.vhd"),
                tmp.path().join("b.vhd"),
                PathBuf::from("plain.vhd"),
            ]
        );
    }

    #[test]
    fn backup_path_appends_extension() {
        assert_eq!(
            backup_path(Path::new("rtl/top.vhd")),
            PathBuf::from("rtl/top.vhd.bak")
        );
    }
}
