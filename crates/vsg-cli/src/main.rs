//! vsg CLI tool.
//!
//! Usage:
//! ```bash
//! vsg [OPTIONS] [FILES]...
//! vsg --fix --backup rtl/*.vhd
//! vsg --list-rules
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vsg_core::Scheduler;
use vsg_rules::RuleRegistry;

mod commands;
mod config_resolver;

/// Analyzes VHDL files for style guide violations and fixes them
#[derive(Parser)]
#[command(name = "vsg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Files to analyze (glob patterns are expanded)
    files: Vec<String>,

    /// Fix issues found
    #[arg(long)]
    fix: bool,

    /// Fix issues up to and including this phase
    #[arg(long, value_name = "N", requires = "fix", value_parser = phase_parser())]
    fix_phase: Option<u8>,

    /// Skip a phase during analysis and fixing (repeatable or comma-separated)
    #[arg(long, value_name = "N", value_delimiter = ',', value_parser = phase_parser())]
    skip_phase: Vec<u8>,

    /// Run every phase even when earlier phases report errors
    #[arg(long)]
    all_phases: bool,

    /// Copy each file to `<file>.bak` before fixing it
    #[arg(short, long, requires = "fix")]
    backup: bool,

    /// Directory with local rule definitions
    #[arg(long, value_name = "DIR")]
    local_rules: Option<PathBuf>,

    /// Configuration file, TOML or JSON (repeatable, merged in order)
    #[arg(short, long, value_name = "FILE")]
    config: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "vsg")]
    output_format: OutputFormat,

    /// Write the effective configuration to a JSON file and exit
    #[arg(long, value_name = "FILE")]
    output_configuration: Option<PathBuf>,

    /// Display the effective configuration of one rule and exit
    #[arg(long, value_name = "ID")]
    rule_configuration: Option<String>,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output format for reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Per-file violation table with a severity summary.
    #[default]
    Vsg,
    /// One line per violation, for editor integration.
    Syntastic,
    /// One status line per file.
    Summary,
    /// JSON array of per-file results.
    Json,
    /// Rendered diagnostics with source excerpts.
    Fancy,
}

fn phase_parser() -> clap::builder::RangedI64ValueParser<u8> {
    clap::value_parser!(u8).range(1..=i64::from(vsg_core::MAX_PHASE))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let sources = config_resolver::resolve(&cwd, &cli.config);
    let mut config = config_resolver::load(&sources)?;
    if let Some(dir) = &cli.local_rules {
        config.local_rules = Some(dir.clone());
    }

    let registry =
        RuleRegistry::load(config.local_rules.as_deref()).context("Failed to load rules")?;

    let mut patterns = cli.files.clone();
    patterns.append(&mut config.file_list);
    let export = commands::rule_config::Export {
        local_rules: config.local_rules.clone(),
        file_list: patterns.clone(),
        severity: config.severity.clone(),
    };
    let fix_only = config.fix_only.clone();

    let mut scheduler = Scheduler::builder()
        .rules(registry.into_rules())
        .config(config)
        .build()
        .context("Invalid configuration")?;

    if cli.list_rules {
        commands::list_rules::run(&scheduler);
        return Ok(());
    }

    if let Some(path) = &cli.output_configuration {
        commands::rule_config::write(&scheduler, &export, path)?;
        return Ok(());
    }

    if let Some(id) = &cli.rule_configuration {
        if !commands::rule_config::print(&scheduler, &export, id)? {
            std::process::exit(1);
        }
        return Ok(());
    }

    if patterns.is_empty() {
        bail!("No files to analyze: pass FILES or set `file_list` in a configuration file");
    }
    let files = commands::check::expand_files(&patterns)?;

    let options = commands::check::CheckOptions {
        fix: cli.fix,
        fix_phase: cli.fix_phase,
        skip_phases: cli.skip_phase,
        all_phases: cli.all_phases,
        backup: cli.backup,
        format: cli.output_format,
        fix_only,
    };

    let failed = commands::check::run(&mut scheduler, &files, &options)?;

    // Exit with error code if any file still has errors
    if failed {
        std::process::exit(1);
    }

    Ok(())
}
