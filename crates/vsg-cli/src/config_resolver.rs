//! Configuration file resolution with global fallback.
//!
//! Resolves the configuration files using a deterministic priority order:
//!
//! 1. `--config` flags (explicit paths, merged in order)
//! 2. `{cwd}/vsg.toml` or `.vsg.toml`
//! 3. `$VSG_CONFIG_DIR/config.toml`, else `~/.vsg/config.toml` (global fallback)
//! 4. No config found → defaults

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use vsg_core::Config;

/// Where a configuration file was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config` flag.
    Explicit(PathBuf),
    /// Found in the working directory.
    Project(PathBuf),
    /// Loaded from the global config directory (`~/.vsg/`).
    Global(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` if the config was loaded from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_NAMES: &[&str] = &["vsg.toml", ".vsg.toml"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration files to load.
///
/// See module-level docs for resolution order.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: &[PathBuf]) -> Vec<ConfigSource> {
    resolve_inner(project_dir, explicit, global_config_dir())
}

/// Testable core: accepts `global_dir` as parameter to avoid env var races.
fn resolve_inner(
    project_dir: &Path,
    explicit: &[PathBuf],
    global_dir: Option<PathBuf>,
) -> Vec<ConfigSource> {
    if !explicit.is_empty() {
        return explicit
            .iter()
            .cloned()
            .map(ConfigSource::Explicit)
            .collect();
    }

    for name in PROJECT_CONFIG_NAMES {
        let candidate = project_dir.join(name);
        if candidate.exists() {
            tracing::debug!("Found project config: {}", candidate.display());
            return vec![ConfigSource::Project(candidate)];
        }
    }

    if let Some(dir) = global_dir {
        let candidate = dir.join(GLOBAL_CONFIG_NAME);
        if candidate.exists() {
            tracing::debug!("Found global config: {}", candidate.display());
            return vec![ConfigSource::Global(candidate)];
        }
    }

    vec![ConfigSource::Default]
}

/// Returns the global config directory path.
///
/// Resolution: `$VSG_CONFIG_DIR` > `~/.vsg/`
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("VSG_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".vsg"))
}

/// Loads and merges the configuration of every source, in order.
///
/// # Errors
///
/// Returns an error if a configuration file cannot be read or parsed.
pub fn load(sources: &[ConfigSource]) -> Result<Config> {
    let mut config = Config::new();
    for source in sources {
        let Some(path) = source.path() else {
            continue;
        };
        if source.is_global() {
            tracing::info!("Using global config: {}", path.display());
        }
        let next = Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?;
        config.merge(next);
    }
    Ok(config)
}
