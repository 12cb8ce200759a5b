//! Application context that holds resolved configuration
//!
//! The configuration file is located in this order:
//! 1. `--config` flag
//! 2. `REGCOPY_CONFIG` environment variable
//! 3. `application.yaml` in the working directory
//! 4. `<config dir>/regcopy/application.yaml`
//!
//! Values are then layered: defaults, the file, `REGCOPY_*` environment
//! variables. Once built, the context is passed as read-only to the commands.

use crate::format::ColorChoice;
use libregcopy::{Config, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "REGCOPY_CONFIG";

/// Configuration file name looked up in the working and config directories.
pub const CONFIG_FILE_NAME: &str = "application.yaml";

/// How much the user wants to see
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    /// Warnings and errors only (-q)
    Quiet,
    /// Default
    Normal,
    /// -v
    Verbose,
    /// -vv and above
    VeryVerbose,
}

impl VerbosityLevel {
    /// Map the `-v` count and `-q` flag to a level. `-q` wins.
    pub fn from_flags(count: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match count {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::VeryVerbose,
        }
    }
}

/// Application context with resolved configuration and runtime state
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Resolved configuration
    pub config: Config,
    /// File the configuration was read from
    pub config_path: PathBuf,
    pub color: ColorChoice,
    pub verbosity: VerbosityLevel,
}

impl AppContext {
    /// Locate, load and validate the configuration.
    pub fn build(
        cli_config: Option<&Path>,
        color: ColorChoice,
        verbosity: VerbosityLevel,
    ) -> Result<Self> {
        let config_path = get_config_path(cli_config);
        tracing::debug!(path = %config_path.display(), "loading configuration");

        let config = Config::load(&config_path)?;
        config.validate()?;

        Ok(Self {
            config,
            config_path,
            color,
            verbosity,
        })
    }

    /// Context around an already loaded configuration.
    #[cfg(test)]
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            config_path: PathBuf::from(CONFIG_FILE_NAME),
            color: ColorChoice::Never,
            verbosity: VerbosityLevel::Normal,
        }
    }
}

/// Get the configuration file path for this process.
pub fn get_config_path(cli_config: Option<&Path>) -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve_config_path(
        cli_config,
        env::var(CONFIG_ENV).ok(),
        &cwd,
        dirs::config_dir(),
    )
}

/// First candidate wins. When nothing exists the working directory file is
/// returned so the load error names it.
pub fn resolve_config_path(
    cli_config: Option<&Path>,
    env_config: Option<String>,
    cwd: &Path,
    config_dir: Option<PathBuf>,
) -> PathBuf {
    if let Some(path) = cli_config {
        return path.to_path_buf();
    }

    if let Some(path) = env_config.filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }

    let local = cwd.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return local;
    }

    if let Some(dir) = config_dir {
        let user = dir.join("regcopy").join(CONFIG_FILE_NAME);
        if user.is_file() {
            return user;
        }
    }

    local
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
