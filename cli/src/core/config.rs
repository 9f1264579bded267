//! # calibrs Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads, merges and validates the settings a [`Calibre`] façade
//! is built from: the default calibre library, whether executed command lines
//! are logged, and the process execution defaults.
//!
//! ## Architecture
//!
//! The configuration system follows these principles:
//! - Configuration is loaded from multiple sources in order of precedence
//! - Paths are expanded (e.g., `~` to home directory)
//! - Configuration is validated for correctness before use
//! - The result converts into an immutable [`CalibreConfig`]
//!
//! Configuration sources (in order of precedence):
//! 1. Project-specific `.calibrs.toml` in current directory or ancestors
//! 2. User-specific `~/.config/calibrs/config.toml`
//! 3. Default values defined in the code
//!
//! ## Example File
//!
//! ```toml
//! library_path = "~/Calibre Library"
//! log_commands = true
//!
//! [exec]
//! max_buffer = 104857600
//! cwd = "~/books"
//! timeout_secs = 600
//!
//! [exec.env]
//! CALIBRE_CONFIG_DIRECTORY = "/tmp/calibre-config"
//! ```
//!
//! [`Calibre`]: crate::Calibre
//!
use crate::calibre::CalibreConfig;
use crate::common::process::{ExecOptions, DEFAULT_MAX_BUFFER};
use crate::core::error::{CalibreError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)] // Error if unknown fields are in TOML
pub struct Config {
    /// Calibre library passed to `calibredb` commands (can use ~).
    #[serde(default)]
    pub library_path: Option<String>,
    /// Log each command line before it is executed.
    #[serde(default)]
    pub log_commands: Option<bool>,
    #[serde(default)]
    pub exec: ExecConfig,
}

/// Process execution defaults (`[exec]` table).
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExecConfig {
    /// Per-stream output cap in bytes.
    pub max_buffer: Option<usize>,
    /// Working directory for executed commands (can use ~).
    pub cwd: Option<String>,
    /// Kill commands running longer than this many seconds.
    pub timeout_secs: Option<u64>,
    /// Shell used to run command lines (can use ~).
    pub shell: Option<String>,
    /// Extra environment variables for executed commands.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

const PROJECT_CONFIG_FILENAME: &str = ".calibrs.toml";

impl Config {
    /// Converts the loaded settings into the façade configuration.
    pub fn to_calibre_config(&self) -> CalibreConfig {
        let exec = ExecOptions {
            max_buffer: self.exec.max_buffer.unwrap_or(DEFAULT_MAX_BUFFER),
            cwd: self.exec.cwd.as_ref().map(PathBuf::from),
            env: self.exec.env.clone(),
            timeout: self.exec.timeout_secs.map(Duration::from_secs),
            shell: self.exec.shell.as_ref().map(PathBuf::from),
        };
        CalibreConfig {
            exec,
            library_path: self.library_path.clone().unwrap_or_default(),
            log_commands: self.log_commands.unwrap_or(false),
        }
    }
}

pub fn load_config() -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config()?;
    let mut merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    expand_config_paths(&mut merged_config);
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "calibrs", "calibrs") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Config>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(project_config_path) = find_project_config_path(&current_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.calibrs.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

/// Walks up from `start` looking for `.calibrs.toml`, stopping at a `.git` directory.
fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Project values win; unset project values fall back to the user's.
fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project = match project {
        Some(p) => p,
        None => return user,
    };
    let mut env = user.exec.env;
    env.extend(project.exec.env);
    Config {
        library_path: project.library_path.or(user.library_path),
        log_commands: project.log_commands.or(user.log_commands),
        exec: ExecConfig {
            max_buffer: project.exec.max_buffer.or(user.exec.max_buffer),
            cwd: project.exec.cwd.or(user.exec.cwd),
            timeout_secs: project.exec.timeout_secs.or(user.exec.timeout_secs),
            shell: project.exec.shell.or(user.exec.shell),
            env,
        },
    }
}

fn expand_config_paths(config: &mut Config) {
    debug!("Expanding paths in configuration...");
    for path in [
        &mut config.library_path,
        &mut config.exec.cwd,
        &mut config.exec.shell,
    ]
    .into_iter()
    .flatten()
    {
        *path = shellexpand::tilde(path.as_str()).into_owned();
        debug!("Expanded path: {}", path);
    }
}

fn validate_config(config: &Config) -> Result<()> {
    info!("Validating final configuration...");
    if config.exec.max_buffer == Some(0) {
        return Err(anyhow!(CalibreError::Config(
            "exec.max_buffer must be greater than zero.".to_string()
        )));
    }
    if config.exec.timeout_secs == Some(0) {
        return Err(anyhow!(CalibreError::Config(
            "exec.timeout_secs must be greater than zero.".to_string()
        )));
    }
    if let Some(cwd) = &config.exec.cwd {
        let dir = Path::new(cwd);
        if !dir.is_dir() {
            return Err(anyhow!(CalibreError::Config(format!(
                "Configured working directory '{}' does not exist or is not a directory.",
                dir.display()
            ))));
        }
    }
    if let Some(library) = &config.library_path {
        if !Path::new(library).exists() {
            warn!("Configured library path '{}' does not exist.", library);
        }
    }
    info!("Configuration validation successful.");
    Ok(())
}
