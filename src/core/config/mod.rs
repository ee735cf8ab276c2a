//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! Options can come from two files and the command line:
//! - **Global**: User-level defaults shared by every project
//! - **Project**: `buildnumber.toml` next to the sources
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Project config file
//! 4. CLI flags (merged by the caller)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$GIT_BUILDNUMBER_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/git-buildnumber/config.toml`
//! 3. `~/.git-buildnumber/config.toml`
//!
//! # Project Config Location
//!
//! `buildnumber.toml` in the repository directory, unless an explicit path
//! is given. An explicit path that does not exist is an error; a missing
//! default file is not.
//!
//! # Example
//!
//! ```no_run
//! use git_buildnumber::core::config::{Config, ConfigFile, Parameters};
//! use std::path::Path;
//!
//! let loaded = Config::load(Path::new("."), None).unwrap();
//! let merged = loaded.config.layered(ConfigFile::default());
//! let (params, warnings) = Parameters::resolve(merged).unwrap();
//! println!("namespace: {}", params.namespace);
//! ```

pub mod schema;

pub use schema::{AncestorBound, ConfigFile, Parameters};

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the global config file.
pub const CONFIG_ENV: &str = "GIT_BUILDNUMBER_CONFIG";

/// File name of the project config.
pub const PROJECT_FILE: &str = "buildnumber.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading or resolution.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The file that triggered the warning, if any.
    pub path: Option<PathBuf>,
}

impl ConfigWarning {
    pub fn new(message: String) -> Self {
        Self {
            message,
            path: None,
        }
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{} ({})", self.message, path.display()),
            None => f.write_str(&self.message),
        }
    }
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Configuration files found on disk, not yet merged.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: ConfigFile,
    /// Project configuration (if a file was found)
    pub project: Option<ConfigFile>,
    global_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
}

impl Config {
    /// Load the global file and the project file for `project_dir`.
    ///
    /// `explicit` replaces the default project file location.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed, or if
    /// `explicit` names a file that cannot be read.
    pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let global_path = Self::find_global();
        let project_path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let path = project_dir.join(PROJECT_FILE);
                path.is_file().then_some(path)
            }
        };
        Self::load_from(global_path.as_deref(), project_path.as_deref())
    }

    /// Load from known file locations. `None` skips that layer.
    pub fn load_from(
        global_path: Option<&Path>,
        project_path: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let global = match global_path {
            Some(path) => Self::read_config(path)?,
            None => ConfigFile::default(),
        };

        let project = match project_path {
            Some(path) => {
                let file = Self::read_config(path)?;
                if file.repository_directory.is_some() {
                    warnings.push(ConfigWarning {
                        message: "repositoryDirectory in a project file is relative to the \
                                  working directory, not the file"
                            .to_string(),
                        path: Some(path.to_path_buf()),
                    });
                }
                Some(file)
            }
            None => None,
        };

        Ok(ConfigLoadResult {
            config: Config {
                global,
                project,
                global_path: global_path.map(Path::to_path_buf),
                project_path: project_path.map(Path::to_path_buf),
            },
            warnings,
        })
    }

    /// First existing global config file, if any.
    fn find_global() -> Option<PathBuf> {
        // 1. Check $GIT_BUILDNUMBER_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/git-buildnumber/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("git-buildnumber/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.git-buildnumber/config.toml
        dirs::home_dir()
            .map(|home| home.join(".git-buildnumber/config.toml"))
            .filter(|path| path.exists())
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Merge files and command-line values in precedence order.
    pub fn layered(&self, cli: ConfigFile) -> ConfigFile {
        let files = match &self.project {
            Some(project) => self.global.clone().merge(project.clone()),
            None => self.global.clone(),
        };
        files.merge(cli)
    }

    /// Where the global config was loaded from.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Where the project config was loaded from.
    pub fn project_config_loaded_from(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }
}
