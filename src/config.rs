//! Run configuration.
//!
//! Everything the patcher reads from the environment is gathered here once,
//! up front, so a missing value fails the run before any file is touched.

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

/// Variable naming the Erlang/OTP tree that receives the helper scripts.
pub const ROOT_VAR: &str = "ERL_TOP";

/// Variable holding the executable search path.
pub const SEARCH_PATH_VAR: &str = "PATH";

/// Where the bundled patch sources live when nothing else is configured.
pub const DEFAULT_BUNDLE_DIR: &str = "scripts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    MissingVar { name: &'static str },
    /// A required variable is set to an empty string.
    Empty { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingVar { name } => write!(f, "{} is not set", name),
            ConfigError::Empty { name } => write!(f, "{} is set but empty", name),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `ERL_TOP`: root of the tree scripts are installed under.
    pub root: PathBuf,
    /// Directory holding the bundled patch sources.
    pub bundle_dir: PathBuf,
    /// Raw search path used to locate installed executables.
    pub search_path: Option<OsString>,
}

impl Config {
    pub fn new(root: impl Into<PathBuf>, bundle_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            bundle_dir: bundle_dir.into(),
            search_path: None,
        }
    }

    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    /// Build from the process environment, with the default bundle directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var_os(name))
    }

    /// Build from an arbitrary variable lookup.
    ///
    /// `ERL_TOP` is required; `PATH` is optional here and only becomes an
    /// error once an entry actually needs to search it.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let root = required(&lookup, ROOT_VAR)?;
        let search_path = lookup(SEARCH_PATH_VAR);

        Ok(Self {
            root: PathBuf::from(root),
            bundle_dir: PathBuf::from(DEFAULT_BUNDLE_DIR),
            search_path,
        })
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<OsString, ConfigError>
where
    F: Fn(&str) -> Option<OsString>,
{
    match lookup(name) {
        None => Err(ConfigError::MissingVar { name }),
        Some(value) if value.is_empty() => Err(ConfigError::Empty { name }),
        Some(value) => Ok(value),
    }
}
