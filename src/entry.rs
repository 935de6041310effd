//! The fixed set of bundled files and where each one is installed.

use crate::config::Config;
use crate::search::{resolve_executable_on_path, SearchError};
use std::path::PathBuf;

/// How an entry's target path is found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetStrategy {
    /// `<root>/<dir>/<file_name>`. The directory is created on demand and a
    /// missing file just means it needs patching.
    UnderRoot {
        dir: &'static str,
        file_name: &'static str,
    },
    /// First executable named `program` on the search path. It must already
    /// be installed; nothing is created.
    OnSearchPath { program: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchEntry {
    /// Short name used in console notices
    pub name: &'static str,
    /// File name inside the bundle directory
    pub source: &'static str,
    pub strategy: TargetStrategy,
}

impl PatchEntry {
    pub fn source_path(&self, config: &Config) -> PathBuf {
        config.bundle_dir.join(self.source)
    }

    /// Directory that must exist before patching, if this entry owns one.
    pub fn managed_dir(&self, config: &Config) -> Option<PathBuf> {
        match &self.strategy {
            TargetStrategy::UnderRoot { dir, .. } => Some(config.root.join(dir)),
            TargetStrategy::OnSearchPath { .. } => None,
        }
    }

    pub fn resolve_target(&self, config: &Config) -> Result<PathBuf, SearchError> {
        match &self.strategy {
            TargetStrategy::UnderRoot { dir, file_name } => {
                Ok(config.root.join(dir).join(file_name))
            }
            TargetStrategy::OnSearchPath { program } => {
                resolve_executable_on_path(program, config.search_path.as_deref())
            }
        }
    }
}

/// Valgrind helper that OTP's `beamasm` emulator build expects under
/// `$ERL_TOP/scripts`.
pub const VALGRIND_SCRIPT: PatchEntry = PatchEntry {
    name: "valgrind_beamasm_update.escript",
    source: "valgrind_beamasm_update.escript",
    strategy: TargetStrategy::UnderRoot {
        dir: "scripts",
        file_name: "valgrind_beamasm_update.escript",
    },
};

/// Replacement `elixir` launcher, written over the installed one.
pub const ELIXIR_LAUNCHER: PatchEntry = PatchEntry {
    name: "elixir",
    source: "elixir",
    strategy: TargetStrategy::OnSearchPath { program: "elixir" },
};

/// Entries in the order they are processed.
pub fn bundled_entries() -> [PatchEntry; 2] {
    [VALGRIND_SCRIPT, ELIXIR_LAUNCHER]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_under_root_target() {
        let config = Config::new("/opt/otp", "/src/scripts");
        let target = VALGRIND_SCRIPT.resolve_target(&config).unwrap();

        assert_eq!(
            target,
            Path::new("/opt/otp/scripts/valgrind_beamasm_update.escript")
        );
        assert_eq!(
            VALGRIND_SCRIPT.managed_dir(&config),
            Some(PathBuf::from("/opt/otp/scripts"))
        );
    }

    #[test]
    fn test_source_path_is_under_bundle_dir() {
        let config = Config::new("/opt/otp", "/src/scripts");
        assert_eq!(
            ELIXIR_LAUNCHER.source_path(&config),
            Path::new("/src/scripts/elixir")
        );
    }

    #[test]
    fn test_search_path_entry_has_no_managed_dir() {
        let config = Config::new("/opt/otp", "/src/scripts");
        assert_eq!(ELIXIR_LAUNCHER.managed_dir(&config), None);
    }

    #[test]
    fn test_search_path_entry_requires_search_path() {
        let config = Config::new("/opt/otp", "/src/scripts");
        let result = ELIXIR_LAUNCHER.resolve_target(&config);
        assert!(matches!(result, Err(SearchError::NoSearchPath { .. })));
    }

    #[test]
    fn test_bundled_entry_order() {
        let names: Vec<_> = bundled_entries().iter().map(|e| e.name).collect();
        assert_eq!(names, ["valgrind_beamasm_update.escript", "elixir"]);
    }
}
