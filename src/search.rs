//! Executable lookup on a search path.
//!
//! Mirrors how a POSIX shell resolves a command name: `PATH` entries are tried
//! in order, an empty entry means the current directory, and the first regular
//! file with an execute bit wins.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SearchError {
    #[error("executable not found on search path: {program}")]
    NotFound { program: String },

    #[error("no search path configured while looking for {program}")]
    NoSearchPath { program: String },
}

/// Find the first executable named `program` in `search_path`.
///
/// Directories are visited in list order; an empty entry is the current
/// directory.
/// Symlinks are followed for the executable check but the returned path is
/// the one found on the search path, not its target.
pub fn resolve_executable_on_path(
    program: &str,
    search_path: Option<&OsStr>,
) -> Result<PathBuf, SearchError> {
    let Some(search_path) = search_path else {
        return Err(SearchError::NoSearchPath {
            program: program.to_string(),
        });
    };

    for dir in search_dirs(search_path) {
        for candidate in candidates(&dir, program) {
            if is_executable(&candidate) {
                debug!(program, path = %candidate.display(), "resolved executable");
                return Ok(candidate);
            }
        }
    }

    Err(SearchError::NotFound {
        program: program.to_string(),
    })
}

/// Split a raw search path, mapping empty entries to `.`.
fn search_dirs(search_path: &OsStr) -> impl Iterator<Item = PathBuf> + '_ {
    env::split_paths(search_path).map(|dir| {
        if dir.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            dir
        }
    })
}

#[cfg(unix)]
fn candidates(dir: &Path, program: &str) -> Vec<PathBuf> {
    vec![dir.join(program)]
}

#[cfg(not(unix))]
fn candidates(dir: &Path, program: &str) -> Vec<PathBuf> {
    let mut paths = vec![dir.join(program)];
    let exts = env::var("PATHEXT").unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string());
    for ext in exts.split(';').filter(|e| !e.is_empty()) {
        paths.push(dir.join(format!("{program}{ext}")));
    }
    paths
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match path.metadata() {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.metadata().map(|meta| meta.is_file()).unwrap_or(false)
}
