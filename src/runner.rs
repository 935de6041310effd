//! Whole-run orchestration over the bundled entries.
//!
//! Entries are processed in order and independently. The first error aborts
//! the run; entries patched before it stay patched.

use crate::config::Config;
use crate::entry::{bundled_entries, PatchEntry};
use crate::patch::{ensure_root_directory, inspect_one, patch_one, Action, PatchError, Status};
use crate::search::SearchError;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("could not locate target for {entry}")]
    Resolve {
        entry: &'static str,
        #[source]
        source: SearchError,
    },

    #[error("failed to patch {entry}")]
    Patch {
        entry: &'static str,
        #[source]
        source: PatchError,
    },
}

impl RunError {
    pub fn entry(&self) -> &'static str {
        match self {
            RunError::Resolve { entry, .. } | RunError::Patch { entry, .. } => entry,
        }
    }
}

/// Result of patching one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub name: &'static str,
    pub source: PathBuf,
    pub target: PathBuf,
    pub action: Action,
}

/// Result of inspecting one entry in check mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub name: &'static str,
    pub target: PathBuf,
    pub status: Status,
}

/// Patch every bundled entry.
///
/// `on_outcome` sees each entry as soon as it is done, so a caller can report
/// patches that were applied before a later entry fails.
pub fn run<F>(config: &Config, on_outcome: F) -> Result<Vec<Outcome>, RunError>
where
    F: FnMut(&Outcome),
{
    run_entries(config, &bundled_entries(), on_outcome)
}

pub fn run_entries<F>(
    config: &Config,
    entries: &[PatchEntry],
    mut on_outcome: F,
) -> Result<Vec<Outcome>, RunError>
where
    F: FnMut(&Outcome),
{
    let mut outcomes = Vec::with_capacity(entries.len());

    for entry in entries {
        if let Some(dir) = entry.managed_dir(config) {
            ensure_root_directory(&dir).map_err(|source| RunError::Patch {
                entry: entry.name,
                source,
            })?;
        }

        let source = entry.source_path(config);
        let target = entry
            .resolve_target(config)
            .map_err(|source| RunError::Resolve {
                entry: entry.name,
                source,
            })?;

        let action = patch_one(&source, &target).map_err(|source| RunError::Patch {
            entry: entry.name,
            source,
        })?;
        debug!(entry = entry.name, ?action, "entry done");

        let outcome = Outcome {
            name: entry.name,
            source,
            target,
            action,
        };
        on_outcome(&outcome);
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

/// Inspect every bundled entry without modifying anything.
pub fn check(config: &Config) -> Result<Vec<CheckReport>, RunError> {
    check_entries(config, &bundled_entries())
}

pub fn check_entries(
    config: &Config,
    entries: &[PatchEntry],
) -> Result<Vec<CheckReport>, RunError> {
    entries
        .iter()
        .map(|entry| {
            let target = entry
                .resolve_target(config)
                .map_err(|source| RunError::Resolve {
                    entry: entry.name,
                    source,
                })?;
            let status = inspect_one(&entry.source_path(config), &target).map_err(|source| {
                RunError::Patch {
                    entry: entry.name,
                    source,
                }
            })?;
            Ok(CheckReport {
                name: entry.name,
                target,
                status,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::TargetStrategy;
    use std::fs;

    const LOCAL: PatchEntry = PatchEntry {
        name: "helper",
        source: "helper.sh",
        strategy: TargetStrategy::UnderRoot {
            dir: "bin",
            file_name: "helper.sh",
        },
    };

    const MISSING_TOOL: PatchEntry = PatchEntry {
        name: "tool",
        source: "tool",
        strategy: TargetStrategy::OnSearchPath {
            program: "definitely-not-installed-tool",
        },
    };

    fn setup() -> (tempfile::TempDir, Config) {
        let temp_dir = tempfile::tempdir().unwrap();
        let bundle = temp_dir.path().join("bundle");
        fs::create_dir_all(&bundle).unwrap();
        fs::write(bundle.join("helper.sh"), b"#!/bin/sh\necho v1\n").unwrap();
        fs::write(bundle.join("tool"), b"#!/bin/sh\n").unwrap();

        let config = Config::new(temp_dir.path().join("root"), bundle)
            .with_search_path(temp_dir.path().join("empty-bin"));
        (temp_dir, config)
    }

    #[test]
    fn test_run_entries_creates_managed_dir() {
        let (_temp_dir, config) = setup();

        let mut seen = Vec::new();
        let outcomes = run_entries(&config, &[LOCAL], |o| seen.push(o.name)).unwrap();

        assert_eq!(seen, ["helper"]);
        assert_eq!(outcomes[0].action, Action::Patched);
        assert_eq!(outcomes[0].target, config.root.join("bin/helper.sh"));
        assert!(outcomes[0].target.exists());
    }

    #[test]
    fn test_earlier_outcome_reported_before_failure() {
        let (_temp_dir, config) = setup();

        let mut seen = Vec::new();
        let err =
            run_entries(&config, &[LOCAL, MISSING_TOOL], |o| seen.push(o.name)).unwrap_err();

        assert_eq!(seen, ["helper"]);
        assert_eq!(err.entry(), "tool");
        assert!(matches!(
            err,
            RunError::Resolve {
                source: SearchError::NotFound { .. },
                ..
            }
        ));
        assert!(config.root.join("bin/helper.sh").exists());
    }

    #[test]
    fn test_check_entries_does_not_create_dir() {
        let (_temp_dir, config) = setup();

        let reports = check_entries(&config, &[LOCAL]).unwrap();
        assert_eq!(reports[0].status, Status::Missing);
        assert!(!config.root.exists());
    }
}
