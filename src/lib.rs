//! Beam Script Patcher: keep bundled helper scripts installed
//!
//! A native Erlang project ships a couple of replacement scripts that its
//! build and test tooling depends on: a valgrind helper that belongs under
//! `$ERL_TOP/scripts`, and an `elixir` launcher that replaces the one found on
//! `PATH`. This crate makes sure each installed copy is byte-identical to the
//! bundled one and executable, copying only when something differs.
//!
//! # Architecture
//!
//! Every entry goes through one primitive, [`patch_one`], which compares
//! streaming xxh3 digests of source and target and replaces the target only
//! when they differ. Entries differ only in how their target path is found
//! ([`TargetStrategy`]).
//!
//! # Safety
//!
//! - Configuration is resolved before any filesystem access
//! - Identical targets are never written
//! - Existing targets rewritten in place (inode, owner and hard links kept)
//! - New targets created atomically (tempfile + fsync + rename)
//! - Existing permission bits are kept; execute bits are added
//! - Idempotent: a second run does nothing
//!
//! # Example
//!
//! ```no_run
//! use beam_script_patcher::{run, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! run(&config, |outcome| {
//!     if outcome.action.is_patched() {
//!         println!("patch {} -> {}", outcome.name, outcome.target.display());
//!     }
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod digest;
pub mod entry;
pub mod patch;
pub mod runner;
pub mod search;

// Re-exports
pub use config::{Config, ConfigError};
pub use digest::{compute_digest, ContentDigest};
pub use entry::{bundled_entries, PatchEntry, TargetStrategy};
pub use patch::{ensure_root_directory, inspect_one, patch_one, Action, PatchError, Status};
pub use runner::{check, run, CheckReport, Outcome, RunError};
pub use search::{resolve_executable_on_path, SearchError};
