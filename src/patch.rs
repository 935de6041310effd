//! Compare-and-copy-if-different for a single (source, target) pair.
//!
//! # Guarantees
//!
//! - A target whose bytes already match the source is never written
//! - Existing targets are rewritten in place, keeping inode, owner and hard links
//! - New targets are created atomically (tempfile + fsync + rename)
//! - The target ends up executable; its other permission bits are kept
//! - Source access/modification times are carried over to the new target

use crate::digest::compute_digest;
use filetime::FileTime;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Owner, group and other execute permission bits.
pub const EXECUTE_BITS: u32 = 0o111;

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PatchError {
    fn io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => PatchError::NotFound { path },
            io::ErrorKind::PermissionDenied => PatchError::PermissionDenied { path },
            _ => PatchError::Io { path, source },
        }
    }
}

/// What [`patch_one`] did to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "Action reports whether the target was rewritten"]
pub enum Action {
    /// Target was missing or stale and has been replaced
    Patched,
    /// Target already matched the source; nothing was written
    Unchanged,
}

impl Action {
    pub fn is_patched(self) -> bool {
        matches!(self, Action::Patched)
    }
}

/// Read-only view of a target, as reported by [`inspect_one`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    UpToDate,
    Stale,
    Missing,
}

impl Status {
    pub fn needs_patch(self) -> bool {
        !matches!(self, Status::UpToDate)
    }
}

/// Create `dir` and any missing parents. Succeeds if it already exists.
pub fn ensure_root_directory(dir: impl AsRef<Path>) -> Result<(), PatchError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| PatchError::io(dir, e))
}

/// Make `target` a byte-identical, executable copy of `source`.
///
/// The source digest is computed first, so a missing source fails before
/// the target is looked at. A missing target simply needs patching; its
/// parent directory must already exist.
pub fn patch_one(source: &Path, target: &Path) -> Result<Action, PatchError> {
    let source_digest = compute_digest(source).map_err(|e| PatchError::io(source, e))?;

    let existing = match fs::metadata(target) {
        Ok(meta) => {
            let target_digest =
                compute_digest(target).map_err(|e| PatchError::io(target, e))?;
            debug!(
                source = %source.display(),
                target = %target.display(),
                %source_digest,
                %target_digest,
                "compared digests"
            );
            if target_digest == source_digest {
                return Ok(Action::Unchanged);
            }
            Some(meta)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(PatchError::io(target, e)),
    };

    replace_with_copy(source, target, existing.as_ref())?;
    info!(source = %source.display(), target = %target.display(), "replaced target");

    Ok(Action::Patched)
}

/// Report whether `target` would be rewritten by [`patch_one`], without
/// touching anything.
pub fn inspect_one(source: &Path, target: &Path) -> Result<Status, PatchError> {
    let source_digest = compute_digest(source).map_err(|e| PatchError::io(source, e))?;

    match compute_digest(target) {
        Ok(digest) if digest == source_digest => Ok(Status::UpToDate),
        Ok(_) => Ok(Status::Stale),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Status::Missing),
        Err(e) => Err(PatchError::io(target, e)),
    }
}

/// Copy `source` over `target`.
///
/// `existing` is the metadata of the current target, if any. An existing
/// target is rewritten in place, through any symlink, so its inode, owner
/// and hard links are kept; its mode is kept too. A fresh target is created
/// atomically with the source's mode. Either way the execute bits are added.
fn replace_with_copy(
    source: &Path,
    target: &Path,
    existing: Option<&fs::Metadata>,
) -> Result<(), PatchError> {
    let source_meta = fs::metadata(source).map_err(|e| PatchError::io(source, e))?;
    let permissions = with_execute_bits(existing.unwrap_or(&source_meta).permissions());

    let dest = match existing {
        Some(_) => {
            let dest = fs::canonicalize(target).map_err(|e| PatchError::io(target, e))?;
            overwrite_in_place(source, &dest, permissions)?;
            dest
        }
        None => {
            create_atomically(source, target, permissions)?;
            target.to_path_buf()
        }
    };

    // Content and mode are already in place; stale times are not worth
    // failing the run over.
    let atime = FileTime::from_last_access_time(&source_meta);
    let mtime = FileTime::from_last_modification_time(&source_meta);
    if let Err(e) = filetime::set_file_times(&dest, atime, mtime) {
        warn!(target = %dest.display(), error = %e, "could not copy source timestamps");
    }

    Ok(())
}

/// Truncate and rewrite `dest`, then fsync.
fn overwrite_in_place(
    source: &Path,
    dest: &Path,
    permissions: fs::Permissions,
) -> Result<(), PatchError> {
    let mut reader = File::open(source).map_err(|e| PatchError::io(source, e))?;
    let mut writer = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(dest)
        .map_err(|e| PatchError::io(dest, e))?;

    io::copy(&mut reader, &mut writer).map_err(|e| PatchError::io(dest, e))?;
    writer
        .set_permissions(permissions)
        .map_err(|e| PatchError::io(dest, e))?;
    writer.sync_all().map_err(|e| PatchError::io(dest, e))?;

    Ok(())
}

/// Tempfile in the target directory + fsync + rename.
fn create_atomically(
    source: &Path,
    dest: &Path,
    permissions: fs::Permissions,
) -> Result<(), PatchError> {
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut reader = File::open(source).map_err(|e| PatchError::io(source, e))?;
    let mut temp = NamedTempFile::new_in(parent).map_err(|e| PatchError::io(parent, e))?;

    io::copy(&mut reader, &mut temp).map_err(|e| PatchError::io(dest, e))?;
    temp.as_file()
        .set_permissions(permissions)
        .map_err(|e| PatchError::io(dest, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| PatchError::io(dest, e))?;
    temp.persist(dest)
        .map_err(|e| PatchError::io(dest, e.error))?;

    Ok(())
}

#[cfg(unix)]
fn with_execute_bits(mut permissions: fs::Permissions) -> fs::Permissions {
    use std::os::unix::fs::PermissionsExt;

    permissions.set_mode((permissions.mode() & 0o7777) | EXECUTE_BITS);
    permissions
}

#[cfg(not(unix))]
fn with_execute_bits(permissions: fs::Permissions) -> fs::Permissions {
    permissions
}
