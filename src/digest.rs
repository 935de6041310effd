//! Streaming content digests for change detection.
//!
//! Files are hashed block by block with xxh3 so arbitrarily large scripts or
//! executables never have to be held in memory. Digests are compared, never
//! stored.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use xxhash_rust::xxh3::{xxh3_64, Xxh3};

/// Size of each read when streaming a file through the hasher.
pub const BLOCK_SIZE: usize = 4096;

/// xxh3 fingerprint of a file's full byte stream.
///
/// Only meaningful for equality comparison between two files. Not a
/// security primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest(u64);

impl ContentDigest {
    /// Digest of an in-memory buffer.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(xxh3_64(bytes))
    }

    /// Digest everything `reader` yields, reading [`BLOCK_SIZE`] bytes at a time.
    pub fn from_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut hasher = Xxh3::new();
        let mut block = [0u8; BLOCK_SIZE];

        loop {
            let read = match reader.read(&mut block) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&block[..read]);
        }

        Ok(Self(hasher.digest()))
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Digest the file at `path`.
///
/// The handle is opened here and dropped before returning, on success or
/// failure. Open and read errors are returned unchanged so callers can tell
/// `NotFound` from `PermissionDenied`.
pub fn compute_digest(path: impl AsRef<Path>) -> io::Result<ContentDigest> {
    let file = File::open(path.as_ref())?;
    ContentDigest::from_reader(file)
}
