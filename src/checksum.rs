//! Default checksum callback: MD5 over the full file content.
//!
//! MD5 is used for identity, not security. Files are streamed through the
//! hasher so large files never sit in memory whole.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use md5::{Digest, Md5};

use crate::error::FinderError;
use crate::traits::Checksummer;

/// Streams a file through MD5 and returns the 16-byte digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct Md5Checksummer;

impl Checksummer for Md5Checksummer {
    fn checksum(&self, path: &Path) -> Result<Vec<u8>, FinderError> {
        let io_err = |source| FinderError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_err)?;
        digest(file).map_err(io_err)
    }
}

// `io::copy` retries reads that come back `Interrupted`.
fn digest(mut reader: impl Read) -> io::Result<Vec<u8>> {
    let mut hasher = Md5::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(hasher.finalize().to_vec())
}
