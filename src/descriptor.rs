use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use path_clean::PathClean;

use crate::checksum::Md5Checksummer;
use crate::error::FinderError;
use crate::mime::MultiDetector;
use crate::traits::{Checksummer, MimeDetector};

/// The kind of a filesystem entry, as reported by `stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A directory.
    Dir,

    /// Anything else (device files, pipes, sockets, etc.).
    Other,
}

/// Stat data captured when a [`Descriptor`] is created.
#[derive(Debug, Clone)]
pub struct Stat {
    pub name:     String,
    pub size:     u64,
    pub kind:     EntryKind,
    /// Permission bits on Unix; elsewhere derived from the read-only flag.
    pub mode:     u32,
    /// `None` where the platform does not record it.
    pub modified: Option<SystemTime>,
}

impl Stat {
    fn from_metadata(path: &Path, meta: &fs::Metadata) -> Self {
        let kind = if meta.is_dir() {
            EntryKind::Dir
        } else if meta.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        Self {
            name,
            size: meta.len(),
            kind,
            mode: mode_bits(meta),
            modified: meta.modified().ok(),
        }
    }
}

#[cfg(unix)]
fn mode_bits(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode()
}

#[cfg(not(unix))]
fn mode_bits(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() { 0o444 } else { 0o644 }
}

/// The callbacks a descriptor uses to fill its lazy fields.
///
/// Cheap to clone; one set is usually shared by every descriptor of a search.
#[derive(Clone)]
pub struct Hooks {
    checksum: Arc<dyn Checksummer>,
    mime:     Arc<dyn MimeDetector>,
}

impl Hooks {
    pub fn new(checksum: impl Checksummer + 'static, mime: impl MimeDetector + 'static) -> Self {
        Self {
            checksum: Arc::new(checksum),
            mime:     Arc::new(mime),
        }
    }

    /// MD5 checksums and content-then-extension MIME detection.
    pub fn standard() -> Self {
        Self::new(Md5Checksummer, MultiDetector::standard())
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hooks")
    }
}

/// One filesystem entry under consideration.
///
/// Stat data is fixed at construction. The checksum and MIME type are computed
/// on first access through the injected [`Hooks`] and cached for the lifetime
/// of the descriptor, so a chain that asks for them twice pays for the I/O
/// once.
///
/// Descriptors are moved, not shared, between the threads of a search: the
/// worker evaluating one owns it outright, which is why the lazy accessors take
/// `&mut self`.
#[derive(Debug)]
pub struct Descriptor {
    stat:          Stat,
    absolute_path: PathBuf,
    relative_path: Option<PathBuf>,
    checksum:      Option<Vec<u8>>,
    mime:          String,
    hooks:         Hooks,
}

impl Descriptor {
    /// Assemble a descriptor from data gathered elsewhere.
    ///
    /// Nothing is checked against the filesystem; useful for custom
    /// [`Source`](crate::Source) implementations and tests.
    pub fn new(
        stat: Stat,
        absolute_path: impl Into<PathBuf>,
        relative_path: Option<PathBuf>,
        hooks: Hooks,
    ) -> Self {
        Self {
            stat,
            absolute_path: absolute_path.into(),
            relative_path,
            checksum: None,
            mime: String::new(),
            hooks,
        }
    }

    /// Stat `path` (following symlinks) and resolve it to an absolute path.
    ///
    /// Either failure aborts construction. The absolute path is cleaned
    /// lexically, so `.` and `..` segments never reach the filters. A relative
    /// `path` is kept as the descriptor's relative path.
    pub fn from_path(path: impl AsRef<Path>, hooks: Hooks) -> Result<Self, FinderError> {
        let path = path.as_ref();

        let meta = fs::metadata(path).map_err(|source| FinderError::Stat {
            path: path.to_path_buf(),
            source,
        })?;
        let absolute = std::path::absolute(path)
            .map_err(|source| FinderError::Absolute {
                path: path.to_path_buf(),
                source,
            })?
            .clean();
        let relative = path.is_relative().then(|| path.to_path_buf());

        Ok(Self::new(Stat::from_metadata(path, &meta), absolute, relative, hooks))
    }

    pub fn name(&self) -> &str {
        &self.stat.name
    }

    pub fn size(&self) -> u64 {
        self.stat.size
    }

    pub fn kind(&self) -> EntryKind {
        self.stat.kind
    }

    pub fn is_dir(&self) -> bool {
        self.stat.kind == EntryKind::Dir
    }

    pub fn mode(&self) -> u32 {
        self.stat.mode
    }

    /// Last modification time, when the platform reports one.
    pub fn modified(&self) -> Option<SystemTime> {
        self.stat.modified
    }

    pub fn absolute_path(&self) -> &Path {
        &self.absolute_path
    }

    pub fn relative_path(&self) -> Option<&Path> {
        self.relative_path.as_deref()
    }

    /// Content digest, computed on first call.
    ///
    /// A failed computation is not cached; the next call retries.
    pub fn checksum(&mut self) -> Result<&[u8], FinderError> {
        let digest = match self.checksum.take() {
            Some(digest) => digest,
            None => self
                .hooks
                .checksum
                .checksum(&self.absolute_path)
                .map_err(|e| FinderError::Checksum(Box::new(e)))?,
        };
        Ok(self.checksum.insert(digest).as_slice())
    }

    /// MIME type, computed on first call.
    ///
    /// An empty string counts as "not computed yet": when the detector cannot
    /// tell the type, every call asks it again. Errors are not cached either.
    pub fn mime(&mut self) -> Result<&str, FinderError> {
        if self.mime.is_empty() {
            self.mime = self
                .hooks
                .mime
                .detect(&self.absolute_path)
                .map_err(|e| FinderError::Mime(Box::new(e)))?;
        }
        Ok(&self.mime)
    }
}
