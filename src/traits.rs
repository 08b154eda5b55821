use std::path::{Path, PathBuf};

use crate::descriptor::Descriptor;
use crate::error::FinderError;

/// Produces the unfiltered descriptors for a glob pattern.
///
/// The finder calls this once per search, before any filter runs. A failure
/// here is fatal to the search: no partial result is returned.
///
/// Implement it to feed the pipeline from anything that can turn a pattern
/// into descriptors. [`LazyGlobber`](crate::LazyGlobber) is the filesystem
/// implementation; closures of the right shape work too, which keeps tests
/// short.
///
/// # Thread Safety
///
/// `Send + Sync` are required so a built [`Finder`](crate::Finder) can be
/// shared between threads.
///
/// # Example
///
/// ```rust
/// use globsift::{Descriptor, FinderError, Source};
///
/// struct Nothing;
///
/// impl Source for Nothing {
///     fn glob(&self, _pattern: &str) -> Result<Vec<Descriptor>, FinderError> {
///         Ok(Vec::new())
///     }
/// }
/// ```
pub trait Source: Send + Sync {
    /// Expand `pattern` into one descriptor per matched path.
    fn glob(&self, pattern: &str) -> Result<Vec<Descriptor>, FinderError>;
}

impl<F> Source for F
where
    F: Fn(&str) -> Result<Vec<Descriptor>, FinderError> + Send + Sync,
{
    fn glob(&self, pattern: &str) -> Result<Vec<Descriptor>, FinderError> {
        self(pattern)
    }
}

/// Expands a pattern into plain paths.
///
/// Must support literal paths, `*` within one segment and `**` across zero or
/// more segments.
pub trait Globber: Send + Sync {
    fn expand(&self, pattern: &str) -> Result<Vec<PathBuf>, FinderError>;
}

impl<F> Globber for F
where
    F: Fn(&str) -> Result<Vec<PathBuf>, FinderError> + Send + Sync,
{
    fn expand(&self, pattern: &str) -> Result<Vec<PathBuf>, FinderError> {
        self(pattern)
    }
}

/// Computes a content digest for the file at an absolute path.
///
/// Any fixed-length hash works as long as identical content gives an
/// identical digest. The whole file has to be read.
pub trait Checksummer: Send + Sync {
    fn checksum(&self, path: &Path) -> Result<Vec<u8>, FinderError>;
}

impl<F> Checksummer for F
where
    F: Fn(&Path) -> Result<Vec<u8>, FinderError> + Send + Sync,
{
    fn checksum(&self, path: &Path) -> Result<Vec<u8>, FinderError> {
        self(path)
    }
}

/// Determines the MIME type of the file at an absolute path.
///
/// An empty string with `Ok` means "type unknown". It is not an error.
pub trait MimeDetector: Send + Sync {
    fn detect(&self, path: &Path) -> Result<String, FinderError>;
}

impl<F> MimeDetector for F
where
    F: Fn(&Path) -> Result<String, FinderError> + Send + Sync,
{
    fn detect(&self, path: &Path) -> Result<String, FinderError> {
        self(path)
    }
}

/// A predicate over a descriptor, evaluated as part of a
/// [`FilterChain`](crate::FilterChain).
///
/// Filters take the descriptor mutably so they can trigger (and cache) its
/// lazy checksum and MIME fields. A chain runs its filters in ascending
/// [`order`](Filter::order); give expensive filters a high order so cheaper
/// ones can reject first.
///
/// # Thread Safety
///
/// `Send + Sync` are required: one chain is shared by every worker and called
/// concurrently on different descriptors.
///
/// # Example
///
/// ```rust
/// use globsift::{Descriptor, Filter, FinderError};
///
/// struct NonEmpty;
///
/// impl Filter for NonEmpty {
///     fn name(&self) -> &'static str { "non-empty" }
///     fn order(&self) -> u32 { globsift::order::SIZE }
///     fn check(&self, d: &mut Descriptor) -> Result<bool, FinderError> {
///         Ok(d.size() > 0)
///     }
/// }
/// ```
pub trait Filter: Send + Sync {
    /// Short label used in log output.
    fn name(&self) -> &'static str;

    /// Evaluation weight. Lower runs earlier.
    fn order(&self) -> u32;

    /// Returns `Ok(true)` to keep the descriptor.
    fn check(&self, descriptor: &mut Descriptor) -> Result<bool, FinderError>;
}
