//! # globsift
//!
//! Glob-driven file search with lazy, cost-ordered filters applied in parallel.
//!
//! A search expands a glob pattern into [`Descriptor`]s, then runs every
//! descriptor through a [`FilterChain`] on a fixed pool of worker threads.
//! Filters are evaluated cheapest first (size, then name/path patterns, then
//! MIME type, then content checksum), and a descriptor computes its MIME type
//! and checksum at most once, only when a filter asks. A file rejected by its
//! size is never opened.
//!
//! The collaborators are explicit: a [`Source`] produces descriptors, and the
//! descriptors use a [`Checksummer`] and a [`MimeDetector`] through their
//! [`Hooks`]. [`finder()`] wires up the standard filesystem ones.
//!
//! # Quick Start
//!
//! ```rust
//! use std::path::Path;
//! use std::time::SystemTime;
//! use globsift::{Descriptor, EntryKind, FinderBuilder, FinderError, Hooks, Stat};
//!
//! // A minimal in-memory source for demonstration
//! fn source(_pattern: &str) -> Result<Vec<Descriptor>, FinderError> {
//!     let hooks = Hooks::new(
//!         |_: &Path| -> Result<Vec<u8>, FinderError> { Ok(vec![0x01]) },
//!         |_: &Path| -> Result<String, FinderError> { Ok("text/plain".into()) },
//!     );
//!     Ok([("small.txt", 10), ("large.txt", 5000)]
//!         .into_iter()
//!         .map(|(name, size)| {
//!             let stat = Stat {
//!                 name: name.into(),
//!                 size,
//!                 kind: EntryKind::File,
//!                 mode: 0o644,
//!                 modified: Some(SystemTime::UNIX_EPOCH),
//!             };
//!             Descriptor::new(stat, format!("/data/{name}"), None, hooks.clone())
//!         })
//!         .collect())
//! }
//!
//! let results = FinderBuilder::new(source)
//!     .size(">", 1024)
//!     .mime("text/plain")
//!     .glob("/data/*")
//!     .unwrap();
//!
//! assert_eq!(results.names(), vec!["large.txt"]);
//! ```
//!
//! # Filesystem search
//!
//! ```rust,no_run
//! let photos = globsift::finder()
//!     .mime_regexp("^image/")
//!     .exclude([r"\.tmp$"])
//!     .workers(16)
//!     .glob("photos/**/*")?;
//!
//! for d in photos {
//!     println!("{}", d.absolute_path().display());
//! }
//! # Ok::<(), globsift::FinderError>(())
//! ```
//!
//! # Errors
//!
//! Configuration mistakes and source failures are returned from
//! [`FinderBuilder::glob`] / [`Finder::glob`]. A filter that fails on one
//! file (say the checksum read hits an I/O error) does not fail the search:
//! that file is left out of the result and counted in
//! [`ScanStats::failed`]. Install a `tracing` subscriber at debug level to see
//! which files were dropped and why.

#![forbid(unsafe_code)]

mod builder;
mod checksum;
mod descriptor;
mod engine;
mod error;
mod filter;
mod glob;
mod mime;
mod results;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::{Finder, FinderBuilder, DEFAULT_WORKERS};
pub use checksum::Md5Checksummer;
pub use descriptor::{Descriptor, EntryKind, Hooks, Stat};
pub use error::FinderError;
pub use filter::{order, CmpOp, FilterChain, Verdict};
pub use glob::{LazyGlobber, PatternGlobber};
pub use mime::{ContentSniffer, ExtensionLookup, MultiDetector};
pub use results::{Results, ScanStats};
pub use traits::{Checksummer, Filter, Globber, MimeDetector, Source};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a [`FinderBuilder`] over the filesystem.
///
/// Paths come from [`PatternGlobber`]; checksums are MD5
/// ([`Md5Checksummer`]); MIME types come from magic bytes, falling back to the
/// file extension ([`MultiDetector::standard`]).
pub fn finder() -> FinderBuilder {
    FinderBuilder::new(LazyGlobber::standard())
}
