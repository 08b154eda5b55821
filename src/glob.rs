//! Glob Source: pattern → paths → lazy descriptors.

use std::path::{Component, Path, PathBuf};

use globset::GlobBuilder;
use ignore::WalkBuilder;
use tracing::debug;

use crate::descriptor::{Descriptor, Hooks};
use crate::error::FinderError;
use crate::traits::{Globber, Source};

// ---------------------------------------------------------------------------
// LazyGlobber
// ---------------------------------------------------------------------------

/// Turns a [`Globber`]'s paths into [`Descriptor`]s sharing one set of
/// [`Hooks`].
///
/// Every path is stat'ed up front; the checksum and MIME type are left for
/// the filters to request. The first path that cannot be stat'ed or made
/// absolute fails the whole expansion.
pub struct LazyGlobber<G> {
    globber: G,
    hooks:   Hooks,
}

impl<G: Globber> LazyGlobber<G> {
    pub fn new(globber: G, hooks: Hooks) -> Self {
        Self { globber, hooks }
    }
}

impl LazyGlobber<PatternGlobber> {
    /// Filesystem globbing with MD5 checksums and content-then-extension MIME
    /// detection.
    pub fn standard() -> Self {
        Self::new(PatternGlobber, Hooks::standard())
    }
}

impl<G: Globber> Source for LazyGlobber<G> {
    fn glob(&self, pattern: &str) -> Result<Vec<Descriptor>, FinderError> {
        self.globber
            .expand(pattern)?
            .into_iter()
            .map(|path| Descriptor::from_path(path, self.hooks.clone()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// PatternGlobber
// ---------------------------------------------------------------------------

/// Filesystem glob expansion.
///
/// `*`, `?`, `[...]` and `{a,b}` stay inside one path segment; `**` spans
/// zero or more segments, so `src/**/*.rs` also finds `src/lib.rs`. A
/// pattern without wildcards yields the path itself when it exists. Results
/// are sorted. Hidden files are included, ignore files are not consulted and
/// symlinked directories are not followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternGlobber;

impl Globber for PatternGlobber {
    fn expand(&self, pattern: &str) -> Result<Vec<PathBuf>, FinderError> {
        let split = split_pattern(pattern);

        if !split.has_wildcard {
            return Ok(if split.base.exists() { vec![split.base] } else { Vec::new() });
        }

        // Walked paths come out of `base`, which has `.` and `//` folded away,
        // so the matcher has to see the same spelling.
        let matcher = GlobBuilder::new(&split.normalized.to_string_lossy())
            .literal_separator(true)
            .build()
            .map_err(|source| FinderError::InvalidGlob {
                pattern: pattern.to_string(),
                source,
            })?
            .compile_matcher();

        // A pattern like "*.txt" is walked from "." but matched without the "./"
        let root = if split.base.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            split.base.clone()
        };
        let strip_dot = split.base.as_os_str().is_empty();
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let mut builder = WalkBuilder::new(&root);
        builder
            .standard_filters(false)
            .ignore(false)
            .parents(false)
            .hidden(false)
            .follow_links(false)
            .same_file_system(false);
        if !split.recursive {
            builder.max_depth(Some(split.depth));
        }

        let mut matches = Vec::new();
        for res in builder.build() {
            let entry = match res {
                Ok(e) => e,
                Err(e) => {
                    let err = map_ignore_error(e);
                    if err.is_recoverable() {
                        debug!(pattern, error = %err, "skipping unreadable entry");
                        continue;
                    }
                    return Err(err);
                }
            };

            // Skip the root itself
            if entry.depth() == 0 {
                continue;
            }

            let path = if strip_dot {
                entry.path().strip_prefix(".").unwrap_or(entry.path())
            } else {
                entry.path()
            };
            if matcher.is_match(path) {
                matches.push(path.to_path_buf());
            }
        }

        matches.sort();
        Ok(matches)
    }
}

struct SplitPattern {
    /// Leading segments without wildcards.
    base:         PathBuf,
    /// The whole pattern rebuilt from its components.
    normalized:   PathBuf,
    has_wildcard: bool,
    /// The pattern contains `**`.
    recursive:    bool,
    /// Segments after `base`.
    depth:        usize,
}

fn split_pattern(pattern: &str) -> SplitPattern {
    let mut base = PathBuf::new();
    let mut normalized = PathBuf::new();
    let mut depth = 0;
    let mut has_wildcard = false;

    for comp in Path::new(pattern).components() {
        normalized.push(comp);
        if has_wildcard {
            depth += 1;
            continue;
        }
        if let Component::Normal(seg) = comp {
            if is_wildcard(&seg.to_string_lossy()) {
                has_wildcard = true;
                depth = 1;
                continue;
            }
        }
        base.push(comp);
    }

    SplitPattern {
        base,
        normalized,
        has_wildcard,
        recursive: pattern.contains("**"),
        depth,
    }
}

fn is_wildcard(segment: &str) -> bool {
    segment.contains(['*', '?', '[', '{'])
}

// ---------------------------------------------------------------------------
// Map ignore::Error to FinderError
// ---------------------------------------------------------------------------

fn map_ignore_error(e: ignore::Error) -> FinderError {
    match e {
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(io_err) => {
                if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                    FinderError::PermissionDenied(path)
                } else {
                    FinderError::Io { path, source: io_err }
                }
            }
            other => FinderError::Walk(other.to_string()),
        },
        ignore::Error::WithDepth { err, .. } => map_ignore_error(*err),
        ignore::Error::Loop { child, .. } => FinderError::SymlinkLoop(child),
        ignore::Error::Io(io_err) => FinderError::Io {
            path:   PathBuf::new(),
            source: io_err,
        },
        other => FinderError::Walk(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn splits_literal_prefix() {
        let split = split_pattern("/data/photos/*/raw/*.cr2");
        assert_eq!(split.base, PathBuf::from("/data/photos"));
        assert!(split.has_wildcard);
        assert!(!split.recursive);
        assert_eq!(split.depth, 3);

        let split = split_pattern("src/**/*.rs");
        assert_eq!(split.base, PathBuf::from("src"));
        assert!(split.recursive);

        let split = split_pattern("*.txt");
        assert_eq!(split.base, PathBuf::new());
        assert_eq!(split.depth, 1);

        let split = split_pattern("/data/./photos//*.jpg");
        assert_eq!(split.base, PathBuf::from("/data/photos"));
        assert_eq!(split.normalized, PathBuf::from("/data/photos/*.jpg"));

        let split = split_pattern("Cargo.toml");
        assert!(!split.has_wildcard);
        assert_eq!(split.base, PathBuf::from("Cargo.toml"));
    }

    #[test]
    fn literal_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "a").unwrap();

        let found = PatternGlobber.expand(&file.to_string_lossy()).unwrap();
        assert_eq!(found, vec![file]);

        let missing = dir.path().join("missing.txt");
        assert!(PatternGlobber.expand(&missing.to_string_lossy()).unwrap().is_empty());
    }

    #[test]
    fn single_star_stays_in_segment() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.txt"), "b").unwrap();

        let pattern = format!("{}/*.txt", dir.path().display());
        let found = PatternGlobber.expand(&pattern).unwrap();
        assert_eq!(found, vec![dir.path().join("a.txt")]);
    }

    #[test]
    fn double_star_matches_zero_or_more_segments() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir_all(dir.path().join("x/y")).unwrap();
        fs::write(dir.path().join("x/b.txt"), "b").unwrap();
        fs::write(dir.path().join("x/y/c.txt"), "c").unwrap();
        fs::write(dir.path().join("x/y/d.md"), "d").unwrap();

        let pattern = format!("{}/**/*.txt", dir.path().display());
        let found = PatternGlobber.expand(&pattern).unwrap();
        assert_eq!(
            found,
            vec![
                dir.path().join("a.txt"),
                dir.path().join("x/b.txt"),
                dir.path().join("x/y/c.txt"),
            ]
        );
    }

    #[test]
    fn redundant_separators_and_dots() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/y.txt"), "y").unwrap();

        for rest in ["./*.txt", "/*.txt", "sub/.//../*.txt"] {
            let pattern = format!("{}/{}", dir.path().display(), rest);
            let found = PatternGlobber.expand(&pattern).unwrap();
            assert_eq!(found.len(), 1, "pattern {pattern}");
            assert_eq!(found[0].file_name().unwrap(), "x.txt");
        }

        let pattern = format!("{}/.//**/*.txt", dir.path().display());
        assert_eq!(PatternGlobber.expand(&pattern).unwrap().len(), 2);
    }

    #[test]
    fn invalid_glob() {
        let err = PatternGlobber.expand("/tmp/[").unwrap_err();
        assert!(matches!(err, FinderError::InvalidGlob { .. }));
    }

    #[test]
    fn lazy_globber_fails_on_vanished_path() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone");
        let globber = move |_: &str| -> Result<Vec<PathBuf>, FinderError> { Ok(vec![gone.clone()]) };

        let err = LazyGlobber::new(globber, Hooks::standard()).glob("*").unwrap_err();
        assert!(matches!(err, FinderError::Stat { .. }));
    }
}
