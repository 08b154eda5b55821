use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinderError {
    // Config
    #[error("invalid size compare operator {0:?}")]
    InvalidOperator(String),

    #[error("invalid pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid glob {pattern:?}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("worker count must be larger than 0, got {0}")]
    InvalidWorkerCount(usize),

    // Collaborators
    #[error("glob {pattern:?}")]
    Glob {
        pattern: String,
        #[source]
        source: Box<FinderError>,
    },

    #[error("stat {path:?}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("absolute path of {path:?}")]
    Absolute {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error at {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("permission denied")]
    PermissionDenied(PathBuf),

    #[error("symlink loop")]
    SymlinkLoop(PathBuf),

    #[error("walk error: {0}")]
    Walk(String),

    // Lazy descriptor fields
    #[error("checksum")]
    Checksum(#[source] Box<FinderError>),

    #[error("mime")]
    Mime(#[source] Box<FinderError>),

    // Runtime
    #[error("thread pool failure: {0}")]
    ThreadPool(String),

    // Third-party extensibility
    #[error("source error: {0}")]
    Source(String),

    #[error("filter error: {0}")]
    Filter(String),
}

impl FinderError {
    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Stat { path, .. }
            | Self::Absolute { path, .. }
            | Self::Io { path, .. }
            | Self::PermissionDenied(path)
            | Self::SymlinkLoop(path) => Some(path),
            Self::Glob { source, .. } | Self::Checksum(source) | Self::Mime(source) => source.path(),
            _ => None,
        }
    }

    /// Whether a glob expansion can keep going after this error.
    ///
    /// Permission problems and symlink loops below the glob base are skipped;
    /// everything else aborts the expansion.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::PermissionDenied(_) | Self::SymlinkLoop(_))
    }

    /// Whether this error was raised while configuring a finder, before any
    /// file was touched.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidOperator(_)
                | Self::InvalidPattern { .. }
                | Self::InvalidGlob { .. }
                | Self::InvalidWorkerCount(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_looks_through_wrappers() {
        let inner = FinderError::Io {
            path: PathBuf::from("/data/a.bin"),
            source: std::io::Error::other("boom"),
        };
        let err = FinderError::Checksum(Box::new(inner));
        assert_eq!(err.path(), Some(&PathBuf::from("/data/a.bin")));
        assert!(!err.is_config());
    }

    #[test]
    fn classifies_config_errors() {
        assert!(FinderError::InvalidWorkerCount(0).is_config());
        assert!(FinderError::InvalidOperator("=>".into()).is_config());
        assert!(!FinderError::Walk("x".into()).is_config());
        assert!(FinderError::SymlinkLoop(PathBuf::from("a")).is_recoverable());
    }
}
