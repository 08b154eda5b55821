#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use globsift::{Descriptor, EntryKind, FinderError, Hooks, Source, Stat};

// ---------------------------------------------------------------------------
// Mock descriptors
// ---------------------------------------------------------------------------

/// Blueprint for an in-memory descriptor with fixed MIME type and checksum.
#[derive(Clone, Default)]
pub struct MockFile {
    pub name:     &'static str,
    pub size:     u64,
    pub mime:     &'static str,
    pub checksum: Vec<u8>,
    pub abs:      Option<&'static str>,
    pub relative: Option<&'static str>,
}

impl MockFile {
    pub fn named(name: &'static str) -> Self {
        Self { name, ..Self::default() }
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn mime(mut self, mime: &'static str) -> Self {
        self.mime = mime;
        self
    }

    pub fn checksum(mut self, checksum: &[u8]) -> Self {
        self.checksum = checksum.to_vec();
        self
    }

    pub fn abs(mut self, abs: &'static str) -> Self {
        self.abs = Some(abs);
        self
    }

    pub fn relative(mut self, relative: &'static str) -> Self {
        self.relative = Some(relative);
        self
    }

    pub fn descriptor(&self) -> Descriptor {
        let mime = self.mime.to_string();
        let checksum = self.checksum.clone();
        let hooks = Hooks::new(
            move |_: &Path| -> Result<Vec<u8>, FinderError> { Ok(checksum.clone()) },
            move |_: &Path| -> Result<String, FinderError> { Ok(mime.clone()) },
        );
        self.with_hooks(hooks)
    }

    pub fn with_hooks(&self, hooks: Hooks) -> Descriptor {
        let abs = match self.abs {
            Some(abs) => PathBuf::from(abs),
            None => PathBuf::from("/mock").join(self.name),
        };
        Descriptor::new(
            Stat {
                name:     self.name.to_string(),
                size:     self.size,
                kind:     EntryKind::File,
                mode:     0o644,
                modified: Some(SystemTime::UNIX_EPOCH),
            },
            abs,
            self.relative.map(PathBuf::from),
            hooks,
        )
    }
}

/// A source that ignores the pattern and yields fresh descriptors for `files`.
pub fn mock_source(files: Vec<MockFile>) -> impl Source {
    move |_: &str| -> Result<Vec<Descriptor>, FinderError> {
        Ok(files.iter().map(MockFile::descriptor).collect())
    }
}

// ---------------------------------------------------------------------------
// Call counting
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Hooks that count their calls and answer with fixed values.
pub fn counting_hooks(checksum: &[u8], mime: &'static str) -> (Hooks, Counter, Counter) {
    let checksum_calls = Counter::default();
    let mime_calls = Counter::default();

    let digest = checksum.to_vec();
    let cs = checksum_calls.clone();
    let mc = mime_calls.clone();
    let hooks = Hooks::new(
        move |_: &Path| -> Result<Vec<u8>, FinderError> {
            cs.hit();
            Ok(digest.clone())
        },
        move |_: &Path| -> Result<String, FinderError> {
            mc.hit();
            Ok(mime.to_string())
        },
    );

    (hooks, checksum_calls, mime_calls)
}
