use std::time::Duration;

use crate::descriptor::Descriptor;

/// The output of a completed search.
pub struct Results {
    /// Descriptors that passed every filter, in the order workers finished
    /// with them. Not glob order, and not stable between runs.
    pub descriptors: Vec<Descriptor>,

    /// Scan statistics.
    pub stats: ScanStats,
}

impl Results {
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Entry names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.descriptors.iter().map(|d| d.name().to_string()).collect();
        names.sort();
        names
    }

    pub fn into_descriptors(self) -> Vec<Descriptor> {
        self.descriptors
    }
}

impl IntoIterator for Results {
    type Item = Descriptor;
    type IntoIter = std::vec::IntoIter<Descriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.into_iter()
    }
}

/// Statistics for a completed search.
#[derive(Debug, Clone)]
pub struct ScanStats {
    /// Descriptors produced by the source.
    pub scanned: usize,

    /// Descriptors that passed the chain.
    pub matched: usize,

    /// Descriptors a filter said no to.
    pub rejected: usize,

    /// Descriptors dropped because a filter could not be evaluated (I/O
    /// failure while reading a checksum or MIME type, for example). These are
    /// excluded from the result without failing the search.
    pub failed: usize,

    /// Worker threads actually spawned.
    pub workers: usize,

    /// Wall-clock time spent filtering.
    pub duration: Duration,

    /// `scanned / duration`, clamped to 0 on zero-duration runs.
    pub entries_per_sec: usize,
}

impl ScanStats {
    pub(crate) fn compute(
        scanned: usize,
        matched: usize,
        rejected: usize,
        failed: usize,
        workers: usize,
        duration: Duration,
    ) -> Self {
        let eps = if duration.as_secs_f64() > 0.0 {
            (scanned as f64 / duration.as_secs_f64()) as usize
        } else {
            0
        };
        Self {
            scanned,
            matched,
            rejected,
            failed,
            workers,
            duration,
            entries_per_sec: eps,
        }
    }
}
