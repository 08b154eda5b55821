use regex::RegexSet;
use tracing::debug;

use crate::engine::{run, PoolConfig};
use crate::error::FinderError;
use crate::filter::{
    compile, compile_set, ChecksumFilter, CmpOp, ExcludeFilter, FilterChain, MimeFilter, MimeRegexFilter,
    NameGlobFilter, NameRegexFilter, PathRegexFilter, SizeFilter,
};
use crate::results::Results;
use crate::traits::{Filter, Source};

/// Worker count used when [`FinderBuilder::workers`] is not called.
pub const DEFAULT_WORKERS: usize = 8;

// ---------------------------------------------------------------------------
// FinderBuilder
// ---------------------------------------------------------------------------

/// Configures a [`Finder`]: the source, the filter chain and the pool size.
///
/// Created via [`globsift::finder()`](crate::finder) for the standard
/// filesystem collaborators, or [`FinderBuilder::new`] with an explicit
/// [`Source`]. Configuration mistakes (bad operator, bad regex, zero
/// workers) are recorded when the call is made; the first one sticks and
/// turns every later builder call into a no-op. It is reported by
/// [`build()`](FinderBuilder::build), or by [`glob()`](FinderBuilder::glob)
/// before the source is touched.
///
/// # Example
///
/// ```rust,ignore
/// let results = globsift::finder()
///     .size(">", 1024)
///     .mime_regexp("^image/")
///     .exclude(&[r"/thumbs/"])
///     .workers(16)
///     .glob("photos/**/*")?;
/// ```
pub struct FinderBuilder {
    source:  Box<dyn Source>,
    chain:   FilterChain,
    workers: usize,
    error:   Option<FinderError>,
}

impl FinderBuilder {
    pub fn new(source: impl Source + 'static) -> Self {
        Self {
            source:  Box::new(source),
            chain:   FilterChain::new(),
            workers: DEFAULT_WORKERS,
            error:   None,
        }
    }

    // ── Options ───────────────────────────────────────────────────────────

    /// Number of filter workers. Must be larger than 0.
    pub fn workers(mut self, n: usize) -> Self {
        if self.error.is_some() {
            return self;
        }
        if n == 0 {
            return self.fail(FinderError::InvalidWorkerCount(n));
        }
        self.workers = n;
        self
    }

    // ── Filters ───────────────────────────────────────────────────────────

    /// Keep entries whose size compares true against `value`.
    ///
    /// `op` is one of `>`, `>=`, `<`, `<=`, `==`; anything else is a
    /// configuration error.
    pub fn size(self, op: &str, value: u64) -> Self {
        if self.error.is_some() {
            return self;
        }
        match op.parse::<CmpOp>() {
            Ok(op) => self.size_cmp(op, value),
            Err(e) => self.fail(e),
        }
    }

    /// Typed form of [`size`](FinderBuilder::size).
    pub fn size_cmp(self, op: CmpOp, value: u64) -> Self {
        self.add(SizeFilter { op, value })
    }

    /// Keep entries whose detected MIME type equals `expected`.
    pub fn mime(self, expected: impl Into<String>) -> Self {
        self.add(MimeFilter { expected: expected.into() })
    }

    /// Keep entries whose detected MIME type is found by `pattern`.
    pub fn mime_regexp(self, pattern: &str) -> Self {
        self.add_compiled(pattern, |regex| MimeRegexFilter { regex })
    }

    /// Keep entries whose content digest, as lowercase hex, equals `hex`.
    ///
    /// The comparison is case-sensitive: uppercase hex never matches.
    pub fn checksum(self, hex: impl Into<String>) -> Self {
        self.add(ChecksumFilter { hex: hex.into() })
    }

    /// Keep entries whose name is found by `pattern`.
    pub fn regexp_name(self, pattern: &str) -> Self {
        self.regexp_name_any([pattern])
    }

    /// Keep entries whose name is found by any of `patterns`.
    /// An empty set matches nothing.
    pub fn regexp_name_any<I, S>(self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_set(patterns, |set| NameRegexFilter { set })
    }

    /// Keep entries whose absolute path is found by `pattern`.
    pub fn regexp_path(self, pattern: &str) -> Self {
        self.regexp_path_any([pattern])
    }

    /// Keep entries whose absolute path is found by any of `patterns`.
    /// An empty set matches nothing.
    pub fn regexp_path_any<I, S>(self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_set(patterns, |set| PathRegexFilter { set })
    }

    /// Keep entries whose name matches the shell pattern (`*.jpg`).
    pub fn name_glob(self, pattern: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        match NameGlobFilter::new(pattern) {
            Ok(filter) => self.add(filter),
            Err(e) => self.fail(e),
        }
    }

    /// Drop entries whose relative path is found by any of `patterns`.
    /// An empty set keeps everything.
    ///
    /// # Panics
    ///
    /// Panics if a pattern does not compile. Unlike the other pattern filters
    /// this is not recorded as a configuration error.
    pub fn exclude<I, S>(self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.error.is_some() {
            return self;
        }
        let patterns: Vec<String> = patterns.into_iter().map(|p| p.as_ref().to_string()).collect();
        let set = match RegexSet::new(&patterns) {
            Ok(set) => set,
            Err(e) => panic!("invalid exclude pattern in {patterns:?}: {e}"),
        };
        self.add(ExcludeFilter { set })
    }

    /// Append a caller-defined filter. It is placed by its own
    /// [`order`](Filter::order).
    pub fn with_filter(self, filter: impl Filter + 'static) -> Self {
        self.add(filter)
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Finish configuration.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error recorded by a builder call.
    pub fn build(self) -> Result<Finder, FinderError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        Ok(Finder {
            source: self.source,
            chain:  self.chain,
            pool:   PoolConfig { workers: self.workers },
        })
    }

    /// Build and run a single search.
    pub fn glob(self, pattern: &str) -> Result<Results, FinderError> {
        self.build()?.glob(pattern)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn add(mut self, filter: impl Filter + 'static) -> Self {
        if self.error.is_none() {
            self.chain.push(filter);
        }
        self
    }

    fn add_compiled<F>(self, pattern: &str, make: impl FnOnce(regex::Regex) -> F) -> Self
    where
        F: Filter + 'static,
    {
        if self.error.is_some() {
            return self;
        }
        match compile(pattern) {
            Ok(regex) => self.add(make(regex)),
            Err(e) => self.fail(e),
        }
    }

    fn add_set<I, S, F>(self, patterns: I, make: impl FnOnce(RegexSet) -> F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Filter + 'static,
    {
        if self.error.is_some() {
            return self;
        }
        let patterns: Vec<String> = patterns.into_iter().map(|p| p.as_ref().to_string()).collect();
        match compile_set(&patterns) {
            Ok(set) => self.add(make(set)),
            Err(e) => self.fail(e),
        }
    }

    fn fail(mut self, e: FinderError) -> Self {
        debug!(error = %e, "finder configuration rejected");
        self.error.get_or_insert(e);
        self
    }
}

// ---------------------------------------------------------------------------
// Finder
// ---------------------------------------------------------------------------

/// A fully configured search: source, sorted filter chain and pool size.
///
/// Immutable once built, so one finder can serve several searches, also from
/// different threads.
pub struct Finder {
    source: Box<dyn Source>,
    chain:  FilterChain,
    pool:   PoolConfig,
}

impl Finder {
    /// Expand `pattern` through the source and keep what passes the chain.
    ///
    /// Blocks until every descriptor has been accounted for.
    ///
    /// # Errors
    ///
    /// A source failure is returned wrapped in [`FinderError::Glob`] with no
    /// partial result. Per-descriptor filter errors are *not* returned: the
    /// descriptor is excluded and counted in [`ScanStats::failed`](crate::ScanStats::failed).
    pub fn glob(&self, pattern: &str) -> Result<Results, FinderError> {
        debug!(pattern, workers = self.pool.workers, filters = ?self.chain.names(), "glob start");

        let descriptors = self.source.glob(pattern).map_err(|e| FinderError::Glob {
            pattern: pattern.to_string(),
            source:  Box::new(e),
        })?;

        let results = run(descriptors, &self.chain, &self.pool)?;

        debug!(
            pattern,
            scanned = results.stats.scanned,
            matched = results.stats.matched,
            failed = results.stats.failed,
            elapsed_ms = results.stats.duration.as_millis() as u64,
            "glob done"
        );
        Ok(results)
    }

    pub fn workers(&self) -> usize {
        self.pool.workers
    }

    pub fn chain(&self) -> &FilterChain {
        &self.chain
    }
}
