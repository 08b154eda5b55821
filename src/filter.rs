use std::fmt;
use std::str::FromStr;

use globset::{GlobBuilder, GlobMatcher};
use regex::{Regex, RegexSet};

use crate::descriptor::Descriptor;
use crate::error::FinderError;
use crate::traits::Filter;

/// Evaluation weights of the built-in filters.
///
/// A stat read is free, regex work is in-memory, MIME detection reads a file
/// header and a checksum reads the whole file.
pub mod order {
    pub const SIZE:     u32 = 1;
    pub const REGEXP:   u32 = 2;
    pub const EXCLUDE:  u32 = 2;
    pub const MIME:     u32 = 50;
    pub const CHECKSUM: u32 = 100;
}

// ---------------------------------------------------------------------------
// CmpOp
// ---------------------------------------------------------------------------

/// Size comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    MoreThan,
    MoreOrEqual,
    LessThan,
    LessOrEqual,
    Equal,
}

impl CmpOp {
    pub fn apply(self, lhs: u64, rhs: u64) -> bool {
        match self {
            Self::MoreThan    => lhs > rhs,
            Self::MoreOrEqual => lhs >= rhs,
            Self::LessThan    => lhs < rhs,
            Self::LessOrEqual => lhs <= rhs,
            Self::Equal       => lhs == rhs,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MoreThan    => ">",
            Self::MoreOrEqual => ">=",
            Self::LessThan    => "<",
            Self::LessOrEqual => "<=",
            Self::Equal       => "==",
        }
    }
}

impl FromStr for CmpOp {
    type Err = FinderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">"  => Ok(Self::MoreThan),
            ">=" => Ok(Self::MoreOrEqual),
            "<"  => Ok(Self::LessThan),
            "<=" => Ok(Self::LessOrEqual),
            "==" => Ok(Self::Equal),
            other => Err(FinderError::InvalidOperator(other.to_string())),
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn compile(pattern: &str) -> Result<Regex, FinderError> {
    Regex::new(pattern).map_err(|source| FinderError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Compile `patterns` into one set; the first bad pattern is reported.
pub(crate) fn compile_set<S: AsRef<str>>(patterns: &[S]) -> Result<RegexSet, FinderError> {
    for pattern in patterns {
        compile(pattern.as_ref())?;
    }
    RegexSet::new(patterns).map_err(|source| FinderError::InvalidPattern {
        pattern: patterns.iter().map(|p| p.as_ref()).collect::<Vec<&str>>().join(" | "),
        source,
    })
}

// ---------------------------------------------------------------------------
// Built-in filters
// ---------------------------------------------------------------------------

pub(crate) struct SizeFilter {
    pub op:    CmpOp,
    pub value: u64,
}

impl Filter for SizeFilter {
    fn name(&self) -> &'static str {
        "size"
    }

    fn order(&self) -> u32 {
        order::SIZE
    }

    fn check(&self, d: &mut Descriptor) -> Result<bool, FinderError> {
        Ok(self.op.apply(d.size(), self.value))
    }
}

pub(crate) struct MimeFilter {
    pub expected: String,
}

impl Filter for MimeFilter {
    fn name(&self) -> &'static str {
        "mime"
    }

    fn order(&self) -> u32 {
        order::MIME
    }

    fn check(&self, d: &mut Descriptor) -> Result<bool, FinderError> {
        Ok(d.mime()? == self.expected)
    }
}

pub(crate) struct MimeRegexFilter {
    pub regex: Regex,
}

impl Filter for MimeRegexFilter {
    fn name(&self) -> &'static str {
        "mime-regexp"
    }

    fn order(&self) -> u32 {
        order::MIME
    }

    fn check(&self, d: &mut Descriptor) -> Result<bool, FinderError> {
        Ok(self.regex.is_match(d.mime()?))
    }
}

/// Compares the lowercase hex of the digest with the expected text as given.
/// Uppercase input never matches.
pub(crate) struct ChecksumFilter {
    pub hex: String,
}

impl Filter for ChecksumFilter {
    fn name(&self) -> &'static str {
        "checksum"
    }

    fn order(&self) -> u32 {
        order::CHECKSUM
    }

    fn check(&self, d: &mut Descriptor) -> Result<bool, FinderError> {
        Ok(hex::encode(d.checksum()?) == self.hex)
    }
}

/// Name is found by any pattern of the set.
pub(crate) struct NameRegexFilter {
    pub set: RegexSet,
}

impl Filter for NameRegexFilter {
    fn name(&self) -> &'static str {
        "regexp-name"
    }

    fn order(&self) -> u32 {
        order::REGEXP
    }

    fn check(&self, d: &mut Descriptor) -> Result<bool, FinderError> {
        Ok(self.set.is_match(d.name()))
    }
}

/// Absolute path is found by any pattern of the set.
pub(crate) struct PathRegexFilter {
    pub set: RegexSet,
}

impl Filter for PathRegexFilter {
    fn name(&self) -> &'static str {
        "regexp-path"
    }

    fn order(&self) -> u32 {
        order::REGEXP
    }

    fn check(&self, d: &mut Descriptor) -> Result<bool, FinderError> {
        Ok(self.set.is_match(&d.absolute_path().to_string_lossy()))
    }
}

/// Shell-style match against the entry name (`*.jpg`, `report-??.pdf`).
pub(crate) struct NameGlobFilter {
    pub matcher: GlobMatcher,
}

impl NameGlobFilter {
    pub fn new(pattern: &str) -> Result<Self, FinderError> {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|source| FinderError::InvalidGlob {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self { matcher: glob.compile_matcher() })
    }
}

impl Filter for NameGlobFilter {
    fn name(&self) -> &'static str {
        "name-glob"
    }

    fn order(&self) -> u32 {
        order::REGEXP
    }

    fn check(&self, d: &mut Descriptor) -> Result<bool, FinderError> {
        Ok(self.matcher.is_match(d.name()))
    }
}

/// Keeps an entry only when none of the patterns finds its relative path.
/// Entries without a relative path are tested on their absolute path.
pub(crate) struct ExcludeFilter {
    pub set: RegexSet,
}

impl Filter for ExcludeFilter {
    fn name(&self) -> &'static str {
        "exclude"
    }

    fn order(&self) -> u32 {
        order::EXCLUDE
    }

    fn check(&self, d: &mut Descriptor) -> Result<bool, FinderError> {
        let path = d.relative_path().unwrap_or_else(|| d.absolute_path());
        Ok(!self.set.is_match(&path.to_string_lossy()))
    }
}

// ---------------------------------------------------------------------------
// FilterChain
// ---------------------------------------------------------------------------

/// Outcome of running a chain over one descriptor.
#[derive(Debug)]
pub enum Verdict {
    /// Every filter accepted the descriptor.
    Match,

    /// A filter rejected it; later filters were not run.
    Reject,

    /// A filter failed to evaluate; later filters were not run.
    Error {
        filter: &'static str,
        error:  FinderError,
    },
}

/// Filters combined with logical AND, kept sorted by [`Filter::order`].
///
/// The sort is stable, so filters of equal weight run in insertion order.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, filter: impl Filter + 'static) {
        self.push_boxed(Box::new(filter));
    }

    pub fn push_boxed(&mut self, filter: Box<dyn Filter>) {
        self.filters.push(filter);
        self.filters.sort_by_key(|f| f.order());
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Filter names in evaluation order.
    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Run the filters cheapest first, stopping at the first rejection or
    /// error. An empty chain matches everything.
    pub fn evaluate(&self, descriptor: &mut Descriptor) -> Verdict {
        for filter in &self.filters {
            match filter.check(descriptor) {
                Ok(true) => {}
                Ok(false) => return Verdict::Reject,
                Err(error) => {
                    return Verdict::Error {
                        filter: filter.name(),
                        error,
                    }
                }
            }
        }
        Verdict::Match
    }
}
