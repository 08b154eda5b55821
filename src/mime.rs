//! Default MIME detection strategies.
//!
//! [`ContentSniffer`] looks at magic bytes in the file header, which works even
//! when a file is renamed or has no extension. [`ExtensionLookup`] covers what
//! magic bytes cannot (plain text, source code, config files). [`MultiDetector`]
//! chains strategies: the first non-empty answer wins.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::FinderError;
use crate::traits::MimeDetector;

/// Number of header bytes handed to the magic-byte matcher.
const SNIFF_LEN: usize = 8192;

/// Identifies a file by its leading bytes.
///
/// Returns an empty string when the header matches no known signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentSniffer;

impl MimeDetector for ContentSniffer {
    fn detect(&self, path: &Path) -> Result<String, FinderError> {
        let io_err = |source| FinderError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_err)?;
        let mut header = Vec::with_capacity(SNIFF_LEN);
        file.take(SNIFF_LEN as u64)
            .read_to_end(&mut header)
            .map_err(io_err)?;

        Ok(infer::get(&header)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_default())
    }
}

/// Guesses the MIME type from the file extension alone. No I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionLookup;

impl MimeDetector for ExtensionLookup {
    fn detect(&self, path: &Path) -> Result<String, FinderError> {
        Ok(mime_guess::from_path(path)
            .first_raw()
            .map(str::to_string)
            .unwrap_or_default())
    }
}

/// Runs detectors in order and returns the first non-empty type.
///
/// An error from any detector stops the chain and is returned as is.
pub struct MultiDetector {
    detectors: Vec<Box<dyn MimeDetector>>,
}

impl MultiDetector {
    pub fn new() -> Self {
        Self { detectors: Vec::new() }
    }

    /// Content sniffing first, extension lookup as the fallback.
    pub fn standard() -> Self {
        Self::new().with(ContentSniffer).with(ExtensionLookup)
    }

    pub fn with(mut self, detector: impl MimeDetector + 'static) -> Self {
        self.detectors.push(Box::new(detector));
        self
    }
}

impl Default for MultiDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl MimeDetector for MultiDetector {
    fn detect(&self, path: &Path) -> Result<String, FinderError> {
        for detector in &self.detectors {
            let mime = detector.detect(path)?;
            if !mime.is_empty() {
                return Ok(mime);
            }
        }
        Ok(String::new())
    }
}
