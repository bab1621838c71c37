//! Document-to-text conversion.
//!
//! The pipeline only sees plain text; converters turn tracked files into
//! it. `PlainTextConverter` handles the text-native formats directly.
//! Binary formats (pdf, docx, xlsx) are tracked by the watcher but need
//! their own `DocumentConverter` implementation wired in at the pipeline
//! seam.

use std::fs;
use std::path::Path;

use corpus_types::record::extension_of;
use thiserror::Error;

/// Errors raised while converting a document to text
#[derive(Error, Debug)]
pub enum ConvertError {
    /// No converter for this extension
    #[error("Unsupported file type: {0}")]
    Unsupported(String),

    /// Reading the source file failed
    #[error("Read error: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns a tracked file into plain text for chunking.
pub trait DocumentConverter: Send + Sync {
    /// Extract the text content of the file at `path`.
    fn convert(&self, path: &Path) -> Result<String, ConvertError>;

    /// Whether this converter handles the given lowercase extension.
    fn supports(&self, extension: &str) -> bool;
}

/// Converter for text-native formats: txt, md, csv.
///
/// File bytes are decoded as UTF-8 with invalid sequences replaced, so a
/// stray binary byte degrades one character instead of failing the file.
#[derive(Debug, Default, Clone)]
pub struct PlainTextConverter;

impl PlainTextConverter {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentConverter for PlainTextConverter {
    fn convert(&self, path: &Path) -> Result<String, ConvertError> {
        let extension = extension_of(path).unwrap_or_default();
        if !self.supports(&extension) {
            return Err(ConvertError::Unsupported(extension));
        }

        let bytes = fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn supports(&self, extension: &str) -> bool {
        matches!(extension, "txt" | "md" | "csv")
    }
}
