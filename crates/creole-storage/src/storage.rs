//! Document source and sink traits.
//!
//! A [`DocumentSource`] yields wiki pages as `(title, raw markup)` pairs. A
//! [`DocumentSink`] persists each page next to its rendered HTML. Neither knows
//! anything about Creole; the export pipeline sits between them.

use crate::error::StorageError;

/// One wiki page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    /// Page title, also used as the output file name.
    pub title: String,
    /// Raw Creole markup.
    pub text: String,
}

impl Document {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}

/// A page that could not be read or written.
#[derive(Debug)]
pub struct DocumentFailure {
    /// Page title, or a locator such as `line 12` when the title is unknown.
    pub title: String,
    pub error: StorageError,
}

impl DocumentFailure {
    pub fn new(title: impl Into<String>, error: StorageError) -> Self {
        Self {
            title: title.into(),
            error,
        }
    }
}

/// Everything a source found: pages it loaded and pages it could not.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub documents: Vec<Document>,
    pub failures: Vec<DocumentFailure>,
}

impl ScanResult {
    /// Number of pages found, loaded or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len() + self.failures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Where wiki pages come from.
pub trait DocumentSource: Send + Sync {
    /// Load every document.
    ///
    /// A page that cannot be loaded ends up in [`ScanResult::failures`] and
    /// the rest are still returned.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing store cannot be read as a
    /// whole.
    fn scan(&self) -> Result<ScanResult, StorageError>;
}

/// Where exported pages go.
///
/// `write` may be called from several threads at once.
pub trait DocumentSink: Send + Sync {
    /// Make the destination ready and clear out a previous export.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the destination cannot be created or
    /// cleared.
    fn prepare(&self) -> Result<(), StorageError>;

    /// Persist the raw markup and the rendered fragment of one document.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if either output cannot be written.
    fn write(&self, document: &Document, html: &str) -> Result<(), StorageError>;
}
