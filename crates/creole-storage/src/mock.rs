//! In-memory source and sink for testing.
//!
//! Provides [`MockSource`] and [`MockSink`] for exercising the export
//! pipeline without filesystem access.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::error::{StorageError, StorageErrorKind};
use crate::storage::{Document, DocumentFailure, DocumentSink, DocumentSource, ScanResult};

const BACKEND: &str = "Mock";

/// Source returning a fixed set of documents.
///
/// # Example
///
/// ```
/// use creole_storage::{DocumentSource, MockSource};
///
/// let source = MockSource::new()
///     .with_document("Home", "= Welcome")
///     .with_document("About", "**us**");
///
/// assert_eq!(source.scan().unwrap().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MockSource {
    documents: Vec<Document>,
    unreadable: Vec<String>,
    fail_scan: bool,
}

impl MockSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_document(mut self, title: impl Into<String>, text: impl Into<String>) -> Self {
        self.documents.push(Document::new(title, text));
        self
    }

    /// Report `title` as a page that exists but fails to decode.
    #[must_use]
    pub fn with_unreadable(mut self, title: impl Into<String>) -> Self {
        self.unreadable.push(title.into());
        self
    }

    /// Make [`DocumentSource::scan`] fail with `Io`.
    #[must_use]
    pub fn with_scan_failure(mut self) -> Self {
        self.fail_scan = true;
        self
    }
}

impl DocumentSource for MockSource {
    fn scan(&self) -> Result<ScanResult, StorageError> {
        if self.fail_scan {
            return Err(StorageError::new(StorageErrorKind::Io).with_backend(BACKEND));
        }
        let failures = self
            .unreadable
            .iter()
            .map(|title| {
                let error = StorageError::new(StorageErrorKind::InvalidData)
                    .with_backend(BACKEND)
                    .with_path(title);
                DocumentFailure::new(title.clone(), error)
            })
            .collect();
        Ok(ScanResult {
            documents: self.documents.clone(),
            failures,
        })
    }
}

/// Sink recording everything written to it.
#[derive(Debug, Default)]
pub struct MockSink {
    written: RwLock<HashMap<String, (String, String)>>,
    prepared: RwLock<usize>,
    failing_titles: HashSet<String>,
    fail_prepare: bool,
}

impl MockSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make writes for `title` fail with `PermissionDenied`.
    #[must_use]
    pub fn with_write_failure(mut self, title: impl Into<String>) -> Self {
        self.failing_titles.insert(title.into());
        self
    }

    /// Make [`DocumentSink::prepare`] fail with `PermissionDenied`.
    #[must_use]
    pub fn with_prepare_failure(mut self) -> Self {
        self.fail_prepare = true;
        self
    }

    /// Raw text and HTML written for `title`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn written(&self, title: &str) -> Option<(String, String)> {
        self.written.read().unwrap().get(title).cloned()
    }

    /// Number of documents written.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.written.read().unwrap().len()
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of times [`DocumentSink::prepare`] succeeded.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn prepare_count(&self) -> usize {
        *self.prepared.read().unwrap()
    }
}

impl DocumentSink for MockSink {
    fn prepare(&self) -> Result<(), StorageError> {
        if self.fail_prepare {
            return Err(StorageError::new(StorageErrorKind::PermissionDenied).with_backend(BACKEND));
        }
        *self.prepared.write().unwrap() += 1;
        self.written.write().unwrap().clear();
        Ok(())
    }

    fn write(&self, document: &Document, html: &str) -> Result<(), StorageError> {
        if self.failing_titles.contains(&document.title) {
            return Err(StorageError::new(StorageErrorKind::PermissionDenied)
                .with_backend(BACKEND)
                .with_path(&document.title));
        }
        self.written.write().unwrap().insert(
            document.title.clone(),
            (document.text.clone(), html.to_owned()),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_source_returns_documents() {
        let source = MockSource::new().with_document("Home", "x");

        assert_eq!(
            source.scan().unwrap().documents,
            vec![Document::new("Home", "x")]
        );
    }

    #[test]
    fn test_mock_source_unreadable_page() {
        let source = MockSource::new()
            .with_document("Home", "x")
            .with_unreadable("Broken");

        let result = source.scan().unwrap();

        assert_eq!(result.documents.len(), 1);
        assert_eq!(result.failures[0].title, "Broken");
        assert_eq!(result.failures[0].error.kind, StorageErrorKind::InvalidData);
    }

    #[test]
    fn test_mock_source_scan_failure() {
        let source = MockSource::new().with_scan_failure();

        assert_eq!(source.scan().unwrap_err().kind, StorageErrorKind::Io);
    }

    #[test]
    fn test_mock_sink_records_writes() {
        let sink = MockSink::new();
        sink.prepare().unwrap();

        sink.write(&Document::new("Home", "x"), "<P>x</P>").unwrap();

        assert_eq!(sink.prepare_count(), 1);
        assert_eq!(
            sink.written("Home"),
            Some(("x".to_owned(), "<P>x</P>".to_owned()))
        );
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_mock_sink_write_failure() {
        let sink = MockSink::new().with_write_failure("Broken");

        let err = sink.write(&Document::new("Broken", "x"), "y").unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::PermissionDenied);
        assert!(sink.is_empty());
    }
}
