//! Parallel render-and-write pipeline.

use std::time::Instant;

use creole_renderer::{CreoleRenderer, LinkResolver, ParserConfig};
use creole_storage::{Document, DocumentFailure, DocumentSink, DocumentSource, StorageError};
use rayon::prelude::*;

/// Error that stops the whole export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Output directories could not be prepared.
    #[error("Failed to prepare output: {0}")]
    Prepare(#[source] StorageError),
    /// Pages could not be read from the source.
    #[error("Failed to read pages: {0}")]
    Scan(#[source] StorageError),
}

/// Outcome of an export run.
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Titles written successfully, in source order.
    pub exported: Vec<String>,
    /// Pages the source could not load, then pages that could not be
    /// written in source order.
    pub failures: Vec<DocumentFailure>,
}

impl ExportReport {
    /// Number of pages the source found, loaded or not.
    #[must_use]
    pub fn total(&self) -> usize {
        self.exported.len() + self.failures.len()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

type ProgressFn<'a> = Box<dyn Fn() + Send + Sync + 'a>;

/// Renders every page of a source into a sink.
///
/// # Example
///
/// ```
/// use creole_export::Exporter;
/// use creole_renderer::ParserConfig;
/// use creole_storage::{MockSink, MockSource};
///
/// let source = MockSource::new().with_document("Home", "**hi**");
/// let sink = MockSink::new();
/// let config = ParserConfig::default();
///
/// let report = Exporter::new(&source, &sink, &config).run().unwrap();
/// assert_eq!(report.exported, vec!["Home".to_owned()]);
/// ```
pub struct Exporter<'a> {
    source: &'a dyn DocumentSource,
    sink: &'a dyn DocumentSink,
    config: &'a ParserConfig,
    resolver: Option<&'a dyn LinkResolver>,
    on_progress: Option<ProgressFn<'a>>,
    on_scanned: Option<Box<dyn Fn(usize) + Send + Sync + 'a>>,
}

impl<'a> Exporter<'a> {
    #[must_use]
    pub fn new(
        source: &'a dyn DocumentSource,
        sink: &'a dyn DocumentSink,
        config: &'a ParserConfig,
    ) -> Self {
        Self {
            source,
            sink,
            config,
            resolver: None,
            on_progress: None,
            on_scanned: None,
        }
    }

    /// Classify wiki links with `resolver` before they are emitted.
    #[must_use]
    pub fn with_link_resolver(mut self, resolver: &'a dyn LinkResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Call `on_progress` once per processed page, from worker threads.
    #[must_use]
    pub fn with_progress(mut self, on_progress: impl Fn() + Send + Sync + 'a) -> Self {
        self.on_progress = Some(Box::new(on_progress));
        self
    }

    /// Call `on_scanned` with the number of pages to render once the source
    /// has been read.
    #[must_use]
    pub fn with_scan_callback(mut self, on_scanned: impl Fn(usize) + Send + Sync + 'a) -> Self {
        self.on_scanned = Some(Box::new(on_scanned));
        self
    }

    /// Run the export.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if the sink cannot be prepared or the source
    /// cannot be scanned. Pages the source cannot load and per-page write
    /// errors end up in [`ExportReport::failures`] instead.
    pub fn run(&self) -> Result<ExportReport, ExportError> {
        let start = Instant::now();

        self.sink.prepare().map_err(ExportError::Prepare)?;
        let scanned = self.source.scan().map_err(ExportError::Scan)?;
        tracing::info!(
            documents = scanned.documents.len(),
            unreadable = scanned.failures.len(),
            "Scanned pages"
        );
        if let Some(on_scanned) = &self.on_scanned {
            on_scanned(scanned.documents.len());
        }

        let mut renderer = CreoleRenderer::new(self.config);
        if let Some(resolver) = self.resolver {
            renderer = renderer.with_link_resolver(resolver);
        }

        let results: Vec<(String, Result<(), StorageError>)> = scanned
            .documents
            .par_iter()
            .map(|document| {
                let result = self.export_one(&renderer, document);
                if let Some(on_progress) = &self.on_progress {
                    on_progress();
                }
                (document.title.clone(), result)
            })
            .collect();

        let report = partition_results(scanned.failures, results);
        tracing::info!(
            exported = report.exported.len(),
            failed = report.failures.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "Export finished"
        );
        Ok(report)
    }

    fn export_one(
        &self,
        renderer: &CreoleRenderer<'_>,
        document: &Document,
    ) -> Result<(), StorageError> {
        let html = renderer.render(&document.text);
        self.sink.write(document, &html).inspect_err(|error| {
            tracing::warn!(title = %document.title, %error, "Failed to write page");
        })
    }
}

fn partition_results(
    unreadable: Vec<DocumentFailure>,
    results: Vec<(String, Result<(), StorageError>)>,
) -> ExportReport {
    let mut report = ExportReport {
        exported: Vec::with_capacity(results.len()),
        failures: unreadable,
    };

    for (title, result) in results {
        match result {
            Ok(()) => report.exported.push(title),
            Err(error) => report.failures.push(DocumentFailure::new(title, error)),
        }
    }

    report
}
