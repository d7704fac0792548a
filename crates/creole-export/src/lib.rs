//! Batch export of Creole pages to HTML.
//!
//! [`Exporter`] prepares a [`DocumentSink`](creole_storage::DocumentSink),
//! scans a [`DocumentSource`](creole_storage::DocumentSource) and renders every
//! page on the rayon global pool. A page that cannot be loaded or written is
//! recorded in the [`ExportReport`] and the rest of the batch carries on.

mod exporter;

pub use creole_storage::DocumentFailure;
pub use exporter::{ExportError, ExportReport, Exporter};
