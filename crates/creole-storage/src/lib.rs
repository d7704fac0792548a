//! Document sources and sinks for the Creole export pipeline.
//!
//! This crate provides the [`DocumentSource`] and [`DocumentSink`] traits that
//! separate the export pipeline from where pages come from and where they go.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`DumpSource`] reading a JSON-lines dump of the wiki's page-content collection
//! - [`DirSource`] reading `*.creole` files from a directory
//! - [`FsSink`] writing `Creole/` and `Html/` trees under an output directory
//! - [`MockSource`] and [`MockSink`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```no_run
//! use creole_storage::{DocumentSink, DocumentSource, DumpSource, FsSink};
//!
//! let source = DumpSource::new("/var/backups/wiki", "roadkill", "PageContent");
//! let sink = FsSink::new("export");
//! sink.prepare()?;
//! for doc in source.scan()?.documents {
//!     sink.write(&doc, "<P>rendered</P>")?;
//! }
//! # Ok::<(), creole_storage::StorageError>(())
//! ```

mod dump;
mod error;
mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use dump::{DEFAULT_COLLECTION, DumpSource};
pub use fs::{CREOLE_DIR, CREOLE_EXTENSION, DirSource, FsSink, HTML_DIR, file_name_for};
#[cfg(feature = "mock")]
pub use mock::{MockSink, MockSource};
pub use error::{ErrorStatus, StorageError, StorageErrorKind};
pub use storage::{Document, DocumentFailure, DocumentSink, DocumentSource, ScanResult};
