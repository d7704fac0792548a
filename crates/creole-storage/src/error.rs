//! Error type shared by every source and sink.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// What went wrong, independent of the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// A dump, directory or page file is missing.
    NotFound,
    PermissionDenied,
    /// Another page already claimed the output file.
    AlreadyExists,
    /// A page file or dump is not valid UTF-8 or not valid JSON.
    InvalidData,
    /// Any other I/O failure.
    Io,
}

impl StorageErrorKind {
    fn from_io(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::AlreadyExists => Self::AlreadyExists,
            io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => Self::InvalidData,
            _ => Self::Io,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::PermissionDenied => "permission denied",
            Self::AlreadyExists => "already exists",
            Self::InvalidData => "invalid data",
            Self::Io => "I/O error",
        }
    }
}

impl fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a failed operation is worth another attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorStatus {
    #[default]
    Permanent,
    /// Interrupted or timed out; a rerun of the export may succeed.
    Temporary,
}

/// Failure reading pages or writing export output.
///
/// Built with [`StorageError::new`] or from an [`io::Error`], then enriched
/// with the backend name and the offending path:
///
/// ```
/// use creole_storage::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::InvalidData)
///     .with_backend("Dump")
///     .with_path("backups/wiki/PageContent.json");
/// assert_eq!(
///     err.to_string(),
///     "Dump: invalid data at backups/wiki/PageContent.json"
/// );
/// ```
#[derive(Debug)]
pub struct StorageError {
    pub kind: StorageErrorKind,
    pub status: ErrorStatus,
    /// File or directory the operation touched.
    pub path: Option<PathBuf>,
    /// Short backend name such as `Dir`, `Dump` or `Fs`.
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            status: ErrorStatus::default(),
            path: None,
            backend: None,
            source: None,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: ErrorStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.status == ErrorStatus::Temporary
    }
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        let status = match err.kind() {
            io::ErrorKind::Interrupted | io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                ErrorStatus::Temporary
            }
            _ => ErrorStatus::Permanent,
        };
        Self::new(StorageErrorKind::from_io(err.kind()))
            .with_status(status)
            .with_source(err)
    }
}

impl fmt::Display for StorageError {
    // "Backend: kind at path: source"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(backend) = self.backend {
            write!(f, "{backend}: ")?;
        }
        write!(f, "{}", self.kind)?;
        if let Some(path) = &self.path {
            write!(f, " at {}", path.display())?;
        }
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn std::error::Error + 'static))
    }
}
