//! Filesystem source and sink.
//!
//! [`DirSource`] reads `*.creole` files from a directory. [`FsSink`] writes an
//! export tree:
//!
//! ```text
//! <output>/
//!   Creole/<title>.creole
//!   Html/<title>.html
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::StorageError;
use crate::storage::{Document, DocumentFailure, DocumentSink, DocumentSource, ScanResult};

/// Extension of raw markup files, without the dot.
pub const CREOLE_EXTENSION: &str = "creole";

/// Subdirectory holding raw markup.
pub const CREOLE_DIR: &str = "Creole";

/// Subdirectory holding rendered fragments.
pub const HTML_DIR: &str = "Html";

/// Characters that cannot appear in an output file name.
const RESERVED_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Reads every `*.creole` file directly inside a directory.
///
/// The file stem becomes the document title. Subdirectories, hidden files and
/// other extensions are ignored. A file that cannot be read as UTF-8 is
/// reported as a failure for its title.
#[derive(Debug)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    const BACKEND: &'static str = "Dir";

    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(path: &Path) -> Result<String, StorageError> {
        fs::read_to_string(path)
            .map_err(|e| StorageError::from(e).with_path(path).with_backend(Self::BACKEND))
    }
}

impl DocumentSource for DirSource {
    fn scan(&self) -> Result<ScanResult, StorageError> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            StorageError::from(e).with_path(&self.root).with_backend(Self::BACKEND)
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == CREOLE_EXTENSION))
            .filter(|p| {
                p.file_name()
                    .is_some_and(|n| !n.to_string_lossy().starts_with('.'))
            })
            .collect();
        paths.sort();

        let mut result = ScanResult::default();
        for path in paths {
            let Some(title) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            match Self::read(&path) {
                Ok(text) => result.documents.push(Document { title, text }),
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "Failed to read page");
                    result.failures.push(DocumentFailure::new(title, error));
                }
            }
        }

        tracing::debug!(
            root = %self.root.display(),
            documents = result.documents.len(),
            failed = result.failures.len(),
            "Scanned markup directory"
        );
        Ok(result)
    }
}

/// Writes raw markup and rendered HTML side by side under an output root.
///
/// Titles that map to the same file name (`a/b` and `a_b`, or `Home` and
/// `HOME` on a case-insensitive filesystem) are written once; later ones fail
/// with [`StorageErrorKind::AlreadyExists`](crate::StorageErrorKind::AlreadyExists).
#[derive(Debug)]
pub struct FsSink {
    root: PathBuf,
    creole_dir: PathBuf,
    html_dir: PathBuf,
    /// Lowercased file names written since the last `prepare`.
    claimed: Mutex<HashSet<String>>,
}

impl FsSink {
    const BACKEND: &'static str = "Fs";

    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            creole_dir: root.join(CREOLE_DIR),
            html_dir: root.join(HTML_DIR),
            root,
            claimed: Mutex::new(HashSet::new()),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn creole_dir(&self) -> &Path {
        &self.creole_dir
    }

    #[must_use]
    pub fn html_dir(&self) -> &Path {
        &self.html_dir
    }

    fn io_error(&self, err: std::io::Error, path: &Path) -> StorageError {
        StorageError::from(err).with_path(path).with_backend(Self::BACKEND)
    }

    /// Delete the regular files directly inside `dir`. Subdirectories stay.
    fn remove_files(&self, dir: &Path) -> Result<(), StorageError> {
        let entries = fs::read_dir(dir).map_err(|e| self.io_error(e, dir))?;
        for entry in entries {
            let entry = entry.map_err(|e| self.io_error(e, dir))?;
            let path = entry.path();
            if entry.file_type().is_ok_and(|t| t.is_file()) {
                fs::remove_file(&path).map_err(|e| self.io_error(e, &path))?;
            }
        }
        Ok(())
    }

    /// Create `dir`, or empty it when it already exists.
    fn reset_dir(&self, dir: &Path) -> Result<(), StorageError> {
        if dir.is_dir() {
            self.remove_files(dir)
        } else {
            fs::create_dir_all(dir).map_err(|e| self.io_error(e, dir))
        }
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        fs::write(path, contents).map_err(|e| self.io_error(e, path))
    }

    /// Reserve `name` for `title`, failing if another page already holds it.
    fn claim(&self, name: &str, title: &str) -> Result<(), StorageError> {
        let mut claimed = self.claimed.lock().unwrap_or_else(PoisonError::into_inner);
        if claimed.insert(name.to_lowercase()) {
            return Ok(());
        }
        let err = io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("`{title}` maps to the same file name as another page"),
        );
        Err(self.io_error(err, &self.html_dir.join(format!("{name}.html"))))
    }
}

impl DocumentSink for FsSink {
    fn prepare(&self) -> Result<(), StorageError> {
        if self.root.is_dir() {
            self.remove_files(&self.root)?;
        } else {
            fs::create_dir_all(&self.root).map_err(|e| self.io_error(e, &self.root))?;
        }
        self.reset_dir(&self.creole_dir)?;
        self.reset_dir(&self.html_dir)?;
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        tracing::debug!(root = %self.root.display(), "Prepared output directories");
        Ok(())
    }

    fn write(&self, document: &Document, html: &str) -> Result<(), StorageError> {
        let name = file_name_for(&document.title);
        self.claim(&name, &document.title)?;
        self.write_file(
            &self
                .creole_dir
                .join(format!("{name}.{CREOLE_EXTENSION}")),
            &document.text,
        )?;
        self.write_file(&self.html_dir.join(format!("{name}.html")), html)
    }
}

/// File name (without extension) for a page title.
///
/// Path separators and characters reserved on common filesystems become `_`.
#[must_use]
pub fn file_name_for(title: &str) -> String {
    if title.is_empty() {
        return "_".to_owned();
    }
    title.replace(RESERVED_CHARS, "_")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::StorageErrorKind;

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn test_dir_source_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DirSource>();
        assert_send_sync::<FsSink>();
    }

    #[test]
    fn test_dir_source_reads_creole_files_sorted() {
        let dir = create_test_dir();
        fs::write(dir.path().join("Zebra.creole"), "z").unwrap();
        fs::write(dir.path().join("Apple.creole"), "**a**").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::write(dir.path().join(".hidden.creole"), "ignored").unwrap();
        fs::create_dir(dir.path().join("sub.creole")).unwrap();

        let result = DirSource::new(dir.path()).scan().unwrap();

        assert_eq!(
            result.documents,
            vec![Document::new("Apple", "**a**"), Document::new("Zebra", "z")]
        );
        assert!(result.failures.is_empty());
    }

    #[test]
    fn test_dir_source_empty_dir() {
        let dir = create_test_dir();

        let result = DirSource::new(dir.path()).scan().unwrap();

        assert!(result.is_empty());
    }

    #[test]
    fn test_dir_source_reports_unreadable_file_and_keeps_others() {
        let dir = create_test_dir();
        fs::write(dir.path().join("Good.creole"), "ok").unwrap();
        fs::write(dir.path().join("Latin1.creole"), b"caf\xe9").unwrap();

        let result = DirSource::new(dir.path()).scan().unwrap();

        assert_eq!(result.documents, vec![Document::new("Good", "ok")]);
        assert_eq!(result.failures.len(), 1);
        let failure = &result.failures[0];
        assert_eq!(failure.title, "Latin1");
        assert_eq!(failure.error.kind, StorageErrorKind::InvalidData);
        assert_eq!(failure.error.backend, Some("Dir"));
        assert_eq!(
            failure.error.path.as_deref(),
            Some(dir.path().join("Latin1.creole").as_path())
        );
    }

    #[test]
    fn test_dir_source_missing_dir() {
        let dir = create_test_dir();

        let err = DirSource::new(dir.path().join("missing")).scan().unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::NotFound);
        assert_eq!(err.backend, Some("Dir"));
    }

    #[test]
    fn test_prepare_creates_tree() {
        let dir = create_test_dir();
        let root = dir.path().join("out");
        let sink = FsSink::new(&root);

        sink.prepare().unwrap();

        assert!(root.join("Creole").is_dir());
        assert!(root.join("Html").is_dir());
    }

    #[test]
    fn test_prepare_clears_previous_export() {
        let dir = create_test_dir();
        let sink = FsSink::new(dir.path());
        fs::write(dir.path().join("stale.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("keep")).unwrap();
        fs::create_dir(dir.path().join("Creole")).unwrap();
        fs::write(dir.path().join("Creole").join("Old.creole"), "x").unwrap();

        sink.prepare().unwrap();

        assert!(!dir.path().join("stale.txt").exists());
        assert!(dir.path().join("keep").is_dir());
        assert!(!dir.path().join("Creole").join("Old.creole").exists());
        assert!(dir.path().join("Html").is_dir());
    }

    #[test]
    fn test_write_creates_both_files() {
        let dir = create_test_dir();
        let sink = FsSink::new(dir.path());
        sink.prepare().unwrap();

        sink.write(&Document::new("Home", "**hi**"), "<P>hi</P>")
            .unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("Creole/Home.creole")).unwrap(),
            "**hi**"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("Html/Home.html")).unwrap(),
            "<P>hi</P>"
        );
    }

    #[test]
    fn test_write_sanitizes_title() {
        let dir = create_test_dir();
        let sink = FsSink::new(dir.path());
        sink.prepare().unwrap();

        sink.write(&Document::new("a/b:c", "x"), "y").unwrap();

        assert!(dir.path().join("Creole/a_b_c.creole").is_file());
        assert!(dir.path().join("Html/a_b_c.html").is_file());
    }

    #[test]
    fn test_write_rejects_colliding_file_name() {
        let dir = create_test_dir();
        let sink = FsSink::new(dir.path());
        sink.prepare().unwrap();

        sink.write(&Document::new("a/b", "first"), "<P>1</P>").unwrap();
        let err = sink
            .write(&Document::new("a_b", "second"), "<P>2</P>")
            .unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::AlreadyExists);
        assert_eq!(err.backend, Some("Fs"));
        assert_eq!(
            fs::read_to_string(dir.path().join("Creole/a_b.creole")).unwrap(),
            "first"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("Html/a_b.html")).unwrap(),
            "<P>1</P>"
        );
    }

    #[test]
    fn test_write_rejects_case_only_collision() {
        let dir = create_test_dir();
        let sink = FsSink::new(dir.path());
        sink.prepare().unwrap();

        sink.write(&Document::new("Home", "x"), "y").unwrap();
        let err = sink.write(&Document::new("HOME", "x"), "y").unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::AlreadyExists);
    }

    #[test]
    fn test_prepare_releases_claimed_names() {
        let dir = create_test_dir();
        let sink = FsSink::new(dir.path());
        sink.prepare().unwrap();
        sink.write(&Document::new("Home", "x"), "y").unwrap();

        sink.prepare().unwrap();

        sink.write(&Document::new("Home", "x"), "y").unwrap();
    }

    #[test]
    fn test_write_without_prepare_fails() {
        let dir = create_test_dir();
        let sink = FsSink::new(dir.path().join("never-prepared"));

        let err = sink.write(&Document::new("Home", "x"), "y").unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::NotFound);
        assert_eq!(err.backend, Some("Fs"));
    }

    #[test]
    fn test_file_name_for() {
        assert_eq!(file_name_for("Plain Title"), "Plain Title");
        assert_eq!(file_name_for(r#"a\b*c?d"e<f>g|h"#), "a_b_c_d_e_f_g_h");
        assert_eq!(file_name_for(""), "_");
    }
}
