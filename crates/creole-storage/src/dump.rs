//! Page-content dump source.
//!
//! Reads a JSON-lines export of the wiki's page-content collection, one record
//! per line:
//!
//! ```json
//! {"Page": {"Title": "Home"}, "Text": "= Welcome", "VersionNumber": 3}
//! ```
//!
//! The export lives at `<connection>/<database>/<collection>.json`. A wiki keeps
//! every revision of a page, so only the highest `VersionNumber` per title is
//! returned. A line that does not decode is reported as a failure, under its
//! page title when one can be read from it, unless a valid revision of that
//! page exists.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{StorageError, StorageErrorKind};
use crate::storage::{Document, DocumentFailure, DocumentSource, ScanResult};

/// Collection holding page bodies.
pub const DEFAULT_COLLECTION: &str = "PageContent";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PageContentRecord {
    page: PageRecord,
    text: String,
    #[serde(default)]
    version_number: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PageRecord {
    title: String,
}

/// Reads page bodies from a collection dump.
#[derive(Debug)]
pub struct DumpSource {
    path: PathBuf,
}

impl DumpSource {
    const BACKEND: &'static str = "Dump";

    /// Source for `<connection>/<database>/<collection>.json`.
    #[must_use]
    pub fn new(connection: impl AsRef<Path>, database: &str, collection: &str) -> Self {
        Self::from_path(
            connection
                .as_ref()
                .join(database)
                .join(format!("{collection}.json")),
        )
    }

    /// Source for an explicit dump file.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn invalid_record(&self, line: usize, err: serde_json::Error) -> StorageError {
        StorageError::new(StorageErrorKind::InvalidData)
            .with_backend(Self::BACKEND)
            .with_path(format!("{}:{line}", self.path.display()))
            .with_source(err)
    }
}

/// Title of a record that failed to decode, if the line is JSON at all.
fn salvage_title(line: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(line).ok()?;
    value
        .get("Page")?
        .get("Title")?
        .as_str()
        .map(str::to_owned)
}

impl DocumentSource for DumpSource {
    fn scan(&self) -> Result<ScanResult, StorageError> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            StorageError::from(e).with_path(&self.path).with_backend(Self::BACKEND)
        })?;

        let mut latest: BTreeMap<String, (i64, String)> = BTreeMap::new();
        let mut broken: BTreeMap<String, StorageError> = BTreeMap::new();
        let mut untitled: Vec<DocumentFailure> = Vec::new();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record: PageContentRecord = match serde_json::from_str(line) {
                Ok(record) => record,
                Err(e) => {
                    let line_number = index + 1;
                    tracing::warn!(
                        path = %self.path.display(),
                        line = line_number,
                        error = %e,
                        "Invalid page record"
                    );
                    let error = self.invalid_record(line_number, e);
                    match salvage_title(line) {
                        Some(title) => {
                            broken.entry(title).or_insert(error);
                        }
                        None => {
                            let locator = format!("line {line_number}");
                            untitled.push(DocumentFailure::new(locator, error));
                        }
                    }
                    continue;
                }
            };

            let version = record.version_number;
            match latest.get(&record.page.title) {
                Some((existing, _)) if *existing >= version => {}
                _ => {
                    latest.insert(record.page.title, (version, record.text));
                }
            }
        }

        broken.retain(|title, _| !latest.contains_key(title));
        let mut failures = untitled;
        failures.extend(
            broken
                .into_iter()
                .map(|(title, error)| DocumentFailure::new(title, error)),
        );

        tracing::debug!(
            path = %self.path.display(),
            documents = latest.len(),
            failed = failures.len(),
            "Scanned page dump"
        );

        Ok(ScanResult {
            documents: latest
                .into_iter()
                .map(|(title, (_, text))| Document { title, text })
                .collect(),
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write_dump(lines: &[&str]) -> (tempfile::TempDir, DumpSource) {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("wiki");
        fs::create_dir(&db).unwrap();
        fs::write(db.join("PageContent.json"), lines.join("\n")).unwrap();
        let source = DumpSource::new(dir.path(), "wiki", DEFAULT_COLLECTION);
        (dir, source)
    }

    #[test]
    fn test_path_layout() {
        let source = DumpSource::new("/data", "wiki", "PageContent");

        assert_eq!(source.path(), Path::new("/data/wiki/PageContent.json"));
    }

    #[test]
    fn test_reads_records() {
        let (_dir, source) = write_dump(&[
            r#"{"Page": {"Title": "Home"}, "Text": "= Welcome"}"#,
            r#"{"Page": {"Title": "About"}, "Text": "**us**"}"#,
        ]);

        let docs = source.scan().unwrap().documents;

        assert_eq!(
            docs,
            vec![
                Document::new("About", "**us**"),
                Document::new("Home", "= Welcome"),
            ]
        );
    }

    #[test]
    fn test_keeps_highest_version() {
        let (_dir, source) = write_dump(&[
            r#"{"Page": {"Title": "Home"}, "Text": "v2", "VersionNumber": 2}"#,
            r#"{"Page": {"Title": "Home"}, "Text": "v3", "VersionNumber": 3}"#,
            r#"{"Page": {"Title": "Home"}, "Text": "v1", "VersionNumber": 1}"#,
        ]);

        let docs = source.scan().unwrap().documents;

        assert_eq!(docs, vec![Document::new("Home", "v3")]);
    }

    #[test]
    fn test_ignores_unknown_fields() {
        let (_dir, source) = write_dump(&[
            r#"{"_id": "x", "Page": {"Title": "Home", "Tags": "a"}, "Text": "t", "EditedBy": "me"}"#,
        ]);

        let docs = source.scan().unwrap().documents;

        assert_eq!(docs, vec![Document::new("Home", "t")]);
    }

    #[test]
    fn test_reports_invalid_lines_and_keeps_others() {
        let (_dir, source) = write_dump(&[
            "not json",
            "",
            r#"{"Page": {"Title": "NoText"}}"#,
            r#"{"Page": {"Title": "Home"}, "Text": "ok"}"#,
        ]);

        let result = source.scan().unwrap();

        assert_eq!(result.documents, vec![Document::new("Home", "ok")]);
        let titles: Vec<&str> = result.failures.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["line 1", "NoText"]);
        for failure in &result.failures {
            assert_eq!(failure.error.kind, StorageErrorKind::InvalidData);
            assert_eq!(failure.error.backend, Some("Dump"));
        }
        assert_eq!(
            result.failures[1].error.path.as_deref(),
            Some(source.path().with_file_name("PageContent.json:3").as_path())
        );
    }

    #[test]
    fn test_broken_revision_ignored_when_valid_one_exists() {
        let (_dir, source) = write_dump(&[
            r#"{"Page": {"Title": "Home"}, "Text": "v1", "VersionNumber": 1}"#,
            r#"{"Page": {"Title": "Home"}, "VersionNumber": 2}"#,
        ]);

        let result = source.scan().unwrap();

        assert_eq!(result.documents, vec![Document::new("Home", "v1")]);
        assert!(result.failures.is_empty());
    }

    #[test]
    fn test_missing_dump_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = DumpSource::new(dir.path(), "wiki", DEFAULT_COLLECTION);

        let err = source.scan().unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::NotFound);
        assert_eq!(err.backend, Some("Dump"));
    }
}
