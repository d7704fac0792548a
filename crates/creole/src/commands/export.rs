//! `creole export` command implementation.

use std::path::PathBuf;

use clap::Args;
use creole_config::{CliSettings, Config, SourceConfig, SourceKind};
use creole_export::{DocumentFailure, ExportReport, Exporter};
use creole_storage::{DirSource, DocumentSource, DumpSource, FsSink};
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::CliError;
use crate::output::Output;

const PROGRESS_TEMPLATE: &str = "{spinner} [{bar:40}] {pos}/{len} pages ({elapsed})";

/// Arguments for the export command.
#[derive(Args)]
pub(crate) struct ExportArgs {
    /// Path to configuration file (default: auto-discover creole.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dump root, or the markup directory with `--source-kind dir` (overrides config).
    #[arg(short = 'c', long)]
    connection: Option<PathBuf>,

    /// Database name under the dump root (overrides config).
    #[arg(short, long, env = "CREOLE_DATABASE")]
    database: Option<String>,

    /// Collection holding page bodies (overrides config).
    #[arg(long)]
    collection: Option<String>,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Where pages come from: `dump` or `dir` (overrides config).
    #[arg(long)]
    source_kind: Option<SourceKind>,

    /// `&nbsp;` per tab, 0 keeps tabs (overrides config).
    #[arg(long)]
    tab_stop: Option<usize>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ExportArgs {
    /// Execute the export command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid, the export cannot start,
    /// or any page failed to export.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_kind: self.source_kind,
            connection: self.connection,
            database: self.database,
            collection: self.collection,
            output_dir: self.output,
            tab_stop: self.tab_stop,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let source_config = config.require_source()?;
        let parser_config = config.parser.to_parser_config();

        let source = build_source(source_config, &output);
        let sink = FsSink::new(&config.output_resolved.dir);
        output.info(&format!("Output directory: {}", sink.root().display()));

        let progress = if output.is_term() && !self.verbose {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::with_template(PROGRESS_TEMPLATE) {
            progress.set_style(style.progress_chars("=> "));
        }

        let result = Exporter::new(&*source, &sink, &parser_config)
            .with_scan_callback(|total| {
                progress.set_length(u64::try_from(total).unwrap_or(u64::MAX));
            })
            .with_progress(|| progress.inc(1))
            .run();
        progress.finish_and_clear();

        report(&output, &result?)
    }
}

fn build_source(source: &SourceConfig, output: &Output) -> Box<dyn DocumentSource> {
    match source.kind {
        SourceKind::Dump => {
            let dump = DumpSource::new(&source.connection, &source.database, &source.collection);
            output.info(&format!("Reading dump: {}", dump.path().display()));
            Box::new(dump)
        }
        SourceKind::Dir => {
            output.info(&format!(
                "Reading directory: {}",
                source.connection.display()
            ));
            Box::new(DirSource::new(&source.connection))
        }
    }
}

fn report(output: &Output, report: &ExportReport) -> Result<(), CliError> {
    for failure in &report.failures {
        output.error(&failure_line(failure));
    }

    if report.is_success() {
        output.success(&format!("Exported {} page(s)", report.exported.len()));
        return Ok(());
    }

    output.highlight(&format!(
        "Exported {} of {} page(s)",
        report.exported.len(),
        report.total()
    ));
    Err(CliError::Failed {
        failed: report.failures.len(),
        total: report.total(),
    })
}

fn failure_line(failure: &DocumentFailure) -> String {
    let mut line = format!("  {}: {}", failure.title, failure.error);
    if failure.error.is_temporary() {
        line.push_str(" (temporary, a rerun may succeed)");
    }
    line
}

#[cfg(test)]
mod tests {
    use creole_storage::{ErrorStatus, StorageError, StorageErrorKind};

    use super::*;

    #[test]
    fn test_report_success() {
        let summary = ExportReport {
            exported: vec!["Home".to_owned()],
            failures: Vec::new(),
        };

        assert!(report(&Output::new(), &summary).is_ok());
    }

    #[test]
    fn test_report_failures_return_error() {
        let summary = ExportReport {
            exported: vec!["Home".to_owned()],
            failures: vec![DocumentFailure::new(
                "Broken",
                StorageError::new(StorageErrorKind::PermissionDenied),
            )],
        };

        let err = report(&Output::new(), &summary).unwrap_err();

        assert!(matches!(err, CliError::Failed { failed: 1, total: 2 }));
        assert_eq!(err.to_string(), "1 of 2 page(s) failed to export");
    }

    #[test]
    fn test_failure_line_marks_temporary_errors() {
        let permanent = DocumentFailure::new(
            "Home",
            StorageError::new(StorageErrorKind::Io).with_backend("Fs"),
        );
        let temporary = DocumentFailure::new(
            "Home",
            StorageError::new(StorageErrorKind::Io)
                .with_backend("Fs")
                .with_status(ErrorStatus::Temporary),
        );

        assert!(failure_line(&permanent).starts_with("  Home: "));
        assert!(!failure_line(&permanent).contains("temporary"));
        assert!(
            failure_line(&temporary).ends_with(" (temporary, a rerun may succeed)"),
            "{}",
            failure_line(&temporary)
        );
    }

    #[test]
    fn test_build_source_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Home.creole"), "x").unwrap();
        let config = SourceConfig {
            kind: SourceKind::Dir,
            connection: dir.path().to_path_buf(),
            database: String::new(),
            collection: String::new(),
        };

        let source = build_source(&config, &Output::new());

        assert_eq!(source.scan().unwrap().len(), 1);
    }
}
