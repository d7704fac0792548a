//! CLI error types.

use creole_config::ConfigError;
use creole_export::ExportError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Export(#[from] ExportError),

    /// Some pages could not be exported.
    #[error("{failed} of {total} page(s) failed to export")]
    Failed { failed: usize, total: usize },
}
