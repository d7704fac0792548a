//! `creole render` command implementation.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use creole_config::{CliSettings, Config};
use creole_renderer::CreoleRenderer;

use crate::error::CliError;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markup file to render, or `-` for stdin.
    file: PathBuf,

    /// Path to configuration file (default: auto-discover creole.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// `&nbsp;` per tab, 0 keeps tabs (overrides config).
    #[arg(long)]
    tab_stop: Option<usize>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the file cannot be read.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            tab_stop: self.tab_stop,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let parser_config = config.parser.to_parser_config();

        let markup = read_input(&self.file)?;
        tracing::info!(file = %self.file.display(), bytes = markup.len(), "Rendering");
        let html = CreoleRenderer::new(&parser_config).render(&markup);

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(html.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

fn read_input(file: &Path) -> std::io::Result<String> {
    if file.as_os_str() == "-" {
        let mut markup = String::new();
        std::io::stdin().read_to_string(&mut markup)?;
        return Ok(markup);
    }
    std::fs::read_to_string(file)
}
