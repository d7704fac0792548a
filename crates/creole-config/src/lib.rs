//! Configuration for the Creole exporter.
//!
//! Parses `creole.toml` with serde and provides auto-discovery of the file in
//! parent directories. CLI settings can be applied during load via
//! [`CliSettings`].
//!
//! ```toml
//! [source]
//! kind = "dump"            # or "dir"
//! connection = "backups"   # dump root, or the markup directory for "dir"
//! database = "roadkill"
//! collection = "PageContent"
//!
//! [output]
//! dir = "export"
//!
//! [parser]
//! tab_stop = 7
//!
//! [parser.tags]
//! "<P>" = "<P class=\"wiki\">"
//!
//! [parser.interwiki]
//! wp = "https://en.wikipedia.org/wiki/"
//! ```
//!
//! ## Environment variables
//!
//! `${VAR}` and `${VAR:-default}` are expanded in:
//! - `source.connection`
//! - `source.database`
//! - `output.dir`

mod expand;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use creole_renderer::{DEFAULT_TAB_STOP, ParserConfig, Tag};
use serde::Deserialize;

/// File looked up by auto-discovery.
const CONFIG_FILENAME: &str = "creole.toml";

/// Largest accepted `parser.tab_stop`.
const MAX_TAB_STOP: usize = 32;

/// Command-line overrides, applied after the file is loaded.
///
/// `None` keeps the file (or default) value.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub source_kind: Option<SourceKind>,
    /// Override the source connection (dump root or markup directory).
    pub connection: Option<PathBuf>,
    pub database: Option<String>,
    pub collection: Option<String>,
    /// Override the export directory.
    pub output_dir: Option<PathBuf>,
    pub tab_stop: Option<usize>,
}

/// Where pages are read from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// JSON-lines dump of the page-content collection.
    #[default]
    Dump,
    /// Directory of `*.creole` files.
    Dir,
}

impl std::str::FromStr for SourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dump" => Ok(Self::Dump),
            "dir" => Ok(Self::Dir),
            other => Err(ConfigError::Validation(format!(
                "unknown source kind `{other}` (expected `dump` or `dir`)"
            ))),
        }
    }
}

/// Contents of `creole.toml` plus resolved paths.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source section as written (paths relative to the config file).
    source: SourceConfigRaw,
    output: OutputConfigRaw,
    /// Renderer settings.
    pub parser: ParserSettings,

    /// Resolved source configuration (set after loading).
    #[serde(skip)]
    pub source_resolved: SourceConfig,
    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// File the configuration came from, if any.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SourceConfigRaw {
    kind: Option<SourceKind>,
    connection: Option<String>,
    database: Option<String>,
    collection: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    dir: Option<String>,
}

/// Resolved source configuration.
#[derive(Debug, Default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Dump root for [`SourceKind::Dump`], markup directory for [`SourceKind::Dir`].
    pub connection: PathBuf,
    /// Database name; dump records live under `<connection>/<database>/`.
    pub database: String,
    /// Collection holding page bodies.
    pub collection: String,
}

impl SourceConfig {
    /// Check the fields the configured source kind needs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a required field is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connection.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "source.connection cannot be empty".to_owned(),
            ));
        }
        if self.kind == SourceKind::Dump {
            require_non_empty(&self.database, "source.database")?;
            require_non_empty(&self.collection, "source.collection")?;
        }
        Ok(())
    }
}

/// Resolved output configuration.
#[derive(Debug, Default)]
pub struct OutputConfig {
    /// Export root; receives `Creole/` and `Html/`.
    pub dir: PathBuf,
}

/// `[parser]` section.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParserSettings {
    /// `&nbsp;` per tab, 0 keeps tabs.
    pub tab_stop: usize,
    /// Start tag overrides keyed by default markup.
    pub tags: HashMap<String, String>,
    /// Interwiki scheme to URL prefix.
    pub interwiki: HashMap<String, String>,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            tab_stop: DEFAULT_TAB_STOP,
            tags: HashMap::new(),
            interwiki: HashMap::new(),
        }
    }
}

impl ParserSettings {
    /// Renderer configuration for these settings.
    #[must_use]
    pub fn to_parser_config(&self) -> ParserConfig {
        ParserConfig::new()
            .with_tab_stop(self.tab_stop)
            .with_tags(self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .with_interwikis(self.interwiki.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tab_stop > MAX_TAB_STOP {
            return Err(ConfigError::Validation(format!(
                "parser.tab_stop cannot exceed {MAX_TAB_STOP}"
            )));
        }

        let mut unknown: Vec<&str> = self
            .tags
            .keys()
            .map(String::as_str)
            .filter(|key| Tag::from_markup(key).is_none())
            .collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            return Err(ConfigError::Validation(format!(
                "parser.tags has unknown tag(s): {}",
                unknown.join(", ")
            )));
        }

        if let Some(scheme) = self.interwiki.keys().find(|s| s.is_empty() || s.contains(':')) {
            return Err(ConfigError::Validation(format!(
                "parser.interwiki has invalid scheme `{scheme}`"
            )));
        }

        Ok(())
    }
}

/// Error loading or validating `creole.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
    /// A `${VAR}` reference without a value or default.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`source.connection`").
        field: String,
        /// Error message (e.g., "${`WIKI_DUMP`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load `creole.toml` and apply `cli_settings` on top.
    ///
    /// An explicit `config_path` must exist.
    /// Otherwise, searches for `creole.toml` in current directory and parents.
    ///
    /// CLI settings are applied after path resolution, so CLI arguments take
    /// precedence over the file. The source section is not validated here,
    /// since not every command reads pages; see [`Config::require_source`].
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(kind) = settings.source_kind {
            self.source_resolved.kind = kind;
        }
        if let Some(connection) = &settings.connection {
            self.source_resolved.connection.clone_from(connection);
        }
        if let Some(database) = &settings.database {
            self.source_resolved.database.clone_from(database);
        }
        if let Some(collection) = &settings.collection {
            self.source_resolved.collection.clone_from(collection);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.output_resolved.dir.clone_from(output_dir);
        }
        if let Some(tab_stop) = settings.tab_stop {
            self.parser.tab_stop = tab_stop;
        }
    }

    /// Check output and parser settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_resolved.dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output.dir cannot be empty".to_owned(),
            ));
        }
        self.parser.validate()
    }

    /// Get the validated source configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a field the source kind needs is
    /// missing.
    pub fn require_source(&self) -> Result<&SourceConfig, ConfigError> {
        self.source_resolved.validate()?;
        Ok(&self.source_resolved)
    }

    /// Walk up from the working directory looking for `creole.toml`.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Defaults, with relative paths anchored at `base`.
    fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            source: SourceConfigRaw::default(),
            output: OutputConfigRaw::default(),
            parser: ParserSettings::default(),
            source_resolved: SourceConfig::default(),
            output_resolved: OutputConfig::default(),
            config_path: None,
        };
        config.resolve_paths(base);
        config
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(connection) = &self.source.connection {
            self.source.connection = Some(expand::expand_env(connection, "source.connection")?);
        }
        if let Some(database) = &self.source.database {
            self.source.database = Some(expand::expand_env(database, "source.database")?);
        }
        if let Some(dir) = &self.output.dir {
            self.output.dir = Some(expand::expand_env(dir, "output.dir")?);
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory and fill defaults.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.source_resolved = SourceConfig {
            kind: self.source.kind.unwrap_or_default(),
            connection: resolve(self.source.connection.as_deref(), "dump"),
            database: self.source.database.clone().unwrap_or_default(),
            collection: self
                .source
                .collection
                .clone()
                .unwrap_or_else(|| creole_storage::DEFAULT_COLLECTION.to_owned()),
        };
        self.output_resolved = OutputConfig {
            dir: resolve(self.output.dir.as_deref(), "export"),
        };
    }
}
