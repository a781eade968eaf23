//! Configuration system for hexbench.
//!
//! Configuration is written in TOML:
//!
//! ```toml
//! [logging]
//! filter = "hexbench_workbench=debug,info"
//! directory = "/tmp/hexbench-logs"
//!
//! [providers]
//! confirm_close = true
//! select_on_create = true
//!
//! [highlights]
//! id_overflow = "wrap"   # or "saturate"
//! ```
//!
//! # Configuration Files
//!
//! [`Config::load_default`] looks in these locations (first hit wins):
//!
//! 1. `$HEXBENCH_CONFIG`
//! 2. `$XDG_CONFIG_HOME/hexbench/config.toml` (or the platform equivalent)
//!
//! A missing file is not an error; defaults are used.
//!
//! Unknown keys are collected in [`Config::warnings`] instead of failing the parse.

pub mod error;

use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigWarning, Result};
use serde::Deserialize;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "HEXBENCH_CONFIG";

/// Parsed workbench configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
	pub logging: LoggingConfig,
	pub providers: ProvidersConfig,
	pub highlights: HighlightsConfig,
	/// Non-fatal warnings encountered during parsing.
	#[serde(skip)]
	pub warnings: Vec<ConfigWarning>,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
	/// `tracing-subscriber` env-filter directive used when `HEXBENCH_LOG` is unset.
	pub filter: String,
	/// Write logs to a file in this directory instead of stderr.
	pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			filter: "hexbench_workbench=info,warn".to_string(),
			directory: None,
		}
	}
}

/// `[providers]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
	/// Post the vetoable closing notification before closing a provider.
	pub confirm_close: bool,
	/// Select providers created through the factory path.
	pub select_on_create: bool,
}

impl Default for ProvidersConfig {
	fn default() -> Self {
		Self {
			confirm_close: true,
			select_on_create: true,
		}
	}
}

/// `[highlights]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HighlightsConfig {
	pub id_overflow: IdOverflow,
}

/// What a keyed store does once its `u32` id counter is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdOverflow {
	/// Restart at 1, skipping ids that are still in use.
	#[default]
	Wrap,
	/// Refuse new entries.
	Saturate,
}

const KNOWN_KEYS: &[(&str, &[&str])] = &[
	("logging", &["filter", "directory"]),
	("providers", &["confirm_close", "select_on_create"]),
	("highlights", &["id_overflow"]),
];

impl Config {
	/// Parse a TOML string into a [`Config`].
	pub fn parse(input: &str) -> Result<Self> {
		let raw: toml::Table = toml::from_str(input)?;
		let mut config: Config = toml::from_str(input)?;
		config.warnings = unknown_keys(&raw);
		config.validate()?;
		Ok(config)
	}

	/// Load configuration from a file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
			path: path.to_path_buf(),
			error: e,
		})?;
		Self::parse(&content)
	}

	/// Load from the first default location that exists, or return defaults.
	pub fn load_default() -> Result<Self> {
		match default_path() {
			Some(path) if path.is_file() => Self::load(path),
			_ => Ok(Self::default()),
		}
	}

	fn validate(&self) -> Result<()> {
		if self.logging.filter.trim().is_empty() {
			return Err(ConfigError::InvalidValue {
				key: "logging.filter".to_string(),
				reason: "filter must not be empty".to_string(),
			});
		}
		Ok(())
	}
}

/// Returns the config file path [`Config::load_default`] would read.
pub fn default_path() -> Option<PathBuf> {
	if let Some(path) = std::env::var_os(CONFIG_ENV) {
		return Some(PathBuf::from(path));
	}
	dirs::config_dir().map(|dir| dir.join("hexbench").join("config.toml"))
}

fn unknown_keys(raw: &toml::Table) -> Vec<ConfigWarning> {
	let mut warnings = Vec::new();
	for (section, value) in raw {
		let Some((_, fields)) = KNOWN_KEYS.iter().find(|(name, _)| name == section) else {
			warnings.push(ConfigWarning::UnknownKey(section.clone()));
			continue;
		};
		if let Some(table) = value.as_table() {
			for key in table.keys().filter(|k| !fields.contains(&k.as_str())) {
				warnings.push(ConfigWarning::UnknownKey(format!("{section}.{key}")));
			}
		}
	}
	warnings
}
