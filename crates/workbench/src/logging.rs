//! Tracing subscriber setup.

use std::fs::OpenOptions;
use std::path::PathBuf;

use hexbench_config::LoggingConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::error::{Result, WorkbenchError};

/// Environment variable overriding `logging.filter`.
pub const LOG_ENV: &str = "HEXBENCH_LOG";

/// Builds the filter from `HEXBENCH_LOG`, falling back to the configured directive.
pub fn filter(config: &LoggingConfig) -> Result<EnvFilter> {
	match std::env::var(LOG_ENV) {
		Ok(directive) if !directive.trim().is_empty() => Ok(EnvFilter::try_new(directive)?),
		_ => Ok(EnvFilter::try_new(&config.filter)?),
	}
}

/// Installs the global subscriber.
///
/// Logs go to `<directory>/hexbench.<pid>.log` when a directory is configured,
/// stderr otherwise. Returns the log file path, if any. A subscriber that is
/// already installed is left in place.
pub fn init(config: &LoggingConfig) -> Result<Option<PathBuf>> {
	let filter = filter(config)?;

	let (file_layer, log_path) = match &config.directory {
		Some(dir) => {
			let path = dir.join(format!("hexbench.{}.log", std::process::id()));
			let file = std::fs::create_dir_all(dir)
				.and_then(|()| OpenOptions::new().create(true).append(true).open(&path))
				.map_err(|error| WorkbenchError::Io {
					path: path.clone(),
					error,
				})?;
			let layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_target(true);
			(Some(layer), Some(path))
		}
		None => (None, None),
	};
	let stderr_layer = file_layer
		.is_none()
		.then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

	let installed = tracing_subscriber::registry()
		.with(filter)
		.with(file_layer)
		.with(stderr_layer)
		.try_init()
		.is_ok();

	if installed {
		tracing::info!(path = ?log_path, "logging.init");
	} else {
		tracing::debug!("logging.already_initialized");
	}
	Ok(log_path)
}
