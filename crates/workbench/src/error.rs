use std::path::PathBuf;

use hexbench_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkbenchError {
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error("invalid log filter: {0}")]
	LogFilter(#[from] tracing_subscriber::filter::ParseError),
	#[error("failed to open log file {path}: {error}")]
	Io {
		path: PathBuf,
		#[source]
		error: std::io::Error,
	},
}

pub type Result<T> = std::result::Result<T, WorkbenchError>;
