//! Named handlers for messages forwarded from other processes.

use rustc_hash::FxHashMap as HashMap;
use thiserror::Error;

type Handler = Box<dyn Fn(&[u8]) + Send + Sync>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessagingError {
	#[error("no messaging handler registered for '{0}'")]
	UnknownHandler(String),
}

/// Registry of message handlers keyed by event name.
#[derive(Default)]
pub struct MessagingHandlers {
	handlers: HashMap<String, Handler>,
}

impl std::fmt::Debug for MessagingHandlers {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MessagingHandlers")
			.field("handlers", &self.handlers.keys().collect::<Vec<_>>())
			.finish()
	}
}

impl MessagingHandlers {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `handler` under `name`. The first registration for a name wins.
	///
	/// Returns false if `name` was already taken.
	pub fn register_handler<F>(&mut self, name: impl Into<String>, handler: F) -> bool
	where
		F: Fn(&[u8]) + Send + Sync + 'static,
	{
		let name = name.into();
		if self.handlers.contains_key(&name) {
			tracing::debug!(name = %name, "messaging.duplicate");
			return false;
		}
		tracing::debug!(name = %name, "messaging.register");
		self.handlers.insert(name, Box::new(handler));
		true
	}

	pub fn run_handler(&self, name: &str, args: &[u8]) -> Result<(), MessagingError> {
		let Some(handler) = self.handlers.get(name) else {
			tracing::error!(name, "messaging.unknown_handler");
			return Err(MessagingError::UnknownHandler(name.to_string()));
		};
		tracing::trace!(name, len = args.len(), "messaging.run");
		handler(args);
		Ok(())
	}

	pub fn contains(&self, name: &str) -> bool {
		self.handlers.contains_key(name)
	}
}
