//! The provider capability the registry manages.

use hexbench_events::Request;

/// A data source opened in the workbench (a file, a process, a disk...).
///
/// The registry owns each provider exclusively from [`add`] until the
/// provider has been closed and finalized.
///
/// [`add`]: crate::ProviderRegistry::add
pub trait Provider: Send {
	/// Human-readable name, used in logs and the window title.
	fn name(&self) -> String;

	/// Releases the provider's resources. Called exactly once, synchronously.
	fn close(&mut self);

	fn mark_dirty(&mut self, dirty: bool);

	fn is_dirty(&self) -> bool;

	/// Skips the provider's interactive load step (e.g. a settings dialog).
	fn skip_load_interface(&mut self) {}
}

impl std::fmt::Debug for dyn Provider {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Provider")
			.field("name", &self.name())
			.field("dirty", &self.is_dirty())
			.finish()
	}
}

/// Asks registered factories to construct a provider by type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProvider {
	/// Unlocalized provider type name, e.g. `"hex.builtin.provider.file"`.
	pub name: String,
	pub skip_load_interface: bool,
	pub select: bool,
}

impl Request for CreateProvider {
	type Response = Box<dyn Provider>;
}
