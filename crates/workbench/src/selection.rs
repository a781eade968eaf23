//! The hex editor's current selection.

use hexbench_events::{Event, EventBus};
use hexbench_primitives::{ProviderId, ProviderRegion, Region};

use crate::ProviderRegistry;

/// Tracks the selection applied by the hex editor view.
///
/// Requests go out as [`Event::RequestSelectionChange`]; the view answers by
/// calling [`set_current_selection`](Self::set_current_selection).
#[derive(Debug)]
pub struct SelectionState {
	bus: EventBus,
	current: Option<ProviderRegion>,
}

impl SelectionState {
	pub fn new(bus: EventBus) -> Self {
		Self { bus, current: None }
	}

	pub fn selection(&self) -> Option<ProviderRegion> {
		self.current
	}

	/// Returns true if a selection exists and its provider is still registered.
	pub fn is_selection_valid(&self, registry: &ProviderRegistry) -> bool {
		self.current.is_some_and(|sel| registry.contains(sel.provider))
	}

	pub fn clear_selection(&mut self) {
		self.current = None;
	}

	/// Requests a new selection in `provider`, or in the current provider when `None`.
	///
	/// Does nothing if neither names a provider.
	pub fn set_selection(&self, registry: &ProviderRegistry, region: Region, provider: Option<ProviderId>) {
		let Some(provider) = provider.or_else(|| registry.current_id()) else {
			tracing::debug!(%region, "selection.no_provider");
			return;
		};
		self.bus.post(Event::RequestSelectionChange {
			region: Some(ProviderRegion::new(region, provider)),
		});
	}

	/// Records the selection the view actually applied.
	pub fn set_current_selection(&mut self, selection: Option<ProviderRegion>) {
		self.current = selection;
	}

	/// Clears the selection if it points into `provider`.
	pub(crate) fn forget_provider(&mut self, provider: ProviderId) {
		if self.current.is_some_and(|sel| sel.provider == provider) {
			tracing::trace!(%provider, "selection.cleared");
			self.current = None;
		}
	}
}
