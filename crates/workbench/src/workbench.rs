//! The workbench service wiring the registry, stores and task runtime together.

use hexbench_config::Config;
use hexbench_events::EventBus;
use hexbench_primitives::{ProviderId, Region};
use hexbench_worker::TaskManager;

use crate::error::Result;
use crate::highlight::HighlightStore;
use crate::messaging::MessagingHandlers;
use crate::registry::ProviderRegistry;
use crate::selection::SelectionState;
use crate::{Provider, logging};

/// Owns every workbench component and drives the deferred closer.
///
/// The host calls [`tick`](Self::tick) once per frame; removals that were
/// waiting on background tasks complete there.
#[derive(Debug)]
pub struct Workbench {
	config: Config,
	bus: EventBus,
	tasks: TaskManager,
	registry: ProviderRegistry,
	highlights: HighlightStore,
	selection: SelectionState,
	messaging: MessagingHandlers,
}

impl Workbench {
	/// Builds a workbench without touching the global subscriber.
	pub fn new(config: Config) -> Self {
		let bus = EventBus::new();
		let tasks = TaskManager::new();
		let registry = ProviderRegistry::new(bus.clone(), tasks.tracker().clone());
		let highlights = HighlightStore::new(bus.clone(), config.highlights.id_overflow);
		let selection = SelectionState::new(bus.clone());
		Self {
			config,
			bus,
			tasks,
			registry,
			highlights,
			selection,
			messaging: MessagingHandlers::new(),
		}
	}

	/// Installs logging from `config`, then builds the workbench.
	pub fn init(config: Config) -> Result<Self> {
		logging::init(&config.logging)?;
		for warning in &config.warnings {
			tracing::warn!(%warning, "config.warning");
		}
		let workbench = Self::new(config);
		tracing::info!(
			confirm_close = workbench.config.providers.confirm_close,
			select_on_create = workbench.config.providers.select_on_create,
			"workbench.init"
		);
		Ok(workbench)
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn bus(&self) -> &EventBus {
		&self.bus
	}

	pub fn tasks(&self) -> &TaskManager {
		&self.tasks
	}

	pub fn registry(&self) -> &ProviderRegistry {
		&self.registry
	}

	pub fn registry_mut(&mut self) -> &mut ProviderRegistry {
		&mut self.registry
	}

	pub fn highlights(&self) -> &HighlightStore {
		&self.highlights
	}

	pub fn highlights_mut(&mut self) -> &mut HighlightStore {
		&mut self.highlights
	}

	pub fn selection(&self) -> &SelectionState {
		&self.selection
	}

	pub fn selection_mut(&mut self) -> &mut SelectionState {
		&mut self.selection
	}

	pub fn messaging(&self) -> &MessagingHandlers {
		&self.messaging
	}

	pub fn messaging_mut(&mut self) -> &mut MessagingHandlers {
		&mut self.messaging
	}

	/// Adds an already constructed provider, selecting it per `providers.select_on_create`.
	pub fn open(&mut self, provider: Box<dyn Provider>) -> Option<ProviderId> {
		let select = self.config.providers.select_on_create;
		self.registry.add(provider, false, select)
	}

	/// Constructs a provider through the registered factories.
	pub fn create(&mut self, name: &str, skip_load_interface: bool) -> Option<ProviderId> {
		let select = self.config.providers.select_on_create;
		self.registry.create_provider(name, skip_load_interface, select)
	}

	/// Starts closing `provider`, asking subscribers first when `providers.confirm_close` is set.
	pub fn close(&mut self, provider: ProviderId) {
		let no_questions = !self.config.providers.confirm_close;
		self.registry.remove(provider, no_questions);
	}

	/// Requests a selection in `provider`, defaulting to the current provider.
	pub fn set_selection(&self, region: Region, provider: Option<ProviderId>) {
		self.selection.set_selection(&self.registry, region, provider);
	}

	pub fn is_selection_valid(&self) -> bool {
		self.selection.is_selection_valid(&self.registry)
	}

	/// Runs deferred work that is allowed to run now.
	///
	/// Returns the providers finalized during this tick.
	pub fn tick(&mut self) -> Vec<ProviderId> {
		let finalized = self.registry.run_deferred();
		for id in &finalized {
			self.selection.forget_provider(*id);
		}
		finalized
	}

	/// Waits for background tasks to drain, then ticks.
	pub async fn settle(&mut self) -> Vec<ProviderId> {
		self.tasks.wait_idle().await;
		self.tick()
	}

	/// Closes every provider without asking and drops all stored state.
	pub fn shutdown(&mut self) {
		tracing::info!(providers = self.registry.len(), "workbench.shutdown");
		self.registry.close_all();
		self.selection.clear_selection();
		self.highlights.clear();
	}
}
