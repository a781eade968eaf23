//! Provider storage, selection tracking, and the two-phase close protocol.
//!
//! [`ProviderRegistry`] owns every open provider. Providers live in an arena
//! keyed by [`ProviderId`]; a separate ordered list of ids defines positions
//! and therefore the meaning of the current index.
//!
//! # Closing
//!
//! Removal happens in two phases:
//!
//! 1. [`remove`](ProviderRegistry::remove) asks subscribers (unless told not
//!    to), picks a new current provider, calls [`Provider::close`] and posts
//!    `ProviderClosed`. The provider stays in the list, marked as closing.
//! 2. Once no background task is running, [`run_deferred`](ProviderRegistry::run_deferred)
//!    posts `ProviderDeleted`, drops the provider and re-validates the
//!    current index.
//!
//! Background tasks may refer to providers by position while they run; the
//! list is therefore only restructured in phase 2.

mod reselect;
#[cfg(test)]
mod tests;

use hexbench_events::{Event, EventBus};
use hexbench_primitives::ProviderId;
use hexbench_worker::{Scheduler, TaskTracker};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

use self::reselect::{RemovalCase, target_after_removal};
use crate::gate::TaskGate;
use crate::provider::{CreateProvider, Provider};

/// Work the registry defers until background tasks have drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredWork {
	/// Phase 2 of closing a provider.
	FinalizeRemoval(ProviderId),
}

/// Ordered set of open providers plus the current selection.
pub struct ProviderRegistry {
	bus: EventBus,
	gate: TaskGate,
	scheduler: Scheduler<DeferredWork>,
	/// Owned providers by id.
	arena: HashMap<ProviderId, Box<dyn Provider>>,
	/// Provider ids in tab order.
	order: Vec<ProviderId>,
	/// Index into `order`; `None` when nothing is selected.
	current: Option<usize>,
	/// Providers that passed the veto gate and await phase 2.
	closing: Vec<ProviderId>,
	/// Providers with a queued finalization. Survives `reset_closing_providers`.
	finalizing: HashSet<ProviderId>,
	/// Counter for issuing provider ids.
	next_id: u64,
}

impl std::fmt::Debug for ProviderRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ProviderRegistry")
			.field("order", &self.order)
			.field("current", &self.current)
			.field("closing", &self.closing)
			.field("pending", &self.scheduler.pending_idle_work())
			.finish()
	}
}

impl ProviderRegistry {
	/// Creates an empty registry gated on `tasks`.
	pub fn new(bus: EventBus, tasks: TaskTracker) -> Self {
		Self {
			bus,
			gate: TaskGate::new(tasks.clone()),
			scheduler: Scheduler::new(tasks),
			arena: HashMap::default(),
			order: Vec::new(),
			current: None,
			closing: Vec::new(),
			finalizing: HashSet::default(),
			next_id: 1,
		}
	}

	pub fn gate(&self) -> &TaskGate {
		&self.gate
	}

	/// Takes ownership of `provider` and appends it to the list.
	///
	/// The provider becomes current when `select` is set or when no live
	/// provider is current yet. Returns `None`, dropping the provider, when
	/// background tasks are running.
	pub fn add(&mut self, mut provider: Box<dyn Provider>, skip_load_interface: bool, select: bool) -> Option<ProviderId> {
		if !self.gate.permits("provider.add") {
			return None;
		}

		if skip_load_interface {
			provider.skip_load_interface();
		}

		let id = ProviderId(self.next_id);
		self.next_id += 1;

		self.bus.post(Event::ProviderCreated { provider: id });
		tracing::debug!(provider = %id, name = %provider.name(), select, "provider.add");
		self.arena.insert(id, provider);
		self.order.push(id);

		if select || self.live_current().is_none() {
			self.select(self.order.len() - 1);
		}
		Some(id)
	}

	/// Asks a registered factory for a provider named `name` and adds it.
	///
	/// Returns `None` if no factory answers or the add is gated.
	pub fn create_provider(&mut self, name: &str, skip_load_interface: bool, select: bool) -> Option<ProviderId> {
		let request = CreateProvider {
			name: name.to_string(),
			skip_load_interface,
			select,
		};
		let Some(provider) = self.bus.request(&request) else {
			tracing::debug!(name, "provider.create.no_factory");
			return None;
		};
		self.add(provider, skip_load_interface, select)
	}

	/// Closes `provider`, finalizing its removal once background work drains.
	///
	/// Unless `no_questions` is set, a `ProviderClosing` event is posted first
	/// and any subscriber may veto. No-op for `None`, for unknown or already
	/// closing providers, and while background tasks run.
	pub fn remove(&mut self, provider: impl Into<Option<ProviderId>>, no_questions: bool) {
		let Some(id) = provider.into() else {
			return;
		};

		if !self.gate.permits("provider.remove") {
			return;
		}

		let Some(position) = self.position(id) else {
			tracing::debug!(provider = %id, "provider.remove.not_found");
			return;
		};

		if self.is_closing(id) || self.finalizing.contains(&id) {
			tracing::debug!(provider = %id, "provider.remove.already_closing");
			return;
		}

		self.closing.push(id);
		if !no_questions && self.bus.post(Event::ProviderClosing { provider: id }).is_veto() {
			self.closing.retain(|c| *c != id);
			tracing::debug!(provider = %id, "provider.remove.vetoed");
			return;
		}

		self.reselect_for_removal(position);

		if let Some(provider) = self.arena.get_mut(&id) {
			provider.close();
		}
		self.bus.post(Event::ProviderClosed { provider: id });
		self.bus.post(Event::RequestUpdateWindowTitle);

		tracing::debug!(provider = %id, position, "provider.remove.closed");
		self.finalizing.insert(id);
		self.scheduler.run_when_idle(DeferredWork::FinalizeRemoval(id));
	}

	fn reselect_for_removal(&mut self, removed: usize) {
		let case = RemovalCase::classify(self.current, removed);
		let target = target_after_removal(&self.order, &self.closing, self.current, removed);
		tracing::trace!(?case, removed, current = ?self.current, ?target, "provider.reselect");

		if let Some(target) = target {
			self.select(target);
		}
	}

	/// Runs deferred removals if no background task is running.
	///
	/// Returns the ids of the providers that were finalized.
	pub fn run_deferred(&mut self) -> Vec<ProviderId> {
		let mut finalized = Vec::new();
		for work in self.scheduler.take_idle_work() {
			match work {
				DeferredWork::FinalizeRemoval(id) => {
					if self.finalize_removal(id) {
						finalized.push(id);
					}
				}
			}
		}
		finalized
	}

	fn finalize_removal(&mut self, id: ProviderId) -> bool {
		self.closing.retain(|c| *c != id);
		if !self.finalizing.remove(&id) {
			tracing::warn!(provider = %id, "provider.finalize.not_pending");
			return false;
		}

		let Some(position) = self.position(id) else {
			tracing::warn!(provider = %id, "provider.finalize.missing");
			return false;
		};
		self.bus.post(Event::ProviderDeleted { provider: id });

		let current_id = self.current_id();
		self.order.remove(position);
		drop(self.arena.remove(&id));

		// Re-locate the selection by identity; positions after `position` shifted.
		self.current = current_id.filter(|c| *c != id).and_then(|c| self.position(c));

		if self.current.is_none() && !self.order.is_empty() {
			let fallback = (0..self.order.len())
				.find(|i| !self.closing.contains(&self.order[*i]))
				.unwrap_or(0);
			self.current = Some(fallback);
			self.bus.post(Event::ProviderChanged {
				old: Some(id),
				new: Some(self.order[fallback]),
			});
		}

		if self.order.is_empty() {
			self.bus.post(Event::ProviderChanged { old: Some(id), new: None });
		}

		tracing::debug!(provider = %id, remaining = self.order.len(), current = ?self.current, "provider.finalize");
		true
	}

	/// Makes the provider at `index` current.
	///
	/// No-op while background tasks run, when `index` is out of range or
	/// already current, or when that provider is closing.
	pub fn set_current_provider(&mut self, index: usize) {
		if !self.gate.permits("provider.select") {
			return;
		}

		let Some(&id) = self.order.get(index) else {
			return;
		};
		if self.current == Some(index) {
			return;
		}
		if self.is_closing(id) {
			tracing::debug!(provider = %id, index, "provider.select.closing");
			return;
		}
		self.select(index);
	}

	/// Ungated selection change; posts `ProviderChanged` when the identity changes.
	fn select(&mut self, index: usize) {
		let old = self.current_id();
		self.current = Some(index);
		let new = self.current_id();
		if old != new {
			self.bus.post(Event::ProviderChanged { old, new });
		}
	}

	/// Current index, or `-1` when no provider is selected.
	pub fn current_index(&self) -> i64 {
		match self.current {
			Some(index) if index < self.order.len() => index as i64,
			_ => -1,
		}
	}

	/// Returns true if a provider is currently selected.
	pub fn is_valid(&self) -> bool {
		self.current.is_some_and(|index| index < self.order.len())
	}

	pub fn current_id(&self) -> Option<ProviderId> {
		self.current.and_then(|index| self.order.get(index).copied())
	}

	fn live_current(&self) -> Option<ProviderId> {
		self.current_id().filter(|id| !self.is_closing(*id))
	}

	/// Returns the current provider.
	pub fn get(&self) -> Option<&dyn Provider> {
		self.current_id().and_then(|id| self.provider(id))
	}

	pub fn get_mut(&mut self) -> Option<&mut (dyn Provider + 'static)> {
		let id = self.current_id()?;
		self.provider_mut(id)
	}

	pub fn provider(&self, id: ProviderId) -> Option<&dyn Provider> {
		self.arena.get(&id).map(|p| p.as_ref())
	}

	pub fn provider_mut(&mut self, id: ProviderId) -> Option<&mut (dyn Provider + 'static)> {
		self.arena.get_mut(&id).map(|p| p.as_mut())
	}

	/// Provider ids in order, including providers that are closing.
	pub fn providers(&self) -> Vec<ProviderId> {
		self.order.clone()
	}

	pub fn len(&self) -> usize {
		self.order.len()
	}

	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	pub fn contains(&self, id: ProviderId) -> bool {
		self.arena.contains_key(&id)
	}

	pub fn position(&self, id: ProviderId) -> Option<usize> {
		self.order.iter().position(|p| *p == id)
	}

	/// Providers that are closed but not yet finalized.
	pub fn closing_providers(&self) -> &[ProviderId] {
		&self.closing
	}

	pub fn is_closing(&self, id: ProviderId) -> bool {
		self.closing.contains(&id)
	}

	/// Forgets closing-set membership without touching the providers.
	///
	/// Queued finalizations still run, and a provider awaiting one cannot be
	/// removed again.
	pub fn reset_closing_providers(&mut self) {
		self.closing.clear();
	}

	/// Number of removals waiting for background work to drain.
	pub fn pending_removals(&self) -> usize {
		self.scheduler.pending_idle_work()
	}

	/// Marks the current provider dirty.
	pub fn mark_dirty(&mut self) {
		if let Some(provider) = self.get_mut() {
			provider.mark_dirty(true);
		}
	}

	/// Clears the dirty flag on every provider.
	pub fn reset_dirty(&mut self) {
		for provider in self.arena.values_mut() {
			provider.mark_dirty(false);
		}
	}

	/// Returns true if any provider has unsaved changes.
	pub fn is_dirty(&self) -> bool {
		self.order
			.iter()
			.filter_map(|id| self.arena.get(id))
			.any(|p| p.is_dirty())
	}

	/// Closes and drops every provider immediately, bypassing the gate.
	///
	/// Only for teardown: running tasks must already be abandoned.
	pub fn close_all(&mut self) {
		let running = self.gate.running_task_count();
		if running > 0 {
			tracing::warn!(running, "provider.close_all.tasks_running");
		}

		let old = self.current_id();
		let order = std::mem::take(&mut self.order);
		for id in &order {
			// Already closed by `remove`; only the deletion is outstanding.
			if !self.closing.contains(id) && !self.finalizing.contains(id) {
				if let Some(provider) = self.arena.get_mut(id) {
					provider.close();
				}
				self.bus.post(Event::ProviderClosed { provider: *id });
			}
		}
		for id in &order {
			self.bus.post(Event::ProviderDeleted { provider: *id });
			drop(self.arena.remove(id));
		}

		self.closing.clear();
		self.finalizing.clear();
		self.current = None;
		// Pending finalizations refer to providers that no longer exist.
		self.scheduler.discard_pending();
		if old.is_some() {
			self.bus.post(Event::ProviderChanged { old, new: None });
		}
		tracing::debug!(closed = order.len(), "provider.close_all");
	}
}
