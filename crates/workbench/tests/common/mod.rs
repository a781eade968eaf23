#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use hexbench_events::{Event, EventBus, EventKind};
use hexbench_primitives::ProviderId;
use hexbench_workbench::Provider;
use parking_lot::Mutex;

/// Provider that counts how often it was closed.
pub struct MemoryProvider {
	pub name: String,
	pub closed: Arc<AtomicUsize>,
	dirty: bool,
}

impl MemoryProvider {
	pub fn boxed(name: &str) -> (Box<dyn Provider>, Arc<AtomicUsize>) {
		let closed = Arc::new(AtomicUsize::new(0));
		let provider = Self {
			name: name.to_string(),
			closed: closed.clone(),
			dirty: false,
		};
		(Box::new(provider), closed)
	}
}

impl Provider for MemoryProvider {
	fn name(&self) -> String {
		self.name.clone()
	}

	fn close(&mut self) {
		self.closed.fetch_add(1, Ordering::SeqCst);
	}

	fn mark_dirty(&mut self, dirty: bool) {
		self.dirty = dirty;
	}

	fn is_dirty(&self) -> bool {
		self.dirty
	}
}

/// Records every event posted on a bus.
#[derive(Clone, Default)]
pub struct Recorder {
	events: Arc<Mutex<Vec<Event>>>,
}

impl Recorder {
	pub fn attach(bus: &EventBus) -> Self {
		let recorder = Self::default();
		let events = recorder.events.clone();
		bus.subscribe_all(move |event: &Event| events.lock().push(*event));
		recorder
	}

	pub fn take(&self) -> Vec<Event> {
		std::mem::take(&mut *self.events.lock())
	}

	pub fn kinds(&self) -> Vec<EventKind> {
		self.events.lock().iter().map(Event::kind).collect()
	}

	pub fn changes(&self) -> Vec<(Option<ProviderId>, Option<ProviderId>)> {
		self.events
			.lock()
			.iter()
			.filter_map(|e| match *e {
				Event::ProviderChanged { old, new } => Some((old, new)),
				_ => None,
			})
			.collect()
	}
}
