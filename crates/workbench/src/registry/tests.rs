use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use hexbench_events::{EventKind, Verdict};
use hexbench_worker::TaskClass;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

#[derive(Default)]
struct Probe {
	closed: AtomicUsize,
	dirty: AtomicBool,
	skipped_load: AtomicBool,
}

struct TestProvider {
	name: &'static str,
	probe: Arc<Probe>,
}

impl Provider for TestProvider {
	fn name(&self) -> String {
		self.name.to_string()
	}

	fn close(&mut self) {
		self.probe.closed.fetch_add(1, Ordering::SeqCst);
	}

	fn mark_dirty(&mut self, dirty: bool) {
		self.probe.dirty.store(dirty, Ordering::SeqCst);
	}

	fn is_dirty(&self) -> bool {
		self.probe.dirty.load(Ordering::SeqCst)
	}

	fn skip_load_interface(&mut self) {
		self.probe.skipped_load.store(true, Ordering::SeqCst);
	}
}

fn provider(name: &'static str) -> (Box<dyn Provider>, Arc<Probe>) {
	let probe = Arc::new(Probe::default());
	(
		Box::new(TestProvider {
			name,
			probe: probe.clone(),
		}),
		probe,
	)
}

struct Harness {
	registry: ProviderRegistry,
	tracker: TaskTracker,
	bus: EventBus,
	events: Arc<Mutex<Vec<Event>>>,
}

impl Harness {
	fn new() -> Self {
		let bus = EventBus::new();
		let tracker = TaskTracker::new();
		let events = Arc::new(Mutex::new(Vec::new()));
		let log = events.clone();
		bus.subscribe_all(move |event: &Event| log.lock().push(*event));
		Self {
			registry: ProviderRegistry::new(bus.clone(), tracker.clone()),
			tracker,
			bus,
			events,
		}
	}

	fn add(&mut self, name: &'static str, select: bool) -> ProviderId {
		let (p, _) = provider(name);
		self.registry.add(p, false, select).unwrap()
	}

	fn take_events(&self) -> Vec<Event> {
		std::mem::take(&mut *self.events.lock())
	}

	fn changes(&self) -> Vec<(Option<ProviderId>, Option<ProviderId>)> {
		self.events
			.lock()
			.iter()
			.filter_map(|e| match e {
				Event::ProviderChanged { old, new } => Some((*old, *new)),
				_ => None,
			})
			.collect()
	}
}

#[test]
fn first_add_selects_and_announces() {
	let mut h = Harness::new();
	let a = h.add("a", false);

	assert_eq!(h.registry.current_index(), 0);
	assert_eq!(h.registry.current_id(), Some(a));
	assert_eq!(
		h.take_events(),
		vec![
			Event::ProviderCreated { provider: a },
			Event::ProviderChanged { old: None, new: Some(a) },
		]
	);
}

#[test]
fn add_without_select_keeps_current() {
	let mut h = Harness::new();
	let a = h.add("a", false);
	let b = h.add("b", false);

	assert_eq!(h.registry.providers(), vec![a, b]);
	assert_eq!(h.registry.current_id(), Some(a));
}

#[test]
fn add_with_select_switches() {
	let mut h = Harness::new();
	let a = h.add("a", false);
	h.take_events();
	let b = h.add("b", true);

	assert_eq!(h.registry.current_index(), 1);
	assert_eq!(h.changes(), vec![(Some(a), Some(b))]);
}

#[test]
fn created_is_posted_before_membership() {
	let bus = EventBus::new();
	let tracker = TaskTracker::new();
	let mut registry = ProviderRegistry::new(bus.clone(), tracker);
	let order = Arc::new(Mutex::new(Vec::new()));
	let o = order.clone();
	bus.subscribe_all(move |event: &Event| o.lock().push(event.kind()));

	let (p, _) = provider("a");
	registry.add(p, false, false);

	assert_eq!(*order.lock(), vec![EventKind::ProviderCreated, EventKind::ProviderChanged]);
}

#[test]
fn add_can_skip_load_interface() {
	let mut h = Harness::new();
	let (p, probe) = provider("a");
	h.registry.add(p, true, true);
	assert!(probe.skipped_load.load(Ordering::SeqCst));

	let (p, probe) = provider("b");
	h.registry.add(p, false, true);
	assert!(!probe.skipped_load.load(Ordering::SeqCst));
}

#[test]
fn set_current_provider_announces_identity_change() {
	let mut h = Harness::new();
	let a = h.add("a", false);
	let b = h.add("b", false);
	h.take_events();

	h.registry.set_current_provider(1);
	assert_eq!(h.registry.current_index(), 1);
	assert_eq!(h.take_events(), vec![Event::ProviderChanged { old: Some(a), new: Some(b) }]);

	h.registry.set_current_provider(1);
	h.registry.set_current_provider(5);
	assert!(h.take_events().is_empty());
	assert_eq!(h.registry.current_index(), 1);
}

#[test]
fn remove_none_is_noop() {
	let mut h = Harness::new();
	h.add("a", false);
	h.take_events();

	h.registry.remove(None, false);
	assert!(h.take_events().is_empty());
	assert_eq!(h.registry.len(), 1);
}

#[test]
fn remove_runs_close_then_defers_deletion() {
	let mut h = Harness::new();
	let (p, probe) = provider("a");
	let a = h.registry.add(p, false, true).unwrap();
	h.take_events();

	h.registry.remove(a, true);
	assert_eq!(probe.closed.load(Ordering::SeqCst), 1);
	assert_eq!(h.registry.closing_providers(), &[a]);
	assert_eq!(h.registry.providers(), vec![a]);
	assert_eq!(
		h.take_events(),
		vec![Event::ProviderClosed { provider: a }, Event::RequestUpdateWindowTitle]
	);

	assert_eq!(h.registry.run_deferred(), vec![a]);
	assert_eq!(
		h.take_events(),
		vec![
			Event::ProviderDeleted { provider: a },
			Event::ProviderChanged { old: Some(a), new: None },
		]
	);
	assert!(h.registry.is_empty());
	assert!(h.registry.closing_providers().is_empty());
	assert_eq!(h.registry.current_index(), -1);
	assert!(h.registry.get().is_none());
	assert_eq!(probe.closed.load(Ordering::SeqCst), 1);
}

#[test]
fn closing_event_is_posted_unless_no_questions() {
	let mut h = Harness::new();
	let a = h.add("a", false);
	let b = h.add("b", false);
	h.take_events();

	h.registry.remove(a, false);
	h.registry.remove(b, true);

	let closing: Vec<_> = h
		.take_events()
		.into_iter()
		.filter(|e| e.kind() == EventKind::ProviderClosing)
		.collect();
	assert_eq!(closing, vec![Event::ProviderClosing { provider: a }]);
}

#[test]
fn veto_keeps_provider_live() {
	let mut h = Harness::new();
	let (p, probe) = provider("a");
	let a = h.registry.add(p, false, true).unwrap();
	h.bus.subscribe(EventKind::ProviderClosing, |_: &Event| Verdict::Veto);
	h.take_events();

	h.registry.remove(a, false);

	assert_eq!(probe.closed.load(Ordering::SeqCst), 0);
	assert_eq!(h.registry.providers(), vec![a]);
	assert_eq!(h.registry.current_id(), Some(a));
	assert!(h.registry.closing_providers().is_empty());
	assert_eq!(h.registry.pending_removals(), 0);
	assert!(h.registry.run_deferred().is_empty());
	assert_eq!(h.take_events(), vec![Event::ProviderClosing { provider: a }]);
}

#[test]
fn vetoed_provider_can_be_closed_later() {
	let mut h = Harness::new();
	let a = h.add("a", false);
	let allow = Arc::new(AtomicBool::new(false));
	let gate = allow.clone();
	h.bus.subscribe(EventKind::ProviderClosing, move |_: &Event| {
		if gate.load(Ordering::SeqCst) { Verdict::Proceed } else { Verdict::Veto }
	});

	h.registry.remove(a, false);
	assert!(h.registry.closing_providers().is_empty());

	allow.store(true, Ordering::SeqCst);
	h.registry.remove(a, false);
	assert_eq!(h.registry.closing_providers(), &[a]);

	h.registry.run_deferred();
	assert!(h.registry.is_empty());
	assert!(h.registry.closing_providers().is_empty());
}

#[test]
fn remove_twice_is_noop() {
	let mut h = Harness::new();
	let (p, probe) = provider("a");
	let a = h.registry.add(p, false, true).unwrap();
	h.add("b", false);

	h.registry.remove(a, true);
	h.take_events();
	h.registry.remove(a, true);
	assert!(h.take_events().is_empty());
	assert_eq!(h.registry.pending_removals(), 1);

	h.registry.run_deferred();
	h.take_events();
	h.registry.remove(a, true);
	h.registry.remove(a, true);
	assert!(h.take_events().is_empty());
	assert_eq!(probe.closed.load(Ordering::SeqCst), 1);
}

#[test]
fn removing_leading_current_selects_successor_once() {
	let mut h = Harness::new();
	let a = h.add("a", false);
	let b = h.add("b", false);
	let c = h.add("c", false);
	h.take_events();

	h.registry.remove(a, true);
	assert_eq!(h.changes(), vec![(Some(a), Some(b))]);
	assert_eq!(h.registry.current_id(), Some(b));

	h.registry.run_deferred();
	assert_eq!(h.changes(), vec![(Some(a), Some(b))]);
	assert_eq!(h.registry.providers(), vec![b, c]);
	assert_eq!(h.registry.current_index(), 0);
}

#[test]
fn removing_current_selects_predecessor() {
	let mut h = Harness::new();
	let a = h.add("a", false);
	let b = h.add("b", false);
	let c = h.add("c", true);
	h.take_events();

	h.registry.remove(c, true);
	assert_eq!(h.changes(), vec![(Some(c), Some(b))]);

	h.registry.run_deferred();
	assert_eq!(h.registry.providers(), vec![a, b]);
	assert_eq!(h.registry.current_id(), Some(b));
	assert_eq!(h.registry.current_index(), 1);
}

#[test]
fn removing_other_keeps_current_by_identity() {
	let mut h = Harness::new();
	let a = h.add("a", false);
	let b = h.add("b", true);
	let c = h.add("c", false);
	h.take_events();

	h.registry.remove(c, true);
	h.registry.run_deferred();
	assert_eq!(h.registry.current_id(), Some(b));

	h.registry.remove(a, true);
	h.registry.run_deferred();
	assert_eq!(h.registry.providers(), vec![b]);
	assert_eq!(h.registry.current_index(), 0);
	assert!(h.changes().is_empty());
}

#[test]
fn consecutive_removals_before_drain_skip_closing_providers() {
	let mut h = Harness::new();
	let a = h.add("a", false);
	let b = h.add("b", false);
	let c = h.add("c", true);

	h.registry.remove(c, true);
	assert_eq!(h.registry.current_id(), Some(b));
	h.registry.remove(b, true);
	assert_eq!(h.registry.current_id(), Some(a));

	h.registry.run_deferred();
	assert_eq!(h.registry.providers(), vec![a]);
	assert_eq!(h.registry.current_id(), Some(a));
}

#[test]
fn cannot_select_closing_provider() {
	let mut h = Harness::new();
	let a = h.add("a", false);
	h.add("b", false);

	h.registry.remove(a, true);
	h.take_events();
	h.registry.set_current_provider(0);
	assert!(h.take_events().is_empty());
	assert_eq!(h.registry.current_index(), 1);
}

#[test]
fn add_while_only_provider_is_closing_selects_new_one() {
	let mut h = Harness::new();
	let a = h.add("a", false);
	h.registry.remove(a, true);

	let b = h.add("b", false);
	assert_eq!(h.registry.current_id(), Some(b));

	h.registry.run_deferred();
	assert_eq!(h.registry.providers(), vec![b]);
	assert_eq!(h.registry.current_index(), 0);
}

#[test]
fn running_tasks_gate_every_mutation() {
	let mut h = Harness::new();
	let a = h.add("a", false);
	h.add("b", false);
	h.take_events();

	let guard = h.tracker.enter(TaskClass::Background, "analysis");
	let (p, _) = provider("c");
	assert_eq!(h.registry.add(p, false, true), None);
	h.registry.remove(a, true);
	h.registry.set_current_provider(1);

	assert!(h.take_events().is_empty());
	assert_eq!(h.registry.len(), 2);
	assert_eq!(h.registry.current_index(), 0);
	assert!(h.registry.closing_providers().is_empty());
	drop(guard);
}

#[test]
fn deferred_removal_waits_for_tasks() {
	let mut h = Harness::new();
	let a = h.add("a", false);
	let b = h.add("b", false);

	h.registry.remove(a, true);
	let guard = h.tracker.enter(TaskClass::Background, "export");
	assert!(h.registry.run_deferred().is_empty());
	assert_eq!(h.registry.providers(), vec![a, b]);
	assert!(h.registry.is_closing(a));

	drop(guard);
	assert_eq!(h.registry.run_deferred(), vec![a]);
	assert_eq!(h.registry.providers(), vec![b]);
	assert!(!h.registry.contains(a));
}

#[test]
fn dirty_tracking() {
	let mut h = Harness::new();
	let (pa, probe_a) = provider("a");
	let (pb, probe_b) = provider("b");
	h.registry.add(pa, false, false);
	h.registry.add(pb, false, true);
	assert!(!h.registry.is_dirty());

	h.registry.mark_dirty();
	assert!(probe_b.dirty.load(Ordering::SeqCst));
	assert!(!probe_a.dirty.load(Ordering::SeqCst));
	assert!(h.registry.is_dirty());

	h.registry.reset_dirty();
	assert!(!h.registry.is_dirty());
}

#[test]
fn mark_dirty_without_provider_is_noop() {
	let mut h = Harness::new();
	h.registry.mark_dirty();
	assert!(!h.registry.is_dirty());
}

#[test]
fn create_provider_uses_factory() {
	let mut h = Harness::new();
	h.bus.respond(|req: &CreateProvider| {
		(req.name == "hex.builtin.provider.mem").then(|| provider("mem").0)
	});

	assert_eq!(h.registry.create_provider("hex.builtin.provider.file", false, true), None);
	let id = h.registry.create_provider("hex.builtin.provider.mem", false, true).unwrap();
	assert_eq!(h.registry.current_id(), Some(id));
	assert_eq!(h.registry.get().map(|p| p.name()), Some("mem".to_string()));
}

#[test]
fn reset_closing_providers_clears_set() {
	let mut h = Harness::new();
	let a = h.add("a", false);
	h.add("b", false);
	h.registry.remove(a, true);
	assert!(h.registry.is_closing(a));

	h.registry.reset_closing_providers();
	assert!(h.registry.closing_providers().is_empty());
}

#[test]
fn remove_after_reset_closing_does_not_close_twice() {
	let mut h = Harness::new();
	let (pa, probe) = provider("a");
	let a = h.registry.add(pa, false, false).unwrap();
	h.add("b", false);

	h.registry.remove(a, true);
	h.registry.reset_closing_providers();
	h.registry.remove(a, true);

	assert_eq!(probe.closed.load(Ordering::SeqCst), 1);
	assert_eq!(h.registry.pending_removals(), 1);

	assert_eq!(h.registry.run_deferred(), vec![a]);
	let deleted = h
		.take_events()
		.into_iter()
		.filter(|e| *e == Event::ProviderDeleted { provider: a })
		.count();
	assert_eq!(deleted, 1);
	assert!(!h.registry.contains(a));

	// Removal is finished; the id is now unknown.
	h.registry.remove(a, true);
	assert_eq!(probe.closed.load(Ordering::SeqCst), 1);
	assert_eq!(h.registry.pending_removals(), 0);
}

#[test]
fn close_all_skips_providers_closed_before_reset() {
	let mut h = Harness::new();
	let (pa, probe) = provider("a");
	let a = h.registry.add(pa, false, false).unwrap();
	h.registry.remove(a, true);
	h.registry.reset_closing_providers();

	h.registry.close_all();

	assert_eq!(probe.closed.load(Ordering::SeqCst), 1);
	assert!(h.registry.run_deferred().is_empty());
}

#[test]
fn close_all_closes_and_drops_everything() {
	let mut h = Harness::new();
	let (pa, probe_a) = provider("a");
	let (pb, probe_b) = provider("b");
	let a = h.registry.add(pa, false, false).unwrap();
	let b = h.registry.add(pb, false, false).unwrap();
	h.registry.remove(a, true);
	h.take_events();

	h.registry.close_all();

	assert_eq!(probe_a.closed.load(Ordering::SeqCst), 1);
	assert_eq!(probe_b.closed.load(Ordering::SeqCst), 1);
	assert!(h.registry.is_empty());
	assert_eq!(h.registry.pending_removals(), 0);
	assert_eq!(
		h.take_events(),
		vec![
			Event::ProviderClosed { provider: b },
			Event::ProviderDeleted { provider: a },
			Event::ProviderDeleted { provider: b },
			Event::ProviderChanged { old: Some(b), new: None },
		]
	);
}

#[derive(Debug, Clone)]
enum Op {
	Add(bool),
	Remove(usize, bool),
	Select(usize),
}

fn op() -> impl Strategy<Value = Op> {
	prop_oneof![
		any::<bool>().prop_map(Op::Add),
		(0usize..6, any::<bool>()).prop_map(|(i, q)| Op::Remove(i, q)),
		(0usize..6).prop_map(Op::Select),
	]
}

fn apply(h: &mut Harness, op: &Op) {
	match *op {
		Op::Add(select) => {
			let (p, _) = provider("p");
			h.registry.add(p, false, select);
		}
		Op::Remove(i, no_questions) => {
			let id = h.registry.providers().get(i).copied();
			h.registry.remove(id, no_questions);
		}
		Op::Select(i) => h.registry.set_current_provider(i),
	}
}

proptest! {
	#[test]
	fn adds_are_counted(selects in proptest::collection::vec(any::<bool>(), 1..20)) {
		let mut h = Harness::new();
		for select in &selects {
			let (p, _) = provider("p");
			h.registry.add(p, false, *select);
		}
		prop_assert_eq!(h.registry.len(), selects.len());
		let expected = selects.iter().rposition(|s| *s).unwrap_or(0) as i64;
		prop_assert_eq!(h.registry.current_index(), expected);
	}

	#[test]
	fn gated_mutations_change_nothing(setup in proptest::collection::vec(op(), 0..12), gated in proptest::collection::vec(op(), 1..12)) {
		let mut h = Harness::new();
		for op in &setup {
			apply(&mut h, op);
		}

		let providers = h.registry.providers();
		let index = h.registry.current_index();
		let closing = h.registry.closing_providers().to_vec();
		h.take_events();

		let guard = h.tracker.enter(TaskClass::Interactive, "busy");
		for op in &gated {
			apply(&mut h, op);
		}
		drop(guard);

		prop_assert_eq!(h.registry.providers(), providers);
		prop_assert_eq!(h.registry.current_index(), index);
		prop_assert_eq!(h.registry.closing_providers().to_vec(), closing);
		prop_assert!(h.take_events().is_empty());
	}

	#[test]
	fn current_index_stays_in_range(ops in proptest::collection::vec(op(), 0..30)) {
		let mut h = Harness::new();
		for op in &ops {
			apply(&mut h, op);
			let index = h.registry.current_index();
			prop_assert!(index >= -1 && index < h.registry.len() as i64);
			prop_assert_eq!(index >= 0, !h.registry.is_empty());
		}
		h.registry.run_deferred();
		prop_assert!(h.registry.closing_providers().is_empty());
		if !h.registry.is_empty() {
			let id = h.registry.current_id().unwrap();
			prop_assert!(h.registry.contains(id));
		}
	}
}
