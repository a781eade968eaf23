use std::any::TypeId;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;

use crate::event::{Event, EventKind, Verdict};
use crate::request::{ErasedResponder, Request, Responder};

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = dyn Fn(&Event) -> Verdict + Send + Sync;

#[derive(Clone)]
struct Subscriber {
	id: SubscriptionId,
	/// `None` subscribes to every event.
	kind: Option<EventKind>,
	handler: Arc<Handler>,
}

#[derive(Clone, Default)]
struct SubscriberSnapshot {
	subscribers: Vec<Subscriber>,
}

struct BusInner {
	snap: ArcSwap<SubscriberSnapshot>,
	responders: RwLock<HashMap<TypeId, Vec<ErasedResponder>>>,
	next_id: AtomicU64,
}

/// Synchronous, in-order event bus.
///
/// Cloning is cheap and every clone shares the same subscriber set. Delivery
/// iterates a snapshot taken when [`post`](Self::post) starts, so handlers
/// may subscribe, unsubscribe or post further events while being called.
#[derive(Clone)]
pub struct EventBus {
	inner: Arc<BusInner>,
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for EventBus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EventBus")
			.field("subscribers", &self.subscriber_count())
			.finish()
	}
}

impl EventBus {
	pub fn new() -> Self {
		Self {
			inner: Arc::new(BusInner {
				snap: ArcSwap::from_pointee(SubscriberSnapshot::default()),
				responders: RwLock::new(HashMap::default()),
				next_id: AtomicU64::new(1),
			}),
		}
	}

	/// Subscribes `handler` to events of one kind.
	pub fn subscribe<F, R>(&self, kind: EventKind, handler: F) -> SubscriptionId
	where
		F: Fn(&Event) -> R + Send + Sync + 'static,
		R: Into<Verdict>,
	{
		self.insert(Some(kind), Arc::new(move |event: &Event| handler(event).into()))
	}

	/// Subscribes `handler` to every event.
	pub fn subscribe_all<F, R>(&self, handler: F) -> SubscriptionId
	where
		F: Fn(&Event) -> R + Send + Sync + 'static,
		R: Into<Verdict>,
	{
		self.insert(None, Arc::new(move |event: &Event| handler(event).into()))
	}

	fn insert(&self, kind: Option<EventKind>, handler: Arc<Handler>) -> SubscriptionId {
		let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
		let subscriber = Subscriber { id, kind, handler };
		self.inner.snap.rcu(|cur| {
			let mut next = SubscriberSnapshot::clone(cur);
			next.subscribers.push(subscriber.clone());
			next
		});
		tracing::trace!(subscription = id.0, kind = kind.map(EventKind::as_str), "event.subscribe");
		id
	}

	/// Removes a subscription. Returns false if it was not registered.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		let prev = self.inner.snap.rcu(|cur| {
			let mut next = SubscriberSnapshot::clone(cur);
			next.subscribers.retain(|s| s.id != id);
			next
		});
		prev.subscribers.iter().any(|s| s.id == id)
	}

	/// Returns the number of live subscriptions.
	pub fn subscriber_count(&self) -> usize {
		self.inner.snap.load().subscribers.len()
	}

	/// Delivers `event` to every matching subscriber and folds their verdicts.
	///
	/// All matching subscribers run even after one of them vetoes.
	pub fn post(&self, event: Event) -> Verdict {
		let snap = self.inner.snap.load_full();
		let kind = event.kind();
		let mut verdict = Verdict::Proceed;
		let mut delivered = 0usize;

		for subscriber in snap.subscribers.iter().filter(|s| s.kind.is_none_or(|k| k == kind)) {
			verdict = verdict.and((subscriber.handler)(&event));
			delivered += 1;
		}

		tracing::trace!(
			kind = kind.as_str(),
			delivered,
			vetoed = verdict.is_veto(),
			"event.post"
		);
		verdict
	}

	/// Registers a responder for requests of type `R`.
	pub fn respond<R, F>(&self, handler: F)
	where
		R: Request,
		F: Fn(&R) -> Option<R::Response> + Send + Sync + 'static,
	{
		let responder: ErasedResponder = Arc::new(Responder::<R>::new(handler));
		self.inner
			.responders
			.write()
			.entry(TypeId::of::<R>())
			.or_default()
			.push(responder);
	}

	/// Sends a request and returns the first answer, if any responder gives one.
	pub fn request<R: Request>(&self, request: &R) -> Option<R::Response> {
		let responders = self
			.inner
			.responders
			.read()
			.get(&TypeId::of::<R>())
			.cloned()
			.unwrap_or_default();

		let answer = responders.iter().find_map(|erased| {
			erased
				.downcast_ref::<Responder<R>>()
				.and_then(|responder| responder.respond(request))
		});

		if answer.is_none() {
			tracing::debug!(request = std::any::type_name::<R>(), responders = responders.len(), "event.request.unanswered");
		}
		answer
	}
}
