use std::any::Any;
use std::sync::Arc;

/// A typed request/response round trip carried by the bus.
///
/// Responders are tried in registration order; the first one that returns
/// `Some` answers the request.
pub trait Request: 'static {
	type Response: 'static;
}

type ResponderFn<R> = dyn Fn(&R) -> Option<<R as Request>::Response> + Send + Sync;

pub(crate) struct Responder<R: Request> {
	handler: Box<ResponderFn<R>>,
}

impl<R: Request> Responder<R> {
	pub(crate) fn new<F>(handler: F) -> Self
	where
		F: Fn(&R) -> Option<R::Response> + Send + Sync + 'static,
	{
		Self { handler: Box::new(handler) }
	}

	pub(crate) fn respond(&self, request: &R) -> Option<R::Response> {
		(self.handler)(request)
	}
}

pub(crate) type ErasedResponder = Arc<dyn Any + Send + Sync>;
