//! Workbench event bus.
//!
//! [`EventBus`] delivers [`Event`]s synchronously and in registration order on
//! the posting thread. Every subscriber returns a [`Verdict`]; the bus folds
//! them so that a single [`Verdict::Veto`] wins. Only events that are vetoable
//! ([`EventKind::is_vetoable`]) give the verdict any meaning.
//!
//! Besides broadcast events the bus carries typed request/response round trips
//! ([`Request`]), answered by the first responder that returns a value.

mod bus;
mod event;
mod request;

pub use bus::{EventBus, SubscriptionId};
pub use event::{Event, EventKind, Verdict};
pub use request::Request;
