//! Background task runtime for the workbench.
//!
//! The control thread never waits on background work. Instead it asks two
//! questions of this crate: how many tasks are running right now
//! ([`TaskTracker::running_task_count`]) and "run this once nothing is
//! running" ([`Scheduler::run_when_idle`]).

mod class;
mod runtime;
mod scheduler;
mod tracker;

pub use class::TaskClass;
pub use runtime::TaskManager;
pub use scheduler::Scheduler;
pub use tracker::{TaskGuard, TaskTracker};
