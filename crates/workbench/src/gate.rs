//! Mutation gate for the provider registry.

use hexbench_worker::{TaskClass, TaskTracker};

/// Blocks registry mutation while background tasks are running.
///
/// A blocked mutation is dropped silently: no state changes and no events.
/// Tasks may hold on to providers while they run, so structural changes
/// are refused rather than raced.
#[derive(Debug, Clone)]
pub struct TaskGate {
	tasks: TaskTracker,
}

impl TaskGate {
	pub fn new(tasks: TaskTracker) -> Self {
		Self { tasks }
	}

	pub fn running_task_count(&self) -> usize {
		self.tasks.running_task_count()
	}

	pub fn is_blocked(&self) -> bool {
		self.running_task_count() > 0
	}

	/// Task classes currently holding the gate shut, with their counts.
	pub fn blocked_on(&self) -> Vec<(TaskClass, usize)> {
		self.tasks.busy_classes()
	}

	/// Returns true if `op` may proceed, logging the drop otherwise.
	pub(crate) fn permits(&self, op: &'static str) -> bool {
		let running = self.running_task_count();
		if running > 0 {
			tracing::debug!(op, running, classes = ?self.blocked_on(), "provider.gated");
			return false;
		}
		true
	}
}
