use std::collections::VecDeque;

use crate::TaskTracker;

/// Run-when-idle queue bound to a [`TaskTracker`].
///
/// Work items are descriptions (`W`), not callbacks: the owner pulls them
/// out with [`take_idle_work`](Self::take_idle_work) and executes them
/// against its own state. Items come back in submission order, exactly
/// once, and only while no task is running.
#[derive(Debug)]
pub struct Scheduler<W> {
	tasks: TaskTracker,
	idle: VecDeque<W>,
	deferred_total: u64,
}

impl<W> Scheduler<W> {
	pub fn new(tasks: TaskTracker) -> Self {
		Self {
			tasks,
			idle: VecDeque::new(),
			deferred_total: 0,
		}
	}

	/// Returns the tracker this scheduler consults.
	pub fn tasks(&self) -> &TaskTracker {
		&self.tasks
	}

	pub fn running_task_count(&self) -> usize {
		self.tasks.running_task_count()
	}

	/// Queues `work` to be handed back once the running-task count is zero.
	pub fn run_when_idle(&mut self, work: W) {
		self.idle.push_back(work);
		self.deferred_total += 1;
		tracing::trace!(
			pending = self.idle.len(),
			running = self.running_task_count(),
			"scheduler.run_when_idle"
		);
	}

	/// Number of queued items not yet handed back.
	pub fn pending_idle_work(&self) -> usize {
		self.idle.len()
	}

	/// Total items ever queued.
	pub fn deferred_total(&self) -> u64 {
		self.deferred_total
	}

	/// Drops every queued item without handing it back. Returns how many were dropped.
	pub fn discard_pending(&mut self) -> usize {
		let dropped = self.idle.len();
		self.idle.clear();
		if dropped > 0 {
			tracing::debug!(dropped, "scheduler.idle_work.discard");
		}
		dropped
	}

	/// Removes and returns every queued item if no task is running.
	///
	/// Returns an empty list while tasks are still in flight.
	pub fn take_idle_work(&mut self) -> Vec<W> {
		if self.idle.is_empty() {
			return Vec::new();
		}

		let running = self.running_task_count();
		if running > 0 {
			tracing::trace!(pending = self.idle.len(), running, "scheduler.idle_work.deferred");
			return Vec::new();
		}

		tracing::debug!(count = self.idle.len(), "scheduler.idle_work.release");
		self.idle.drain(..).collect()
	}
}
