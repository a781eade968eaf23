use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::sync::Notify;

use crate::TaskClass;

/// Shared running-task counter.
///
/// Each running task holds a [`TaskGuard`]; the count drops when the guard
/// does, including when the task panics or is aborted.
#[derive(Debug, Clone)]
pub struct TaskTracker {
	/// Count of tasks currently in flight.
	running: Arc<AtomicUsize>,
	/// Running count per [`TaskClass`], indexed by `TaskClass::slot`.
	by_class: Arc<[AtomicUsize; 4]>,
	/// Woken whenever the running count returns to zero.
	idle_notify: Arc<Notify>,
	/// Total tasks ever entered.
	started_total: Arc<AtomicU64>,
}

impl Default for TaskTracker {
	fn default() -> Self {
		Self {
			running: Arc::new(AtomicUsize::new(0)),
			by_class: Arc::new(Default::default()),
			idle_notify: Arc::new(Notify::new()),
			started_total: Arc::new(AtomicU64::new(0)),
		}
	}
}

impl TaskTracker {
	pub fn new() -> Self {
		Self::default()
	}

	/// Marks one task as running until the returned guard is dropped.
	pub fn enter(&self, class: TaskClass, name: impl Into<String>) -> TaskGuard {
		self.by_class[class.slot()].fetch_add(1, Ordering::SeqCst);
		let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
		self.started_total.fetch_add(1, Ordering::Relaxed);
		let name = name.into();
		tracing::trace!(task = %name, worker_class = class.as_str(), running, "task.enter");
		TaskGuard {
			name,
			class,
			running: self.running.clone(),
			by_class: self.by_class.clone(),
			idle_notify: self.idle_notify.clone(),
		}
	}

	/// Number of tasks currently holding a guard.
	pub fn running_task_count(&self) -> usize {
		self.running.load(Ordering::SeqCst)
	}

	/// Number of running tasks of one class.
	pub fn running_in(&self, class: TaskClass) -> usize {
		self.by_class[class.slot()].load(Ordering::SeqCst)
	}

	/// Classes with at least one running task, with their counts.
	pub fn busy_classes(&self) -> Vec<(TaskClass, usize)> {
		TaskClass::ALL
			.into_iter()
			.map(|class| (class, self.running_in(class)))
			.filter(|(_, n)| *n > 0)
			.collect()
	}

	pub fn is_idle(&self) -> bool {
		self.running_task_count() == 0
	}

	/// Total tasks entered since creation.
	pub fn started_total(&self) -> u64 {
		self.started_total.load(Ordering::Relaxed)
	}

	/// Waits until no task is running.
	///
	/// Returns immediately when already idle. There is no timeout: a task
	/// that never finishes keeps this pending forever.
	pub async fn wait_idle(&self) {
		loop {
			// Register interest before checking to avoid a lost wakeup.
			let notified = self.idle_notify.notified();
			if self.is_idle() {
				return;
			}
			notified.await;
		}
	}
}

/// Guard tracking one in-flight task.
#[must_use = "the task counts as running only while the guard is alive"]
pub struct TaskGuard {
	name: String,
	class: TaskClass,
	running: Arc<AtomicUsize>,
	by_class: Arc<[AtomicUsize; 4]>,
	idle_notify: Arc<Notify>,
}

impl TaskGuard {
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn class(&self) -> TaskClass {
		self.class
	}
}

impl std::fmt::Debug for TaskGuard {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TaskGuard")
			.field("name", &self.name)
			.field("class", &self.class)
			.finish()
	}
}

impl Drop for TaskGuard {
	fn drop(&mut self) {
		self.by_class[self.class.slot()].fetch_sub(1, Ordering::SeqCst);
		let prev = self.running.fetch_sub(1, Ordering::SeqCst);
		debug_assert!(prev > 0, "running task count underflow");
		tracing::trace!(task = %self.name, running = prev - 1, "task.exit");
		if prev == 1 {
			self.idle_notify.notify_waiters();
		}
	}
}
