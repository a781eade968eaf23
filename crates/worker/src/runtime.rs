use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;

use crate::{TaskClass, TaskTracker};

/// The ambient runtime, or a shared fallback when called outside one.
fn runtime_handle() -> Handle {
	if let Ok(handle) = Handle::try_current() {
		return handle;
	}

	static FALLBACK: OnceLock<Runtime> = OnceLock::new();
	FALLBACK
		.get_or_init(|| {
			Builder::new_multi_thread()
				.enable_all()
				.worker_threads(2)
				.thread_name("hexbench-worker")
				.build()
				.expect("failed to build hexbench-worker fallback runtime")
		})
		.handle()
		.clone()
}

/// Spawns tasks that count toward a shared [`TaskTracker`].
///
/// A task counts as running from the moment it is spawned until its future
/// completes, panics or is aborted.
#[derive(Debug, Clone, Default)]
pub struct TaskManager {
	tracker: TaskTracker,
}

impl TaskManager {
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a manager that reports into an existing tracker.
	pub fn with_tracker(tracker: TaskTracker) -> Self {
		Self { tracker }
	}

	pub fn tracker(&self) -> &TaskTracker {
		&self.tracker
	}

	pub fn running_task_count(&self) -> usize {
		self.tracker.running_task_count()
	}

	/// Spawns an async task.
	pub fn spawn<F>(&self, class: TaskClass, name: impl Into<String>, fut: F) -> JoinHandle<F::Output>
	where
		F: Future + Send + 'static,
		F::Output: Send + 'static,
	{
		let guard = self.tracker.enter(class, name);
		tracing::trace!(task = guard.name(), worker_class = class.as_str(), "worker.spawn");
		runtime_handle().spawn(async move {
			let _guard = guard;
			fut.await
		})
	}

	/// Spawns blocking work on the blocking pool.
	///
	/// Non-blocking classes are accepted but counted as-is; pick
	/// [`TaskClass::IoBlocking`] or [`TaskClass::CpuBlocking`] for honest accounting.
	pub fn spawn_blocking<F, R>(&self, class: TaskClass, name: impl Into<String>, f: F) -> JoinHandle<R>
	where
		F: FnOnce() -> R + Send + 'static,
		R: Send + 'static,
	{
		if !class.is_blocking() {
			tracing::debug!(worker_class = class.as_str(), "worker.spawn_blocking.non_blocking_class");
		}
		let guard = self.tracker.enter(class, name);
		tracing::trace!(task = guard.name(), worker_class = class.as_str(), "worker.spawn_blocking");
		runtime_handle().spawn_blocking(move || {
			let _guard = guard;
			f()
		})
	}

	/// Waits until no task is running.
	pub async fn wait_idle(&self) {
		self.tracker.wait_idle().await;
	}
}
