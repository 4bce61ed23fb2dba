//! Lifetime of one effect session.
//!
//! A session owns the detached effects started under it and the runtime they
//! run on. Ending it cancels every wait registered under it, refuses new
//! work, and waits for what was already running to unwind. Successive
//! sessions over one store carry increasing generations.

use std::future::Future;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// One session generation and the work it owns.
#[derive(Debug, Clone)]
pub struct Session {
	generation: u64,
	cancel: CancellationToken,
	tasks: TaskTracker,
	runtime: Handle,
}

impl Session {
	/// Opens session `generation`; detached effects run on `runtime`.
	///
	/// Spawning goes through the handle, so work can be started from threads
	/// that have no runtime context of their own.
	pub fn open(generation: u64, runtime: Handle) -> Self {
		tracing::debug!(generation, "session.open");
		Self {
			generation,
			cancel: CancellationToken::new(),
			tasks: TaskTracker::new(),
			runtime,
		}
	}

	/// Opens the session that follows this one on the same runtime.
	pub fn successor(&self) -> Self {
		Self::open(self.generation + 1, self.runtime.clone())
	}

	/// Generation number of this session.
	pub const fn generation(&self) -> u64 {
		self.generation
	}

	/// Whether [`Session::end`] has been called.
	pub fn is_ended(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Resolves once the session has been ended.
	pub async fn ended(&self) {
		self.cancel.cancelled().await;
	}

	/// Number of detached effects still running.
	pub fn in_flight(&self) -> usize {
		self.tasks.len()
	}

	/// Runs `task` detached under this session.
	///
	/// Returns false without running anything once the session has ended.
	pub fn spawn<F>(&self, task: F) -> bool
	where
		F: Future<Output = ()> + Send + 'static,
	{
		if self.is_ended() {
			return false;
		}
		self.tasks.spawn_on(task, &self.runtime);
		true
	}

	/// Waits for every detached effect, including ones spawned meanwhile.
	pub async fn idle(&self) {
		self.tasks.close();
		self.tasks.wait().await;
		self.tasks.reopen();
	}

	/// Cancels pending waits, refuses new work and waits for running work.
	pub async fn end(&self) {
		tracing::debug!(generation = self.generation, in_flight = self.in_flight(), "session.end");
		self.cancel.cancel();
		self.tasks.close();
		self.tasks.wait().await;
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::sync::atomic::{AtomicUsize, Ordering};

	use super::*;

	#[tokio::test]
	async fn successor_advances_generation_on_same_runtime() {
		let first = Session::open(1, Handle::current());
		let second = first.successor();
		assert_eq!(second.generation(), 2);
		assert_eq!(second.successor().generation(), 3);
		assert!(!second.is_ended());
	}

	#[tokio::test]
	async fn ended_session_refuses_work() {
		let session = Session::open(1, Handle::current());
		let ran = Arc::new(AtomicUsize::new(0));
		session.end().await;

		let counter = Arc::clone(&ran);
		assert!(!session.spawn(async move {
			counter.fetch_add(1, Ordering::SeqCst);
		}));
		session.idle().await;
		assert_eq!(ran.load(Ordering::SeqCst), 0);
		assert!(session.is_ended());
	}

	#[tokio::test]
	async fn end_cancels_waiters_then_drains_tasks() {
		let session = Session::open(4, Handle::current());
		let observed = Arc::new(AtomicUsize::new(0));
		for _ in 0..3 {
			let scope = session.clone();
			let observed = Arc::clone(&observed);
			assert!(session.spawn(async move {
				scope.ended().await;
				observed.fetch_add(1, Ordering::SeqCst);
			}));
		}
		assert_eq!(session.in_flight(), 3);

		session.end().await;
		assert_eq!(observed.load(Ordering::SeqCst), 3);
		assert_eq!(session.in_flight(), 0);
	}

	#[test]
	fn spawns_from_threads_without_runtime_context() {
		let runtime = tokio::runtime::Builder::new_multi_thread().worker_threads(1).enable_all().build().expect("runtime");
		let session = Session::open(1, runtime.handle().clone());
		let ran = Arc::new(AtomicUsize::new(0));

		let counter = Arc::clone(&ran);
		assert!(session.spawn(async move {
			counter.fetch_add(1, Ordering::SeqCst);
		}));
		runtime.block_on(session.idle());
		assert_eq!(ran.load(Ordering::SeqCst), 1);
	}
}
