//! Owned application state store.
//!
//! The store is the single serialization point for state mutation: every
//! update runs under the state's write lock, so updates are totally ordered
//! no matter how many effects are in flight. A change is published only when
//! the update actually altered the state.
//!
//! Registered waits are evaluated inside that same write, against the state
//! the update produced. A wait whose predicate holds at any single change is
//! woken, even when later writes land before its task is polled again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use relay_primitives::{AppState, SurfaceId, Tab};
use tokio::sync::{oneshot, watch};

use crate::error::WaitError;
use crate::waiter::Predicate;

struct PendingWait<S> {
	id: u64,
	predicate: Predicate<S>,
	wake: oneshot::Sender<u64>,
}

struct StoreInner<S> {
	state: RwLock<S>,
	changes: watch::Sender<u64>,
	revision: AtomicU64,
	waits: Mutex<Vec<PendingWait<S>>>,
	next_wait: AtomicU64,
}

/// Cloneable handle to one state store instance.
pub struct Store<S> {
	inner: Arc<StoreInner<S>>,
}

/// Store over the application state.
pub type AppStore = Store<AppState>;

/// Result of registering a predicate with [`Store::register`].
pub enum Registration<S> {
	/// The predicate holds for the current state; nothing was registered.
	Holds,
	/// The predicate is false; the wait resolves at the first change for
	/// which it holds.
	Pending(StoreWait<S>),
}

/// A predicate registered with a store, resolved from inside the update that
/// first satisfies it.
///
/// Dropping it withdraws the registration.
pub struct StoreWait<S> {
	id: u64,
	rx: oneshot::Receiver<u64>,
	store: Weak<StoreInner<S>>,
}

impl<S> StoreWait<S> {
	/// Resolves with the revision of the change that satisfied the predicate.
	pub async fn resumed(&mut self) -> Result<u64, WaitError> {
		(&mut self.rx).await.map_err(|_| WaitError::StoreClosed)
	}
}

impl<S> Drop for StoreWait<S> {
	fn drop(&mut self) {
		if let Some(inner) = self.store.upgrade() {
			inner.waits.lock().retain(|wait| wait.id != self.id);
		}
	}
}

impl<S> Clone for Store<S> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<S> std::fmt::Debug for Store<S> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Store")
			.field("revision", &self.revision())
			.field("subscribers", &self.subscriber_count())
			.finish_non_exhaustive()
	}
}

impl<S> Store<S> {
	/// Subscribes to change notifications; the value is the latest revision.
	pub fn subscribe(&self) -> watch::Receiver<u64> {
		self.inner.changes.subscribe()
	}

	/// Number of change notifications published so far.
	pub fn revision(&self) -> u64 {
		self.inner.revision.load(Ordering::Acquire)
	}

	/// Number of predicate waits registered and not yet resolved.
	pub fn pending_waits(&self) -> usize {
		self.inner.waits.lock().len()
	}

	/// Number of live registrations: change receivers plus pending waits.
	pub fn subscriber_count(&self) -> usize {
		self.inner.changes.receiver_count() + self.pending_waits()
	}
}

impl<S> Store<S>
where
	S: Clone + PartialEq + Send + Sync + 'static,
{
	pub fn new(initial: S) -> Self {
		let (changes, _) = watch::channel(0);
		Self {
			inner: Arc::new(StoreInner {
				state: RwLock::new(initial),
				changes,
				revision: AtomicU64::new(0),
				waits: Mutex::new(Vec::new()),
				next_wait: AtomicU64::new(0),
			}),
		}
	}

	/// Reads the current state without cloning it.
	///
	/// The lock is released before this returns; never call back into the
	/// store from `f`.
	pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
		let state = self.inner.state.read();
		f(&*state)
	}

	/// Returns an owned copy of the current state.
	pub fn snapshot(&self) -> S {
		self.inner.state.read().clone()
	}

	/// Atomically transforms the state. Returns true when it changed.
	pub fn update(&self, f: impl FnOnce(&mut S)) -> bool {
		self.update_with(f).1
	}

	/// Atomically transforms the state, returning the closure's result and
	/// whether the state changed.
	///
	/// Decisions made inside `f` are evaluated against exactly the state they
	/// act on. On change, pending waits are checked against the new state
	/// before any other write can run.
	pub fn update_with<R>(&self, f: impl FnOnce(&mut S) -> R) -> (R, bool) {
		let mut state = self.inner.state.write();
		let before = state.clone();
		let out = f(&mut *state);
		if *state == before {
			return (out, false);
		}

		let revision = self.inner.revision.fetch_add(1, Ordering::AcqRel) + 1;
		let woken = self.wake_satisfied(&state, revision);
		self.inner.changes.send_replace(revision);
		drop(state);
		tracing::trace!(revision, woken, subscribers = self.subscriber_count(), "store.changed");
		(out, true)
	}

	/// Registers `predicate`, or reports that it already holds.
	///
	/// The check and the registration happen under one read lock, so no
	/// change can fall between them.
	pub fn register(&self, predicate: &Predicate<S>) -> Registration<S> {
		let state = self.inner.state.read();
		if predicate.holds(&state) {
			return Registration::Holds;
		}
		let (wake, rx) = oneshot::channel();
		let id = self.inner.next_wait.fetch_add(1, Ordering::Relaxed);
		self.inner.waits.lock().push(PendingWait {
			id,
			predicate: predicate.clone(),
			wake,
		});
		drop(state);
		Registration::Pending(StoreWait {
			id,
			rx,
			store: Arc::downgrade(&self.inner),
		})
	}

	fn wake_satisfied(&self, state: &S, revision: u64) -> usize {
		let mut waits = self.inner.waits.lock();
		if waits.is_empty() {
			return 0;
		}
		let mut woken = 0;
		for wait in std::mem::take(&mut *waits) {
			if wait.wake.is_closed() {
				continue;
			}
			if wait.predicate.holds(state) {
				if wait.wake.send(revision).is_ok() {
					woken += 1;
				}
			} else {
				waits.push(wait);
			}
		}
		woken
	}
}

impl Store<AppState> {
	/// Owned copy of the active surfaces at call time.
	pub fn surfaces(&self) -> Vec<SurfaceId> {
		self.read(|state| state.active_surfaces.clone())
	}

	pub fn selected_tab(&self) -> Tab {
		self.read(|state| state.selected_tab)
	}
}
