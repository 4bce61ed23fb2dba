//! Cooperative suspension until a predicate over state holds.
//!
//! A wait checks the predicate against the current state first and returns
//! without registering anything when it already holds. Otherwise the
//! predicate is registered with the store, which re-evaluates it inside every
//! changing update and wakes the wait at the first change for which it holds.
//! The predicate held at that change; by the time the wait resumes, later
//! writes may have moved the state on.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::WaitError;
use crate::session::Session;
use crate::store::{Registration, Store};

/// Named pure function over a state snapshot.
pub struct Predicate<S> {
	name: &'static str,
	test: Arc<dyn Fn(&S) -> bool + Send + Sync>,
}

impl<S> Predicate<S> {
	pub fn new(name: &'static str, test: impl Fn(&S) -> bool + Send + Sync + 'static) -> Self {
		Self { name, test: Arc::new(test) }
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn holds(&self, state: &S) -> bool {
		(self.test)(state)
	}
}

impl<S> Clone for Predicate<S> {
	fn clone(&self) -> Self {
		Self {
			name: self.name,
			test: Arc::clone(&self.test),
		}
	}
}

impl<S> fmt::Debug for Predicate<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Predicate").field(&self.name).finish()
	}
}

/// How a successful wait completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waited {
	/// The predicate already held; nothing was registered.
	Immediate,
	/// The predicate became true at the change that produced `revision`.
	Resumed { revision: u64 },
}

/// Suspends effects until predicates over one store hold.
pub struct PredicateWaiter<S> {
	store: Store<S>,
	session: Session,
	deadline: Option<Duration>,
}

impl<S> Clone for PredicateWaiter<S> {
	fn clone(&self) -> Self {
		Self {
			store: self.store.clone(),
			session: self.session.clone(),
			deadline: self.deadline,
		}
	}
}

impl<S> PredicateWaiter<S>
where
	S: Clone + PartialEq + Send + Sync + 'static,
{
	/// Creates a waiter bound to `session`. With no `deadline` a wait that
	/// never becomes true stays suspended until the session ends.
	pub fn new(store: Store<S>, session: Session, deadline: Option<Duration>) -> Self {
		Self { store, session, deadline }
	}

	pub fn deadline(&self) -> Option<Duration> {
		self.deadline
	}

	/// Waits until `predicate` holds for the current state or a later change.
	pub async fn wait_until(&self, predicate: &Predicate<S>) -> Result<Waited, WaitError> {
		if self.session.is_ended() {
			return Err(WaitError::Cancelled);
		}
		let mut pending = match self.store.register(predicate) {
			Registration::Holds => {
				tracing::trace!(predicate = predicate.name(), "waiter.immediate");
				return Ok(Waited::Immediate);
			}
			Registration::Pending(pending) => pending,
		};

		tracing::debug!(predicate = predicate.name(), session = self.session.generation(), "waiter.suspend");
		let wait = async { pending.resumed().await.map(|revision| Waited::Resumed { revision }) };
		let result = match self.deadline {
			None => tokio::select! {
				biased;
				_ = self.session.ended() => Err(WaitError::Cancelled),
				res = wait => res,
			},
			Some(deadline) => tokio::select! {
				biased;
				_ = self.session.ended() => Err(WaitError::Cancelled),
				res = tokio::time::timeout(deadline, wait) => res.unwrap_or(Err(WaitError::Timeout { deadline })),
			},
		};

		match &result {
			Ok(waited) => tracing::debug!(predicate = predicate.name(), ?waited, "waiter.resumed"),
			Err(err) => tracing::debug!(predicate = predicate.name(), %err, "waiter.abandoned"),
		}
		result
	}
}
