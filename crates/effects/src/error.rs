//! Error types for effect execution.
//!
//! Guard suppression and unmatched notifications are outcomes, not errors,
//! and have no representation here.

use std::time::Duration;

use thiserror::Error;

/// Why a predicate wait ended without the predicate holding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaitError {
	/// The owning session ended; the waiter's continuation never runs.
	#[error("wait cancelled by session teardown")]
	Cancelled,
	/// A configured deadline elapsed first.
	#[error("predicate still false after {deadline:?}")]
	Timeout { deadline: Duration },
	/// The store's write side was dropped.
	#[error("state store closed")]
	StoreClosed,
}

/// Failure reported by a [`crate::PlatformBridge`] request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{request} failed: {message}")]
pub struct PlatformError {
	pub request: &'static str,
	pub message: String,
}

impl PlatformError {
	pub fn new(request: &'static str, message: impl Into<String>) -> Self {
		Self {
			request,
			message: message.into(),
		}
	}
}

/// Cause carried by an [`EffectFailure`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
	#[error("malformed url `{input}`: {message}")]
	MalformedUrl { input: String, message: String },
	#[error(transparent)]
	Platform(#[from] PlatformError),
	#[error(transparent)]
	Wait(#[from] WaitError),
	/// Dispatch was attempted after the session ended.
	#[error("session closed")]
	SessionClosed,
	/// A step of an ordered chain failed; later steps were not run.
	#[error("step {step} failed: {source}")]
	Step { step: usize, source: Box<EffectFailure> },
}

/// A dispatched effect could not complete its contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("effect `{effect}` failed: {reason}")]
pub struct EffectFailure {
	pub effect: &'static str,
	pub reason: FailureReason,
}

impl EffectFailure {
	pub fn new(effect: &'static str, reason: impl Into<FailureReason>) -> Self {
		Self {
			effect,
			reason: reason.into(),
		}
	}

	/// True when the failure only reflects session teardown.
	///
	/// Such failures are expected during shutdown and are logged below
	/// warning level.
	pub fn is_cancellation(&self) -> bool {
		match &self.reason {
			FailureReason::Wait(WaitError::Cancelled) | FailureReason::SessionClosed => true,
			FailureReason::Step { source, .. } => source.is_cancellation(),
			_ => false,
		}
	}
}

/// Errors raised while loading runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("invalid coordinator config: {0}")]
	Toml(#[from] toml::de::Error),
	#[error("event_buffer must be > 0")]
	ZeroEventBuffer,
}
