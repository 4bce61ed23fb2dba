//! Reactive effect coordination for a mobile-style app shell.
//!
//! The crate owns the path from an inbound notification to visible changes:
//!
//! - [`AppStore`]: the single serialization point for application state.
//! - [`PredicateWaiter`]: suspends a flow until a predicate over state holds.
//! - [`EffectCoordinator`]: runs [`Effect`] descriptors detached or awaited,
//!   applying presentation guards atomically with the state change.
//! - [`Chain`]: ordered multi-step flows with optional gates.
//! - [`NotificationRouter`]: maps notification ids to effects by set membership.
//! - [`EffectRuntime`]: process-level entry point that survives session restarts.
//!
//! Platform requests go through the [`PlatformBridge`] trait; the crate ships
//! a [`RecordingPlatform`] that only records them.

pub mod chain;
pub mod config;
pub mod coordinator;
pub mod effect;
pub mod error;
pub mod flows;
pub mod platform;
pub mod policy;
pub mod router;
pub mod runtime;
pub mod session;
pub mod store;
pub mod waiter;

pub use chain::{Chain, ChainStep};
pub use config::CoordinatorConfig;
pub use coordinator::EffectCoordinator;
pub use effect::{DispatchOutcome, Effect, EffectEvent, EffectOutcome, EffectPhase};
pub use error::{ConfigError, EffectFailure, FailureReason, PlatformError, WaitError};
pub use platform::{PlatformBridge, PlatformRequest, RecordingPlatform};
pub use policy::{PresentationGuard, should_dismiss, should_present};
pub use router::{NotificationRouter, Route};
pub use runtime::{EffectRuntime, RouteOutcome};
pub use session::Session;
pub use store::{AppStore, Registration, Store, StoreWait};
pub use waiter::{Predicate, PredicateWaiter, Waited};
