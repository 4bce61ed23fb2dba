use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::runtime::Handle;

use crate::config::CoordinatorConfig;
use crate::coordinator::EffectCoordinator;
use crate::effect::{DispatchOutcome, Effect};
use crate::platform::PlatformBridge;
use crate::router::NotificationRouter;
use crate::session::Session;
use crate::store::AppStore;

/// What became of one notification response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
	/// The id is in no configured set; nothing happened.
	NoMatch,
	/// Matched effects, each dispatched on its own.
	Dispatched { accepted: Vec<Effect>, rejected: usize },
}

/// Process-level entry point wiring store, router, platform and sessions.
///
/// The store outlives sessions. Each session gets its own coordinator, so
/// ending a session discards exactly the waits and detached effects that
/// belonged to it. Detached effects run on the runtime handed to
/// [`EffectRuntime::new`], so notifications may arrive on any thread.
pub struct EffectRuntime {
	store: AppStore,
	router: NotificationRouter,
	platform: Arc<dyn PlatformBridge>,
	config: CoordinatorConfig,
	current: ArcSwap<EffectCoordinator>,
}

impl EffectRuntime {
	/// Creates a runtime over `store` with the built-in routing table and
	/// starts session 1 on `runtime`.
	pub fn new(store: AppStore, platform: Arc<dyn PlatformBridge>, config: CoordinatorConfig, runtime: Handle) -> Self {
		let first = EffectCoordinator::new(store.clone(), Arc::clone(&platform), Session::open(1, runtime), &config);
		Self {
			store,
			router: NotificationRouter::default(),
			platform,
			config,
			current: ArcSwap::from_pointee(first),
		}
	}

	#[must_use]
	pub fn with_router(mut self, router: NotificationRouter) -> Self {
		self.router = router;
		self
	}

	pub fn store(&self) -> &AppStore {
		&self.store
	}

	pub fn router(&self) -> &NotificationRouter {
		&self.router
	}

	pub fn config(&self) -> &CoordinatorConfig {
		&self.config
	}

	/// Coordinator of the current session.
	pub fn coordinator(&self) -> Arc<EffectCoordinator> {
		self.current.load_full()
	}

	/// Entry point for a user interacting with a delivered notification.
	///
	/// Every matched effect is dispatched independently; no ordering holds
	/// between them.
	pub fn handle_notification_response(&self, notification_id: &str) -> RouteOutcome {
		let effects = self.router.route(notification_id);
		if effects.is_empty() {
			return RouteOutcome::NoMatch;
		}

		let coordinator = self.current.load();
		let mut accepted = Vec::with_capacity(effects.len());
		let mut rejected = 0;
		for effect in effects {
			match coordinator.dispatch(effect.clone()) {
				DispatchOutcome::Spawned => accepted.push(effect),
				DispatchOutcome::SessionClosed => rejected += 1,
			}
		}
		tracing::debug!(notification = notification_id, accepted = accepted.len(), rejected, "runtime.notification");
		RouteOutcome::Dispatched { accepted, rejected }
	}

	/// Ends the current session and starts the next one over the same store.
	///
	/// Returns the new session's generation once the old session's detached
	/// effects have unwound.
	pub async fn restart_session(&self) -> u64 {
		let previous = self.current.rcu(|current| {
			Arc::new(EffectCoordinator::new(self.store.clone(), Arc::clone(&self.platform), current.session().successor(), &self.config))
		});
		let generation = previous.session().generation() + 1;
		tracing::info!(previous = previous.session().generation(), generation, "runtime.session_restart");
		previous.shutdown().await;
		generation
	}

	/// Waits for the current session's detached effects.
	pub async fn settle(&self) {
		self.coordinator().idle().await;
	}

	/// Ends the current session for good.
	pub async fn shutdown(&self) {
		self.coordinator().shutdown().await;
	}
}
