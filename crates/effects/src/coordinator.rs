//! Effect sequencing and the sanctioned path to application state.
//!
//! Effects run either detached (fire-and-forget, on a tracked task) or
//! awaited (the caller suspends until the nested effect finishes). Both
//! forms mutate state only through the store's update path, which serializes
//! all writes. Guarded show/hide decisions are taken inside that same update
//! so no other write can slip between the check and the act.

use std::sync::Arc;

use relay_primitives::{AppState, BoxFuture, SurfaceId};
use tokio::sync::broadcast;
use url::Url;

use crate::config::CoordinatorConfig;
use crate::effect::{DispatchOutcome, Effect, EffectEvent, EffectOutcome, EffectPhase};
use crate::error::{EffectFailure, FailureReason, WaitError};
use crate::flows;
use crate::platform::PlatformBridge;
use crate::policy::{PresentationGuard, should_dismiss};
use crate::session::Session;
use crate::store::AppStore;
use crate::waiter::{Predicate, PredicateWaiter, Waited};

struct CoordinatorInner {
	store: AppStore,
	platform: Arc<dyn PlatformBridge>,
	session: Session,
	waiter: PredicateWaiter<AppState>,
	events: broadcast::Sender<EffectEvent>,
}

/// Dispatches effects for one session over one store.
#[derive(Clone)]
pub struct EffectCoordinator {
	inner: Arc<CoordinatorInner>,
}

impl std::fmt::Debug for EffectCoordinator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EffectCoordinator")
			.field("session", &self.inner.session.generation())
			.field("in_flight", &self.inner.session.in_flight())
			.finish_non_exhaustive()
	}
}

impl EffectCoordinator {
	/// Creates the coordinator for `session`; detached effects run on the
	/// session's runtime.
	pub fn new(store: AppStore, platform: Arc<dyn PlatformBridge>, session: Session, config: &CoordinatorConfig) -> Self {
		let waiter = PredicateWaiter::new(store.clone(), session.clone(), config.wait_deadline());
		let (events, _) = broadcast::channel(config.event_buffer.max(1));
		Self {
			inner: Arc::new(CoordinatorInner {
				store,
				platform,
				session,
				waiter,
				events,
			}),
		}
	}

	pub fn store(&self) -> &AppStore {
		&self.inner.store
	}

	pub fn session(&self) -> &Session {
		&self.inner.session
	}

	pub fn snapshot(&self) -> AppState {
		self.inner.store.snapshot()
	}

	/// Applies a state update. Returns true when the state changed.
	pub fn update(&self, f: impl FnOnce(&mut AppState)) -> bool {
		self.inner.store.update(f)
	}

	/// Suspends until `predicate` holds, the session ends, or the configured
	/// deadline elapses.
	pub async fn wait_until(&self, predicate: &Predicate<AppState>) -> Result<Waited, WaitError> {
		self.inner.waiter.wait_until(predicate).await
	}

	/// Subscribes to effect lifecycle events.
	pub fn subscribe(&self) -> broadcast::Receiver<EffectEvent> {
		self.inner.events.subscribe()
	}

	/// Number of detached effects still running.
	pub fn in_flight(&self) -> usize {
		self.inner.session.in_flight()
	}

	/// Runs `effect` on its own task without waiting for it.
	///
	/// The task runs on the session's runtime, so this may be called from
	/// threads without a runtime context. Failures never reach the caller;
	/// they are logged and published as [`EffectPhase::Failed`] events.
	pub fn dispatch(&self, effect: Effect) -> DispatchOutcome {
		let session = self.inner.session.generation();
		let kind = effect.kind();
		let this = self.clone();
		let spawned = self.inner.session.spawn(async move {
			match this.execute(effect).await {
				Ok(_) => {}
				Err(failure) if failure.is_cancellation() => {
					tracing::debug!(effect = kind, session, %failure, "effect.discarded");
				}
				Err(failure) => {
					tracing::warn!(effect = kind, session, %failure, "effect.failed");
				}
			}
		});
		if spawned {
			tracing::debug!(effect = kind, session, "effect.dispatch");
			DispatchOutcome::Spawned
		} else {
			tracing::debug!(effect = kind, session, "effect.rejected");
			DispatchOutcome::SessionClosed
		}
	}

	/// Runs `effect` to completion and returns its result to the caller.
	pub async fn dispatch_and_await(&self, effect: Effect) -> Result<EffectOutcome, EffectFailure> {
		if self.inner.session.is_ended() {
			return Err(EffectFailure::new(effect.kind(), FailureReason::SessionClosed));
		}
		self.execute(effect).await
	}

	/// Waits for every detached effect in flight.
	///
	/// Effects dispatched while waiting are waited for as well. A detached
	/// effect suspended on a predicate that never holds keeps this pending.
	pub async fn idle(&self) {
		self.inner.session.idle().await;
	}

	/// Ends the session and waits for detached effects to unwind.
	///
	/// Suspended waits are cancelled and their continuations never run.
	pub async fn shutdown(&self) {
		self.inner.session.end().await;
	}

	fn execute(&self, effect: Effect) -> BoxFuture<'_, Result<EffectOutcome, EffectFailure>> {
		Box::pin(async move {
			let kind = effect.kind();
			self.emit(&effect, EffectPhase::Started);
			let result = self.run(&effect).await.map_err(|reason| EffectFailure::new(kind, reason));
			match &result {
				Ok(outcome) => {
					tracing::trace!(effect = kind, ?outcome, "effect.finished");
					self.emit(&effect, EffectPhase::Finished(*outcome));
				}
				Err(failure) => self.emit(&effect, EffectPhase::Failed(failure.clone())),
			}
			result
		})
	}

	async fn run(&self, effect: &Effect) -> Result<EffectOutcome, FailureReason> {
		match effect {
			Effect::SelectTab(tab) => Ok(self.apply(|state| state.select_tab(*tab))),
			Effect::ShowFeature(surface) => Ok(self.apply(|state| state.present(*surface))),
			Effect::PresentOverlay { target, guard } => Ok(self.present_guarded(*target, *guard)),
			Effect::DismissOverlay(target) => Ok(self.dismiss_guarded(*target)),
			Effect::OpenStoreListing => {
				self.inner.platform.open_app_store_listing().await?;
				Ok(EffectOutcome::Applied)
			}
			Effect::OpenUrl(raw) => {
				let url = Url::parse(raw).map_err(|err| FailureReason::MalformedUrl {
					input: raw.clone(),
					message: err.to_string(),
				})?;
				self.inner.platform.open_external_url(&url).await?;
				Ok(EffectOutcome::Applied)
			}
			Effect::OpenSystemSettings => {
				self.inner.platform.open_system_settings().await?;
				Ok(EffectOutcome::Applied)
			}
			Effect::HandleStatusChange(id) => {
				tracing::debug!(notification = %id, "flow.status_change");
				flows::status_change().run(self).await?;
				Ok(EffectOutcome::Applied)
			}
		}
	}

	fn apply(&self, f: impl FnOnce(&mut AppState) -> bool) -> EffectOutcome {
		if self.inner.store.update(|state| {
			f(state);
		}) {
			EffectOutcome::Applied
		} else {
			EffectOutcome::Unchanged
		}
	}

	fn present_guarded(&self, target: SurfaceId, guard: PresentationGuard) -> EffectOutcome {
		let (allowed, _) = self.inner.store.update_with(|state| {
			let allowed = guard.allows(target, state.surfaces());
			if allowed {
				state.present(target);
			}
			allowed
		});
		if allowed {
			EffectOutcome::Applied
		} else {
			tracing::trace!(%target, "effect.guard_suppressed");
			EffectOutcome::GuardSuppressed
		}
	}

	fn dismiss_guarded(&self, target: SurfaceId) -> EffectOutcome {
		let (present, _) = self.inner.store.update_with(|state| {
			let present = should_dismiss(target, state.surfaces());
			if present {
				state.dismiss(target);
			}
			present
		});
		if present {
			EffectOutcome::Applied
		} else {
			tracing::trace!(%target, "effect.guard_suppressed");
			EffectOutcome::GuardSuppressed
		}
	}

	fn emit(&self, effect: &Effect, phase: EffectPhase) {
		// Nobody listening is fine.
		let _ = self.inner.events.send(EffectEvent {
			session: self.inner.session.generation(),
			effect: effect.clone(),
			phase,
		});
	}
}

#[cfg(test)]
mod tests {
	use relay_primitives::Tab;
	use tokio::runtime::Handle;

	use super::*;
	use crate::platform::{PlatformRequest, RecordingPlatform};

	fn coordinator(state: AppState) -> (EffectCoordinator, Arc<RecordingPlatform>) {
		let platform = Arc::new(RecordingPlatform::new());
		let coord = EffectCoordinator::new(AppStore::new(state), platform.clone(), Session::open(1, Handle::current()), &CoordinatorConfig::default());
		(coord, platform)
	}

	fn booted() -> AppState {
		AppState::new(Tab::Home, [SurfaceId::TabBar])
	}

	#[tokio::test]
	async fn state_updates_report_unchanged_on_no_op() {
		let (coord, _) = coordinator(booted());
		assert_eq!(coord.dispatch_and_await(Effect::SelectTab(Tab::Home)).await, Ok(EffectOutcome::Unchanged));
		assert_eq!(coord.store().revision(), 0);
		assert_eq!(coord.dispatch_and_await(Effect::SelectTab(Tab::Activity)).await, Ok(EffectOutcome::Applied));
		assert_eq!(coord.store().revision(), 1);
	}

	#[tokio::test]
	async fn guarded_overlay_is_shown_once_then_suppressed() {
		let (coord, _) = coordinator(booted());
		assert_eq!(coord.dispatch_and_await(Effect::present_sensitive_cover()).await, Ok(EffectOutcome::Applied));
		assert_eq!(coord.dispatch_and_await(Effect::present_sensitive_cover()).await, Ok(EffectOutcome::GuardSuppressed));
		assert_eq!(coord.store().surfaces(), vec![SurfaceId::TabBar, SurfaceId::SensitiveCover]);

		assert_eq!(coord.dispatch_and_await(Effect::DismissOverlay(SurfaceId::SensitiveCover)).await, Ok(EffectOutcome::Applied));
		assert_eq!(coord.dispatch_and_await(Effect::DismissOverlay(SurfaceId::SensitiveCover)).await, Ok(EffectOutcome::GuardSuppressed));
		assert_eq!(coord.store().surfaces(), vec![SurfaceId::TabBar]);
	}

	#[tokio::test]
	async fn overlay_is_not_shown_without_a_host() {
		let (coord, _) = coordinator(AppState::default());
		assert_eq!(coord.dispatch_and_await(Effect::present_sensitive_cover()).await, Ok(EffectOutcome::GuardSuppressed));
		assert_eq!(coord.store().revision(), 0);
	}

	#[tokio::test]
	async fn malformed_url_fails_before_reaching_platform() {
		let (coord, platform) = coordinator(booted());
		let failure = coord.dispatch_and_await(Effect::OpenUrl("not a url".into())).await.expect_err("must fail");
		assert_eq!(failure.effect, "open-url");
		assert!(matches!(failure.reason, FailureReason::MalformedUrl { ref input, .. } if input == "not a url"));
		assert!(platform.requests().is_empty());
	}

	#[tokio::test]
	async fn platform_effects_reach_the_bridge() {
		let (coord, platform) = coordinator(booted());
		coord.dispatch_and_await(Effect::OpenUrl("https://example.com/help".into())).await.expect("url");
		coord.dispatch_and_await(Effect::OpenSystemSettings).await.expect("settings");
		let expected_url = Url::parse("https://example.com/help").expect("url");
		assert_eq!(platform.requests(), vec![PlatformRequest::ExternalUrl(expected_url), PlatformRequest::SystemSettings]);
	}

	#[tokio::test]
	async fn detached_failure_is_published_not_returned() {
		let (coord, platform) = coordinator(booted());
		platform.fail_with("offline");
		let mut events = coord.subscribe();

		assert_eq!(coord.dispatch(Effect::OpenStoreListing), DispatchOutcome::Spawned);
		coord.idle().await;

		assert_eq!(events.recv().await.expect("started").phase, EffectPhase::Started);
		let failed = events.recv().await.expect("failed");
		assert!(matches!(failed.phase, EffectPhase::Failed(ref f) if matches!(f.reason, FailureReason::Platform(_))));
		assert_eq!(coord.in_flight(), 0);
	}

	#[tokio::test]
	async fn shutdown_rejects_further_dispatch() {
		let (coord, platform) = coordinator(booted());
		coord.shutdown().await;
		assert_eq!(coord.dispatch(Effect::OpenStoreListing), DispatchOutcome::SessionClosed);
		let failure = coord.dispatch_and_await(Effect::OpenSystemSettings).await.expect_err("closed");
		assert_eq!(failure.reason, FailureReason::SessionClosed);
		assert!(failure.is_cancellation());
		assert!(platform.requests().is_empty());
	}

	#[tokio::test]
	async fn shutdown_discards_suspended_flow() {
		let (coord, _) = coordinator(AppState::new(Tab::Activity, [SurfaceId::Splash]));
		let mut events = coord.subscribe();
		coord.dispatch(Effect::HandleStatusChange("status-42".into()));
		for _ in 0..8 {
			tokio::task::yield_now().await;
		}
		assert_eq!(coord.store().pending_waits(), 1);

		coord.shutdown().await;
		assert_eq!(coord.store().pending_waits(), 0);
		coord.update(|state| {
			state.replace_surfaces([SurfaceId::TabBar]);
		});

		assert_eq!(coord.store().selected_tab(), Tab::Activity);
		assert_eq!(events.recv().await.expect("started").phase, EffectPhase::Started);
		let failed = events.recv().await.expect("failed");
		assert!(matches!(failed.phase, EffectPhase::Failed(ref f) if f.is_cancellation()));
	}
}
