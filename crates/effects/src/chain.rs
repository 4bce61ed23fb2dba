//! Ordered multi-step flows.
//!
//! A chain is a finite list of steps, each an optional gate predicate
//! followed by an effect. Steps run strictly in order: the gate is awaited,
//! then the effect is dispatched and awaited, and only then does the next
//! step start. The first failure aborts the rest; nothing is retried.

use relay_primitives::AppState;

use crate::coordinator::EffectCoordinator;
use crate::effect::Effect;
use crate::error::{EffectFailure, FailureReason};
use crate::waiter::Predicate;

#[derive(Debug, Clone)]
pub struct ChainStep {
	pub gate: Option<Predicate<AppState>>,
	pub effect: Effect,
}

#[derive(Debug, Clone)]
pub struct Chain {
	name: &'static str,
	steps: Vec<ChainStep>,
}

impl Chain {
	pub fn new(name: &'static str) -> Self {
		Self { name, steps: Vec::new() }
	}

	/// Appends an ungated step.
	#[must_use]
	pub fn then(mut self, effect: Effect) -> Self {
		self.steps.push(ChainStep { gate: None, effect });
		self
	}

	/// Appends a step that first waits for `gate`.
	#[must_use]
	pub fn wait_then(mut self, gate: Predicate<AppState>, effect: Effect) -> Self {
		self.steps.push(ChainStep { gate: Some(gate), effect });
		self
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn steps(&self) -> &[ChainStep] {
		&self.steps
	}

	/// Runs every step in order, returning how many completed.
	pub async fn run(&self, coordinator: &EffectCoordinator) -> Result<usize, FailureReason> {
		for (index, step) in self.steps.iter().enumerate() {
			if let Some(gate) = &step.gate
				&& let Err(err) = coordinator.wait_until(gate).await
			{
				return Err(self.abort(index, EffectFailure::new(step.effect.kind(), err)));
			}
			if let Err(failure) = coordinator.dispatch_and_await(step.effect.clone()).await {
				return Err(self.abort(index, failure));
			}
			tracing::trace!(chain = self.name, step = index, effect = step.effect.kind(), "chain.step");
		}
		tracing::debug!(chain = self.name, steps = self.steps.len(), "chain.complete");
		Ok(self.steps.len())
	}

	fn abort(&self, step: usize, source: EffectFailure) -> FailureReason {
		tracing::debug!(chain = self.name, step, remaining = self.steps.len() - step - 1, %source, "chain.aborted");
		FailureReason::Step {
			step,
			source: Box::new(source),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use relay_primitives::{SurfaceId, Tab};
	use tokio::runtime::Handle;

	use super::*;
	use crate::config::CoordinatorConfig;
	use crate::effect::{EffectOutcome, EffectPhase};
	use crate::platform::RecordingPlatform;
	use crate::session::Session;
	use crate::store::AppStore;

	fn coordinator(state: AppState) -> (EffectCoordinator, Arc<RecordingPlatform>) {
		let platform = Arc::new(RecordingPlatform::new());
		let coord = EffectCoordinator::new(AppStore::new(state), platform.clone(), Session::open(1, Handle::current()), &CoordinatorConfig::default());
		(coord, platform)
	}

	#[tokio::test]
	async fn steps_complete_in_declaration_order() {
		let (coord, _) = coordinator(AppState::new(Tab::Activity, [SurfaceId::TabBar]));
		let mut events = coord.subscribe();
		let chain = Chain::new("ordered")
			.then(Effect::SelectTab(Tab::Settings))
			.then(Effect::ShowFeature(SurfaceId::Suggestions))
			.then(Effect::SelectTab(Tab::Home));

		assert_eq!(chain.run(&coord).await, Ok(3));

		let mut finished = Vec::new();
		while let Ok(event) = events.try_recv() {
			if let EffectPhase::Finished(EffectOutcome::Applied) = event.phase {
				finished.push(event.effect);
			}
		}
		assert_eq!(finished, chain.steps().iter().map(|s| s.effect.clone()).collect::<Vec<_>>());
	}

	#[tokio::test]
	async fn failure_aborts_remaining_steps() {
		let (coord, platform) = coordinator(AppState::new(Tab::Activity, [SurfaceId::TabBar]));
		platform.fail_with("denied");
		let chain = Chain::new("aborting")
			.then(Effect::SelectTab(Tab::Settings))
			.then(Effect::OpenStoreListing)
			.then(Effect::SelectTab(Tab::Home));

		let err = chain.run(&coord).await.expect_err("second step fails");
		let (step, source) = match err {
			FailureReason::Step { step, source } => (step, source),
			other => panic!("expected step failure, got {other:?}"),
		};
		assert_eq!(step, 1);
		assert_eq!(source.effect, "open-store-listing");
		// The third step never ran.
		assert_eq!(coord.store().selected_tab(), Tab::Settings);
	}

	#[tokio::test]
	async fn satisfied_gate_does_not_suspend() {
		let (coord, _) = coordinator(AppState::new(Tab::Activity, [SurfaceId::TabBar]));
		let ready = Predicate::new("has-tab-bar", |s: &AppState| s.surfaces().contains(SurfaceId::TabBar));
		let chain = Chain::new("gated").wait_then(ready, Effect::SelectTab(Tab::Home));
		assert_eq!(chain.run(&coord).await, Ok(1));
		assert_eq!(coord.store().pending_waits(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn gate_timeout_aborts_before_dispatch() {
		let platform = Arc::new(RecordingPlatform::new());
		let config = CoordinatorConfig::default().with_wait_deadline(std::time::Duration::from_secs(5));
		let coord = EffectCoordinator::new(AppStore::new(AppState::default()), platform, Session::open(1, Handle::current()), &config);
		let never = Predicate::new("never", |_: &AppState| false);
		let chain = Chain::new("stuck").wait_then(never, Effect::SelectTab(Tab::Settings));

		let err = chain.run(&coord).await.expect_err("times out");
		assert!(matches!(err, FailureReason::Step { step: 0, ref source } if matches!(source.reason, FailureReason::Wait(crate::error::WaitError::Timeout { .. }))));
		assert_eq!(coord.store().selected_tab(), Tab::Home);
	}
}
