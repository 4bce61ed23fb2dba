//! Built-in multi-step reactions.

use relay_primitives::{AppState, SurfaceId, Tab};

use crate::chain::Chain;
use crate::effect::Effect;
use crate::waiter::Predicate;

/// Holds once the app has finished booting into its tab bar.
pub fn steady_state() -> Predicate<AppState> {
	Predicate::new("steady-state", |state: &AppState| state.surfaces().contains(SurfaceId::TabBar))
}

/// Reaction to a status-change notification: wait for boot, switch to the
/// home tab, then show suggestions.
pub fn status_change() -> Chain {
	Chain::new("status-change")
		.wait_then(steady_state(), Effect::SelectTab(Tab::Home))
		.then(Effect::ShowFeature(SurfaceId::Suggestions))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn steady_state_requires_tab_bar() {
		let pred = steady_state();
		assert!(!pred.holds(&AppState::default()));
		assert!(pred.holds(&AppState::new(Tab::Home, [SurfaceId::Onboarding, SurfaceId::TabBar])));
	}

	#[test]
	fn status_change_gates_only_the_first_step() {
		let chain = status_change();
		let steps = chain.steps();
		assert_eq!(steps.len(), 2);
		assert_eq!(steps[0].gate.as_ref().map(Predicate::name), Some("steady-state"));
		assert_eq!(steps[0].effect, Effect::SelectTab(Tab::Home));
		assert!(steps[1].gate.is_none());
		assert_eq!(steps[1].effect, Effect::ShowFeature(SurfaceId::Suggestions));
	}
}
