use relay_primitives::{NotificationId, SurfaceId, Tab};

use crate::error::EffectFailure;
use crate::policy::PresentationGuard;

/// One unit of reactive work, described as data.
///
/// Descriptors carry everything their execution needs and own no resources;
/// each dispatch executes a descriptor at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
	/// Switch the tab bar to `Tab`. A no-op when already selected.
	SelectTab(Tab),
	/// Present a feature surface on top of the active stack.
	ShowFeature(SurfaceId),
	/// Present `target` if `guard` allows it over the active stack.
	PresentOverlay { target: SurfaceId, guard: PresentationGuard },
	/// Hide `target` if it is active.
	DismissOverlay(SurfaceId),
	OpenStoreListing,
	OpenUrl(String),
	OpenSystemSettings,
	/// React to a status-change notification with the ordered status flow.
	HandleStatusChange(NotificationId),
}

impl Effect {
	/// Stable kind label used in logs and failures.
	pub const fn kind(&self) -> &'static str {
		match self {
			Self::SelectTab(_) => "select-tab",
			Self::ShowFeature(_) => "show-feature",
			Self::PresentOverlay { .. } => "present-overlay",
			Self::DismissOverlay(_) => "dismiss-overlay",
			Self::OpenStoreListing => "open-store-listing",
			Self::OpenUrl(_) => "open-url",
			Self::OpenSystemSettings => "open-system-settings",
			Self::HandleStatusChange(_) => "handle-status-change",
		}
	}

	/// Guarded presentation of the sensitive-data cover.
	pub const fn present_sensitive_cover() -> Self {
		Self::PresentOverlay {
			target: SurfaceId::SensitiveCover,
			guard: PresentationGuard::SENSITIVE_COVER,
		}
	}

	/// True for effects that only transform application state.
	pub const fn is_state_update(&self) -> bool {
		matches!(self, Self::SelectTab(_) | Self::ShowFeature(_) | Self::PresentOverlay { .. } | Self::DismissOverlay(_))
	}
}

/// Successful completion of an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectOutcome {
	/// The effect did its work.
	Applied,
	/// A state update found nothing to change; no notification was sent.
	Unchanged,
	/// The presentation guard said no; the show/hide was skipped.
	GuardSuppressed,
}

/// Result of a fire-and-forget dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
	Spawned,
	/// The session already ended; nothing was scheduled.
	SessionClosed,
}

/// Lifecycle phase reported on the coordinator's event channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectPhase {
	Started,
	Finished(EffectOutcome),
	Failed(EffectFailure),
}

/// One effect lifecycle transition, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectEvent {
	pub session: u64,
	pub effect: Effect,
	pub phase: EffectPhase,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn kinds_are_distinct() {
		let effects = [
			Effect::SelectTab(Tab::Home),
			Effect::ShowFeature(SurfaceId::Suggestions),
			Effect::present_sensitive_cover(),
			Effect::DismissOverlay(SurfaceId::SensitiveCover),
			Effect::OpenStoreListing,
			Effect::OpenUrl("https://example.com".into()),
			Effect::OpenSystemSettings,
			Effect::HandleStatusChange("status-42".into()),
		];
		let mut kinds: Vec<_> = effects.iter().map(Effect::kind).collect();
		kinds.sort_unstable();
		kinds.dedup();
		assert_eq!(kinds.len(), effects.len());
	}

	#[test]
	fn state_updates_are_classified() {
		assert!(Effect::SelectTab(Tab::Activity).is_state_update());
		assert!(Effect::present_sensitive_cover().is_state_update());
		assert!(!Effect::OpenStoreListing.is_state_update());
		assert!(!Effect::HandleStatusChange("status-42".into()).is_state_update());
	}
}
