//! Presenter/blocker guards for overlay surfaces.
//!
//! Both checks are pure functions of one active-surface snapshot. The
//! coordinator evaluates them inside the store's update closure so that the
//! decision and the resulting show/hide apply to the same state.

use relay_primitives::{SurfaceId, SurfaceSet, SurfaceStack};

use crate::config;

/// Whether `target` may be shown over `active`.
///
/// True iff some active surface is a presenter and no active surface is a
/// blocker. Guards usually list `target` among their own blockers, which
/// rules out double presentation.
pub fn should_present(target: SurfaceId, presenters: SurfaceSet, blockers: SurfaceSet, active: SurfaceStack<'_>) -> bool {
	let hosted = active.any_in(presenters);
	let blocked = active.any_in(blockers);
	tracing::trace!(%target, hosted, blocked, "policy.present");
	hosted && !blocked
}

/// Whether `target` needs hiding: only a surface that is active can be.
pub fn should_dismiss(target: SurfaceId, active: SurfaceStack<'_>) -> bool {
	active.contains(target)
}

/// Presenter and blocker sets guarding one overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PresentationGuard {
	pub presenters: SurfaceSet,
	pub blockers: SurfaceSet,
}

impl PresentationGuard {
	/// Guard for the sensitive-data cover.
	pub const SENSITIVE_COVER: Self = Self {
		presenters: config::OVERLAY_PRESENTERS,
		blockers: config::OVERLAY_BLOCKERS,
	};

	pub const fn new(presenters: SurfaceSet, blockers: SurfaceSet) -> Self {
		Self { presenters, blockers }
	}

	pub fn allows(&self, target: SurfaceId, active: SurfaceStack<'_>) -> bool {
		should_present(target, self.presenters, self.blockers, active)
	}
}
