//! Routing and guard tables fixed at build time, plus runtime tunables.
//!
//! The notification id sets and presentation guard sets are compile-time
//! data. Only coordinator tunables are read at startup.

use std::time::Duration;

use relay_primitives::{SurfaceId, SurfaceSet};
use serde::Deserialize;

use crate::error::ConfigError;

/// Notification ids that ask the user to update the app.
pub const UPDATE_REQUIRED_IDS: &[&str] = &["force-update-1", "force-update-2", "force-update-legacy"];

/// Notification ids announcing a change in account status.
pub const STATUS_CHANGE_IDS: &[&str] = &["status-42", "status-43", "status-verified", "status-suspended"];

/// Surfaces that can host an overlay.
pub const OVERLAY_PRESENTERS: SurfaceSet = SurfaceSet::of(&[SurfaceId::TabBar, SurfaceId::Onboarding]);

/// Surfaces that rule out showing another overlay.
pub const OVERLAY_BLOCKERS: SurfaceSet = SurfaceSet::of(&[SurfaceId::SensitiveCover, SurfaceId::PermissionOverlay]);

const DEFAULT_EVENT_BUFFER: usize = 64;

/// Runtime tunables for an effect coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatorConfig {
	/// Upper bound on any predicate wait, in milliseconds. Unset means waits
	/// last until the predicate holds or the session ends.
	pub wait_deadline_ms: Option<u64>,
	/// Capacity of the effect event broadcast channel.
	pub event_buffer: usize,
}

impl Default for CoordinatorConfig {
	fn default() -> Self {
		Self {
			wait_deadline_ms: None,
			event_buffer: DEFAULT_EVENT_BUFFER,
		}
	}
}

impl CoordinatorConfig {
	/// Parses a TOML document, filling omitted keys with defaults.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		if config.event_buffer == 0 {
			return Err(ConfigError::ZeroEventBuffer);
		}
		Ok(config)
	}

	pub fn wait_deadline(&self) -> Option<Duration> {
		self.wait_deadline_ms.map(Duration::from_millis)
	}

	#[must_use]
	pub fn with_wait_deadline(mut self, deadline: Duration) -> Self {
		self.wait_deadline_ms = Some(u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX));
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_document_yields_defaults() {
		let config = CoordinatorConfig::from_toml_str("").expect("empty config");
		assert_eq!(config, CoordinatorConfig::default());
		assert_eq!(config.wait_deadline(), None);
	}

	#[test]
	fn deadline_is_read_in_milliseconds() {
		let config = CoordinatorConfig::from_toml_str("wait_deadline_ms = 1500\nevent_buffer = 8\n").expect("config");
		assert_eq!(config.wait_deadline(), Some(Duration::from_millis(1500)));
		assert_eq!(config.event_buffer, 8);
	}

	#[test]
	fn rejects_unknown_keys_and_zero_buffer() {
		assert!(matches!(CoordinatorConfig::from_toml_str("timeout = 3"), Err(ConfigError::Toml(_))));
		assert!(matches!(CoordinatorConfig::from_toml_str("event_buffer = 0"), Err(ConfigError::ZeroEventBuffer)));
	}

	#[test]
	fn id_sets_are_disjoint() {
		assert!(UPDATE_REQUIRED_IDS.iter().all(|id| !STATUS_CHANGE_IDS.contains(id)));
	}
}
