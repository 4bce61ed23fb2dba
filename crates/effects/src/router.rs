//! Classification of inbound notification ids by set membership.
//!
//! Routing rules are data: each route pairs a named id set with the effect
//! constructor it triggers. Sets are matched independently, so one id may
//! trigger several routes. An id matching nothing is a normal outcome.

use std::collections::HashSet;

use relay_primitives::NotificationId;

use crate::config;
use crate::effect::Effect;

/// One named id set and the effect its members trigger.
#[derive(Debug, Clone)]
pub struct Route {
	name: &'static str,
	ids: HashSet<NotificationId>,
	build: fn(&NotificationId) -> Effect,
}

impl Route {
	pub fn new<I>(name: &'static str, ids: I, build: fn(&NotificationId) -> Effect) -> Self
	where
		I: IntoIterator,
		I::Item: Into<NotificationId>,
	{
		Self {
			name,
			ids: ids.into_iter().map(Into::into).collect(),
			build,
		}
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn matches(&self, id: &str) -> bool {
		self.ids.contains(id)
	}
}

/// Maps notification ids to the effects they trigger.
#[derive(Debug, Clone)]
pub struct NotificationRouter {
	routes: Vec<Route>,
}

impl Default for NotificationRouter {
	/// Router over the built-in update-required and status-change sets.
	fn default() -> Self {
		Self::empty()
			.with_route(Route::new("update-required", config::UPDATE_REQUIRED_IDS.iter().copied(), |_| Effect::OpenStoreListing))
			.with_route(Route::new("status-change", config::STATUS_CHANGE_IDS.iter().copied(), |id| {
				Effect::HandleStatusChange(id.clone())
			}))
	}
}

impl NotificationRouter {
	/// Router with no routes; every id is unmatched.
	pub fn empty() -> Self {
		Self { routes: Vec::new() }
	}

	#[must_use]
	pub fn with_route(mut self, route: Route) -> Self {
		self.routes.push(route);
		self
	}

	pub fn routes(&self) -> &[Route] {
		&self.routes
	}

	/// Returns the union of effects of every route containing `id`.
	///
	/// Equal effects produced by different routes are collapsed. Order
	/// carries no meaning.
	pub fn route(&self, id: &str) -> Vec<Effect> {
		let mut effects: Vec<Effect> = Vec::new();
		let mut notification: Option<NotificationId> = None;
		for route in self.routes.iter().filter(|route| route.matches(id)) {
			let notification = notification.get_or_insert_with(|| NotificationId::from(id));
			let effect = (route.build)(notification);
			tracing::trace!(route = route.name, notification = id, effect = effect.kind(), "router.match");
			if !effects.contains(&effect) {
				effects.push(effect);
			}
		}
		if effects.is_empty() {
			tracing::trace!(notification = id, "router.no_match");
		}
		effects
	}
}
