use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Top-level tab of the host application's tab bar.
#[derive(Debug, Default, Display, EnumString, EnumIter, IntoStaticStr, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "kebab-case")]
pub enum Tab {
	#[default]
	Home,
	Activity,
	Settings,
}

/// Correlation token of a delivered push notification.
///
/// Ids are not unique across time. Routing only ever asks whether an id
/// belongs to a configured set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(Arc<str>);

impl NotificationId {
	pub fn new(id: impl Into<Arc<str>>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NotificationId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NotificationId {
	fn from(id: &str) -> Self {
		Self(Arc::from(id))
	}
}

impl From<String> for NotificationId {
	fn from(id: String) -> Self {
		Self(Arc::from(id))
	}
}

impl Borrow<str> for NotificationId {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl AsRef<str> for NotificationId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	#[test]
	fn tab_uses_kebab_case_names() {
		assert_eq!(Tab::Home.to_string(), "home");
		assert_eq!("activity".parse::<Tab>().ok(), Some(Tab::Activity));
		assert!("Home".parse::<Tab>().is_err());
	}

	#[test]
	fn notification_id_sets_look_up_by_str() {
		let ids: HashSet<NotificationId> = ["status-42", "status-43"].into_iter().map(NotificationId::from).collect();
		assert!(ids.contains("status-42"));
		assert!(!ids.contains("status-4"));
	}

	#[test]
	fn notification_id_clones_share_storage() {
		let id = NotificationId::from(String::from("force-update-1"));
		let copy = id.clone();
		assert_eq!(id, copy);
		assert_eq!(copy.as_str(), "force-update-1");
	}
}
