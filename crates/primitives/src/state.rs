use crate::ids::Tab;
use crate::surface::{SurfaceId, SurfaceStack};

/// The slice of application state the effect layer reads and writes.
///
/// Every mutator reports whether it changed anything so callers can keep
/// updates idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
	pub selected_tab: Tab,
	/// Active surfaces, most recently presented last.
	pub active_surfaces: Vec<SurfaceId>,
}

impl Default for AppState {
	fn default() -> Self {
		Self {
			selected_tab: Tab::default(),
			active_surfaces: vec![SurfaceId::Splash],
		}
	}
}

impl AppState {
	pub fn new(selected_tab: Tab, active_surfaces: impl IntoIterator<Item = SurfaceId>) -> Self {
		Self {
			selected_tab,
			active_surfaces: active_surfaces.into_iter().collect(),
		}
	}

	pub fn surfaces(&self) -> SurfaceStack<'_> {
		SurfaceStack::new(&self.active_surfaces)
	}

	/// Selects `tab`; selecting the current tab is a no-op.
	pub fn select_tab(&mut self, tab: Tab) -> bool {
		if self.selected_tab == tab {
			return false;
		}
		self.selected_tab = tab;
		true
	}

	/// Pushes `surface` on top unless it is already active.
	pub fn present(&mut self, surface: SurfaceId) -> bool {
		if self.active_surfaces.contains(&surface) {
			return false;
		}
		self.active_surfaces.push(surface);
		true
	}

	/// Removes `surface`; dismissing an absent surface is a no-op.
	pub fn dismiss(&mut self, surface: SurfaceId) -> bool {
		let before = self.active_surfaces.len();
		self.active_surfaces.retain(|s| *s != surface);
		self.active_surfaces.len() != before
	}

	/// Resets the navigation stack, as the host does on root transitions.
	pub fn replace_surfaces(&mut self, surfaces: impl IntoIterator<Item = SurfaceId>) -> bool {
		let mut next: Vec<SurfaceId> = Vec::new();
		for surface in surfaces {
			if !next.contains(&surface) {
				next.push(surface);
			}
		}
		if next == self.active_surfaces {
			return false;
		}
		self.active_surfaces = next;
		true
	}
}
