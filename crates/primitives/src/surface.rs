use std::fmt;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Presentable screen or overlay of the host application.
///
/// The vocabulary is closed: every surface the effect layer can reason about
/// is listed here, and the discriminant doubles as its [`SurfaceSet`] bit.
#[derive(Debug, Display, EnumString, EnumIter, IntoStaticStr, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[strum(serialize_all = "kebab-case")]
#[repr(u8)]
pub enum SurfaceId {
	/// Launch screen shown while the app boots.
	Splash,
	/// Root tab bar; its presence means the app reached steady state.
	TabBar,
	/// Any onboarding step.
	Onboarding,
	/// Privacy cover hiding sensitive data while the app is inactive.
	SensitiveCover,
	/// System permission explainer.
	PermissionOverlay,
	/// Feature view listing suggestions.
	Suggestions,
}

impl SurfaceId {
	const fn bit(self) -> u32 {
		1 << (self as u8)
	}

	/// Stable kebab-case token.
	pub fn as_str(self) -> &'static str {
		self.into()
	}

	/// Every surface, in declaration order.
	pub fn all() -> impl Iterator<Item = SurfaceId> {
		Self::iter()
	}
}

/// Fixed-size set of [`SurfaceId`]s, buildable in `const` context.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceSet(u32);

impl SurfaceSet {
	pub const EMPTY: Self = Self(0);

	/// Builds a set from a slice of surfaces.
	pub const fn of(surfaces: &[SurfaceId]) -> Self {
		let mut bits = 0;
		let mut i = 0;
		while i < surfaces.len() {
			bits |= surfaces[i].bit();
			i += 1;
		}
		Self(bits)
	}

	pub const fn contains(self, surface: SurfaceId) -> bool {
		self.0 & surface.bit() != 0
	}

	#[must_use]
	pub const fn with(self, surface: SurfaceId) -> Self {
		Self(self.0 | surface.bit())
	}

	pub fn insert(&mut self, surface: SurfaceId) {
		self.0 |= surface.bit();
	}

	pub const fn is_empty(self) -> bool {
		self.0 == 0
	}

	/// Returns members in declaration order.
	pub fn iter(self) -> impl Iterator<Item = SurfaceId> {
		SurfaceId::iter().filter(move |s| self.contains(*s))
	}

	/// True when at least one surface of `stack` is a member.
	pub fn intersects(self, stack: SurfaceStack<'_>) -> bool {
		stack.iter().any(|s| self.contains(s))
	}
}

impl FromIterator<SurfaceId> for SurfaceSet {
	fn from_iter<I: IntoIterator<Item = SurfaceId>>(iter: I) -> Self {
		let mut set = Self::EMPTY;
		for surface in iter {
			set.insert(surface);
		}
		set
	}
}

impl fmt::Debug for SurfaceSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.iter().map(SurfaceId::as_str)).finish()
	}
}

/// Read-only view over the currently active surfaces.
///
/// Ordered with the most recently presented surface last. The view borrows
/// the state it was taken from, so it cannot outlive a suspension point.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceStack<'a> {
	surfaces: &'a [SurfaceId],
}

impl<'a> SurfaceStack<'a> {
	pub const fn new(surfaces: &'a [SurfaceId]) -> Self {
		Self { surfaces }
	}

	pub fn contains(&self, surface: SurfaceId) -> bool {
		self.surfaces.contains(&surface)
	}

	/// Most recently presented surface.
	pub fn top(&self) -> Option<SurfaceId> {
		self.surfaces.last().copied()
	}

	pub fn iter(self) -> impl Iterator<Item = SurfaceId> + 'a {
		self.surfaces.iter().copied()
	}

	pub const fn len(&self) -> usize {
		self.surfaces.len()
	}

	pub const fn is_empty(&self) -> bool {
		self.surfaces.is_empty()
	}

	/// True when any active surface is in `set`.
	pub fn any_in(&self, set: SurfaceSet) -> bool {
		set.intersects(*self)
	}

	pub fn as_slice(&self) -> &'a [SurfaceId] {
		self.surfaces
	}
}
