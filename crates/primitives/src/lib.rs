//! Core vocabularies for the effect coordination layer: surfaces, tabs,
//! notification ids, and the application state the effects observe.

/// Async future aliases.
pub mod future;
/// Identifier types for tabs and delivered notifications.
pub mod ids;
/// Process-wide application state observed by effects.
pub mod state;
/// Surface identifiers, surface sets, and the active-surface view.
pub mod surface;

pub use future::{BoxFuture, poll_once};
pub use ids::{NotificationId, Tab};
pub use state::AppState;
pub use surface::{SurfaceId, SurfaceSet, SurfaceStack};
