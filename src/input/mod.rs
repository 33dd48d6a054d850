//! Platform-agnostic pointer input consumed by the orbit control.

/// Platform-agnostic input events.
pub mod event;

pub use event::{InputEvent, MouseButton};
