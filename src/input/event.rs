/// Platform-agnostic pointer events.
///
/// Hosts translate their native events into these and hand them to
/// [`MountHandle::handle_input`](crate::lifecycle::MountHandle::handle_input),
/// which forwards them to the
/// [`OrbitController`](crate::camera::controller::OrbitController).
///
/// # Example
///
/// ```ignore
/// let consumed = handle.handle_input(InputEvent::CursorMoved {
///     x: 100.0,
///     y: 200.0,
/// });
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Cursor moved to absolute screen position.
    CursorMoved {
        /// Horizontal position in physical pixels.
        x: f32,
        /// Vertical position in physical pixels.
        y: f32,
    },
    /// Mouse button pressed or released.
    MouseButton {
        /// Which button changed.
        button: MouseButton,
        /// `true` for press, `false` for release.
        pressed: bool,
    },
    /// Scroll wheel. Zoom is disabled, so this is never consumed.
    Scroll {
        /// Scroll amount (positive = away from the user).
        delta: f32,
    },
    /// The cursor left the viewport; any drag in progress ends.
    CursorLeft,
}

/// Platform-agnostic mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary (left) mouse button. Drags rotate the camera.
    Left,
    /// Secondary (right) mouse button.
    Right,
    /// Middle mouse button (wheel click).
    Middle,
}

#[cfg(feature = "viewer")]
impl From<winit::event::MouseButton> for MouseButton {
    fn from(button: winit::event::MouseButton) -> Self {
        match button {
            winit::event::MouseButton::Right => Self::Right,
            winit::event::MouseButton::Middle => Self::Middle,
            _ => Self::Left,
        }
    }
}
