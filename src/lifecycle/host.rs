//! The embedding surface the grid is mounted into.

use std::fmt;

/// Identifies a renderer's output surface inside its host container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// Handle to a registered resize listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Handle to a requested display frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// A host container refused an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The surface could not be attached to the container.
    AttachFailed(String),
    /// The surface is not a child of the container.
    NotAttached(SurfaceId),
    /// Any other platform failure.
    Platform(String),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttachFailed(msg) => write!(f, "attach failed: {msg}"),
            Self::NotAttached(id) => {
                write!(f, "surface {} is not attached", id.0)
            }
            Self::Platform(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for HostError {}

/// The visual container that owns the output surface.
///
/// Resize notifications are not delivered through a callback: the host
/// keeps track of registered listeners and calls
/// [`MountHandle::handle_resize`](super::MountHandle::handle_resize) for
/// them, so no state is shared between host and mount.
pub trait HostContainer {
    /// Current client size in physical pixels.
    fn size(&self) -> (u32, u32);

    /// Make `surface` a child of the container.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the platform refuses the surface.
    fn attach_surface(&mut self, surface: SurfaceId) -> Result<(), HostError>;

    /// Whether `surface` is currently a child of the container.
    fn contains_surface(&self, surface: SurfaceId) -> bool;

    /// Remove `surface` from the container.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the platform fails to detach it.
    fn detach_surface(&mut self, surface: SurfaceId) -> Result<(), HostError>;

    /// Start delivering resize notifications.
    fn add_resize_listener(&mut self) -> ListenerId;

    /// Stop delivering resize notifications for `listener`.
    fn remove_resize_listener(&mut self, listener: ListenerId);
}

/// Display-refresh driven frame callbacks.
pub trait FrameScheduler {
    /// Ask for one frame callback at the next display refresh.
    fn request_frame(&mut self) -> FrameRequest;

    /// Cancel a pending request. Unknown or already delivered requests are
    /// ignored.
    fn cancel_frame(&mut self, request: FrameRequest);
}
