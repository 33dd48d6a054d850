//! Standalone visualization window backed by winit.
//!
//! The window plays both host roles: it is the [`HostContainer`] the
//! surface is attached to and the [`FrameScheduler`] whose redraw requests
//! drive the frame loop.
//!
//! ```no_run
//! # use gridscape::{Options, Viewer};
//! Viewer::builder()
//!     .with_options(Options::enhanced())
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::sync::Arc;

use web_time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    animation::TimerQueue,
    error::GridError,
    lifecycle::{
        mount, FrameRequest, FrameScheduler, HostContainer, HostError,
        ListenerId, MountHandle, SurfaceId,
    },
    options::Options,
    renderer::GpuRenderer,
    InputEvent, MouseButton,
};

const FPS_LOG_INTERVAL: Duration = Duration::from_secs(5);

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    options: Option<Options>,
    title: String,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            options: None,
            title: "Gridscape".into(),
        }
    }

    /// Override the default (classic) options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            options: self.options.unwrap_or_default(),
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window showing the animated grid.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    options: Options,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Viewer`] if the event loop cannot be created or
    /// exits abnormally, and the mount error if the grid could not be
    /// mounted into the window.
    pub fn run(self) -> Result<(), GridError> {
        let event_loop =
            EventLoop::new().map_err(|e| GridError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            host: None,
            handle: None,
            timers: TimerQueue::new(),
            options: self.options,
            title: self.title,
            last_fps_log: Instant::now(),
            failure: None,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| GridError::Viewer(e.to_string()))?;
        app.failure.map_or(Ok(()), Err)
    }
}

// ── Window host ──────────────────────────────────────────────────────────

/// The winit window seen as a host container and frame scheduler.
struct WindowHost {
    window: Arc<Window>,
    attached: Option<SurfaceId>,
    listener: Option<ListenerId>,
    pending_frame: Option<FrameRequest>,
    next_id: u64,
}

impl WindowHost {
    fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            attached: None,
            listener: None,
            pending_frame: None,
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl HostContainer for WindowHost {
    fn size(&self) -> (u32, u32) {
        let inner = self.window.inner_size();
        (inner.width.max(1), inner.height.max(1))
    }

    fn attach_surface(&mut self, surface: SurfaceId) -> Result<(), HostError> {
        if surface.0 != u64::from(self.window.id()) {
            return Err(HostError::AttachFailed(format!(
                "surface {} does not belong to this window",
                surface.0
            )));
        }
        self.attached = Some(surface);
        Ok(())
    }

    fn contains_surface(&self, surface: SurfaceId) -> bool {
        self.attached == Some(surface)
    }

    fn detach_surface(&mut self, surface: SurfaceId) -> Result<(), HostError> {
        if self.attached.take_if(|s| *s == surface).is_some() {
            Ok(())
        } else {
            Err(HostError::NotAttached(surface))
        }
    }

    fn add_resize_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id());
        self.listener = Some(id);
        id
    }

    fn remove_resize_listener(&mut self, listener: ListenerId) {
        if self.listener == Some(listener) {
            self.listener = None;
        }
    }
}

impl FrameScheduler for WindowHost {
    fn request_frame(&mut self) -> FrameRequest {
        let id = FrameRequest(self.next_id());
        self.pending_frame = Some(id);
        self.window.request_redraw();
        id
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending_frame == Some(request) {
            self.pending_frame = None;
        }
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

struct ViewerApp {
    host: Option<WindowHost>,
    handle: Option<MountHandle<GpuRenderer>>,
    timers: TimerQueue,
    options: Options,
    title: String,
    last_fps_log: Instant,
    failure: Option<GridError>,
}

impl ViewerApp {
    fn teardown(&mut self, event_loop: &ActiveEventLoop) {
        if let (Some(handle), Some(host)) = (&mut self.handle, &mut self.host)
        {
            handle.unmount(host);
        }
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(handle), Some(host)) = (&mut self.handle, &mut self.host)
        else {
            return;
        };
        // cancelled or never requested
        if host.pending_frame.take().is_none() {
            return;
        }
        if let Err(e) = handle.run_frame(host) {
            log::error!("frame loop stopped: {e}");
            self.failure = Some(e);
            self.teardown(event_loop);
            return;
        }

        let now = Instant::now();
        if now.duration_since(self.last_fps_log) >= FPS_LOG_INTERVAL {
            if let Some(fps) = handle.fps() {
                log::debug!("{fps:.1} fps");
            }
            self.last_fps_log = now;
        }
    }

    fn forward_input(&mut self, event: InputEvent) {
        if let Some(handle) = &mut self.handle {
            let _ = handle.handle_input(event);
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.host.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(900, 500));
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let mut host = WindowHost::new(window.clone());
        let surface = SurfaceId(u64::from(window.id()));
        let options = &self.options;
        let result = mount(
            &mut host,
            |size| GpuRenderer::new_blocking(window, surface, size, options),
            options,
            &self.timers,
        );
        match result {
            Ok(handle) => {
                self.handle = Some(handle);
                self.host = Some(host);
            }
            Err(e) => {
                log::error!("Failed to mount grid: {e}");
                self.failure = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.teardown(event_loop),

            WindowEvent::Resized(size) => {
                let listening =
                    self.host.as_ref().is_some_and(|h| h.listener.is_some());
                if let (true, Some(handle)) = (listening, &mut self.handle) {
                    handle.handle_resize(size.width, size.height);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            WindowEvent::MouseInput { button, state, .. } => {
                self.forward_input(InputEvent::MouseButton {
                    button: MouseButton::from(button),
                    pressed: state == ElementState::Pressed,
                });
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.forward_input(InputEvent::CursorMoved {
                    x: position.x as f32,
                    y: position.y as f32,
                });
            }

            WindowEvent::CursorLeft { .. } => {
                self.forward_input(InputEvent::CursorLeft);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
                };
                self.forward_input(InputEvent::Scroll { delta });
            }

            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        let _ = self.timers.run_due(Instant::now());
    }
}
