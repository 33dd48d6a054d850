//! Mounting a visualization into a host container and tearing it down.
//!
//! [`mount`] builds everything one visualization needs and returns a
//! [`MountHandle`] that owns it. The host drives the handle: it calls
//! [`MountHandle::run_frame`] for every delivered frame request,
//! [`MountHandle::handle_resize`] for resize notifications and
//! [`TimerQueue::run_due`] from its event loop. [`MountHandle::unmount`]
//! reverses the mount in dependency order.

mod host;

use rand::rngs::StdRng;
use rand::SeedableRng;

pub use host::{
    FrameRequest, FrameScheduler, HostContainer, HostError, ListenerId,
    SurfaceId,
};

use crate::animation::{FrameAnimator, TimerQueue};
use crate::camera::core::Camera;
use crate::error::GridError;
use crate::input::InputEvent;
use crate::options::Options;
use crate::renderer::FrameRenderer;
use crate::scene::{Scene, SceneBuilder};
use crate::util::FrameClock;
use crate::viewport::ViewportController;

/// Per-mount state dropped at unmount.
struct Live {
    scene: Scene,
    animator: FrameAnimator,
    clock: FrameClock,
    listener: ListenerId,
    frame: Option<FrameRequest>,
    surface: SurfaceId,
    // Set after a reconfigure attempt; a second surface failure in a row is
    // reported instead of retried.
    recovering: bool,
}

/// A mounted visualization.
///
/// The renderer outlives [`unmount`](Self::unmount) so callers can inspect
/// it; everything it backed has been released by then.
pub struct MountHandle<R> {
    viewport: ViewportController<R>,
    live: Option<Live>,
}

/// Build the renderer, scene and frame loop inside `host`.
///
/// `renderer_factory` receives the container size. Flash resets are
/// scheduled on `timers`, which the host must run.
///
/// # Errors
///
/// Returns [`GridError::InvalidOptions`] for unusable options, whatever the
/// factory fails with, and [`GridError::Host`] if the surface cannot be
/// attached. Nothing created before the failure stays alive.
pub fn mount<H, R, F>(
    host: &mut H,
    renderer_factory: F,
    options: &Options,
    timers: &TimerQueue,
) -> Result<MountHandle<R>, GridError>
where
    H: HostContainer + FrameScheduler,
    R: FrameRenderer,
    F: FnOnce((u32, u32)) -> Result<R, GridError>,
{
    options.validate()?;
    let size = host.size();
    let mut renderer = renderer_factory(size)?;

    let surface = renderer.surface_id();
    if let Err(e) = host.attach_surface(surface) {
        renderer.release_targets();
        return Err(e.into());
    }

    let mut rng = options.seed.map_or_else(
        || StdRng::from_rng(&mut rand::rng()),
        StdRng::seed_from_u64,
    );
    let scene = SceneBuilder::new(options).build(&mut rng);
    renderer.upload(&scene);

    let viewport = ViewportController::new(&options.camera, renderer, size);
    let animator = FrameAnimator::new(options, timers.clone(), rng);
    let listener = host.add_resize_listener();
    let frame = host.request_frame();

    log::info!(
        "mounted grid {}x{}: {} towers, {} nodes, {} lines, {} particles, {} stars",
        size.0,
        size.1,
        scene.towers().len(),
        scene.nodes().len(),
        scene.lines().len(),
        scene.particles().len(),
        scene.stars().len(),
    );

    Ok(MountHandle {
        viewport,
        live: Some(Live {
            scene,
            animator,
            clock: FrameClock::new(),
            listener,
            frame: Some(frame),
            surface,
            recovering: false,
        }),
    })
}

impl<R: FrameRenderer> MountHandle<R> {
    /// Run one delivered frame: animate, draw, request the next frame.
    /// Time is taken from the mount's clock.
    ///
    /// # Errors
    ///
    /// See [`run_frame_at`](Self::run_frame_at).
    pub fn run_frame<H>(&mut self, host: &mut H) -> Result<(), GridError>
    where
        H: HostContainer + FrameScheduler,
    {
        let Some(live) = self.live.as_mut() else {
            return Ok(());
        };
        let elapsed = live.clock.tick();
        self.run_frame_at(host, elapsed)
    }

    /// Run one delivered frame at `elapsed` seconds since mount.
    ///
    /// Does nothing after unmount. An outdated or lost surface is
    /// reconfigured at the container size and the loop continues; a
    /// timed-out frame is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Render`] if the surface fails twice in a row or
    /// the renderer hits an unrecoverable error. No further frame is
    /// requested then.
    pub fn run_frame_at<H>(
        &mut self,
        host: &mut H,
        elapsed: f32,
    ) -> Result<(), GridError>
    where
        H: HostContainer + FrameScheduler,
    {
        let Some(live) = self.live.as_mut() else {
            return Ok(());
        };
        live.frame = None;
        live.animator.step(&mut live.scene, elapsed);

        match self.viewport.render(&live.scene) {
            Ok(()) => live.recovering = false,
            Err(e) if e.is_transient() => {
                log::debug!("skipping frame: {e}");
            }
            Err(e) if e.needs_reconfigure() && !live.recovering => {
                log::warn!("{e}, reconfiguring surface");
                live.recovering = true;
                let (width, height) = host.size();
                self.viewport.resize(width, height);
            }
            Err(e) => {
                log::error!("render failed: {e}");
                return Err(e.into());
            }
        }

        live.frame = Some(host.request_frame());
        Ok(())
    }

    /// Apply a container resize. Ignored after unmount.
    pub fn handle_resize(&mut self, width: u32, height: u32) {
        if self.live.is_some() {
            self.viewport.resize(width, height);
        }
    }

    /// Forward a pointer event to the orbit control. Returns whether it was
    /// consumed; always `false` after unmount.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        self.live.is_some() && self.viewport.handle_input(event)
    }

    /// Tear the visualization down. Safe to call more than once; only the
    /// first call releases anything.
    ///
    /// Order: cancel the pending frame, deregister the resize listener,
    /// release every object's geometry and materials, release the surface
    /// and render targets, detach the surface if the container still holds
    /// it, drop the scene. Detach failures are logged, never returned.
    pub fn unmount<H>(&mut self, host: &mut H)
    where
        H: HostContainer + FrameScheduler,
    {
        let Some(live) = self.live.take() else {
            log::debug!("unmount: already unmounted");
            return;
        };

        if let Some(frame) = live.frame {
            host.cancel_frame(frame);
        }
        host.remove_resize_listener(live.listener);

        let renderer = self.viewport.renderer_mut();
        let (mut geometries, mut materials) = (0, 0);
        for (_, renderable) in live.scene.renderables() {
            geometries +=
                usize::from(renderer.release_geometry(renderable.geometry));
            for &material in renderable.materials.ids() {
                materials += usize::from(renderer.release_material(material));
            }
        }
        renderer.release_targets();

        if host.contains_surface(live.surface) {
            if let Err(e) = host.detach_surface(live.surface) {
                log::warn!("detaching surface {} failed: {e}", live.surface.0);
            }
        } else {
            log::debug!("surface {} already detached", live.surface.0);
        }

        drop(live);
        log::info!(
            "unmounted grid: released {geometries} geometries, {materials} materials"
        );
    }

    /// Whether [`unmount`](Self::unmount) has not run yet.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.live.is_some()
    }

    /// The scene, until unmount.
    #[must_use]
    pub fn scene(&self) -> Option<&Scene> {
        self.live.as_ref().map(|live| &live.scene)
    }

    /// The current camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        self.viewport.camera()
    }

    /// The renderer.
    #[must_use]
    pub fn renderer(&self) -> &R {
        self.viewport.renderer()
    }

    /// Smoothed frame rate, until unmount.
    #[must_use]
    pub fn fps(&self) -> Option<f32> {
        self.live.as_ref().map(|live| live.clock.fps())
    }
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashSet;

    use super::*;
    use crate::renderer::{HeadlessRenderer, RenderError};

    /// Records every call the lifecycle makes on it.
    #[derive(Default)]
    struct RecordingHost {
        size: (u32, u32),
        attached: FxHashSet<SurfaceId>,
        listeners: FxHashSet<ListenerId>,
        pending_frames: FxHashSet<FrameRequest>,
        frames_requested: usize,
        next_id: u64,
        refuse_attach: bool,
        fail_detach: bool,
        log: Vec<&'static str>,
    }

    impl RecordingHost {
        fn new(width: u32, height: u32) -> Self {
            Self {
                size: (width, height),
                ..Self::default()
            }
        }

        fn next(&mut self) -> u64 {
            self.next_id += 1;
            self.next_id
        }
    }

    impl HostContainer for RecordingHost {
        fn size(&self) -> (u32, u32) {
            self.size
        }

        fn attach_surface(&mut self, surface: SurfaceId) -> Result<(), HostError> {
            if self.refuse_attach {
                return Err(HostError::AttachFailed("refused".to_owned()));
            }
            let _ = self.attached.insert(surface);
            Ok(())
        }

        fn contains_surface(&self, surface: SurfaceId) -> bool {
            self.attached.contains(&surface)
        }

        fn detach_surface(&mut self, surface: SurfaceId) -> Result<(), HostError> {
            self.log.push("detach");
            if self.fail_detach {
                return Err(HostError::Platform("parent went away".to_owned()));
            }
            if self.attached.remove(&surface) {
                Ok(())
            } else {
                Err(HostError::NotAttached(surface))
            }
        }

        fn add_resize_listener(&mut self) -> ListenerId {
            let id = ListenerId(self.next());
            let _ = self.listeners.insert(id);
            id
        }

        fn remove_resize_listener(&mut self, listener: ListenerId) {
            self.log.push("remove_listener");
            let _ = self.listeners.remove(&listener);
        }
    }

    impl FrameScheduler for RecordingHost {
        fn request_frame(&mut self) -> FrameRequest {
            // the previous request has been delivered by now
            self.pending_frames.clear();
            self.frames_requested += 1;
            let id = FrameRequest(self.next());
            let _ = self.pending_frames.insert(id);
            id
        }

        fn cancel_frame(&mut self, request: FrameRequest) {
            self.log.push("cancel_frame");
            let _ = self.pending_frames.remove(&request);
        }
    }

    fn seeded(mut options: Options) -> Options {
        options.seed = Some(42);
        options
    }

    fn mount_headless(
        host: &mut RecordingHost,
        options: &Options,
        timers: &TimerQueue,
    ) -> MountHandle<HeadlessRenderer> {
        mount(
            host,
            |size| Ok(HeadlessRenderer::new(SurfaceId(7), size)),
            options,
            timers,
        )
        .unwrap()
    }

    #[test]
    fn mount_builds_reference_lattice() {
        let mut host = RecordingHost::new(900, 500);
        let handle =
            mount_headless(&mut host, &seeded(Options::classic()), &TimerQueue::new());

        let scene = handle.scene().unwrap();
        assert_eq!(scene.towers().len(), 36);
        assert_eq!(scene.nodes().len(), 36);
        assert_eq!(scene.lines().len(), 60);
        assert_eq!(handle.camera().aspect, 1.8);
        assert!(host.contains_surface(SurfaceId(7)));
        assert_eq!(host.listeners.len(), 1);
        assert_eq!(host.pending_frames.len(), 1);
        assert_eq!(
            handle.renderer().live_geometries(),
            scene.resources().geometry_count()
        );
    }

    #[test]
    fn particles_stay_in_band_over_thousand_frames() {
        let options = seeded(Options::classic());
        let mut host = RecordingHost::new(900, 500);
        let timers = TimerQueue::new();
        let mut handle = mount_headless(&mut host, &options, &timers);

        let limit_y = options.grid.node_height + 0.6;
        for frame in 0..1000 {
            handle
                .run_frame_at(&mut host, frame as f32 / 60.0)
                .unwrap();
            for particle in handle.scene().unwrap().particles() {
                let p = particle.position;
                assert!(p.x.abs() <= 10.5 && p.z.abs() <= 10.5, "{p}");
                assert!(p.y <= limit_y, "{p}");
            }
        }
        assert_eq!(handle.renderer().frames(), 1000);
        // every frame requested exactly one successor
        assert_eq!(host.frames_requested, 1001);
    }

    #[test]
    fn unmount_runs_in_order_and_once() {
        let mut host = RecordingHost::new(900, 500);
        let mut handle =
            mount_headless(&mut host, &seeded(Options::enhanced()), &TimerQueue::new());
        let geometries = handle.scene().unwrap().resources().geometry_count();
        let materials = handle.scene().unwrap().resources().material_count();

        handle.unmount(&mut host);
        assert_eq!(host.log, ["cancel_frame", "remove_listener", "detach"]);
        assert!(host.pending_frames.is_empty());
        assert!(host.listeners.is_empty());
        assert!(!host.contains_surface(SurfaceId(7)));
        assert!(!handle.is_mounted());
        assert!(handle.scene().is_none());

        let renderer = handle.renderer();
        assert_eq!(renderer.geometries_released(), geometries);
        assert_eq!(renderer.materials_released(), materials);
        assert_eq!(renderer.live_geometries(), 0);
        assert_eq!(renderer.live_materials(), 0);
        assert!(!renderer.targets_alive());

        handle.unmount(&mut host);
        assert_eq!(host.log.len(), 3);
        assert_eq!(handle.renderer().geometries_released(), geometries);
        assert_eq!(handle.renderer().materials_released(), materials);
    }

    #[test]
    fn detach_failure_is_swallowed() {
        let mut host = RecordingHost::new(900, 500);
        let mut handle =
            mount_headless(&mut host, &seeded(Options::classic()), &TimerQueue::new());
        host.fail_detach = true;
        handle.unmount(&mut host);
        assert!(!handle.is_mounted());
        assert!(!handle.renderer().targets_alive());
    }

    #[test]
    fn surface_removed_elsewhere_is_not_detached() {
        let mut host = RecordingHost::new(900, 500);
        let mut handle =
            mount_headless(&mut host, &seeded(Options::classic()), &TimerQueue::new());
        let _ = host.attached.remove(&SurfaceId(7));
        handle.unmount(&mut host);
        assert!(!host.log.contains(&"detach"));
    }

    #[test]
    fn resize_then_unmount_with_frame_in_flight() {
        let mut host = RecordingHost::new(900, 500);
        let mut handle =
            mount_headless(&mut host, &seeded(Options::classic()), &TimerQueue::new());
        handle.run_frame_at(&mut host, 0.016).unwrap();
        handle.handle_resize(300, 200);
        assert_eq!(handle.renderer().size(), (300, 200));
        assert!((handle.camera().aspect - 1.5).abs() < 1e-6);

        handle.unmount(&mut host);
        // frame callbacks and resizes arriving late are no-ops
        handle.run_frame_at(&mut host, 0.032).unwrap();
        handle.handle_resize(640, 480);
        assert_eq!(handle.renderer().frames(), 1);
        assert_eq!(handle.renderer().size(), (300, 200));
        assert!(host.pending_frames.is_empty());
    }

    #[test]
    fn stale_flash_timers_do_nothing_after_unmount() {
        let mut options = seeded(Options::classic());
        options.grid.flash_probability = 1.0;
        let mut host = RecordingHost::new(900, 500);
        let timers = TimerQueue::new();
        let mut handle = mount_headless(&mut host, &options, &timers);

        handle.run_frame_at(&mut host, 0.0).unwrap();
        assert_eq!(timers.pending(), 36);
        handle.unmount(&mut host);

        let late = web_time::Instant::now() + web_time::Duration::from_secs(5);
        assert_eq!(timers.run_due(late), 36);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn refused_attach_leaves_nothing_behind() {
        let mut host = RecordingHost::new(900, 500);
        host.refuse_attach = true;
        let result = mount(
            &mut host,
            |size| Ok(HeadlessRenderer::new(SurfaceId(7), size)),
            &seeded(Options::classic()),
            &TimerQueue::new(),
        );
        assert!(matches!(result, Err(GridError::Host(_))));
        assert!(host.listeners.is_empty());
        assert!(host.pending_frames.is_empty());
        assert!(host.attached.is_empty());
    }

    #[test]
    fn factory_and_option_failures_propagate() {
        let mut host = RecordingHost::new(900, 500);
        let result: Result<MountHandle<HeadlessRenderer>, _> = mount(
            &mut host,
            |_| Err(GridError::Viewer("no adapter".to_owned())),
            &Options::classic(),
            &TimerQueue::new(),
        );
        assert!(matches!(result, Err(GridError::Viewer(_))));

        let mut bad = Options::classic();
        bad.grid.step = -1.0;
        let result = mount(
            &mut host,
            |size| Ok(HeadlessRenderer::new(SurfaceId(7), size)),
            &bad,
            &TimerQueue::new(),
        );
        assert!(matches!(result, Err(GridError::InvalidOptions(_))));
        assert!(host.attached.is_empty());
    }

    #[test]
    fn surface_loss_reconfigures_once_then_fails() {
        let mut host = RecordingHost::new(900, 500);
        let mut handle =
            mount_headless(&mut host, &seeded(Options::classic()), &TimerQueue::new());

        host.size = (640, 480);
        handle.viewport.renderer_mut().fail_next_frame(RenderError::Outdated);
        handle.run_frame_at(&mut host, 0.0).unwrap();
        assert_eq!(handle.renderer().size(), (640, 480));

        handle.viewport.renderer_mut().fail_next_frame(RenderError::Lost);
        let result = handle.run_frame_at(&mut host, 0.016);
        assert!(matches!(result, Err(GridError::Render(RenderError::Lost))));
    }

    #[test]
    fn timeout_skips_the_frame() {
        let mut host = RecordingHost::new(900, 500);
        let mut handle =
            mount_headless(&mut host, &seeded(Options::classic()), &TimerQueue::new());
        handle.viewport.renderer_mut().fail_next_frame(RenderError::Timeout);
        handle.run_frame_at(&mut host, 0.0).unwrap();
        handle.run_frame_at(&mut host, 0.016).unwrap();
        assert_eq!(handle.renderer().frames(), 1);
        assert_eq!(host.frames_requested, 3);
    }
}
