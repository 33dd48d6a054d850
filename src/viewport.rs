//! Camera, orbit control and renderer of one mounted visualization.

use crate::camera::controller::OrbitController;
use crate::camera::core::Camera;
use crate::input::InputEvent;
use crate::options::CameraOptions;
use crate::renderer::{FrameRenderer, RenderError};
use crate::scene::Scene;

/// Pairs the orbit-controlled camera with a [`FrameRenderer`].
#[derive(Debug)]
pub struct ViewportController<R> {
    controller: OrbitController,
    renderer: R,
}

impl<R: FrameRenderer> ViewportController<R> {
    /// Viewport of `width` x `height` pixels drawing through `renderer`.
    #[must_use]
    pub fn new(
        options: &CameraOptions,
        renderer: R,
        (width, height): (u32, u32),
    ) -> Self {
        Self {
            controller: OrbitController::new(options, width, height),
            renderer,
        }
    }

    /// Tick the orbit control, then draw one frame.
    ///
    /// # Errors
    ///
    /// Forwards the renderer's [`RenderError`].
    pub fn render(&mut self, scene: &Scene) -> Result<(), RenderError> {
        self.controller.update();
        self.renderer.render(scene, &self.controller.camera)
    }

    /// Recompute the projection and resize every target. Zero sizes are
    /// ignored; repeating a size changes nothing.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.controller.resize(width, height);
        self.renderer.resize(width, height);
    }

    /// Forward a pointer event to the orbit control.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        self.controller.handle_input(event)
    }

    /// The current camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.controller.camera
    }

    /// The orbit control.
    #[must_use]
    pub fn controller(&self) -> &OrbitController {
        &self.controller
    }

    /// The renderer.
    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The renderer, mutably (resource upload and release).
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::lifecycle::SurfaceId;
    use crate::options::Options;
    use crate::renderer::HeadlessRenderer;
    use crate::scene::SceneBuilder;

    fn viewport(options: &Options) -> ViewportController<HeadlessRenderer> {
        let renderer = HeadlessRenderer::new(SurfaceId(1), (900, 500));
        ViewportController::new(&options.camera, renderer, (900, 500))
    }

    #[test]
    fn resize_twice_matches_once() {
        let mut vp = viewport(&Options::classic());
        vp.resize(300, 200);
        let aspect = vp.camera().aspect;
        let projection = vp.camera().build_projection();
        vp.resize(300, 200);
        assert_eq!(aspect.to_bits(), vp.camera().aspect.to_bits());
        assert_eq!(projection, vp.camera().build_projection());
        assert_eq!(vp.renderer().size(), (300, 200));
    }

    #[test]
    fn zero_resize_reaches_nothing() {
        let mut vp = viewport(&Options::classic());
        vp.resize(0, 0);
        vp.resize(0, 240);
        assert_eq!(vp.camera().aspect, 1.8);
        assert_eq!(vp.renderer().resizes(), 0);
    }

    #[test]
    fn render_ticks_the_orbit_first() {
        let options = Options::enhanced();
        let mut vp = viewport(&options);
        let scene =
            SceneBuilder::new(&options).build(&mut StdRng::seed_from_u64(3));
        let before = vp.controller().theta();
        vp.render(&scene).unwrap();
        assert_ne!(before, vp.controller().theta());
        assert_eq!(vp.renderer().frames(), 1);
        assert_eq!(vp.renderer().last_aspect(), Some(1.8));
    }
}
