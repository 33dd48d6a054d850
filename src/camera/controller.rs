use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::camera::core::Camera;
use crate::input::{InputEvent, MouseButton};
use crate::options::CameraOptions;

/// Keeps the camera off the poles, where the look-at basis degenerates.
const POLE_EPSILON: f32 = 1e-6;

/// Orbit control rotating a [`Camera`] around the scene origin.
///
/// The camera position is kept in spherical coordinates: a fixed radius,
/// an azimuth `theta` around +Y and a polar angle `phi` from +Y. Pointer
/// drags and auto-rotation accumulate a pending rotation that
/// [`update`](Self::update) applies once per frame, fully or by the damping
/// factor.
#[derive(Debug)]
pub struct OrbitController {
    /// The controlled camera.
    pub camera: Camera,

    radius: f32,
    theta: f32,
    phi: f32,
    pending: Vec2,

    rotate_speed: f32,
    damping: Option<f32>,
    auto_rotate: Option<f32>,
    min_phi: f32,
    max_phi: f32,

    viewport_height: f32,
    dragging: bool,
    last_cursor: Option<Vec2>,
}

impl OrbitController {
    /// Orbit control for a viewport of the given size.
    #[must_use]
    pub fn new(options: &CameraOptions, width: u32, height: u32) -> Self {
        let aspect = if width > 0 && height > 0 {
            width as f32 / height as f32
        } else {
            1.0
        };
        let min_phi = options.min_polar_angle.to_radians();
        let max_phi = options.max_polar_angle.to_radians();

        let mut controller = Self {
            camera: Camera::from_options(options, aspect),
            radius: options.distance,
            theta: 0.0,
            phi: options.polar_angle.to_radians(),
            pending: Vec2::ZERO,
            rotate_speed: options.rotate_speed,
            damping: options
                .enable_damping
                .then_some(options.damping_factor.clamp(0.0, 1.0)),
            auto_rotate: options
                .auto_rotate
                .then_some(options.auto_rotate_speed),
            min_phi,
            max_phi,
            viewport_height: height.max(1) as f32,
            dragging: false,
            last_cursor: None,
        };
        controller.clamp_phi();
        controller.update_camera_pos();
        controller
    }

    /// Azimuth around +Y in radians.
    #[must_use]
    pub fn theta(&self) -> f32 {
        self.theta
    }

    /// Polar angle from +Y in radians.
    #[must_use]
    pub fn phi(&self) -> f32 {
        self.phi
    }

    /// Rotate by a pointer drag of `delta` physical pixels. A drag across
    /// the full viewport height turns the camera by `2π · rotate_speed`.
    pub fn rotate(&mut self, delta: Vec2) {
        let scale = TAU * self.rotate_speed / self.viewport_height;
        self.pending -= delta * scale;
    }

    /// Advance the orbit by one frame: auto-rotate, apply (damped) pending
    /// rotation, clamp the polar angle and reposition the camera.
    pub fn update(&mut self) {
        if let Some(speed) = self.auto_rotate {
            if !self.dragging {
                // one full turn per minute at 60 fps and speed 1.0
                self.pending.x -= TAU / 3600.0 * speed;
            }
        }

        let factor = self.damping.unwrap_or(1.0);
        self.theta = (self.theta + self.pending.x * factor).rem_euclid(TAU);
        self.phi += self.pending.y * factor;
        self.clamp_phi();

        match self.damping {
            Some(f) => self.pending *= 1.0 - f,
            None => self.pending = Vec2::ZERO,
        }

        self.update_camera_pos();
    }

    /// Recompute the aspect ratio. Zero-sized viewports are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.camera.aspect = width as f32 / height as f32;
        self.viewport_height = height as f32;
    }

    /// Feed a pointer event. Returns `true` if the event was consumed.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed,
            } => {
                self.dragging = pressed;
                true
            }
            InputEvent::CursorMoved { x, y } => {
                let position = Vec2::new(x, y);
                if let Some(last) = self.last_cursor.replace(position) {
                    if self.dragging {
                        self.rotate(position - last);
                        return true;
                    }
                }
                false
            }
            InputEvent::CursorLeft => {
                self.dragging = false;
                self.last_cursor = None;
                false
            }
            InputEvent::MouseButton { .. } | InputEvent::Scroll { .. } => {
                false
            }
        }
    }

    fn clamp_phi(&mut self) {
        let lo = self.min_phi.max(POLE_EPSILON);
        let hi = self.max_phi.min(PI - POLE_EPSILON);
        self.phi = self.phi.clamp(lo, hi.max(lo));
    }

    fn update_camera_pos(&mut self) {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        let dir = Vec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta);

        self.camera.eye = self.camera.target + dir * self.radius;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(controller: &mut OrbitController, from: Vec2, to: Vec2) {
        let _ = controller.handle_input(InputEvent::CursorMoved {
            x: from.x,
            y: from.y,
        });
        let _ = controller.handle_input(InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed: true,
        });
        let _ = controller
            .handle_input(InputEvent::CursorMoved { x: to.x, y: to.y });
        let _ = controller.handle_input(InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed: false,
        });
    }

    #[test]
    fn resize_is_idempotent_and_ignores_zero() {
        let mut controller =
            OrbitController::new(&CameraOptions::default(), 800, 600);
        controller.resize(900, 500);
        let once = controller.camera.aspect;
        controller.resize(900, 500);
        assert_eq!(once.to_bits(), controller.camera.aspect.to_bits());
        assert_eq!(once, 1.8);

        controller.resize(0, 500);
        controller.resize(300, 0);
        assert_eq!(controller.camera.aspect, 1.8);
    }

    #[test]
    fn distance_is_fixed() {
        let mut controller =
            OrbitController::new(&CameraOptions::default(), 800, 600);
        drag(&mut controller, Vec2::ZERO, Vec2::new(250.0, 120.0));
        for _ in 0..200 {
            controller.update();
            assert!((controller.camera.eye.length() - 15.0).abs() < 1e-3);
        }
    }

    #[test]
    fn damping_spreads_rotation_over_frames() {
        let mut undamped = CameraOptions::default();
        undamped.enable_damping = false;
        let mut a = OrbitController::new(&undamped, 800, 600);
        let mut b = OrbitController::new(&CameraOptions::default(), 800, 600);

        for controller in [&mut a, &mut b] {
            drag(controller, Vec2::ZERO, Vec2::new(60.0, 0.0));
            controller.update();
        }
        let target = TAU - TAU * 0.5 * 60.0 / 600.0;
        assert!((a.theta() - target).abs() < 1e-4);
        // damped: only 5% applied on the first frame
        let first = TAU - b.theta();
        assert!((first - (TAU - target) * 0.05).abs() < 1e-4);

        for _ in 0..500 {
            b.update();
        }
        assert!((b.theta() - target).abs() < 1e-3);
    }

    #[test]
    fn polar_angle_is_clamped() {
        let mut options = CameraOptions::default();
        options.polar_angle = 65.0;
        options.min_polar_angle = 35.0;
        options.max_polar_angle = 85.0;
        options.enable_damping = false;
        let mut controller = OrbitController::new(&options, 800, 600);

        drag(&mut controller, Vec2::ZERO, Vec2::new(0.0, 5000.0));
        controller.update();
        assert!((controller.phi() - 35_f32.to_radians()).abs() < 1e-5);

        drag(&mut controller, Vec2::ZERO, Vec2::new(0.0, -5000.0));
        controller.update();
        assert!((controller.phi() - 85_f32.to_radians()).abs() < 1e-5);
        assert!(controller.camera.eye.y > 0.0);
    }

    #[test]
    fn auto_rotate_turns_without_input() {
        let mut options = CameraOptions::default();
        options.auto_rotate = true;
        options.enable_damping = false;
        let mut controller = OrbitController::new(&options, 800, 600);
        let start = controller.camera.eye;
        controller.update();
        assert_ne!(controller.camera.eye, start);

        let mut fixed = OrbitController::new(&CameraOptions::default(), 800, 600);
        let before = fixed.camera.eye;
        fixed.update();
        assert_eq!(fixed.camera.eye, before);
    }

    #[test]
    fn scroll_and_hover_are_not_consumed() {
        let mut controller =
            OrbitController::new(&CameraOptions::default(), 800, 600);
        assert!(!controller.handle_input(InputEvent::Scroll { delta: 3.0 }));
        assert!(!controller.handle_input(InputEvent::CursorMoved { x: 1.0, y: 1.0 }));
        assert!(!controller.handle_input(InputEvent::CursorMoved { x: 9.0, y: 9.0 }));
    }
}
