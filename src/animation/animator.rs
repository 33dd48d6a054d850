//! Frame animator: advances node pulse/flash, particles and star twinkle.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::Rng;
use web_time::Duration;

use super::timers::TimerQueue;
use crate::options::Options;
use crate::scene::{Line, Node, Particle, ParticleBounds, Scene};

/// Node scale at elapsed time `t` (seconds) for a given pulse phase.
///
/// Always within `[0.6, 1.0]`.
#[must_use]
pub fn pulse_scale(t: f32, phase: f32) -> f32 {
    0.8 + 0.2 * (2.0 * t + phase).sin()
}

/// Star opacity at elapsed time `t` (seconds), clamped to `[0, 1]`.
#[must_use]
pub fn twinkle_opacity(twinkle_speed: f32, t: f32) -> f32 {
    (0.4 + 0.6 * (twinkle_speed * t).sin()).clamp(0.0, 1.0)
}

/// Mutates the animated state of a [`Scene`] once per frame.
///
/// Owns the animation RNG and a handle to the timer queue that ends node
/// flashes. Towers and lines are never touched.
#[derive(Debug)]
pub struct FrameAnimator {
    rng: StdRng,
    timers: TimerQueue,
    flash_probability: f64,
    flash_intensity: f32,
    flash_duration: Duration,
    height_jitter: f32,
}

impl FrameAnimator {
    /// Animator using the flash and particle settings from `options`.
    #[must_use]
    pub fn new(options: &Options, timers: TimerQueue, rng: StdRng) -> Self {
        Self {
            rng,
            timers,
            flash_probability: f64::from(options.grid.flash_probability)
                .clamp(0.0, 1.0),
            flash_intensity: options.grid.flash_intensity,
            flash_duration: Duration::from_millis(
                options.grid.flash_duration_ms,
            ),
            height_jitter: options.particles.height_jitter,
        }
    }

    /// Advance every animated object to elapsed time `elapsed` (seconds
    /// since mount).
    pub fn step(&mut self, scene: &mut Scene, elapsed: f32) {
        for node in scene.nodes_mut() {
            self.step_node(node, elapsed);
        }

        let (particles, lines, bounds) = scene.particles_mut();
        for particle in particles {
            self.step_particle(particle, lines, bounds);
        }

        for star in scene.stars_mut() {
            star.opacity = twinkle_opacity(star.twinkle_speed, elapsed);
        }
    }

    fn step_node(&mut self, node: &mut Node, t: f32) {
        node.scale = pulse_scale(t, node.pulse_phase);

        if self.flash_probability > 0.0
            && self.rng.random_bool(self.flash_probability)
        {
            node.emissive().flash(self.flash_intensity);
            let handle = node.emissive_handle();
            self.timers.schedule(self.flash_duration, move || {
                if let Some(emissive) = handle.upgrade() {
                    emissive.reset();
                }
            });
        }
    }

    fn step_particle(
        &mut self,
        particle: &mut Particle,
        lines: &[Line],
        bounds: ParticleBounds,
    ) {
        particle.position += particle.direction;
        if bounds.contains(particle.position) {
            return;
        }

        if lines.is_empty() {
            particle.position = Vec3::new(0.0, bounds.node_height, 0.0);
            particle.direction = Vec3::ZERO;
            return;
        }

        let line = &lines[self.rng.random_range(0..lines.len())];
        particle.position = line.point_at(self.rng.random::<f32>());

        let mut along = line.axis.unit() * particle.speed;
        if self.rng.random_bool(0.5) {
            along = -along;
        }
        let jitter = (self.rng.random::<f32>() - 0.5) * self.height_jitter;
        particle.direction = Vec3::new(along.x, jitter, along.z);
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use web_time::Instant;

    use super::*;
    use crate::scene::{LineAxis, SceneBuilder};

    fn setup(
        options: &Options,
        seed: u64,
    ) -> (Scene, FrameAnimator, TimerQueue) {
        let mut rng = StdRng::seed_from_u64(seed);
        let scene = SceneBuilder::new(options).build(&mut rng);
        let timers = TimerQueue::new();
        let animator = FrameAnimator::new(options, timers.clone(), rng);
        (scene, animator, timers)
    }

    #[test]
    fn pulse_scale_stays_in_band() {
        let mut t = 0.0;
        while t < 20.0 {
            for phase in [0.0, 1.0, 3.0, 6.2] {
                let s = pulse_scale(t, phase);
                assert!((0.6..=1.0).contains(&s), "scale {s}");
            }
            t += 0.013;
        }
        assert!((pulse_scale(0.0, 0.0) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn twinkle_is_clamped() {
        assert_eq!(twinkle_opacity(1.0, 0.0), 0.4);
        let mut t = 0.0;
        while t < 20.0 {
            let o = twinkle_opacity(1.7, t);
            assert!((0.0..=1.0).contains(&o));
            t += 0.05;
        }
        // sin = 1 gives 1.0 exactly, sin = -1 clamps to 0
        let quarter = std::f32::consts::FRAC_PI_2;
        assert!((twinkle_opacity(1.0, quarter) - 1.0).abs() < 1e-6);
        assert_eq!(twinkle_opacity(1.0, 3.0 * quarter), 0.0);
    }

    #[test]
    fn particles_stay_within_bounds() {
        let options = Options::enhanced();
        let (mut scene, mut animator, _timers) = setup(&options, 11);
        let bounds = scene.bounds();
        for frame in 0..1000 {
            animator.step(&mut scene, frame as f32 / 60.0);
            for p in scene.particles() {
                assert!(p.position.x.abs() <= bounds.extent + 0.5);
                assert!(p.position.z.abs() <= bounds.extent + 0.5);
                assert!(
                    (p.position.y - bounds.node_height).abs()
                        <= bounds.band_half_height + 0.1
                );
            }
        }
    }

    #[test]
    fn reset_places_particle_on_a_line_moving_along_it() {
        let options = Options::classic();
        let (mut scene, mut animator, _timers) = setup(&options, 12);
        {
            let (particles, _, _) = scene.particles_mut();
            particles[0].position = Vec3::new(50.0, 1.2, 0.0);
            particles[0].direction = Vec3::ZERO;
        }
        animator.step(&mut scene, 0.0);

        let particle = &scene.particles()[0];
        let speed = particle.speed;
        let on_line = scene.lines().iter().any(|line| {
            let lo = line.start.min(line.end);
            let hi = line.start.max(line.end);
            let p = particle.position;
            p.cmpge(lo - 1e-4).all() && p.cmple(hi + 1e-4).all()
        });
        assert!(on_line);

        let d = particle.direction;
        assert!(d.y.abs() <= 0.005);
        let in_plane = ((d.x.abs() - speed).abs() < 1e-6 && d.z == 0.0)
            || ((d.z.abs() - speed).abs() < 1e-6 && d.x == 0.0);
        assert!(in_plane, "direction {d:?}");
    }

    #[test]
    fn resets_travel_both_ways_along_both_axes() {
        let mut options = Options::classic();
        options.grid.flash_probability = 0.0;
        let (mut scene, mut animator, _timers) = setup(&options, 21);
        assert!(!scene.particles().is_empty());

        let mut seen = [[false; 2]; 2];
        for _ in 0..200 {
            for p in scene.particles_mut().0 {
                p.position = Vec3::new(50.0, 1.2, 50.0);
            }
            animator.step(&mut scene, 0.0);
            for p in scene.particles() {
                let d = p.direction;
                let (axis, along) = if d.z == 0.0 {
                    (LineAxis::X, d.x)
                } else {
                    (LineAxis::Z, d.z)
                };
                assert_ne!(along, 0.0);
                let axis = usize::from(axis == LineAxis::Z);
                seen[axis][usize::from(along > 0.0)] = true;
            }
        }
        assert_eq!(seen, [[true; 2]; 2], "[x-, x+], [z-, z+]");
    }

    #[test]
    fn reset_without_lines_parks_at_centre() {
        let mut options = Options::classic();
        options.grid.extent = 0.0;
        let (mut scene, mut animator, _timers) = setup(&options, 13);
        assert!(scene.lines().is_empty());
        animator.step(&mut scene, 0.0);
        for p in scene.particles() {
            assert!(scene.bounds().contains(p.position));
        }
    }

    #[test]
    fn flash_resets_after_timer() {
        let mut options = Options::classic();
        options.grid.flash_probability = 1.0;
        options.grid.steady_emissive = 0.5;
        let (mut scene, mut animator, timers) = setup(&options, 14);

        animator.step(&mut scene, 0.0);
        assert!(scene
            .nodes()
            .iter()
            .all(|n| n.emissive().intensity() == options.grid.flash_intensity));
        assert_eq!(timers.pending(), scene.nodes().len());

        let later = Instant::now() + Duration::from_secs(1);
        assert_eq!(timers.run_due(later), scene.nodes().len());
        assert!(scene.nodes().iter().all(|n| n.emissive().intensity() == 0.5));
    }

    #[test]
    fn stale_flash_timer_is_a_no_op() {
        let mut options = Options::classic();
        options.grid.flash_probability = 1.0;
        let (mut scene, mut animator, timers) = setup(&options, 15);
        animator.step(&mut scene, 0.0);
        drop(scene);
        assert_eq!(timers.run_due(Instant::now() + Duration::from_secs(1)), 36);
    }

    #[test]
    fn zero_probability_never_flashes() {
        let mut options = Options::classic();
        options.grid.flash_probability = 0.0;
        let (mut scene, mut animator, timers) = setup(&options, 16);
        for frame in 0..100 {
            animator.step(&mut scene, frame as f32 * 0.016);
        }
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn towers_and_lines_untouched() {
        let options = Options::enhanced();
        let (mut scene, mut animator, _timers) = setup(&options, 17);
        let towers: Vec<Vec3> =
            scene.towers().iter().map(|t| t.position).collect();
        let lines: Vec<(Vec3, LineAxis)> =
            scene.lines().iter().map(|l| (l.start, l.axis)).collect();
        for frame in 0..50 {
            animator.step(&mut scene, frame as f32 * 0.016);
        }
        let after: Vec<Vec3> =
            scene.towers().iter().map(|t| t.position).collect();
        assert_eq!(towers, after);
        assert!(scene
            .lines()
            .iter()
            .zip(&lines)
            .all(|(l, (start, axis))| l.start == *start && l.axis == *axis));
        assert!(scene.stars().iter().all(|s| (0.0..=1.0).contains(&s.opacity)));
    }
}
