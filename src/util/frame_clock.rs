use web_time::{Duration, Instant};

/// Time since mount plus a smoothed frame rate.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Weight of the newest frame (0.0-1.0)
    smoothing: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::starting_at(Instant::now())
    }
}

impl FrameClock {
    /// Clock starting now.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock whose zero is `start`.
    #[must_use]
    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last_frame: start,
            smoothed_fps: 60.0,
            smoothing: 0.05,
        }
    }

    /// Mark a frame at the current time. Returns seconds since start.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Mark a frame at `now`. Returns seconds since start.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let frame_time = now
            .checked_duration_since(self.last_frame)
            .unwrap_or(Duration::ZERO)
            .as_secs_f32();
        self.last_frame = now;
        if frame_time > 0.0 {
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + self.smoothing / frame_time;
        }
        self.elapsed_at(now)
    }

    /// Seconds from start to `now`; zero if `now` is earlier.
    #[must_use]
    pub fn elapsed_at(&self, now: Instant) -> f32 {
        now.checked_duration_since(self.start)
            .unwrap_or(Duration::ZERO)
            .as_secs_f32()
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_counts_from_start() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let t = clock.tick_at(start + Duration::from_millis(1500));
        assert!((t - 1.5).abs() < 1e-6);
    }

    #[test]
    fn fps_converges_to_frame_rate() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let frame = Duration::from_micros(33_333);
        let mut now = start;
        for _ in 0..400 {
            now += frame;
            let _ = clock.tick_at(now);
        }
        assert!((clock.fps() - 30.0).abs() < 0.1);
    }

    #[test]
    fn repeated_instant_keeps_fps() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let _ = clock.tick_at(start);
        assert_eq!(clock.fps(), 60.0);
    }
}
