//! Per-frame animation of the power-grid scene.

mod animator;
mod timers;

pub use animator::{pulse_scale, twinkle_opacity, FrameAnimator};
pub use timers::TimerQueue;
