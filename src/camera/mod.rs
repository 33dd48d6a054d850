//! Camera system for viewing the grid.
//!
//! Provides a perspective camera and an orbit control that rotates it around
//! the scene origin at a fixed distance, with damping, auto-rotation and a
//! polar-angle clamp. Zoom and pan are not supported.

/// Orbit control driving the camera from pointer input and time.
pub mod controller;
/// Core camera struct and GPU uniform types.
pub mod core;
