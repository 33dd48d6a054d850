// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Animated procedural 3D power-grid visualization built on wgpu.
//!
//! A lattice of transmission towers topped by pulsing, occasionally
//! flashing nodes, joined by power lines that carry drifting electricity
//! particles, optionally inside a twinkling starfield with bloom.
//!
//! # Key entry points
//!
//! - [`lifecycle::mount`] / [`lifecycle::MountHandle`] - build a
//!   visualization inside a host container and tear it down again
//! - [`scene::SceneBuilder`] - procedural scene generation
//! - [`animation::FrameAnimator`] - per-frame object animation
//! - [`viewport::ViewportController`] - camera, orbit control, rendering
//! - [`options::Options`] - runtime configuration and presets
//!
//! # Architecture
//!
//! Everything runs on the host's UI thread. Each frame the mount handle
//! steps the animator over the scene and asks the viewport to render it.
//! The wgpu renderer draws the scene into an HDR target, optionally runs a
//! threshold + blur bloom chain, and composites the result onto the
//! surface. Node flashes end on one-shot timers holding weak references,
//! so they are harmless once the scene is gone.

pub mod animation;
pub mod camera;
pub mod error;
pub mod gpu;
pub mod input;
pub mod lifecycle;
pub mod options;
pub mod renderer;
pub mod scene;
pub mod util;
#[cfg(feature = "viewer")]
mod viewer;
pub mod viewport;

pub use error::GridError;
pub use input::{InputEvent, MouseButton};
pub use lifecycle::{mount, MountHandle};
pub use options::Options;
#[cfg(feature = "viewer")]
pub use viewer::{Viewer, ViewerBuilder};
