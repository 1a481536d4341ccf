//! Camera system for 3D scene viewing.
//!
//! Provides a first-person fly camera with Euler-angle look, scroll zoom,
//! and a perspective/orthographic projection toggle.

/// Fly camera controller turning input deltas into camera motion.
pub mod controller;
/// Core camera struct and projection modes.
pub mod core;
