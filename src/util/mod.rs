//! Shared utilities for the viewer loop.

/// Frame delta timing and smoothed FPS.
pub mod frame_timing;
