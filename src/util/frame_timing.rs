use web_time::Instant;

/// Per-frame delta time with a smoothed FPS readout.
pub struct FrameTiming {
    /// Last frame timestamp
    last_frame: Instant,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
    /// Upper bound on a single delta, so a stall does not teleport the
    /// camera.
    max_delta: f32,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTiming {
    /// Create a timer starting now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            smoothed_fps: 60.0, // Start with reasonable default
            smoothing: 0.05,
            max_delta: 0.25,
        }
    }

    /// Call once per frame. Returns seconds since the previous call.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.record(elapsed)
    }

    fn record(&mut self, elapsed: f32) -> f32 {
        if elapsed > 0.0 {
            let instant_fps = 1.0 / elapsed;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
        elapsed.min(self.max_delta)
    }

    /// Get the current FPS (smoothed)
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_capped() {
        let mut timing = FrameTiming::new();
        assert_eq!(timing.record(5.0), 0.25);
        assert_eq!(timing.record(0.016), 0.016);
    }

    #[test]
    fn fps_moves_towards_frame_rate() {
        let mut timing = FrameTiming::new();
        for _ in 0..500 {
            let _ = timing.record(1.0 / 30.0);
        }
        assert!((timing.fps() - 30.0).abs() < 0.5);
    }

    #[test]
    fn tick_is_non_negative() {
        let mut timing = FrameTiming::new();
        assert!(timing.tick() >= 0.0);
    }
}
