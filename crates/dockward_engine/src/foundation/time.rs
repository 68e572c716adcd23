//! Time management utilities

use std::time::Instant;

/// Wall-clock frame timer
///
/// Produces the raw delta fed to `Scene::update`. The scene, not the timer,
/// decides how much of a long frame the physics step is allowed to consume.
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Advance the timer by the wall-clock time elapsed since the last tick
    ///
    /// Returns the new delta in seconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.advance(elapsed)
    }

    /// Advance the timer by an explicit delta (fixed-rate and headless loops)
    pub fn advance(&mut self, delta_time: f32) -> f32 {
        self.delta_time = delta_time.max(0.0);
        self.total_time += self.delta_time;
        self.frame_count += 1;
        self.delta_time
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates() {
        let mut timer = Timer::new();
        timer.advance(0.5);
        timer.advance(0.25);
        assert_eq!(timer.frame_count(), 2);
        assert!((timer.total_time() - 0.75).abs() < f32::EPSILON);
        assert!((timer.average_fps() - 2.0 / 0.75).abs() < 1e-4);
    }

    #[test]
    fn test_negative_delta_is_zeroed() {
        let mut timer = Timer::new();
        assert_eq!(timer.advance(-1.0), 0.0);
        assert_eq!(timer.total_time(), 0.0);
    }
}
