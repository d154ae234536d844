use std::time::{Duration, Instant};

/// Frame clock: each [`delta`](Self::delta) call returns the seconds elapsed
/// since the previous one (or since creation for the first call).
#[derive(Debug, Clone)]
pub struct Clock {
    start_time: Instant,
    last_tick: Instant,
    /// Upper bound for a single delta; long stalls (window drag, debugger)
    /// would otherwise launch physics bodies.
    pub max_delta: Duration,
    pub frame_count: u64,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_tick: now,
            max_delta: Duration::from_millis(250),
            frame_count: 0,
        }
    }

    /// Seconds since the previous call, clamped to `max_delta`.
    pub fn delta(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).min(self.max_delta);
        self.last_tick = now;
        self.frame_count += 1;
        delta.as_secs_f32()
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_non_negative_and_clamped() {
        let mut clock = Clock::new();
        clock.max_delta = Duration::from_millis(5);
        std::thread::sleep(Duration::from_millis(20));
        let dt = clock.delta();
        assert!(dt > 0.0 && dt <= 0.005 + 1e-6);
        assert_eq!(clock.frame_count, 1);
    }
}
