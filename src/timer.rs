use std::time::{Duration, Instant};

/// Frame timer. Total time excludes spans where the timer was stopped
/// (window minimized or application suspended).
pub struct FrameTimer {
    base_time: Instant,
    previous_time: Instant,
    current_time: Instant,
    stop_time: Instant,
    paused_time: Duration,
    delta_time: Duration,
    stopped: bool,
}

impl FrameTimer {
    pub fn new() -> Self {
        Default::default()
    }

    /// Seconds elapsed between the last two ticks.
    pub fn delta_time(&self) -> f64 {
        self.delta_time.as_secs_f64()
    }

    /// Seconds since reset, not counting stopped spans.
    pub fn total_time(&self) -> f64 {
        let end = if self.stopped {
            self.stop_time
        } else {
            self.current_time
        };
        ((end - self.base_time) - self.paused_time).as_secs_f64()
    }

    pub fn reset(&mut self) {
        let now = Instant::now();
        self.base_time = now;
        self.previous_time = now;
        self.current_time = now;
        self.stop_time = now;
        self.paused_time = Duration::default();
        self.stopped = false;
    }

    pub fn start(&mut self) {
        if self.stopped {
            let now = Instant::now();
            self.paused_time += now - self.stop_time;
            self.previous_time = now;
            self.stopped = false;
        }
    }

    pub fn stop(&mut self) {
        if !self.stopped {
            self.stop_time = Instant::now();
            self.stopped = true;
        }
    }

    pub fn tick(&mut self) {
        if self.stopped {
            self.delta_time = Duration::default();
            return;
        }
        self.current_time = Instant::now();
        self.delta_time = self.current_time - self.previous_time;
        self.previous_time = self.current_time;
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        let now = Instant::now();
        FrameTimer {
            base_time: now,
            previous_time: now,
            current_time: now,
            stop_time: now,
            paused_time: Duration::default(),
            delta_time: Duration::default(),
            stopped: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticking_while_stopped_yields_zero_delta() {
        let mut timer = FrameTimer::new();
        timer.stop();
        timer.tick();
        assert_eq!(timer.delta_time(), 0.0);
    }

    #[test]
    fn total_time_is_frozen_while_stopped() {
        let mut timer = FrameTimer::new();
        timer.tick();
        timer.stop();
        let frozen = timer.total_time();
        timer.tick();
        assert_eq!(timer.total_time(), frozen);
    }

    #[test]
    fn delta_is_monotonic_across_ticks() {
        let mut timer = FrameTimer::new();
        timer.reset();
        timer.tick();
        assert!(timer.delta_time() >= 0.0);
        assert!(timer.total_time() >= 0.0);
    }
}
