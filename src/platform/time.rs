//! Fixed-rate frame clock
//!
//! One suspension point per tick: `wait` sleeps out whatever is left of the
//! tick budget. A shared stop flag lets another thread end the loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::consts::{MAX_TICK_HZ, MIN_TICK_HZ};

/// Cross-thread stop request
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct FrameClock {
    hz: u32,
    budget: Duration,
    stop: StopFlag,
    tick_start: Instant,
    window_start: Instant,
    window_frames: u32,
    measured_fps: f32,
    frames: u64,
}

impl FrameClock {
    /// `hz` is clamped to the supported range
    pub fn new(hz: u32) -> Self {
        let hz = hz.clamp(MIN_TICK_HZ, MAX_TICK_HZ);
        let now = Instant::now();
        Self {
            hz,
            budget: Duration::from_secs_f64(1.0 / hz as f64),
            stop: StopFlag::new(),
            tick_start: now,
            window_start: now,
            window_frames: 0,
            measured_fps: hz as f32,
            frames: 0,
        }
    }

    pub fn hz(&self) -> u32 {
        self.hz
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Fixed simulation step in seconds
    pub fn dt(&self) -> f32 {
        1.0 / self.hz as f32
    }

    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_set()
    }

    /// Ticks completed
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frame rate over the last full second
    pub fn measured_fps(&self) -> f32 {
        self.measured_fps
    }

    /// Sleep out the rest of the tick budget
    ///
    /// Returns false if a stop was requested.
    pub fn wait(&mut self) -> bool {
        let elapsed = self.tick_start.elapsed();
        if let Some(rest) = self.budget.checked_sub(elapsed) {
            std::thread::sleep(rest);
        }

        let now = Instant::now();
        self.tick_start = now;
        self.frames += 1;
        self.window_frames += 1;
        let window = now.duration_since(self.window_start);
        if window >= Duration::from_secs(1) {
            self.measured_fps = self.window_frames as f32 / window.as_secs_f32();
            self.window_frames = 0;
            self.window_start = now;
        }
        !self.stop.is_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_rate() {
        assert_eq!(FrameClock::new(0).hz(), MIN_TICK_HZ);
        assert_eq!(FrameClock::new(10_000).hz(), MAX_TICK_HZ);
        assert!((FrameClock::new(96).dt() - 1.0 / 96.0).abs() < 1e-9);
    }

    #[test]
    fn test_wait_honors_budget() {
        let mut clock = FrameClock::new(200);
        let start = Instant::now();
        for _ in 0..4 {
            assert!(clock.wait());
        }
        assert!(start.elapsed() >= Duration::from_millis(15));
        assert_eq!(clock.frames(), 4);
    }

    #[test]
    fn test_stop_flag_from_other_thread() {
        let mut clock = FrameClock::new(360);
        let flag = clock.stop_flag();
        std::thread::spawn(move || flag.stop()).join().unwrap();
        assert!(clock.is_stopped());
        assert!(!clock.wait());
    }
}
