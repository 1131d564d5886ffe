//! Fixed-rate frame pacing.
//!
//! Times are offsets from the start of the run, so the clock can be driven
//! by a real `Instant` or by tests with synthetic values.

use std::collections::VecDeque;
use std::time::Duration;

use crate::types::MAX_FPS;

const FPS_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct FrameClock {
    interval: Duration,
    last_tick: Option<Duration>,
    deadline: Duration,
    recent: VecDeque<Duration>,
}

impl FrameClock {
    /// `fps` is clamped to `1..=MAX_FPS`.
    pub fn new(fps: u32) -> Self {
        let fps = fps.clamp(1, MAX_FPS);
        Self {
            interval: Duration::from_micros(1_000_000 / fps as u64),
            last_tick: None,
            deadline: Duration::ZERO,
            recent: VecDeque::with_capacity(MAX_FPS as usize + 1),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start a frame at `now`. Returns the time since the previous frame
    /// (zero for the first one).
    pub fn tick(&mut self, now: Duration) -> Duration {
        let delta = self
            .last_tick
            .map(|last| now.saturating_sub(last))
            .unwrap_or(Duration::ZERO);
        self.last_tick = Some(now);

        // Stay on the fixed grid; after falling more than a frame behind,
        // restart the grid instead of rushing to catch up.
        self.deadline += self.interval;
        if self.deadline <= now {
            self.deadline = now + self.interval;
        }

        self.recent.push_back(now);
        while let Some(&oldest) = self.recent.front() {
            if now.saturating_sub(oldest) >= FPS_WINDOW {
                self.recent.pop_front();
            } else {
                break;
            }
        }
        delta
    }

    /// Time left until the next frame should start.
    pub fn remaining(&self, now: Duration) -> Duration {
        self.deadline.saturating_sub(now)
    }

    /// Frames started during the last second.
    pub fn fps(&self) -> u32 {
        self.recent.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn interval_from_fps() {
        assert_eq!(FrameClock::new(50).interval(), ms(20));
        assert_eq!(FrameClock::new(0).interval(), Duration::from_secs(1));
        assert_eq!(
            FrameClock::new(10_000).interval(),
            Duration::from_micros(1_000_000 / MAX_FPS as u64)
        );
    }

    #[test]
    fn first_tick_has_zero_delta() {
        let mut c = FrameClock::new(50);
        assert_eq!(c.remaining(ms(0)), Duration::ZERO);
        assert_eq!(c.tick(ms(0)), Duration::ZERO);
        assert_eq!(c.tick(ms(21)), ms(21));
    }

    #[test]
    fn deadline_stays_on_fixed_grid() {
        let mut c = FrameClock::new(50);
        c.tick(ms(0));
        assert_eq!(c.remaining(ms(5)), ms(15));
        // Late by 3ms: the next deadline is still 40ms, not 43ms.
        c.tick(ms(23));
        assert_eq!(c.remaining(ms(23)), ms(17));
    }

    #[test]
    fn falling_far_behind_resets_the_grid() {
        let mut c = FrameClock::new(50);
        c.tick(ms(0));
        c.tick(ms(500));
        assert_eq!(c.remaining(ms(500)), ms(20));
    }

    #[test]
    fn fps_counts_frames_in_last_second() {
        let mut c = FrameClock::new(50);
        for i in 0..100 {
            c.tick(ms(i * 20));
        }
        assert_eq!(c.fps(), 50);
    }
}
