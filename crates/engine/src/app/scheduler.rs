use std::time::Duration;

/// What the loop should do with the frame it just received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStep {
    /// Not enough time has passed, or assets are not ready yet.
    Idle,
    /// Run exactly one logical tick. `skipped` counts whole intervals that
    /// were dropped because the frame stalled.
    Tick { skipped: u32 },
    /// An interval elapsed while paused; draw the pause overlay instead.
    Paused,
}

/// Fixed-interval tick driver.
///
/// Real time accumulates across frames. Once the accumulated time exceeds the
/// interval, one step is emitted and only the remainder modulo the interval is
/// carried over, so a long stall produces a single tick rather than a burst.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Duration,
    accumulated: Duration,
    ready: bool,
    paused: bool,
    frame_counter: u64,
}

impl FrameScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: if interval.is_zero() {
                Duration::from_millis(1)
            } else {
                interval
            },
            accumulated: Duration::ZERO,
            ready: false,
            paused: false,
            frame_counter: 0,
        }
    }

    pub fn from_tick_rate(ticks_per_second: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / ticks_per_second.max(1) as f64))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Logical ticks run so far. Paused intervals do not count.
    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    pub fn advance(&mut self, elapsed: Duration) -> FrameStep {
        self.accumulated = self.accumulated.saturating_add(elapsed);
        if !self.ready || self.accumulated <= self.interval {
            return FrameStep::Idle;
        }

        let interval_nanos = self.interval.as_nanos();
        let accumulated_nanos = self.accumulated.as_nanos();
        let whole_intervals = accumulated_nanos / interval_nanos;
        let remainder = accumulated_nanos % interval_nanos;
        self.accumulated = Duration::from_nanos(remainder as u64);

        if self.paused {
            return FrameStep::Paused;
        }

        self.frame_counter = self.frame_counter.saturating_add(1);
        let skipped = u32::try_from(whole_intervals.saturating_sub(1)).unwrap_or(u32::MAX);
        FrameStep::Tick { skipped }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_scheduler(interval_ms: u64) -> FrameScheduler {
        let mut scheduler = FrameScheduler::new(Duration::from_millis(interval_ms));
        scheduler.mark_ready();
        scheduler
    }

    #[test]
    fn no_tick_until_interval_is_exceeded() {
        let mut scheduler = ready_scheduler(30);

        assert_eq!(scheduler.advance(Duration::from_millis(16)), FrameStep::Idle);
        assert_eq!(scheduler.advance(Duration::from_millis(14)), FrameStep::Idle);
        assert_eq!(
            scheduler.advance(Duration::from_millis(1)),
            FrameStep::Tick { skipped: 0 }
        );
        assert_eq!(scheduler.frame_counter(), 1);
    }

    #[test]
    fn remainder_carries_into_next_tick() {
        let mut scheduler = ready_scheduler(30);

        assert_eq!(
            scheduler.advance(Duration::from_millis(50)),
            FrameStep::Tick { skipped: 0 }
        );
        // 20ms carried over, 11 more exceeds the interval.
        assert_eq!(
            scheduler.advance(Duration::from_millis(11)),
            FrameStep::Tick { skipped: 0 }
        );
        assert_eq!(scheduler.frame_counter(), 2);
    }

    #[test]
    fn stalled_frame_runs_one_tick_and_skips_the_rest() {
        let mut scheduler = ready_scheduler(30);

        assert_eq!(
            scheduler.advance(Duration::from_millis(100)),
            FrameStep::Tick { skipped: 2 }
        );
        assert_eq!(scheduler.frame_counter(), 1);
        assert_eq!(scheduler.advance(Duration::from_millis(15)), FrameStep::Idle);
    }

    #[test]
    fn nothing_runs_before_ready() {
        let mut scheduler = FrameScheduler::new(Duration::from_millis(30));

        assert_eq!(scheduler.advance(Duration::from_millis(500)), FrameStep::Idle);
        assert_eq!(scheduler.frame_counter(), 0);

        scheduler.mark_ready();
        assert!(matches!(
            scheduler.advance(Duration::ZERO),
            FrameStep::Tick { .. }
        ));
    }

    #[test]
    fn paused_intervals_do_not_advance_frame_counter() {
        let mut scheduler = ready_scheduler(30);
        scheduler.set_paused(true);

        assert_eq!(scheduler.advance(Duration::from_millis(31)), FrameStep::Paused);
        assert_eq!(scheduler.advance(Duration::from_millis(31)), FrameStep::Paused);
        assert_eq!(scheduler.frame_counter(), 0);

        scheduler.set_paused(false);
        assert_eq!(
            scheduler.advance(Duration::from_millis(31)),
            FrameStep::Tick { skipped: 0 }
        );
        assert_eq!(scheduler.frame_counter(), 1);
    }

    #[test]
    fn tick_rate_maps_to_interval() {
        let scheduler = FrameScheduler::from_tick_rate(30);
        assert!((scheduler.interval().as_secs_f64() - 1.0 / 30.0).abs() < 1e-9);

        let clamped = FrameScheduler::from_tick_rate(0);
        assert_eq!(clamped.interval(), Duration::from_secs(1));
    }
}
