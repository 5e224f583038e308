use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub paused_frames: u32,
    pub skipped_ticks: u32,
}

#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    ticks: u32,
    paused_frames: u32,
    skipped_ticks: u32,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval_start: now,
            interval,
            frames: 0,
            ticks: 0,
            paused_frames: 0,
            skipped_ticks: 0,
        }
    }

    pub(crate) fn record_frame(&mut self) {
        self.frames = self.frames.saturating_add(1);
    }

    pub(crate) fn record_tick(&mut self, skipped: u32) {
        self.ticks = self.ticks.saturating_add(1);
        self.skipped_ticks = self.skipped_ticks.saturating_add(skipped);
    }

    pub(crate) fn record_paused_frame(&mut self) {
        self.paused_frames = self.paused_frames.saturating_add(1);
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            tps: self.ticks as f32 / elapsed_seconds,
            paused_frames: self.paused_frames,
            skipped_ticks: self.skipped_ticks,
        };

        self.interval_start = now;
        self.frames = 0;
        self.ticks = 0;
        self.paused_frames = 0;
        self.skipped_ticks = 0;

        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_snapshot_before_interval_elapses() {
        let start = Instant::now();
        let mut metrics = MetricsAccumulator::new(Duration::from_secs(1), start);
        metrics.record_frame();
        metrics.record_tick(0);

        assert!(metrics
            .maybe_snapshot(start + Duration::from_millis(500))
            .is_none());
    }

    #[test]
    fn snapshot_reports_rates_and_resets() {
        let start = Instant::now();
        let mut metrics = MetricsAccumulator::new(Duration::from_secs(1), start);
        for _ in 0..60 {
            metrics.record_frame();
        }
        for _ in 0..30 {
            metrics.record_tick(0);
        }
        metrics.record_tick(3);
        metrics.record_paused_frame();

        let snapshot = metrics
            .maybe_snapshot(start + Duration::from_secs(1))
            .expect("snapshot");
        assert!((snapshot.fps - 60.0).abs() < 0.01);
        assert!((snapshot.tps - 31.0).abs() < 0.01);
        assert_eq!(snapshot.paused_frames, 1);
        assert_eq!(snapshot.skipped_ticks, 3);

        let next = metrics
            .maybe_snapshot(start + Duration::from_secs(2))
            .expect("second snapshot");
        assert_eq!(next, LoopMetricsSnapshot::default());
    }
}
