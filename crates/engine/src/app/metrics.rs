use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    pub worst_frame_time_ms: f32,
    /// Frames whose wall time exceeded the pacing target.
    pub late_frames: u32,
}

#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Instant,
    interval: Duration,
    frame_budget: Option<Duration>,
    frames: u32,
    ticks: u32,
    late_frames: u32,
    frame_time_sum: Duration,
    worst_frame_time: Duration,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration, frame_budget: Option<Duration>, now: Instant) -> Self {
        Self {
            interval_start: now,
            interval,
            frame_budget,
            frames: 0,
            ticks: 0,
            late_frames: 0,
            frame_time_sum: Duration::ZERO,
            worst_frame_time: Duration::ZERO,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
        self.worst_frame_time = self.worst_frame_time.max(frame_dt);
        if self.frame_budget.is_some_and(|budget| frame_dt > budget) {
            self.late_frames = self.late_frames.saturating_add(1);
        }
    }

    pub(crate) fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = if self.frames == 0 {
            0.0
        } else {
            (self.frame_time_sum.as_secs_f32() / self.frames as f32) * 1000.0
        };

        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            tps: self.ticks as f32 / elapsed_seconds,
            frame_time_ms,
            worst_frame_time_ms: self.worst_frame_time.as_secs_f32() * 1000.0,
            late_frames: self.late_frames,
        };

        self.interval_start = now;
        self.frames = 0;
        self.ticks = 0;
        self.late_frames = 0;
        self.frame_time_sum = Duration::ZERO;
        self.worst_frame_time = Duration::ZERO;

        Some(snapshot)
    }
}
