//! Frame timing with a smoothed frame-time metric.
//!
//! Frame deltas are accumulated into a reporting window. Once the window
//! holds at least [`REPORT_WINDOW_MS`] of frame time, the average delta and
//! the matching frames-per-second are published and the window starts over.
//! This keeps the displayed numbers steady instead of jittering every frame.

use std::fmt;
use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Accumulated frame time, in milliseconds, that triggers a report.
pub const REPORT_WINDOW_MS: f64 = 500.0;

/// Smoothed timing metric published once per reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameStats {
    pub average_delta_ms: f64,
    pub average_fps: f64,
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1} ms ({:.2} FPS)",
            self.average_delta_ms, self.average_fps
        )
    }
}

/// Result of a single timer tick after the first frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    pub delta_ms: f64,
    pub report: Option<FrameStats>,
}

/// Per-frame timing state. Owned by the animation loop.
#[derive(Debug, Clone, Default)]
pub struct FrameTimer {
    last_timestamp: Option<f64>,
    accumulated_time: f64,
    frame_count: u32,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a frame at `timestamp_ms`.
    ///
    /// Returns `None` on the first frame, because there is nothing to diff
    /// against yet. Also returns `None` when the clock produced an unusable
    /// delta. In that case the reporting window is discarded.
    pub fn tick(&mut self, timestamp_ms: f64) -> Option<FrameTick> {
        let last = self.last_timestamp.replace(timestamp_ms)?;

        if !self.accumulated_time.is_finite() {
            debug!("frame timer accumulator corrupted; resetting window");
            self.reset_window();
        }

        let delta_ms = timestamp_ms - last;
        if !delta_ms.is_finite() || delta_ms < 0.0 {
            debug!("discarding invalid frame delta {delta_ms}");
            self.reset_window();
            return None;
        }

        self.accumulated_time += delta_ms;
        self.frame_count = self.frame_count.saturating_add(1);

        let report = if self.accumulated_time >= REPORT_WINDOW_MS {
            let average_delta_ms = self.accumulated_time / f64::from(self.frame_count);
            let stats = FrameStats {
                average_delta_ms,
                average_fps: 1000.0 / average_delta_ms,
            };
            self.reset_window();
            Some(stats)
        } else {
            None
        };

        Some(FrameTick { delta_ms, report })
    }

    pub fn accumulated_time(&self) -> f64 {
        self.accumulated_time
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }

    fn reset_window(&mut self) {
        self.accumulated_time = 0.0;
        self.frame_count = 0;
    }

    #[cfg(test)]
    pub(crate) fn corrupt_accumulator(&mut self) {
        self.accumulated_time = f64::NAN;
    }

    #[cfg(test)]
    pub(crate) fn set_frame_count(&mut self, frame_count: u32) {
        self.frame_count = frame_count;
    }
}

/// Receiver for published frame statistics.
pub trait MetricsSink {
    fn publish(&mut self, stats: &FrameStats);
}

impl MetricsSink for Vec<FrameStats> {
    fn publish(&mut self, stats: &FrameStats) {
        self.push(*stats);
    }
}

/// Shared text slot holding the latest formatted report.
#[derive(Debug, Default)]
pub struct MetricsDisplay {
    text: Arc<RwLock<Option<String>>>,
}

impl Clone for MetricsDisplay {
    fn clone(&self) -> Self {
        Self {
            text: Arc::clone(&self.text),
        }
    }
}

impl MetricsDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the latest text if it changed since the previous call.
    pub fn take(&self) -> Option<String> {
        self.text.write().take()
    }
}

impl MetricsSink for MetricsDisplay {
    fn publish(&mut self, stats: &FrameStats) {
        *self.text.write() = Some(stats.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(timer: &mut FrameTimer, timestamps: &[f64]) -> Vec<FrameStats> {
        timestamps
            .iter()
            .filter_map(|&t| timer.tick(t))
            .filter_map(|tick| tick.report)
            .collect()
    }

    #[test]
    fn first_frame_only_records_timestamp() {
        let mut timer = FrameTimer::new();
        assert_eq!(timer.tick(1234.0), None);
        assert_eq!(timer.last_timestamp(), Some(1234.0));
        assert_eq!(timer.accumulated_time(), 0.0);
        assert_eq!(timer.frame_count(), 0);
    }

    #[test]
    fn accumulates_sum_of_deltas_before_flush() {
        let mut timer = FrameTimer::new();
        let reports = run(&mut timer, &[0.0, 10.0, 35.0, 100.0, 101.5]);
        assert!(reports.is_empty());
        assert_eq!(timer.accumulated_time(), 101.5);
        assert_eq!(timer.frame_count(), 4);
    }

    #[test]
    fn no_report_below_window() {
        let mut timer = FrameTimer::new();
        let timestamps: Vec<f64> = (0..=31).map(|i| f64::from(i) * 16.0).collect();
        // 31 deltas of 16 ms = 496 ms
        assert!(run(&mut timer, &timestamps).is_empty());
        assert_eq!(timer.frame_count(), 31);
    }

    #[test]
    fn flush_publishes_average_and_resets() {
        let mut timer = FrameTimer::new();
        let timestamps: Vec<f64> = (0..=32).map(|i| f64::from(i) * 16.0).collect();
        let reports = run(&mut timer, &timestamps);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].average_delta_ms, 16.0);
        assert_eq!(reports[0].average_fps, 1000.0 / (512.0 / 32.0));
        assert_eq!(timer.accumulated_time(), 0.0);
        assert_eq!(timer.frame_count(), 0);
    }

    #[test]
    fn reports_uneven_frames_as_mean() {
        let mut timer = FrameTimer::new();
        let reports = run(&mut timer, &[0.0, 100.0, 400.0, 600.0]);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].average_delta_ms, 200.0);
        assert_eq!(reports[0].average_fps, 5.0);
    }

    #[test]
    fn single_long_frame_reports_immediately() {
        let mut timer = FrameTimer::new();
        let reports = run(&mut timer, &[0.0, 750.0]);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].average_delta_ms, 750.0);
    }

    #[test]
    fn corrupted_accumulator_is_reset() {
        let mut timer = FrameTimer::new();
        run(&mut timer, &[0.0, 16.0, 32.0]);
        timer.corrupt_accumulator();
        let tick = timer.tick(48.0).unwrap();
        assert_eq!(tick.delta_ms, 16.0);
        assert_eq!(timer.accumulated_time(), 16.0);
        assert_eq!(timer.frame_count(), 1);
    }

    #[test]
    fn invalid_delta_discards_window() {
        let mut timer = FrameTimer::new();
        run(&mut timer, &[0.0, 16.0, 32.0]);
        assert_eq!(timer.tick(f64::NAN), None);
        assert_eq!(timer.accumulated_time(), 0.0);
        assert_eq!(timer.frame_count(), 0);
        // the next frame diffs against the NaN timestamp and is dropped too
        assert_eq!(timer.tick(48.0), None);
        let tick = timer.tick(64.0).unwrap();
        assert_eq!(tick.delta_ms, 16.0);
    }

    #[test]
    fn backwards_clock_is_not_accumulated() {
        let mut timer = FrameTimer::new();
        run(&mut timer, &[100.0, 116.0]);
        assert_eq!(timer.tick(50.0), None);
        assert_eq!(timer.accumulated_time(), 0.0);
        let tick = timer.tick(66.0).unwrap();
        assert_eq!(tick.delta_ms, 16.0);
    }

    #[test]
    fn stats_display_uses_one_and_two_decimals() {
        let stats = FrameStats {
            average_delta_ms: 16.6667,
            average_fps: 59.99988,
        };
        assert_eq!(stats.to_string(), "16.7 ms (60.00 FPS)");
    }

    #[test]
    fn vec_sink_records_every_report() {
        let mut sink: Vec<FrameStats> = Vec::new();
        let mut timer = FrameTimer::new();
        for tick in (0..=100).filter_map(|i| timer.tick(f64::from(i) * 10.0)) {
            if let Some(stats) = tick.report {
                sink.publish(&stats);
            }
        }
        assert_eq!(sink.len(), 2);
        assert!(sink.iter().all(|stats| stats.average_delta_ms == 10.0));
    }

    #[test]
    fn display_sink_hands_out_latest_text_once() {
        let display = MetricsDisplay::new();
        let mut sink = display.clone();
        sink.publish(&FrameStats {
            average_delta_ms: 20.0,
            average_fps: 50.0,
        });
        assert_eq!(display.take().as_deref(), Some("20.0 ms (50.00 FPS)"));
        assert_eq!(display.take(), None);
    }

    #[test]
    fn stalled_clock_saturates_frame_count() {
        let mut timer = FrameTimer::new();
        timer.tick(100.0);
        timer.set_frame_count(u32::MAX - 1);
        for _ in 0..3 {
            let tick = timer.tick(100.0).unwrap();
            assert_eq!(tick.delta_ms, 0.0);
            assert!(tick.report.is_none());
        }
        assert_eq!(timer.frame_count(), u32::MAX);
        let report = timer.tick(600.0).unwrap().report.unwrap();
        assert!(report.average_delta_ms > 0.0);
        assert_eq!(timer.frame_count(), 0);
    }
}
