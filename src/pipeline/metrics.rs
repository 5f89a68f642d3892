// src/pipeline/metrics.rs
//
// Counters for ticks, maneuvers and actuation. Handles are cheap clones,
// so a host thread can read them while the tick loop runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct ControllerMetrics {
    pub ticks: Arc<AtomicU64>,
    pub maneuvers_started: Arc<AtomicU64>,
    pub maneuvers_completed: Arc<AtomicU64>,
    pub maneuvers_aborted: Arc<AtomicU64>,
    pub indicator_pulses: Arc<AtomicU64>,
    pub takeovers: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl Default for ControllerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerMetrics {
    pub fn new() -> Self {
        Self {
            ticks: Arc::new(AtomicU64::new(0)),
            maneuvers_started: Arc::new(AtomicU64::new(0)),
            maneuvers_completed: Arc::new(AtomicU64::new(0)),
            maneuvers_aborted: Arc::new(AtomicU64::new(0)),
            indicator_pulses: Arc::new(AtomicU64::new(0)),
            takeovers: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            ticks: self.ticks.load(Ordering::Relaxed),
            maneuvers_started: self.maneuvers_started.load(Ordering::Relaxed),
            maneuvers_completed: self.maneuvers_completed.load(Ordering::Relaxed),
            maneuvers_aborted: self.maneuvers_aborted.load(Ordering::Relaxed),
            indicator_pulses: self.indicator_pulses.load(Ordering::Relaxed),
            takeovers: self.takeovers.load(Ordering::Relaxed),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub ticks: u64,
    pub maneuvers_started: u64,
    pub maneuvers_completed: u64,
    pub maneuvers_aborted: u64,
    pub indicator_pulses: u64,
    pub takeovers: u64,
    pub elapsed_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_counters() {
        let metrics = ControllerMetrics::new();
        let handle = metrics.clone();

        metrics.inc(&metrics.ticks);
        metrics.inc(&metrics.ticks);
        handle.inc(&handle.maneuvers_aborted);

        let summary = handle.summary();
        assert_eq!(summary.ticks, 2);
        assert_eq!(summary.maneuvers_aborted, 1);
        assert_eq!(summary.maneuvers_completed, 0);
    }
}
