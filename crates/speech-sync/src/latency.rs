use std::time::{Duration, Instant};

use crate::types::TtftSnapshot;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TtftMetrics {
    pub submission_time: Option<Instant>,
    pub first_fragment_time: Option<Instant>,
    pub ttft: Option<Duration>,
    pub is_tracking: bool,
}

impl TtftMetrics {
    pub fn snapshot(&self) -> TtftSnapshot {
        TtftSnapshot {
            ttft_ms: self.ttft.map(|d| d.as_nanos() as f64 / 1_000_000.0),
            is_tracking: self.is_tracking,
        }
    }
}

/// Time-to-first-fragment measurement, once per request cycle.
///
/// Callers are expected to report every incoming fragment; only the first
/// one after [`start_timer`](Self::start_timer) is recorded.
#[derive(Debug, Default)]
pub struct LatencyTracker {
    metrics: TtftMetrics,
}

impl LatencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> &TtftMetrics {
        &self.metrics
    }

    pub fn ttft(&self) -> Option<Duration> {
        self.metrics.ttft
    }

    pub fn start_timer(&mut self, now: Instant) {
        self.metrics = TtftMetrics {
            submission_time: Some(now),
            first_fragment_time: None,
            ttft: None,
            is_tracking: true,
        };
    }

    /// Returns the latency only when this call captured it. Repeated calls,
    /// and calls without a running timer, return `None` and change nothing.
    pub fn capture_first_fragment(&mut self, now: Instant) -> Option<Duration> {
        if !self.metrics.is_tracking || self.metrics.first_fragment_time.is_some() {
            return None;
        }
        let submitted = self.metrics.submission_time?;
        let ttft = now.saturating_duration_since(submitted);

        self.metrics.first_fragment_time = Some(now);
        self.metrics.ttft = Some(ttft);
        self.metrics.is_tracking = false;

        tracing::debug!(ttft_ms = ttft.as_millis() as u64, "first_fragment_captured");
        Some(ttft)
    }

    pub fn reset(&mut self) {
        self.metrics = TtftMetrics::default();
    }
}
