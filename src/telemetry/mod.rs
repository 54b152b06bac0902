//! Gameplay telemetry collector and helpers.
//!
//! The collector multiplexes chart-generation summaries, judgement outcomes,
//! timing accuracy and input-queue pressure into a bounded history plus a
//! broadcast stream that presentation layers subscribe to.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use once_cell::sync::Lazy;
use tokio::sync::broadcast;

use crate::chart::GenerationReport;
use crate::judgement::JudgementOutcome;

pub mod events;

pub use events::{MetricEvent, SessionPhase};

/// Global telemetry hub shared across the crate.
static HUB: Lazy<TelemetryHub> = Lazy::new(TelemetryHub::default);

/// Access the global telemetry hub.
pub fn hub() -> &'static TelemetryHub {
    &HUB
}

/// Snapshot of collector state for CLI reporting.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TelemetrySnapshot {
    pub recent: Vec<MetricEvent>,
    pub total_events: u64,
    pub dropped_events: u64,
}

/// Broadcast-based collector retaining a bounded history of metrics.
pub struct TelemetryCollector {
    tx: broadcast::Sender<MetricEvent>,
    history: Mutex<VecDeque<MetricEvent>>,
    history_capacity: usize,
    total_events: AtomicU64,
    dropped_history: AtomicU64,
}

impl TelemetryCollector {
    pub fn new(buffer: usize, history_capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer.max(1));
        Self {
            tx,
            history: Mutex::new(VecDeque::with_capacity(history_capacity)),
            history_capacity,
            total_events: AtomicU64::new(0),
            dropped_history: AtomicU64::new(0),
        }
    }

    pub fn publish(&self, event: MetricEvent) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        if self.history_capacity > 0 {
            let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
            if history.len() == self.history_capacity {
                history.pop_front();
                self.dropped_history.fetch_add(1, Ordering::Relaxed);
            }
            history.push_back(event.clone());
        }

        // No subscribers is not an error
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MetricEvent> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        let history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        TelemetrySnapshot {
            recent: history.iter().cloned().collect(),
            total_events: self.total_events.load(Ordering::Relaxed),
            dropped_events: self.dropped_history.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new(256, 64)
    }
}

/// Rolling window of absolute timing errors in milliseconds.
struct AccuracyTracker {
    samples: VecDeque<f32>,
    max_samples: usize,
}

impl AccuracyTracker {
    fn new(max_samples: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_samples),
            max_samples: max_samples.max(1),
        }
    }

    fn observe(&mut self, value: f32) -> (f32, f32, usize) {
        if self.samples.len() == self.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back(value.abs());

        let count = self.samples.len();
        let sum: f32 = self.samples.iter().copied().sum();
        let max = self
            .samples
            .iter()
            .copied()
            .fold(0.0_f32, |acc, next| acc.max(next));
        (sum / count as f32, max, count)
    }

    fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Top-level hub wrapping the collector plus derived gauges.
pub struct TelemetryHub {
    collector: TelemetryCollector,
    accuracy: Mutex<AccuracyTracker>,
    queue_gauge: Mutex<Option<f32>>,
}

impl TelemetryHub {
    pub fn new(channel_capacity: usize, history_capacity: usize, accuracy_window: usize) -> Self {
        Self {
            collector: TelemetryCollector::new(channel_capacity, history_capacity),
            accuracy: Mutex::new(AccuracyTracker::new(accuracy_window)),
            queue_gauge: Mutex::new(None),
        }
    }

    pub fn collector(&self) -> &TelemetryCollector {
        &self.collector
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MetricEvent> {
        self.collector.subscribe()
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.collector.snapshot()
    }

    pub fn record_chart(&self, report: &GenerationReport) {
        self.collector.publish(MetricEvent::ChartGenerated {
            peaks: report.peaks,
            notes: report.placed,
            dropped_by_density: report.dropped_by_density,
            dropped_by_lanes: report.dropped_by_lanes,
        });
    }

    /// Publish one outcome; hits with a timing error also update accuracy
    pub fn record_judgement(&self, outcome: &JudgementOutcome) {
        let timing_error_ms = outcome.timing_error.map(|e| (e * 1000.0) as f32);
        self.collector.publish(MetricEvent::Judgement {
            note_id: outcome.note_id.0,
            lane: outcome.lane,
            grade: outcome.grade,
            cause: outcome.cause,
            timing_error_ms,
            combo: outcome.combo,
            score: outcome.score,
        });

        let Some(error_ms) = timing_error_ms.filter(|_| outcome.grade.is_hit()) else {
            return;
        };
        let (avg, max, count) = {
            let mut tracker = self.accuracy.lock().unwrap_or_else(PoisonError::into_inner);
            tracker.observe(error_ms)
        };
        self.collector.publish(MetricEvent::TimingAccuracy {
            avg_ms: avg,
            max_ms: max,
            sample_count: count,
        });
    }

    /// Publish queue fill level, skipping changes under 2.5 points
    pub fn record_queue_occupancy(&self, percent: f32) {
        let normalized = percent.clamp(0.0, 100.0);
        let mut last = self
            .queue_gauge
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let should_emit = last
            .map(|previous| (previous - normalized).abs() >= 2.5)
            .unwrap_or(true);

        if should_emit {
            *last = Some(normalized);
            self.collector.publish(MetricEvent::QueueOccupancy {
                percent: normalized,
            });
        }
    }

    pub fn record_input_dropped(&self, lane: usize) {
        self.collector.publish(MetricEvent::InputDropped { lane });
    }

    pub fn record_session(&self, phase: SessionPhase) {
        if phase == SessionPhase::Restarted {
            self.accuracy
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }
        self.collector.publish(MetricEvent::Session {
            phase,
            timestamp_ms: now_timestamp_ms(),
        });
    }
}

impl Default for TelemetryHub {
    fn default() -> Self {
        Self::new(256, 64, 32)
    }
}

fn now_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
