//! Telemetry event types published to presentation-layer subscribers.

use serde::{Deserialize, Serialize};

use crate::judgement::{Grade, MissCause};

/// Play session lifecycle stages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Started,
    Paused,
    Resumed,
    Restarted,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum MetricEvent {
    ChartGenerated {
        peaks: usize,
        notes: usize,
        dropped_by_density: usize,
        dropped_by_lanes: usize,
    },
    Judgement {
        note_id: u32,
        lane: usize,
        grade: Grade,
        cause: Option<MissCause>,
        timing_error_ms: Option<f32>,
        combo: u32,
        score: u64,
    },
    /// Rolling absolute timing error over recent hits
    TimingAccuracy {
        avg_ms: f32,
        max_ms: f32,
        sample_count: usize,
    },
    QueueOccupancy { percent: f32 },
    InputDropped { lane: usize },
    Session {
        phase: SessionPhase,
        timestamp_ms: u64,
    },
}
