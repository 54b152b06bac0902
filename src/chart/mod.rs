//! Chart model and generation
//!
//! A [`NoteChart`] is the immutable, time-ordered note sequence built once
//! from the onset peaks before play starts. Judgement state is not stored
//! here; the judgement engine keeps its own per-note arena so the chart can be
//! shared behind an `Arc` and reused across restarts.
//!
//! Serialized form (JSON):
//! ```json
//! {"laneCount": 4, "notes": [
//!   {"id": 0, "time": 1.25, "lane": 2, "kind": "normal"},
//!   {"id": 1, "time": 1.90, "lane": 0, "kind": "hold", "duration": 0.8},
//!   {"id": 2, "time": 2.40, "lane": 3, "kind": "flick", "direction": "left"},
//!   {"id": 3, "time": 2.95, "lane": 1, "kind": "slide", "targetLane": 2}
//! ]}
//! ```

use std::collections::HashSet;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::analysis::{self, AudioInput};
use crate::config::{AppConfig, DifficultyProfile};
use crate::error::{log_chart_error, ChartError};
use crate::telemetry;

pub mod density;
pub mod generator;

pub use generator::{ChartGenerator, GenerationReport};

/// Unique note identifier, assigned in generation order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NoteId(pub u32);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Direction a flick note asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlickDirection {
    Left,
    Right,
}

/// Note kind with its kind-specific payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoteKind {
    Normal,
    /// Press at `time`, release at `time + duration`
    Hold { duration: f64 },
    Flick { direction: FlickDirection },
    /// Occupies both `lane` and `target_lane`
    Slide {
        #[serde(rename = "targetLane")]
        target_lane: usize,
    },
}

impl NoteKind {
    pub fn is_hold(&self) -> bool {
        matches!(self, NoteKind::Hold { .. })
    }
}

/// One note of a chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Seconds from the start of playback
    pub time: f64,
    pub lane: usize,
    #[serde(flatten)]
    pub kind: NoteKind,
}

impl Note {
    /// Hold end time, or `None` for non-hold notes
    pub fn end_time(&self) -> Option<f64> {
        match self.kind {
            NoteKind::Hold { duration } => Some(self.time + duration),
            _ => None,
        }
    }

    /// Whether this note blocks `lane` (its own lane or a slide target)
    pub fn occupies(&self, lane: usize) -> bool {
        self.lane == lane
            || matches!(self.kind, NoteKind::Slide { target_lane } if target_lane == lane)
    }
}

/// Immutable, time-ascending note sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ChartDocument")]
pub struct NoteChart {
    lane_count: usize,
    notes: Vec<Note>,
}

/// Unvalidated wire form of a chart
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartDocument {
    lane_count: usize,
    notes: Vec<Note>,
}

impl TryFrom<ChartDocument> for NoteChart {
    type Error = ChartError;

    fn try_from(doc: ChartDocument) -> Result<Self, Self::Error> {
        if doc.lane_count == 0 {
            return Err(ChartError::InvalidLaneCount {
                lane_count: doc.lane_count,
            });
        }

        let mut seen = HashSet::with_capacity(doc.notes.len());
        let mut previous_time = f64::NEG_INFINITY;
        for note in &doc.notes {
            if !note.time.is_finite() || note.time < previous_time {
                return Err(malformed(format!("note {} breaks time ordering", note.id)));
            }
            previous_time = note.time;

            if note.lane >= doc.lane_count {
                return Err(malformed(format!(
                    "note {} lane {} outside 0..{}",
                    note.id, note.lane, doc.lane_count
                )));
            }
            match note.kind {
                NoteKind::Slide { target_lane } if target_lane >= doc.lane_count => {
                    return Err(malformed(format!(
                        "note {} slide target {} outside 0..{}",
                        note.id, target_lane, doc.lane_count
                    )));
                }
                NoteKind::Hold { duration } if !(duration.is_finite() && duration > 0.0) => {
                    return Err(malformed(format!(
                        "note {} hold duration {} must be positive",
                        note.id, duration
                    )));
                }
                _ => {}
            }
            if !seen.insert(note.id) {
                return Err(malformed(format!("duplicate note id {}", note.id)));
            }
        }

        Ok(Self {
            lane_count: doc.lane_count,
            notes: doc.notes,
        })
    }
}

fn malformed(reason: String) -> ChartError {
    ChartError::MalformedChart { reason }
}

impl NoteChart {
    /// Build a chart, ordering notes by time
    ///
    /// The sort is stable so notes that share a timestamp keep their
    /// generation order.
    pub(crate) fn from_notes(lane_count: usize, mut notes: Vec<Note>) -> Self {
        notes.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { lane_count, notes }
    }

    /// A chart without notes; valid and playable
    pub fn empty(lane_count: usize) -> Self {
        Self {
            lane_count,
            notes: Vec::new(),
        }
    }

    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Time of the last note end (hold ends included), 0 for an empty chart
    pub fn last_time(&self) -> f64 {
        self.notes
            .iter()
            .map(|n| n.end_time().unwrap_or(n.time))
            .fold(0.0, f64::max)
    }

    pub fn to_json(&self) -> Result<String, ChartError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ChartError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a chart document
    pub fn from_json(json: &str) -> Result<Self, ChartError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Chart plus the bookkeeping of how it was built
#[derive(Debug, Clone)]
pub struct GeneratedChart {
    pub chart: NoteChart,
    pub report: GenerationReport,
}

/// Run the full pipeline: samples → features → peaks → chart
///
/// # Errors
/// Only configuration errors (invalid profile, zero lanes, empty hold range).
/// Silent or very short audio produces an empty chart, not an error.
pub fn generate_chart<R: Rng>(
    input: &AudioInput,
    profile: &DifficultyProfile,
    config: &AppConfig,
    rng: R,
) -> Result<GeneratedChart, ChartError> {
    profile
        .validate()
        .and_then(|()| config.chart.validate())
        .inspect_err(|err| log_chart_error(err, "generate_chart"))?;

    let analysis = analysis::analyze(input, profile, &config.analysis);
    let mut generator = ChartGenerator::new(*profile, &config.chart, rng);
    let (chart, report) = generator.generate(&analysis.peaks, analysis.stats.mean_energy);

    tracing::info!(
        "[Chart] Generated {} notes from {} peaks (density drops={}, lane drops={}, holds={}, flicks={}, slides={})",
        report.placed,
        report.peaks,
        report.dropped_by_density,
        report.dropped_by_lanes,
        report.holds,
        report.flicks,
        report.slides
    );
    telemetry::hub().record_chart(&report);

    Ok(GeneratedChart { chart, report })
}
