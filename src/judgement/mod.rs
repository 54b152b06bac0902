// Judgement engine - real-time matching of player input against a chart
//
// Architecture:
// - The chart is shared and immutable (Arc<NoteChart>)
// - Resolution state lives in an arena parallel to the chart's note slice
// - Per-lane index lists with a cursor past already-resolved notes
// - A global expiry cursor walks notes in time order for the miss sweep
// - Notes in the Holding state are tracked separately until release/overrun
//
// Note lifecycle:
// - Tap notes (normal / flick / slide): Pending → Hit(grade) | Missed
// - Hold notes: Pending → Holding → Hit(grade) | Missed(EarlyRelease)
//   | Missed(HoldOverrun), or Pending → Missed(Expired)
//
// Every terminal transition is guarded by a state check, so no note is ever
// scored twice. Nothing here can fail: unknown lanes and stale input are
// ignored.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::chart::{NoteChart, NoteId};
use crate::config::JudgementConfig;

pub mod session;
pub mod windows;

pub use session::{GameSession, GradeCounts, SessionStats};
pub use windows::Grade;

/// Why a note was missed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissCause {
    /// No press arrived before the miss delay elapsed
    Expired,
    /// Hold released more than the good window before its end
    EarlyRelease,
    /// Hold never released near its end
    HoldOverrun,
}

/// Per-note resolution state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteState {
    Pending,
    /// Hold note pressed, waiting for release
    Holding,
    Hit(Grade),
    Missed(MissCause),
}

impl NoteState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, NoteState::Hit(_) | NoteState::Missed(_))
    }
}

/// One scored resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JudgementOutcome {
    pub note_id: NoteId,
    pub lane: usize,
    pub grade: Grade,
    /// Set for misses only
    pub cause: Option<MissCause>,
    /// Input time minus target time; `None` for misses without input
    pub timing_error: Option<f64>,
    pub score_delta: u32,
    pub combo: u32,
    /// Session score after this outcome
    pub score: u64,
}

/// Hold press accepted; not scored until release
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldStart {
    pub note_id: NoteId,
    pub lane: usize,
    pub timing_error: f64,
    /// Feedback tier shown for the press itself
    pub effect: Grade,
}

/// Result of a press event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressOutcome {
    Hit(JudgementOutcome),
    HoldStarted(HoldStart),
    /// No pending note within the good window, or unknown lane
    Ignored,
}

#[derive(Debug, Clone, Default)]
struct LaneState {
    /// Chart indices of notes in this lane, time-ascending
    notes: Vec<usize>,
    /// First entry that may still be pending or holding
    cursor: usize,
}

pub struct JudgementEngine {
    chart: Arc<NoteChart>,
    config: JudgementConfig,
    states: Vec<NoteState>,
    lanes: Vec<LaneState>,
    holding: Vec<usize>,
    expiry_cursor: usize,
    session: GameSession,
}

impl JudgementEngine {
    /// Create an engine with every note pending
    ///
    /// # Arguments
    /// * `chart` - Shared chart; reused across `reset()` calls
    /// * `config` - Judgement windows and miss delay
    pub fn new(chart: Arc<NoteChart>, config: JudgementConfig) -> Self {
        let mut lanes = vec![LaneState::default(); chart.lane_count()];
        for (index, note) in chart.notes().iter().enumerate() {
            if let Some(lane) = lanes.get_mut(note.lane) {
                lane.notes.push(index);
            }
        }

        tracing::debug!(
            "[Judgement] Engine ready: {} notes across {} lanes",
            chart.len(),
            chart.lane_count()
        );

        Self {
            states: vec![NoteState::Pending; chart.len()],
            chart,
            config,
            lanes,
            holding: Vec::new(),
            expiry_cursor: 0,
            session: GameSession::new(),
        }
    }

    pub fn chart(&self) -> &Arc<NoteChart> {
        &self.chart
    }

    pub fn config(&self) -> &JudgementConfig {
        &self.config
    }

    /// Resolution state of the note at chart index `index`
    pub fn note_state(&self, index: usize) -> Option<NoteState> {
        self.states.get(index).copied()
    }

    /// Handle a press in `lane` at playback time `time`
    pub fn on_press(&mut self, lane: usize, time: f64) -> PressOutcome {
        let Some(index) = self.closest_pending(lane, time) else {
            return PressOutcome::Ignored;
        };

        let note = self.chart.notes()[index];
        let offset = time - note.time;

        if note.kind.is_hold() {
            self.states[index] = NoteState::Holding;
            self.holding.push(index);
            tracing::trace!(
                "[Judgement] Hold {} started (offset {:+.3}s)",
                note.id,
                offset
            );
            return PressOutcome::HoldStarted(HoldStart {
                note_id: note.id,
                lane: note.lane,
                timing_error: offset,
                effect: Grade::Perfect,
            });
        }

        match Grade::classify(offset, &self.config) {
            Some(grade) => match self.resolve(index, grade, None, Some(offset)) {
                Some(outcome) => PressOutcome::Hit(outcome),
                None => PressOutcome::Ignored,
            },
            None => PressOutcome::Ignored,
        }
    }

    /// Handle a release in `lane` at playback time `time`
    ///
    /// Late releases beyond the good window leave the hold in place; the
    /// expiry sweep resolves it as an overrun.
    pub fn on_release(&mut self, lane: usize, time: f64) -> Vec<JudgementOutcome> {
        let mut outcomes = Vec::new();
        let mut index = 0;
        while index < self.holding.len() {
            let note_index = self.holding[index];
            let note = self.chart.notes()[note_index];
            if note.lane != lane {
                index += 1;
                continue;
            }

            let end = note.end_time().unwrap_or(note.time);
            let offset = time - end;
            let resolved = if time < end - self.config.good_window {
                self.resolve(
                    note_index,
                    Grade::Miss,
                    Some(MissCause::EarlyRelease),
                    Some(offset),
                )
            } else if let Some(grade) = Grade::classify(offset, &self.config) {
                self.resolve(note_index, grade, None, Some(offset))
            } else {
                index += 1;
                continue;
            };

            self.holding.swap_remove(index);
            outcomes.extend(resolved);
        }
        outcomes
    }

    /// Miss sweep at playback time `now`
    ///
    /// Pending notes older than the miss delay expire; holding notes whose
    /// end passed more than the miss delay ago overrun. Repeating a call
    /// with the same `now` produces nothing new.
    pub fn tick(&mut self, now: f64) -> Vec<JudgementOutcome> {
        let mut outcomes = Vec::new();
        let delay = self.config.miss_delay;

        while let Some(note) = self.chart.notes().get(self.expiry_cursor).copied() {
            if now - note.time <= delay {
                break;
            }
            if self.states[self.expiry_cursor] == NoteState::Pending {
                outcomes.extend(self.resolve(
                    self.expiry_cursor,
                    Grade::Miss,
                    Some(MissCause::Expired),
                    None,
                ));
            }
            self.expiry_cursor += 1;
        }

        let mut index = 0;
        while index < self.holding.len() {
            let note_index = self.holding[index];
            let note = self.chart.notes()[note_index];
            let end = note.end_time().unwrap_or(note.time);
            if now - end > delay {
                self.holding.swap_remove(index);
                outcomes.extend(self.resolve(
                    note_index,
                    Grade::Miss,
                    Some(MissCause::HoldOverrun),
                    None,
                ));
            } else {
                index += 1;
            }
        }

        outcomes
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            score: self.session.score(),
            combo: self.session.combo(),
            max_combo: self.session.max_combo(),
            counts: self.session.counts(),
            resolved: self.session.resolved(),
            total_notes: self.chart.len() as u32,
        }
    }

    /// Restart against the same chart
    pub fn reset(&mut self) {
        self.states.fill(NoteState::Pending);
        for lane in &mut self.lanes {
            lane.cursor = 0;
        }
        self.holding.clear();
        self.expiry_cursor = 0;
        self.session = GameSession::new();
        tracing::debug!("[Judgement] Session reset ({} notes)", self.chart.len());
    }

    /// Pending note in `lane` nearest to `time` within the good window
    fn closest_pending(&mut self, lane: usize, time: f64) -> Option<usize> {
        let notes = self.chart.notes();
        let window = self.config.good_window;
        let states = &self.states;
        let lane_state = self.lanes.get_mut(lane)?;

        while let Some(&index) = lane_state.notes.get(lane_state.cursor) {
            if states[index].is_terminal() {
                lane_state.cursor += 1;
            } else {
                break;
            }
        }

        let mut best: Option<(usize, f64)> = None;
        for &index in &lane_state.notes[lane_state.cursor..] {
            let delta = notes[index].time - time;
            if delta > window {
                break;
            }
            if states[index] != NoteState::Pending || delta.abs() > window {
                continue;
            }
            match best {
                Some((_, best_delta)) if best_delta <= delta.abs() => {}
                _ => best = Some((index, delta.abs())),
            }
        }
        best.map(|(index, _)| index)
    }

    /// Move a note to its terminal state and score it; `None` if already terminal
    fn resolve(
        &mut self,
        index: usize,
        grade: Grade,
        cause: Option<MissCause>,
        timing_error: Option<f64>,
    ) -> Option<JudgementOutcome> {
        let state = self.states.get_mut(index)?;
        if state.is_terminal() {
            return None;
        }
        *state = match cause {
            Some(cause) => NoteState::Missed(cause),
            None => NoteState::Hit(grade),
        };

        let note = self.chart.notes()[index];
        let (score_delta, combo) = self.session.apply(grade);
        tracing::trace!(
            "[Judgement] {} lane {} → {} (combo {})",
            note.id,
            note.lane,
            grade,
            combo
        );

        Some(JudgementOutcome {
            note_id: note.id,
            lane: note.lane,
            grade,
            cause,
            timing_error,
            score_delta,
            combo,
            score: self.session.score(),
        })
    }
}
