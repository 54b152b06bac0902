//! PlaySession: the per-tick loop tying clock, input queue and judgement.
//!
//! One `step()` is one scheduling tick (~60Hz in a real frontend):
//! 1. Snapshot the playback clock once
//! 2. Drain the input queue in arrival order; each event is judged at its
//!    own timestamp (events drained while paused are discarded)
//! 3. Run the miss sweep at the snapshot
//! 4. Publish outcomes and queue pressure to telemetry
//!
//! The session is the single consumer that owns the judgement engine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audio::{InputKind, InputQueue, InputReceiver, InputSender, PlaybackClock};
use crate::chart::NoteChart;
use crate::config::JudgementConfig;
use crate::judgement::{HoldStart, JudgementEngine, JudgementOutcome, PressOutcome, SessionStats};
use crate::telemetry::{self, SessionPhase, TelemetryHub};

pub mod autoplay;

pub use autoplay::{replay, AutoPlayer};

/// Everything one tick produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Clock snapshot in seconds
    pub now: f64,
    pub hold_starts: Vec<HoldStart>,
    pub outcomes: Vec<JudgementOutcome>,
    /// Events drained while paused
    pub discarded_inputs: usize,
}

pub struct PlaySession {
    engine: JudgementEngine,
    clock: PlaybackClock,
    inputs: InputReceiver,
    telemetry: &'static TelemetryHub,
}

impl PlaySession {
    /// Wire a session to an existing clock and input queue
    pub fn new(
        chart: Arc<NoteChart>,
        config: JudgementConfig,
        clock: PlaybackClock,
        inputs: InputReceiver,
    ) -> Self {
        let telemetry = telemetry::hub();
        telemetry.record_session(SessionPhase::Started);
        tracing::info!(
            "[PlaySession] Started: {} notes, {} lanes, {} Hz clock",
            chart.len(),
            chart.lane_count(),
            clock.sample_rate()
        );
        Self {
            engine: JudgementEngine::new(chart, config),
            clock,
            inputs,
            telemetry,
        }
    }

    /// Create a session with a fresh clock and queue
    ///
    /// # Returns
    /// The session plus the producer half for the input source
    pub fn with_queue(
        chart: Arc<NoteChart>,
        config: JudgementConfig,
        sample_rate: u32,
        queue_capacity: usize,
    ) -> (Self, InputSender) {
        let (sender, receiver) = InputQueue::new(queue_capacity);
        let clock = PlaybackClock::new(sample_rate);
        (Self::new(chart, config, clock, receiver), sender)
    }

    /// Shared handle for the transport to advance
    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn engine(&self) -> &JudgementEngine {
        &self.engine
    }

    pub fn stats(&self) -> SessionStats {
        self.engine.stats()
    }

    /// Run one scheduling tick
    pub fn step(&mut self) -> TickReport {
        let now = self.clock.elapsed_seconds();
        let paused = self.clock.is_paused();
        self.telemetry
            .record_queue_occupancy(self.inputs.occupancy_percent());

        let mut report = TickReport {
            now,
            ..TickReport::default()
        };

        let events = self.inputs.drain();
        if paused {
            report.discarded_inputs = events.len();
            if !events.is_empty() {
                tracing::debug!(
                    "[PlaySession] Discarded {} inputs while paused",
                    events.len()
                );
            }
            return report;
        }

        for event in events {
            match event.kind {
                InputKind::Press => match self.engine.on_press(event.lane, event.timestamp) {
                    PressOutcome::Hit(outcome) => report.outcomes.push(outcome),
                    PressOutcome::HoldStarted(start) => report.hold_starts.push(start),
                    PressOutcome::Ignored => {}
                },
                InputKind::Release => report
                    .outcomes
                    .extend(self.engine.on_release(event.lane, event.timestamp)),
            }
        }

        report.outcomes.extend(self.engine.tick(now));

        for outcome in &report.outcomes {
            self.telemetry.record_judgement(outcome);
        }

        report
    }

    pub fn pause(&self) {
        self.clock.pause();
        self.telemetry.record_session(SessionPhase::Paused);
    }

    pub fn resume(&self) {
        self.clock.resume();
        self.telemetry.record_session(SessionPhase::Resumed);
    }

    /// Discard session and resolution state, rewind the clock, keep the chart
    pub fn restart(&mut self) {
        let stale = self.inputs.drain().len();
        self.engine.reset();
        self.clock.reset();
        self.telemetry.record_session(SessionPhase::Restarted);
        tracing::info!("[PlaySession] Restarted ({} stale inputs dropped)", stale);
    }

    pub fn is_finished(&self) -> bool {
        self.engine.stats().is_complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::InputEvent;
    use crate::judgement::{Grade, MissCause};

    fn chart() -> Arc<NoteChart> {
        let json = r#"{"laneCount":4,"notes":[
            {"id":0,"time":1.0,"lane":0,"kind":"normal"},
            {"id":1,"time":2.0,"lane":1,"kind":"hold","duration":1.0},
            {"id":2,"time":4.0,"lane":2,"kind":"normal"}]}"#;
        Arc::new(NoteChart::from_json(json).unwrap())
    }

    fn session() -> (PlaySession, InputSender) {
        PlaySession::with_queue(chart(), JudgementConfig::default(), 1_000, 32)
    }

    #[test]
    fn test_step_applies_inputs_then_sweeps() {
        let (mut session, mut tx) = session();
        session.clock().advance(1_010);
        tx.push(InputEvent::press(0, 1.01));

        let report = session.step();
        assert!((report.now - 1.01).abs() < 1e-12);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].grade, Grade::Perfect);
        assert_eq!(session.stats().score, 100);
    }

    #[test]
    fn test_outcomes_in_one_tick_carry_running_score() {
        let chart = NoteChart::from_json(
            r#"{"laneCount":4,"notes":[
                {"id":0,"time":1.0,"lane":0,"kind":"normal"},
                {"id":1,"time":1.1,"lane":1,"kind":"normal"},
                {"id":2,"time":1.2,"lane":2,"kind":"normal"}]}"#,
        )
        .unwrap();
        let (mut session, mut tx) =
            PlaySession::with_queue(Arc::new(chart), JudgementConfig::default(), 1_000, 8);
        session.clock().advance(1_200);
        tx.push(InputEvent::press(0, 1.0));
        tx.push(InputEvent::press(1, 1.16));

        let report = session.step();
        let scores: Vec<u64> = report.outcomes.iter().map(|o| o.score).collect();
        assert_eq!(
            scores,
            vec![100, 170],
            "each outcome reports the score after it"
        );
        assert_eq!(session.stats().score, 170);
    }

    #[test]
    fn test_hold_lifecycle_across_ticks() {
        let (mut session, mut tx) = session();
        session.clock().advance(2_000);
        tx.push(InputEvent::press(1, 2.0));
        let report = session.step();
        assert_eq!(report.hold_starts.len(), 1);
        // The unpressed note at 1.0 expired in the same tick
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].cause, Some(MissCause::Expired));

        session.clock().advance(1_000);
        tx.push(InputEvent::release(1, 3.0));
        let report = session.step();
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].grade, Grade::Perfect);
    }

    #[test]
    fn test_paused_session_discards_inputs_and_freezes() {
        let (mut session, mut tx) = session();
        session.clock().advance(900);
        session.pause();
        session.clock().advance(5_000);
        tx.push(InputEvent::press(0, 1.0));

        let report = session.step();
        assert_eq!(report.discarded_inputs, 1);
        assert!(report.outcomes.is_empty());
        assert!((report.now - 0.9).abs() < 1e-12);

        session.resume();
        session.clock().advance(100);
        tx.push(InputEvent::press(0, 1.0));
        let report = session.step();
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].grade, Grade::Perfect);
    }

    #[test]
    fn test_restart_reuses_chart() {
        let (mut session, mut tx) = session();
        session.clock().advance(10_000);
        session.step();
        assert!(session.is_finished());

        tx.push(InputEvent::press(0, 9.0));
        session.restart();
        let stats = session.stats();
        assert_eq!(stats.resolved, 0);
        assert_eq!(stats.total_notes, 3);
        assert_eq!(session.clock().frames(), 0);
        assert!(session.step().outcomes.is_empty());
    }
}
