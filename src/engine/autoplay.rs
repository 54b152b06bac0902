// AutoPlayer - scripted player for replays and end-to-end tests
//
// Builds a time-ordered input script from a chart: a press at each note
// (shifted by a fixed offset) and a release at the hold end, or a short tap
// release for other kinds. Every n-th note can be skipped to exercise the
// miss path. `replay` then drives a PlaySession with a simulated transport,
// feeding script events into the queue as the clock passes them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audio::{InputEvent, DEFAULT_INPUT_CAPACITY};
use crate::chart::NoteChart;
use crate::config::JudgementConfig;
use crate::judgement::SessionStats;
use crate::telemetry;

use super::PlaySession;

/// Release delay for non-hold notes
const TAP_RELEASE_SECONDS: f64 = 0.05;
/// Extra time simulated after the last note so every note resolves
const TAIL_SECONDS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoPlayer {
    /// Added to every press and release time (positive = late)
    pub offset_seconds: f64,
    /// Skip every n-th note (1-based); 0 disables skipping
    pub skip_every: usize,
}

impl Default for AutoPlayer {
    fn default() -> Self {
        Self {
            offset_seconds: 0.0,
            skip_every: 0,
        }
    }
}

impl AutoPlayer {
    /// Input script for `chart`, sorted by timestamp
    ///
    /// Taps that land while a hold is down in the same lane get no release,
    /// since releasing would end the hold early.
    pub fn script(&self, chart: &NoteChart) -> Vec<InputEvent> {
        let mut events = Vec::with_capacity(chart.len() * 2);
        let mut held_until = vec![f64::NEG_INFINITY; chart.lane_count()];
        for (index, note) in chart.notes().iter().enumerate() {
            if self.skip_every > 0 && (index + 1) % self.skip_every == 0 {
                continue;
            }
            let press = note.time + self.offset_seconds;
            events.push(InputEvent::press(note.lane, press));

            let release = match note.end_time() {
                Some(end) => {
                    let release = end + self.offset_seconds;
                    held_until[note.lane] = held_until[note.lane].max(release);
                    release
                }
                None if press + TAP_RELEASE_SECONDS < held_until[note.lane] => continue,
                None => press + TAP_RELEASE_SECONDS,
            };
            events.push(InputEvent::release(note.lane, release));
        }
        events.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        events
    }
}

/// Play `chart` start to finish with `player`, ticking at `tick_hz`
///
/// # Returns
/// Final session statistics
pub fn replay(
    chart: Arc<NoteChart>,
    config: JudgementConfig,
    player: &AutoPlayer,
    sample_rate: u32,
    tick_hz: u32,
) -> SessionStats {
    let script = player.script(&chart);
    let end_time = chart.last_time() + config.miss_delay + TAIL_SECONDS;
    let (mut session, mut sender) =
        PlaySession::with_queue(chart, config, sample_rate, DEFAULT_INPUT_CAPACITY);

    let frames_per_tick = (u64::from(sample_rate.max(1)) / u64::from(tick_hz.max(1))).max(1);
    let mut cursor = 0;
    let mut ticks = 0_u64;

    while session.clock().elapsed_seconds() < end_time {
        session.clock().advance(frames_per_tick);
        let now = session.clock().elapsed_seconds();

        while let Some(event) = script.get(cursor) {
            if event.timestamp > now {
                break;
            }
            if !sender.push(*event) {
                telemetry::hub().record_input_dropped(event.lane);
            }
            cursor += 1;
        }

        session.step();
        ticks += 1;
    }

    let stats = session.stats();
    tracing::info!(
        "[Autoplay] {} ticks, score={} max_combo={} resolved={}/{}",
        ticks,
        stats.score,
        stats.max_combo,
        stats.resolved,
        stats.total_notes
    );
    stats
}
