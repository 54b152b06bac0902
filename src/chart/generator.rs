// ChartGenerator - turns onset peaks into a lane-assigned note chart
//
// For each peak, in time order:
// 1. Density cap: skip if the trailing window is already full
// 2. Lane choice: uniform over lanes not used by any note within the lane
//    clearance (slide targets count as used); skip if none is free
// 3. Special roll: loud peaks may become hold / flick / slide notes, each
//    with its own eligibility test; ineligible rolls fall back to normal
//
// All randomness comes from the injected RNG so charts are reproducible
// from a seed.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::analysis::onset::Peak;
use crate::chart::density::DensityWindow;
use crate::chart::{FlickDirection, Note, NoteChart, NoteId, NoteKind};
use crate::config::{ChartConfig, DifficultyProfile};

/// Probability band upper bounds for hold, flick and slide rolls
const HOLD_BAND: f64 = 0.25;
const FLICK_BAND: f64 = 0.5;
const SLIDE_BAND: f64 = 0.75;

/// Counts describing one generation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub peaks: usize,
    pub placed: usize,
    pub dropped_by_density: usize,
    pub dropped_by_lanes: usize,
    pub holds: usize,
    pub flicks: usize,
    pub slides: usize,
}

/// Lane-assigning chart generator with an injected random source
pub struct ChartGenerator<'a, R: Rng> {
    profile: DifficultyProfile,
    config: &'a ChartConfig,
    rng: R,
}

impl<'a, R: Rng> ChartGenerator<'a, R> {
    pub fn new(profile: DifficultyProfile, config: &'a ChartConfig, rng: R) -> Self {
        Self {
            profile,
            config,
            rng,
        }
    }

    /// Build a chart from peaks
    ///
    /// # Arguments
    /// * `peaks` - Accepted onsets; sorted here if the caller did not
    /// * `mean_energy` - Global mean frame energy of the song
    pub fn generate(
        &mut self,
        peaks: &[Peak],
        mean_energy: f32,
    ) -> (NoteChart, GenerationReport) {
        let mut ordered = peaks.to_vec();
        ordered.sort_by(|a, b| a.time.total_cmp(&b.time));

        let lane_count = self.config.lane_count;
        let mut report = GenerationReport {
            peaks: ordered.len(),
            ..GenerationReport::default()
        };
        let mut density = DensityWindow::new(
            self.config.density_window_seconds,
            self.profile.max_notes_per_second,
        );
        let mut notes: Vec<Note> = Vec::with_capacity(ordered.len());
        let mut next_id = 0_u32;

        for (index, peak) in ordered.iter().enumerate() {
            if !density.admits(peak.time) {
                report.dropped_by_density += 1;
                continue;
            }

            let free = self.free_lanes(&notes, peak.time);
            let free_lanes: Vec<usize> = (0..lane_count).filter(|&l| free[l]).collect();
            if free_lanes.is_empty() {
                report.dropped_by_lanes += 1;
                continue;
            }

            let lane = free_lanes[self.rng.gen_range(0..free_lanes.len())];
            let remaining = ordered.len() - index - 1;
            let kind = self.choose_kind(peak, lane, &free, remaining, mean_energy);

            match kind {
                NoteKind::Hold { .. } => report.holds += 1,
                NoteKind::Flick { .. } => report.flicks += 1,
                NoteKind::Slide { .. } => report.slides += 1,
                NoteKind::Normal => {}
            }

            notes.push(Note {
                id: NoteId(next_id),
                time: peak.time,
                lane,
                kind,
            });
            next_id += 1;
            density.record(peak.time);
        }

        report.placed = notes.len();
        (NoteChart::from_notes(lane_count, notes), report)
    }

    /// Lanes not blocked by any placed note within the clearance
    fn free_lanes(&self, placed: &[Note], time: f64) -> Vec<bool> {
        let mut free = vec![true; self.config.lane_count];
        for note in placed.iter().rev() {
            if (time - note.time).abs() >= self.config.lane_clearance_seconds {
                break;
            }
            for (lane, slot) in free.iter_mut().enumerate() {
                if note.occupies(lane) {
                    *slot = false;
                }
            }
        }
        free
    }

    fn choose_kind(
        &mut self,
        peak: &Peak,
        lane: usize,
        free: &[bool],
        remaining: usize,
        mean_energy: f32,
    ) -> NoteKind {
        let loud = peak.energy > mean_energy * self.config.special_energy_ratio;
        if !loud || !self.rng.gen_bool(self.profile.special_note_chance) {
            return NoteKind::Normal;
        }

        let roll: f64 = self.rng.gen();
        if roll < HOLD_BAND {
            if remaining >= self.config.hold_min_remaining_peaks {
                let duration = self
                    .rng
                    .gen_range(self.config.hold_min_seconds..self.config.hold_max_seconds);
                return NoteKind::Hold { duration };
            }
        } else if roll < FLICK_BAND {
            if peak.zcr > self.config.flick_min_zcr {
                let direction = if self.rng.gen_bool(0.5) {
                    FlickDirection::Left
                } else {
                    FlickDirection::Right
                };
                return NoteKind::Flick { direction };
            }
        } else if roll < SLIDE_BAND {
            let target_lane = lane + 1;
            if target_lane < self.config.lane_count && free[target_lane] {
                return NoteKind::Slide { target_lane };
            }
        }

        NoteKind::Normal
    }
}
