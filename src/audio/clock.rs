// PlaybackClock - transport-driven elapsed time
//
// The audio transport reports how many frames it rendered; the clock
// accumulates them into a shared atomic frame counter and derives seconds
// from it. Nothing here reads wall-clock time, so the clock cannot drift
// from the audio.
//
// Pause semantics:
// - While paused, frame advances are ignored (the counter freezes)
// - Resume continues from the frozen frame count
//
// Handles are cheap clones sharing the same counters, so the transport side
// can advance while the judgement side reads.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct PlaybackClock {
    frames: Arc<AtomicU64>,
    paused: Arc<AtomicBool>,
    sample_rate: u32,
}

impl PlaybackClock {
    /// Create a clock at frame 0, running
    ///
    /// # Arguments
    /// * `sample_rate` - Transport sample rate in Hz; 0 is clamped to 1
    pub fn new(sample_rate: u32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            paused: Arc::new(AtomicBool::new(false)),
            sample_rate: sample_rate.max(1),
        }
    }

    /// Record `frames` rendered by the transport; no-op while paused
    pub fn advance(&self, frames: u64) {
        if self.paused.load(Ordering::Acquire) {
            return;
        }
        self.frames.fetch_add(frames, Ordering::AcqRel);
    }

    /// Advance by a duration in seconds, rounded to whole frames
    pub fn advance_seconds(&self, seconds: f64) {
        if seconds <= 0.0 || !seconds.is_finite() {
            return;
        }
        self.advance((seconds * self.sample_rate as f64).round() as u64);
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Seconds of audio rendered while running
    pub fn elapsed_seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Rewind to frame 0 and unpause
    pub fn reset(&self) {
        self.frames.store(0, Ordering::Release);
        self.paused.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates_frames() {
        let clock = PlaybackClock::new(48_000);
        clock.advance(24_000);
        clock.advance(24_000);
        assert_eq!(clock.frames(), 48_000);
        assert!((clock.elapsed_seconds() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pause_freezes_and_resume_continues() {
        let clock = PlaybackClock::new(1_000);
        clock.advance(500);
        clock.pause();
        clock.advance(10_000);
        assert!(clock.is_paused());
        assert_eq!(clock.frames(), 500, "paused clock must not advance");

        clock.resume();
        clock.advance(250);
        assert_eq!(clock.frames(), 750);
    }

    #[test]
    fn test_clones_share_state() {
        let transport = PlaybackClock::new(1_000);
        let reader = transport.clone();
        transport.advance_seconds(0.25);
        assert_eq!(reader.frames(), 250);

        reader.pause();
        assert!(transport.is_paused());
    }

    #[test]
    fn test_reset() {
        let clock = PlaybackClock::new(1_000);
        clock.advance(900);
        clock.pause();
        clock.reset();
        assert_eq!(clock.frames(), 0);
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_advance_from_other_thread() {
        let clock = PlaybackClock::new(1_000);
        let transport = clock.clone();
        let handle = std::thread::spawn(move || {
            for _ in 0..100 {
                transport.advance(10);
            }
        });
        handle.join().unwrap();
        assert_eq!(clock.frames(), 1_000);
    }
}
