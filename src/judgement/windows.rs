//! Judgement windows - timing offset to grade classification
//!
//! Offsets are absolute distances in seconds between an input and the
//! timestamp it is judged against (note start for taps and hold presses,
//! hold end for releases). Windows are inclusive at their upper bound.

use serde::{Deserialize, Serialize};

use crate::config::JudgementConfig;

/// Judgement tier for one resolved note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    /// Within the perfect window (40ms by default)
    Perfect,
    /// Within the great window (80ms by default)
    Great,
    /// Within the good window (120ms by default)
    Good,
    /// Never hit, released early, or held past the end
    Miss,
}

impl Grade {
    /// Points awarded for this grade
    pub fn score(self) -> u32 {
        match self {
            Grade::Perfect => 100,
            Grade::Great => 70,
            Grade::Good => 40,
            Grade::Miss => 0,
        }
    }

    pub fn is_hit(self) -> bool {
        self != Grade::Miss
    }

    /// Classify an input offset against the configured windows
    ///
    /// # Arguments
    /// * `offset` - Signed or absolute offset in seconds
    /// * `config` - Window widths
    ///
    /// # Returns
    /// The tightest window containing the offset, or `None` when it falls
    /// outside the good window
    pub fn classify(offset: f64, config: &JudgementConfig) -> Option<Grade> {
        let distance = offset.abs();
        if distance <= config.perfect_window {
            Some(Grade::Perfect)
        } else if distance <= config.great_window {
            Some(Grade::Great)
        } else if distance <= config.good_window {
            Some(Grade::Good)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Grade::Perfect => "perfect",
            Grade::Great => "great",
            Grade::Good => "good",
            Grade::Miss => "miss",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_tiers() {
        let config = JudgementConfig::default();
        assert_eq!(Grade::classify(0.0, &config), Some(Grade::Perfect));
        assert_eq!(Grade::classify(-0.03, &config), Some(Grade::Perfect));
        assert_eq!(Grade::classify(0.06, &config), Some(Grade::Great));
        assert_eq!(Grade::classify(-0.1, &config), Some(Grade::Good));
        assert_eq!(Grade::classify(0.13, &config), None);
    }

    #[test]
    fn test_upper_bounds_are_inclusive() {
        let config = JudgementConfig {
            perfect_window: 0.25,
            great_window: 0.5,
            good_window: 0.75,
            miss_delay: 1.0,
        };
        // Exactly representable bounds
        assert_eq!(Grade::classify(0.25, &config), Some(Grade::Perfect));
        assert_eq!(Grade::classify(0.5, &config), Some(Grade::Great));
        assert_eq!(Grade::classify(-0.75, &config), Some(Grade::Good));
    }

    #[test]
    fn test_scores() {
        assert_eq!(Grade::Perfect.score(), 100);
        assert_eq!(Grade::Great.score(), 70);
        assert_eq!(Grade::Good.score(), 40);
        assert_eq!(Grade::Miss.score(), 0);
        assert!(!Grade::Miss.is_hit());
        assert_eq!(Grade::Great.to_string(), "great");
    }
}
