// GameSession - score, combo and per-grade tallies for one play-through
//
// Rules:
// - Hit grades add their score, increment combo and raise max_combo
// - Miss resets combo to 0 and never changes score
// - Score is therefore non-decreasing within a session

use serde::{Deserialize, Serialize};

use super::windows::Grade;

/// Per-grade counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeCounts {
    pub perfect: u32,
    pub great: u32,
    pub good: u32,
    pub miss: u32,
}

impl GradeCounts {
    pub fn total(&self) -> u32 {
        self.perfect + self.great + self.good + self.miss
    }

    fn bump(&mut self, grade: Grade) {
        match grade {
            Grade::Perfect => self.perfect += 1,
            Grade::Great => self.great += 1,
            Grade::Good => self.good += 1,
            Grade::Miss => self.miss += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameSession {
    score: u64,
    combo: u32,
    max_combo: u32,
    counts: GradeCounts,
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one resolved grade
    ///
    /// # Returns
    /// `(score_delta, combo_after)`
    pub fn apply(&mut self, grade: Grade) -> (u32, u32) {
        self.counts.bump(grade);
        if grade.is_hit() {
            let delta = grade.score();
            self.score += u64::from(delta);
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);
            (delta, self.combo)
        } else {
            self.combo = 0;
            (0, 0)
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn counts(&self) -> GradeCounts {
        self.counts
    }

    /// Number of notes resolved so far
    pub fn resolved(&self) -> u32 {
        self.counts.total()
    }
}

/// Read-only summary handed to presentation and reporting layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub counts: GradeCounts,
    pub resolved: u32,
    pub total_notes: u32,
}

impl SessionStats {
    pub fn is_complete(&self) -> bool {
        self.resolved >= self.total_notes
    }

    /// Hit ratio weighted by grade score, 0..=1
    pub fn accuracy(&self) -> f64 {
        if self.resolved == 0 {
            return 0.0;
        }
        self.score as f64 / (f64::from(self.resolved) * f64::from(Grade::Perfect.score()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hits_build_combo_and_score() {
        let mut session = GameSession::new();
        assert_eq!(session.apply(Grade::Perfect), (100, 1));
        assert_eq!(session.apply(Grade::Great), (70, 2));
        assert_eq!(session.apply(Grade::Good), (40, 3));
        assert_eq!(session.score(), 210);
        assert_eq!(session.max_combo(), 3);
    }

    #[test]
    fn test_miss_resets_combo_keeps_max() {
        let mut session = GameSession::new();
        session.apply(Grade::Perfect);
        session.apply(Grade::Perfect);
        assert_eq!(session.apply(Grade::Miss), (0, 0));
        assert_eq!(session.combo(), 0);
        assert_eq!(session.max_combo(), 2);
        assert_eq!(session.score(), 200, "miss must not change score");

        session.apply(Grade::Good);
        assert_eq!(session.combo(), 1);
        assert_eq!(session.max_combo(), 2);
    }

    #[test]
    fn test_counts_track_every_grade() {
        let mut session = GameSession::new();
        for grade in [Grade::Perfect, Grade::Miss, Grade::Great, Grade::Miss] {
            session.apply(grade);
        }
        let counts = session.counts();
        assert_eq!(counts.perfect, 1);
        assert_eq!(counts.great, 1);
        assert_eq!(counts.good, 0);
        assert_eq!(counts.miss, 2);
        assert_eq!(session.resolved(), 4);
    }

    #[test]
    fn test_accuracy() {
        let stats = SessionStats {
            score: 170,
            combo: 2,
            max_combo: 2,
            counts: GradeCounts {
                perfect: 1,
                great: 1,
                good: 0,
                miss: 0,
            },
            resolved: 2,
            total_notes: 4,
        };
        assert!((stats.accuracy() - 0.85).abs() < 1e-12);
        assert!(!stats.is_complete());
    }
}
