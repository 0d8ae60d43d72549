//! Scoring Rules
//!
//! Pure mapping from (streak before, guess correctness) to a score delta and
//! the next streak. Streak bonuses are a tier table evaluated
//! highest-threshold-first.

use serde::{Deserialize, Serialize};

/// One streak bonus tier: a correct guess that brings the streak to at least
/// `threshold` is worth `points`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakTier {
    /// Minimum streak (after the guess) for this tier
    pub threshold: u32,
    /// Points awarded
    pub points: i64,
}

/// Result of scoring one guess, before the floor is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    /// Raw score change
    pub delta: i64,
    /// Streak after this guess
    pub streak_after: u32,
}

/// Score change after the floor is applied to a concrete score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreChange {
    /// Change actually applied
    pub applied_delta: i64,
    /// Resulting score
    pub score_after: i64,
}

/// Configurable scoring table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    /// Points for a correct guess below every tier
    pub base_points: i64,
    /// Points lost on an incorrect guess
    pub miss_penalty: i64,
    /// Streak bonus tiers (any order; evaluated highest threshold first)
    pub tiers: Vec<StreakTier>,
    /// Lowest score a session can fall to (`None` = unbounded below)
    pub score_floor: Option<i64>,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self::canonical()
    }
}

impl ScoringRules {
    /// Streak tiers {3: 20, 5: 30}, base 10, penalty 10, floor 0.
    pub fn canonical() -> Self {
        Self {
            base_points: 10,
            miss_penalty: 10,
            tiers: vec![
                StreakTier { threshold: 3, points: 20 },
                StreakTier { threshold: 5, points: 30 },
            ],
            score_floor: Some(0),
        }
    }

    /// Flat +10/-10 with no streak bonus and no floor.
    pub fn flat() -> Self {
        Self {
            base_points: 10,
            miss_penalty: 10,
            tiers: Vec::new(),
            score_floor: None,
        }
    }

    /// Points for a correct guess that brings the streak to `streak_after`.
    pub fn points_for_streak(&self, streak_after: u32) -> i64 {
        self.tiers
            .iter()
            .filter(|tier| streak_after >= tier.threshold)
            .max_by_key(|tier| tier.threshold)
            .map_or(self.base_points, |tier| tier.points)
    }

    /// Score one guess.
    pub fn resolve(&self, streak_before: u32, correct: bool) -> ScoreOutcome {
        if correct {
            let streak_after = streak_before.saturating_add(1);
            ScoreOutcome {
                delta: self.points_for_streak(streak_after),
                streak_after,
            }
        } else {
            ScoreOutcome {
                delta: -self.miss_penalty,
                streak_after: 0,
            }
        }
    }

    /// Apply an outcome to `score`, clamping at the floor.
    ///
    /// A score already below the floor is never pushed further down.
    pub fn apply(&self, score: i64, outcome: ScoreOutcome) -> ScoreChange {
        let mut score_after = score.saturating_add(outcome.delta);
        if let Some(floor) = self.score_floor {
            if outcome.delta < 0 && score_after < floor {
                score_after = floor.min(score);
            }
        }
        ScoreChange {
            applied_delta: score_after - score,
            score_after,
        }
    }
}
