//! Guess Evaluation
//!
//! Resolves the active round against a candidate id, appends history, and
//! applies scoring. A round that is already resolved ignores the guess.

use serde::Serialize;

use crate::quiz::catalog::{CountryCatalog, CountryId};
use crate::quiz::round::{GuessOutcome, Round};
use crate::quiz::scoring::ScoringRules;
use crate::quiz::state::{HistoryEntry, SessionState};

/// Details of a resolved guess.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GuessResolution {
    /// Round number
    pub round: u32,
    /// Correct or not
    pub outcome: GuessOutcome,
    /// Target display name, revealed regardless of outcome
    pub answer: String,
    /// Score change after the floor
    pub delta: i64,
    /// Score after the guess
    pub score: i64,
    /// Streak after the guess
    pub streak: u32,
}

/// Result of submitting a guess.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum GuessResult {
    /// The round was resolved by this guess
    Resolved(GuessResolution),
    /// The round was already resolved; nothing changed
    Ignored,
}

impl GuessResult {
    /// The resolution, if this guess resolved the round.
    pub fn resolution(&self) -> Option<&GuessResolution> {
        match self {
            GuessResult::Resolved(resolution) => Some(resolution),
            GuessResult::Ignored => None,
        }
    }
}

/// Resolve `round` with `candidate`, updating `state`.
pub fn submit_guess(
    round: &mut Round,
    catalog: &CountryCatalog,
    state: &mut SessionState,
    rules: &ScoringRules,
    candidate: &CountryId,
) -> GuessResult {
    let Some(outcome) = round.resolve(candidate) else {
        return GuessResult::Ignored;
    };

    state.history.push(HistoryEntry {
        country_id: round.target_id.clone(),
        outcome,
    });

    let scored = rules.resolve(state.streak, outcome.is_correct());
    let change = rules.apply(state.score, scored);

    state.score = change.score_after;
    state.streak = scored.streak_after;
    state.best_streak = state.best_streak.max(state.streak);

    let answer = catalog
        .find(&round.target_id)
        .map(|country| country.display_name.clone())
        .unwrap_or_else(|| round.target_id.to_string());

    GuessResult::Resolved(GuessResolution {
        round: round.number,
        outcome,
        answer,
        delta: change.applied_delta,
        score: state.score,
        streak: state.streak,
    })
}
