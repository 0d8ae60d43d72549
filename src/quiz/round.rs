//! Round State
//!
//! One prompt/answer cycle for a single target. Resolution is a single
//! tagged state, so a round is either awaiting a guess or resolved exactly
//! once.

use serde::{Deserialize, Serialize};

use crate::quiz::catalog::CountryId;

/// Whether a guess matched the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuessOutcome {
    /// Guess matched the target id
    Correct,
    /// Any other id, known or not
    Incorrect,
}

impl GuessOutcome {
    /// True for [`GuessOutcome::Correct`].
    pub fn is_correct(self) -> bool {
        self == GuessOutcome::Correct
    }
}

/// Resolution state of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    /// Waiting for the player's guess
    AwaitingGuess,
    /// Answered; terminal for this round
    Resolved(GuessOutcome),
}

/// The single active round of a session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Round {
    /// 1-based round number within the session
    pub number: u32,
    /// Catalog index of the target
    pub target: usize,
    /// Target id (cached for comparison)
    pub target_id: CountryId,
    /// Catalog indices of the multiple-choice options (contains `target`)
    pub options: Vec<usize>,
    /// Candidate submitted, once resolved
    pub guessed: Option<CountryId>,
    state: RoundState,
}

impl Round {
    /// Start a round awaiting a guess.
    pub fn new(
        number: u32,
        target: usize,
        target_id: CountryId,
        options: Vec<usize>,
    ) -> Self {
        Self {
            number,
            target,
            target_id,
            options,
            guessed: None,
            state: RoundState::AwaitingGuess,
        }
    }

    /// Current resolution state.
    pub fn state(&self) -> RoundState {
        self.state
    }

    /// True once a guess has been accepted.
    pub fn is_resolved(&self) -> bool {
        matches!(self.state, RoundState::Resolved(_))
    }

    /// Resolve with `candidate`. Compares ids only.
    ///
    /// Returns `None` when the round was already resolved; the first guess wins.
    pub fn resolve(&mut self, candidate: &CountryId) -> Option<GuessOutcome> {
        if self.is_resolved() {
            return None;
        }

        let outcome = if *candidate == self.target_id {
            GuessOutcome::Correct
        } else {
            GuessOutcome::Incorrect
        };

        self.guessed = Some(candidate.clone());
        self.state = RoundState::Resolved(outcome);
        Some(outcome)
    }
}
