//! Session State Definitions
//!
//! Plain data for one quiz session. Mutation goes through the session
//! controller only.

use serde::{Deserialize, Serialize};

use crate::quiz::catalog::CountryId;
use crate::quiz::clock::TimeRemaining;
use crate::quiz::events::EndReason;
use crate::quiz::round::GuessOutcome;

/// Top-level session lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Created, waiting for `start`
    #[default]
    NotStarted,
    /// Rounds in progress
    Active,
    /// Finished; only `restart` leaves this state
    GameOver,
}

/// One resolved round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Target of the round
    pub country_id: CountryId,
    /// How it was answered
    pub outcome: GuessOutcome,
}

/// Mutable per-session values.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionState {
    /// Lifecycle status
    pub status: SessionStatus,
    /// Current score
    pub score: i64,
    /// Consecutive correct guesses
    pub streak: u32,
    /// Longest streak this session
    pub best_streak: u32,
    /// Resolved rounds in order
    pub history: Vec<HistoryEntry>,
}

impl SessionState {
    /// Fresh state for a new session, already Active.
    pub fn active() -> Self {
        Self {
            status: SessionStatus::Active,
            ..Self::default()
        }
    }

    /// Number of correct answers.
    pub fn correct_count(&self) -> usize {
        self.history.iter().filter(|entry| entry.outcome.is_correct()).count()
    }
}

/// End-of-session report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Final score
    pub score: i64,
    /// High score after this session
    pub high_score: i64,
    /// Resolved rounds
    pub rounds: usize,
    /// Correct answers
    pub correct: usize,
    /// Longest streak
    pub best_streak: u32,
    /// Why the session ended
    pub end_reason: Option<EndReason>,
}

/// Read-only view for the presentation layer.
#[derive(Clone, Debug, Serialize)]
pub struct SessionSnapshot {
    /// Lifecycle status
    pub status: SessionStatus,
    /// Current score
    pub score: i64,
    /// Current streak
    pub streak: u32,
    /// Persisted best
    pub high_score: i64,
    /// Hints left
    pub hints_remaining: u32,
    /// Time left
    pub time_remaining: TimeRemaining,
    /// Current round number (0 before the first round)
    pub round: u32,
    /// Resolved rounds
    pub history_len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_state() {
        let state = SessionState::active();
        assert_eq!(state.status, SessionStatus::Active);
        assert_eq!(state.score, 0);
        assert!(state.history.is_empty());
    }

    #[test]
    fn test_correct_count() {
        let mut state = SessionState::active();
        state.history.push(HistoryEntry {
            country_id: "ISL".into(),
            outcome: GuessOutcome::Correct,
        });
        state.history.push(HistoryEntry {
            country_id: "NOR".into(),
            outcome: GuessOutcome::Incorrect,
        });
        assert_eq!(state.correct_count(), 1);
    }
}
