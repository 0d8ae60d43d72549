//! Quiz Events
//!
//! Every state transition pushes an event. The front end drains them after
//! each call (or receives them over the driver's broadcast channel).

use serde::{Deserialize, Serialize};

use crate::quiz::catalog::CountryId;
use crate::quiz::hint::HintDenial;
use crate::quiz::round::GuessOutcome;

/// Why a session reached GameOver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Every country has been played
    CatalogExhausted,
    /// The countdown reached zero
    TimeExpired,
    /// The player quit
    Quit,
}

/// Session event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizEvent {
    /// Session entered Active
    SessionStarted {
        /// Restart generation
        generation: u64,
        /// Catalog size
        catalog_size: usize,
    },

    /// A new round is awaiting a guess
    RoundStarted {
        /// Round number
        round: u32,
        /// Target id
        target: CountryId,
    },

    /// A guess resolved the round
    GuessResolved {
        /// Round number
        round: u32,
        /// Correct or not
        outcome: GuessOutcome,
        /// Target's display name, always revealed
        answer: String,
        /// Score change after the floor
        delta: i64,
        /// Score after the guess
        score: i64,
        /// Streak after the guess
        streak: u32,
    },

    /// Region hint shown
    HintRevealed {
        /// Round number
        round: u32,
        /// Target region
        region: String,
        /// Hints left
        remaining: u32,
    },

    /// Hint refused
    HintDenied {
        /// Round number
        round: u32,
        /// Reason
        reason: HintDenial,
    },

    /// Score beat the stored best
    HighScoreBeaten {
        /// New high score
        score: i64,
    },

    /// Countdown second elapsed
    ClockTicked {
        /// Seconds left
        remaining_secs: u32,
    },

    /// Session reached GameOver
    SessionEnded {
        /// Why it ended
        reason: EndReason,
        /// Final score
        score: i64,
        /// Rounds resolved
        rounds: usize,
    },
}
