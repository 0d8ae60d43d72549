//! Quiz Engine Module
//!
//! The deterministic session engine. Nothing in here reads the wall clock or
//! touches the filesystem; the runtime driver feeds it ticks and the store
//! is injected.
//!
//! ## Module Structure
//!
//! - `catalog`: Country records, catalog sources, dataset parsing
//! - `selector`: Target selection without repetition, multiple-choice options
//! - `scoring`: Streak-tiered scoring rules
//! - `hint`: Per-session hint budget
//! - `round`: Round resolution state
//! - `evaluator`: Guess resolution against the active round
//! - `clock`: Optional session countdown
//! - `state`: Session state, history, summaries
//! - `events`: Event stream for the presentation layer
//! - `session`: The session controller

pub mod catalog;
pub mod clock;
pub mod evaluator;
pub mod events;
pub mod hint;
pub mod round;
pub mod scoring;
pub mod selector;
pub mod session;
pub mod state;

// Re-export key types
pub use catalog::{CatalogError, CatalogSource, Country, CountryCatalog, CountryId, FlagRef};
pub use clock::{SessionClock, TimeLimit, TimeRemaining};
pub use evaluator::{GuessResolution, GuessResult};
pub use events::{EndReason, QuizEvent};
pub use hint::{HintDenial, HintOutcome};
pub use round::{GuessOutcome, RoundState};
pub use scoring::{ScoringRules, StreakTier};
pub use session::{AdvanceResult, SessionConfig, SessionController, SessionError, TickResult};
pub use state::{SessionStatus, SessionSummary};
