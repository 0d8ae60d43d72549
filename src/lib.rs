//! # GeoBro Quiz Engine
//!
//! Session engine for a geography quiz: the player sees a flag (or a target
//! to find on a map) and answers before time runs out, building score,
//! streak bonuses and a persisted personal best.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      GEO QUIZ ENGINE                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  └── rng.rs      - Seeded Xorshift128+ PRNG                  │
//! │                                                              │
//! │  quiz/           - Session engine (deterministic)            │
//! │  ├── catalog.rs  - Countries, catalog sources, datasets      │
//! │  ├── selector.rs - Target selection, multiple choice         │
//! │  ├── scoring.rs  - Streak-tiered scoring                     │
//! │  ├── hint.rs     - Hint budget                               │
//! │  ├── round.rs    - Round resolution state                    │
//! │  ├── evaluator.rs- Guess resolution                          │
//! │  ├── clock.rs    - Session countdown                         │
//! │  └── session.rs  - Session controller                        │
//! │                                                              │
//! │  store.rs        - High score persistence                    │
//! │  config.rs       - JSON configuration                        │
//! │                                                              │
//! │  runtime/        - Async driver (non-deterministic)          │
//! │  └── driver.rs   - Clock task, auto-advance, cancellation    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! The `core/` and `quiz/` modules never read the wall clock. The driver
//! delivers one tick per second, and every random draw comes from a PRNG
//! seeded per session generation, so a seeded session replays exactly.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod quiz;
pub mod runtime;
pub mod store;

// Re-export commonly used types
pub use crate::config::QuizConfig;
pub use crate::core::rng::DeterministicRng;
pub use quiz::catalog::{Country, CountryCatalog, CountryId};
pub use quiz::session::{SessionConfig, SessionController, SessionError};
pub use runtime::driver::QuizDriver;
pub use store::{FileHighScoreStore, HighScoreStore, MemoryHighScoreStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Hints per session unless configured otherwise
pub const DEFAULT_HINT_BUDGET: u32 = 3;

/// Multiple-choice options per round, target included
pub const DEFAULT_CHOICE_COUNT: usize = 4;
