//! Core deterministic primitives.
//!
//! Everything the quiz engine draws at random goes through these types, so a
//! seeded session replays identically on any platform.

pub mod rng;

// Re-export core types
pub use rng::{derive_session_seed, DeterministicRng};
