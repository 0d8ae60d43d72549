//! Runtime Module (non-deterministic)
//!
//! Feeds wall-clock time into the deterministic engine: a 1 Hz clock task
//! per session generation and delayed auto-advances. Everything here is
//! cancellable; stale tasks are both aborted and rejected by generation.

pub mod driver;

pub use driver::{QuizDriver, CLOCK_TICK};
