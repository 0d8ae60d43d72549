//! Quiz Session Controller
//!
//! Owns all mutable session state and drives the
//! `NotStarted → Active → GameOver` lifecycle. The controller is synchronous
//! and deterministic; wall-clock ticks and deferred advances arrive from the
//! runtime driver tagged with the session generation they were armed for.
//!
//! ## Generations
//!
//! The generation counter is bumped whenever a session begins or ends. Clock
//! ticks and auto-advances carrying an older generation are rejected, so a
//! callback scheduled before `quit()` or `restart()` can never touch the new
//! state.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::rng::DeterministicRng;
use crate::quiz::catalog::{CatalogError, CatalogSource, Country, CountryCatalog, CountryId};
use crate::quiz::clock::{ClockTick, SessionClock, TimeLimit, TimeRemaining};
use crate::quiz::evaluator::{submit_guess, GuessResult};
use crate::quiz::events::{EndReason, QuizEvent};
use crate::quiz::hint::{HintDenial, HintManager, HintOutcome};
use crate::quiz::round::{Round, RoundState};
use crate::quiz::scoring::ScoringRules;
use crate::quiz::selector::{build_options, select_next, Selection};
use crate::quiz::state::{HistoryEntry, SessionSnapshot, SessionState, SessionStatus, SessionSummary};
use crate::store::HighScoreStore;
use crate::{DEFAULT_CHOICE_COUNT, DEFAULT_HINT_BUDGET};

/// Unique session identifier.
pub type SessionId = [u8; 16];

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Per-session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session length
    pub time_limit: TimeLimit,
    /// Hints available per session
    pub hint_budget: u32,
    /// Delay before a correct guess advances on its own.
    /// `None` means every round waits for an explicit `advance()`.
    pub auto_advance_ms: Option<u64>,
    /// Multiple-choice options per round, target included
    pub choice_count: usize,
    /// Fixed seed for reproducible target order
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_limit: TimeLimit::Unbounded,
            hint_budget: DEFAULT_HINT_BUDGET,
            auto_advance_ms: None,
            choice_count: DEFAULT_CHOICE_COUNT,
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Auto-advance delay, if enabled.
    pub fn auto_advance_delay(&self) -> Option<Duration> {
        self.auto_advance_ms.map(Duration::from_millis)
    }
}

// =============================================================================
// ERRORS AND RESULTS
// =============================================================================

/// Session errors.
///
/// Misses, duplicate guesses and denied hints are normal game outcomes and
/// never show up here.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Cannot start without countries.
    #[error("country catalog is empty")]
    EmptyCatalog,

    /// `start` called twice.
    #[error("session already started")]
    AlreadyStarted,

    /// Operation requires an Active session.
    #[error("session is not active")]
    NotActive,

    /// `restart` requires GameOver.
    #[error("session is not over")]
    NotGameOver,

    /// `advance` before the current round was answered.
    #[error("current round has not been answered")]
    RoundUnresolved,

    /// Multiple-choice index out of range.
    #[error("no option {0} in the current round")]
    InvalidOption(usize),

    /// Catalog fetch failed.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Identifies one armed auto-advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceToken {
    /// Generation the advance was armed in
    pub generation: u64,
    /// Round it advances from
    pub round: u32,
}

/// An auto-advance waiting for its delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledAdvance {
    /// Token to hand back to [`SessionController::fire_scheduled_advance`]
    pub token: AdvanceToken,
    /// How long to wait
    pub delay: Duration,
}

/// Result of advancing past a resolved round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceResult {
    /// A new round started
    NextRound(u32),
    /// Catalog exhausted; the session is over
    GameOver(SessionSummary),
}

/// Result of a clock tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickResult {
    /// Tick belongs to an earlier generation
    Stale,
    /// Session not running
    Idle,
    /// One second elapsed
    Running(TimeRemaining),
    /// Time ran out; the session is over
    Expired(SessionSummary),
}

/// Borrowed view of the active round.
#[derive(Debug, Clone)]
pub struct RoundView<'a> {
    /// Round number
    pub number: u32,
    /// Target country
    pub target: &'a Country,
    /// Multiple-choice options in display order
    pub options: Vec<&'a Country>,
    /// Resolution state
    pub state: RoundState,
    /// Region hint, if revealed this round
    pub hint: Option<&'a str>,
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Quiz session state machine.
pub struct SessionController<S: HighScoreStore> {
    id: SessionId,
    catalog: Arc<CountryCatalog>,
    rules: ScoringRules,
    config: SessionConfig,
    store: S,
    state: SessionState,
    hints: HintManager,
    clock: SessionClock,
    round: Option<Round>,
    rng: DeterministicRng,
    generation: u64,
    high_score: i64,
    pending_advance: Option<ScheduledAdvance>,
    end_reason: Option<EndReason>,
    events: Vec<QuizEvent>,
}

impl<S: HighScoreStore> SessionController<S> {
    /// Create a controller in `NotStarted`.
    ///
    /// The stored high score is read once here; a failed read counts as 0.
    pub fn new(catalog: Arc<CountryCatalog>, rules: ScoringRules, store: S) -> Self {
        let high_score = match store.read() {
            Ok(score) => score,
            Err(e) => {
                warn!("Failed to read high score, starting from 0: {}", e);
                0
            }
        };

        Self {
            id: [0; 16],
            catalog,
            rules,
            config: SessionConfig::default(),
            store,
            state: SessionState::default(),
            hints: HintManager::new(DEFAULT_HINT_BUDGET),
            clock: SessionClock::new(TimeLimit::Unbounded),
            round: None,
            rng: DeterministicRng::default(),
            generation: 0,
            high_score,
            pending_advance: None,
            end_reason: None,
            events: Vec::new(),
        }
    }

    /// Fetch a catalog from `source` and create a controller.
    ///
    /// A fetch failure leaves nothing behind; the caller decides whether to retry.
    pub fn from_source(
        source: &dyn CatalogSource,
        rules: ScoringRules,
        store: S,
    ) -> Result<Self, SessionError> {
        let catalog = CountryCatalog::load(source)?;
        Ok(Self::new(Arc::new(catalog), rules, store))
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// `NotStarted → Active`.
    pub fn start(&mut self, config: SessionConfig) -> Result<(), SessionError> {
        if self.state.status != SessionStatus::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }
        if self.catalog.is_empty() {
            warn!("Refusing to start a session with an empty catalog");
            return Err(SessionError::EmptyCatalog);
        }

        self.apply_config(config);
        self.begin();
        Ok(())
    }

    /// Submit a guess by country id.
    ///
    /// Unknown ids are misses. A guess for an already-answered round returns
    /// [`GuessResult::Ignored`] and changes nothing.
    pub fn guess(&mut self, candidate: &CountryId) -> Result<GuessResult, SessionError> {
        if self.state.status != SessionStatus::Active {
            return Err(SessionError::NotActive);
        }
        let Some(round) = self.round.as_mut() else {
            return Err(SessionError::NotActive);
        };

        let result = submit_guess(round, &self.catalog, &mut self.state, &self.rules, candidate);

        if let GuessResult::Resolved(resolution) = &result {
            debug!(
                "Round {} resolved {:?}: delta {}, score {}, streak {}",
                resolution.round, resolution.outcome, resolution.delta, resolution.score, resolution.streak
            );

            self.events.push(QuizEvent::GuessResolved {
                round: resolution.round,
                outcome: resolution.outcome,
                answer: resolution.answer.clone(),
                delta: resolution.delta,
                score: resolution.score,
                streak: resolution.streak,
            });
            self.record_high_score();

            if resolution.outcome.is_correct() {
                if let Some(delay) = self.config.auto_advance_delay() {
                    self.pending_advance = Some(ScheduledAdvance {
                        token: AdvanceToken {
                            generation: self.generation,
                            round: resolution.round,
                        },
                        delay,
                    });
                }
            }
        }

        Ok(result)
    }

    /// Submit the multiple-choice option at `choice` (0-based).
    pub fn guess_option(&mut self, choice: usize) -> Result<GuessResult, SessionError> {
        if self.state.status != SessionStatus::Active {
            return Err(SessionError::NotActive);
        }
        let candidate = self
            .round
            .as_ref()
            .and_then(|round| round.options.get(choice))
            .map(|&index| self.catalog[index].id.clone())
            .ok_or(SessionError::InvalidOption(choice))?;

        self.guess(&candidate)
    }

    /// Move past the answered round: next target, or GameOver on exhaustion.
    pub fn advance(&mut self) -> Result<AdvanceResult, SessionError> {
        if self.state.status != SessionStatus::Active {
            return Err(SessionError::NotActive);
        }
        if self.round.as_ref().is_some_and(|round| !round.is_resolved()) {
            return Err(SessionError::RoundUnresolved);
        }

        self.pending_advance = None;
        Ok(self.next_round())
    }

    /// Auto-advance armed by the last correct guess, if any.
    pub fn scheduled_advance(&self) -> Option<ScheduledAdvance> {
        self.pending_advance
    }

    /// Run a scheduled advance once its delay has elapsed.
    ///
    /// Returns `None` when the token is stale (the player already advanced,
    /// quit, or restarted).
    pub fn fire_scheduled_advance(&mut self, token: AdvanceToken) -> Option<AdvanceResult> {
        if self.pending_advance.map(|pending| pending.token) != Some(token) {
            debug!("Discarding stale auto-advance for round {}", token.round);
            return None;
        }
        self.advance().ok()
    }

    /// Reveal the current target's region.
    pub fn request_hint(&mut self) -> Result<HintOutcome, SessionError> {
        if self.state.status != SessionStatus::Active {
            return Err(SessionError::NotActive);
        }
        let Some(round) = self.round.as_ref() else {
            return Err(SessionError::NotActive);
        };

        let number = round.number;
        let outcome = if round.is_resolved() {
            HintOutcome::Denied(HintDenial::RoundResolved)
        } else {
            self.hints.reveal(&self.catalog[round.target])
        };

        match &outcome {
            HintOutcome::Revealed { region, remaining } => {
                debug!("Hint for round {}: {} ({} left)", number, region, remaining);
                self.events.push(QuizEvent::HintRevealed {
                    round: number,
                    region: region.clone(),
                    remaining: *remaining,
                });
            }
            HintOutcome::Denied(reason) => {
                self.events.push(QuizEvent::HintDenied {
                    round: number,
                    reason: *reason,
                });
            }
        }

        Ok(outcome)
    }

    /// One elapsed second, tagged with the generation the clock was armed in.
    pub fn tick(&mut self, generation: u64) -> TickResult {
        if generation != self.generation {
            return TickResult::Stale;
        }
        if self.state.status != SessionStatus::Active {
            return TickResult::Idle;
        }

        match self.clock.tick() {
            ClockTick::Idle => TickResult::Idle,
            ClockTick::Running(remaining) => {
                if cfg!(feature = "debug-tracing") {
                    debug!("Clock tick: {:?}", remaining);
                }

                if let TimeRemaining::Seconds(remaining_secs) = remaining {
                    self.events.push(QuizEvent::ClockTicked { remaining_secs });
                }
                TickResult::Running(remaining)
            }
            ClockTick::Expired => {
                info!("Session {} ran out of time", self.session_id_hex());
                TickResult::Expired(self.end_session(EndReason::TimeExpired))
            }
        }
    }

    /// Force `Active → GameOver`.
    pub fn quit(&mut self) -> Result<SessionSummary, SessionError> {
        if self.state.status != SessionStatus::Active {
            return Err(SessionError::NotActive);
        }
        Ok(self.end_session(EndReason::Quit))
    }

    /// `GameOver → Active` with the same configuration.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        if self.state.status != SessionStatus::GameOver {
            return Err(SessionError::NotGameOver);
        }
        self.begin();
        Ok(())
    }

    /// `GameOver → Active` with a new configuration.
    pub fn restart_with(&mut self, config: SessionConfig) -> Result<(), SessionError> {
        if self.state.status != SessionStatus::GameOver {
            return Err(SessionError::NotGameOver);
        }
        self.apply_config(config);
        self.begin();
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn apply_config(&mut self, config: SessionConfig) {
        if let Some(seed) = config.seed {
            self.id = seeded_session_id(seed);
        } else if self.id == [0; 16] {
            self.id = *uuid::Uuid::new_v4().as_bytes();
        }
        self.config = config;
    }

    /// Full reset into Active with a first round.
    fn begin(&mut self) {
        self.generation += 1;
        self.state = SessionState::active();
        self.hints.reset(self.config.hint_budget);
        self.clock.configure(self.config.time_limit);
        self.clock.start();
        self.round = None;
        self.pending_advance = None;
        self.end_reason = None;
        self.rng = DeterministicRng::for_session(&self.id, self.generation);

        info!(
            "Session {} started (generation {}, {} countries, {:?})",
            self.session_id_hex(),
            self.generation,
            self.catalog.len(),
            self.config.time_limit
        );
        self.events.push(QuizEvent::SessionStarted {
            generation: self.generation,
            catalog_size: self.catalog.len(),
        });

        self.next_round();
    }

    fn next_round(&mut self) -> AdvanceResult {
        match select_next(&self.catalog, &self.state.history, &mut self.rng) {
            Selection::Exhausted => {
                info!("Session {} exhausted the catalog", self.session_id_hex());
                AdvanceResult::GameOver(self.end_session(EndReason::CatalogExhausted))
            }
            Selection::Next(target) => {
                let options = build_options(&self.catalog, target, self.config.choice_count, &mut self.rng);
                let number = self.round.as_ref().map_or(1, |round| round.number + 1);
                let target_id = self.catalog[target].id.clone();

                self.hints.new_round();
                self.round = Some(Round::new(
                    number,
                    target,
                    target_id.clone(),
                    options,
                ));
                self.events.push(QuizEvent::RoundStarted {
                    round: number,
                    target: target_id,
                });

                AdvanceResult::NextRound(number)
            }
        }
    }

    fn end_session(&mut self, reason: EndReason) -> SessionSummary {
        self.state.status = SessionStatus::GameOver;
        self.clock.stop();
        self.pending_advance = None;
        self.end_reason = Some(reason);
        // Outstanding ticks and auto-advances now carry a stale generation
        self.generation += 1;

        info!(
            "Session {} over ({:?}): score {}, {} rounds",
            self.session_id_hex(),
            reason,
            self.state.score,
            self.state.history.len()
        );
        self.events.push(QuizEvent::SessionEnded {
            reason,
            score: self.state.score,
            rounds: self.state.history.len(),
        });

        self.summary()
    }

    fn record_high_score(&mut self) {
        if self.state.score <= self.high_score {
            return;
        }

        self.high_score = self.state.score;
        self.events.push(QuizEvent::HighScoreBeaten {
            score: self.high_score,
        });

        if let Err(e) = self.store.write(self.high_score) {
            warn!("Failed to persist high score {}: {}", self.high_score, e);
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Session id.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Session id as hex, for logging.
    pub fn session_id_hex(&self) -> String {
        hex::encode(&self.id[..4])
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Lifecycle status.
    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    /// Current score.
    pub fn score(&self) -> i64 {
        self.state.score
    }

    /// Current streak.
    pub fn streak(&self) -> u32 {
        self.state.streak
    }

    /// Best score across sessions.
    pub fn high_score(&self) -> i64 {
        self.high_score
    }

    /// Hints left this session.
    pub fn hints_remaining(&self) -> u32 {
        self.hints.remaining()
    }

    /// Time left this session.
    pub fn time_remaining(&self) -> TimeRemaining {
        self.clock.remaining()
    }

    /// Resolved rounds in order.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.state.history
    }

    /// Catalog the session plays from.
    pub fn catalog(&self) -> &CountryCatalog {
        &self.catalog
    }

    /// Active configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Scoring rules.
    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    /// Why the last session ended.
    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    /// The current round, resolved or not.
    pub fn current_round(&self) -> Option<RoundView<'_>> {
        let round = self.round.as_ref()?;
        Some(RoundView {
            number: round.number,
            target: &self.catalog[round.target],
            options: round.options.iter().map(|&i| &self.catalog[i]).collect(),
            state: round.state(),
            hint: self.hints.revealed(),
        })
    }

    /// Drain pending events.
    pub fn take_events(&mut self) -> Vec<QuizEvent> {
        std::mem::take(&mut self.events)
    }

    /// Serializable snapshot for the presentation layer.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.state.status,
            score: self.state.score,
            streak: self.state.streak,
            high_score: self.high_score,
            hints_remaining: self.hints.remaining(),
            time_remaining: self.clock.remaining(),
            round: self.round.as_ref().map_or(0, |round| round.number),
            history_len: self.state.history.len(),
        }
    }

    /// End-of-session report (also valid mid-session).
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.state.score,
            high_score: self.high_score,
            rounds: self.state.history.len(),
            correct: self.state.correct_count(),
            best_streak: self.state.best_streak,
            end_reason: self.end_reason,
        }
    }
}

/// Session id derived from a fixed seed.
fn seeded_session_id(seed: u64) -> SessionId {
    let bytes = seed.to_le_bytes();
    let mut id = [0u8; 16];
    id[..8].copy_from_slice(&bytes);
    id[8..].copy_from_slice(&bytes);
    id
}
