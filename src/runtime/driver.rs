//! Session Driver
//!
//! Shares one [`SessionController`] behind a tokio `RwLock` and owns the
//! background tasks that act on it. Each event handler takes the write lock,
//! runs to completion, and publishes the controller's events on a broadcast
//! channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument};

use crate::quiz::catalog::CountryId;
use crate::quiz::evaluator::GuessResult;
use crate::quiz::events::QuizEvent;
use crate::quiz::hint::HintOutcome;
use crate::quiz::session::{
    AdvanceResult, ScheduledAdvance, SessionConfig, SessionController, SessionError, TickResult,
};
use crate::quiz::state::SessionSummary;
use crate::store::HighScoreStore;

/// Session clock resolution.
pub const CLOCK_TICK: Duration = Duration::from_secs(1);

/// Broadcast buffer for session events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Async front for a quiz session.
pub struct QuizDriver<S>
where
    S: HighScoreStore + Send + Sync + 'static,
{
    session: Arc<RwLock<SessionController<S>>>,
    event_tx: broadcast::Sender<QuizEvent>,
    clock_task: Option<JoinHandle<()>>,
    advance_task: Option<JoinHandle<()>>,
}

impl<S> QuizDriver<S>
where
    S: HighScoreStore + Send + Sync + 'static,
{
    /// Wrap a controller.
    pub fn new(controller: SessionController<S>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            session: Arc::new(RwLock::new(controller)),
            event_tx,
            clock_task: None,
            advance_task: None,
        }
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<QuizEvent> {
        self.event_tx.subscribe()
    }

    /// Shared handle to the controller, for read-only queries.
    pub fn session(&self) -> Arc<RwLock<SessionController<S>>> {
        self.session.clone()
    }

    /// Start the session and its clock.
    #[instrument(skip(self))]
    pub async fn start(&mut self, config: SessionConfig) -> Result<(), SessionError> {
        let generation = {
            let mut s = self.session.write().await;
            s.start(config)?;
            publish(&self.event_tx, s.take_events());
            s.generation()
        };
        self.spawn_clock(generation);
        Ok(())
    }

    /// Submit a guess by id.
    pub async fn guess(&mut self, candidate: &CountryId) -> Result<GuessResult, SessionError> {
        let (result, scheduled) = {
            let mut s = self.session.write().await;
            let result = s.guess(candidate)?;
            publish(&self.event_tx, s.take_events());
            (result, s.scheduled_advance())
        };
        self.after_guess(&result, scheduled);
        Ok(result)
    }

    /// Submit a multiple-choice option (0-based).
    pub async fn guess_option(&mut self, choice: usize) -> Result<GuessResult, SessionError> {
        let (result, scheduled) = {
            let mut s = self.session.write().await;
            let result = s.guess_option(choice)?;
            publish(&self.event_tx, s.take_events());
            (result, s.scheduled_advance())
        };
        self.after_guess(&result, scheduled);
        Ok(result)
    }

    /// Acknowledge the answered round and move on.
    pub async fn advance(&mut self) -> Result<AdvanceResult, SessionError> {
        let result = {
            let mut s = self.session.write().await;
            let result = s.advance()?;
            publish(&self.event_tx, s.take_events());
            result
        };

        abort(&mut self.advance_task);
        if matches!(result, AdvanceResult::GameOver(_)) {
            abort(&mut self.clock_task);
        }
        Ok(result)
    }

    /// Reveal the target region.
    pub async fn request_hint(&mut self) -> Result<HintOutcome, SessionError> {
        let mut s = self.session.write().await;
        let outcome = s.request_hint()?;
        publish(&self.event_tx, s.take_events());
        Ok(outcome)
    }

    /// End the session now.
    pub async fn quit(&mut self) -> Result<SessionSummary, SessionError> {
        let summary = {
            let mut s = self.session.write().await;
            let summary = s.quit()?;
            publish(&self.event_tx, s.take_events());
            summary
        };

        // Only a successful transition may touch the running tasks
        self.cancel_tasks();
        Ok(summary)
    }

    /// Restart a finished session with the same configuration.
    pub async fn restart(&mut self) -> Result<(), SessionError> {
        self.restart_inner(None).await
    }

    /// Restart a finished session with a new configuration.
    pub async fn restart_with(&mut self, config: SessionConfig) -> Result<(), SessionError> {
        self.restart_inner(Some(config)).await
    }

    async fn restart_inner(&mut self, config: Option<SessionConfig>) -> Result<(), SessionError> {
        let generation = {
            let mut s = self.session.write().await;
            match config {
                Some(config) => s.restart_with(config)?,
                None => s.restart()?,
            }
            publish(&self.event_tx, s.take_events());
            s.generation()
        };

        self.cancel_tasks();
        self.spawn_clock(generation);
        Ok(())
    }

    /// Abort all background tasks.
    pub fn shutdown(&mut self) {
        self.cancel_tasks();
    }

    fn after_guess(&mut self, result: &GuessResult, scheduled: Option<ScheduledAdvance>) {
        if let (GuessResult::Resolved(_), Some(scheduled)) = (result, scheduled) {
            self.spawn_advance(scheduled);
        }
    }

    fn cancel_tasks(&mut self) {
        abort(&mut self.clock_task);
        abort(&mut self.advance_task);
    }

    /// One tick per second for `generation`; exits once the tick is stale or
    /// the session ends.
    fn spawn_clock(&mut self, generation: u64) {
        abort(&mut self.clock_task);

        let session = self.session.clone();
        let event_tx = self.event_tx.clone();

        self.clock_task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + CLOCK_TICK, CLOCK_TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                let mut s = session.write().await;
                let result = s.tick(generation);
                publish(&event_tx, s.take_events());

                match result {
                    TickResult::Running(_) => continue,
                    TickResult::Expired(summary) => {
                        info!("Clock expired with score {}", summary.score);
                        break;
                    }
                    TickResult::Stale | TickResult::Idle => {
                        debug!("Clock task for generation {} exiting", generation);
                        break;
                    }
                }
            }
        }));
    }

    /// Fire an auto-advance after its delay unless it goes stale first.
    fn spawn_advance(&mut self, scheduled: ScheduledAdvance) {
        abort(&mut self.advance_task);

        let session = self.session.clone();
        let event_tx = self.event_tx.clone();

        self.advance_task = Some(tokio::spawn(async move {
            tokio::time::sleep(scheduled.delay).await;

            let mut s = session.write().await;
            if let Some(result) = s.fire_scheduled_advance(scheduled.token) {
                debug!("Auto-advanced: {:?}", result);
            }
            publish(&event_tx, s.take_events());
        }));
    }
}

impl<S> Drop for QuizDriver<S>
where
    S: HighScoreStore + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.cancel_tasks();
    }
}

fn abort(task: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = task.take() {
        handle.abort();
    }
}

fn publish(tx: &broadcast::Sender<QuizEvent>, events: Vec<QuizEvent>) {
    for event in events {
        // No subscribers is fine
        let _ = tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::catalog::{Country, CountryCatalog};
    use crate::quiz::clock::{TimeLimit, TimeRemaining};
    use crate::quiz::events::EndReason;
    use crate::quiz::round::RoundState;
    use crate::quiz::scoring::ScoringRules;
    use crate::quiz::state::SessionStatus;
    use crate::store::MemoryHighScoreStore;

    fn create_driver(n: usize) -> QuizDriver<MemoryHighScoreStore> {
        let catalog = CountryCatalog::new(
            (0..n)
                .map(|i| Country::new(format!("C{i}"), format!("Country {i}"), "f.png", "Europe"))
                .collect(),
        );
        let controller = SessionController::new(
            Arc::new(catalog),
            ScoringRules::canonical(),
            MemoryHighScoreStore::default(),
        );
        QuizDriver::new(controller)
    }

    fn timed(minutes: u32) -> SessionConfig {
        SessionConfig {
            time_limit: TimeLimit::Minutes(minutes),
            seed: Some(1),
            ..Default::default()
        }
    }

    async fn current_target(driver: &QuizDriver<MemoryHighScoreStore>) -> CountryId {
        let session = driver.session();
        let s = session.read().await;
        s.current_round().unwrap().target.id.clone()
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_expires_session() {
        let mut driver = create_driver(5);
        let mut events = driver.subscribe();
        driver.start(timed(1)).await.unwrap();

        tokio::time::sleep(Duration::from_secs(30)).await;
        tokio::task::yield_now().await;
        {
            let session = driver.session();
            let s = session.read().await;
            assert_eq!(s.status(), SessionStatus::Active);
            assert!(matches!(s.time_remaining(), TimeRemaining::Seconds(30..=31)));
        }

        tokio::time::sleep(Duration::from_secs(31)).await;
        tokio::task::yield_now().await;
        {
            let session = driver.session();
            let s = session.read().await;
            assert_eq!(s.status(), SessionStatus::GameOver);
            assert_eq!(s.end_reason(), Some(EndReason::TimeExpired));
        }

        let mut ended = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, QuizEvent::SessionEnded { .. }) {
                ended += 1;
            }
        }
        assert_eq!(ended, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_stops_clock() {
        let mut driver = create_driver(5);
        driver.start(timed(1)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;

        let summary = driver.quit().await.unwrap();
        assert_eq!(summary.end_reason, Some(EndReason::Quit));

        tokio::time::sleep(Duration::from_secs(120)).await;
        let session = driver.session();
        let s = session.read().await;
        assert_eq!(s.end_reason(), Some(EndReason::Quit));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_rearms_clock() {
        let mut driver = create_driver(5);
        driver.start(timed(1)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(20)).await;
        driver.quit().await.unwrap();

        driver.restart_with(timed(2)).await.unwrap();
        {
            let session = driver.session();
            let s = session.read().await;
            assert_eq!(s.time_remaining(), TimeRemaining::Seconds(120));
        }

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        let session = driver.session();
        let s = session.read().await;
        assert_eq!(s.status(), SessionStatus::Active);
        assert_eq!(s.time_remaining(), TimeRemaining::Seconds(110));
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_advance_fires() {
        let mut driver = create_driver(5);
        driver
            .start(SessionConfig {
                auto_advance_ms: Some(1500),
                seed: Some(3),
                ..Default::default()
            })
            .await
            .unwrap();

        let target = current_target(&driver).await;
        driver.guess(&target).await.unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;
        let session = driver.session();
        let s = session.read().await;
        let round = s.current_round().unwrap();
        assert_eq!(round.number, 2);
        assert_eq!(round.state, RoundState::AwaitingGuess);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_cancels_auto_advance() {
        let mut driver = create_driver(5);
        driver
            .start(SessionConfig {
                auto_advance_ms: Some(1500),
                seed: Some(3),
                ..Default::default()
            })
            .await
            .unwrap();

        let target = current_target(&driver).await;
        driver.guess(&target).await.unwrap();
        driver.quit().await.unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;
        let session = driver.session();
        let s = session.read().await;
        assert_eq!(s.status(), SessionStatus::GameOver);
        assert_eq!(s.current_round().unwrap().number, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_via_driver() {
        let mut driver = create_driver(2);
        driver.start(timed(1)).await.unwrap();

        for _ in 0..2 {
            let target = current_target(&driver).await;
            driver.guess(&target).await.unwrap();
            let result = driver.advance().await.unwrap();
            if let AdvanceResult::GameOver(summary) = result {
                assert_eq!(summary.score, 20);
                assert_eq!(summary.end_reason, Some(EndReason::CatalogExhausted));
            }
        }

        tokio::time::sleep(Duration::from_secs(120)).await;
        let session = driver.session();
        let s = session.read().await;
        assert_eq!(s.end_reason(), Some(EndReason::CatalogExhausted));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_restart_keeps_clock() {
        let mut driver = create_driver(5);
        driver.start(timed(1)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(matches!(driver.restart().await, Err(SessionError::NotGameOver)));
        assert!(matches!(driver.restart_with(timed(2)).await, Err(SessionError::NotGameOver)));

        tokio::time::sleep(Duration::from_secs(90)).await;
        tokio::task::yield_now().await;
        let session = driver.session();
        let s = session.read().await;
        assert_eq!(s.status(), SessionStatus::GameOver);
        assert_eq!(s.end_reason(), Some(EndReason::TimeExpired));
    }

    #[tokio::test]
    async fn test_hint_and_errors() {
        let mut driver = create_driver(3);
        assert!(matches!(driver.request_hint().await, Err(SessionError::NotActive)));
        driver.start(SessionConfig::default()).await.unwrap();
        assert!(matches!(driver.request_hint().await, Ok(HintOutcome::Revealed { .. })));
        assert!(matches!(driver.restart().await, Err(SessionError::NotGameOver)));
        driver.shutdown();
    }
}
