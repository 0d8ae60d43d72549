//! GeoBro Quiz
//!
//! Terminal front end for the quiz engine. Reads commands from stdin and
//! renders session events as they arrive.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use geo_quiz::{
    quiz::{
        catalog::{CatalogSource, JsonFileCatalog, StaticCatalog},
        events::QuizEvent,
        hint::HintOutcome,
        round::GuessOutcome,
    },
    Country, CountryId, FileHighScoreStore, QuizConfig, QuizDriver, SessionController, VERSION,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    info!("GeoBro Quiz v{}", VERSION);

    let config = match std::env::args().nth(1) {
        Some(path) => QuizConfig::load(Path::new(&path))?,
        None => QuizConfig::default(),
    };

    let source: Box<dyn CatalogSource> = match &config.catalog_path {
        Some(path) => {
            let source = JsonFileCatalog::new(path);
            info!("Catalog file: {}", source.path().display());
            Box::new(source)
        }
        None => {
            info!("No catalog configured, using the built-in sample");
            Box::new(StaticCatalog::new(sample_countries()))
        }
    };
    let store = match &config.high_score_path {
        Some(path) => FileHighScoreStore::new(path),
        None => FileHighScoreStore::default_location(),
    };
    info!("High score file: {}", store.path().display());

    let controller = SessionController::from_source(source.as_ref(), config.scoring.clone(), store)
        .context("failed to load the country catalog")?;
    let mut driver = QuizDriver::new(controller);
    let mut events = driver.subscribe();

    println!("Commands: <option number> | <country id> | hint | next | quit | restart | exit");
    driver.start(config.session.clone()).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_command(&mut driver, line.trim()).await {
                    break;
                }
            }
            event = events.recv() => match event {
                Ok(QuizEvent::RoundStarted { .. }) => print_round(&driver).await,
                Ok(event) => render_event(&event),
                Err(RecvError::Lagged(skipped)) => warn!("Skipped {} events", skipped),
                Err(RecvError::Closed) => break,
            },
        }
    }

    driver.shutdown();
    Ok(())
}

/// Run one command. Returns false when the player wants to exit.
async fn handle_command(driver: &mut QuizDriver<FileHighScoreStore>, command: &str) -> bool {
    let outcome = match command.to_lowercase().as_str() {
        "" => Ok(()),
        "exit" => return false,
        "h" | "hint" => driver.request_hint().await.map(|outcome| {
            if let HintOutcome::Denied(reason) = outcome {
                println!("No hint: {:?}", reason);
            }
        }),
        "n" | "next" => driver.advance().await.map(|_| ()),
        "q" | "quit" => driver.quit().await.map(|_| ()),
        "r" | "restart" => driver.restart().await,
        other => match other.parse::<usize>() {
            Ok(choice) if choice > 0 => driver.guess_option(choice - 1).await.map(|_| ()),
            _ => driver.guess(&CountryId::new(other.to_uppercase())).await.map(|_| ()),
        },
    };

    if let Err(e) = outcome {
        println!("{}", e);
    }
    true
}

async fn print_round(driver: &QuizDriver<FileHighScoreStore>) {
    let session = driver.session();
    let s = session.read().await;
    let Some(round) = s.current_round() else {
        return;
    };

    println!();
    println!(
        "Round {} | score {} | streak {} | best {} | hints {}",
        round.number,
        s.score(),
        s.streak(),
        s.high_score(),
        s.hints_remaining()
    );
    println!("Flag: {}", round.target.flag_ref.0);
    for (i, option) in round.options.iter().enumerate() {
        println!("  {}) {}", i + 1, option.display_name);
    }
}

fn render_event(event: &QuizEvent) {
    match event {
        QuizEvent::GuessResolved { outcome, answer, delta, score, .. } => match outcome {
            GuessOutcome::Correct => println!("Correct! {} ({:+}) score {}", answer, delta, score),
            GuessOutcome::Incorrect => {
                println!("Wrong, it was {} ({:+}) score {}. Type 'next' to continue.", answer, delta, score)
            }
        },
        QuizEvent::HintRevealed { region, remaining, .. } => {
            println!("Hint: somewhere in {} ({} hints left)", region, remaining)
        }
        QuizEvent::HighScoreBeaten { score } => println!("New personal best: {}", score),
        QuizEvent::ClockTicked { remaining_secs } => {
            if *remaining_secs <= 10 || remaining_secs % 30 == 0 {
                println!("{}s left", remaining_secs);
            }
        }
        QuizEvent::SessionEnded { reason, score, rounds } => {
            println!("Game over ({:?}): score {} after {} rounds. 'restart' or 'exit'.", reason, score, rounds)
        }
        QuizEvent::SessionStarted { .. } | QuizEvent::RoundStarted { .. } | QuizEvent::HintDenied { .. } => {}
    }
}

/// Built-in catalog used when no dataset is configured.
fn sample_countries() -> Vec<Country> {
    [
        ("FRA", "France", "fr", "Europe"),
        ("DEU", "Germany", "de", "Europe"),
        ("ISL", "Iceland", "is", "Europe"),
        ("JPN", "Japan", "jp", "Asia"),
        ("NPL", "Nepal", "np", "Asia"),
        ("KOR", "South Korea", "kr", "Asia"),
        ("BRA", "Brazil", "br", "Americas"),
        ("CAN", "Canada", "ca", "Americas"),
        ("PER", "Peru", "pe", "Americas"),
        ("KEN", "Kenya", "ke", "Africa"),
        ("CIV", "Côte d'Ivoire", "ci", "Africa"),
        ("NZL", "New Zealand", "nz", "Oceania"),
    ]
    .into_iter()
    .map(|(id, name, code, region)| {
        Country::new(id, name, format!("https://flagcdn.com/w320/{code}.png"), region)
    })
    .collect()
}
