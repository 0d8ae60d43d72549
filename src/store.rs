//! High Score Persistence
//!
//! The controller receives a [`HighScoreStore`] at construction instead of
//! reaching for a global storage key. Two implementations ship with the
//! crate: an in-memory store for tests and a JSON file for the terminal
//! front end.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// High score storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying file I/O failed.
    #[error("high score I/O error at {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Stored record could not be decoded.
    #[error("corrupt high score record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Read/write contract for the installation-wide best score.
pub trait HighScoreStore {
    /// Stored best, or 0 when nothing has been stored.
    fn read(&self) -> Result<i64, StoreError>;

    /// Replace the stored best.
    fn write(&self, score: i64) -> Result<(), StoreError>;
}

impl<T: HighScoreStore + ?Sized> HighScoreStore for Arc<T> {
    fn read(&self) -> Result<i64, StoreError> {
        (**self).read()
    }

    fn write(&self, score: i64) -> Result<(), StoreError> {
        (**self).write(score)
    }
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// In-memory store. Clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScoreStore {
    value: Arc<AtomicI64>,
}

impl MemoryHighScoreStore {
    /// Create with an initial stored value.
    pub fn with_score(score: i64) -> Self {
        Self {
            value: Arc::new(AtomicI64::new(score)),
        }
    }

    /// Current stored value.
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::SeqCst)
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    fn read(&self) -> Result<i64, StoreError> {
        Ok(self.get())
    }

    fn write(&self, score: i64) -> Result<(), StoreError> {
        self.value.store(score, Ordering::SeqCst);
        Ok(())
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// On-disk record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    /// Best score
    pub score: i64,
    /// When it was set
    pub achieved_at: DateTime<Utc>,
}

/// JSON file store.
#[derive(Debug, Clone)]
pub struct FileHighScoreStore {
    path: PathBuf,
}

impl FileHighScoreStore {
    /// Store at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform data directory, or the working directory when
    /// there is none.
    pub fn default_location() -> Self {
        let path = dirs::data_dir()
            .map(|dir| dir.join("geo-quiz").join("high_score.json"))
            .unwrap_or_else(|| PathBuf::from("geo_quiz_high_score.json"));
        Self::new(path)
    }

    /// File path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full stored record, if any.
    pub fn read_record(&self) -> Result<Option<HighScoreRecord>, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn read(&self) -> Result<i64, StoreError> {
        Ok(self.read_record()?.map_or(0, |record| record.score))
    }

    fn write(&self, score: i64) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let record = HighScoreRecord {
            score,
            achieved_at: Utc::now(),
        };
        let json = serde_json::to_vec_pretty(&record)?;

        // Write then rename so a crash never leaves a torn file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        debug!("High score {} written to {}", score, self.path.display());
        Ok(())
    }
}
