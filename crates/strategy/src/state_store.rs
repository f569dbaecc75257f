//! Last-trade persistence for surviving restarts.
//!
//! Only the engine's [`PositionState`] is persisted, as a small JSON document.
//! A missing or unreadable file loads as `Flat`.

use chrono::{DateTime, Utc};
use sentiment_trader_core::PositionState;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from state persistence operations.
#[derive(Error, Debug)]
pub enum StateStoreError {
    /// IO error reading/writing file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Format saved to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    pub symbol: String,
    pub state: PositionState,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted state for `symbol`.
    ///
    /// Missing file, corrupt content, or a file written for another symbol all
    /// yield `Flat`.
    #[must_use]
    pub fn load(&self, symbol: &str) -> PositionState {
        if !self.path.exists() {
            debug!("No state file at {}, starting flat", self.path.display());
            return PositionState::Flat;
        }

        match self.read() {
            Ok(persisted) if persisted.symbol == symbol => {
                info!(
                    "Restored {} state for {} (saved {})",
                    persisted.state, symbol, persisted.updated_at
                );
                persisted.state
            }
            Ok(persisted) => {
                warn!(
                    "State file {} belongs to {}, not {}; starting flat",
                    self.path.display(),
                    persisted.symbol,
                    symbol
                );
                PositionState::Flat
            }
            Err(e) => {
                warn!("Failed to read state file {}: {}; starting flat", self.path.display(), e);
                PositionState::Flat
            }
        }
    }

    fn read(&self) -> Result<PersistedState, StateStoreError> {
        let file = File::open(&self.path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Saves the state, writing to a temp file and renaming over the target.
    ///
    /// # Errors
    /// Returns an error if the file or its parent directory cannot be written.
    pub fn save(&self, symbol: &str, state: PositionState) -> Result<(), StateStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let persisted = PersistedState {
            symbol: symbol.to_string(),
            state,
            updated_at: Utc::now(),
        };

        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer_pretty(&mut writer, &persisted)?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        debug!("Saved {} state for {} to {}", state, symbol, self.path.display());
        Ok(())
    }
}
