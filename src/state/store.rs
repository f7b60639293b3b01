//! Persistence of the game document.
//!
//! The whole game lives in one pretty-printed JSON file so it can be inspected
//! and diffed during an event. Documents are validated on load; anything that
//! breaks the photo/voter/vote invariants is rejected instead of patched up.

use crate::error::StorageError;
use crate::types::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Loads and saves the single game document
#[derive(Debug, Clone)]
pub struct StateStore {
    /// Backing file (None = in-memory only, nothing is written)
    path: Option<PathBuf>,
}

impl StateStore {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn in_memory() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load the document, creating and saving a fresh game if none exists
    pub async fn load(&self) -> Result<GameState, StorageError> {
        let Some(path) = &self.path else {
            return Ok(GameState::new());
        };

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No game document at {}, starting a new game", path.display());
                let state = GameState::new();
                self.save(&state).await?;
                return Ok(state);
            }
            Err(e) => return Err(e.into()),
        };

        let mut state: GameState = serde_json::from_slice(&bytes)?;
        validate(&state)?;

        if state.schema_version < SCHEMA_VERSION {
            tracing::warn!(
                "Migrating game document from schema version {} to {}",
                state.schema_version,
                SCHEMA_VERSION
            );
            state.schema_version = SCHEMA_VERSION;
            self.save(&state).await?;
        }

        tracing::info!(
            "Loaded game: phase={:?}, {} photos, {} voters",
            state.phase,
            state.photos.len(),
            state.voters.len()
        );
        Ok(state)
    }

    /// Overwrite the document (write to a sibling temp file, then rename)
    pub async fn save(&self, state: &GameState) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(state)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

/// Check the invariants that every stored document must satisfy
pub fn validate(state: &GameState) -> Result<(), StorageError> {
    if state.schema_version > SCHEMA_VERSION {
        return Err(StorageError::Invalid(format!(
            "Document schema version {} is newer than supported version {}. \
             Please update the server.",
            state.schema_version, SCHEMA_VERSION
        )));
    }

    let mut photo_ids = HashSet::new();
    let mut submitters = HashSet::new();
    for photo in &state.photos {
        if !photo_ids.insert(photo.id.as_str()) {
            return Err(StorageError::Invalid(format!(
                "Duplicate photo id '{}'",
                photo.id
            )));
        }
        if !submitters.insert(photo.submitter.as_str()) {
            return Err(StorageError::Invalid(format!(
                "Duplicate submitter '{}'",
                photo.submitter
            )));
        }
    }

    let mut voters = HashSet::new();
    for voter in &state.voters {
        if !voters.insert(voter.as_str()) {
            return Err(StorageError::Invalid(format!(
                "Voter '{}' listed twice",
                voter
            )));
        }
        if !state.votes.contains_key(voter) {
            return Err(StorageError::Invalid(format!(
                "Voter '{}' has no ballot",
                voter
            )));
        }
    }

    for (voter, ballot) in &state.votes {
        if !voters.contains(voter.as_str()) {
            return Err(StorageError::Invalid(format!(
                "Ballot from '{}' who is not a registered voter",
                voter
            )));
        }
        if let Some(unknown) = ballot.keys().find(|id| !photo_ids.contains(id.as_str())) {
            return Err(StorageError::Invalid(format!(
                "Ballot from '{}' references unknown photo '{}'",
                voter, unknown
            )));
        }
    }

    if let Some(unknown) = state
        .revealed_photos
        .iter()
        .find(|id| !photo_ids.contains(id.as_str()))
    {
        return Err(StorageError::Invalid(format!(
            "Revealed photo '{}' does not exist",
            unknown
        )));
    }

    Ok(())
}
