use super::AppState;
use crate::error::{GameError, GameResult};
use crate::types::*;

impl GameState {
    fn require_photo(&self, photo_id: &str) -> GameResult<()> {
        if photo_id.trim().is_empty() {
            return Err(GameError::Validation("Picture ID required".to_string()));
        }
        if self.photo(photo_id).is_none() {
            return Err(GameError::NotFound(photo_id.to_string()));
        }
        Ok(())
    }

    /// Make a photo's guesses visible to participants
    pub fn reveal(&mut self, photo_id: &str) -> GameResult<()> {
        self.require_photo(photo_id)?;
        if self.is_revealed(photo_id) {
            return Err(GameError::AlreadyRevealed(photo_id.to_string()));
        }
        self.revealed_photos.push(photo_id.to_string());
        Ok(())
    }

    pub fn unreveal(&mut self, photo_id: &str) -> GameResult<()> {
        self.require_photo(photo_id)?;
        if !self.is_revealed(photo_id) {
            return Err(GameError::NotRevealed(photo_id.to_string()));
        }
        self.revealed_photos.retain(|id| id != photo_id);
        Ok(())
    }
}

impl AppState {
    /// Reveal a picture (host only)
    pub async fn reveal(&self, session: Option<&str>, photo_id: &str) -> GameResult<()> {
        self.require_host(session).await?;
        self.commit(|g| g.reveal(photo_id)).await?;
        tracing::info!("Picture {} revealed", photo_id);
        Ok(())
    }

    /// Un-reveal a picture (host only)
    pub async fn unreveal(&self, session: Option<&str>, photo_id: &str) -> GameResult<()> {
        self.require_host(session).await?;
        self.commit(|g| g.unreveal(photo_id)).await?;
        tracing::info!("Picture {} un-revealed", photo_id);
        Ok(())
    }
}
