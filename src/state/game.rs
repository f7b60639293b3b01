use super::{compute_results, AppState};
use crate::error::{GameError, GameResult};
use crate::protocol::{GameStatus, ResultsView};
use crate::types::*;

impl GameState {
    /// Open voting. Moves collection -> voting; later phases keep their phase.
    pub fn open_voting(&mut self) -> GameResult<()> {
        if self.photos.len() < MIN_PHOTOS_FOR_VOTING {
            return Err(GameError::NotEnoughPhotos {
                required: MIN_PHOTOS_FOR_VOTING,
                actual: self.photos.len(),
            });
        }
        if self.phase == GamePhase::Collection {
            self.phase = GamePhase::Voting;
        }
        self.voting_enabled = true;
        Ok(())
    }

    /// Pause voting without touching the phase
    pub fn close_voting(&mut self) {
        self.voting_enabled = false;
    }

    /// Results exist from the voting phase on
    pub fn check_results_available(&self) -> GameResult<()> {
        if self.phase == GamePhase::Collection {
            return Err(GameError::PhaseClosed(
                "Results are not available before voting".to_string(),
            ));
        }
        Ok(())
    }

    /// Move voting -> results the first time results are viewed.
    /// Returns whether the phase changed.
    pub fn enter_results(&mut self) -> GameResult<bool> {
        self.check_results_available()?;
        if self.phase == GamePhase::Voting {
            self.phase = GamePhase::Results;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn status(&self) -> GameStatus {
        GameStatus {
            voting_enabled: self.voting_enabled,
            phase: self.phase,
            photo_count: self.photos.len(),
            voters_count: self.voters.len(),
        }
    }
}

impl AppState {
    pub async fn status(&self) -> GameStatus {
        self.game.read().await.status()
    }

    /// Start the voting phase (host only)
    pub async fn start_voting(&self, session: Option<&str>) -> GameResult<()> {
        self.require_host(session).await?;
        self.commit(|g| g.open_voting()).await?;
        tracing::info!("Voting phase started");
        Ok(())
    }

    /// Re-enable voting after a pause (host only)
    pub async fn enable_voting(&self, session: Option<&str>) -> GameResult<()> {
        self.require_host(session).await?;
        let phase = self
            .commit(|g| {
                g.open_voting()?;
                Ok(g.phase)
            })
            .await?;
        tracing::info!("Voting enabled (phase {:?})", phase);
        Ok(())
    }

    /// Pause voting (host only)
    pub async fn disable_voting(&self, session: Option<&str>) -> GameResult<()> {
        self.require_host(session).await?;
        self.commit(|g| {
            g.close_voting();
            Ok(())
        })
        .await?;
        tracing::info!("Voting disabled");
        Ok(())
    }

    /// Wipe the game and delete every stored photo (host only).
    /// Returns the number of photos removed.
    pub async fn restart(&self, session: Option<&str>) -> GameResult<usize> {
        self.require_host(session).await?;
        let old = self
            .commit(|g| Ok(std::mem::replace(g, GameState::new())))
            .await?;

        // The new document is saved first, so nothing references these files anymore
        for photo in &old.photos {
            if let Err(e) = self.content.delete(&photo.filename).await {
                tracing::warn!("Error deleting photo {}: {}", photo.filename, e);
            }
        }

        tracing::info!("Game restarted, removed {} photos", old.photos.len());
        Ok(old.photos.len())
    }

    /// Compute the results, moving voting -> results on first view
    pub async fn view_results(&self) -> GameResult<ResultsView> {
        {
            let game = self.game.read().await;
            game.check_results_available()?;
            if game.phase == GamePhase::Results {
                return Ok(compute_results(&game));
            }
        }

        let (changed, results) = self
            .commit(|g| {
                let changed = g.enter_results()?;
                Ok((changed, compute_results(g)))
            })
            .await?;
        if changed {
            tracing::info!("Results viewed, phase is now Results");
        }
        Ok(results)
    }
}
