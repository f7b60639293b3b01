mod game;
mod photo;
mod reveal;
mod score;
pub mod store;
mod vote;

pub use photo::shuffle_photos;
pub use score::{compute_results, host_dashboard, participant_results, percentage};

use crate::auth::{AuthConfig, HostSessions};
use crate::content::{ContentStore, MemoryContentStore};
use crate::error::{GameError, GameResult, StorageError};
use crate::types::*;
use std::sync::Arc;
use store::StateStore;
use tokio::sync::RwLock;

/// Shared application state
///
/// The game document sits behind a single writer lock. Every mutation runs
/// validate, mutate and save while holding it, and the in-memory copy is only
/// replaced once the save went through.
pub struct AppState {
    game: RwLock<GameState>,
    store: StateStore,
    content: Arc<dyn ContentStore>,
    auth: AuthConfig,
    sessions: HostSessions,
}

impl AppState {
    pub fn new(
        store: StateStore,
        game: GameState,
        content: Arc<dyn ContentStore>,
        auth: AuthConfig,
    ) -> Self {
        Self {
            game: RwLock::new(game),
            store,
            content,
            auth,
            sessions: HostSessions::new(),
        }
    }

    /// Load the game document from the store (creating it if needed)
    pub async fn open(
        store: StateStore,
        content: Arc<dyn ContentStore>,
        auth: AuthConfig,
    ) -> Result<Self, StorageError> {
        let game = store.load().await?;
        Ok(Self::new(store, game, content, auth))
    }

    /// Fresh game with nothing written to disk
    pub fn in_memory(auth: AuthConfig) -> Self {
        Self::new(
            StateStore::in_memory(),
            GameState::new(),
            Arc::new(MemoryContentStore::new()),
            auth,
        )
    }

    /// Copy of the current game document
    pub async fn snapshot(&self) -> GameState {
        self.game.read().await.clone()
    }

    /// Check the password and open a host session
    pub async fn login(&self, password: &str) -> GameResult<String> {
        if !self.auth.authorize(password) {
            tracing::warn!("Rejected host login attempt");
            return Err(GameError::Authorization);
        }
        let token = self.sessions.open().await;
        tracing::info!("Host logged in");
        Ok(token)
    }

    pub async fn logout(&self, session: Option<&str>) {
        if let Some(token) = session {
            if self.sessions.close(token).await {
                tracing::info!("Host logged out");
            }
        }
    }

    pub async fn is_authorized(&self, session: Option<&str>) -> bool {
        match session {
            Some(token) => self.sessions.contains(token).await,
            None => false,
        }
    }

    pub(crate) async fn require_host(&self, session: Option<&str>) -> GameResult<()> {
        if self.is_authorized(session).await {
            Ok(())
        } else {
            Err(GameError::Authorization)
        }
    }

    /// Run `op` on a draft of the document and persist it as one critical section
    pub(crate) async fn commit<T>(
        &self,
        op: impl FnOnce(&mut GameState) -> GameResult<T>,
    ) -> GameResult<T> {
        let mut game = self.game.write().await;
        let mut draft = game.clone();
        let out = op(&mut draft)?;
        if let Err(e) = self.store.save(&draft).await {
            tracing::error!("Failed to save game document: {}", e);
            return Err(e.into());
        }
        *game = draft;
        Ok(out)
    }
}
