//! Error types for game operations and storage.

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;

/// Failures of the persistence layer (state document and photo content)
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed state document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid state document: {0}")]
    Invalid(String),
}

/// Errors surfaced by game operations. None of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PhaseClosed(String),

    #[error("Voting is not enabled yet")]
    VotingClosed,

    #[error("Need at least {required} pictures to start voting (have {actual})")]
    NotEnoughPhotos { required: usize, actual: usize },

    #[error("A picture from {0} already exists")]
    DuplicateSubmitter(String),

    #[error("{0} has already voted")]
    DuplicateVoter(String),

    #[error("Must vote for all pictures ({expected} expected, {got} given)")]
    IncompleteBallot { expected: usize, got: usize },

    #[error("Picture not found")]
    NotFound(String),

    #[error("Picture already revealed")]
    AlreadyRevealed(String),

    #[error("Picture not revealed")]
    NotRevealed(String),

    #[error("Unauthorized")]
    Authorization,

    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl GameError {
    /// Stable machine-readable code for clients
    pub fn code(&self) -> &'static str {
        match self {
            GameError::Validation(_) => "VALIDATION",
            GameError::PhaseClosed(_) => "PHASE_CLOSED",
            GameError::VotingClosed => "VOTING_CLOSED",
            GameError::NotEnoughPhotos { .. } => "NOT_ENOUGH_PHOTOS",
            GameError::DuplicateSubmitter(_) => "DUPLICATE_SUBMITTER",
            GameError::DuplicateVoter(_) => "DUPLICATE_VOTER",
            GameError::IncompleteBallot { .. } => "INCOMPLETE_BALLOT",
            GameError::NotFound(_) => "NOT_FOUND",
            GameError::AlreadyRevealed(_) => "ALREADY_REVEALED",
            GameError::NotRevealed(_) => "NOT_REVEALED",
            GameError::Authorization => "UNAUTHORIZED",
            GameError::Storage(_) => "STORAGE",
        }
    }
}
