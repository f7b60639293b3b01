//! Request and response shapes exchanged with clients.

use crate::types::*;
use serde::{Deserialize, Serialize};

// ========== Requests ==========

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitVoteRequest {
    #[serde(default)]
    pub voter_name: String,
    #[serde(default)]
    pub votes: Ballot,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoRequest {
    pub photo_id: Option<PhotoId>,
}

// ========== Responses ==========

/// Generic acknowledgement for host actions
#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub redirect: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GameStatus {
    pub voting_enabled: bool,
    pub phase: GamePhase,
    pub photo_count: usize,
    pub voters_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhotoSubmitted {
    pub photo: Photo,
    pub photo_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub photo_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BallotAccepted {
    pub voter: VoterName,
    pub voters_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoteResponse {
    pub success: bool,
    pub message: String,
    pub voters_count: usize,
    pub redirect: String,
}

/// A photo as shown on the voting sheet (no submitter!)
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BallotPhoto {
    pub id: PhotoId,
    pub url: String,
}

impl From<&Photo> for BallotPhoto {
    fn from(photo: &Photo) -> Self {
        Self {
            id: photo.id.clone(),
            url: format!("/uploads/{}", photo.filename),
        }
    }
}

/// What a participant needs to fill in a ballot
#[derive(Debug, Clone, Serialize)]
pub struct VotingSheet {
    pub voting_enabled: bool,
    /// Photos in shuffled order
    pub photos: Vec<BallotPhoto>,
    /// Every submitter name, sorted
    pub candidates: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VoterScore {
    pub voter: VoterName,
    pub correct: usize,
    pub total: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IncorrectGuess {
    pub name: VoterName,
    /// None if the ballot had no entry for the photo
    pub guessed: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PhotoBreakdown {
    pub photo: Photo,
    pub correct_guessers: Vec<VoterName>,
    pub incorrect_guessers: Vec<IncorrectGuess>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResultsView {
    /// Ranked best first
    pub scores: Vec<VoterScore>,
    pub winner: Option<VoterName>,
    pub photos: Vec<PhotoBreakdown>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ParticipantPhoto {
    pub photo: Photo,
    pub is_revealed: bool,
    /// Empty until the photo is revealed
    pub correct_guessers: Vec<VoterName>,
    pub incorrect_guessers: Vec<IncorrectGuess>,
}

/// Results page for participants, revealed photo by photo
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ParticipantResults {
    pub waiting_for_voting: bool,
    pub total_photos: usize,
    pub revealed_count: usize,
    pub voters: Vec<VoterName>,
    pub photos: Vec<ParticipantPhoto>,
}

/// Everything the host panel shows
#[derive(Debug, Clone, Serialize)]
pub struct HostDashboard {
    pub phase: GamePhase,
    pub voting_enabled: bool,
    pub photo_count: usize,
    pub photos: Vec<Photo>,
    pub voters: Vec<VoterName>,
    pub revealed_photos: Vec<PhotoId>,
    /// Present once at least one ballot is in
    pub results: Option<ResultsView>,
}
