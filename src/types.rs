use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque ID types for type safety
pub type PhotoId = String;
pub type VoterName = String;
/// Reference into the content store (never equal to a photo id)
pub type StorageRef = String;

/// Current on-disk document layout
/// Version 0: legacy documents without a schema_version field
/// Version 1: schema_version added, revealed_photos always present
pub const SCHEMA_VERSION: u32 = 1;

/// Minimum number of photos before voting can open
pub const MIN_PHOTOS_FOR_VOTING: usize = 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Collection,
    Voting,
    Results,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Photo {
    pub id: PhotoId,
    /// Content store reference for the image bytes
    pub filename: StorageRef,
    pub submitter: String,
    pub uploaded_at: String,
}

/// One voter's guesses: photo id -> guessed submitter name
pub type Ballot = BTreeMap<PhotoId, String>;

/// The single game document. Field names match the persisted JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameState {
    #[serde(default)]
    pub schema_version: u32,
    pub phase: GamePhase,
    #[serde(default)]
    pub voting_enabled: bool,
    pub photos: Vec<Photo>,
    /// Voter names in the order their ballots arrived
    pub voters: Vec<VoterName>,
    pub votes: BTreeMap<VoterName, Ballot>,
    #[serde(default)]
    pub revealed_photos: Vec<PhotoId>,
    #[serde(default = "now_rfc3339")]
    pub created_at: String,
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl GameState {
    /// A fresh game in the collection phase
    pub fn new() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            phase: GamePhase::Collection,
            voting_enabled: false,
            photos: Vec::new(),
            voters: Vec::new(),
            votes: BTreeMap::new(),
            revealed_photos: Vec::new(),
            created_at: now_rfc3339(),
        }
    }

    pub fn photo(&self, id: &str) -> Option<&Photo> {
        self.photos.iter().find(|p| p.id == id)
    }

    pub fn is_revealed(&self, id: &str) -> bool {
        self.revealed_photos.iter().any(|r| r == id)
    }

    /// Ballots in the order they were received
    pub fn ballots(&self) -> impl Iterator<Item = (&VoterName, &Ballot)> {
        self.voters
            .iter()
            .filter_map(|name| self.votes.get(name).map(|ballot| (name, ballot)))
    }

    pub fn has_votes(&self) -> bool {
        !self.votes.is_empty()
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw upload handed to the photo registry by the transport layer
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
