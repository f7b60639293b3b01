use super::AppState;
use crate::error::{GameError, GameResult};
use crate::protocol::{BallotPhoto, PhotoSubmitted, VotingSheet};
use crate::types::*;
use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffle photos for presentation; the set of photos is unchanged
pub fn shuffle_photos<R: Rng + ?Sized>(photos: &[Photo], rng: &mut R) -> Vec<Photo> {
    let mut shuffled = photos.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

impl GameState {
    /// Validate an upload against the registry. Returns the trimmed submitter name.
    pub fn check_submission(
        &self,
        submitter_name: &str,
        upload: Option<&PhotoUpload>,
    ) -> GameResult<String> {
        if self.phase != GamePhase::Collection {
            return Err(GameError::PhaseClosed(
                "Collection phase has ended".to_string(),
            ));
        }

        let submitter = submitter_name.trim();
        if submitter.is_empty() {
            return Err(GameError::Validation("Please enter your name".to_string()));
        }

        let Some(upload) = upload else {
            return Err(GameError::Validation(
                "No picture file provided".to_string(),
            ));
        };
        if upload.file_name.trim().is_empty() {
            return Err(GameError::Validation("No file selected".to_string()));
        }

        if self.photos.iter().any(|p| p.submitter == submitter) {
            return Err(GameError::DuplicateSubmitter(submitter.to_string()));
        }

        Ok(submitter.to_string())
    }

    /// Append a photo whose content is already stored under `filename`
    pub fn add_photo(&mut self, submitter: String, filename: StorageRef) -> Photo {
        let photo = Photo {
            id: ulid::Ulid::new().to_string(),
            filename,
            submitter,
            uploaded_at: now_rfc3339(),
        };
        self.photos.push(photo.clone());
        photo
    }

    /// Ballot sheet: shuffled photos without submitters, plus the names to pick from
    pub fn voting_sheet<R: Rng + ?Sized>(&self, rng: &mut R) -> VotingSheet {
        if !self.voting_enabled {
            return VotingSheet {
                voting_enabled: false,
                photos: Vec::new(),
                candidates: Vec::new(),
            };
        }

        let photos = shuffle_photos(&self.photos, rng)
            .iter()
            .map(BallotPhoto::from)
            .collect();
        let mut candidates: Vec<String> = self.photos.iter().map(|p| p.submitter.clone()).collect();
        candidates.sort();

        VotingSheet {
            voting_enabled: true,
            photos,
            candidates,
        }
    }
}

impl AppState {
    /// Store the photo content and register it for `submitter_name`.
    /// `upload` is None when the request carried no file at all.
    pub async fn submit_photo(
        &self,
        submitter_name: &str,
        upload: Option<PhotoUpload>,
    ) -> GameResult<PhotoSubmitted> {
        let mut game = self.game.write().await;
        let submitter = game.check_submission(submitter_name, upload.as_ref())?;
        let Some(upload) = upload else {
            return Err(GameError::Validation(
                "No picture file provided".to_string(),
            ));
        };

        let reference = self.content.put(&upload.bytes, &upload.file_name).await?;

        let mut draft = game.clone();
        let photo = draft.add_photo(submitter, reference.clone());
        if let Err(e) = self.store.save(&draft).await {
            tracing::warn!(
                "Photo content {} was stored but the game document could not be saved: {}",
                reference,
                e
            );
            if let Err(del) = self.content.delete(&reference).await {
                tracing::warn!("Orphaned photo content {} left behind: {}", reference, del);
            }
            return Err(e.into());
        }

        let photo_count = draft.photos.len();
        *game = draft;
        tracing::info!(
            "Picture from {} uploaded ({} total)",
            photo.submitter,
            photo_count
        );

        Ok(PhotoSubmitted { photo, photo_count })
    }

    /// Voting sheet in a fresh random order
    pub async fn voting_sheet(&self) -> VotingSheet {
        let game = self.game.read().await;
        let mut rng = rand::rng();
        game.voting_sheet(&mut rng)
    }
}
