//! Scoring and results views. Everything here is a pure function of the game.

use crate::error::GameResult;
use crate::protocol::*;
use crate::state::AppState;
use crate::types::*;

/// Share of correct guesses, rounded to one decimal place (0 without photos)
pub fn percentage(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    // Halves go to the even neighbour: 1/16 is 6.2, not 6.3
    (correct as f64 / total as f64 * 1000.0).round_ties_even() / 10.0
}

fn score_ballot(state: &GameState, voter: &VoterName, ballot: &Ballot) -> VoterScore {
    let correct = state
        .photos
        .iter()
        .filter(|p| ballot.get(&p.id) == Some(&p.submitter))
        .count();
    let total = state.photos.len();
    VoterScore {
        voter: voter.clone(),
        correct,
        total,
        percentage: percentage(correct, total),
    }
}

/// Split voters into correct and incorrect guessers for one photo
fn photo_breakdown(state: &GameState, photo: &Photo) -> (Vec<VoterName>, Vec<IncorrectGuess>) {
    let mut correct = Vec::new();
    let mut incorrect = Vec::new();
    for (voter, ballot) in state.ballots() {
        match ballot.get(&photo.id) {
            Some(guess) if *guess == photo.submitter => correct.push(voter.clone()),
            guess => incorrect.push(IncorrectGuess {
                name: voter.clone(),
                guessed: guess.cloned(),
            }),
        }
    }
    (correct, incorrect)
}

/// Scores ranked by correct guesses. Ties keep the order ballots arrived in.
pub fn compute_results(state: &GameState) -> ResultsView {
    let mut scores: Vec<VoterScore> = state
        .ballots()
        .map(|(voter, ballot)| score_ballot(state, voter, ballot))
        .collect();
    // sort_by is stable
    scores.sort_by(|a, b| b.correct.cmp(&a.correct));

    let winner = scores.first().map(|s| s.voter.clone());

    let photos = state
        .photos
        .iter()
        .map(|photo| {
            let (correct_guessers, incorrect_guessers) = photo_breakdown(state, photo);
            PhotoBreakdown {
                photo: photo.clone(),
                correct_guessers,
                incorrect_guessers,
            }
        })
        .collect();

    ResultsView {
        scores,
        winner,
        photos,
    }
}

/// Participant results: every photo is listed, guesses only for revealed ones
pub fn participant_results(state: &GameState) -> ParticipantResults {
    let waiting = !state.voting_enabled && !state.has_votes() && state.revealed_photos.is_empty();
    if waiting {
        return ParticipantResults {
            waiting_for_voting: true,
            total_photos: state.photos.len(),
            revealed_count: 0,
            voters: Vec::new(),
            photos: Vec::new(),
        };
    }

    let photos = state
        .photos
        .iter()
        .map(|photo| {
            let is_revealed = state.is_revealed(&photo.id);
            let (correct_guessers, incorrect_guessers) = if is_revealed {
                photo_breakdown(state, photo)
            } else {
                (Vec::new(), Vec::new())
            };
            ParticipantPhoto {
                photo: photo.clone(),
                is_revealed,
                correct_guessers,
                incorrect_guessers,
            }
        })
        .collect();

    ParticipantResults {
        waiting_for_voting: false,
        total_photos: state.photos.len(),
        revealed_count: state.revealed_photos.len(),
        voters: state.voters.clone(),
        photos,
    }
}

pub fn host_dashboard(state: &GameState) -> HostDashboard {
    HostDashboard {
        phase: state.phase,
        voting_enabled: state.voting_enabled,
        photo_count: state.photos.len(),
        photos: state.photos.clone(),
        voters: state.voters.clone(),
        revealed_photos: state.revealed_photos.clone(),
        results: state.has_votes().then(|| compute_results(state)),
    }
}

impl AppState {
    pub async fn participant_results(&self) -> ParticipantResults {
        participant_results(&*self.game.read().await)
    }

    /// Host panel view (host only)
    pub async fn host_dashboard(&self, session: Option<&str>) -> GameResult<HostDashboard> {
        self.require_host(session).await?;
        Ok(host_dashboard(&*self.game.read().await))
    }

    /// Per-photo breakdown for the host, without touching the phase (host only)
    pub async fn host_results(&self, session: Option<&str>) -> GameResult<ResultsView> {
        self.require_host(session).await?;
        Ok(compute_results(&*self.game.read().await))
    }
}
