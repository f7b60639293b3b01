use crate::error::{GameError, GameResult};
use crate::protocol::BallotAccepted;
use crate::state::AppState;
use crate::types::*;

impl GameState {
    /// Record a complete ballot. Ballots cannot be changed afterwards.
    pub fn submit_ballot(&mut self, voter_name: &str, guesses: Ballot) -> GameResult<VoterName> {
        if !self.voting_enabled {
            return Err(GameError::VotingClosed);
        }

        let voter = voter_name.trim();
        if voter.is_empty() {
            return Err(GameError::Validation("Please enter your name".to_string()));
        }

        if self.voters.iter().any(|v| v == voter) {
            return Err(GameError::DuplicateVoter(voter.to_string()));
        }

        // Exactly one guess per current photo, nothing else
        let covers_all = guesses.len() == self.photos.len()
            && self.photos.iter().all(|p| guesses.contains_key(&p.id));
        if !covers_all {
            return Err(GameError::IncompleteBallot {
                expected: self.photos.len(),
                got: guesses.len(),
            });
        }

        self.voters.push(voter.to_string());
        self.votes.insert(voter.to_string(), guesses);
        Ok(voter.to_string())
    }
}

impl AppState {
    pub async fn submit_ballot(
        &self,
        voter_name: &str,
        guesses: Ballot,
    ) -> GameResult<BallotAccepted> {
        let (voter, voters_count) = self
            .commit(|g| {
                let voter = g.submit_ballot(voter_name, guesses)?;
                Ok((voter, g.voters.len()))
            })
            .await?;

        tracing::info!("Votes from {} submitted ({} voters)", voter, voters_count);
        Ok(BallotAccepted {
            voter,
            voters_count,
        })
    }
}
