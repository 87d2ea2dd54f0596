use super::{non_blank, AppState, RoomError};
use crate::types::*;

/// Confirmation shown to a juror after the vote is stored
pub const VOTE_RECORDED: &str = "✅ Voto registrado";

impl AppState {
    /// Record (or overwrite) a juror's vote
    pub async fn record_vote(
        &self,
        room: &RoomId,
        juror: Option<&str>,
        vote: Option<&str>,
    ) -> Result<Vote, RoomError> {
        let (Some(juror), Some(vote)) = (non_blank(juror), vote.and_then(Vote::parse)) else {
            return Err(RoomError::InvalidInput("Invalid vote".to_string()));
        };

        let mut state = self
            .load_room(room)
            .await?
            .ok_or_else(|| RoomError::NotFound("Game not started".to_string()))?;

        state.votes.insert(juror.to_string(), vote);
        self.save_room(room, &state).await?;

        tracing::debug!("Recorded vote {:?} from juror {} in room {}", vote, juror, room);
        Ok(vote)
    }
}
