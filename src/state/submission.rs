use super::{non_blank, AppState, RoomError};
use crate::types::*;

/// Confirmation shown to a group after its answer is stored
pub const ANSWER_RECORDED: &str = "✅ Resposta enviada";

impl AppState {
    /// Record a group's answer for the currently active question.
    ///
    /// Unlike reads and merges this never creates the room: a room without
    /// stored state has not been started by the host yet.
    pub async fn record_answer(
        &self,
        room: &RoomId,
        group: Option<&str>,
        response: Option<&str>,
    ) -> Result<(), RoomError> {
        let (Some(group), Some(response)) = (non_blank(group), non_blank(response)) else {
            return Err(RoomError::InvalidInput(
                "Missing group or response".to_string(),
            ));
        };

        let mut state = self
            .load_room(room)
            .await?
            .ok_or_else(|| RoomError::NotFound("Game not started".to_string()))?;

        let slot = state
            .active_slot()
            .ok_or_else(|| RoomError::InvalidState("No active question".to_string()))?;

        state
            .responses
            .entry(slot)
            .or_default()
            .insert(group.to_string(), response.to_string());
        self.save_room(room, &state).await?;

        tracing::debug!("Recorded answer from {} for {} in room {}", group, slot, room);
        Ok(())
    }
}
