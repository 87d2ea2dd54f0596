use super::{AppState, RoomError};
use crate::types::*;

impl AppState {
    /// Read a room's state, creating and persisting the default document on first access
    pub async fn get_state(&self, room: &RoomId) -> Result<RoomState, RoomError> {
        if let Some(state) = self.load_room(room).await? {
            return Ok(state);
        }

        tracing::info!("Initializing state for room {}", room);
        let state = RoomState::default();
        self.save_room(room, &state).await?;
        Ok(state)
    }

    /// Merge a partial update into a room's state and persist the result.
    ///
    /// `updates` must be a JSON object decoding as a [`RoomUpdate`]; anything
    /// else is rejected before the store is touched.
    pub async fn merge_update(
        &self,
        room: &RoomId,
        updates: Option<serde_json::Value>,
    ) -> Result<RoomState, RoomError> {
        let update = parse_update(updates)?;

        let mut state = self.load_room(room).await?.unwrap_or_default();
        state.merge(update);
        self.save_room(room, &state).await?;

        tracing::debug!("Merged update into room {}", room);
        Ok(state)
    }
}

fn parse_update(updates: Option<serde_json::Value>) -> Result<RoomUpdate, RoomError> {
    let invalid = || RoomError::InvalidInput("Invalid updates".to_string());

    match updates {
        Some(value @ serde_json::Value::Object(_)) => {
            serde_json::from_value(value).map_err(|e| {
                tracing::debug!("Rejected updates: {}", e);
                invalid()
            })
        }
        _ => Err(invalid()),
    }
}

impl RoomState {
    /// Apply an update.
    ///
    /// `responses` merge per slot (an empty slot map clears the slot) and
    /// `revealed` merges per key. Everything else is replaced wholesale.
    pub fn merge(&mut self, update: RoomUpdate) {
        if let Some(responses) = update.responses {
            for (slot, answers) in responses {
                if answers.is_empty() {
                    self.responses.insert(slot, SlotAnswers::new());
                } else {
                    self.responses.entry(slot).or_default().extend(answers);
                }
            }
        }

        if let Some(revealed) = update.revealed {
            self.revealed.extend(revealed);
        }

        if let Some(votes) = update.votes {
            self.votes = votes;
        }

        if let Some(questions) = update.questions {
            self.questions = questions;
        }

        if let Some(current_question) = update.current_question {
            self.current_question = current_question;
        }

        if let Some(ia) = update.ia {
            self.ia = ia;
        }

        self.extra.extend(update.extra);
    }
}
