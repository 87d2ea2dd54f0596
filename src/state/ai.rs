use super::{non_blank, AppState, RoomError};
use crate::types::*;

/// The provider's answer and whether it made it into the room document
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAnswer {
    pub text: String,
    pub persisted: bool,
}

/// Build the user prompt, putting optional context ahead of the question
fn compose_prompt(question: &str, context: Option<&str>) -> String {
    match non_blank(context) {
        Some(context) => format!(
            "Contexto:\n{}\n\nPergunta:\n{}",
            context.trim(),
            question.trim()
        ),
        None => question.trim().to_string(),
    }
}

impl AppState {
    /// Ask the provider a question and optionally store the answer as the AI participant.
    ///
    /// The text is returned even when it could not be stored; persistence
    /// problems are logged, never reported to the caller.
    pub async fn generate_answer(
        &self,
        room: &RoomId,
        question: Option<&str>,
        context: Option<&str>,
        save_to_state: bool,
    ) -> Result<GeneratedAnswer, RoomError> {
        let question = non_blank(question)
            .ok_or_else(|| RoomError::InvalidInput("Missing question".to_string()))?;

        let request = self.llm_config.request(compose_prompt(question, context));
        let response = self.llm.generate(request).await?;

        tracing::info!(
            "Generated answer for room {} via {} ({}) in {}ms",
            room,
            response.metadata.provider,
            response.metadata.model,
            response.metadata.latency_ms
        );

        let text = response.text;
        let persisted = if save_to_state {
            match self.store_ai_answer(room, &text).await {
                Ok(persisted) => persisted,
                Err(e) => {
                    tracing::error!("Failed to store AI answer for room {}: {}", room, e);
                    false
                }
            }
        } else {
            false
        };

        Ok(GeneratedAnswer { text, persisted })
    }

    /// Write the answer into `ia` and the active slot; `Ok(false)` when skipped
    async fn store_ai_answer(&self, room: &RoomId, text: &str) -> Result<bool, RoomError> {
        let Some(mut state) = self.load_room(room).await? else {
            tracing::warn!("Room {} has no state, AI answer not stored", room);
            return Ok(false);
        };

        let Some(slot) = state.active_slot() else {
            tracing::warn!("Room {} has no active question, AI answer not stored", room);
            return Ok(false);
        };

        state.ia = Some(text.to_string());
        state
            .responses
            .entry(slot)
            .or_default()
            .insert(AI_PARTICIPANT.to_string(), text.to_string());
        self.save_room(room, &state).await?;

        Ok(true)
    }
}
