//! Judging: transcript aggregation and the structured verdict request.

use crate::provider::ChatRequest;

use super::assembler::build_judge_messages;
use super::orchestrator::DebateEngine;
use super::{DebateError, JudgeResult, SessionStatus, Turn, SCORE_CRITERIA};

/// Flatten the full history into one transcript, one `role: text` line per
/// turn, in chronological order. Never windowed.
#[must_use]
pub fn flatten_transcript(history: &[Turn]) -> String {
    let mut transcript = String::new();
    for turn in history {
        transcript.push_str(&format!("{}: {}\n", turn.role, turn.text));
    }
    transcript
}

/// Check the fixed criteria are present and within range. Extra keys in the
/// scores map are tolerated.
fn validate_verdict(verdict: &JudgeResult) -> Result<(), DebateError> {
    for criterion in SCORE_CRITERIA {
        match verdict.scores.get(criterion) {
            None => {
                return Err(DebateError::SchemaValidation(format!(
                    "missing score for criterion '{criterion}'"
                )))
            }
            Some(score) if !(0.0..=10.0).contains(score) => {
                return Err(DebateError::SchemaValidation(format!(
                    "score for '{criterion}' out of range: {score}"
                )))
            }
            Some(_) => {}
        }
    }
    Ok(())
}

impl DebateEngine {
    /// Judge the debate and mark the session finished.
    ///
    /// May be called before the turn limit is reached: the verdict is then
    /// rendered over the partial (possibly empty) transcript and the session
    /// still transitions to finished. No automatic retry on a malformed
    /// verdict.
    ///
    /// # Errors
    ///
    /// Returns `DebateError::SessionNotFound` for unknown identifiers, a
    /// provider error when the completion fails, and
    /// `DebateError::SchemaValidation` when the returned payload does not
    /// conform to the verdict shape.
    pub async fn judge(&self, session_id: &str) -> Result<JudgeResult, DebateError> {
        let lock = self.lock_session(session_id).await;
        let _guard = lock.lock_owned().await;

        let mut session = self
            .store()
            .get(session_id)
            .await
            .ok_or_else(|| DebateError::SessionNotFound(session_id.to_string()))?;

        session.status = SessionStatus::Judging;
        session.touch();
        self.store().put(session_id, session.clone()).await;

        let transcript = flatten_transcript(&session.history);
        let messages = build_judge_messages(&session.config, &transcript);
        let request = ChatRequest::new(
            &session.config.judge_model,
            messages,
            session.config.judge_temperature,
        );
        let schema = serde_json::to_value(schemars::schema_for!(JudgeResult))
            .map_err(|e| DebateError::SchemaValidation(e.to_string()))?;

        let payload = self
            .provider()
            .complete_structured(&session.config.api_key, request, schema)
            .await?;

        let verdict: JudgeResult = serde_json::from_value(payload)
            .map_err(|e| DebateError::SchemaValidation(e.to_string()))?;
        validate_verdict(&verdict)?;

        session.status = SessionStatus::Finished;
        session.verdict = Some(verdict.clone());
        session.touch();
        self.store().put(session_id, session).await;

        tracing::info!(
            session_id = %session_id,
            winner = %verdict.winner,
            "Debate judged"
        );
        Ok(verdict)
    }
}
