//! Prompt assembly for turn generation and judging.

use crate::provider::ChatMessage;

use super::prompts::{format_judge_request, format_turn_instruction, system_prompt, JUDGE_SYSTEM_PROMPT};
use super::{DebateConfig, Role, Turn};

/// Number of most-recent turns included as chat context for a turn.
pub const CONTEXT_WINDOW_TURNS: usize = 6;

/// Opponent-focus sentinel used before the other side has spoken.
pub const OPPONENT_PLACEHOLDER: &str = "(first turn)";

/// Build the message sequence for one generated turn.
///
/// Chat context is windowed to the last [`CONTEXT_WINDOW_TURNS`] turns, each
/// labeled as the generating side's own prior output or as opposing input
/// and prefixed with the speaker for disambiguation. The opponent-focus
/// field of the closing instruction is NOT windowed: it is always the most
/// recent turn by the other side over the full history.
#[must_use]
pub fn build_turn_messages(config: &DebateConfig, history: &[Turn], role: Role) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(system_prompt(role))];

    let window_start = history.len().saturating_sub(CONTEXT_WINDOW_TURNS);
    for turn in &history[window_start..] {
        let content = format!("{}: {}", turn.role.as_str().to_uppercase(), turn.text);
        if turn.role == role {
            messages.push(ChatMessage::assistant(content));
        } else {
            messages.push(ChatMessage::user(content));
        }
    }

    let opponent_last = history
        .iter()
        .rev()
        .find(|turn| turn.role != role)
        .map_or(OPPONENT_PLACEHOLDER, |turn| turn.text.as_str());

    messages.push(ChatMessage::user(format_turn_instruction(
        role,
        &config.topic,
        config.persona_for(role),
        opponent_last,
    )));

    messages
}

/// Build the message sequence for the judgment request.
#[must_use]
pub fn build_judge_messages(config: &DebateConfig, transcript: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(JUDGE_SYSTEM_PROMPT),
        ChatMessage::user(format_judge_request(&config.topic, transcript)),
    ]
}
