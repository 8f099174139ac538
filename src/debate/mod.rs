//! Debate turn-orchestration and judging engine.

mod assembler;
mod error;
mod judge;
mod orchestrator;
mod prompts;
mod session;

pub use assembler::{
    build_judge_messages, build_turn_messages, CONTEXT_WINDOW_TURNS, OPPONENT_PLACEHOLDER,
};
pub use error::DebateError;
pub use judge::flatten_transcript;
pub use orchestrator::{Advance, DebateEngine, TurnEvent, TurnStream};
pub use prompts::{
    format_judge_request, format_turn_instruction, system_prompt, CON_SYSTEM_PROMPT,
    JUDGE_SYSTEM_PROMPT, PRO_SYSTEM_PROMPT,
};
pub use session::{
    DebateConfig, JudgeResult, Role, Session, SessionStatus, Turn, Winner, SCORE_CRITERIA,
};
