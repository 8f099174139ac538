//! Debate session data model.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Debating side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Pro,
    Con,
}

impl Role {
    /// The opposing side.
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Pro => Self::Con,
            Self::Con => Self::Pro,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pro => "pro",
            Self::Con => "con",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed, non-empty contribution by either side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    /// Create a turn. Callers are expected to pass trimmed, non-empty text.
    #[must_use]
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Running,
    Judging,
    Finished,
}

/// Immutable configuration of one debate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateConfig {
    /// Provider credential; falls back to the configured environment
    /// variable when left empty at session start.
    #[serde(default)]
    pub api_key: String,
    /// The proposition under debate.
    pub topic: String,
    /// Number of rounds; one round is one pro turn plus one con turn.
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    #[serde(default = "default_pro_persona")]
    pub pro_persona: String,
    #[serde(default = "default_model")]
    pub pro_model: String,
    #[serde(default = "default_debater_temperature")]
    pub pro_temperature: f32,
    #[serde(default = "default_con_persona")]
    pub con_persona: String,
    #[serde(default = "default_model")]
    pub con_model: String,
    #[serde(default = "default_debater_temperature")]
    pub con_temperature: f32,
    #[serde(default = "default_model")]
    pub judge_model: String,
    #[serde(default = "default_judge_temperature")]
    pub judge_temperature: f32,
}

fn default_rounds() -> u32 {
    3
}

fn default_pro_persona() -> String {
    "Logical, concise, cites studies.".to_string()
}

fn default_con_persona() -> String {
    "Creative, skeptical, challenges assumptions.".to_string()
}

fn default_model() -> String {
    "nvidia/nemotron-nano-9b-v2:free".to_string()
}

fn default_debater_temperature() -> f32 {
    0.7
}

fn default_judge_temperature() -> f32 {
    0.5
}

impl DebateConfig {
    /// Create a config for a topic with all defaults.
    #[must_use]
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            api_key: String::new(),
            topic: topic.into(),
            rounds: default_rounds(),
            pro_persona: default_pro_persona(),
            pro_model: default_model(),
            pro_temperature: default_debater_temperature(),
            con_persona: default_con_persona(),
            con_model: default_model(),
            con_temperature: default_debater_temperature(),
            judge_model: default_model(),
            judge_temperature: default_judge_temperature(),
        }
    }

    /// Model identifier configured for a debating side.
    #[must_use]
    pub fn model_for(&self, role: Role) -> &str {
        match role {
            Role::Pro => &self.pro_model,
            Role::Con => &self.con_model,
        }
    }

    /// Sampling temperature configured for a debating side.
    #[must_use]
    pub fn temperature_for(&self, role: Role) -> f32 {
        match role {
            Role::Pro => self.pro_temperature,
            Role::Con => self.con_temperature,
        }
    }

    /// Persona text configured for a debating side.
    #[must_use]
    pub fn persona_for(&self, role: Role) -> &str {
        match role {
            Role::Pro => &self.pro_persona,
            Role::Con => &self.con_persona,
        }
    }

    /// Turn limit for this debate.
    #[must_use]
    pub fn max_turns(&self) -> usize {
        self.rounds as usize * 2
    }
}

/// The mutable record of one debate instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque unique identifier.
    pub id: String,
    pub config: DebateConfig,
    /// Completed turns, in debate order. Append-only.
    #[serde(default)]
    pub history: Vec<Turn>,
    #[serde(default)]
    pub status: SessionStatus,
    /// The side addressed by the next advance call.
    #[serde(default)]
    pub next_role: Role,
    /// Verdict attached once judging completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<JudgeResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a fresh session for a config. The pro side always opens.
    #[must_use]
    pub fn new(config: DebateConfig) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            config,
            history: Vec::new(),
            status: SessionStatus::Running,
            next_role: Role::Pro,
            verdict: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Turn limit for this session.
    #[must_use]
    pub fn max_turns(&self) -> usize {
        self.config.max_turns()
    }

    /// Whether the debate has reached its configured turn limit.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.history.len() >= self.max_turns()
    }

    /// Refresh the modification timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// The fixed judging criteria, each scored 0-10.
pub const SCORE_CRITERIA: [&str; 5] = ["clarity", "logic", "evidence", "rebuttal", "civility"];

/// Overall verdict of the debate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Pro,
    Con,
    Draw,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pro => f.write_str("pro"),
            Self::Con => f.write_str("con"),
            Self::Draw => f.write_str("draw"),
        }
    }
}

/// Structured judgment over a full debate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct JudgeResult {
    /// Overall verdict: pro, con, or draw.
    pub winner: Winner,
    /// Score per criterion (clarity, logic, evidence, rebuttal, civility),
    /// each in 0-10.
    pub scores: HashMap<String, f64>,
    /// Concise justification for the verdict.
    pub reasoning: String,
}
