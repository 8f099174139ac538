//! System prompts and instruction templates for debaters and the judge.

use super::Role;

/// System prompt for the pro side.
pub const PRO_SYSTEM_PROMPT: &str = r#"You are the PRO debater in a structured, truth-seeking debate.

Argue FOR the topic with reason, clarity, and empathy. Persuade through credible evidence, sound logic, and intellectual openness. Acknowledge valid points from the opposing side when appropriate, but reinforce your stance with stronger reasoning and reputable sources. Avoid emotional or combative rhetoric. Stay factual, concise, and persuasive."#;

/// System prompt for the con side.
pub const CON_SYSTEM_PROMPT: &str = r#"You are the CON debater in a structured, truth-seeking debate.

Argue AGAINST the topic with reason, clarity, and empathy. Persuade through credible evidence, sound logic, and intellectual openness. Acknowledge valid points from the opposing side when appropriate, but reinforce your stance with stronger reasoning and reputable sources. Avoid emotional or combative rhetoric. Stay factual, concise, and persuasive."#;

/// System prompt for the judge.
pub const JUDGE_SYSTEM_PROMPT: &str = r#"You are an impartial debate judge.

Evaluate the debate objectively on five criteria: clarity, logic, evidence, rebuttal quality, and civility (0-10 each). Consider all turns, weighing the most recent exchanges slightly more heavily. Base your judgment on reasoning strength, factual accuracy, and respectfulness rather than rhetorical flair. Decide the overall winner: "pro", "con", or "draw".

Return ONLY valid JSON of the form:
{"winner":"pro|con|draw","scores":{"clarity":x,"logic":x,"evidence":x,"rebuttal":x,"civility":x},"reasoning":"..."}"#;

/// System prompt for a debating side.
#[must_use]
pub fn system_prompt(role: Role) -> &'static str {
    match role {
        Role::Pro => PRO_SYSTEM_PROMPT,
        Role::Con => CON_SYSTEM_PROMPT,
    }
}

/// Per-turn instruction embedding the topic, persona, and opponent focus.
#[must_use]
pub fn format_turn_instruction(
    role: Role,
    topic: &str,
    persona: &str,
    opponent_last: &str,
) -> String {
    format!(
        r#"You are the {side} debater for the topic: "{topic}".
Persona: {persona}

Carefully consider the opponent's last message:
---{opponent_last}---

Respond with a reasoned, evidence-based argument.
Keep your answer under 200 words, with no greetings or introductory phrases."#,
        side = role.as_str().to_uppercase(),
    )
}

/// Judge request embedding the topic and the full transcript.
#[must_use]
pub fn format_judge_request(topic: &str, transcript: &str) -> String {
    format!(
        r#"Topic: {topic}

Debate Transcript:
{transcript}

Evaluate the debate using the criteria: clarity, logic, evidence, rebuttal quality, and civility (0-10 each). Weigh recent turns slightly more heavily. Choose the overall winner ("pro", "con", or "draw") and provide a brief reasoning summary."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_selection() {
        assert!(system_prompt(Role::Pro).contains("PRO debater"));
        assert!(system_prompt(Role::Pro).contains("Argue FOR"));
        assert!(system_prompt(Role::Con).contains("CON debater"));
        assert!(system_prompt(Role::Con).contains("Argue AGAINST"));
    }

    #[test]
    fn test_turn_instruction_embeds_fields() {
        let instruction = format_turn_instruction(
            Role::Con,
            "Remote work is better",
            "Skeptical economist",
            "Offices foster collaboration.",
        );
        assert!(instruction.contains("CON debater"));
        assert!(instruction.contains("\"Remote work is better\""));
        assert!(instruction.contains("Persona: Skeptical economist"));
        assert!(instruction.contains("---Offices foster collaboration.---"));
    }

    #[test]
    fn test_judge_request_embeds_transcript() {
        let request = format_judge_request("The topic", "pro: a\ncon: b\n");
        assert!(request.contains("Topic: The topic"));
        assert!(request.contains("pro: a\ncon: b\n"));
        assert!(request.contains("civility"));
    }
}
