// Prompt templates for conversation rounds.
// Placeholders use {curly_brace} style and are filled with .replace().

pub const SELECTION_SYSTEM: &str = r#"You coordinate a panel of resume screening experts. Given the panel roster and the conversation so far, you decide which panelist should speak next.

Respond with the chosen panelist's exact name and nothing else."#;

pub const SELECTION_TEMPLATE: &str = r#"PANEL:
{agents}

CONVERSATION SO FAR:
{history}

Choose the panelist who can add the most value next. Prefer panelists who have not spoken recently, and panelists whose specialty addresses open questions in the conversation.

Reply with that panelist's exact name only."#;

pub const AGENT_SYSTEM_TEMPLATE: &str = r#"You are {name}, a resume screening specialist. Your role: {role}.

{system_prompt}"#;

pub const AGENT_TURN_TEMPLATE: &str = r#"CONVERSATION SO FAR:
{history}

CURRENT PHASE: {phase} (round {round} of {max_rounds})

GUIDANCE FOR THIS PHASE: {guidance}

You are speaking next as {agent_name}. Build on what other panelists have said rather than repeating it. Keep your contribution focused on your specialty.

When, and only when, the panel has converged on final scores and a recommendation for every candidate, end your reply with the single word "{termination_keyword}". Do not write that word otherwise."#;

/// First half of the round budget.
pub const PHASE_INITIAL_ANALYSIS: &str = "Initial Analysis";
/// Remaining rounds.
pub const PHASE_DEEP_ANALYSIS: &str = "Deep Analysis & Validation";

pub const INITIAL_PHASE_GUIDANCE: &str = "Work through the resumes from your specialty's \
perspective: pull out the relevant evidence, note strengths and gaps, and give preliminary \
per-candidate scores with reasons.";

pub const DEEP_PHASE_GUIDANCE: &str = "Challenge or confirm earlier findings, resolve \
disagreements between panelists, and converge on final per-candidate scores and a ranking.";
