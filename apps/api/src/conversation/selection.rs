//! Next-speaker selection policies.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::completion::{
    complete_with_retry, BackendError, ChatMessage, CompletionClient, CompletionRequest,
};
use crate::conversation::coordinator::{render_transcript, ConversationMessage};
use crate::conversation::prompts::{SELECTION_SYSTEM, SELECTION_TEMPLATE};
use crate::panel::composer::AgentSpec;

/// The reply is a single agent name; anything longer is wasted tokens.
const SELECTION_MAX_TOKENS: u32 = 50;

/// Picks the roster index of the next speaker.
///
/// Implementations must be total over roster contents: an unrecognizable
/// model reply falls back to a roster member rather than failing the round.
/// Only backend errors propagate.
#[async_trait]
pub trait SelectionPolicy: Send + Sync {
    async fn select(
        &self,
        roster: &[AgentSpec],
        history: &[ConversationMessage],
        round_index: u32,
    ) -> Result<usize, BackendError>;
}

/// Deterministic cycling through the roster by round index. Costs nothing
/// and never fails; the degraded-mode and test-mode policy.
pub struct RoundRobinSelection;

#[async_trait]
impl SelectionPolicy for RoundRobinSelection {
    async fn select(
        &self,
        roster: &[AgentSpec],
        _history: &[ConversationMessage],
        round_index: u32,
    ) -> Result<usize, BackendError> {
        Ok(round_index as usize % roster.len())
    }
}

/// Model-driven selection: the backend reads the roster and transcript and
/// names the next speaker.
pub struct LlmSelection {
    client: Arc<dyn CompletionClient>,
    model: String,
}

impl LlmSelection {
    pub fn new(client: Arc<dyn CompletionClient>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl SelectionPolicy for LlmSelection {
    async fn select(
        &self,
        roster: &[AgentSpec],
        history: &[ConversationMessage],
        _round_index: u32,
    ) -> Result<usize, BackendError> {
        let roster_block = roster
            .iter()
            .map(|agent| format!("- {} ({})", agent.name, agent.role))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = SELECTION_TEMPLATE
            .replace("{agents}", &roster_block)
            .replace("{history}", &render_transcript(history));

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SELECTION_SYSTEM),
                ChatMessage::user(prompt),
            ],
            max_output_tokens: SELECTION_MAX_TOKENS,
            temperature: Some(0.0),
        };

        let completion = complete_with_retry(self.client.as_ref(), &request).await?;
        Ok(parse_selected_agent(&completion.content, roster))
    }
}

/// Matches a selection reply against the roster: exact name first
/// (case-insensitive, ignoring wrapping quotes), then substring anywhere in
/// the reply. Unrecognized replies fall back to the last roster agent.
fn parse_selected_agent(reply: &str, roster: &[AgentSpec]) -> usize {
    let cleaned = reply
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '.')
        .trim();

    if let Some(index) = roster
        .iter()
        .position(|agent| agent.name.eq_ignore_ascii_case(cleaned))
    {
        return index;
    }

    let reply_lower = reply.to_lowercase();
    if let Some(index) = roster
        .iter()
        .position(|agent| reply_lower.contains(&agent.name.to_lowercase()))
    {
        return index;
    }

    warn!(
        "Selection reply '{}' matched no panelist, falling back to '{}'",
        reply.trim(),
        roster[roster.len() - 1].name
    );
    roster.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<AgentSpec> {
        ["Skills_Expert", "Experience_Expert", "Education_Expert"]
            .iter()
            .map(|name| AgentSpec {
                name: name.to_string(),
                role: "specialist".to_string(),
                system_prompt: String::new(),
            })
            .collect()
    }

    #[test]
    fn test_parse_exact_name() {
        assert_eq!(parse_selected_agent("Experience_Expert", &roster()), 1);
    }

    #[test]
    fn test_parse_is_case_insensitive_and_unquotes() {
        assert_eq!(parse_selected_agent("skills_expert", &roster()), 0);
        assert_eq!(parse_selected_agent("\"Skills_Expert\"", &roster()), 0);
        assert_eq!(parse_selected_agent("Education_Expert.", &roster()), 2);
    }

    #[test]
    fn test_parse_name_embedded_in_sentence() {
        assert_eq!(
            parse_selected_agent(
                "I think Education_Expert should evaluate the degrees next.",
                &roster()
            ),
            2
        );
    }

    #[test]
    fn test_parse_garbage_falls_back_to_last_agent() {
        assert_eq!(parse_selected_agent("nobody in particular", &roster()), 2);
        assert_eq!(parse_selected_agent("", &roster()), 2);
    }

    #[tokio::test]
    async fn test_round_robin_cycles() {
        let policy = RoundRobinSelection;
        let roster = roster();

        let mut picked = Vec::new();
        for round in 0..5 {
            picked.push(policy.select(&roster, &[], round).await.unwrap());
        }
        assert_eq!(picked, vec![0, 1, 2, 0, 1]);
    }
}
