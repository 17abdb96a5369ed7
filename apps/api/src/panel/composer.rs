//! Panel Composer — one orchestrator completion that proposes the reviewer
//! panel for a screening session, then local validation and normalization.
//!
//! Exactly one outbound call per composition. Partial panels are surfaced
//! as-is and over-delivery is truncated; agents are never invented locally
//! to fill a gap.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::completion::{
    complete_with_retry, strip_json_fences, BackendError, ChatMessage, CompletionClient,
    CompletionRequest,
};
use crate::config::{MAX_AGENT_COUNT, MIN_AGENT_COUNT};
use crate::panel::prompts::{PANEL_COMPOSITION_SYSTEM, PANEL_COMPOSITION_TEMPLATE};

/// Token budget for the composition call. Generous: the response carries one
/// system prompt per agent.
const COMPOSITION_MAX_TOKENS: u32 = 5000;

#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("backend completion failed: {0}")]
    Backend(#[from] BackendError),

    #[error("panel response was not parseable: {0}")]
    Unparseable(String),

    #[error("panel response contained no agents")]
    EmptyPanel,

    #[error(
        "agent count {requested} is outside the supported range {min}-{max}",
        min = MIN_AGENT_COUNT,
        max = MAX_AGENT_COUNT
    )]
    InvalidAgentCount { requested: usize },
}

/// One reviewer agent on a screening panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Unique within a panel; normalized to `[A-Za-z0-9_-]`.
    pub name: String,
    pub role: String,
    pub system_prompt: String,
}

#[derive(Debug, Deserialize)]
struct PanelResponse {
    agents: Vec<ProposedAgent>,
}

#[derive(Debug, Deserialize)]
struct ProposedAgent {
    name: String,
    role: String,
    system_prompt: String,
}

/// Composes the reviewer panel for one screening session.
pub async fn compose_panel(
    client: &dyn CompletionClient,
    orchestrator_model: &str,
    job_profile: &str,
    resume_count: usize,
    desired_agent_count: usize,
) -> Result<Vec<AgentSpec>, CompositionError> {
    if !(MIN_AGENT_COUNT..=MAX_AGENT_COUNT).contains(&desired_agent_count) {
        return Err(CompositionError::InvalidAgentCount {
            requested: desired_agent_count,
        });
    }

    let prompt = PANEL_COMPOSITION_TEMPLATE
        .replace("{agent_count}", &desired_agent_count.to_string())
        .replace("{resume_count}", &resume_count.to_string())
        .replace("{job_profile}", job_profile);

    let request = CompletionRequest {
        model: orchestrator_model.to_string(),
        messages: vec![
            ChatMessage::system(PANEL_COMPOSITION_SYSTEM),
            ChatMessage::user(prompt),
        ],
        max_output_tokens: COMPOSITION_MAX_TOKENS,
        temperature: None,
    };

    let completion = complete_with_retry(client, &request).await?;
    let mut panel = parse_panel(&completion.content)?;

    if panel.len() > desired_agent_count {
        warn!(
            "Panel composer returned {} agents, truncating to {}",
            panel.len(),
            desired_agent_count
        );
        panel.truncate(desired_agent_count);
    } else if panel.len() < desired_agent_count {
        warn!(
            "Panel composer returned {} of {} requested agents, proceeding with the smaller panel",
            panel.len(),
            desired_agent_count
        );
    }

    info!(
        "Panel composed: {}",
        panel
            .iter()
            .map(|agent| agent.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(panel)
}

/// Parses and normalizes the composer's reply.
fn parse_panel(content: &str) -> Result<Vec<AgentSpec>, CompositionError> {
    let text = strip_json_fences(content);
    let response: PanelResponse =
        serde_json::from_str(text).map_err(|e| CompositionError::Unparseable(e.to_string()))?;

    let mut panel: Vec<AgentSpec> = response
        .agents
        .into_iter()
        .map(|agent| AgentSpec {
            name: normalize_agent_name(&agent.name),
            role: agent.role,
            system_prompt: agent.system_prompt,
        })
        .collect();

    if panel.is_empty() {
        return Err(CompositionError::EmptyPanel);
    }

    dedupe_names(&mut panel);
    Ok(panel)
}

/// Agent names become conversation identifiers, so anything outside
/// `[A-Za-z0-9_-]` is replaced with an underscore.
fn normalize_agent_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Collision policy: a later duplicate gets a `_2`, `_3`, ... suffix rather
/// than being dropped.
fn dedupe_names(panel: &mut [AgentSpec]) {
    let mut seen: Vec<String> = Vec::with_capacity(panel.len());

    for agent in panel.iter_mut() {
        if seen.contains(&agent.name) {
            let mut counter = 2;
            let renamed = loop {
                let candidate = format!("{}_{}", agent.name, counter);
                if !seen.contains(&candidate) {
                    break candidate;
                }
                counter += 1;
            };
            warn!("Duplicate agent name '{}' renamed to '{}'", agent.name, renamed);
            agent.name = renamed;
        }
        seen.push(agent.name.clone());
    }
}
