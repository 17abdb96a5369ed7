//! Turn Coordinator — drives a screening conversation one round at a time.
//!
//! A round is: select the next speaker, run its completion, append the reply
//! to the transcript, check for termination. Rounds are strictly sequential
//! within a session; every agent prompt embeds the full prior transcript, so
//! a round must finish before the next selection can be made.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::completion::{
    complete_with_retry, BackendError, ChatMessage, CompletionClient, CompletionRequest,
};
use crate::conversation::prompts::{
    AGENT_SYSTEM_TEMPLATE, AGENT_TURN_TEMPLATE, DEEP_PHASE_GUIDANCE, INITIAL_PHASE_GUIDANCE,
    PHASE_DEEP_ANALYSIS, PHASE_INITIAL_ANALYSIS,
};
use crate::conversation::selection::SelectionPolicy;
use crate::conversation::termination::KeywordTermination;
use crate::panel::composer::AgentSpec;

/// Round budget floor: even the smallest panel gets this many rounds.
pub const MIN_ROUND_BUDGET: u32 = 4;

/// Token budget for one agent turn.
const AGENT_TURN_MAX_TOKENS: u32 = 1000;
/// Agent turns sample with mild temperature; selection and composition
/// run colder elsewhere.
const AGENT_TURN_TEMPERATURE: f32 = 0.7;

/// Budget for a session: panel size times the multiplier, floored.
pub fn round_budget(agent_count: usize, multiplier: u32) -> u32 {
    (agent_count as u32).saturating_mul(multiplier).max(MIN_ROUND_BUDGET)
}

/// Who authored a transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum MessageAuthor {
    User,
    Agent(String),
}

impl MessageAuthor {
    /// Display label used when rendering transcripts into prompts.
    pub fn label(&self) -> &str {
        match self {
            MessageAuthor::User => "User",
            MessageAuthor::Agent(name) => name,
        }
    }
}

/// One entry in the append-only conversation transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub author: MessageAuthor,
    pub content: String,
    /// Strictly increasing within one conversation lifetime.
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
}

/// Why a session stopped before the keyword fired.
#[derive(Debug, Clone)]
pub enum AbortReason {
    Budget,
    Cancelled,
    Error(BackendError),
}

impl AbortReason {
    fn to_outcome(&self) -> RoundOutcome {
        match self {
            AbortReason::Budget => RoundOutcome::AbortedByBudget,
            AbortReason::Cancelled => RoundOutcome::AbortedByCancellation,
            AbortReason::Error(err) => RoundOutcome::AbortedByError(err.clone()),
        }
    }
}

/// Coordinator lifecycle.
///
/// `AwaitingCompletion` is observable only when a driving task was dropped
/// mid-call; a later `run_round` restarts that round from selection, since
/// the abandoned reply was never appended.
#[derive(Debug, Clone)]
pub enum CoordinatorState {
    Idle,
    AwaitingSelection,
    AwaitingCompletion,
    Terminated,
    Aborted(AbortReason),
}

/// Result of one `run_round` call. Terminal variants repeat on every
/// subsequent call; `run_round` itself never fails.
#[derive(Debug, Clone)]
pub enum RoundOutcome {
    Continuing(ConversationMessage),
    Terminated,
    AbortedByBudget,
    AbortedByCancellation,
    AbortedByError(BackendError),
}

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("cannot reset while an agent completion is in flight")]
    ResetWhileInFlight,
}

pub struct TurnCoordinator {
    panel: Vec<AgentSpec>,
    client: Arc<dyn CompletionClient>,
    model: String,
    selection: Arc<dyn SelectionPolicy>,
    termination: KeywordTermination,
    screening_request: String,
    max_rounds: u32,
    state: CoordinatorState,
    history: Vec<ConversationMessage>,
    next_sequence: u64,
    rounds_completed: u32,
}

impl TurnCoordinator {
    /// Builds a coordinator and seeds the transcript with the screening
    /// request as sequence 0. Seeding happens exactly once here, never per
    /// round.
    pub fn new(
        panel: Vec<AgentSpec>,
        client: Arc<dyn CompletionClient>,
        model: String,
        selection: Arc<dyn SelectionPolicy>,
        termination: KeywordTermination,
        round_budget_multiplier: u32,
        screening_request: String,
    ) -> Self {
        let max_rounds = round_budget(panel.len(), round_budget_multiplier);
        let mut coordinator = Self {
            panel,
            client,
            model,
            selection,
            termination,
            screening_request,
            max_rounds,
            state: CoordinatorState::Idle,
            history: Vec::new(),
            next_sequence: 0,
            rounds_completed: 0,
        };
        coordinator.seed_request();
        coordinator
    }

    /// Runs exactly one round.
    ///
    /// Total by design: backend failures become `AbortedByError`, an
    /// exhausted budget becomes `AbortedByBudget`, and calls on an already
    /// terminal coordinator return the terminal outcome unchanged.
    pub async fn run_round(&mut self) -> RoundOutcome {
        match &self.state {
            CoordinatorState::Terminated => return RoundOutcome::Terminated,
            CoordinatorState::Aborted(reason) => return reason.to_outcome(),
            CoordinatorState::AwaitingCompletion => {
                // The task driving the previous round was dropped mid-call.
                // The reply was abandoned and the transcript untouched, so
                // the round restarts from selection.
                warn!(
                    "Restarting round {} after an interrupted completion",
                    self.rounds_completed + 1
                );
            }
            CoordinatorState::Idle | CoordinatorState::AwaitingSelection => {}
        }

        if self.rounds_completed >= self.max_rounds {
            info!(
                "Round budget of {} exhausted without termination",
                self.max_rounds
            );
            self.state = CoordinatorState::Aborted(AbortReason::Budget);
            return RoundOutcome::AbortedByBudget;
        }

        self.state = CoordinatorState::AwaitingSelection;

        let agent_index = match self
            .selection
            .select(&self.panel, &self.history, self.rounds_completed)
            .await
        {
            Ok(index) => index,
            Err(err) => {
                warn!("Next-speaker selection failed: {err}");
                self.state = CoordinatorState::Aborted(AbortReason::Error(err.clone()));
                return RoundOutcome::AbortedByError(err);
            }
        };
        let agent = self.panel[agent_index].clone();

        info!(
            "Round {}/{}: {} speaking",
            self.rounds_completed + 1,
            self.max_rounds,
            agent.name
        );

        self.state = CoordinatorState::AwaitingCompletion;
        let request = self.build_agent_request(&agent);
        let reply = match complete_with_retry(self.client.as_ref(), &request).await {
            Ok(completion) => completion.content,
            Err(err) => {
                warn!("Agent '{}' completion failed: {err}", agent.name);
                self.state = CoordinatorState::Aborted(AbortReason::Error(err.clone()));
                return RoundOutcome::AbortedByError(err);
            }
        };

        let message = self.append(MessageAuthor::Agent(agent.name), reply);
        self.rounds_completed += 1;

        if self.termination.should_terminate(&message.content) {
            info!(
                "Termination keyword detected in round {}, screening conversation complete",
                self.rounds_completed
            );
            self.state = CoordinatorState::Terminated;
            return RoundOutcome::Terminated;
        }

        self.state = CoordinatorState::AwaitingSelection;
        RoundOutcome::Continuing(message)
    }

    /// Clears the transcript and returns to `Idle`. The screening request is
    /// re-seeded (sequence restarts at 0) so the session can be driven again
    /// from scratch. Refused while a completion is in flight.
    pub fn reset(&mut self) -> Result<(), CoordinatorError> {
        if matches!(self.state, CoordinatorState::AwaitingCompletion) {
            return Err(CoordinatorError::ResetWhileInFlight);
        }

        self.history.clear();
        self.next_sequence = 0;
        self.rounds_completed = 0;
        self.state = CoordinatorState::Idle;
        self.seed_request();
        info!("Conversation reset");
        Ok(())
    }

    /// Cancels the session at the current round boundary. The caller's
    /// session lock serializes this with `run_round`, so no round is ever
    /// interrupted halfway. Terminal states are left unchanged.
    pub fn cancel(&mut self) {
        match self.state {
            CoordinatorState::Terminated | CoordinatorState::Aborted(_) => {}
            _ => {
                info!("Session cancelled after {} rounds", self.rounds_completed);
                self.state = CoordinatorState::Aborted(AbortReason::Cancelled);
            }
        }
    }

    pub fn state(&self) -> &CoordinatorState {
        &self.state
    }

    pub fn history(&self) -> &[ConversationMessage] {
        &self.history
    }

    pub fn panel(&self) -> &[AgentSpec] {
        &self.panel
    }

    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Phase of the upcoming round: the first half of the budget is initial
    /// analysis, the rest is validation.
    pub fn current_phase(&self) -> &'static str {
        if self.rounds_completed + 1 <= self.max_rounds / 2 {
            PHASE_INITIAL_ANALYSIS
        } else {
            PHASE_DEEP_ANALYSIS
        }
    }

    fn seed_request(&mut self) {
        let request = self.screening_request.clone();
        self.append(MessageAuthor::User, request);
    }

    fn append(&mut self, author: MessageAuthor, content: String) -> ConversationMessage {
        let message = ConversationMessage {
            author,
            content,
            sequence: self.next_sequence,
            timestamp: Utc::now(),
        };
        self.next_sequence += 1;
        self.history.push(message.clone());
        message
    }

    fn build_agent_request(&self, agent: &AgentSpec) -> CompletionRequest {
        let system = AGENT_SYSTEM_TEMPLATE
            .replace("{name}", &agent.name)
            .replace("{role}", &agent.role)
            .replace("{system_prompt}", &agent.system_prompt);

        let phase = self.current_phase();
        let guidance = if phase == PHASE_INITIAL_ANALYSIS {
            INITIAL_PHASE_GUIDANCE
        } else {
            DEEP_PHASE_GUIDANCE
        };

        let user = AGENT_TURN_TEMPLATE
            .replace("{history}", &render_transcript(&self.history))
            .replace("{phase}", phase)
            .replace("{round}", &(self.rounds_completed + 1).to_string())
            .replace("{max_rounds}", &self.max_rounds.to_string())
            .replace("{guidance}", guidance)
            .replace("{agent_name}", &agent.name)
            .replace("{termination_keyword}", self.termination.keyword());

        CompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            max_output_tokens: AGENT_TURN_MAX_TOKENS,
            temperature: Some(AGENT_TURN_TEMPERATURE),
        }
    }
}

/// Renders the transcript for embedding into prompts.
pub(crate) fn render_transcript(history: &[ConversationMessage]) -> String {
    history
        .iter()
        .map(|message| format!("{}: {}", message.author.label(), message.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::Mutex;

    use super::*;
    use crate::completion::Completion;
    use crate::conversation::selection::RoundRobinSelection;

    /// Always replies with the same content.
    struct FixedClient {
        reply: String,
    }

    #[async_trait]
    impl CompletionClient for FixedClient {
        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<Completion, BackendError> {
            Ok(Completion {
                content: self.reply.clone(),
            })
        }
    }

    /// Fails every call with a non-retryable error.
    struct BrokenClient;

    #[async_trait]
    impl CompletionClient for BrokenClient {
        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<Completion, BackendError> {
            Err(BackendError::Auth("key revoked".into()))
        }
    }

    /// Records every request it receives, then replies without the keyword.
    struct RecordingClient {
        requests: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl CompletionClient for RecordingClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<Completion, BackendError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(Completion {
                content: "analysis continues".to_string(),
            })
        }
    }

    fn panel(count: usize) -> Vec<AgentSpec> {
        (0..count)
            .map(|i| AgentSpec {
                name: format!("Agent_{i}"),
                role: format!("specialty {i}"),
                system_prompt: "You review resumes.".to_string(),
            })
            .collect()
    }

    fn coordinator_with(client: Arc<dyn CompletionClient>, agent_count: usize) -> TurnCoordinator {
        TurnCoordinator::new(
            panel(agent_count),
            client,
            "test-model".to_string(),
            Arc::new(RoundRobinSelection),
            KeywordTermination::new("yes"),
            2,
            "Job Profile: backend engineer\n\nResumes:\n1. a.pdf: ...".to_string(),
        )
    }

    #[test]
    fn test_round_budget_floor() {
        assert_eq!(round_budget(3, 2), 6);
        assert_eq!(round_budget(2, 2), 4);
        assert_eq!(round_budget(2, 1), 4);
        assert_eq!(round_budget(6, 2), 12);
    }

    #[test]
    fn test_transcript_seeded_once_at_construction() {
        let coordinator = coordinator_with(
            Arc::new(FixedClient {
                reply: "ignored".into(),
            }),
            3,
        );

        assert_eq!(coordinator.history().len(), 1);
        assert_eq!(coordinator.history()[0].sequence, 0);
        assert_eq!(coordinator.history()[0].author, MessageAuthor::User);
        assert!(matches!(coordinator.state(), CoordinatorState::Idle));
    }

    #[tokio::test]
    async fn test_keyword_terminates_in_one_round() {
        for agent_count in 2..=6 {
            let mut coordinator = coordinator_with(
                Arc::new(FixedClient {
                    reply: "All candidates scored. yes".into(),
                }),
                agent_count,
            );

            assert!(matches!(coordinator.run_round().await, RoundOutcome::Terminated));
            assert!(matches!(coordinator.state(), CoordinatorState::Terminated));
            assert_eq!(coordinator.rounds_completed(), 1);

            // Terminal outcome repeats; no further rounds run.
            assert!(matches!(coordinator.run_round().await, RoundOutcome::Terminated));
            assert_eq!(coordinator.rounds_completed(), 1);
        }
    }

    #[tokio::test]
    async fn test_budget_aborts_after_exact_round_cap() {
        let mut coordinator = coordinator_with(
            Arc::new(FixedClient {
                reply: "still deliberating".into(),
            }),
            3,
        );
        let cap = coordinator.max_rounds();
        assert_eq!(cap, 6);

        for _ in 0..cap {
            assert!(matches!(
                coordinator.run_round().await,
                RoundOutcome::Continuing(_)
            ));
        }

        assert!(matches!(
            coordinator.run_round().await,
            RoundOutcome::AbortedByBudget
        ));
        assert_eq!(coordinator.rounds_completed(), cap);

        // Idempotent thereafter.
        assert!(matches!(
            coordinator.run_round().await,
            RoundOutcome::AbortedByBudget
        ));
    }

    #[tokio::test]
    async fn test_round_robin_cycles_through_panel() {
        let mut coordinator = coordinator_with(
            Arc::new(FixedClient {
                reply: "no conclusion".into(),
            }),
            3,
        );

        let mut speakers = Vec::new();
        for _ in 0..coordinator.max_rounds() {
            if let RoundOutcome::Continuing(message) = coordinator.run_round().await {
                speakers.push(message.author.label().to_string());
            }
        }

        assert_eq!(
            speakers,
            vec!["Agent_0", "Agent_1", "Agent_2", "Agent_0", "Agent_1", "Agent_2"]
        );
    }

    #[tokio::test]
    async fn test_sequences_increase_monotonically() {
        let mut coordinator = coordinator_with(
            Arc::new(FixedClient {
                reply: "continuing".into(),
            }),
            2,
        );

        for _ in 0..coordinator.max_rounds() {
            coordinator.run_round().await;
        }

        let sequences: Vec<u64> = coordinator.history().iter().map(|m| m.sequence).collect();
        let expected: Vec<u64> = (0..sequences.len() as u64).collect();
        assert_eq!(sequences, expected);
    }

    #[tokio::test]
    async fn test_backend_error_aborts_and_sticks() {
        let mut coordinator = coordinator_with(Arc::new(BrokenClient), 3);

        let outcome = coordinator.run_round().await;
        assert!(matches!(
            outcome,
            RoundOutcome::AbortedByError(BackendError::Auth(_))
        ));
        // The failed round appended nothing.
        assert_eq!(coordinator.history().len(), 1);

        assert!(matches!(
            coordinator.run_round().await,
            RoundOutcome::AbortedByError(BackendError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_takes_effect_at_round_boundary() {
        let mut coordinator = coordinator_with(
            Arc::new(FixedClient {
                reply: "working".into(),
            }),
            3,
        );

        coordinator.run_round().await;
        coordinator.cancel();

        assert!(matches!(
            coordinator.state(),
            CoordinatorState::Aborted(AbortReason::Cancelled)
        ));
        assert!(matches!(
            coordinator.run_round().await,
            RoundOutcome::AbortedByCancellation
        ));
    }

    #[tokio::test]
    async fn test_cancel_does_not_override_terminal_state() {
        let mut coordinator = coordinator_with(
            Arc::new(FixedClient {
                reply: "done, yes".into(),
            }),
            2,
        );

        coordinator.run_round().await;
        coordinator.cancel();

        assert!(matches!(coordinator.state(), CoordinatorState::Terminated));
    }

    #[tokio::test]
    async fn test_reset_reseeds_and_allows_new_rounds() {
        let mut coordinator = coordinator_with(
            Arc::new(FixedClient {
                reply: "round content".into(),
            }),
            2,
        );

        coordinator.run_round().await;
        coordinator.run_round().await;
        assert!(coordinator.history().len() > 1);

        coordinator.reset().unwrap();

        assert!(matches!(coordinator.state(), CoordinatorState::Idle));
        assert_eq!(coordinator.rounds_completed(), 0);
        assert_eq!(coordinator.history().len(), 1);
        assert_eq!(coordinator.history()[0].sequence, 0);

        assert!(matches!(
            coordinator.run_round().await,
            RoundOutcome::Continuing(_)
        ));
    }

    #[tokio::test]
    async fn test_reset_refused_mid_completion() {
        let mut coordinator = coordinator_with(
            Arc::new(FixedClient {
                reply: "unused".into(),
            }),
            2,
        );

        // Simulate a driving task dropped mid-call.
        coordinator.state = CoordinatorState::AwaitingCompletion;

        assert!(matches!(
            coordinator.reset(),
            Err(CoordinatorError::ResetWhileInFlight)
        ));
    }

    #[tokio::test]
    async fn test_interrupted_round_restarts_from_selection() {
        let client = Arc::new(RecordingClient {
            requests: Mutex::new(Vec::new()),
        });
        let mut coordinator = coordinator_with(client.clone(), 3);

        coordinator.run_round().await;
        let history_len = coordinator.history().len();

        // Simulate the driving task dropped while awaiting the completion.
        coordinator.state = CoordinatorState::AwaitingCompletion;

        assert!(matches!(
            coordinator.run_round().await,
            RoundOutcome::Continuing(_)
        ));
        // Exactly one new transcript entry; nothing half-appended.
        assert_eq!(coordinator.history().len(), history_len + 1);
    }

    #[tokio::test]
    async fn test_phase_flips_halfway_through_budget() {
        let mut coordinator = coordinator_with(
            Arc::new(FixedClient {
                reply: "continuing".into(),
            }),
            3,
        );
        assert_eq!(coordinator.max_rounds(), 6);

        let mut phases = Vec::new();
        for _ in 0..coordinator.max_rounds() {
            phases.push(coordinator.current_phase());
            coordinator.run_round().await;
        }

        assert_eq!(
            phases,
            vec![
                PHASE_INITIAL_ANALYSIS,
                PHASE_INITIAL_ANALYSIS,
                PHASE_INITIAL_ANALYSIS,
                PHASE_DEEP_ANALYSIS,
                PHASE_DEEP_ANALYSIS,
                PHASE_DEEP_ANALYSIS,
            ]
        );
    }

    #[tokio::test]
    async fn test_agent_prompt_embeds_transcript_and_keyword() {
        let client = Arc::new(RecordingClient {
            requests: Mutex::new(Vec::new()),
        });
        let mut coordinator = coordinator_with(client.clone(), 2);

        coordinator.run_round().await;
        coordinator.run_round().await;

        let requests = client.requests.lock().unwrap();
        let second_turn = &requests[1].messages[1].content;

        // The second speaker sees both the screening request and the first
        // speaker's reply, plus the termination instruction.
        assert!(second_turn.contains("Job Profile: backend engineer"));
        assert!(second_turn.contains("Agent_0: analysis continues"));
        assert!(second_turn.contains("\"yes\""));
        assert!(requests[1].messages[0].content.contains("Agent_1"));
    }
}
