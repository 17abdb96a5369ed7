//! Screening Session — a composed panel wired to its turn coordinator.

use std::sync::Arc;

use uuid::Uuid;

use crate::completion::CompletionClient;
use crate::config::{ScreeningDefaults, SelectionPolicyKind};
use crate::conversation::coordinator::{
    ConversationMessage, CoordinatorError, CoordinatorState, RoundOutcome, TurnCoordinator,
};
use crate::conversation::selection::{LlmSelection, RoundRobinSelection, SelectionPolicy};
use crate::conversation::termination::KeywordTermination;
use crate::models::screening::ResumeRecord;
use crate::panel::composer::AgentSpec;
use crate::screening::context::build_screening_request;

/// Effective per-session settings after defaults and request overrides merge.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub agent_count: usize,
    pub round_budget_multiplier: u32,
    pub termination_keyword: String,
    pub selection_policy: SelectionPolicyKind,
}

impl SessionSettings {
    /// Starts from the configured defaults; handlers apply request overrides
    /// on top.
    pub fn from_defaults(defaults: &ScreeningDefaults) -> Self {
        Self {
            agent_count: defaults.agent_count,
            round_budget_multiplier: defaults.round_budget_multiplier,
            termination_keyword: defaults.termination_keyword.clone(),
            selection_policy: defaults.selection_policy,
        }
    }
}

/// One live screening session. All conversation state lives in the
/// coordinator; the session adds identity and the original inputs.
pub struct ScreeningSession {
    pub id: Uuid,
    pub job_profile: String,
    pub resumes: Vec<ResumeRecord>,
    coordinator: TurnCoordinator,
}

impl ScreeningSession {
    /// Wires an already-composed panel into a fresh coordinator. The
    /// screening request is built and seeded here, once.
    pub fn new(
        panel: Vec<AgentSpec>,
        job_profile: String,
        resumes: Vec<ResumeRecord>,
        settings: &SessionSettings,
        client: Arc<dyn CompletionClient>,
        model: String,
    ) -> Self {
        let selection: Arc<dyn SelectionPolicy> = match settings.selection_policy {
            SelectionPolicyKind::Llm => Arc::new(LlmSelection::new(client.clone(), model.clone())),
            SelectionPolicyKind::RoundRobin => Arc::new(RoundRobinSelection),
        };

        let request = build_screening_request(&job_profile, &resumes);
        let coordinator = TurnCoordinator::new(
            panel,
            client,
            model,
            selection,
            KeywordTermination::new(&settings.termination_keyword),
            settings.round_budget_multiplier,
            request,
        );

        Self {
            id: Uuid::new_v4(),
            job_profile,
            resumes,
            coordinator,
        }
    }

    pub async fn run_round(&mut self) -> RoundOutcome {
        self.coordinator.run_round().await
    }

    pub fn reset(&mut self) -> Result<(), CoordinatorError> {
        self.coordinator.reset()
    }

    pub fn cancel(&mut self) {
        self.coordinator.cancel();
    }

    pub fn state(&self) -> &CoordinatorState {
        self.coordinator.state()
    }

    pub fn transcript(&self) -> &[ConversationMessage] {
        self.coordinator.history()
    }

    pub fn panel(&self) -> &[AgentSpec] {
        self.coordinator.panel()
    }

    pub fn rounds_completed(&self) -> u32 {
        self.coordinator.rounds_completed()
    }

    pub fn max_rounds(&self) -> u32 {
        self.coordinator.max_rounds()
    }

    pub fn current_phase(&self) -> &'static str {
        self.coordinator.current_phase()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::completion::{BackendError, Completion, CompletionRequest};

    struct FixedClient;

    #[async_trait]
    impl CompletionClient for FixedClient {
        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<Completion, BackendError> {
            Ok(Completion {
                content: "scored everyone. yes".to_string(),
            })
        }
    }

    fn settings() -> SessionSettings {
        SessionSettings {
            agent_count: 2,
            round_budget_multiplier: 2,
            termination_keyword: "yes".to_string(),
            selection_policy: SelectionPolicyKind::RoundRobin,
        }
    }

    fn panel() -> Vec<AgentSpec> {
        vec![
            AgentSpec {
                name: "A".into(),
                role: "r".into(),
                system_prompt: "p".into(),
            },
            AgentSpec {
                name: "B".into(),
                role: "r".into(),
                system_prompt: "p".into(),
            },
        ]
    }

    #[tokio::test]
    async fn test_session_seeds_transcript_and_terminates() {
        let mut session = ScreeningSession::new(
            panel(),
            "Backend engineer".to_string(),
            vec![ResumeRecord {
                filename: "a.pdf".into(),
                content: "python".into(),
            }],
            &settings(),
            Arc::new(FixedClient),
            "model".to_string(),
        );

        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.max_rounds(), 4);
        assert!(session.transcript()[0].content.contains("Backend engineer"));

        assert!(matches!(session.run_round().await, RoundOutcome::Terminated));
        assert!(matches!(session.state(), CoordinatorState::Terminated));
    }

    #[test]
    fn test_settings_start_from_defaults() {
        let defaults = ScreeningDefaults {
            agent_count: 4,
            round_budget_multiplier: 3,
            termination_keyword: "done".to_string(),
            selection_policy: SelectionPolicyKind::Llm,
        };

        let settings = SessionSettings::from_defaults(&defaults);
        assert_eq!(settings.agent_count, 4);
        assert_eq!(settings.round_budget_multiplier, 3);
        assert_eq!(settings.termination_keyword, "done");
        assert_eq!(settings.selection_policy, SelectionPolicyKind::Llm);
    }
}
