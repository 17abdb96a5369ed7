//! In-process session registry. Sessions are memory-only and do not survive
//! restarts; evaluation state is cheap to rebuild from the original inputs.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::screening::session::ScreeningSession;

/// Shared handle to one session. The per-session mutex serializes rounds,
/// reset and cancel, keeping turns strictly sequential within a session
/// while distinct sessions run concurrently.
pub type SessionHandle = Arc<Mutex<ScreeningSession>>;

#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session and returns its id.
    pub async fn insert(&self, session: ScreeningSession) -> Uuid {
        let id = session.id;
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Removes the session, returning its handle so the caller can finish
    /// shutting it down (any in-flight round still holds the mutex).
    pub async fn remove(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.write().await.remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::completion::{
        BackendError, Completion, CompletionClient, CompletionRequest,
    };
    use crate::config::SelectionPolicyKind;
    use crate::panel::composer::AgentSpec;
    use crate::screening::session::SessionSettings;

    struct NoopClient;

    #[async_trait]
    impl CompletionClient for NoopClient {
        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<Completion, BackendError> {
            Ok(Completion {
                content: String::new(),
            })
        }
    }

    fn session() -> ScreeningSession {
        ScreeningSession::new(
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
            ],
            "job".to_string(),
            Vec::new(),
            &SessionSettings {
                agent_count: 2,
                round_budget_multiplier: 2,
                termination_keyword: "yes".to_string(),
                selection_policy: SelectionPolicyKind::RoundRobin,
            },
            Arc::new(NoopClient),
            "model".to_string(),
        )
    }

    #[tokio::test]
    async fn test_insert_get_remove_roundtrip() {
        let registry = SessionRegistry::new();
        let id = registry.insert(session()).await;

        let handle = registry.get(id).await.expect("session should exist");
        assert_eq!(handle.lock().await.id, id);

        assert!(registry.remove(id).await.is_some());
        assert!(registry.get(id).await.is_none());
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_none() {
        let registry = SessionRegistry::new();
        assert!(registry.get(Uuid::new_v4()).await.is_none());
    }
}
