use std::sync::Arc;

use crate::completion::CompletionClient;
use crate::config::Config;
use crate::screening::registry::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable completion backend. Selected once at startup via AI_SERVICE.
    pub completion: Arc<dyn CompletionClient>,
    pub config: Config,
    pub sessions: SessionRegistry,
}
