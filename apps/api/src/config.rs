use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Panel size bounds enforced at configuration load and session creation.
pub const MIN_AGENT_COUNT: usize = 2;
pub const MAX_AGENT_COUNT: usize = 6;

/// Which provider backs the completion client. Exactly one is active per
/// process, selected by `AI_SERVICE`.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    Azure {
        endpoint: String,
        api_key: String,
        model: String,
        orchestrator_model: String,
        api_version: String,
    },
    OpenAi {
        api_key: String,
        model: String,
        orchestrator_model: String,
    },
    Gemini {
        api_key: String,
        model: String,
        orchestrator_model: String,
    },
    Local {
        base_url: String,
        model: String,
        orchestrator_model: String,
    },
}

impl BackendConfig {
    /// Model used for agent turns and next-speaker selection.
    pub fn model(&self) -> &str {
        match self {
            BackendConfig::Azure { model, .. }
            | BackendConfig::OpenAi { model, .. }
            | BackendConfig::Gemini { model, .. }
            | BackendConfig::Local { model, .. } => model,
        }
    }

    /// Model used for the single panel-composition call. Defaults to the
    /// agent model unless overridden per backend.
    pub fn orchestrator_model(&self) -> &str {
        match self {
            BackendConfig::Azure {
                orchestrator_model, ..
            }
            | BackendConfig::OpenAi {
                orchestrator_model, ..
            }
            | BackendConfig::Gemini {
                orchestrator_model, ..
            }
            | BackendConfig::Local {
                orchestrator_model, ..
            } => orchestrator_model,
        }
    }

    pub fn service_name(&self) -> &'static str {
        match self {
            BackendConfig::Azure { .. } => "azure",
            BackendConfig::OpenAi { .. } => "openai",
            BackendConfig::Gemini { .. } => "gemini",
            BackendConfig::Local { .. } => "local",
        }
    }
}

/// How the next speaker is chosen. Fixed per session at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicyKind {
    Llm,
    RoundRobin,
}

impl std::str::FromStr for SelectionPolicyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "llm" | "llm-driven" => Ok(SelectionPolicyKind::Llm),
            "round-robin" | "round_robin" => Ok(SelectionPolicyKind::RoundRobin),
            other => bail!("Unknown selection policy '{other}' (expected 'llm' or 'round-robin')"),
        }
    }
}

/// Screening knobs applied when a create request does not override them.
#[derive(Debug, Clone)]
pub struct ScreeningDefaults {
    pub agent_count: usize,
    pub round_budget_multiplier: u32,
    pub termination_keyword: String,
    pub selection_policy: SelectionPolicyKind,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    pub screening: ScreeningDefaults,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let service = require_env("AI_SERVICE")?.trim().to_lowercase();
        let backend = match service.as_str() {
            "azure" => {
                let model = env_or("AZURE_OPENAI_MODEL", "gpt-4o-mini");
                BackendConfig::Azure {
                    endpoint: require_env("AZURE_OPENAI_ENDPOINT")?,
                    api_key: require_env("AZURE_OPENAI_API_KEY")?,
                    orchestrator_model: env_or("AZURE_OPENAI_MODEL_ORCHESTRATOR", &model),
                    api_version: env_or("AZURE_OPENAI_API_VERSION", "2024-12-01-preview"),
                    model,
                }
            }
            "openai" => {
                let model = env_or("OPENAI_MODEL", "gpt-4o-mini");
                BackendConfig::OpenAi {
                    api_key: require_env("OPENAI_API_KEY")?,
                    orchestrator_model: env_or("OPENAI_MODEL_ORCHESTRATOR", &model),
                    model,
                }
            }
            "gemini" => {
                let model = env_or("GEMINI_MODEL", "gemini-1.5-flash");
                BackendConfig::Gemini {
                    api_key: require_env("GEMINI_API_KEY")?,
                    orchestrator_model: env_or("GEMINI_MODEL_ORCHESTRATOR", &model),
                    model,
                }
            }
            "local" => {
                let model = env_or("LOCAL_LLM_MODEL", "gemma-3-4b-it-qat");
                BackendConfig::Local {
                    base_url: env_or("LOCAL_LLM_BASE_URL", "http://localhost:1234/v1"),
                    orchestrator_model: env_or("LOCAL_LLM_MODEL_ORCHESTRATOR", &model),
                    model,
                }
            }
            other => bail!(
                "Invalid AI_SERVICE '{other}' (expected 'azure', 'openai', 'gemini' or 'local')"
            ),
        };

        let agent_count = env_or("AGENT_COUNT", "3")
            .parse::<usize>()
            .context("AGENT_COUNT must be a positive integer")?;
        if !(MIN_AGENT_COUNT..=MAX_AGENT_COUNT).contains(&agent_count) {
            bail!("AGENT_COUNT must be between {MIN_AGENT_COUNT} and {MAX_AGENT_COUNT}");
        }

        let round_budget_multiplier = env_or("ROUND_BUDGET_MULTIPLIER", "2")
            .parse::<u32>()
            .context("ROUND_BUDGET_MULTIPLIER must be a positive integer")?;

        let selection_policy = env_or("SELECTION_POLICY", "llm").parse::<SelectionPolicyKind>()?;

        Ok(Config {
            backend,
            screening: ScreeningDefaults {
                agent_count,
                round_budget_multiplier,
                termination_keyword: env_or("TERMINATION_KEYWORD", "yes"),
                selection_policy,
            },
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
