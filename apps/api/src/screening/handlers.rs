//! HTTP surface for screening sessions: create, drive rounds, inspect,
//! reset, cancel.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SelectionPolicyKind;
use crate::conversation::coordinator::{
    AbortReason, ConversationMessage, CoordinatorState, RoundOutcome,
};
use crate::errors::AppError;
use crate::models::screening::{dedupe_by_filename, ResumeRecord};
use crate::panel::composer::{compose_panel, AgentSpec};
use crate::screening::registry::SessionHandle;
use crate::screening::session::{ScreeningSession, SessionSettings};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateScreeningRequest {
    pub job_profile: String,
    pub resumes: Vec<ResumeRecord>,
    // Optional overrides; configured defaults apply when absent.
    pub agent_count: Option<usize>,
    pub round_budget_multiplier: Option<u32>,
    pub termination_keyword: Option<String>,
    pub selection_policy: Option<SelectionPolicyKind>,
}

#[derive(Debug, Serialize)]
pub struct CreateScreeningResponse {
    pub session_id: Uuid,
    pub panel: Vec<AgentSpec>,
    pub max_rounds: u32,
}

#[derive(Debug, Serialize)]
pub struct RoundResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<ConversationMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub rounds_completed: u32,
    pub max_rounds: u32,
    /// Phase of the next round, if one runs.
    pub phase: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: Uuid,
    pub state: &'static str,
    pub rounds_completed: u32,
    pub max_rounds: u32,
    pub phase: &'static str,
    pub panel: Vec<AgentSpec>,
    pub transcript: Vec<ConversationMessage>,
}

/// POST /api/v1/screenings
///
/// Composes a panel for the job profile (the one orchestrator call) and
/// registers a new session around it. No conversation rounds run here.
pub async fn handle_create_screening(
    State(state): State<AppState>,
    Json(request): Json<CreateScreeningRequest>,
) -> Result<Json<CreateScreeningResponse>, AppError> {
    if request.job_profile.trim().is_empty() {
        return Err(AppError::Validation("job_profile must not be empty".to_string()));
    }
    if request.resumes.is_empty() {
        return Err(AppError::Validation(
            "at least one resume is required".to_string(),
        ));
    }

    let mut settings = SessionSettings::from_defaults(&state.config.screening);
    if let Some(count) = request.agent_count {
        settings.agent_count = count;
    }
    if let Some(multiplier) = request.round_budget_multiplier {
        settings.round_budget_multiplier = multiplier;
    }
    if let Some(keyword) = request.termination_keyword {
        settings.termination_keyword = keyword;
    }
    if let Some(policy) = request.selection_policy {
        settings.selection_policy = policy;
    }

    if settings.termination_keyword.trim().is_empty() {
        return Err(AppError::Validation(
            "termination_keyword must not be empty".to_string(),
        ));
    }

    let resumes = dedupe_by_filename(request.resumes);

    let panel = compose_panel(
        state.completion.as_ref(),
        state.config.backend.orchestrator_model(),
        &request.job_profile,
        resumes.len(),
        settings.agent_count,
    )
    .await?;

    let session = ScreeningSession::new(
        panel.clone(),
        request.job_profile,
        resumes,
        &settings,
        state.completion.clone(),
        state.config.backend.model().to_string(),
    );
    let max_rounds = session.max_rounds();
    let session_id = state.sessions.insert(session).await;

    Ok(Json(CreateScreeningResponse {
        session_id,
        panel,
        max_rounds,
    }))
}

/// POST /api/v1/screenings/:id/rounds
///
/// Drives exactly one conversation round. The session mutex serializes
/// concurrent callers, so rounds within one session never interleave.
pub async fn handle_run_round(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RoundResponse>, AppError> {
    let handle = lookup(&state, id).await?;
    let mut session = handle.lock().await;

    let outcome = session.run_round().await;
    Ok(Json(round_response(
        outcome,
        session.rounds_completed(),
        session.max_rounds(),
        session.current_phase(),
    )))
}

/// GET /api/v1/screenings/:id
pub async fn handle_get_screening(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionStatusResponse>, AppError> {
    let handle = lookup(&state, id).await?;
    let session = handle.lock().await;

    Ok(Json(SessionStatusResponse {
        session_id: session.id,
        state: state_label(session.state()),
        rounds_completed: session.rounds_completed(),
        max_rounds: session.max_rounds(),
        phase: session.current_phase(),
        panel: session.panel().to_vec(),
        transcript: session.transcript().to_vec(),
    }))
}

/// POST /api/v1/screenings/:id/reset
pub async fn handle_reset_screening(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let handle = lookup(&state, id).await?;
    let mut session = handle.lock().await;

    session
        .reset()
        .map_err(|err| AppError::Conflict(err.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/screenings/:id
///
/// Cancels and unregisters the session. Locking after removal waits out any
/// in-flight round, so cancellation lands exactly at a round boundary.
pub async fn handle_cancel_screening(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let handle = state
        .sessions
        .remove(id)
        .await
        .ok_or_else(|| not_found(id))?;

    let mut session = handle.lock().await;
    session.cancel();
    Ok(StatusCode::NO_CONTENT)
}

async fn lookup(state: &AppState, id: Uuid) -> Result<SessionHandle, AppError> {
    state.sessions.get(id).await.ok_or_else(|| not_found(id))
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Screening session {id} not found"))
}

fn round_response(
    outcome: RoundOutcome,
    rounds_completed: u32,
    max_rounds: u32,
    phase: &'static str,
) -> RoundResponse {
    let (status, message, error) = match outcome {
        RoundOutcome::Continuing(message) => ("continuing", Some(message), None),
        RoundOutcome::Terminated => ("terminated", None, None),
        RoundOutcome::AbortedByBudget => ("aborted_by_budget", None, None),
        RoundOutcome::AbortedByCancellation => ("aborted_by_cancellation", None, None),
        RoundOutcome::AbortedByError(err) => ("aborted_by_error", None, Some(err.to_string())),
    };

    RoundResponse {
        status,
        message,
        error,
        rounds_completed,
        max_rounds,
        phase,
    }
}

fn state_label(state: &CoordinatorState) -> &'static str {
    match state {
        CoordinatorState::Idle => "idle",
        CoordinatorState::AwaitingSelection => "awaiting_selection",
        CoordinatorState::AwaitingCompletion => "awaiting_completion",
        CoordinatorState::Terminated => "terminated",
        CoordinatorState::Aborted(AbortReason::Budget) => "aborted_by_budget",
        CoordinatorState::Aborted(AbortReason::Cancelled) => "aborted_by_cancellation",
        CoordinatorState::Aborted(AbortReason::Error(_)) => "aborted_by_error",
    }
}
