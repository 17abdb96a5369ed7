pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::scoring::handlers as scoring;
use crate::screening::handlers as screening;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Screening API: panel conversations driven one round per call
        .route(
            "/api/v1/screenings",
            post(screening::handle_create_screening),
        )
        .route(
            "/api/v1/screenings/:id",
            get(screening::handle_get_screening).delete(screening::handle_cancel_screening),
        )
        .route(
            "/api/v1/screenings/:id/rounds",
            post(screening::handle_run_round),
        )
        .route(
            "/api/v1/screenings/:id/reset",
            post(screening::handle_reset_screening),
        )
        // Scoring API: deterministic, no model calls
        .route("/api/v1/score", post(scoring::handle_score))
        .route("/api/v1/rank", post(scoring::handle_rank))
        .with_state(state)
}
