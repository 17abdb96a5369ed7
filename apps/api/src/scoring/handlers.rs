//! HTTP surface over the deterministic scoring engine. These endpoints are
//! synchronous and total: no session, no model calls.

use axum::Json;
use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::models::screening::ResumeRecord;
use crate::scoring::engine::{score_resume, ScoreBreakdown};
use crate::scoring::rank::{rank_candidates, CandidateRanking, DEFAULT_TOP_N};

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub resume: ResumeRecord,
    pub job_profile: String,
    /// Display label for the candidate; defaults to the resume filename.
    pub candidate_label: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub resumes: Vec<ResumeRecord>,
    pub job_profile: String,
    pub top_n: Option<usize>,
}

/// POST /api/v1/score
pub async fn handle_score(Json(request): Json<ScoreRequest>) -> Json<ScoreBreakdown> {
    let label = request
        .candidate_label
        .unwrap_or_else(|| request.resume.filename.clone());

    Json(score_resume(
        &request.resume.content,
        &request.job_profile,
        &label,
        Utc::now().year(),
    ))
}

/// POST /api/v1/rank
pub async fn handle_rank(Json(request): Json<RankRequest>) -> Json<CandidateRanking> {
    let current_year = Utc::now().year();
    let breakdowns = request
        .resumes
        .iter()
        .map(|resume| {
            score_resume(
                &resume.content,
                &request.job_profile,
                &resume.filename,
                current_year,
            )
        })
        .collect();

    Json(rank_candidates(
        breakdowns,
        request.top_n.unwrap_or(DEFAULT_TOP_N),
    ))
}
