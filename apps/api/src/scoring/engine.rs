//! Resume Scoring Engine — deterministic, rule-based matching of one resume
//! against one job profile.
//!
//! The engine is total: any pair of strings produces a valid breakdown, with
//! neutral or floor scores standing in for missing signals. No model calls,
//! no clock reads; identical inputs always produce identical output.

use serde::{Deserialize, Serialize};

use crate::scoring::extract::{
    contains_token, count_token, extract_education, extract_experience_years, extract_skills,
};
use crate::scoring::vocab::{ENTRY_LEVEL_TOKENS, MANAGEMENT_ROLE_TOKENS, SENIOR_ROLE_TOKENS};

// ────────────────────────────────────────────────────────────────────────────
// Weights and fixed scores
// ────────────────────────────────────────────────────────────────────────────

pub const SKILL_WEIGHT: f64 = 0.35;
pub const EXPERIENCE_WEIGHT: f64 = 0.25;
pub const EDUCATION_WEIGHT: f64 = 0.15;
pub const ROLE_MATCH_WEIGHT: f64 = 0.25;

/// Job profile names no skills: neutral, slightly below average.
const SKILL_NO_REQUIREMENTS: f64 = 30.0;
/// Requirements exist but the resume matches none of them.
const SKILL_NO_OVERLAP: f64 = 5.0;

/// Job profile names no year counts.
const EXPERIENCE_NO_REQUIREMENTS: f64 = 30.0;
/// Resume shows no extractable years. Deliberately above zero so that any
/// extractable experience scores strictly higher than none.
const EXPERIENCE_FLOOR: f64 = 5.0;

/// Job profile names no education requirement.
const EDUCATION_NEUTRAL: f64 = 50.0;
const EDUCATION_MATCH: f64 = 85.0;
/// Some higher-education signal, but not the required one.
const EDUCATION_PARTIAL: f64 = 40.0;
const EDUCATION_NONE: f64 = 20.0;

// ────────────────────────────────────────────────────────────────────────────
// Result types
// ────────────────────────────────────────────────────────────────────────────

/// Full per-resume scoring result. All scores are percentages in [0, 100],
/// rounded to one decimal place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub candidate: String,
    pub overall_score: f64,
    pub skill_score: f64,
    pub experience_score: f64,
    pub education_score: f64,
    pub role_match_score: f64,
    pub extracted_skills: Vec<String>,
    pub extracted_experience_years: Vec<u32>,
    pub extracted_education: Vec<String>,
    pub explanation: String,
}

/// Recommendation bands over the overall score. The single source of truth
/// for tier thresholds, shared by explanations and candidate ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationTier {
    Strong,
    Good,
    Moderate,
    Weak,
    Poor,
}

impl RecommendationTier {
    pub fn from_overall(score: f64) -> Self {
        if score >= 75.0 {
            RecommendationTier::Strong
        } else if score >= 60.0 {
            RecommendationTier::Good
        } else if score >= 45.0 {
            RecommendationTier::Moderate
        } else if score >= 30.0 {
            RecommendationTier::Weak
        } else {
            RecommendationTier::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecommendationTier::Strong => "Strong match - recommend advancing to interview",
            RecommendationTier::Good => "Good match - consider for interview",
            RecommendationTier::Moderate => "Moderate match - review against other candidates",
            RecommendationTier::Weak => "Weak match - likely gaps against the role",
            RecommendationTier::Poor => "Poor match - does not meet the role requirements",
        }
    }
}

/// Seniority the job profile asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSeniority {
    Management,
    Senior,
    Open,
}

impl JobSeniority {
    fn label(&self) -> &'static str {
        match self {
            JobSeniority::Management => "management",
            JobSeniority::Senior => "senior",
            JobSeniority::Open => "open",
        }
    }
}

/// Seniority signals found in the resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateLevel {
    Management,
    Senior,
    EntryLevel,
    Unmarked,
}

impl CandidateLevel {
    fn label(&self) -> &'static str {
        match self {
            CandidateLevel::Management => "management",
            CandidateLevel::Senior => "senior",
            CandidateLevel::EntryLevel => "entry-level",
            CandidateLevel::Unmarked => "unmarked",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

/// Scores one resume against one job profile.
///
/// `current_year` closes open employment ranges ("2019 - present") and is
/// injected rather than read from the clock so results are reproducible.
pub fn score_resume(
    resume_content: &str,
    job_profile: &str,
    candidate_label: &str,
    current_year: i32,
) -> ScoreBreakdown {
    let resume_lower = resume_content.to_lowercase();
    let job_lower = job_profile.to_lowercase();

    let extracted_skills = extract_skills(&resume_lower);
    let extracted_years = extract_experience_years(&resume_lower, current_year);
    let extracted_education = extract_education(&resume_lower);

    let required_skills = extract_skills(&job_lower);
    let required_years = extract_experience_years(&job_lower, current_year);
    let required_education = extract_education(&job_lower);

    let job_seniority = classify_job(&job_lower);
    let candidate_level = classify_candidate(&resume_lower);

    let skill = round1(skill_score(&extracted_skills, &required_skills));
    let experience = round1(experience_score(&extracted_years, &required_years));
    let education = round1(education_score(&extracted_education, &required_education));
    let role = round1(role_match_score(job_seniority, candidate_level));

    let overall = round1(
        SKILL_WEIGHT * skill
            + EXPERIENCE_WEIGHT * experience
            + EDUCATION_WEIGHT * education
            + ROLE_MATCH_WEIGHT * role,
    );

    let explanation = build_explanation(
        overall,
        skill,
        experience,
        education,
        role,
        &extracted_skills,
        &required_skills,
        &extracted_years,
        &required_years,
        &extracted_education,
        &required_education,
        job_seniority,
        candidate_level,
    );

    ScoreBreakdown {
        candidate: candidate_label.to_string(),
        overall_score: overall,
        skill_score: skill,
        experience_score: experience,
        education_score: education,
        role_match_score: role,
        extracted_skills,
        extracted_experience_years: extracted_years,
        extracted_education,
        explanation,
    }
}

/// Coverage of the required skills, banded so strong coverage is rewarded
/// disproportionately.
fn skill_score(candidate: &[String], required: &[String]) -> f64 {
    if required.is_empty() {
        return SKILL_NO_REQUIREMENTS;
    }

    let matched = required.iter().filter(|s| candidate.contains(s)).count();
    if matched == 0 {
        return SKILL_NO_OVERLAP;
    }

    let ratio = matched as f64 / required.len() as f64;
    if ratio >= 0.8 {
        90.0 + 10.0 * ratio
    } else if ratio >= 0.5 {
        80.0 * ratio
    } else {
        60.0 * ratio
    }
}

/// Candidate's best year count against the job's highest demand.
fn experience_score(candidate_years: &[u32], required_years: &[u32]) -> f64 {
    let required_max = match required_years.iter().max() {
        Some(max) => *max,
        None => return EXPERIENCE_NO_REQUIREMENTS,
    };
    let candidate_max = match candidate_years.iter().max() {
        Some(max) => *max,
        None => return EXPERIENCE_FLOOR,
    };

    let ratio = candidate_max as f64 / required_max as f64;
    if ratio >= 1.0 {
        100.0
    } else if ratio >= 0.8 {
        85.0
    } else if ratio >= 0.6 {
        70.0
    } else if ratio >= 0.4 {
        50.0
    } else {
        // Linear ramp from the floor up to the 0.4 band edge (50.0).
        EXPERIENCE_FLOOR + ratio * 112.5
    }
}

fn education_score(candidate: &[String], required: &[String]) -> f64 {
    if required.is_empty() {
        return EDUCATION_NEUTRAL;
    }
    if candidate.iter().any(|token| required.contains(token)) {
        return EDUCATION_MATCH;
    }
    if !candidate.is_empty() {
        return EDUCATION_PARTIAL;
    }
    EDUCATION_NONE
}

/// Fixed decision table over job demand and candidate level. Rows and
/// columns are exhaustive, so every pairing has a defined score.
fn role_match_score(job: JobSeniority, candidate: CandidateLevel) -> f64 {
    use CandidateLevel as C;
    use JobSeniority as J;

    match (job, candidate) {
        (J::Management, C::Management) => 90.0,
        (J::Management, C::Senior) => 60.0,
        (J::Management, C::EntryLevel) => 10.0,
        (J::Management, C::Unmarked) => 25.0,
        (J::Senior, C::Management) => 80.0,
        (J::Senior, C::Senior) => 85.0,
        (J::Senior, C::EntryLevel) => 20.0,
        (J::Senior, C::Unmarked) => 40.0,
        (J::Open, C::Management) => 60.0,
        (J::Open, C::Senior) => 65.0,
        (J::Open, C::EntryLevel) => 70.0,
        (J::Open, C::Unmarked) => 60.0,
    }
}

fn classify_job(job_lower: &str) -> JobSeniority {
    if MANAGEMENT_ROLE_TOKENS
        .iter()
        .any(|token| contains_token(job_lower, token))
    {
        JobSeniority::Management
    } else if SENIOR_ROLE_TOKENS
        .iter()
        .any(|token| contains_token(job_lower, token))
    {
        JobSeniority::Senior
    } else {
        JobSeniority::Open
    }
}

/// Classifies the candidate from title and marker tokens.
///
/// Entry-level markers win when they strictly outnumber the strongest other
/// signal: a student resume with one "Tech Lead" club title must not
/// classify as management material, while a manager who mentions "mentoring
/// junior engineers" once must.
fn classify_candidate(resume_lower: &str) -> CandidateLevel {
    let management = count_hits(resume_lower, MANAGEMENT_ROLE_TOKENS);
    let senior = count_hits(resume_lower, SENIOR_ROLE_TOKENS);
    let entry = count_hits(resume_lower, ENTRY_LEVEL_TOKENS);

    if entry > management.max(senior) {
        CandidateLevel::EntryLevel
    } else if management > 0 {
        CandidateLevel::Management
    } else if senior > 0 {
        CandidateLevel::Senior
    } else {
        CandidateLevel::Unmarked
    }
}

fn count_hits(text_lower: &str, tokens: &[&str]) -> usize {
    tokens
        .iter()
        .map(|token| count_token(text_lower, token))
        .sum()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[allow(clippy::too_many_arguments)]
fn build_explanation(
    overall: f64,
    skill: f64,
    experience: f64,
    education: f64,
    role: f64,
    extracted_skills: &[String],
    required_skills: &[String],
    extracted_years: &[u32],
    required_years: &[u32],
    extracted_education: &[String],
    required_education: &[String],
    job_seniority: JobSeniority,
    candidate_level: CandidateLevel,
) -> String {
    let mut text = format!("Overall Matching Score: {overall:.1}%\n\n");

    text += &format!("Skill Match: {skill:.1}%\n");
    text += &format!("- Candidate skills: {}\n", list_or_placeholder(extracted_skills));
    text += &format!("- Required skills: {}\n\n", list_or_placeholder(required_skills));

    text += &format!("Experience Match: {experience:.1}%\n");
    text += &format!("- Candidate years: {}\n", years_or_placeholder(extracted_years));
    text += &format!("- Required years: {}\n\n", years_or_placeholder(required_years));

    text += &format!("Education Match: {education:.1}%\n");
    text += &format!(
        "- Candidate education: {}\n",
        list_or_placeholder(extracted_education)
    );
    text += &format!(
        "- Required education: {}\n\n",
        list_or_placeholder(required_education)
    );

    text += &format!("Role Level Match: {role:.1}%\n");
    text += &format!(
        "- Job level: {}; candidate level: {}\n\n",
        job_seniority.label(),
        candidate_level.label()
    );

    text += &format!(
        "Recommendation: {}",
        RecommendationTier::from_overall(overall).label()
    );
    text
}

fn list_or_placeholder(tokens: &[String]) -> String {
    if tokens.is_empty() {
        "not clearly specified".to_string()
    } else {
        tokens.join(", ")
    }
}

fn years_or_placeholder(years: &[u32]) -> String {
    if years.is_empty() {
        "not clearly specified".to_string()
    } else {
        years
            .iter()
            .map(|y| y.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
