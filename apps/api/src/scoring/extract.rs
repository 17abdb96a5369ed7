//! Deterministic signal extraction from free text.
//!
//! Everything here operates on already lower-cased input and is pure: no
//! model calls, no clock reads. The current year is injected by the caller
//! so date-range inference stays reproducible.

use regex::Regex;

use crate::scoring::vocab::{
    DEGREE_TOKENS, FIELD_TOKENS, INSTITUTION_TOKENS, MANAGEMENT_SKILLS, TECHNICAL_SKILLS,
};

/// Spans outside this window are treated as noise (page numbers, typos).
const PLAUSIBLE_YEARS: std::ops::RangeInclusive<i64> = 1..=50;

/// Number of boundary-delimited occurrences of `token` in `text`.
///
/// A match counts only when the characters immediately before and after it
/// are absent or non-alphanumeric, so "java" does not fire on "javascript"
/// and "intern" does not fire on "internship". Both arguments must already
/// be lower-cased.
pub(crate) fn count_token(text: &str, token: &str) -> usize {
    if token.is_empty() {
        return 0;
    }

    let boundary = |c: Option<char>| c.map_or(true, |c| !c.is_alphanumeric());

    text.match_indices(token)
        .filter(|(idx, matched)| {
            let before = text[..*idx].chars().next_back();
            let after = text[idx + matched.len()..].chars().next();
            boundary(before) && boundary(after)
        })
        .count()
}

/// True when `token` occurs at least once, boundary-delimited.
pub(crate) fn contains_token(text: &str, token: &str) -> bool {
    count_token(text, token) > 0
}

/// Skills present in the text, drawn from the technical and management
/// vocabularies. Returned sorted for stable comparisons and explanations.
pub(crate) fn extract_skills(text_lower: &str) -> Vec<String> {
    let mut found: Vec<String> = TECHNICAL_SKILLS
        .iter()
        .chain(MANAGEMENT_SKILLS.iter())
        .filter(|skill| contains_token(text_lower, skill))
        .map(|skill| skill.to_string())
        .collect();
    found.sort_unstable();
    found
}

/// Education signals: degree levels, fields of study, institution words.
pub(crate) fn extract_education(text_lower: &str) -> Vec<String> {
    let mut found: Vec<String> = DEGREE_TOKENS
        .iter()
        .chain(FIELD_TOKENS.iter())
        .chain(INSTITUTION_TOKENS.iter())
        .filter(|token| contains_token(text_lower, token))
        .map(|token| token.to_string())
        .collect();
    found.sort_unstable();
    found
}

/// Years of experience, from explicit claims first and employment date
/// ranges second. An open range ("2019 - present") closes at `current_year`.
/// Results keep first-seen order and are deduplicated.
pub(crate) fn extract_experience_years(text_lower: &str, current_year: i32) -> Vec<u32> {
    // Explicit experience claims: "7 years", "7+ years", "12 yrs".
    let explicit_years =
        Regex::new(r"(\d{1,2})\s*\+?\s*(?:years?|yrs?)\b").expect("valid explicit-years pattern");
    // Employment ranges: "2018 - 2023", "2019-present".
    let year_range =
        Regex::new(r"\b(19\d{2}|20\d{2})\s*[-–—]\s*(19\d{2}|20\d{2}|present|current)\b")
            .expect("valid year-range pattern");

    let mut years: Vec<u32> = Vec::new();

    for capture in explicit_years.captures_iter(text_lower) {
        if let Ok(span) = capture[1].parse::<i64>() {
            push_plausible(&mut years, span);
        }
    }

    for capture in year_range.captures_iter(text_lower) {
        let start = match capture[1].parse::<i64>() {
            Ok(year) => year,
            Err(_) => continue,
        };
        let end_token = &capture[2];
        let end = if end_token == "present" || end_token == "current" {
            current_year as i64
        } else {
            match end_token.parse::<i64>() {
                Ok(year) => year,
                Err(_) => continue,
            }
        };
        push_plausible(&mut years, end - start);
    }

    years
}

fn push_plausible(years: &mut Vec<u32>, span: i64) {
    if PLAUSIBLE_YEARS.contains(&span) {
        let span = span as u32;
        if !years.contains(&span) {
            years.push(span);
        }
    }
}
