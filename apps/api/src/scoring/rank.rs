//! Candidate ranking over a batch of score breakdowns.

use serde::Serialize;

use crate::scoring::engine::{RecommendationTier, ScoreBreakdown};

/// Default number of candidates returned when the caller does not say.
pub const DEFAULT_TOP_N: usize = 5;

/// Ranked view over one scored batch.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateRanking {
    pub total_candidates: usize,
    pub ranking: Vec<RankedCandidate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    /// 1-based position after sorting.
    pub rank: usize,
    pub recommendation: RecommendationTier,
    pub breakdown: ScoreBreakdown,
}

/// Sorts breakdowns by overall score descending (candidate label ascending on
/// ties, so equal scores order deterministically) and keeps the top `top_n`.
pub fn rank_candidates(mut breakdowns: Vec<ScoreBreakdown>, top_n: usize) -> CandidateRanking {
    let total_candidates = breakdowns.len();

    breakdowns.sort_by(|a, b| {
        b.overall_score
            .partial_cmp(&a.overall_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.candidate.cmp(&b.candidate))
    });
    breakdowns.truncate(top_n);

    CandidateRanking {
        total_candidates,
        ranking: breakdowns
            .into_iter()
            .enumerate()
            .map(|(index, breakdown)| RankedCandidate {
                rank: index + 1,
                recommendation: RecommendationTier::from_overall(breakdown.overall_score),
                breakdown,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breakdown(candidate: &str, overall: f64) -> ScoreBreakdown {
        ScoreBreakdown {
            candidate: candidate.to_string(),
            overall_score: overall,
            skill_score: 0.0,
            experience_score: 0.0,
            education_score: 0.0,
            role_match_score: 0.0,
            extracted_skills: Vec::new(),
            extracted_experience_years: Vec::new(),
            extracted_education: Vec::new(),
            explanation: String::new(),
        }
    }

    #[test]
    fn test_rank_sorts_by_score_descending() {
        let ranking = rank_candidates(
            vec![
                breakdown("low.pdf", 20.0),
                breakdown("high.pdf", 80.0),
                breakdown("mid.pdf", 50.0),
            ],
            10,
        );

        let order: Vec<&str> = ranking
            .ranking
            .iter()
            .map(|r| r.breakdown.candidate.as_str())
            .collect();
        assert_eq!(order, vec!["high.pdf", "mid.pdf", "low.pdf"]);
        assert_eq!(ranking.ranking[0].rank, 1);
        assert_eq!(ranking.ranking[2].rank, 3);
    }

    #[test]
    fn test_rank_breaks_ties_by_label() {
        let ranking = rank_candidates(
            vec![breakdown("b.pdf", 50.0), breakdown("a.pdf", 50.0)],
            10,
        );

        assert_eq!(ranking.ranking[0].breakdown.candidate, "a.pdf");
        assert_eq!(ranking.ranking[1].breakdown.candidate, "b.pdf");
    }

    #[test]
    fn test_rank_truncates_but_keeps_total() {
        let ranking = rank_candidates(
            vec![
                breakdown("a.pdf", 90.0),
                breakdown("b.pdf", 80.0),
                breakdown("c.pdf", 70.0),
            ],
            2,
        );

        assert_eq!(ranking.total_candidates, 3);
        assert_eq!(ranking.ranking.len(), 2);
    }

    #[test]
    fn test_rank_annotates_recommendation_tiers() {
        let ranking = rank_candidates(
            vec![breakdown("strong.pdf", 80.0), breakdown("weak.pdf", 35.0)],
            10,
        );

        assert_eq!(ranking.ranking[0].recommendation, RecommendationTier::Strong);
        assert_eq!(ranking.ranking[1].recommendation, RecommendationTier::Weak);
    }

    #[test]
    fn test_rank_of_empty_batch() {
        let ranking = rank_candidates(Vec::new(), 5);
        assert_eq!(ranking.total_candidates, 0);
        assert!(ranking.ranking.is_empty());
    }
}
