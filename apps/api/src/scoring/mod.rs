// Deterministic resume scoring: vocabulary-driven extraction, weighted
// sub-scores, recommendation tiers, batch ranking.
// Runs no model calls — results are reproducible by construction.

pub mod engine;
pub mod extract;
pub mod handlers;
pub mod rank;
pub mod vocab;
