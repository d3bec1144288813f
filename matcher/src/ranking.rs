//! Candidate pool preparation and score ranking.

use std::collections::HashSet;

use crate::profile::UserProfile;
use crate::scoring::{score_tokens, ProfileTokens, ScoreWeights};

/// Minimum number of candidates shown to the model.
pub const MIN_MODEL_CANDIDATES: usize = 20;
/// Candidates shown to the model per requested person.
pub const MODEL_CANDIDATES_PER_PERSON: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub profile: UserProfile,
    pub score: f64,
}

impl ScoredCandidate {
    pub fn uid(&self) -> &str {
        &self.profile.uid
    }
}

/// Reduce normalized candidates to the ones that may be recommended: a
/// non-empty uid that is not the requester's, first occurrence only.
/// Input order is preserved.
pub fn allowed_pool(me: &UserProfile, candidates: Vec<UserProfile>) -> Vec<UserProfile> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| c.has_uid() && c.uid != me.uid)
        .filter(|c| seen.insert(c.uid.clone()))
        .collect()
}

/// Score every candidate against `me` and sort by score, highest first.
/// Equal scores keep their input order.
pub fn rank_candidates(
    me: &UserProfile,
    candidates: &[UserProfile],
    weights: &ScoreWeights,
) -> Vec<ScoredCandidate> {
    let me_tokens = ProfileTokens::of(me);
    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .map(|candidate| ScoredCandidate {
            score: score_tokens(&me_tokens, &ProfileTokens::of(candidate), weights),
            profile: candidate.clone(),
        })
        .collect();
    // sort_by is stable
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

/// How many ranked candidates the model gets to choose from.
pub fn model_slice_len(limit_people: usize, available: usize) -> usize {
    MIN_MODEL_CANDIDATES
        .max(limit_people.saturating_mul(MODEL_CANDIDATES_PER_PERSON))
        .min(available)
}
