//! Heuristic similarity between the requesting user and a candidate.
//!
//! Overlap in program, clubs and interests, plus accommodation compatibility
//! when the requester lists accommodations. The score pre-ranks candidates for
//! the model and is the only ranking signal on the fallback path.

use crate::profile::UserProfile;
use crate::tokens::TokenSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub program: f64,
    pub clubs: f64,
    pub interests: f64,
    pub accommodations: f64,
    /// Subtracted when the requester lists accommodations and the candidate
    /// lists none.
    pub silent_accommodations_penalty: f64,
}

pub const DEFAULT_WEIGHTS: ScoreWeights = ScoreWeights {
    program: 1.5,
    clubs: 2.5,
    interests: 1.0,
    accommodations: 2.0,
    silent_accommodations_penalty: 0.5,
};

impl Default for ScoreWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

/// Token sets for the four scored attributes of one profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileTokens {
    pub program: TokenSet,
    pub clubs: TokenSet,
    pub interests: TokenSet,
    pub accommodations: TokenSet,
}

impl ProfileTokens {
    pub fn of(profile: &UserProfile) -> Self {
        Self {
            program: TokenSet::from_text(&profile.program),
            clubs: TokenSet::from_text(&profile.clubs),
            interests: TokenSet::from_text(&profile.interests),
            accommodations: TokenSet::from_text(&profile.accommodations),
        }
    }
}

/// Score `candidate` against the reference tokens `me`.
///
/// Not symmetric: the accommodations terms only apply when `me` lists
/// accommodations.
pub fn score_tokens(me: &ProfileTokens, candidate: &ProfileTokens, weights: &ScoreWeights) -> f64 {
    let mut score = 0.0;
    score += weights.program * me.program.overlap(&candidate.program) as f64;
    score += weights.clubs * me.clubs.overlap(&candidate.clubs) as f64;
    score += weights.interests * me.interests.overlap(&candidate.interests) as f64;

    if !me.accommodations.is_empty() {
        score += weights.accommodations * me.accommodations.overlap(&candidate.accommodations) as f64;
        if candidate.accommodations.is_empty() {
            score -= weights.silent_accommodations_penalty;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn similarity_score(me: &UserProfile, candidate: &UserProfile) -> f64 {
        score_tokens(
            &ProfileTokens::of(me),
            &ProfileTokens::of(candidate),
            &DEFAULT_WEIGHTS,
        )
    }

    fn profile(program: &str, clubs: &str, interests: &str, accommodations: &str) -> UserProfile {
        UserProfile {
            uid: "x".to_string(),
            name: String::new(),
            program: program.to_string(),
            clubs: clubs.to_string(),
            interests: interests.to_string(),
            accommodations: accommodations.to_string(),
        }
    }

    #[test]
    fn test_weighted_overlap() {
        let me = profile(
            "Computer Science",
            "Chess Club, Robotics",
            "hiking music",
            "",
        );
        let candidate = profile("Computer Engineering", "Robotics Team", "music films", "");
        // program: computer (1) -> 1.5; clubs: robotics (1) -> 2.5; interests: music (1) -> 1.0
        assert_eq!(similarity_score(&me, &candidate), 5.0);
    }

    #[test]
    fn test_no_overlap_scores_zero() {
        let me = profile("Biology", "Choir", "painting", "");
        let candidate = profile("History", "Debate", "running", "quiet spaces");
        assert_eq!(similarity_score(&me, &candidate), 0.0);
    }

    #[test]
    fn test_accommodation_match_beats_silence() {
        let me = profile("", "", "", "wheelchair");
        let matched = profile("", "", "", "wheelchair accessible");
        let silent = profile("", "", "", "");

        let matched_score = similarity_score(&me, &matched);
        let silent_score = similarity_score(&me, &silent);
        assert_eq!(matched_score, 2.0);
        assert_eq!(silent_score, -0.5);
        assert!(matched_score - silent_score >= 2.5);
    }

    #[test]
    fn test_accommodation_terms_are_one_sided() {
        let me = profile("Nursing", "", "", "");
        let candidate = profile("Nursing", "", "", "low sensory");

        // requester lists nothing: no accommodations terms at all
        assert_eq!(similarity_score(&me, &candidate), 1.5);
        // reversed: requester lists accommodations, candidate is silent
        assert_eq!(similarity_score(&candidate, &me), 1.0);
    }

    #[test]
    fn test_stopwords_do_not_count_as_overlap() {
        let me = profile("the McMaster program", "", "", "");
        let candidate = profile("McMaster students of the program", "", "", "");
        assert_eq!(similarity_score(&me, &candidate), 1.5);
    }
}
