//! The discover pipeline.
//!
//! normalize -> allowed pool -> rank -> prompt -> model (retried) -> validate
//! -> gap-fill, with the deterministic fallback whenever the model path does
//! not produce a usable reply. Nothing here fails from the caller's point of
//! view; the worst case is a heuristic-only result.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::fallback::{fallback_people, ActivityCatalog};
use crate::gateway::{
    GatewayError, GenerationRequest, SharedModelGateway, DEFAULT_GEMINI_MODEL, JSON_MIME_TYPE,
};
use crate::profile::UserProfile;
use crate::prompt::{build_prompt, AreaContext, PromptLimits};
use crate::ranking::{allowed_pool, model_slice_len, rank_candidates, ScoredCandidate};
use crate::reply::{accept_people, activity_lines, parse_reply, ReplyError};
use crate::scoring::ScoreWeights;

#[derive(Debug, Clone, PartialEq)]
pub struct MatcherSettings {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Total model attempts per request, including the first.
    pub max_attempts: u32,
    /// Delay before retry `n` is `retry_base_delay * n`.
    pub retry_base_delay: Duration,
    pub area: AreaContext,
    pub weights: ScoreWeights,
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_GEMINI_MODEL.to_string(),
            temperature: 0.25,
            max_output_tokens: 1400,
            max_attempts: 3,
            retry_base_delay: Duration::from_millis(200),
            area: AreaContext::default(),
            weights: ScoreWeights::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoverLimits {
    pub people: usize,
    pub activities: usize,
}

impl Default for DiscoverLimits {
    fn default() -> Self {
        Self {
            people: 3,
            activities: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationSource {
    /// A model reply was accepted, possibly gap-filled.
    Model,
    /// The model path failed on every attempt.
    Fallback,
    /// No candidates; nothing was attempted.
    Empty,
}

impl RecommendationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Fallback => "fallback",
            Self::Empty => "empty",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub matched_uids: Vec<String>,
    pub activities: Vec<String>,
    pub source: RecommendationSource,
    /// Model attempts made for this result.
    pub attempts: u32,
}

impl Recommendation {
    fn empty() -> Self {
        Self {
            matched_uids: Vec::new(),
            activities: Vec::new(),
            source: RecommendationSource::Empty,
            attempts: 0,
        }
    }
}

/// Why one model attempt was discarded.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Reply(#[from] ReplyError),
}

/// Per-request inputs after normalization and ranking.
struct PreparedRequest {
    me: UserProfile,
    pool: Vec<UserProfile>,
    ranked: Vec<ScoredCandidate>,
}

pub struct Matcher {
    gateway: SharedModelGateway,
    settings: MatcherSettings,
    catalog: Arc<ActivityCatalog>,
}

impl Matcher {
    pub fn new(
        gateway: SharedModelGateway,
        settings: MatcherSettings,
        catalog: Arc<ActivityCatalog>,
    ) -> Self {
        Self {
            gateway,
            settings,
            catalog,
        }
    }

    /// Recommend people and activities for `current_user` out of
    /// `candidates`. Records are normalized here.
    pub async fn recommend(
        &self,
        current_user: &Value,
        candidates: &[Value],
        limits: DiscoverLimits,
    ) -> Recommendation {
        let me = UserProfile::from_record(current_user);
        let pool = allowed_pool(
            &me,
            candidates.iter().map(UserProfile::from_record).collect(),
        );
        if pool.is_empty() {
            debug!(uid = %me.uid, "no eligible candidates; skipping model");
            return Recommendation::empty();
        }

        let mut ranked = rank_candidates(&me, &pool, &self.settings.weights);
        ranked.truncate(model_slice_len(limits.people, ranked.len()));
        let prepared = PreparedRequest { me, pool, ranked };

        let request = match build_prompt(
            &prepared.me,
            &prepared.ranked,
            PromptLimits {
                people: limits.people,
                activities: limits.activities,
            },
            &self.settings.area,
        ) {
            Ok(prompt) => GenerationRequest {
                model: self.settings.model.clone(),
                system_instruction: prompt.system_instruction,
                content: prompt.content,
                temperature: self.settings.temperature,
                max_output_tokens: self.settings.max_output_tokens,
                response_mime_type: Some(JSON_MIME_TYPE.to_string()),
            },
            Err(e) => {
                warn!(error = %e, "failed to serialize prompt; using fallback");
                return self.fallback_for(&prepared, limits, 0);
            }
        };

        let allowed: HashSet<&str> = prepared.pool.iter().map(|c| c.uid.as_str()).collect();
        let max_attempts = self.settings.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self.attempt(&request, &allowed, &prepared.ranked, limits).await {
                Ok((matched_uids, activities)) => {
                    info!(
                        attempt,
                        candidates = prepared.pool.len(),
                        people = matched_uids.len(),
                        activities = activities.len(),
                        "model recommendation accepted"
                    );
                    return Recommendation {
                        matched_uids,
                        activities,
                        source: RecommendationSource::Model,
                        attempts: attempt,
                    };
                }
                Err(e) => {
                    warn!(attempt, max_attempts, error = %e, "model attempt failed");
                    if attempt < max_attempts {
                        tokio::time::sleep(self.settings.retry_base_delay * attempt).await;
                    }
                }
            }
        }

        info!(
            attempts = max_attempts,
            candidates = prepared.pool.len(),
            "model retries exhausted; using heuristic fallback"
        );
        self.fallback_for(&prepared, limits, max_attempts)
    }

    async fn attempt(
        &self,
        request: &GenerationRequest,
        allowed: &HashSet<&str>,
        ranked: &[ScoredCandidate],
        limits: DiscoverLimits,
    ) -> Result<(Vec<String>, Vec<String>), MatchError> {
        let raw = self.gateway.generate(request).await?;
        let reply = parse_reply(&raw)?;

        let matched_uids = accept_people(&reply.people, allowed, ranked, limits.people);
        let activities = activity_lines(&reply.activities, self.catalog.lines(), limits.activities);
        Ok((matched_uids, activities))
    }

    fn fallback_for(
        &self,
        prepared: &PreparedRequest,
        limits: DiscoverLimits,
        attempts: u32,
    ) -> Recommendation {
        Recommendation {
            matched_uids: fallback_people(
                &prepared.me,
                &prepared.pool,
                &self.settings.weights,
                limits.people,
            ),
            activities: self.catalog.take(limits.activities),
            source: RecommendationSource::Fallback,
            attempts,
        }
    }

    /// The model-free result for the same inputs `recommend` would use.
    pub fn fallback(
        &self,
        current_user: &Value,
        candidates: &[Value],
        limits: DiscoverLimits,
    ) -> Recommendation {
        let me = UserProfile::from_record(current_user);
        let pool = allowed_pool(
            &me,
            candidates.iter().map(UserProfile::from_record).collect(),
        );
        if pool.is_empty() {
            return Recommendation::empty();
        }
        let prepared = PreparedRequest {
            me,
            pool,
            ranked: Vec::new(),
        };
        self.fallback_for(&prepared, limits, 0)
    }
}
