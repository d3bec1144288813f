use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde_json::Value;
use tracing::{info, info_span, Instrument};
use validator::Validate;

use matcher::DiscoverLimits;
use shared_types::{DiscoverRequest, DiscoverResponse, MatchCard};

use super::ApiError;
use crate::{middleware::CurrentUser, AppState};

/// POST /discover - recommend people and activities for the caller
pub async fn discover(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(uid)): Extension<CurrentUser>,
    payload: Result<Json<DiscoverRequest>, JsonRejection>,
) -> Result<Json<DiscoverResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let request_id = uuid::Uuid::new_v4();
    let span = info_span!("discover", %request_id, uid = %uid);
    run_discover(state, uid, request).instrument(span).await
}

async fn run_discover(
    state: Arc<AppState>,
    uid: String,
    request: DiscoverRequest,
) -> Result<Json<DiscoverResponse>, ApiError> {
    let me = state
        .store
        .get(&uid)
        .await?
        .ok_or_else(|| ApiError::NotFound("profile not found".to_string()))?;

    let candidates = state
        .store
        .list_candidates(&uid, state.max_candidates)
        .await?;
    let records: Vec<Value> = candidates.iter().map(|c| c.record()).collect();

    let limits = DiscoverLimits {
        people: request.limit_people as usize,
        activities: request.limit_activities as usize,
    };
    let recommendation = state.matcher.recommend(&me.record(), &records, limits).await;

    let mut cards: HashMap<&str, MatchCard> = candidates
        .iter()
        .map(|c| (c.uid.as_str(), c.match_card()))
        .collect();
    let matches: Vec<MatchCard> = recommendation
        .matched_uids
        .iter()
        .filter_map(|uid| cards.remove(uid.as_str()))
        .collect();

    info!(
        source = recommendation.source.as_str(),
        attempts = recommendation.attempts,
        candidates = candidates.len(),
        matches = matches.len(),
        activities = recommendation.activities.len(),
        "discover complete"
    );

    Ok(Json(DiscoverResponse {
        activities: recommendation.activities,
        matches,
    }))
}
