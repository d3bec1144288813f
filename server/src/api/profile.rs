use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use tracing::info;
use validator::Validate;

use shared_types::{ProfileResponse, ProfileUpdate};

use super::ApiError;
use crate::{middleware::CurrentUser, AppState};

/// GET /users/me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(uid)): Extension<CurrentUser>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state
        .store
        .get(&uid)
        .await?
        .ok_or_else(|| ApiError::NotFound("profile not found".to_string()))?;
    Ok(Json(user.profile_response()))
}

/// PUT /users/me - save the onboarding form
pub async fn put_me(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(uid)): Extension<CurrentUser>,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let Json(update) = payload?;
    update.validate()?;
    let user = state.store.upsert_profile(&uid, &update).await?;
    info!(uid = %uid, "profile saved");
    Ok(Json(user.profile_response()))
}
