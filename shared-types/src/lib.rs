//! Shared types between the discover API and the web frontend
//!
//! These types are used by both:
//! - the axum server (native Rust)
//! - the React frontend (TypeScript bindings generated by ts-rs into `bindings/befriend.ts`)
//!
//! Serializable with serde for JSON over HTTP

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::{Validate, ValidationError};

// ============================================================================
// Limits
// ============================================================================

pub const DEFAULT_LIMIT_PEOPLE: u32 = 3;
pub const DEFAULT_LIMIT_ACTIVITIES: u32 = 6;
pub const MAX_LIMIT_PEOPLE: u32 = 10;
pub const MAX_LIMIT_ACTIVITIES: u32 = 12;

fn default_limit_people() -> u32 {
    DEFAULT_LIMIT_PEOPLE
}

fn default_limit_activities() -> u32 {
    DEFAULT_LIMIT_ACTIVITIES
}

// ============================================================================
// Discover
// ============================================================================

/// Body of `POST /discover`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "befriend.ts")]
pub struct DiscoverRequest {
    #[serde(default = "default_limit_people")]
    #[validate(range(min = 1, max = MAX_LIMIT_PEOPLE))]
    pub limit_people: u32,

    #[serde(default = "default_limit_activities")]
    #[validate(range(min = 1, max = MAX_LIMIT_ACTIVITIES))]
    pub limit_activities: u32,
}

impl Default for DiscoverRequest {
    fn default() -> Self {
        Self {
            limit_people: DEFAULT_LIMIT_PEOPLE,
            limit_activities: DEFAULT_LIMIT_ACTIVITIES,
        }
    }
}

/// A recommended person, as rendered on the discover page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "befriend.ts")]
pub struct MatchCard {
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub program: String,
    #[serde(default)]
    pub clubs: String,
    #[serde(default)]
    pub interests: String,
    #[serde(default)]
    pub accommodations: String,
    #[serde(default, rename = "photoURL")]
    pub photo_url: String,
}

/// Response of `POST /discover`
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "befriend.ts")]
pub struct DiscoverResponse {
    pub activities: Vec<String>,
    pub matches: Vec<MatchCard>,
}

// ============================================================================
// Profiles
// ============================================================================

/// Body of `PUT /users/me`; merged into the stored profile document
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "befriend.ts")]
pub struct ProfileUpdate {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(custom(function = "not_blank"))]
    pub program: String,
    #[serde(default)]
    pub clubs: String,
    #[serde(default)]
    pub interests: String,
    #[serde(default)]
    pub accommodations: String,
    #[serde(default, rename = "photoURL")]
    pub photo_url: String,
}

/// Stored profile, as returned by `GET /users/me`
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "befriend.ts")]
pub struct ProfileResponse {
    pub uid: String,
    pub name: String,
    pub program: String,
    pub clubs: String,
    pub interests: String,
    pub accommodations: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    pub onboarded: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

// ============================================================================
// API Types
// ============================================================================

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "befriend.ts")]
pub struct ApiErrorBody {
    pub error: String,
}
