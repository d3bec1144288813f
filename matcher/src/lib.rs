//! Be-Friend matcher - friend recommendations for university students
//!
//! A cheap keyword-overlap heuristic pre-ranks candidates, a generative model
//! re-ranks them and proposes activities, and a strict validator keeps the
//! model honest. When the model fails, a deterministic fallback answers.

pub mod fallback;
pub mod gateway;
pub mod pipeline;
pub mod profile;
pub mod prompt;
pub mod ranking;
pub mod reply;
pub mod scoring;
pub mod tokens;

pub use fallback::{ActivityCatalog, CatalogError};
pub use gateway::{
    GatewayError, GeminiConfig, GeminiGateway, GenerationRequest, ModelGateway,
    SharedModelGateway,
};
pub use pipeline::{
    DiscoverLimits, MatchError, Matcher, MatcherSettings, Recommendation, RecommendationSource,
};
pub use profile::UserProfile;
pub use prompt::AreaContext;
