use std::path::PathBuf;
use std::time::Duration;

use matcher::gateway::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use matcher::{ActivityCatalog, AreaContext, GeminiConfig, MatcherSettings};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port the service listens on
    pub port: u16,
    /// Path to the SQLite profile database
    pub database_url: String,
    /// Browser origins allowed by CORS
    pub frontend_origins: Vec<String>,
    /// API key for the Generative Language API
    pub gemini_api_key: String,
    /// Model id used for matching
    pub gemini_model: String,
    /// Base URL of the Generative Language API
    pub gemini_base_url: String,
    /// HTTP timeout for a single model call
    pub model_timeout: Duration,
    /// Model attempts per discover request before falling back
    pub model_max_attempts: u32,
    /// Candidates loaded from the store per discover request
    pub discover_max_candidates: usize,
    /// Optional TOML file replacing the built-in fallback activities
    pub activity_catalog_path: Option<PathBuf>,
    /// Campus and area the model plans activities around
    pub area: AreaContext,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow::anyhow!("GEMINI_API_KEY is missing"))?;

        let default_area = AreaContext::default();

        Ok(Self {
            port: env_parse("BEFRIEND_PORT", 8000)?,
            database_url: env_str("BEFRIEND_DATABASE_URL", "sqlite:./data/befriend.db"),
            frontend_origins: env_csv(
                "FRONTEND_ORIGINS",
                &["http://localhost:5173", "http://127.0.0.1:5173"],
            ),
            gemini_api_key,
            gemini_model: env_str("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            gemini_base_url: env_str("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            model_timeout: Duration::from_secs(env_parse("MODEL_TIMEOUT_SECS", 60)?),
            model_max_attempts: env_parse("MODEL_MAX_ATTEMPTS", 3)?,
            discover_max_candidates: env_parse("DISCOVER_MAX_CANDIDATES", 80)?,
            activity_catalog_path: std::env::var("ACTIVITY_CATALOG_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            area: AreaContext {
                campus: env_str("CAMPUS_NAME", &default_area.campus),
                region: env_str("CAMPUS_REGION", &default_area.region),
                description: env_str("CAMPUS_AREA", &default_area.description),
            },
        })
    }

    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.gemini_api_key.clone(),
            base_url: self.gemini_base_url.clone(),
            timeout: self.model_timeout,
        }
    }

    pub fn matcher_settings(&self) -> MatcherSettings {
        MatcherSettings {
            model: self.gemini_model.clone(),
            max_attempts: self.model_max_attempts,
            area: self.area.clone(),
            ..MatcherSettings::default()
        }
    }

    /// The configured activity catalog, or the built-in one.
    pub fn activity_catalog(&self) -> anyhow::Result<ActivityCatalog> {
        match &self.activity_catalog_path {
            Some(path) => ActivityCatalog::load(path)
                .map_err(|e| anyhow::anyhow!("Failed to load ACTIVITY_CATALOG_PATH: {e}")),
            None => Ok(ActivityCatalog::builtin()),
        }
    }
}

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse env var {key}={val}: {e}")),
        Err(_) => Ok(default),
    }
}

fn env_csv(key: &str, default: &[&str]) -> Vec<String> {
    match std::env::var(key) {
        Ok(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect(),
        Err(_) => default.iter().map(|s| (*s).to_string()).collect(),
    }
}
