//! Deterministic, model-free results.
//!
//! People come from the heuristic ranking alone; activities come from a fixed
//! catalog. The catalog ships built in and can be replaced with a TOML file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::profile::UserProfile;
use crate::ranking::rank_candidates;
use crate::reply::{format_activity_line, ProposedActivity};
use crate::scoring::ScoreWeights;

const BUILTIN_ACTIVITY_CATALOG_TOML: &str = include_str!("../config/activity-catalog.example.toml");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read activity catalog {path}: {message}")]
    Read { path: String, message: String },
    #[error("failed to parse activity catalog: {0}")]
    Parse(String),
    #[error("activity catalog has no usable entries")]
    Empty,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub why_it_works: String,
    #[serde(default)]
    pub accessibility_notes: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    activities: Vec<CatalogEntry>,
}

/// Ordered pool of pre-rendered activity lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityCatalog {
    lines: Vec<String>,
}

impl ActivityCatalog {
    /// The catalog compiled into the binary.
    pub fn builtin() -> Self {
        Self::from_toml_str(BUILTIN_ACTIVITY_CATALOG_TOML).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Built-in activity catalog parse failed; catalog will be empty");
            Self { lines: Vec::new() }
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(raw).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let mut lines: Vec<String> = Vec::with_capacity(file.activities.len());
        for entry in file.activities {
            let Some(line) = format_activity_line(&entry.trimmed()) else {
                continue;
            };
            if !lines.contains(&line) {
                lines.push(line);
            }
        }
        if lines.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { lines })
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|e| CatalogError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The first `limit` lines.
    pub fn take(&self, limit: usize) -> Vec<String> {
        self.lines.iter().take(limit).cloned().collect()
    }
}

impl Default for ActivityCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CatalogEntry {
    fn trimmed(&self) -> ProposedActivity {
        ProposedActivity {
            title: self.title.trim().to_string(),
            location: self.location.trim().to_string(),
            why_it_works: self.why_it_works.trim().to_string(),
            accessibility_notes: self.accessibility_notes.trim().to_string(),
        }
    }
}

/// Best-matching uids by heuristic score, topped up with the remaining
/// candidates in input order.
pub fn fallback_people(
    me: &UserProfile,
    pool: &[UserProfile],
    weights: &ScoreWeights,
    limit: usize,
) -> Vec<String> {
    let mut matched: Vec<String> = rank_candidates(me, pool, weights)
        .into_iter()
        .filter(|c| c.profile.has_uid())
        .map(|c| c.profile.uid)
        .fold(Vec::new(), |mut acc, uid| {
            if acc.len() < limit && !acc.contains(&uid) {
                acc.push(uid);
            }
            acc
        });

    if matched.len() < limit {
        for candidate in pool.iter().filter(|c| c.has_uid()) {
            if matched.len() >= limit {
                break;
            }
            if !matched.contains(&candidate.uid) {
                matched.push(candidate.uid.clone());
            }
        }
    }

    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::DEFAULT_WEIGHTS;

    fn candidate(uid: &str, interests: &str) -> UserProfile {
        UserProfile {
            uid: uid.to_string(),
            interests: interests.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_builtin_catalog_has_eight_entries() {
        let catalog = ActivityCatalog::builtin();
        assert_eq!(catalog.lines().len(), 8);
        assert_eq!(
            catalog.lines()[0],
            "Board games in a quiet study room — Mills Library • Easy to coordinate and low-noise • Accessibility: pick well-lit seating"
        );
        assert_eq!(
            catalog.lines()[7],
            "Cootes Paradise walk — Trails near campus • Relaxed + scenic • Accessibility: choose flatter trail sections"
        );
    }

    #[test]
    fn test_take_truncates() {
        let catalog = ActivityCatalog::builtin();
        assert_eq!(catalog.take(3).len(), 3);
        assert_eq!(catalog.take(12).len(), 8);
        assert!(catalog.take(0).is_empty());
    }

    #[test]
    fn test_catalog_from_toml_skips_untitled_and_duplicates() {
        let catalog = ActivityCatalog::from_toml_str(
            r#"
            [[activities]]
            title = "Picnic"
            location = "Bayfront Park"

            [[activities]]
            title = "   "
            location = "Nowhere"

            [[activities]]
            title = "Picnic"
            location = "Bayfront Park"
            "#,
        )
        .unwrap();
        assert_eq!(catalog.lines(), &["Picnic — Bayfront Park".to_string()]);
    }

    #[test]
    fn test_catalog_errors() {
        assert!(matches!(
            ActivityCatalog::from_toml_str("activities = 3"),
            Err(CatalogError::Parse(_))
        ));
        assert!(matches!(
            ActivityCatalog::from_toml_str(""),
            Err(CatalogError::Empty)
        ));
        assert!(matches!(
            ActivityCatalog::load(Path::new("/definitely/not/here.toml")),
            Err(CatalogError::Read { .. })
        ));
    }

    #[test]
    fn test_catalog_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            "[[activities]]\ntitle = \"Climbing\"\nlocation = \"The Hub\"\naccessibility_notes = \"auto belay\"\n",
        )
        .unwrap();

        let catalog = ActivityCatalog::load(&path).unwrap();
        assert_eq!(
            catalog.lines(),
            &["Climbing — The Hub • Accessibility: auto belay".to_string()]
        );
    }

    #[test]
    fn test_fallback_people_best_match_first() {
        let me = candidate("me", "hiking photography climbing");
        let pool = vec![
            candidate("a", "knitting"),
            candidate("b", "photography"),
            candidate("c", "hiking climbing"),
            candidate("d", "films"),
        ];
        assert_eq!(
            fallback_people(&me, &pool, &DEFAULT_WEIGHTS, 3),
            vec!["c", "b", "a"]
        );
    }

    #[test]
    fn test_fallback_people_small_pool_and_determinism() {
        let me = candidate("me", "music");
        let pool = vec![candidate("a", ""), candidate("", "music"), candidate("b", "music")];
        let first = fallback_people(&me, &pool, &DEFAULT_WEIGHTS, 5);
        assert_eq!(first, vec!["b", "a"]);
        assert_eq!(first, fallback_people(&me, &pool, &DEFAULT_WEIGHTS, 5));
    }
}
