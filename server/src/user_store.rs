use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use sqlx::SqlitePool;

use matcher::profile::field_text;
use shared_types::{MatchCard, ProfileResponse, ProfileUpdate};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("profile document error: {0}")]
    Document(#[from] serde_json::Error),
}

/// One row of the `users` table with its profile document decoded.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub uid: String,
    pub onboarded: bool,
    pub document: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredUser {
    /// Profile record as handed to the matcher. The row uid always wins
    /// over whatever the document carries.
    pub fn record(&self) -> Value {
        let mut record = match &self.document {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        record.insert("uid".to_string(), Value::String(self.uid.clone()));
        Value::Object(record)
    }

    pub fn match_card(&self) -> MatchCard {
        MatchCard {
            uid: self.uid.clone(),
            name: field_text(&self.document, "name"),
            program: field_text(&self.document, "program"),
            clubs: field_text(&self.document, "clubs"),
            interests: field_text(&self.document, "interests"),
            accommodations: field_text(&self.document, "accommodations"),
            photo_url: field_text(&self.document, "photoURL"),
        }
    }

    pub fn profile_response(&self) -> ProfileResponse {
        ProfileResponse {
            uid: self.uid.clone(),
            name: field_text(&self.document, "name"),
            program: field_text(&self.document, "program"),
            clubs: field_text(&self.document, "clubs"),
            interests: field_text(&self.document, "interests"),
            accommodations: field_text(&self.document, "accommodations"),
            photo_url: field_text(&self.document, "photoURL"),
            onboarded: self.onboarded,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}

type UserRow = (String, bool, String, DateTime<Utc>, DateTime<Utc>);

fn decode_row(row: UserRow) -> Result<StoredUser, StoreError> {
    let (uid, onboarded, profile, created_at, updated_at) = row;
    Ok(StoredUser {
        uid,
        onboarded,
        document: serde_json::from_str(&profile)?,
        created_at,
        updated_at,
    })
}

/// SQLite-backed profile store.
///
/// Schema (created on [`UserStore::migrate`]):
/// ```sql
/// CREATE TABLE IF NOT EXISTS users (
///     uid        TEXT    PRIMARY KEY,
///     onboarded  INTEGER NOT NULL DEFAULT 0,
///     profile    TEXT    NOT NULL,   -- JSON document
///     created_at TEXT    NOT NULL,
///     updated_at TEXT    NOT NULL
/// );
/// ```
#[derive(Debug, Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the users table if it does not exist.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                uid        TEXT    PRIMARY KEY,
                onboarded  INTEGER NOT NULL DEFAULT 0,
                profile    TEXT    NOT NULL,
                created_at TEXT    NOT NULL,
                updated_at TEXT    NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS users_onboarded ON users (onboarded)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn get(&self, uid: &str) -> Result<Option<StoredUser>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT uid, onboarded, profile, created_at, updated_at FROM users WHERE uid = ?",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        row.map(decode_row).transpose()
    }

    /// Onboarded users other than `exclude_uid`, oldest first, at most `max`.
    pub async fn list_candidates(
        &self,
        exclude_uid: &str,
        max: usize,
    ) -> Result<Vec<StoredUser>, StoreError> {
        let limit = i64::try_from(max).unwrap_or(i64::MAX);
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT uid, onboarded, profile, created_at, updated_at
             FROM users
             WHERE onboarded = 1 AND uid != ?
             ORDER BY created_at ASC, uid ASC
             LIMIT ?",
        )
        .bind(exclude_uid)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(decode_row).collect()
    }

    /// Merge `update` into the stored document and mark the user onboarded.
    /// Keys the update does not name are kept; `created_at` is set once.
    pub async fn upsert_profile(
        &self,
        uid: &str,
        update: &ProfileUpdate,
    ) -> Result<StoredUser, StoreError> {
        let mut document = match self.get(uid).await? {
            Some(existing) => match existing.document {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            None => Map::new(),
        };

        let fields = json!({
            "uid": uid,
            "name": update.name.trim(),
            "program": update.program.trim(),
            "clubs": update.clubs.trim(),
            "interests": update.interests.trim(),
            "accommodations": update.accommodations.trim(),
            "photoURL": update.photo_url.trim(),
        });
        if let Value::Object(fields) = fields {
            document.extend(fields);
        }
        let profile = serde_json::to_string(&Value::Object(document))?;
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO users (uid, onboarded, profile, created_at, updated_at)
             VALUES (?, 1, ?, ?, ?)
             ON CONFLICT(uid) DO UPDATE SET
                onboarded  = 1,
                profile    = excluded.profile,
                updated_at = excluded.updated_at",
        )
        .bind(uid)
        .bind(&profile)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(uid)
            .await?
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn store() -> UserStore {
        let pool = db::connect(db::IN_MEMORY_URL).await.unwrap();
        let store = UserStore::new(pool);
        // idempotent on an already migrated pool
        store.migrate().await.unwrap();
        store
    }

    fn update(name: &str, interests: &str) -> ProfileUpdate {
        ProfileUpdate {
            name: name.to_string(),
            program: "Computer Science".to_string(),
            interests: interests.to_string(),
            ..ProfileUpdate::default()
        }
    }

    #[tokio::test]
    async fn test_get_missing_user_is_none() {
        let store = store().await;
        assert!(store.get("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_creates_onboarded_user() {
        let store = store().await;
        let user = store
            .upsert_profile("u1", &update("  Ada ", "chess"))
            .await
            .unwrap();

        assert!(user.onboarded);
        assert_eq!(user.document["name"], "Ada");
        assert_eq!(user.document["uid"], "u1");
        assert_eq!(user.created_at, user.updated_at);
    }

    #[tokio::test]
    async fn test_upsert_keeps_created_at_and_foreign_keys() {
        let store = store().await;
        let first = store.upsert_profile("u1", &update("Ada", "chess")).await.unwrap();

        sqlx::query("UPDATE users SET profile = json_set(profile, '$.year', 3) WHERE uid = 'u1'")
            .execute(&store.pool)
            .await
            .unwrap();

        let second = store
            .upsert_profile("u1", &update("Ada L", "go"))
            .await
            .unwrap();

        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(second.document["name"], "Ada L");
        assert_eq!(second.document["interests"], "go");
        assert_eq!(second.document["year"], 3);
    }

    #[tokio::test]
    async fn test_list_candidates_skips_self_and_unonboarded() {
        let store = store().await;
        for uid in ["me", "a", "b"] {
            store.upsert_profile(uid, &update(uid, "chess")).await.unwrap();
        }
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO users (uid, onboarded, profile, created_at, updated_at)
             VALUES ('pending', 0, '{}', ?, ?)",
        )
        .bind(now)
        .bind(now)
        .execute(&store.pool)
        .await
        .unwrap();

        let candidates = store.list_candidates("me", 80).await.unwrap();
        let uids: Vec<&str> = candidates.iter().map(|c| c.uid.as_str()).collect();
        assert_eq!(uids.len(), 2);
        assert!(uids.contains(&"a") && uids.contains(&"b"));

        let capped = store.list_candidates("me", 1).await.unwrap();
        assert_eq!(capped.len(), 1);
    }

    #[test]
    fn test_record_prefers_row_uid() {
        let now = Utc::now();
        let user = StoredUser {
            uid: "u1".to_string(),
            onboarded: true,
            document: json!({"uid": "spoofed", "name": "Ada", "photoURL": "http://p"}),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(user.record()["uid"], "u1");

        let card = user.match_card();
        assert_eq!(card.uid, "u1");
        assert_eq!(card.name, "Ada");
        assert_eq!(card.photo_url, "http://p");
        assert_eq!(card.clubs, "");
    }
}
