use anyhow::Result;
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::db::models::{AvatarRow, NewAvatar};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn init(database_url: &str) -> Result<Self> {
        // In-memory databases exist per connection; a single connection keeps
        // them coherent.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS avatars (\
                id TEXT PRIMARY KEY,\
                user_id TEXT NOT NULL,\
                name TEXT NOT NULL,\
                style TEXT,\
                hair_color TEXT,\
                eye_color TEXT,\
                personality TEXT,\
                generated_image_url TEXT,\
                generated_image_prompt TEXT,\
                created_at TEXT NOT NULL\
            );",
        )
        .execute(&pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_avatars_user_id ON avatars(user_id);")
            .execute(&pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_avatars_created_at ON avatars(created_at);")
            .execute(&pool)
            .await?;

        info!("Database tables created successfully");

        Ok(Database { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Inserts a new avatar for the owner and returns the stored row. The
    /// identifier is assigned here.
    pub async fn insert_avatar(&self, user_id: &str, avatar: NewAvatar) -> Result<AvatarRow> {
        let row = AvatarRow {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: avatar.name,
            style: avatar.style,
            hair_color: avatar.hair_color,
            eye_color: avatar.eye_color,
            personality: avatar.personality,
            generated_image_url: None,
            generated_image_prompt: None,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO avatars \
             (id, user_id, name, style, hair_color, eye_color, personality, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&row.id)
        .bind(&row.user_id)
        .bind(&row.name)
        .bind(&row.style)
        .bind(&row.hair_color)
        .bind(&row.eye_color)
        .bind(&row.personality)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_avatars(&self, user_id: &str) -> Result<Vec<AvatarRow>> {
        let rows = sqlx::query_as::<_, AvatarRow>(
            "SELECT id, user_id, name, style, hair_color, eye_color, personality, \
             generated_image_url, generated_image_prompt, created_at \
             FROM avatars WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Fetches a single avatar scoped to its owner. Rows belonging to other
    /// users are invisible here, which is what makes the lookup an ownership
    /// check as well.
    pub async fn get_avatar(&self, user_id: &str, avatar_id: &str) -> Result<Option<AvatarRow>> {
        let row = sqlx::query_as::<_, AvatarRow>(
            "SELECT id, user_id, name, style, hair_color, eye_color, personality, \
             generated_image_url, generated_image_prompt, created_at \
             FROM avatars WHERE user_id = ? AND id = ?",
        )
        .bind(user_id)
        .bind(avatar_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Writes the generated image URL together with the prompt that produced
    /// it. Returns false when no row matched the owner/id pair.
    pub async fn set_generated_image(
        &self,
        user_id: &str,
        avatar_id: &str,
        image_url: &str,
        prompt: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE avatars \
             SET generated_image_url = ?, generated_image_prompt = ? \
             WHERE user_id = ? AND id = ?",
        )
        .bind(image_url)
        .bind(prompt)
        .bind(user_id)
        .bind(avatar_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[allow(dead_code)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        Database::init("sqlite::memory:")
            .await
            .expect("in-memory database")
    }

    fn sample_avatar() -> NewAvatar {
        NewAvatar {
            name: "Luna".to_string(),
            style: Some("anime".to_string()),
            hair_color: Some("silver".to_string()),
            eye_color: None,
            personality: Some("curious".to_string()),
        }
    }

    #[tokio::test]
    async fn insert_and_fetch_round_trip_is_owner_scoped() {
        let db = test_db().await;
        let inserted = db.insert_avatar("user-1", sample_avatar()).await.unwrap();

        let fetched = db.get_avatar("user-1", &inserted.id).await.unwrap();
        let fetched = fetched.expect("owner sees the row");
        assert_eq!(fetched.name, "Luna");
        assert_eq!(fetched.style.as_deref(), Some("anime"));
        assert!(fetched.generated_image_url.is_none());
        assert!(fetched.generated_image_prompt.is_none());

        let other = db.get_avatar("user-2", &inserted.id).await.unwrap();
        assert!(other.is_none(), "other users must not see the row");
    }

    #[tokio::test]
    async fn list_returns_newest_first_for_owner_only() {
        let db = test_db().await;
        let first = db.insert_avatar("user-1", sample_avatar()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = db
            .insert_avatar(
                "user-1",
                NewAvatar {
                    name: "Nova".to_string(),
                    style: None,
                    hair_color: None,
                    eye_color: None,
                    personality: None,
                },
            )
            .await
            .unwrap();
        db.insert_avatar("user-2", sample_avatar()).await.unwrap();

        let rows = db.list_avatars("user-1").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, second.id);
        assert_eq!(rows[1].id, first.id);
    }

    #[tokio::test]
    async fn set_generated_image_updates_both_fields_together() {
        let db = test_db().await;
        let inserted = db.insert_avatar("user-1", sample_avatar()).await.unwrap();

        let updated = db
            .set_generated_image(
                "user-1",
                &inserted.id,
                "https://images.example/out.png",
                "a prompt",
            )
            .await
            .unwrap();
        assert!(updated);

        let row = db.get_avatar("user-1", &inserted.id).await.unwrap().unwrap();
        assert_eq!(
            row.generated_image_url.as_deref(),
            Some("https://images.example/out.png")
        );
        assert_eq!(row.generated_image_prompt.as_deref(), Some("a prompt"));
    }

    #[tokio::test]
    async fn set_generated_image_reports_missing_rows() {
        let db = test_db().await;
        let inserted = db.insert_avatar("user-1", sample_avatar()).await.unwrap();

        let updated = db
            .set_generated_image("user-2", &inserted.id, "https://x/y.png", "p")
            .await
            .unwrap();
        assert!(!updated, "update scoped to another user must not match");
    }
}
