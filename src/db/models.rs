use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user-owned avatar profile. `generated_image_url` and
/// `generated_image_prompt` are written together after a successful
/// generation, never independently.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AvatarRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub style: Option<String>,
    pub hair_color: Option<String>,
    pub eye_color: Option<String>,
    pub personality: Option<String>,
    pub generated_image_url: Option<String>,
    pub generated_image_prompt: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Descriptive fields supplied by the creation form. Blank optional fields
/// are stored as NULL.
#[derive(Debug, Clone)]
pub struct NewAvatar {
    pub name: String,
    pub style: Option<String>,
    pub hair_color: Option<String>,
    pub eye_color: Option<String>,
    pub personality: Option<String>,
}
