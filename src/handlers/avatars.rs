use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::db::models::{AvatarRow, NewAvatar};
use crate::error::AppError;
use crate::handlers::access::AuthedUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAvatarRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub hair_color: Option<String>,
    #[serde(default)]
    pub eye_color: Option<String>,
    #[serde(default)]
    pub personality: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub async fn list_avatars(
    State(state): State<AppState>,
    AuthedUser(user_id): AuthedUser,
) -> Result<Json<Vec<AvatarRow>>, AppError> {
    let avatars = state.db.list_avatars(&user_id).await?;
    Ok(Json(avatars))
}

pub async fn create_avatar(
    State(state): State<AppState>,
    AuthedUser(user_id): AuthedUser,
    Json(request): Json<CreateAvatarRequest>,
) -> Result<(StatusCode, Json<AvatarRow>), AppError> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::InvalidRequest("name is required".to_string()));
    }

    let avatar = NewAvatar {
        name,
        style: non_blank(request.style),
        hair_color: non_blank(request.hair_color),
        eye_color: non_blank(request.eye_color),
        personality: non_blank(request.personality),
    };

    let row = state
        .db
        .insert_avatar(&user_id, avatar)
        .await
        .map_err(|err| AppError::Persistence(err.to_string()))?;
    info!("Created avatar {} for user {}", row.id, user_id);

    Ok((StatusCode::CREATED, Json(row)))
}
