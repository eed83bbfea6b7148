pub mod access;
pub mod avatars;
pub mod generate;

use axum::extract::State;

use crate::error::AppError;
use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Result<&'static str, AppError> {
    state.db.health_check().await?;
    Ok("ok")
}
