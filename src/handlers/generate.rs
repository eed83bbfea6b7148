use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::handlers::access::AuthedUser;
use crate::prompt::build_prompt;
use crate::provider::Submission;
use crate::state::AppState;
use crate::utils::timing::log_provider_timing;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageRequest {
    #[serde(default)]
    pub avatar_id: Option<String>,
    #[serde(default)]
    pub extra_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageResponse {
    pub image_url: String,
    pub prompt: String,
}

pub async fn generate_avatar_image(
    State(state): State<AppState>,
    AuthedUser(user_id): AuthedUser,
    Json(request): Json<GenerateImageRequest>,
) -> Result<Json<GenerateImageResponse>, AppError> {
    let response = run_generation(&state, &user_id, request).await?;
    Ok(Json(response))
}

/// Runs the whole generation workflow for one request: lookup, prompt build,
/// submission, optional polling, persistence. Strictly sequential; nothing
/// here is retried, and a second request for the same avatar simply submits
/// another job.
pub(crate) async fn run_generation(
    state: &AppState,
    user_id: &str,
    request: GenerateImageRequest,
) -> Result<GenerateImageResponse, AppError> {
    let avatar_id = request.avatar_id.as_deref().map(str::trim).unwrap_or("");
    if avatar_id.is_empty() {
        return Err(AppError::InvalidRequest("avatarId is required".to_string()));
    }

    let avatar = state
        .db
        .get_avatar(user_id, avatar_id)
        .await
        .map_err(|err| AppError::NotFound(format!("{avatar_id} ({err})")))?
        .ok_or_else(|| AppError::NotFound(avatar_id.to_string()))?;

    let prompt = build_prompt(&avatar, request.extra_prompt.as_deref());
    info!("Submitting generation job for avatar {}", avatar.id);

    let submission =
        log_provider_timing("replicate", "submit", || state.provider.submit(&prompt)).await?;

    let outputs = match submission {
        Submission::Completed(outputs) => outputs,
        Submission::Queued { poll_url } => {
            log_provider_timing("replicate", "poll", || {
                state.provider.wait_for_output(&poll_url)
            })
            .await?
        }
    };

    let Some(image_url) = outputs.into_iter().next() else {
        return Err(AppError::EmptyProviderOutput);
    };

    // Concurrent generations for the same avatar race on this write; last
    // write wins.
    let updated = state
        .db
        .set_generated_image(user_id, &avatar.id, &image_url, &prompt)
        .await
        .map_err(|err| {
            AppError::Persistence(format!("{err} (generated image: {image_url})"))
        })?;
    if !updated {
        return Err(AppError::Persistence(format!(
            "avatar row no longer matched (generated image: {image_url})"
        )));
    }

    info!("Stored generated portrait for avatar {}", avatar.id);
    Ok(GenerateImageResponse { image_url, prompt })
}
