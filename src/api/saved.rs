use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::validate_record_id;
use super::{ApiError, ApiResponse, AppState, SavePromptRequest, SavedPromptDto};
use crate::db::SavedCreateOutcome;

/// GET /saved
pub async fn list_saved(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<SavedPromptDto>>>, ApiError> {
    let rows = state.store().list_saved_prompts(user.id, false).await?;
    let dtos: Vec<SavedPromptDto> = rows.into_iter().map(SavedPromptDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// GET /saved/favorites
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<SavedPromptDto>>>, ApiError> {
    let rows = state.store().list_saved_prompts(user.id, true).await?;
    let dtos: Vec<SavedPromptDto> = rows.into_iter().map(SavedPromptDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /saved
/// Bookmark one of the caller's prompt/enhancement pairs.
pub async fn create_saved(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<SavePromptRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SavedPromptDto>>), ApiError> {
    let prompt_id = validate_record_id(payload.prompt_id)?;

    // Foreign prompt ids read as absent, same as the rest of the
    // saved-item surface.
    let (prompt, enhanced) = state
        .store()
        .get_owned_prompt(prompt_id, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Prompt", prompt_id))?;

    let enhanced = enhanced.ok_or_else(|| {
        ApiError::validation("Prompt has no enhancement result and cannot be saved")
    })?;

    let outcome = state
        .store()
        .create_saved_prompt(
            user.id,
            prompt.id,
            enhanced.id,
            payload.custom_title.as_deref(),
            &payload.notes,
            &payload.category,
            payload.is_favorite,
        )
        .await?;

    let saved = match outcome {
        SavedCreateOutcome::Created(saved) => saved,
        SavedCreateOutcome::Duplicate => {
            return Err(ApiError::Conflict(
                "This prompt is already saved".to_string(),
            ));
        }
    };

    let row = state
        .store()
        .get_saved_prompt(saved.id, user.id)
        .await?
        .ok_or_else(|| ApiError::internal("Failed to load saved prompt after create"))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(SavedPromptDto::from(row))),
    ))
}

/// POST /saved/{id}/toggle_favorite
pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<SavedPromptDto>>, ApiError> {
    let updated = state.store().toggle_saved_favorite(id, user.id).await?;

    let Some(updated) = updated else {
        return Err(ApiError::not_found("Saved prompt", id));
    };

    let row = state
        .store()
        .get_saved_prompt(updated.id, user.id)
        .await?
        .ok_or_else(|| ApiError::internal("Failed to load saved prompt after toggle"))?;

    Ok(Json(ApiResponse::success(SavedPromptDto::from(row))))
}

/// DELETE /saved/{id}
pub async fn delete_saved(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let deleted = state.store().remove_saved_prompt(id, user.id).await?;
    if deleted {
        Ok(Json(ApiResponse::success(true)))
    } else {
        Err(ApiError::not_found("Saved prompt", id))
    }
}
