use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, SystemStatus};

/// GET /system/status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let store = state.store();

    let total_prompts = store.count_prompts().await?;
    let total_enhancements = store.count_enhancements().await?;
    let saved_prompts = store.count_saved_prompts().await?;

    Ok(Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        total_prompts,
        total_enhancements,
        saved_prompts,
    })))
}
