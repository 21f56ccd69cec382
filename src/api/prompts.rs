use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::{validate_page, validate_page_size};
use super::{ApiError, ApiResponse, AppState, EnhancePromptRequest, EnhancedPromptDto, HistoryResponse};
use crate::services::{EnhanceRequest, HistoryFilter};

const DEFAULT_PAGE_SIZE: u64 = 20;

/// POST /prompts/enhance
/// Run the weak prompt through the enhancement pipeline.
pub async fn enhance_prompt(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<EnhancePromptRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EnhancedPromptDto>>), ApiError> {
    let view = state
        .shared
        .enhancement_service
        .enhance(
            Some(user.id),
            EnhanceRequest {
                prompt_text: payload.prompt_text,
                template_id: payload.template_id,
                temperature: payload.temperature,
                max_tokens: payload.max_tokens,
                custom_system_prompt: payload.custom_system_prompt,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(view))))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Inclusive RFC3339 lower bound on creation time
    pub from: Option<String>,
    /// Inclusive RFC3339 upper bound on creation time
    pub to: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// GET /prompts/history
/// The caller's prompt records, newest first, with nested enhancements.
pub async fn history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<HistoryResponse>>, ApiError> {
    let page = validate_page(query.page.unwrap_or(1))?;
    let page_size = validate_page_size(query.page_size.unwrap_or(DEFAULT_PAGE_SIZE))?;

    let response = state
        .shared
        .enhancement_service
        .history(
            user.id,
            HistoryFilter {
                from: query.from,
                to: query.to,
                page,
                page_size,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(response)))
}
