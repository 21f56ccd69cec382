use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::validate_category;
use super::{ApiError, ApiResponse, AppState, TemplateDto};

#[derive(Debug, Deserialize)]
pub struct TemplateListQuery {
    pub category: Option<String>,
}

/// GET /templates
/// Publicly list active templates, optionally filtered by category.
pub async fn list_templates(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TemplateListQuery>,
) -> Result<Json<ApiResponse<Vec<TemplateDto>>>, ApiError> {
    let category = match query.category.as_deref() {
        Some(category) => Some(validate_category(category)?),
        None => None,
    };

    let templates = state.store().list_active_templates(category).await?;
    let dtos: Vec<TemplateDto> = templates.into_iter().map(TemplateDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// GET /templates/{id}
pub async fn get_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TemplateDto>>, ApiError> {
    let template = state.store().get_active_template(&id).await?;

    match template {
        Some(template) => Ok(Json(ApiResponse::success(TemplateDto::from(template)))),
        None => Err(ApiError::template_not_found()),
    }
}
