use serde::{Deserialize, Serialize};

use crate::db::SavedItemRow;
use crate::entities::{enhanced_prompts, templates};
use crate::models::enhancement::{ContextSpec, FormatSpec, PersonaSpec, TaskSpec};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TemplateDto {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub system_prompt: String,
}

impl From<templates::Model> for TemplateDto {
    fn from(model: templates::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            category: model.category,
            description: model.description,
            system_prompt: model.system_prompt,
        }
    }
}

/// Nested enhancement payload returned inside prompt and saved-item views.
#[derive(Debug, Serialize)]
pub struct EnhancedDetailDto {
    pub id: i32,
    pub persona: PersonaSpec,
    pub task: TaskSpec,
    pub context: ContextSpec,
    pub format: FormatSpec,
    pub consolidated_prompt: String,
    pub improvement_summary: String,
    pub model_used: String,
    pub tokens_used: Option<i32>,
}

impl From<enhanced_prompts::Model> for EnhancedDetailDto {
    fn from(model: enhanced_prompts::Model) -> Self {
        // The JSON columns are written from these same types; a row that no
        // longer parses degrades to empty sections instead of failing the read.
        Self {
            id: model.id,
            persona: serde_json::from_str(&model.persona).unwrap_or_default(),
            task: serde_json::from_str(&model.task).unwrap_or_default(),
            context: serde_json::from_str(&model.context).unwrap_or_default(),
            format: serde_json::from_str(&model.format).unwrap_or_default(),
            consolidated_prompt: model.consolidated_prompt,
            improvement_summary: model.improvement_summary,
            model_used: model.model_used,
            tokens_used: model.tokens_used,
        }
    }
}

/// Response body of a successful enhancement call.
#[derive(Debug, Serialize)]
pub struct EnhancedPromptDto {
    pub id: i32,
    pub original_text: String,
    pub enhanced: EnhancedDetailDto,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct PromptHistoryDto {
    pub id: i32,
    pub original_text: String,
    pub template_id: Option<String>,
    pub temperature: f64,
    pub max_tokens: i32,
    /// None for prompts whose enhancement attempt failed
    pub enhanced: Option<EnhancedDetailDto>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub items: Vec<PromptHistoryDto>,
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct SavedPromptDto {
    pub id: i32,
    pub custom_title: Option<String>,
    pub notes: String,
    pub category: String,
    pub original_text: String,
    pub enhanced: EnhancedDetailDto,
    pub is_favorite: bool,
    pub created_at: String,
    pub last_accessed: String,
}

impl From<SavedItemRow> for SavedPromptDto {
    fn from(row: SavedItemRow) -> Self {
        Self {
            id: row.saved.id,
            custom_title: row.saved.custom_title,
            notes: row.saved.notes,
            category: row.saved.category,
            original_text: row.prompt.original_text,
            enhanced: EnhancedDetailDto::from(row.enhanced),
            is_favorite: row.saved.is_favorite,
            created_at: row.saved.created_at,
            last_accessed: row.saved.last_accessed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub total_prompts: u64,
    pub total_enhancements: u64,
    pub saved_prompts: u64,
}

#[derive(Debug, Deserialize)]
pub struct EnhancePromptRequest {
    pub prompt_text: String,
    pub template_id: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<i32>,
    pub custom_system_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SavePromptRequest {
    pub prompt_id: i32,
    pub custom_title: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_favorite: bool,
}
