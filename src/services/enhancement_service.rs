//! Domain service for the prompt enhancement pipeline.
//!
//! Validates inbound requests, resolves templates, drives the model gateway,
//! and maps replies onto persisted prompt/enhancement pairs.

use crate::api::types::{EnhancedPromptDto, HistoryResponse};
use crate::clients::GatewayError;
use thiserror::Error;

pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_MAX_TOKENS: i32 = 2048;

pub const MIN_PROMPT_CHARS: usize = 5;
pub const MAX_PROMPT_CHARS: usize = 5000;
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 0.1..=1.0;
pub const MAX_TOKENS_RANGE: std::ops::RangeInclusive<i32> = 256..=4096;

/// Fallback instruction when neither a template nor a custom override is given.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a prompt engineer specializing in PTCF framework optimization.";

/// Inbound enhancement request after JSON deserialization; range defaults
/// are applied during validation.
#[derive(Debug, Clone)]
pub struct EnhanceRequest {
    pub prompt_text: String,
    pub template_id: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<i32>,
    pub custom_system_prompt: Option<String>,
}

/// Bounds for a history listing.
#[derive(Debug, Clone)]
pub struct HistoryFilter {
    /// Inclusive RFC3339 lower bound on creation time
    pub from: Option<String>,
    /// Inclusive RFC3339 upper bound on creation time
    pub to: Option<String>,
    /// 1-based page number
    pub page: u64,
    pub page_size: u64,
}

/// Failure taxonomy of the enhancement pipeline.
///
/// `Provider` and `Malformed` mirror the gateway split so callers can tell
/// "the model is unreachable" from "the model replied off-contract";
/// `ResponseShape` is the third stage: valid JSON that misses an agreed field.
#[derive(Debug, Error)]
pub enum EnhancementError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Template not found")]
    TemplateNotFound,

    #[error("Provider request failed: {0}")]
    Provider(String),

    #[error("Failed to parse model reply as JSON: {0}")]
    Malformed(String),

    #[error("Invalid response structure: missing or invalid field '{0}'")]
    ResponseShape(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<GatewayError> for EnhancementError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::ProviderFailure(msg) => Self::Provider(msg),
            GatewayError::MalformedResponse(msg) => Self::Malformed(msg),
        }
    }
}

impl From<sea_orm::DbErr> for EnhancementError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for EnhancementError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Enhancement pipeline boundary; handlers depend on this trait so the
/// gateway can be scripted in tests.
#[async_trait::async_trait]
pub trait EnhancementService: Send + Sync {
    /// Run the full pipeline for one weak prompt.
    ///
    /// The prompt row is persisted before the provider call, so a gateway
    /// failure leaves it behind with no enhancement attached.
    async fn enhance(
        &self,
        owner: Option<i32>,
        request: EnhanceRequest,
    ) -> Result<EnhancedPromptDto, EnhancementError>;

    /// The caller's prompt rows, newest first, optionally bounded by an
    /// inclusive creation-time range.
    async fn history(
        &self,
        owner: i32,
        filter: HistoryFilter,
    ) -> Result<HistoryResponse, EnhancementError>;
}
