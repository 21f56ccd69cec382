use async_trait::async_trait;
use thiserror::Error;

pub mod gemini;

pub use gemini::GeminiClient;

/// Parameters for one enhancement call against the model provider.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub weak_prompt: String,
    pub system_instruction: String,
    pub temperature: f64,
    pub max_tokens: i32,
}

/// Raw result of a successful provider round trip: the parsed JSON object
/// exactly as the model produced it, plus usage metadata. Schema enforcement
/// happens later so transport, malformed-JSON, and shape errors stay
/// distinguishable.
#[derive(Debug, Clone)]
pub struct GatewayReply {
    pub fields: serde_json::Map<String, serde_json::Value>,
    pub tokens_used: Option<i32>,
    pub model: String,
}

/// The two gateway failure modes drive different user-facing messages:
/// "the provider is unreachable" vs "the provider replied, but not with
/// the agreed JSON".
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Provider request failed: {0}")]
    ProviderFailure(String),

    #[error("Failed to parse model reply as JSON: {0}")]
    MalformedResponse(String),
}

/// Boundary to the external text-generation provider. A provider call that
/// fails must surface as a [`GatewayError`], never as a panic or a leaked
/// transport error type.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn enhance(&self, request: GatewayRequest) -> Result<GatewayReply, GatewayError>;
}
