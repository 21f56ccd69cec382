use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{GatewayError, GatewayReply, GatewayRequest, ModelGateway};
use crate::config::GeminiConfig;

const GEMINI_API: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: i32,
    top_p: f64,
    top_k: i32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    candidates_token_count: Option<i32>,
}

/// Client for the Gemini `generateContent` endpoint.
///
/// Constructed once at startup around the shared HTTP client; the request
/// timeout configured on that client bounds every enhancement call.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(client: Client, config: &GeminiConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn generate(&self, request: &GatewayRequest) -> Result<(String, Option<i32>), GatewayError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_API, self.model, self.api_key
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_instruction(request),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
                top_p: 0.9,
                top_k: 40,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::ProviderFailure(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::ProviderFailure(format!(
                "Gemini API error: {status} - {body}"
            )));
        }

        let reply: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::ProviderFailure(e.to_string()))?;

        let text: String = reply
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GatewayError::ProviderFailure(
                "Gemini returned no candidate text".to_string(),
            ));
        }

        let tokens_used = reply
            .usage_metadata
            .and_then(|u| u.candidates_token_count);

        Ok((text, tokens_used))
    }
}

#[async_trait]
impl ModelGateway for GeminiClient {
    async fn enhance(&self, request: GatewayRequest) -> Result<GatewayReply, GatewayError> {
        let (text, tokens_used) = self.generate(&request).await?;

        let value = extract_json(&text)?;

        let serde_json::Value::Object(fields) = value else {
            return Err(GatewayError::MalformedResponse(
                "top-level JSON value is not an object".to_string(),
            ));
        };

        tracing::debug!(
            fields = fields.len(),
            tokens = ?tokens_used,
            "Parsed enhancement reply"
        );

        Ok(GatewayReply {
            fields,
            tokens_used,
            model: self.model.clone(),
        })
    }
}

/// Extract the JSON object embedded in model output.
///
/// Boundary scan from the first `{` to the last `}`. Tolerates leading
/// prose, trailing prose, and markdown fences without parsing JSON grammar;
/// not robust to multiple objects or braces outside the real object, which
/// the instruction template rules out.
pub fn extract_json(text: &str) -> Result<serde_json::Value, GatewayError> {
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Err(GatewayError::MalformedResponse(
            "no JSON object found in model reply".to_string(),
        ));
    };

    if end < start {
        return Err(GatewayError::MalformedResponse(
            "no JSON object found in model reply".to_string(),
        ));
    }

    serde_json::from_str(&text[start..=end])
        .map_err(|e| GatewayError::MalformedResponse(e.to_string()))
}

/// Compose the single instruction sent to the model: system instruction,
/// JSON-only directive, the weak prompt quoted verbatim, and the exact
/// schema the reply must follow.
fn build_instruction(request: &GatewayRequest) -> String {
    format!(
        r#"{system}

CRITICAL: Output ONLY valid JSON. No explanations, no markdown, no extra text.

User prompt to transform: "{prompt}"

Return ONLY this exact JSON format with no other text:
{{
  "persona": {{"role": "specific role", "expertise": "area of expertise", "perspective": "unique perspective"}},
  "task": {{"objective": "clear objective", "deliverable": "expected output", "constraints": ["constraint1", "constraint2"]}},
  "context": {{"technical_background": "relevant background", "key_considerations": ["consideration1"], "audience": "target audience"}},
  "format": {{"output_style": "style description", "structure": ["element1", "element2"], "tone": "tone"}},
  "consolidated_prompt": "the final enhanced prompt text here",
  "improvement_summary": "brief explanation of improvements"
}}"#,
        system = request.system_instruction,
        prompt = request.weak_prompt,
    )
}
