//! Gateway-backed implementation of the `EnhancementService` trait.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::api::types::{EnhancedDetailDto, EnhancedPromptDto, HistoryResponse, PromptHistoryDto};
use crate::clients::{GatewayRequest, ModelGateway};
use crate::db::{NewEnhancement, Store};
use crate::models::enhancement::{ContextSpec, FormatSpec, PersonaSpec, TaskSpec};
use crate::services::enhancement_service::{
    DEFAULT_MAX_TOKENS, DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE, EnhanceRequest,
    EnhancementError, EnhancementService, HistoryFilter, MAX_PROMPT_CHARS, MAX_TOKENS_RANGE,
    MIN_PROMPT_CHARS, TEMPERATURE_RANGE,
};

pub struct GeminiEnhancementService {
    store: Store,
    gateway: Arc<dyn ModelGateway>,
}

impl GeminiEnhancementService {
    pub fn new(store: Store, gateway: Arc<dyn ModelGateway>) -> Self {
        Self { store, gateway }
    }

    /// Check field ranges, collecting every violation into one message.
    fn validate(request: &EnhanceRequest) -> Result<(f64, i32), EnhancementError> {
        let mut problems = Vec::new();

        let chars = request.prompt_text.chars().count();
        if !(MIN_PROMPT_CHARS..=MAX_PROMPT_CHARS).contains(&chars) {
            problems.push(format!(
                "prompt_text must be between {MIN_PROMPT_CHARS} and {MAX_PROMPT_CHARS} characters"
            ));
        }

        let temperature = request.temperature.unwrap_or(DEFAULT_TEMPERATURE);
        if !TEMPERATURE_RANGE.contains(&temperature) {
            problems.push(format!(
                "temperature must be between {} and {}",
                TEMPERATURE_RANGE.start(),
                TEMPERATURE_RANGE.end()
            ));
        }

        let max_tokens = request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
        if !MAX_TOKENS_RANGE.contains(&max_tokens) {
            problems.push(format!(
                "max_tokens must be between {} and {}",
                MAX_TOKENS_RANGE.start(),
                MAX_TOKENS_RANGE.end()
            ));
        }

        if problems.is_empty() {
            Ok((temperature, max_tokens))
        } else {
            Err(EnhancementError::Validation(problems.join("; ")))
        }
    }

    /// Template instruction if one is referenced; a non-empty custom
    /// instruction always wins over the template's.
    async fn resolve_instruction(
        &self,
        request: &EnhanceRequest,
    ) -> Result<String, EnhancementError> {
        let mut instruction = DEFAULT_SYSTEM_PROMPT.to_string();

        if let Some(template_id) = request.template_id.as_deref().filter(|id| !id.is_empty()) {
            let template = self
                .store
                .get_template(template_id)
                .await?
                .ok_or(EnhancementError::TemplateNotFound)?;
            instruction = template.system_prompt;
        }

        if let Some(custom) = request
            .custom_system_prompt
            .as_deref()
            .filter(|p| !p.is_empty())
        {
            instruction = custom.to_string();
        }

        Ok(instruction)
    }
}

/// Pull one agreed field out of the model's reply map. The JSON was already
/// well-formed; a miss here means the provider drifted from the contract.
fn take_field<T: DeserializeOwned>(
    fields: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Result<T, EnhancementError> {
    let value = fields
        .get(key)
        .ok_or_else(|| EnhancementError::ResponseShape(key.to_string()))?;

    serde_json::from_value(value.clone())
        .map_err(|_| EnhancementError::ResponseShape(key.to_string()))
}

#[async_trait]
impl EnhancementService for GeminiEnhancementService {
    async fn enhance(
        &self,
        owner: Option<i32>,
        request: EnhanceRequest,
    ) -> Result<EnhancedPromptDto, EnhancementError> {
        let (temperature, max_tokens) = Self::validate(&request)?;

        // Resolve before persisting anything: an unknown template must not
        // leave a prompt row behind.
        let system_instruction = self.resolve_instruction(&request).await?;

        let prompt = self
            .store
            .create_prompt(
                owner,
                &request.prompt_text,
                request.template_id.as_deref().filter(|id| !id.is_empty()),
                temperature,
                max_tokens,
            )
            .await?;

        let started = Instant::now();
        let reply = self
            .gateway
            .enhance(GatewayRequest {
                weak_prompt: request.prompt_text.clone(),
                system_instruction,
                temperature,
                max_tokens,
            })
            .await;
        let processing_time_ms = i32::try_from(started.elapsed().as_millis()).unwrap_or(i32::MAX);

        // The prompt row stays behind as an audit trail of the attempt.
        let reply = reply.inspect_err(|e| {
            warn!(prompt_id = prompt.id, "Enhancement failed: {e}");
        })?;

        let persona: PersonaSpec = take_field(&reply.fields, "persona")?;
        let task: TaskSpec = take_field(&reply.fields, "task")?;
        let context: ContextSpec = take_field(&reply.fields, "context")?;
        let format: FormatSpec = take_field(&reply.fields, "format")?;
        let consolidated_prompt: String = take_field(&reply.fields, "consolidated_prompt")?;
        let improvement_summary: String = take_field(&reply.fields, "improvement_summary")?;

        let enhancement = NewEnhancement {
            persona: serde_json::to_string(&persona)
                .map_err(|e| EnhancementError::Database(e.to_string()))?,
            task: serde_json::to_string(&task)
                .map_err(|e| EnhancementError::Database(e.to_string()))?,
            context: serde_json::to_string(&context)
                .map_err(|e| EnhancementError::Database(e.to_string()))?,
            format: serde_json::to_string(&format)
                .map_err(|e| EnhancementError::Database(e.to_string()))?,
            consolidated_prompt,
            improvement_summary,
            model_used: reply.model,
            tokens_used: reply.tokens_used,
            processing_time_ms: Some(processing_time_ms),
        };

        let enhanced = self.store.attach_enhancement(prompt.id, enhancement).await?;

        info!(
            prompt_id = prompt.id,
            elapsed_ms = processing_time_ms,
            tokens = ?enhanced.tokens_used,
            "Prompt enhanced"
        );

        Ok(EnhancedPromptDto {
            id: prompt.id,
            original_text: prompt.original_text,
            enhanced: EnhancedDetailDto::from(enhanced),
            created_at: prompt.created_at,
        })
    }

    async fn history(
        &self,
        owner: i32,
        filter: HistoryFilter,
    ) -> Result<HistoryResponse, EnhancementError> {
        let (rows, total_pages) = self
            .store
            .prompt_history(
                owner,
                filter.from.as_deref(),
                filter.to.as_deref(),
                filter.page,
                filter.page_size,
            )
            .await?;

        let items = rows
            .into_iter()
            .map(|(prompt, enhanced)| PromptHistoryDto {
                id: prompt.id,
                original_text: prompt.original_text,
                template_id: prompt.template_id,
                temperature: prompt.temperature,
                max_tokens: prompt.max_tokens,
                enhanced: enhanced.map(EnhancedDetailDto::from),
                created_at: prompt.created_at,
            })
            .collect();

        Ok(HistoryResponse { items, total_pages })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{GatewayError, GatewayReply};
    use tokio::sync::Mutex;

    enum Script {
        Reply(serde_json::Value),
        ProviderFail,
    }

    struct MockGateway {
        script: Script,
        seen: Mutex<Vec<GatewayRequest>>,
    }

    impl MockGateway {
        fn new(script: Script) -> Self {
            Self {
                script,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ModelGateway for MockGateway {
        async fn enhance(&self, request: GatewayRequest) -> Result<GatewayReply, GatewayError> {
            self.seen.lock().await.push(request);
            match &self.script {
                Script::Reply(value) => Ok(GatewayReply {
                    fields: value.as_object().cloned().unwrap_or_default(),
                    tokens_used: Some(321),
                    model: "gemini-2.5-flash".to_string(),
                }),
                Script::ProviderFail => Err(GatewayError::ProviderFailure(
                    "connection refused".to_string(),
                )),
            }
        }
    }

    fn full_reply() -> serde_json::Value {
        serde_json::json!({
            "persona": {"role": "engineer", "expertise": "Rust", "perspective": "pragmatic"},
            "task": {"objective": "fix", "deliverable": "patch", "constraints": ["tested"]},
            "context": {"technical_background": "web backend", "key_considerations": ["safety"], "audience": "devs"},
            "format": {"output_style": "diff", "structure": ["summary", "patch"], "tone": "terse"},
            "consolidated_prompt": "You are an engineer. Fix the code.",
            "improvement_summary": "Added persona and constraints."
        })
    }

    async fn service_with(script: Script) -> (GeminiEnhancementService, Store, Arc<MockGateway>) {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let gateway = Arc::new(MockGateway::new(script));
        let service = GeminiEnhancementService::new(store.clone(), gateway.clone());
        (service, store, gateway)
    }

    fn request(text: &str) -> EnhanceRequest {
        EnhanceRequest {
            prompt_text: text.to_string(),
            template_id: None,
            temperature: None,
            max_tokens: None,
            custom_system_prompt: None,
        }
    }

    #[tokio::test]
    async fn test_enhance_success_persists_pair() {
        let (service, store, _) = service_with(Script::Reply(full_reply())).await;

        let view = service.enhance(Some(1), request("fix my code")).await.unwrap();

        assert_eq!(view.original_text, "fix my code");
        assert!(!view.enhanced.consolidated_prompt.is_empty());
        assert_eq!(view.enhanced.persona.role.as_deref(), Some("engineer"));
        assert_eq!(view.enhanced.tokens_used, Some(321));
        assert_eq!(store.count_prompts().await.unwrap(), 1);
        assert_eq!(store.count_enhancements().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_validation_rejects_out_of_range_fields() {
        let (service, store, _) = service_with(Script::Reply(full_reply())).await;

        let mut bad = request("hi");
        bad.temperature = Some(1.5);
        bad.max_tokens = Some(100);

        let err = service.enhance(Some(1), bad).await.unwrap_err();
        let message = match err {
            EnhancementError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        };

        assert!(message.contains("prompt_text"));
        assert!(message.contains("temperature"));
        assert!(message.contains("max_tokens"));
        assert_eq!(store.count_prompts().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_template_leaves_no_prompt_row() {
        let (service, store, _) = service_with(Script::Reply(full_reply())).await;

        let mut req = request("fix my code");
        req.template_id = Some("does-not-exist".to_string());

        let err = service.enhance(Some(1), req).await.unwrap_err();
        assert!(matches!(err, EnhancementError::TemplateNotFound));
        assert_eq!(store.count_prompts().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_leaves_orphan_prompt() {
        let (service, store, _) = service_with(Script::ProviderFail).await;

        let err = service.enhance(Some(1), request("fix my code")).await.unwrap_err();
        assert!(matches!(err, EnhancementError::Provider(_)));
        assert_eq!(store.count_prompts().await.unwrap(), 1);
        assert_eq!(store.count_enhancements().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_field_is_shape_error() {
        let mut reply = full_reply();
        reply.as_object_mut().unwrap().remove("consolidated_prompt");
        let (service, store, _) = service_with(Script::Reply(reply)).await;

        let err = service.enhance(Some(1), request("fix my code")).await.unwrap_err();
        match err {
            EnhancementError::ResponseShape(field) => assert_eq!(field, "consolidated_prompt"),
            other => panic!("expected shape error, got {other:?}"),
        }
        assert_eq!(store.count_prompts().await.unwrap(), 1);
        assert_eq!(store.count_enhancements().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_template_supplies_instruction() {
        let (service, _, gateway) = service_with(Script::Reply(full_reply())).await;

        let mut req = request("fix my code");
        req.template_id = Some("code-gen".to_string());
        service.enhance(Some(1), req).await.unwrap();

        let seen = gateway.seen.lock().await;
        assert!(seen[0].system_instruction.contains("senior software engineer"));
    }

    #[tokio::test]
    async fn test_custom_instruction_overrides_template() {
        let (service, _, gateway) = service_with(Script::Reply(full_reply())).await;

        let mut req = request("fix my code");
        req.template_id = Some("code-gen".to_string());
        req.custom_system_prompt = Some("Respond as a pirate.".to_string());
        service.enhance(Some(1), req).await.unwrap();

        let seen = gateway.seen.lock().await;
        assert_eq!(seen[0].system_instruction, "Respond as a pirate.");
    }

    #[tokio::test]
    async fn test_default_instruction_without_template() {
        let (service, _, gateway) = service_with(Script::Reply(full_reply())).await;

        service.enhance(Some(1), request("fix my code")).await.unwrap();

        let seen = gateway.seen.lock().await;
        assert_eq!(seen[0].system_instruction, DEFAULT_SYSTEM_PROMPT);
        assert!((seen[0].temperature - DEFAULT_TEMPERATURE).abs() < f64::EPSILON);
        assert_eq!(seen[0].max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[tokio::test]
    async fn test_history_includes_orphans_and_pages() {
        let (service, _, _) = service_with(Script::Reply(full_reply())).await;

        service.enhance(Some(7), request("first prompt")).await.unwrap();
        service.enhance(Some(7), request("second prompt")).await.unwrap();

        let page = service
            .history(
                7,
                HistoryFilter {
                    from: None,
                    to: None,
                    page: 1,
                    page_size: 1,
                },
            )
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_pages, 2);

        // Another owner sees nothing.
        let empty = service
            .history(
                8,
                HistoryFilter {
                    from: None,
                    to: None,
                    page: 1,
                    page_size: 10,
                },
            )
            .await
            .unwrap();
        assert!(empty.items.is_empty());
    }
}
