use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use echo::clients::{GatewayError, GatewayReply, GatewayRequest, ModelGateway};
use echo::config::Config;
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Default API key seeded by migration (must match m20240102_seed_users.rs)
const DEFAULT_API_KEY: &str = "echo_default_api_key_please_regenerate";

enum Script {
    Success,
    ProviderFail,
    MalformedReply,
    MissingField,
}

struct ScriptedGateway {
    script: Script,
}

fn full_reply_fields() -> serde_json::Map<String, serde_json::Value> {
    serde_json::json!({
        "persona": {"role": "senior engineer", "expertise": "debugging", "perspective": "pragmatic"},
        "task": {"objective": "repair the defect", "deliverable": "a patch", "constraints": ["keep tests green"]},
        "context": {"technical_background": "production web service", "key_considerations": ["backwards compatibility"], "audience": "maintainers"},
        "format": {"output_style": "unified diff", "structure": ["summary", "patch"], "tone": "concise"},
        "consolidated_prompt": "You are a senior engineer. Repair the defect and provide a patch.",
        "improvement_summary": "Added a persona, constraints, and an output format."
    })
    .as_object()
    .cloned()
    .unwrap()
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn enhance(&self, _request: GatewayRequest) -> Result<GatewayReply, GatewayError> {
        match self.script {
            Script::Success => Ok(GatewayReply {
                fields: full_reply_fields(),
                tokens_used: Some(512),
                model: "gemini-2.5-flash".to_string(),
            }),
            Script::ProviderFail => Err(GatewayError::ProviderFailure(
                "Gemini API error: 503 - overloaded".to_string(),
            )),
            Script::MalformedReply => Err(GatewayError::MalformedResponse(
                "expected value at line 1 column 1".to_string(),
            )),
            Script::MissingField => {
                let mut fields = full_reply_fields();
                fields.remove("consolidated_prompt");
                Ok(GatewayReply {
                    fields,
                    tokens_used: Some(512),
                    model: "gemini-2.5-flash".to_string(),
                })
            }
        }
    }
}

async fn spawn_app(script: Script) -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.gemini.api_key = "test-key".to_string();

    let gateway = Arc::new(ScriptedGateway { script });
    let state = echo::api::create_app_state_with_gateway(config, gateway, None)
        .await
        .expect("Failed to create app state");
    echo::api::router(state).await
}

fn authed_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("X-Api-Key", DEFAULT_API_KEY)
        .body(Body::empty())
        .unwrap()
}

fn authed_post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("X-Api-Key", DEFAULT_API_KEY)
        .header("Content-Type", mime::APPLICATION_JSON.as_ref())
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_auth_endpoints() {
    let app = spawn_app(Script::Success).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/system/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/system/status")
                .header("X-Api-Key", "wrong-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(authed_get("/api/system/status"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_templates_are_public_and_filterable() {
    let app = spawn_app(Script::Success).await;

    // No auth needed for the catalog
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/templates")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let templates = body["data"].as_array().unwrap();
    assert_eq!(templates.len(), 6);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/templates?category=code")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let templates = body["data"].as_array().unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0]["id"], "code-gen");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/templates?category=cooking")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/templates/code-gen")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/templates/no-such-template")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Template not found");
}

#[tokio::test]
async fn test_enhance_success_returns_created_view() {
    let app = spawn_app(Script::Success).await;

    let request = serde_json::json!({
        "prompt_text": "fix my code",
        "temperature": 0.3,
        "max_tokens": 2048
    });

    let response = app
        .clone()
        .oneshot(authed_post_json("/api/prompts/enhance", &request))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["original_text"], "fix my code");
    assert!(body["data"]["id"].is_number());
    assert!(body["data"]["created_at"].is_string());

    let enhanced = &body["data"]["enhanced"];
    assert!(!enhanced["consolidated_prompt"].as_str().unwrap().is_empty());
    assert_eq!(enhanced["persona"]["role"], "senior engineer");
    assert_eq!(enhanced["model_used"], "gemini-2.5-flash");
    assert_eq!(enhanced["tokens_used"], 512);

    // The pair shows up in history
    let response = app
        .clone()
        .oneshot(authed_get("/api/prompts/history"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert!(items[0]["enhanced"].is_object());
}

#[tokio::test]
async fn test_enhance_unknown_template_is_404_without_record() {
    let app = spawn_app(Script::Success).await;

    let request = serde_json::json!({
        "prompt_text": "fix my code",
        "template_id": "code-gen-missing"
    });

    let response = app
        .clone()
        .oneshot(authed_post_json("/api/prompts/enhance", &request))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Template not found");

    // Template resolution happens before record creation
    let response = app
        .clone()
        .oneshot(authed_get("/api/prompts/history"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body["data"]["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_enhance_validation_lists_offending_fields() {
    let app = spawn_app(Script::Success).await;

    let request = serde_json::json!({
        "prompt_text": "hi",
        "temperature": 2.0,
        "max_tokens": 10
    });

    let response = app
        .clone()
        .oneshot(authed_post_json("/api/prompts/enhance", &request))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("prompt_text"));
    assert!(message.contains("temperature"));
    assert!(message.contains("max_tokens"));
}

#[tokio::test]
async fn test_enhance_provider_failure_leaves_orphan_record() {
    let app = spawn_app(Script::ProviderFail).await;

    let request = serde_json::json!({ "prompt_text": "fix my code" });

    let response = app
        .clone()
        .oneshot(authed_post_json("/api/prompts/enhance", &request))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("overloaded"));

    // The prompt row survives the failed attempt, with no enhancement
    let response = app
        .clone()
        .oneshot(authed_get("/api/prompts/history"))
        .await
        .unwrap();
    let body = body_json(response).await;
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert!(items[0]["enhanced"].is_null());
}

#[tokio::test]
async fn test_enhance_malformed_reply_is_400() {
    let app = spawn_app(Script::MalformedReply).await;

    let response = app
        .clone()
        .oneshot(authed_post_json(
            "/api/prompts/enhance",
            &serde_json::json!({ "prompt_text": "fix my code" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Failed to parse AI response as JSON")
    );
}

#[tokio::test]
async fn test_enhance_shape_mismatch_is_500() {
    let app = spawn_app(Script::MissingField).await;

    let response = app
        .clone()
        .oneshot(authed_post_json(
            "/api/prompts/enhance",
            &serde_json::json!({ "prompt_text": "fix my code" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("Invalid response structure"));
    assert!(message.contains("consolidated_prompt"));
}

#[tokio::test]
async fn test_saved_prompt_lifecycle() {
    let app = spawn_app(Script::Success).await;

    let response = app
        .clone()
        .oneshot(authed_post_json(
            "/api/prompts/enhance",
            &serde_json::json!({ "prompt_text": "fix my code" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let prompt_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    // Save the pair
    let save_body = serde_json::json!({
        "prompt_id": prompt_id,
        "custom_title": "Debugging prompt",
        "category": "code"
    });
    let response = app
        .clone()
        .oneshot(authed_post_json("/api/saved", &save_body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let saved_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["custom_title"], "Debugging prompt");
    assert_eq!(body["data"]["original_text"], "fix my code");
    assert_eq!(body["data"]["is_favorite"], false);

    // Saving the same pair again conflicts instead of duplicating
    let response = app
        .clone()
        .oneshot(authed_post_json("/api/saved", &save_body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.clone().oneshot(authed_get("/api/saved")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Not a favorite yet
    let response = app
        .clone()
        .oneshot(authed_get("/api/saved/favorites"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    // Toggle on
    let toggle_uri = format!("/api/saved/{saved_id}/toggle_favorite");
    let response = app
        .clone()
        .oneshot(authed_post_json(&toggle_uri, &serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["is_favorite"], true);

    let response = app
        .clone()
        .oneshot(authed_get("/api/saved/favorites"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Toggling twice returns to the original state
    let response = app
        .clone()
        .oneshot(authed_post_json(&toggle_uri, &serde_json::json!({})))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["is_favorite"], false);

    // Unknown ids are not found
    let response = app
        .clone()
        .oneshot(authed_post_json(
            "/api/saved/99999/toggle_favorite",
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Delete and confirm gone
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/saved/{saved_id}"))
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(authed_get("/api/saved")).await.unwrap();
    let body = body_json(response).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_saving_orphan_prompt_is_rejected() {
    let app = spawn_app(Script::ProviderFail).await;

    let response = app
        .clone()
        .oneshot(authed_post_json(
            "/api/prompts/enhance",
            &serde_json::json!({ "prompt_text": "fix my code" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The orphan row exists but has nothing to bookmark
    let response = app
        .clone()
        .oneshot(authed_get("/api/prompts/history"))
        .await
        .unwrap();
    let body = body_json(response).await;
    let prompt_id = body["data"]["items"][0]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(authed_post_json(
            "/api/saved",
            &serde_json::json!({ "prompt_id": prompt_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // A prompt id that does not exist reads as absent
    let response = app
        .clone()
        .oneshot(authed_post_json(
            "/api/saved",
            &serde_json::json!({ "prompt_id": 4242 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_system_status_counts() {
    let app = spawn_app(Script::Success).await;

    let response = app
        .clone()
        .oneshot(authed_post_json(
            "/api/prompts/enhance",
            &serde_json::json!({ "prompt_text": "fix my code" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(authed_get("/api/system/status"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["total_prompts"], 1);
    assert_eq!(body["data"]["total_enhancements"], 1);
    assert_eq!(body["data"]["saved_prompts"], 0);
    assert!(body["data"]["version"].is_string());
}
