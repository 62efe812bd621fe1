//! Google Gemini provider implementation

use super::types::{ContentBlock, LlmRequest, LlmResponse, MessageRole, Usage};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const API_KEY_HEADER: &str = "x-goog-api-key";

pub const DEFAULT_GEMINI_MODEL: &str = "models/gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Connection settings for the Gemini API
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Model resource name, e.g. `models/gemini-2.5-flash`
    pub model: String,
    pub base_url: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }
}

/// A model the configured key can see
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSummary {
    pub name: String,
    pub supported_generation_methods: Vec<String>,
}

/// Gemini service implementation
pub struct GeminiService {
    client: Client,
    api_key: String,
    base_url: String,
    model_id: String,
}

impl GeminiService {
    pub fn new(config: GeminiConfig) -> Self {
        // Accept both "gemini-2.5-flash" and "models/gemini-2.5-flash"
        let model_id = if config.model.starts_with("models/") {
            config.model
        } else {
            format!("models/{}", config.model)
        };

        Self {
            client: Client::new(),
            api_key: config.api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model_id,
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/v1beta/{}:generateContent", self.base_url, self.model_id)
    }

    fn translate_request(request: &LlmRequest) -> GeminiRequest {
        let contents = request
            .messages
            .iter()
            .map(|msg| GeminiContent {
                role: Some(
                    match msg.role {
                        MessageRole::User => "user",
                    }
                    .to_string(),
                ),
                parts: msg
                    .content
                    .iter()
                    .map(|ContentBlock::Text { text }| GeminiPart {
                        text: Some(text.clone()),
                        thought: false,
                    })
                    .collect(),
            })
            .filter(|content| !content.parts.is_empty())
            .collect();

        GeminiRequest { contents }
    }

    fn normalize_response(resp: GeminiResponse) -> Result<LlmResponse, LlmError> {
        let candidate = resp
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::unknown("No candidates in response"))?;

        let content: Vec<ContentBlock> = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter(|part| !part.thought)
            .filter_map(|part| part.text)
            .filter(|text| !text.is_empty())
            .map(|text| ContentBlock::Text { text })
            .collect();

        if content.is_empty() {
            let reason = candidate
                .finish_reason
                .unwrap_or_else(|| "unspecified".to_string());
            return Err(LlmError::unknown(format!(
                "Response contained no text (finish reason: {reason})"
            )));
        }

        let usage = resp.usage_metadata.unwrap_or_default();
        Ok(LlmResponse {
            content,
            usage: Usage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
            },
        })
    }

    /// List the models visible to the configured key
    pub async fn list_models(&self) -> Result<Vec<ModelSummary>, LlmError> {
        let url = format!("{}/v1beta/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(map_transport_error)?;
        let body = read_body(response).await?;

        let listing: GeminiModelList = serde_json::from_str(&body).map_err(|e| {
            LlmError::unknown(format!("Failed to parse model list: {e} - body: {body}"))
        })?;

        Ok(listing
            .models
            .into_iter()
            .map(|m| ModelSummary {
                name: m.name,
                supported_generation_methods: m.supported_generation_methods,
            })
            .collect())
    }
}

fn map_transport_error(e: reqwest::Error) -> LlmError {
    // Never echo the request URL back to callers
    let e = e.without_url();
    if e.is_timeout() {
        LlmError::network(format!("Request timeout: {e}"))
    } else if e.is_connect() {
        LlmError::network(format!("Connection failed: {e}"))
    } else {
        LlmError::unknown(format!("Request failed: {e}"))
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, LlmError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| LlmError::network(format!("Failed to read response: {}", e.without_url())))?;

    if !status.is_success() {
        if let Ok(error_resp) = serde_json::from_str::<GeminiErrorResponse>(&body) {
            return Err(LlmError::from_status(
                status.as_u16(),
                &error_resp.error.message,
            ));
        }
        return Err(LlmError::unknown(format!("HTTP {status} error: {body}")));
    }

    Ok(body)
}

#[async_trait]
impl LlmService for GeminiService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let gemini_request = Self::translate_request(request);

        let response = self
            .client
            .post(self.generate_url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&gemini_request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let body = read_body(response).await?;

        let gemini_response: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Self::normalize_response(gemini_response)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[derive(Debug, Deserialize)]
struct GeminiModelList {
    #[serde(default)]
    models: Vec<GeminiModelInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModelInfo {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmErrorKind;
    use crate::testing::spawn_stub;
    use axum::{
        extract::{Path, RawQuery},
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};

    fn service_at(base_url: &str) -> GeminiService {
        GeminiService::new(GeminiConfig {
            api_key: "test-key".to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: base_url.to_string(),
        })
    }

    #[test]
    fn test_model_name_normalized() {
        let mut config = GeminiConfig::new("k");
        config.model = "gemini-2.5-pro".to_string();
        let service = GeminiService::new(config);
        assert_eq!(service.model_id(), "models/gemini-2.5-pro");
        assert_eq!(
            service.generate_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }

    #[test]
    fn test_translate_single_prompt() {
        let request = LlmRequest::single_prompt("What is Paris?");
        let wire = serde_json::to_value(GeminiService::translate_request(&request)).unwrap();
        assert_eq!(
            wire,
            json!({
                "contents": [
                    { "role": "user", "parts": [{ "text": "What is Paris?" }] }
                ]
            })
        );
    }

    #[test]
    fn test_normalize_joins_text_and_skips_thoughts() {
        let resp: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "thinking...", "thought": true },
                        { "text": "Paris is " },
                        { "text": "the capital of France." }
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 7, "totalTokenCount": 19 }
        }))
        .unwrap();

        let normalized = GeminiService::normalize_response(resp).unwrap();
        assert_eq!(normalized.text(), "Paris is the capital of France.");
        assert_eq!(normalized.usage.input_tokens, 12);
        assert_eq!(normalized.usage.output_tokens, 7);
    }

    #[test]
    fn test_normalize_rejects_blocked_candidate() {
        let resp: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }))
        .unwrap();

        let err = GeminiService::normalize_response(resp).unwrap_err();
        assert!(err.message.contains("SAFETY"));
    }

    #[test]
    fn test_normalize_rejects_no_candidates() {
        let resp: GeminiResponse = serde_json::from_value(json!({})).unwrap();
        assert!(GeminiService::normalize_response(resp).is_err());
    }

    #[tokio::test]
    async fn test_complete_against_stub() {
        let router = Router::new().route(
            "/v1beta/models/:action",
            post(
                |Path(action): Path<String>,
                 headers: HeaderMap,
                 RawQuery(query): RawQuery,
                 Json(body): Json<Value>| async move {
                    assert_eq!(action, "gemini-2.5-flash:generateContent");
                    assert_eq!(
                        headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()),
                        Some("test-key")
                    );
                    assert_eq!(query, None);
                    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or("");
                    Json(json!({
                        "candidates": [{
                            "content": { "parts": [{ "text": format!("echo: {prompt}") }] },
                            "finishReason": "STOP"
                        }]
                    }))
                },
            ),
        );
        let base = spawn_stub(router).await;

        let response = service_at(&base)
            .complete(&LlmRequest::single_prompt("hi"))
            .await
            .unwrap();
        assert_eq!(response.text(), "echo: hi");
    }

    #[tokio::test]
    async fn test_complete_classifies_api_error() {
        let router = Router::new().route(
            "/v1beta/models/:action",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT" }
                    })),
                )
            }),
        );
        let base = spawn_stub(router).await;

        let err = service_at(&base)
            .complete(&LlmRequest::single_prompt("hi"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::InvalidRequest);
        assert_eq!(err.to_string(), "Invalid request: API key not valid.");
    }

    #[tokio::test]
    async fn test_list_models() {
        let router = Router::new().route(
            "/v1beta/models",
            get(|| async {
                Json(json!({
                    "models": [
                        { "name": "models/gemini-2.5-flash", "supportedGenerationMethods": ["generateContent", "countTokens"] },
                        { "name": "models/embedding-001", "supportedGenerationMethods": ["embedContent"] }
                    ]
                }))
            }),
        );
        let base = spawn_stub(router).await;

        let models = service_at(&base).list_models().await.unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].name, "models/gemini-2.5-flash");
        assert_eq!(
            models[1].supported_generation_methods,
            vec!["embedContent".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_error_hides_key() {
        // Nothing listens on the discard port
        let service = service_at("http://127.0.0.1:9");
        let err = service
            .complete(&LlmRequest::single_prompt("hi"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::Network);
        assert!(!err.message.contains("test-key"));

        let err = service.list_models().await.unwrap_err();
        assert!(!err.message.contains("test-key"));
    }
}
