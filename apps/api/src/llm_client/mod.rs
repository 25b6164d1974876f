/// LLM Client — the single point of entry for all completion calls in coldreach.
///
/// No other module talks to the provider directly. Extraction and drafting go
/// through the `CompletionModel` trait, which `LlmClient` implements.
///
/// Provider: Groq (OpenAI-compatible chat completions).
/// Model: llama-3.3-70b-versatile at temperature 0. Both are fixed on purpose.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
/// The model used for every completion in coldreach.
pub const MODEL: &str = "llama-3.3-70b-versatile";
const TEMPERATURE: f32 = 0.0;

#[cfg(test)]
pub mod stub;

/// Everything that can go wrong on the way to or from the provider.
/// Callers treat every variant as a remote-service failure.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM credential is not configured (set GROQ_API_KEY)")]
    MissingCredential,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Anything that can turn a prompt into completion text.
///
/// `LlmClient` is the production implementation; tests swap in stubs.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice, if the provider sent any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Completion client shared by every operation.
/// Holds an immutable credential and nothing per-call, so clones are cheap.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("base_url", &self.base_url)
            .field("model", &MODEL)
            .finish_non_exhaustive()
    }
}

impl LlmClient {
    /// Builds a client for the hosted provider.
    /// Fails with `MissingCredential` when no usable key was resolved.
    pub fn new(api_key: Option<String>) -> Result<Self, LlmError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        api_key: Option<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingCredential)?;

        // No local timeout: transport defaults apply.
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Makes one chat-completions call and returns the full response object.
    /// Never retries; the first failure is returned as-is.
    pub async fn call(&self, prompt: &str) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request_body = ChatRequest {
            model: MODEL,
            temperature: TEMPERATURE,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!("Sending completion request: prompt_len={}", prompt.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("LLM API returned {status}");
            let message = serde_json::from_str::<ProviderError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat_response: ChatResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat_response)
    }
}

#[async_trait]
impl CompletionModel for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(prompt).await?;
        response
            .text()
            .map(str::to_owned)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Returns the body of the first ```json ... ``` or ``` ... ``` block in LLM
/// output, wherever it starts. Text with no fence is returned trimmed.
/// An unclosed fence runs to the end of the text.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(start) = text.find("```") else {
        return text;
    };

    let after_fence = &text[start + 3..];
    let body = after_fence.strip_prefix("json").unwrap_or(after_fence);
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use axum::{
        extract::State,
        http::{HeaderMap, StatusCode},
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};

    #[derive(Clone, Default)]
    struct Captured {
        body: Arc<Mutex<Option<Value>>>,
        auth: Arc<Mutex<Option<String>>>,
    }

    /// Spawns a fake provider on an ephemeral port and returns its base URL.
    async fn spawn_provider(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/openai/v1")
    }

    fn ok_provider(captured: Captured, reply: &'static str) -> Router {
        Router::new()
            .route(
                "/openai/v1/chat/completions",
                post(
                    move |State(captured): State<Captured>,
                          headers: HeaderMap,
                          Json(body): Json<Value>| async move {
                        *captured.body.lock().unwrap() = Some(body);
                        *captured.auth.lock().unwrap() = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_owned);
                        Json(json!({
                            "choices": [{"message": {"role": "assistant", "content": reply}}],
                            "usage": {"prompt_tokens": 12, "completion_tokens": 3}
                        }))
                    },
                ),
            )
            .with_state(captured)
    }

    #[test]
    fn test_new_without_credential_fails() {
        let result = LlmClient::new(None);
        assert!(matches!(result, Err(LlmError::MissingCredential)));
    }

    #[test]
    fn test_new_with_blank_credential_fails() {
        let result = LlmClient::new(Some("   ".to_string()));
        assert!(matches!(result, Err(LlmError::MissingCredential)));
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let client = LlmClient::new(Some("gsk_secret_value".to_string())).unwrap();
        let printed = format!("{client:?}");
        assert!(!printed.contains("gsk_secret_value"));
        assert!(printed.contains(MODEL));
    }

    #[tokio::test]
    async fn test_complete_sends_model_temperature_and_bearer() {
        let captured = Captured::default();
        let base_url = spawn_provider(ok_provider(captured.clone(), "hello")).await;

        let client = LlmClient::with_base_url(Some("gsk_test".to_string()), base_url).unwrap();
        let text = client.complete("Say hello").await.unwrap();
        assert_eq!(text, "hello");

        let body = captured.body.lock().unwrap().clone().unwrap();
        assert_eq!(body["model"], MODEL);
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Say hello");

        let auth = captured.auth.lock().unwrap().clone().unwrap();
        assert_eq!(auth, "Bearer gsk_test");
    }

    #[tokio::test]
    async fn test_error_status_maps_to_api_error_with_provider_message() {
        let router = Router::new().route(
            "/openai/v1/chat/completions",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": {"message": "Invalid API Key", "type": "invalid_request_error"}})),
                )
            }),
        );
        let base_url = spawn_provider(router).await;

        let client = LlmClient::with_base_url(Some("bad".to_string()), base_url).unwrap();
        let err = client.complete("anything").await.unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API Key");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let hits = Arc::new(Mutex::new(0u32));
        let counter = hits.clone();
        let router = Router::new().route(
            "/openai/v1/chat/completions",
            post(move || {
                let counter = counter.clone();
                async move {
                    *counter.lock().unwrap() += 1;
                    (StatusCode::SERVICE_UNAVAILABLE, "overloaded")
                }
            }),
        );
        let base_url = spawn_provider(router).await;

        let client = LlmClient::with_base_url(Some("k".to_string()), base_url).unwrap();
        let err = client.complete("anything").await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 503, ref message } if message == "overloaded"));
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_null_content_is_empty_content() {
        let router = Router::new().route(
            "/openai/v1/chat/completions",
            post(|| async { Json(json!({"choices": [{"message": {"content": null}}]})) }),
        );
        let base_url = spawn_provider(router).await;

        let client = LlmClient::with_base_url(Some("k".to_string()), base_url).unwrap();
        let err = client.complete("anything").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n[{\"role\": \"x\"}]\n```";
        assert_eq!(strip_json_fences(input), "[{\"role\": \"x\"}]");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_after_preamble() {
        let input = "Here are the jobs:\n```json\n[{\"role\": \"SRE\"}]\n```\nLet me know!";
        assert_eq!(strip_json_fences(input), "[{\"role\": \"SRE\"}]");
    }

    #[test]
    fn test_strip_json_fences_unclosed() {
        let input = "```json\n{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "  {\"key\": \"value\"}\n";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }
}
