/// LLM Client — the single point of entry for all OpenAI calls in TagLens.
///
/// ARCHITECTURAL RULE: No other module may call the provider directly.
/// Both the chat-completion and the embedding endpoint go through this
/// module, and this module owns the sole retry policy in the system.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod retry;

pub use retry::RetryPolicy;

use retry::with_retries;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

/// The chat model used for tag extraction.
/// Intentionally hardcoded to prevent accidental drift.
pub const CHAT_MODEL: &str = "gpt-4o-mini";
pub const EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const EMBEDDING_DIMENSIONS: usize = 1536;

const TEMPERATURE: f32 = 0.2;
const MAX_COMPLETION_TOKENS: u32 = 400;
const PRESENCE_PENALTY: f32 = 0.2;
const FREQUENCY_PENALTY: f32 = 0.4;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("rate limited: {message}")]
    RateLimited { message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("provider returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// Transient failure kinds the gateway is allowed to retry:
    /// rate-limiting, upstream 5xx errors, and request timeouts.
    /// Everything else propagates on the first attempt.
    pub fn is_retriable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } | LlmError::Timeout => true,
            LlmError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Http(err)
        }
    }
}

/// Chat-completion seam, object-safe so the pipeline can be tested with fakes.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Embedding seam for the embedding cache.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    presence_penalty: f32,
    frequency_penalty: f32,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The single LLM client used by all services in TagLens.
/// Wraps both OpenAI endpoints with a per-call timeout and bounded retry.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    retry: RetryPolicy,
}

impl LlmClient {
    pub fn new(
        api_key: String,
        timeout: std::time::Duration,
        retry: RetryPolicy,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            retry,
        })
    }

    /// Calls the chat-completion endpoint and returns the raw model output.
    /// Retries per the configured policy; the last error is re-raised unmodified.
    pub async fn chat_completion(&self, prompt: &str) -> Result<String, LlmError> {
        with_retries(&self.retry, || self.chat_attempt(prompt)).await
    }

    /// Embeds a single text and returns its vector.
    pub async fn embedding(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        with_retries(&self.retry, || self.embed_attempt(text)).await
    }

    async fn chat_attempt(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: CHAT_MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_COMPLETION_TOKENS,
            presence_penalty: PRESENCE_PENALTY,
            frequency_penalty: FREQUENCY_PENALTY,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(LlmError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_error_status(
                status.as_u16(),
                response.text().await.unwrap_or_default(),
            ));
        }

        let parsed: ChatResponse = response.json().await.map_err(LlmError::from_transport)?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "chat call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::EmptyContent)
    }

    async fn embed_attempt(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let request_body = EmbeddingRequest {
            model: EMBEDDING_MODEL,
            input: [text],
        };

        let response = self
            .client
            .post(EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(LlmError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_error_status(
                status.as_u16(),
                response.text().await.unwrap_or_default(),
            ));
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(LlmError::from_transport)?;

        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|entry| entry.embedding)
            .ok_or(LlmError::EmptyContent)?;

        if vector.len() != EMBEDDING_DIMENSIONS {
            warn!(
                "embedding dimension mismatch: got {}, expected {}",
                vector.len(),
                EMBEDDING_DIMENSIONS
            );
        }

        Ok(vector)
    }
}

#[async_trait]
impl ChatClient for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.chat_completion(prompt).await
    }
}

#[async_trait]
impl EmbeddingClient for LlmClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        self.embedding(text).await
    }
}

/// Maps a non-success HTTP status to an error kind, extracting the provider's
/// error message from the body when it is present.
fn classify_error_status(status: u16, body: String) -> LlmError {
    let message = serde_json::from_str::<ProviderError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);

    if status == 429 {
        LlmError::RateLimited { message }
    } else {
        LlmError::Api { status, message }
    }
}
