use std::env;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    Anthropic,
    Local,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "openai",
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::Local => "local",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "openai" => Some(LlmProvider::OpenAi),
            "anthropic" => Some(LlmProvider::Anthropic),
            "local" => Some(LlmProvider::Local),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub user: String,
}

/// Knobs for a single completion call. The defaults match the intent of the
/// pipeline: near-deterministic, factual answers with a bounded length.
/// The timeout is enforced by the caller around the whole call.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 1000,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl CompletionResponse {
    pub fn total_tokens(&self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("{0} is not set")]
    Unconfigured(&'static str),
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("missing text in provider response")]
    MissingContent,
}

/// The language-model capability as seen by the Q&A pipeline. Implemented by
/// the real provider client below and by deterministic fakes in tests.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(
        &self,
        request: &CompletionRequest,
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError>;

    /// Human-readable provider/model label for health reporting.
    fn describe(&self) -> String;
}

pub struct LlmClient {
    http: reqwest::Client,
    provider: LlmProvider,
    model: String,
    config: ProviderConfig,
}

enum ProviderConfig {
    OpenAi { api_key: String, base_url: String },
    Anthropic { api_key: String },
    Local,
}

impl LlmClient {
    pub fn new(provider: LlmProvider, model: impl Into<String>) -> Result<Self, LlmError> {
        let config = match provider {
            LlmProvider::OpenAi => ProviderConfig::OpenAi {
                api_key: read_api_key("OPENAI_API_KEY")?,
                base_url: env::var("OPENAI_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            },
            LlmProvider::Anthropic => ProviderConfig::Anthropic {
                api_key: read_api_key("ANTHROPIC_API_KEY")?,
            },
            LlmProvider::Local => ProviderConfig::Local,
        };
        Ok(Self {
            http: reqwest::Client::new(),
            provider,
            model: model.into(),
            config,
        })
    }

    /// Build a client from `RPTQA_LLM_PROVIDER` / `RPTQA_LLM_MODEL`. A missing
    /// credential surfaces as `LlmError::Unconfigured` so the service can run
    /// degraded instead of failing on the first question.
    pub fn from_env() -> Result<Self, LlmError> {
        let provider_name =
            env::var("RPTQA_LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string());
        let provider = LlmProvider::from_str(&provider_name)
            .ok_or(LlmError::UnknownProvider(provider_name))?;
        let model =
            env::var("RPTQA_LLM_MODEL").unwrap_or_else(|_| default_model(provider).to_string());
        Self::new(provider, model)
    }

    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete_openai(
        &self,
        api_key: &str,
        base_url: &str,
        request: &CompletionRequest,
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": request.user }));
        let payload = json!({
            "model": self.model,
            "messages": messages,
            "temperature": options.temperature,
            "max_tokens": options.max_tokens,
        });
        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }
        let decoded: ChatResponse = response.json().await?;
        let content = decoded
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(LlmError::MissingContent)?;
        let usage = decoded.usage.unwrap_or_default();
        Ok(CompletionResponse {
            content,
            prompt_tokens: usage.prompt_tokens.unwrap_or(0),
            completion_tokens: usage.completion_tokens.unwrap_or(0),
        })
    }

    async fn complete_anthropic(
        &self,
        api_key: &str,
        request: &CompletionRequest,
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        let mut payload = json!({
            "model": self.model,
            "max_tokens": options.max_tokens,
            "temperature": options.temperature,
            "messages": [ { "role": "user", "content": request.user } ],
        });
        if let Some(system) = &request.system {
            payload["system"] = json!(system);
        }
        let response = self
            .http
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }
        let decoded: AnthropicResponse = response.json().await?;
        let content = decoded
            .content
            .into_iter()
            .find_map(|part| part.text)
            .ok_or(LlmError::MissingContent)?;
        let usage = decoded.usage.unwrap_or_default();
        Ok(CompletionResponse {
            content,
            prompt_tokens: usage.input_tokens.unwrap_or(0),
            completion_tokens: usage.output_tokens.unwrap_or(0),
        })
    }

    /// Offline provider: answers by echoing the leading words of the question
    /// and context. Exists so the full pipeline can run without credentials.
    fn complete_local(&self, request: &CompletionRequest) -> CompletionResponse {
        let content = format!(
            "Based on the report metadata provided: {}",
            summarize_text(&request.user, 40)
        );
        CompletionResponse {
            content,
            prompt_tokens: 0,
            completion_tokens: 0,
        }
    }
}

#[async_trait]
impl Completion for LlmClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        debug!(provider = self.provider.as_str(), model = %self.model, "issuing completion");
        match &self.config {
            ProviderConfig::OpenAi { api_key, base_url } => {
                self.complete_openai(api_key, base_url, request, options)
                    .await
            }
            ProviderConfig::Anthropic { api_key } => {
                self.complete_anthropic(api_key, request, options).await
            }
            ProviderConfig::Local => Ok(self.complete_local(request)),
        }
    }

    fn describe(&self) -> String {
        format!("{}/{}", self.provider.as_str(), self.model)
    }
}

fn default_model(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::OpenAi => "gpt-4o",
        LlmProvider::Anthropic => "claude-3-5-sonnet",
        LlmProvider::Local => "local",
    }
}

fn read_api_key(var: &'static str) -> Result<String, LlmError> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(LlmError::Unconfigured(var)),
    }
}

fn summarize_text(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<&str>>()
        .join(" ")
}

#[derive(Default, Deserialize)]
struct ChatUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    text: Option<String>,
}

#[derive(Default, Deserialize)]
struct AnthropicUsage {
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
}
