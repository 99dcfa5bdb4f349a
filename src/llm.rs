use async_trait::async_trait;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use crate::config::LlmConfig;
use crate::error::GenError;
use crate::messages::missing_api_key;
use std::fmt::Debug;
use std::time::Duration;

pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";
pub const GEMINI_KEY_VAR: &str = "GEMINI_API_KEY";

#[async_trait]
pub trait LlmClient: Send + Sync + Debug {
    /// Sends one user message. `Ok(None)` means the service answered but
    /// produced no usable text.
    async fn chat(&self, user: &str) -> Result<Option<String>>;
}

#[derive(Debug, Clone)]
struct Sampling {
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl Sampling {
    fn from_config(config: &LlmConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

pub fn create_llm(config: &LlmConfig) -> crate::error::Result<Box<dyn LlmClient>> {
    create_llm_with(config, |var| std::env::var(var).ok())
}

/// Like [`create_llm`] but with an explicit credential lookup.
pub fn create_llm_with<F>(config: &LlmConfig, lookup: F) -> crate::error::Result<Box<dyn LlmClient>>
where
    F: Fn(&str) -> Option<String>,
{
    let api_key = |var: &str| {
        lookup(var)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GenError::Configuration(missing_api_key(var)))
    };
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()
        .map_err(|e| GenError::Configuration(format!("HTTP client: {}", e)))?;
    let sampling = Sampling::from_config(config);

    match config.provider.as_str() {
        "openai" => {
            let key = api_key(OPENAI_KEY_VAR)?;
            Ok(Box::new(OpenAIClient::new(&key, sampling, config.base_url.as_deref(), client)))
        },
        "gemini" => {
            let key = api_key(GEMINI_KEY_VAR)?;
            Ok(Box::new(GeminiClient::new(&key, sampling, client)))
        },
        "ollama" => {
            let base_url = config.base_url.as_deref().unwrap_or("http://localhost:11434");
            Ok(Box::new(OllamaClient::new(base_url, sampling, client)))
        },
        _ => Err(GenError::Configuration(format!("Unknown LLM provider: {}", config.provider)))
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

// --- OpenAI ---

#[derive(Debug)]
struct OpenAIClient {
    api_key: String,
    sampling: Sampling,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAIClient {
    fn new(api_key: &str, sampling: Sampling, base_url: Option<&str>, client: reqwest::Client) -> Self {
        Self {
            api_key: api_key.to_string(),
            sampling,
            base_url: base_url.unwrap_or("https://api.openai.com/v1").trim_end_matches('/').to_string(),
            client,
        }
    }
}

/// Single user turn, shared by the OpenAI and Ollama chat endpoints.
#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

impl ChatMessage {
    fn user(content: &str) -> Vec<Self> {
        vec![Self { role: "user", content: content.to_string() }]
    }
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIRequest {
    fn new(sampling: &Sampling, user: &str) -> Self {
        Self {
            model: sampling.model.clone(),
            messages: ChatMessage::user(user),
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
        }
    }
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: Option<ReplyMessage>,
}

/// Assistant message as returned by the OpenAI and Ollama chat endpoints.
#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

impl OpenAIResponse {
    fn into_text(self) -> Option<String> {
        let content = self.choices.into_iter().next()?.message?.content;
        non_empty(content)
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn chat(&self, user: &str) -> Result<Option<String>> {
        let url = format!("{}/chat/completions", self.base_url);

        let resp = self.client.post(&url)
            .bearer_auth(&self.api_key)
            .json(&OpenAIRequest::new(&self.sampling, user))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await?;
            return Err(anyhow!("OpenAI API error ({}): {}", status, error_text));
        }

        let result: OpenAIResponse = resp.json().await?;
        Ok(result.into_text())
    }
}

// --- Gemini ---

#[derive(Debug)]
struct GeminiClient {
    api_key: String,
    sampling: Sampling,
    client: reqwest::Client,
}

impl GeminiClient {
    fn new(api_key: &str, sampling: Sampling, client: reqwest::Client) -> Self {
        Self {
            api_key: api_key.to_string(),
            sampling,
            client,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

impl GeminiRequest {
    fn new(sampling: &Sampling, user: &str) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: user.to_string() }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: sampling.temperature,
                max_output_tokens: sampling.max_tokens,
            },
        }
    }
}

#[derive(Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: String,
}

#[derive(Deserialize, Debug)]
struct GeminiError {
    message: String,
}

impl GeminiResponse {
    fn into_text(self) -> Result<Option<String>> {
        if let Some(err) = self.error {
            return Err(anyhow!("Gemini API returned error: {}", err.message));
        }

        let Some(first) = self.candidates.and_then(|c| c.into_iter().next()) else {
            return Ok(None);
        };
        let text = first
            .content
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text);
        if text.is_none() {
            let reason = first.finish_reason.as_deref().unwrap_or("UNKNOWN");
            log::warn!("Gemini response empty. Finish reason: {}", reason);
        }
        Ok(non_empty(text))
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn chat(&self, user: &str) -> Result<Option<String>> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.sampling.model, self.api_key
        );

        let resp = self.client.post(&url)
            .json(&GeminiRequest::new(&self.sampling, user))
            .send()
            .await?;

        if !resp.status().is_success() {
            let error_text = resp.text().await?;
            return Err(anyhow!("Gemini API error: {}", error_text));
        }

        let response_text = resp.text().await?;
        let result: GeminiResponse = serde_json::from_str(&response_text)
            .map_err(|e| anyhow!("Failed to parse Gemini response: {}. Body: {}", e, response_text))?;
        result.into_text()
    }
}

// --- Ollama ---

#[derive(Debug)]
struct OllamaClient {
    base_url: String,
    sampling: Sampling,
    client: reqwest::Client,
}

impl OllamaClient {
    fn new(base_url: &str, sampling: Sampling, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            sampling,
            client,
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

impl OllamaRequest {
    fn new(sampling: &Sampling, user: &str) -> Self {
        Self {
            model: sampling.model.clone(),
            messages: ChatMessage::user(user),
            stream: false,
            options: OllamaOptions {
                temperature: sampling.temperature,
                num_predict: sampling.max_tokens,
            },
        }
    }
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: Option<ReplyMessage>,
}

impl OllamaResponse {
    fn into_text(self) -> Option<String> {
        non_empty(self.message.and_then(|m| m.content))
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn chat(&self, user: &str) -> Result<Option<String>> {
        let url = format!("{}/api/chat", self.base_url);

        let resp = self.client.post(&url)
            .json(&OllamaRequest::new(&self.sampling, user))
            .send()
            .await?;

        if !resp.status().is_success() {
            let error_text = resp.text().await?;
            return Err(anyhow!("Ollama API error: {}", error_text));
        }

        let result: OllamaResponse = resp.json().await?;
        Ok(result.into_text())
    }
}
