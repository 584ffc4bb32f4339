use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// 上游没有给出内容时的固定回复
pub const FALLBACK_REPLY: &str = "……心の中をゆっくり観察してみましょう。";

/// 一次补全调用所需的全部参数
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub system_prompt: String,
    pub user_message: String,
}

/// 统一的补全引擎抽象
#[async_trait]
pub trait CompletionEngine: Send + Sync {
    /// 一次性生成完整回复，没有重试也没有流式输出
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: [ApiMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI Chat Completions 实现
pub struct OpenAiEngine {
    client: reqwest::Client,
    api_key: String,
    url: String,
}

impl OpenAiEngine {
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Arc<Self> {
        Arc::new(Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl CompletionEngine for OpenAiEngine {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ApiRequest {
            model: &request.model,
            messages: [
                ApiMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ApiMessage {
                    role: "user",
                    content: &request.user_message,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("OpenAI request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(%status, body = %text, "ZENAI_BACKEND: OpenAI returned an error status");
            return Err(anyhow!("OpenAI API error {status}: {text}"));
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .context("failed to parse OpenAI response")?;

        Ok(first_content(parsed).unwrap_or_else(|| FALLBACK_REPLY.to_string()))
    }
}

fn first_content(response: ApiResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .filter(|content| !content.is_empty())
}
