use super::{malformed, post_json, LlmClient};
use crate::model::{CompletionParams, LlmResponse};
use async_trait::async_trait;
use serde_json::json;
use std::time::Instant;

const URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAIClient {
    pub model: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAIClient {
    pub fn new(model: String, api_key: String, client: reqwest::Client) -> Self {
        Self {
            model,
            api_key,
            client,
        }
    }
}

pub(crate) fn request_body(model: &str, prompt: &str, params: &CompletionParams) -> serde_json::Value {
    json!({
        "model": model,
        "messages": [{ "role": "user", "content": prompt }],
        "temperature": params.temperature,
        "max_tokens": params.max_tokens,
    })
}

/// Pull text, token usage and finish reason out of a chat completions body.
pub(crate) fn extract(json: &serde_json::Value) -> anyhow::Result<(String, Option<u64>, Option<String>)> {
    let text = json
        .pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .ok_or_else(|| malformed("openai", "response missing choices[0].message.content"))?
        .trim()
        .to_string();
    let tokens = json.pointer("/usage/total_tokens").and_then(|v| v.as_u64());
    let finish = json
        .pointer("/choices/0/finish_reason")
        .and_then(|v| v.as_str())
        .map(String::from);
    Ok((text, tokens, finish))
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(
        &self,
        prompt: &str,
        params: &CompletionParams,
    ) -> anyhow::Result<LlmResponse> {
        let start = Instant::now();
        let req = self
            .client
            .post(URL)
            .header("Authorization", format!("Bearer {}", self.api_key));
        let json = post_json("openai", req, &request_body(&self.model, prompt, params)).await?;
        let (text, tokens, finish_reason) = extract(&json)?;

        Ok(LlmResponse {
            text,
            provider: "openai".to_string(),
            model: self.model.clone(),
            tokens,
            finish_reason,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
