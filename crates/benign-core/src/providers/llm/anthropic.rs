use super::{malformed, post_json, LlmClient};
use crate::model::{CompletionParams, LlmResponse};
use async_trait::async_trait;
use serde_json::json;
use std::time::Instant;

const URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    pub model: String,
    api_key: String,
    client: reqwest::Client,
}

impl AnthropicClient {
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
        "max_tokens": params.max_tokens,
        "temperature": params.temperature,
        "messages": [{ "role": "user", "content": prompt }],
    })
}

/// Text blocks are concatenated; usage is input + output tokens.
pub(crate) fn extract(json: &serde_json::Value) -> anyhow::Result<(String, Option<u64>, Option<String>)> {
    let blocks = json
        .get("content")
        .and_then(|v| v.as_array())
        .ok_or_else(|| malformed("anthropic", "response missing content array"))?;
    let text: String = blocks
        .iter()
        .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
        .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
        .collect();
    if blocks.is_empty() {
        return Err(malformed("anthropic", "response content is empty"));
    }

    let input = json.pointer("/usage/input_tokens").and_then(|v| v.as_u64());
    let output = json.pointer("/usage/output_tokens").and_then(|v| v.as_u64());
    let tokens = match (input, output) {
        (None, None) => None,
        (i, o) => Some(i.unwrap_or(0) + o.unwrap_or(0)),
    };
    let finish = json
        .get("stop_reason")
        .and_then(|v| v.as_str())
        .map(String::from);
    Ok((text.trim().to_string(), tokens, finish))
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(
        &self,
        prompt: &str,
        params: &CompletionParams,
    ) -> anyhow::Result<LlmResponse> {
        let start = Instant::now();
        let req = self
            .client
            .post(URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION);
        let json = post_json("anthropic", req, &request_body(&self.model, prompt, params)).await?;
        let (text, tokens, finish_reason) = extract(&json)?;

        Ok(LlmResponse {
            text,
            provider: "anthropic".to_string(),
            model: self.model.clone(),
            tokens,
            finish_reason,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn provider_name(&self) -> &'static str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
