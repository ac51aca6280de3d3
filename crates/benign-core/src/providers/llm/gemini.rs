use super::{malformed, post_json, LlmClient};
use crate::model::{CompletionParams, LlmResponse};
use async_trait::async_trait;
use serde_json::json;
use std::time::Instant;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiClient {
    pub model: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(model: String, api_key: String, client: reqwest::Client) -> Self {
        Self {
            model,
            api_key,
            client,
        }
    }
}

pub(crate) fn request_body(prompt: &str, params: &CompletionParams) -> serde_json::Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "temperature": params.temperature,
            "maxOutputTokens": params.max_tokens,
        },
    })
}

pub(crate) fn extract(json: &serde_json::Value) -> anyhow::Result<(String, Option<u64>, Option<String>)> {
    let parts = json
        .pointer("/candidates/0/content/parts")
        .and_then(|v| v.as_array())
        .ok_or_else(|| malformed("google", "response missing candidates[0].content.parts"))?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();
    let tokens = json
        .pointer("/usageMetadata/totalTokenCount")
        .and_then(|v| v.as_u64());
    let finish = json
        .pointer("/candidates/0/finishReason")
        .and_then(|v| v.as_str())
        .map(String::from);
    Ok((text.trim().to_string(), tokens, finish))
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(
        &self,
        prompt: &str,
        params: &CompletionParams,
    ) -> anyhow::Result<LlmResponse> {
        let start = Instant::now();
        let url = format!("{}/{}:generateContent", BASE_URL, self.model);
        let req = self.client.post(url).header("x-goog-api-key", &self.api_key);
        let json = post_json("google", req, &request_body(prompt, params)).await?;
        let (text, tokens, finish_reason) = extract(&json)?;

        Ok(LlmResponse {
            text,
            provider: "google".to_string(),
            model: self.model.clone(),
            tokens,
            finish_reason,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn provider_name(&self) -> &'static str {
        "google"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
