use crate::config::credentials::Credentials;
use crate::errors::{ProviderError, ProviderErrorKind};
use crate::model::{CompletionParams, LlmResponse, ModelSpec, Provider};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str, params: &CompletionParams)
        -> anyhow::Result<LlmResponse>;
    fn provider_name(&self) -> &'static str;
    /// Vendor model identifier this client targets.
    fn model(&self) -> &str;
}

pub mod anthropic;
pub mod fake;
pub mod gemini;
pub mod openai;

pub fn http_client(timeout: Option<Duration>) -> anyhow::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(t) = timeout {
        builder = builder.timeout(t);
    }
    Ok(builder.build()?)
}

/// Build the vendor client for a configured model.
pub fn build_client(
    spec: &ModelSpec,
    creds: &Credentials,
    timeout: Option<Duration>,
) -> anyhow::Result<Arc<dyn LlmClient>> {
    let key = creds.require(spec.provider)?.to_string();
    let client: Arc<dyn LlmClient> = match spec.provider {
        Provider::Openai => Arc::new(openai::OpenAIClient::new(
            spec.name.clone(),
            key,
            http_client(timeout)?,
        )),
        Provider::Anthropic => Arc::new(anthropic::AnthropicClient::new(
            spec.name.clone(),
            key,
            http_client(timeout)?,
        )),
        Provider::Google => Arc::new(gemini::GeminiClient::new(
            spec.name.clone(),
            key,
            http_client(timeout)?,
        )),
        Provider::Fake => Arc::new(fake::FakeClient::new(spec.name.clone())),
    };
    Ok(client)
}

/// Clients keyed by model key.
pub type Clients = std::collections::BTreeMap<String, Arc<dyn LlmClient>>;

pub fn build_clients<'a>(
    models: impl IntoIterator<Item = &'a ModelSpec>,
    creds: &Credentials,
    timeout: Option<Duration>,
) -> anyhow::Result<Clients> {
    let mut out = Clients::new();
    for spec in models {
        if !out.contains_key(&spec.key) {
            out.insert(spec.key.clone(), build_client(spec, creds, timeout)?);
        }
    }
    Ok(out)
}

/// Send a JSON request and return the decoded body, mapping failures to `ProviderError`.
pub(crate) async fn post_json(
    provider: &'static str,
    req: reqwest::RequestBuilder,
    body: &serde_json::Value,
) -> anyhow::Result<serde_json::Value> {
    let resp = req
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(|e| ProviderError::new(provider, ProviderErrorKind::Network, e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        let error_text = resp.text().await.unwrap_or_default();
        return Err(ProviderError::from_status(provider, status.as_u16(), &error_text).into());
    }

    let json: serde_json::Value = resp.json().await.map_err(|e| {
        ProviderError::new(provider, ProviderErrorKind::MalformedResponse, e.to_string())
    })?;
    Ok(json)
}

pub(crate) fn malformed(provider: &'static str, what: &str) -> anyhow::Error {
    ProviderError::new(provider, ProviderErrorKind::MalformedResponse, what).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_client_requires_key() {
        let spec = ModelSpec {
            key: "claude".into(),
            name: "claude-3-5-sonnet-20241022".into(),
            provider: Provider::Anthropic,
            max_tokens: 150,
            description: String::new(),
        };
        let err = build_client(&spec, &Credentials::default(), None)
            .err()
            .expect("missing key");
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));

        let creds = Credentials::default().with_key(Provider::Anthropic, "k");
        let client = build_client(&spec, &creds, Some(Duration::from_secs(5))).unwrap();
        assert_eq!(client.provider_name(), "anthropic");
        assert_eq!(client.model(), "claude-3-5-sonnet-20241022");
    }
}
