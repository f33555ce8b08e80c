//! OpenAI-compatible chat-completion client.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use venuescout_shared::{LlmConfig, Result, VenueScoutError, resolve_api_key};

use crate::{ChatMessage, ChatModel, Completion};

/// User-Agent string for model requests.
const USER_AGENT: &str = concat!("VenueScout/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat client for any endpoint speaking the OpenAI `chat/completions` shape.
pub struct OpenAiCompatClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
}

impl OpenAiCompatClient {
    /// Create a client with an explicit API key.
    pub fn new(config: &LlmConfig, api_key: SecretString) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| VenueScoutError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    /// Create a client if the configured API key env var is set.
    ///
    /// Returns `Ok(None)` when the key is absent.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>> {
        match resolve_api_key(config) {
            Some(key) => Self::new(config, key).map(Some),
            None => Ok(None),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatClient {
    #[instrument(skip_all, fields(model = %self.model, timeout_secs = request.timeout.as_secs()))]
    async fn complete(&self, request: &Completion) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose_secret())
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VenueScoutError::Model(format!(
                        "request timed out after {}s",
                        request.timeout.as_secs()
                    ))
                } else {
                    VenueScoutError::Model(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail: String = detail.chars().take(200).collect();
            return Err(VenueScoutError::Model(format!("HTTP {status}: {detail}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| VenueScoutError::Model(format!("invalid completion body: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| VenueScoutError::Model("completion has no choices".into()))?;

        debug!(chars = content.len(), "completion received");
        Ok(content)
    }
}
