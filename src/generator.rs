//! HTTP content generator speaking an OpenAI-compatible chat API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::contract::ContentGenerator;
use crate::error::GeneratorError;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Explicit, immutable client configuration. Constructed once and handed to
/// [`ApiContentGenerator::new`]; there is no process-global HTTP state.
#[derive(Clone)]
pub struct GeneratorSettings {
    /// API base URL, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl GeneratorSettings {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for GeneratorSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key stays out of logs.
        f.debug_struct("GeneratorSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Chat-completions client implementing [`ContentGenerator`].
pub struct ApiContentGenerator {
    settings: GeneratorSettings,
    client: Client,
}

impl ApiContentGenerator {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self {
            settings,
            client: Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl ContentGenerator for ApiContentGenerator {
    async fn send_request(&self, prompt: &str) -> Result<String, GeneratorError> {
        let url = self.endpoint("chat/completions");
        let body = ChatRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!(url = %url, model = %self.settings.model, "Sending generation request");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .timeout(self.settings.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<failed to decode response body>"));
            return Err(GeneratorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::Malformed(e.to_string()))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GeneratorError::Malformed("response contained no choices".into()))?;
        choice
            .message
            .content
            .ok_or_else(|| GeneratorError::Malformed("choice carried no content".into()))
    }

    async fn probe_connectivity(&self) -> bool {
        let url = self.endpoint("models");
        match self
            .client
            .get(&url)
            .bearer_auth(&self.settings.api_key)
            .timeout(self.settings.timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(error = ?e, url = %url, "Generator connectivity probe failed");
                false
            }
        }
    }
}
