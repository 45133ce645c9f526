//! Anthropic Messages API client.

use crate::SlideGenerator;
use docdeck_core::prompt::{extract_topics_prompt, slide_content_prompt};
use docdeck_core::{classify_response, Error, Generation, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Generator backed by Claude through the Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicGenerator {
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    timeout: Duration,
}

impl AnthropicGenerator {
    pub const DEFAULT_MODEL: &'static str = "claude-3-5-sonnet-20241022";
    pub const DEFAULT_BASE_URL: &'static str = "https://api.anthropic.com/v1";
    pub const API_VERSION: &'static str = "2023-06-01";

    /// Create a generator with the given API key and default settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            max_tokens: 4096,
            timeout: Duration::from_secs(60),
        }
    }

    /// Use a different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use a custom base URL (for proxies or alternative endpoints).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Timeout for a whole request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one user prompt and classify the answer.
    pub fn complete(&self, prompt: &str) -> Result<Generation> {
        let start = Instant::now();
        log::debug!("Prompt length: {} chars", prompt.len());

        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = match ureq::post(&format!("{}/messages", self.base_url))
            .set("x-api-key", &self.api_key)
            .set("anthropic-version", Self::API_VERSION)
            .set("content-type", "application/json")
            .timeout(self.timeout)
            .send_json(&request)
        {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                return Err(Error::GenerationError(format!(
                    "API returned status {}: {}",
                    code,
                    body.trim()
                )));
            }
            Err(e) => {
                return Err(Error::GenerationError(format!("Request failed: {}", e)));
            }
        };

        let response: MessagesResponse = response
            .into_json()
            .map_err(|e| Error::GenerationError(format!("Failed to parse response: {}", e)))?;

        if let Some(reason) = &response.stop_reason {
            log::debug!("Stop reason: {}", reason);
        }
        let text = response.text();
        log::info!(
            "Generation took {:?}, {} chars",
            start.elapsed(),
            text.len()
        );

        Ok(classify_response(&text))
    }
}

impl SlideGenerator for AnthropicGenerator {
    fn generate_slides(&self, topic: &str, segment: &str) -> Result<Generation> {
        self.complete(&slide_content_prompt(topic, segment))
    }

    fn extract_topics(&self, document: &str) -> Result<Generation> {
        self.complete(&extract_topics_prompt(document))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

impl MessagesResponse {
    /// Text of the first text block, or empty.
    fn text(&self) -> String {
        self.content
            .iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}
