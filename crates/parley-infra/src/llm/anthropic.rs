//! AnthropicCompleter -- [`Completer`] backed by the Anthropic Messages API.
//!
//! Sends one non-streaming request to `/v1/messages` per chat message. The
//! API key is wrapped in [`secrecy::SecretString`] and is never logged.

use std::time::Duration;

use parley_core::effect::inference::Completer;
use parley_types::config::LlmConfig;
use parley_types::error::EffectError;
use parley_types::identity::Identity;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Request body for the Messages API.
#[derive(Debug, Clone, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<RequestMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Anthropic-backed completer.
///
/// Does not derive `Debug`; the key must never end up in logs.
pub struct AnthropicCompleter {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    max_tokens: u32,
    system_prompt: Option<String>,
}

impl AnthropicCompleter {
    const API_VERSION: &'static str = "2023-06-01";

    pub fn new(api_key: SecretString, config: &LlmConfig) -> Result<Self, EffectError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| EffectError::Unavailable(format!("http client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            system_prompt: config.system_prompt.clone(),
        })
    }

    /// Build from config, reading the key from `config.api_key_env`.
    pub fn from_config(config: &LlmConfig) -> Result<Self, EffectError> {
        let key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                EffectError::Unavailable(format!("{} is not set", config.api_key_env))
            })?;
        Self::new(SecretString::from(key), config)
    }

    fn request<'a>(&'a self, prompt: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![RequestMessage {
                role: "user",
                content: prompt,
            }],
            system: self.system_prompt.as_deref(),
        }
    }
}

impl Completer for AnthropicCompleter {
    async fn complete(&self, sender: &Identity, prompt: &str) -> Result<String, EffectError> {
        tracing::debug!(%sender, model = %self.model, "requesting completion");

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", Self::API_VERSION)
            .json(&self.request(prompt))
            .send()
            .await
            .map_err(|e| EffectError::Unavailable(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EffectError::Backend(format!("HTTP {status}: {body}")));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| EffectError::Backend(format!("failed to parse response: {e}")))?;

        Ok(parsed
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completer() -> AnthropicCompleter {
        AnthropicCompleter::new(SecretString::from("test-key-not-real"), &LlmConfig::default())
            .unwrap()
    }

    #[test]
    fn request_shape() {
        let completer = completer();
        let json = serde_json::to_value(completer.request("hello")).unwrap();
        assert_eq!(json["model"], "claude-sonnet-4-20250514");
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
        assert!(json.get("system").is_none());
    }

    #[test]
    fn response_text_blocks_are_extracted() {
        let parsed: MessagesResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"Hi"},{"type":"tool_use"},{"type":"text","text":" there"}]}"#,
        )
        .unwrap();
        let texts: Vec<_> = parsed
            .content
            .into_iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect();
        assert_eq!(texts.concat(), "Hi there");
    }

    #[test]
    fn missing_key_is_unavailable() {
        let config = LlmConfig {
            api_key_env: "PARLEY_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmConfig::default()
        };
        let err = AnthropicCompleter::from_config(&config).err().unwrap();
        assert!(matches!(err, EffectError::Unavailable(_)));
    }

    #[tokio::test]
    async fn unreachable_backend_is_unavailable() {
        let config = LlmConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..LlmConfig::default()
        };
        let completer =
            AnthropicCompleter::new(SecretString::from("test-key"), &config).unwrap();
        let err = completer
            .complete(&Identity::from("@alice"), "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, EffectError::Unavailable(_)));
    }
}
