//! HTTP robot controller.
//!
//! Structured commands go to `POST {base}/command` as `{"command": ...}` and
//! free-text instructions to `POST {base}/action` as `{"instruction": ...}`.
//! A non-empty response body is returned as the reply text.

use std::time::Duration;

use parley_core::effect::robot::RobotController;
use parley_types::config::RobotConfig;
use parley_types::error::EffectError;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct CommandBody<'a> {
    command: &'a str,
}

#[derive(Debug, Serialize)]
struct ActionBody<'a> {
    instruction: &'a str,
}

#[derive(Debug, Clone)]
pub struct HttpRobotController {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRobotController {
    pub fn new(config: &RobotConfig) -> Result<Self, EffectError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| EffectError::Unavailable(format!("http client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<String>, EffectError> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| EffectError::Unavailable(format!("{url}: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| EffectError::Backend(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(EffectError::Backend(format!("HTTP {status}: {text}")));
        }

        let text = text.trim();
        Ok((!text.is_empty()).then(|| text.to_string()))
    }
}

impl RobotController for HttpRobotController {
    async fn command(&self, command: &str) -> Result<Option<String>, EffectError> {
        self.post("/command", &CommandBody { command }).await
    }

    async fn action(&self, instruction: &str) -> Result<Option<String>, EffectError> {
        self.post("/action", &ActionBody { instruction }).await
    }
}
