//! Effect for a channel whose backend is switched off.

use parley_types::error::EffectError;
use parley_types::identity::Identity;

use super::handler::ChannelEffect;

/// Fixed reply published on the `llm` channel when inference is disabled.
pub const LLM_DISABLED_TEXT: &str = "LLM is not enabled on this server";

/// Answers every message with a fixed notice and never calls a backend.
#[derive(Debug, Clone)]
pub struct DisabledEffect {
    notice: String,
}

impl DisabledEffect {
    pub fn new(notice: impl Into<String>) -> Self {
        Self {
            notice: notice.into(),
        }
    }

    /// The stand-in for a disabled inference channel.
    pub fn llm() -> Self {
        Self::new(LLM_DISABLED_TEXT)
    }
}

impl ChannelEffect for DisabledEffect {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn invoke(
        &self,
        _sender: &Identity,
        _channel: &str,
        _body: &str,
    ) -> Result<Option<String>, EffectError> {
        Ok(Some(self.notice.clone()))
    }
}
