//! Inference effect for the `llm` channel.
//!
//! The backend is built lazily on first use, so a server started with
//! inference enabled but without credentials only fails when someone actually
//! talks to the channel, and then degrades to a fixed diagnostic reply.

use std::future::Future;

use parley_types::error::EffectError;
use parley_types::identity::Identity;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::handler::ChannelEffect;

/// Reply published when the backend cannot be built or fails.
pub const LLM_UNAVAILABLE_TEXT: &str = "llm backend unavailable";

/// A text-completion backend.
///
/// Implementations live in parley-infra (e.g. an HTTP client).
pub trait Completer: Send + Sync {
    fn complete(
        &self,
        sender: &Identity,
        prompt: &str,
    ) -> impl Future<Output = Result<String, EffectError>> + Send;
}

/// Channel effect that answers each message with a completion.
pub struct InferenceEffect<C, F> {
    backend: OnceCell<C>,
    factory: F,
}

impl<C, F> InferenceEffect<C, F>
where
    C: Completer,
    F: Fn() -> Result<C, EffectError> + Send + Sync,
{
    /// `factory` runs on first use; a failed build is retried on the next message.
    pub fn new(factory: F) -> Self {
        Self {
            backend: OnceCell::new(),
            factory,
        }
    }
}

impl<C, F> ChannelEffect for InferenceEffect<C, F>
where
    C: Completer,
    F: Fn() -> Result<C, EffectError> + Send + Sync,
{
    fn name(&self) -> &str {
        "inference"
    }

    async fn invoke(
        &self,
        sender: &Identity,
        channel: &str,
        body: &str,
    ) -> Result<Option<String>, EffectError> {
        let prompt = body.trim();
        if prompt.is_empty() {
            return Ok(None);
        }

        let backend = match self
            .backend
            .get_or_try_init(|| async { (self.factory)() })
            .await
        {
            Ok(backend) => backend,
            Err(err) => {
                warn!(%channel, error = %err, "failed to build inference backend");
                return Ok(Some(LLM_UNAVAILABLE_TEXT.to_string()));
            }
        };

        match backend.complete(sender, prompt).await {
            Ok(text) => {
                debug!(%channel, %sender, chars = text.len(), "inference reply ready");
                Ok(Some(text))
            }
            Err(err) => {
                warn!(%channel, error = %err, "inference backend failed");
                Ok(Some(LLM_UNAVAILABLE_TEXT.to_string()))
            }
        }
    }
}
