//! Channel side-effect trait and its object-safe wrapper.
//!
//! Same blanket-impl pattern as the boxed providers elsewhere:
//! 1. `ChannelEffect` uses native async fn in traits
//! 2. `ChannelEffectDyn` is the object-safe twin with boxed futures
//! 3. `BoxChannelEffect` wraps `Arc<dyn ChannelEffectDyn>` and delegates

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use parley_types::error::EffectError;
use parley_types::identity::Identity;

/// Logic invoked after a message has been fanned out to a special channel.
///
/// Returns the text of a follow-up message to publish on the same channel,
/// or `None` when there is nothing to say.
pub trait ChannelEffect: Send + Sync {
    /// Short name for logs (e.g. "inference", "robot").
    fn name(&self) -> &str;

    fn invoke(
        &self,
        sender: &Identity,
        channel: &str,
        body: &str,
    ) -> impl Future<Output = Result<Option<String>, EffectError>> + Send;
}

/// Object-safe version of [`ChannelEffect`].
pub trait ChannelEffectDyn: Send + Sync {
    fn name(&self) -> &str;

    fn invoke_boxed<'a>(
        &'a self,
        sender: &'a Identity,
        channel: &'a str,
        body: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, EffectError>> + Send + 'a>>;
}

impl<T: ChannelEffect> ChannelEffectDyn for T {
    fn name(&self) -> &str {
        ChannelEffect::name(self)
    }

    fn invoke_boxed<'a>(
        &'a self,
        sender: &'a Identity,
        channel: &'a str,
        body: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, EffectError>> + Send + 'a>> {
        Box::pin(self.invoke(sender, channel, body))
    }
}

/// Type-erased, cheaply clonable channel effect.
#[derive(Clone)]
pub struct BoxChannelEffect {
    inner: Arc<dyn ChannelEffectDyn>,
}

impl BoxChannelEffect {
    pub fn new<T: ChannelEffect + 'static>(effect: T) -> Self {
        Self {
            inner: Arc::new(effect),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn invoke(
        &self,
        sender: &Identity,
        channel: &str,
        body: &str,
    ) -> Result<Option<String>, EffectError> {
        self.inner.invoke_boxed(sender, channel, body).await
    }
}

impl std::fmt::Debug for BoxChannelEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxChannelEffect")
            .field("name", &self.name())
            .finish()
    }
}
