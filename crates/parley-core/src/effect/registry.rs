//! Channel name to side-effect lookup.

use std::collections::HashMap;

use super::handler::{BoxChannelEffect, ChannelEffect};

/// Static map of special channels to their effects.
///
/// Built at startup and not mutated afterwards. Channels without an entry get
/// plain fan-out.
#[derive(Debug, Clone, Default)]
pub struct EffectRegistry {
    effects: HashMap<String, BoxChannelEffect>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `effect` for `channel`, replacing any earlier registration.
    pub fn with<T: ChannelEffect + 'static>(mut self, channel: impl Into<String>, effect: T) -> Self {
        self.effects
            .insert(channel.into(), BoxChannelEffect::new(effect));
        self
    }

    pub fn lookup(&self, channel: &str) -> Option<&BoxChannelEffect> {
        self.effects.get(channel)
    }

    /// Registered channel names, sorted.
    pub fn channels(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.effects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::disabled::DisabledEffect;

    #[tokio::test]
    async fn lookup_finds_registered_channels_only() {
        let registry = EffectRegistry::new().with("llm", DisabledEffect::new("off"));

        assert!(registry.lookup("llm").is_some());
        assert!(registry.lookup("general").is_none());
        assert_eq!(registry.channels(), vec!["llm"]);
    }

    #[tokio::test]
    async fn later_registration_replaces_earlier() {
        let registry = EffectRegistry::new()
            .with("llm", DisabledEffect::new("first"))
            .with("llm", DisabledEffect::new("second"));
        assert_eq!(registry.len(), 1);

        let effect = registry.lookup("llm").unwrap();
        let reply = effect
            .invoke(&"@a".into(), "llm", "hi")
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some("second"));
    }
}
