//! Relay registry: routing name to relay handler. Built once at startup, read-only after.

use crate::channels::transport::{HttpTransport, TransportError};
use crate::channels::weixin::{message::CodecError, WeixinChannel};
use crate::config::{self, Config};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// A channel that converts an inbound payload and relays it to its provider.
#[async_trait]
pub trait Relay: Send + Sync {
    /// Routing name (e.g. "weixin").
    fn id(&self) -> &str;
    /// Relay `payload` to the destination identified by `key`, splitting it if the provider requires.
    async fn convert_and_send(&self, payload: &[u8], key: &str) -> Result<(), RelayError>;
}

/// Registry of routing names to relays.
#[derive(Clone, Default)]
pub struct RelayRegistry {
    inner: HashMap<String, Arc<dyn Relay>>,
}

impl RelayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every channel enabled in `config`.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();
        if config.channels.weixin.enabled {
            let transport = HttpTransport::new(config::resolve_weixin_webhook_url(config));
            log::info!("weixin relay registered, delivering to {}", transport.url());
            registry.register(Arc::new(WeixinChannel::new(Arc::new(transport))));
        }
        registry
    }

    /// Register under the relay's own id, replacing any previous entry.
    pub fn register(&mut self, relay: Arc<dyn Relay>) {
        self.inner.insert(relay.id().to_string(), relay);
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Relay>> {
        self.inner.get(name).cloned()
    }

    /// Registered routing names, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_registers_weixin_when_enabled() {
        let config = Config::default();
        let registry = RelayRegistry::from_config(&config);
        assert_eq!(registry.ids(), vec!["weixin".to_string()]);
        assert_eq!(registry.resolve("weixin").map(|r| r.id().to_string()).as_deref(), Some("weixin"));
        assert!(registry.resolve("dingtalk").is_none());
    }

    #[test]
    fn disabled_channel_is_not_routable() {
        let mut config = Config::default();
        config.channels.weixin.enabled = false;
        let registry = RelayRegistry::from_config(&config);
        assert!(registry.ids().is_empty());
        assert!(registry.resolve("weixin").is_none());
    }
}
